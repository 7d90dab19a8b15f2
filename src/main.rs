use invoice_intake::{
    api::{self, AppState},
    service::ExtractorRegistry,
    AppConfig, IntakeService,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt::time::ChronoLocal, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式，RUST_LOG 控制级别
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env()?;
    info!("Starting server with config: {:?}", config);

    // 创建导入服务 (模拟提取策略)
    let registry = ExtractorRegistry::simulated(&config.intake);
    let intake = Arc::new(IntakeService::from_config(&config.intake, registry));

    let shutdown = CancellationToken::new();
    let state = AppState {
        intake,
        shutdown: shutdown.clone(),
    };
    let app = api::router(state, config.server.max_request_bytes);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /health");
    info!("  POST /api/invoices/bulk?format=json|error-log|csv");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown requested, cancelling in-flight batches");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
