use thiserror::Error;

/// 单文件提取错误 (在 SingleFileProcessor 边界转换为失败结果，不向上传播)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    /// 策略自身的失败信息 (如 PDF 字段缺失、表格列无法映射)
    #[error("{0}")]
    Extraction(String),

    #[error(transparent)]
    InvalidInvoice(#[from] InvoiceError),

    #[error("Processing timed out after {0} ms")]
    Timeout(u64),
}

/// 发票数据不变量校验错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvoiceError {
    #[error("Item '{description}' has a negative quantity: {quantity}")]
    NegativeQuantity { description: String, quantity: f64 },

    #[error("Item '{description}' has a negative unit price: {unit_price}")]
    NegativeUnitPrice { description: String, unit_price: f64 },

    #[error("Tax rate must not be negative: {0}")]
    NegativeTaxRate(f64),
}

/// 批处理级别错误 (取消或调度故障，会中止整个批次)
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Operation was cancelled")]
    Cancelled,

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),

    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
