use crate::error::IntakeError;
use crate::models::{error_log, write_csv_report, IntakeSummary, ProcessedInvoice, UploadCandidate};
use crate::service::{IntakeService, RejectedCandidate};
use axum::{
    extract::{multipart::MultipartError, Json, Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 共享状态：导入服务 + 关停信号
#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<IntakeService>,
    pub shutdown: CancellationToken,
}

/// 返回格式
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    #[default]
    Json,
    ErrorLog,
    Csv,
}

#[derive(Debug, Default, Deserialize)]
pub struct BulkUploadQuery {
    #[serde(default)]
    pub format: ReportFormat,
}

/// 响应体
#[derive(Debug, Serialize)]
pub struct BulkUploadResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<IntakeSummary>,
    pub rejected: Vec<RejectedCandidate>,
    pub invoices: Vec<ProcessedInvoice>,
}

impl BulkUploadResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            summary: None,
            rejected: Vec::new(),
            invoices: Vec::new(),
        }
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 批量上传发票文件
pub async fn bulk_upload(
    State(state): State<AppState>,
    Query(query): Query<BulkUploadQuery>,
    mut multipart: Multipart,
) -> Response {
    let candidates = match read_candidates(&mut multipart).await {
        Ok(candidates) => candidates,
        Err(e) => {
            let response = BulkUploadResponse::failure(format!("Invalid upload: {}", e));
            return (StatusCode::BAD_REQUEST, Json(response)).into_response();
        }
    };

    if candidates.is_empty() {
        let response = BulkUploadResponse::failure("Please upload at least one file");
        return (StatusCode::BAD_REQUEST, Json(response)).into_response();
    }

    let file_count = candidates.len();
    let cancel = state.shutdown.child_token();
    let progress = |percent: f64| tracing::info!("Bulk upload progress: {:.0}%", percent);

    let report = match state.intake.ingest(candidates, &progress, &cancel).await {
        Ok(report) => report,
        Err(IntakeError::Cancelled) => {
            let response = BulkUploadResponse::failure(IntakeError::Cancelled.to_string());
            return (StatusCode::SERVICE_UNAVAILABLE, Json(response)).into_response();
        }
        Err(e) => {
            tracing::error!("Bulk upload failed: {}", e);
            let response = BulkUploadResponse::failure(format!("Error: {}", e));
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response();
        }
    };

    match query.format {
        ReportFormat::Json => {
            let summary = report.summary();
            let response = BulkUploadResponse {
                success: true,
                message: format!(
                    "Successfully processed {} of {} files",
                    summary.succeeded, file_count
                ),
                summary: Some(summary),
                rejected: report.rejected,
                invoices: report.invoices,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        ReportFormat::ErrorLog => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"invoice-processing-errors.txt\"",
                ),
            ],
            error_log(&report.invoices),
        )
            .into_response(),
        ReportFormat::Csv => {
            let mut body = Vec::new();
            if let Err(e) = write_csv_report(&report.invoices, &mut body) {
                tracing::error!("CSV export failed: {}", e);
                let response = BulkUploadResponse::failure(format!("Error: {}", e));
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response();
            }
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                    (header::CONTENT_DISPOSITION, "attachment; filename=\"invoices.csv\""),
                ],
                body,
            )
                .into_response()
        }
    }
}

/// 读取所有文件字段，非文件字段忽略
async fn read_candidates(multipart: &mut Multipart) -> Result<Vec<UploadCandidate>, MultipartError> {
    let mut candidates = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;

        candidates.push(UploadCandidate::new(name, content_type, bytes.to_vec()));
    }

    Ok(candidates)
}
