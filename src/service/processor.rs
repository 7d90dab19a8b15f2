use super::extractor::ExtractorRegistry;
use crate::error::ExtractionError;
use crate::models::{InvoiceData, ProcessedInvoice, UploadCandidate};
use std::sync::Arc;
use std::time::Duration;

/// 单文件处理：按类型分派提取策略，所有错误都转换为失败结果
pub struct SingleFileProcessor {
    registry: ExtractorRegistry,
    timeout: Option<Duration>,
}

impl SingleFileProcessor {
    pub fn new(registry: ExtractorRegistry) -> Self {
        Self { registry, timeout: None }
    }

    /// 单文件超时，超时与提取失败走同一个结果通道
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn process(&self, candidate: Arc<UploadCandidate>) -> ProcessedInvoice {
        match self.extract(&candidate).await {
            Ok(data) => {
                tracing::debug!("Extracted {} from {}", data.invoice_number(), candidate.name);
                ProcessedInvoice::extracted(candidate, data)
            }
            Err(e) => {
                tracing::warn!("Error processing {}: {}", candidate.name, e);
                ProcessedInvoice::failed(candidate, e.to_string())
            }
        }
    }

    async fn extract(&self, candidate: &UploadCandidate) -> Result<InvoiceData, ExtractionError> {
        let kind = candidate
            .kind()
            .ok_or_else(|| ExtractionError::UnsupportedType(candidate.content_type.clone()))?;
        let extractor = self.registry.for_kind(kind);

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, extractor.extract(candidate))
                .await
                .map_err(|_| ExtractionError::Timeout(limit.as_millis() as u64))?,
            None => extractor.extract(candidate).await,
        }
    }
}
