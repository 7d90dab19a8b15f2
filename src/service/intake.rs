use super::extractor::ExtractorRegistry;
use super::processor::SingleFileProcessor;
use super::scheduler::{BatchScheduler, ProgressReporter};
use super::validator::{FileValidator, RejectedCandidate};
use crate::config::IntakeConfig;
use crate::error::IntakeError;
use crate::models::{IntakeSummary, ProcessedInvoice, UploadCandidate};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 一次批量导入的完整结果
#[derive(Debug)]
pub struct IntakeReport {
    pub rejected: Vec<RejectedCandidate>,
    pub invoices: Vec<ProcessedInvoice>,
}

impl IntakeReport {
    pub fn summary(&self) -> IntakeSummary {
        IntakeSummary::from_results(&self.invoices)
    }
}

/// 批量导入服务：校验 -> 分批提取
pub struct IntakeService {
    validator: FileValidator,
    scheduler: BatchScheduler,
}

impl IntakeService {
    pub fn new(validator: FileValidator, scheduler: BatchScheduler) -> Self {
        Self { validator, scheduler }
    }

    pub fn from_config(config: &IntakeConfig, registry: ExtractorRegistry) -> Self {
        let processor = SingleFileProcessor::new(registry).with_timeout(config.file_timeout());
        let scheduler = BatchScheduler::new(Arc::new(processor), config.batch_size)
            .with_pause(config.batch_pause());
        Self::new(FileValidator::new(config.max_file_size), scheduler)
    }

    pub async fn ingest<P>(
        &self,
        candidates: Vec<UploadCandidate>,
        progress: &P,
        cancel: &CancellationToken,
    ) -> Result<IntakeReport, IntakeError>
    where
        P: ProgressReporter + ?Sized,
    {
        let report = self.validator.validate(candidates);
        if !report.rejected.is_empty() {
            tracing::info!(
                "{} files accepted, {} rejected",
                report.accepted.len(),
                report.rejected.len()
            );
        }

        let invoices = self.scheduler.run(report.accepted, progress, cancel).await?;

        Ok(IntakeReport {
            rejected: report.rejected,
            invoices,
        })
    }
}
