use super::processor::SingleFileProcessor;
use crate::error::IntakeError;
use crate::models::{ProcessedInvoice, UploadCandidate};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 进度回调，参数为 [0, 100] 的百分比
pub trait ProgressReporter: Send + Sync {
    fn report(&self, percent: f64);
}

impl<F> ProgressReporter for F
where
    F: Fn(f64) + Send + Sync,
{
    fn report(&self, percent: f64) {
        self(percent)
    }
}

/// 批次调度器
///
/// 按固定大小分批，批内并发处理、批间串行推进。结果顺序与输入顺序一致，
/// 每批完成后回报一次进度。取消只在批次边界检查：已开始的批次会跑完，
/// 之后不再启动新批次，并返回 `IntakeError::Cancelled` 而不是部分结果。
pub struct BatchScheduler {
    processor: Arc<SingleFileProcessor>,
    batch_size: usize,
    pause: Duration,
}

impl BatchScheduler {
    pub fn new(processor: Arc<SingleFileProcessor>, batch_size: usize) -> Self {
        Self {
            processor,
            batch_size: batch_size.max(1),
            pause: Duration::ZERO,
        }
    }

    /// 批次间暂停，0 表示不暂停
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub async fn run<P>(
        &self,
        candidates: Vec<UploadCandidate>,
        progress: &P,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProcessedInvoice>, IntakeError>
    where
        P: ProgressReporter + ?Sized,
    {
        let total = candidates.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let candidates: Vec<Arc<UploadCandidate>> = candidates.into_iter().map(Arc::new).collect();
        let batch_count = total.div_ceil(self.batch_size);
        let mut results: Vec<ProcessedInvoice> = Vec::with_capacity(total);

        tracing::info!("Processing {} files in {} batches of {}", total, batch_count, self.batch_size);

        for (idx, batch) in candidates.chunks(self.batch_size).enumerate() {
            // 1. 批次边界检查取消
            if cancel.is_cancelled() {
                tracing::warn!(
                    "Batch processing cancelled before batch {}/{}, {} results discarded",
                    idx + 1,
                    batch_count,
                    results.len()
                );
                return Err(IntakeError::Cancelled);
            }

            // 2. 批内并发，join_all 按提交顺序返回
            let handles: Vec<_> = batch
                .iter()
                .cloned()
                .map(|candidate| {
                    let processor = self.processor.clone();
                    tokio::spawn(async move { processor.process(candidate).await })
                })
                .collect();

            for joined in join_all(handles).await {
                results.push(joined?);
            }

            // 3. 进度回报
            let percent = results.len() as f64 * 100.0 / total as f64;
            tracing::info!(
                "Batch progress: {}/{}, files: {}/{}, {:.0}%",
                idx + 1,
                batch_count,
                results.len(),
                total,
                percent
            );
            progress.report(percent);

            // 4. 批次间让出调度
            if !self.pause.is_zero() && results.len() < total {
                tokio::time::sleep(self.pause).await;
            }
        }

        let succeeded = results.iter().filter(|r| r.success()).count();
        tracing::info!("Batch complete: {} succeeded, {} failed", succeeded, total - succeeded);

        Ok(results)
    }
}
