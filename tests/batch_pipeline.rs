use async_trait::async_trait;
use chrono::NaiveDate;
use invoice_intake::config::IntakeConfig;
use invoice_intake::models::{
    InvoiceData, InvoiceHeader, InvoiceItem, InvoiceType, UploadCandidate, MIME_PDF, MIME_XLSX,
};
use invoice_intake::service::{
    BatchScheduler, ExtractorRegistry, IntakeService, InvoiceExtractor, MockInvoiceGenerator,
    RejectionReason,
};
use invoice_intake::{ExtractionError, IntakeError, SingleFileProcessor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 测试用提取器：首字节为等待毫秒数，记录调用次数和最大并发
#[derive(Default)]
struct RecordingExtractor {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[async_trait]
impl InvoiceExtractor for RecordingExtractor {
    async fn extract(&self, candidate: &UploadCandidate) -> Result<InvoiceData, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = candidate.bytes.first().copied().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay as u64)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if candidate.name.starts_with("bad") {
            return Err(ExtractionError::Extraction("Could not extract required fields".to_string()));
        }

        let header = InvoiceHeader {
            invoice_number: format!("INV-{}", candidate.name),
            supplier_name: "Creative Design Agency".to_string(),
            supplier_address: None,
            invoice_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            invoice_type: InvoiceType::Other,
            notes: None,
        };
        let items = vec![InvoiceItem::new("Graphic Design", 2.0, 85.0)?];
        Ok(InvoiceData::new(header, items, 12.0)?)
    }
}

fn scheduler_with(extractor: Arc<RecordingExtractor>, batch_size: usize) -> BatchScheduler {
    let processor = SingleFileProcessor::new(ExtractorRegistry::uniform(extractor));
    BatchScheduler::new(Arc::new(processor), batch_size)
}

fn pdf(name: &str, delay_ms: u8) -> UploadCandidate {
    UploadCandidate::new(name, MIME_PDF, vec![delay_ms])
}

#[tokio::test]
async fn results_follow_input_order_even_when_later_files_finish_first() {
    let extractor = Arc::new(RecordingExtractor::default());
    let scheduler = scheduler_with(extractor, 3);
    let files = vec![pdf("a", 60), pdf("b", 30), pdf("c", 1), pdf("d", 40), pdf("e", 1)];

    let results = scheduler
        .run(files, &|_: f64| {}, &CancellationToken::new())
        .await
        .unwrap();

    let names: Vec<_> = results.iter().map(|r| r.file_name()).collect();
    assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
}

#[tokio::test]
async fn five_files_in_batches_of_three_report_sixty_then_one_hundred() {
    let extractor = Arc::new(RecordingExtractor::default());
    let scheduler = scheduler_with(extractor, 3);
    let reports = Mutex::new(Vec::new());
    let files = (0..5).map(|i| pdf(&format!("f{}", i), 1)).collect();

    let results = scheduler
        .run(files, &|p: f64| reports.lock().unwrap().push(p), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 5);
    assert_eq!(*reports.lock().unwrap(), vec![60.0, 100.0]);
}

#[tokio::test]
async fn progress_is_monotonic_and_ends_at_one_hundred() {
    let extractor = Arc::new(RecordingExtractor::default());
    let scheduler = scheduler_with(extractor, 2).with_pause(Duration::from_millis(5));
    let reports = Mutex::new(Vec::new());
    let files = (0..7).map(|i| pdf(&format!("f{}", i), 0)).collect();

    scheduler
        .run(files, &|p: f64| reports.lock().unwrap().push(p), &CancellationToken::new())
        .await
        .unwrap();

    let reports = reports.into_inner().unwrap();
    assert_eq!(reports.len(), 4);
    assert!(reports.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(reports.last().copied(), Some(100.0));
}

#[tokio::test]
async fn concurrency_is_bounded_by_batch_size() {
    let extractor = Arc::new(RecordingExtractor::default());
    let scheduler = scheduler_with(extractor.clone(), 3);
    let files = (0..8).map(|i| pdf(&format!("f{}", i), 30)).collect();

    scheduler
        .run(files, &|_: f64| {}, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(extractor.calls.load(Ordering::SeqCst), 8);
    assert_eq!(extractor.max_in_flight.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn cancellation_after_first_batch_discards_partial_results() {
    let extractor = Arc::new(RecordingExtractor::default());
    let scheduler = scheduler_with(extractor.clone(), 3);
    let cancel = CancellationToken::new();
    let reports = Mutex::new(Vec::new());
    let files = (0..6).map(|i| pdf(&format!("f{}", i), 1)).collect();

    let outcome = scheduler
        .run(
            files,
            &|p: f64| {
                reports.lock().unwrap().push(p);
                cancel.cancel();
            },
            &cancel,
        )
        .await;

    assert!(matches!(outcome, Err(IntakeError::Cancelled)));
    assert_eq!(*reports.lock().unwrap(), vec![50.0]);
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn cancellation_before_start_processes_nothing() {
    let extractor = Arc::new(RecordingExtractor::default());
    let scheduler = scheduler_with(extractor.clone(), 3);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = scheduler.run(vec![pdf("a", 0)], &|_: f64| {}, &cancel).await;

    assert!(matches!(outcome, Err(IntakeError::Cancelled)));
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn per_file_failures_do_not_abort_the_batch() {
    let extractor = Arc::new(RecordingExtractor::default());
    let scheduler = scheduler_with(extractor, 3);
    let files = vec![
        pdf("good-1", 0),
        UploadCandidate::new("notes.txt", "text/plain", vec![0]),
        pdf("bad-1", 0),
        UploadCandidate::new("good-2", MIME_XLSX, vec![0]),
    ];

    let results = scheduler
        .run(files, &|_: f64| {}, &CancellationToken::new())
        .await
        .unwrap();

    let flags: Vec<_> = results.iter().map(|r| r.success()).collect();
    assert_eq!(flags, vec![true, false, false, true]);
    assert_eq!(results[1].error_message(), Some("Unsupported file type: text/plain"));
    assert_eq!(results[2].error_message(), Some("Could not extract required fields"));
}

#[tokio::test]
async fn every_result_is_either_data_or_error() {
    let registry = ExtractorRegistry::new(
        Arc::new(MockInvoiceGenerator::pdf(0.5, false)),
        Arc::new(MockInvoiceGenerator::spreadsheet(0.5, false)),
    );
    let scheduler = BatchScheduler::new(Arc::new(SingleFileProcessor::new(registry)), 3);
    let files: Vec<_> = (0..20u8)
        .map(|i| {
            let content_type = if i % 2 == 0 { MIME_PDF } else { MIME_XLSX };
            UploadCandidate::new(format!("invoice-{}", i), content_type, vec![i; 16])
        })
        .collect();
    let names: Vec<_> = files.iter().map(|f| f.name.clone()).collect();

    let results = scheduler
        .run(files, &|_: f64| {}, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(results.len(), names.len());
    for (result, name) in results.iter().zip(&names) {
        assert_eq!(result.file_name(), name.as_str());
        assert_eq!(result.success(), result.data().is_some());
        assert_eq!(result.success(), result.error_message().is_none());

        if let Some(data) = result.data() {
            let subtotal: f64 = data.items().iter().map(|i| i.quantity() * i.unit_price()).sum();
            assert!((data.subtotal() - subtotal).abs() < 1e-6);
            assert!((data.tax_amount() - subtotal * data.tax_rate() / 100.0).abs() < 1e-6);
            assert!((data.total_amount() - (data.subtotal() + data.tax_amount())).abs() < 1e-6);
        }
    }
}

#[tokio::test]
async fn intake_service_filters_before_scheduling() {
    let config = IntakeConfig {
        max_file_size: 8,
        batch_pause_ms: 0,
        simulate_latency: false,
        pdf_success_rate: 1.0,
        spreadsheet_success_rate: 1.0,
        ..IntakeConfig::default()
    };
    let service = IntakeService::from_config(&config, ExtractorRegistry::simulated(&config));
    let reports = Mutex::new(Vec::new());

    let report = service
        .ingest(
            vec![
                UploadCandidate::new("a.pdf", MIME_PDF, vec![1; 4]),
                UploadCandidate::new("photo.png", "image/png", vec![1; 4]),
                UploadCandidate::new("big.xlsx", MIME_XLSX, vec![1; 9]),
                UploadCandidate::new("b.xlsx", MIME_XLSX, vec![1; 8]),
            ],
            &|p: f64| reports.lock().unwrap().push(p),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let names: Vec<_> = report.invoices.iter().map(|r| r.file_name()).collect();
    assert_eq!(names, vec!["a.pdf", "b.xlsx"]);
    assert_eq!(report.rejected.len(), 2);
    assert!(matches!(report.rejected[0].reason, RejectionReason::UnsupportedType { .. }));
    assert!(matches!(report.rejected[1].reason, RejectionReason::TooLarge { size: 9, max: 8 }));

    let summary = report.summary();
    assert_eq!((summary.total, summary.succeeded, summary.failed), (2, 2, 0));
    assert_eq!(*reports.lock().unwrap(), vec![100.0]);
}
