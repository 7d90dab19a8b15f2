use crate::config::IntakeConfig;
use crate::error::ExtractionError;
use crate::models::{FileKind, InvoiceData, InvoiceHeader, InvoiceItem, InvoiceType, UploadCandidate};
use async_trait::async_trait;
use chrono::{Duration as DateDuration, Local};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

/// 提取策略：文件字节 -> 发票数据
///
/// 真正的 PDF / Excel 解析器实现该 trait 即可替换模拟实现，调度器无需改动。
#[async_trait]
pub trait InvoiceExtractor: Send + Sync {
    async fn extract(&self, candidate: &UploadCandidate) -> Result<InvoiceData, ExtractionError>;
}

/// 按文件类别选择提取策略
#[derive(Clone)]
pub struct ExtractorRegistry {
    pdf: Arc<dyn InvoiceExtractor>,
    spreadsheet: Arc<dyn InvoiceExtractor>,
}

impl ExtractorRegistry {
    pub fn new(pdf: Arc<dyn InvoiceExtractor>, spreadsheet: Arc<dyn InvoiceExtractor>) -> Self {
        Self { pdf, spreadsheet }
    }

    /// 两种类别共用同一个策略
    pub fn uniform(extractor: Arc<dyn InvoiceExtractor>) -> Self {
        Self {
            pdf: extractor.clone(),
            spreadsheet: extractor,
        }
    }

    /// 使用模拟生成器
    pub fn simulated(config: &IntakeConfig) -> Self {
        Self::new(
            Arc::new(MockInvoiceGenerator::pdf(config.pdf_success_rate, config.simulate_latency)),
            Arc::new(MockInvoiceGenerator::spreadsheet(
                config.spreadsheet_success_rate,
                config.simulate_latency,
            )),
        )
    }

    pub fn for_kind(&self, kind: FileKind) -> &dyn InvoiceExtractor {
        match kind {
            FileKind::Pdf => self.pdf.as_ref(),
            FileKind::Spreadsheet => self.spreadsheet.as_ref(),
        }
    }
}

const PDF_FAILURE: &str = "Could not extract required fields from the PDF";
const SPREADSHEET_FAILURE: &str = "Could not map columns in the Excel file to expected fields";

const SUPPLIERS: [&str; 5] = [
    "Tech Solutions Inc.",
    "Office Supplies Ltd.",
    "Global Logistics Co.",
    "Creative Design Agency",
    "Premium Software Services",
];

const CATALOGUE: [(&str, f64); 8] = [
    ("Web Development", 95.0),
    ("Graphic Design", 85.0),
    ("Server Hosting", 120.0),
    ("Technical Support", 75.0),
    ("Software License", 299.0),
    ("Marketing Services", 150.0),
    ("Office Supplies", 45.0),
    ("IT Consulting", 125.0),
];

/// 模拟提取器
///
/// 随机数种子取自文件名和内容，同一个文件总是得到相同结果。
#[derive(Debug, Clone)]
pub struct MockInvoiceGenerator {
    success_rate: f64,
    /// 模拟耗时区间 (毫秒)，None 表示不等待
    latency_ms: Option<(u64, u64)>,
    failure_message: &'static str,
}

impl MockInvoiceGenerator {
    pub fn pdf(success_rate: f64, simulate_latency: bool) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
            latency_ms: simulate_latency.then_some((500, 1500)),
            failure_message: PDF_FAILURE,
        }
    }

    pub fn spreadsheet(success_rate: f64, simulate_latency: bool) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
            latency_ms: simulate_latency.then_some((300, 1000)),
            failure_message: SPREADSHEET_FAILURE,
        }
    }

    fn rng_for(candidate: &UploadCandidate) -> StdRng {
        let mut hasher = DefaultHasher::new();
        candidate.name.hash(&mut hasher);
        candidate.bytes.hash(&mut hasher);
        StdRng::seed_from_u64(hasher.finish())
    }

    fn generate(file_name: &str, rng: &mut StdRng) -> Result<InvoiceData, ExtractionError> {
        let invoice_number = format!("INV-{}", rng.gen_range(10000..100000));

        let today = Local::now().date_naive();
        let invoice_date = today - DateDuration::days(rng.gen_range(0..30));
        let due_date = invoice_date + DateDuration::days(30);

        let item_count = rng.gen_range(1..=5);
        let mut items = Vec::with_capacity(item_count);
        for _ in 0..item_count {
            let (description, unit_price) = CATALOGUE[rng.gen_range(0..CATALOGUE.len())];
            let quantity = rng.gen_range(1..=5) as f64;
            items.push(InvoiceItem::new(description, quantity, unit_price)?);
        }

        let header = InvoiceHeader {
            invoice_number,
            supplier_name: SUPPLIERS.choose(rng).copied().unwrap_or(SUPPLIERS[0]).to_string(),
            supplier_address: None,
            invoice_date,
            due_date,
            invoice_type: InvoiceType::ALL.choose(rng).copied().unwrap_or(InvoiceType::Other),
            notes: Some(format!("Generated from file: {}", file_name)),
        };
        let tax_rate = rng.gen_range(5..=15) as f64;

        Ok(InvoiceData::new(header, items, tax_rate)?)
    }
}

#[async_trait]
impl InvoiceExtractor for MockInvoiceGenerator {
    async fn extract(&self, candidate: &UploadCandidate) -> Result<InvoiceData, ExtractionError> {
        let mut rng = Self::rng_for(candidate);

        if let Some((min, max)) = self.latency_ms {
            let delay = rng.gen_range(min..=max);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if !rng.gen_bool(self.success_rate) {
            return Err(ExtractionError::Extraction(self.failure_message.to_string()));
        }

        Self::generate(&candidate.name, &mut rng)
    }
}
