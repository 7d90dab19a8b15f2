use super::processed::ProcessedInvoice;
use serde::Serialize;
use std::io::Write;

/// 批次统计 (总数 / 成功 / 失败)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntakeSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl IntakeSummary {
    pub fn from_results(results: &[ProcessedInvoice]) -> Self {
        let succeeded = results.iter().filter(|r| r.success()).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
        }
    }

    /// 至少一个成功时才允许保存
    pub fn has_successes(&self) -> bool {
        self.succeeded > 0
    }
}

/// 失败文件的纯文本错误日志
pub fn error_log(results: &[ProcessedInvoice]) -> String {
    results
        .iter()
        .filter_map(|r| r.error_message().map(|message| (r.file_name(), message)))
        .map(|(name, message)| format!("File: {}\nError: {}\n\n", name, message))
        .collect()
}

#[derive(Serialize)]
struct ReportRow<'a> {
    status: &'static str,
    file_name: &'a str,
    invoice_number: Option<&'a str>,
    supplier: Option<&'a str>,
    invoice_date: Option<String>,
    total_amount: Option<String>,
}

/// 导出 CSV 报表，每个结果一行
pub fn write_csv_report<W: Write>(results: &[ProcessedInvoice], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    for result in results {
        let data = result.data();
        wtr.serialize(ReportRow {
            status: if result.success() { "Success" } else { "Failed" },
            file_name: result.file_name(),
            invoice_number: data.map(|d| d.invoice_number()),
            supplier: data.map(|d| d.supplier_name()),
            invoice_date: data.map(|d| d.invoice_date().format("%Y-%m-%d").to_string()),
            total_amount: data.map(|d| format!("{:.2}", d.total_amount())),
        })?;
    }

    wtr.flush()?;
    Ok(())
}
