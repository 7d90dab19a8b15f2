use super::candidate::UploadCandidate;
use super::invoice::InvoiceData;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// 单文件处理结果：成功带数据，失败带错误信息，二者互斥
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingOutcome {
    Extracted(InvoiceData),
    Failed(String),
}

/// 流水线输出单元，创建后不可变
#[derive(Debug, Clone)]
pub struct ProcessedInvoice {
    file_name: String,
    file_type: String,
    outcome: ProcessingOutcome,
    source: Arc<UploadCandidate>,
}

impl ProcessedInvoice {
    pub fn extracted(source: Arc<UploadCandidate>, data: InvoiceData) -> Self {
        Self::with_outcome(source, ProcessingOutcome::Extracted(data))
    }

    pub fn failed(source: Arc<UploadCandidate>, message: impl Into<String>) -> Self {
        Self::with_outcome(source, ProcessingOutcome::Failed(message.into()))
    }

    fn with_outcome(source: Arc<UploadCandidate>, outcome: ProcessingOutcome) -> Self {
        Self {
            file_name: source.name.clone(),
            file_type: source.content_type.clone(),
            outcome,
            source,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    pub fn success(&self) -> bool {
        matches!(self.outcome, ProcessingOutcome::Extracted(_))
    }

    pub fn data(&self) -> Option<&InvoiceData> {
        match &self.outcome {
            ProcessingOutcome::Extracted(data) => Some(data),
            ProcessingOutcome::Failed(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            ProcessingOutcome::Extracted(_) => None,
            ProcessingOutcome::Failed(message) => Some(message),
        }
    }

    pub fn outcome(&self) -> &ProcessingOutcome {
        &self.outcome
    }

    /// 原始上传文件
    pub fn source(&self) -> &UploadCandidate {
        &self.source
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessedInvoiceView<'a> {
    file_name: &'a str,
    file_type: &'a str,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a InvoiceData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<&'a str>,
}

impl Serialize for ProcessedInvoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ProcessedInvoiceView {
            file_name: &self.file_name,
            file_type: &self.file_type,
            success: self.success(),
            data: self.data(),
            error_message: self.error_message(),
        }
        .serialize(serializer)
    }
}
