use serde::Serialize;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_XLS: &str = "application/vnd.ms-excel";
pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// 支持的文件类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Spreadsheet,
}

impl FileKind {
    /// 按 MIME 类型分类，不支持的类型返回 None
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            MIME_PDF => Some(Self::Pdf),
            MIME_XLS | MIME_XLSX => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

/// 待处理文件 (只读)
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl UploadCandidate {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    pub fn kind(&self) -> Option<FileKind> {
        FileKind::from_content_type(&self.content_type)
    }
}
