use crate::models::{FileKind, UploadCandidate};
use serde::Serialize;
use thiserror::Error;

/// 文件被拒绝的原因
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum RejectionReason {
    #[error("File type {content_type} is not accepted (PDF or Excel only)")]
    UnsupportedType {
        #[serde(rename = "contentType")]
        content_type: String,
    },

    #[error("File is {size} bytes, larger than the {max} byte limit")]
    TooLarge { size: u64, max: u64 },
}

/// 被拒绝的文件
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedCandidate {
    pub file_name: String,
    #[serde(flatten)]
    pub reason: RejectionReason,
    pub message: String,
}

/// 校验结果：接受的文件保持输入顺序，拒绝的文件单独收集
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub accepted: Vec<UploadCandidate>,
    pub rejected: Vec<RejectedCandidate>,
}

/// 按 MIME 类型和大小预过滤
#[derive(Debug, Clone)]
pub struct FileValidator {
    max_file_size: u64,
}

impl FileValidator {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn check(&self, candidate: &UploadCandidate) -> Result<FileKind, RejectionReason> {
        let kind = candidate.kind().ok_or_else(|| RejectionReason::UnsupportedType {
            content_type: candidate.content_type.clone(),
        })?;

        if candidate.size > self.max_file_size {
            return Err(RejectionReason::TooLarge {
                size: candidate.size,
                max: self.max_file_size,
            });
        }

        Ok(kind)
    }

    pub fn validate(&self, candidates: Vec<UploadCandidate>) -> ValidationReport {
        let mut report = ValidationReport::default();

        for candidate in candidates {
            match self.check(&candidate) {
                Ok(_) => report.accepted.push(candidate),
                Err(reason) => {
                    tracing::warn!("Rejected {}: {}", candidate.name, reason);
                    report.rejected.push(RejectedCandidate {
                        file_name: candidate.name,
                        message: reason.to_string(),
                        reason,
                    });
                }
            }
        }

        report
    }
}
