pub mod candidate;
pub mod invoice;
pub mod processed;
pub mod summary;

pub use candidate::{FileKind, UploadCandidate, MIME_PDF, MIME_XLS, MIME_XLSX};
pub use invoice::{InvoiceData, InvoiceDraft, InvoiceHeader, InvoiceItem, InvoiceType, ItemDraft};
pub use processed::{ProcessedInvoice, ProcessingOutcome};
pub use summary::{error_log, write_csv_report, IntakeSummary};
