pub mod extractor;
pub mod intake;
pub mod processor;
pub mod scheduler;
pub mod validator;

pub use extractor::{ExtractorRegistry, InvoiceExtractor, MockInvoiceGenerator};
pub use intake::{IntakeReport, IntakeService};
pub use processor::SingleFileProcessor;
pub use scheduler::{BatchScheduler, ProgressReporter};
pub use validator::{FileValidator, RejectedCandidate, RejectionReason, ValidationReport};
