pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use error::{ConfigError, ExtractionError, IntakeError, InvoiceError};
pub use service::{BatchScheduler, IntakeService, SingleFileProcessor};
