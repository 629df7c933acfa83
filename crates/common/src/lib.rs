//! aiXiv Common Library
//!
//! Shared code for the aiXiv catalog crates including:
//! - Submission record model and transport normalization
//! - Submission source abstraction (backend HTTP client, in-memory)
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod source;

// Re-export commonly used types
pub use errors::{AppError, Result};
pub use config::AppConfig;
pub use models::{SubmissionMetrics, SubmissionRecord, SubmissionWire};
pub use source::{HttpSubmissionSource, StaticSubmissionSource, SubmissionSource};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of records requested when fetching the whole catalog
pub const DEFAULT_FETCH_LIMIT: usize = 1000;

/// Default page size for list views
pub const DEFAULT_PAGE_SIZE: usize = 3;
