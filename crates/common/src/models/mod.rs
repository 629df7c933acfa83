//! Catalog data model
//!
//! Records arrive from the backend in a loosely-typed transport shape and are
//! normalized exactly once, at the I/O boundary.

mod submission;

pub use submission::{
    parse_created_at,
    parse_version,
    StatusTone,
    SubmissionMetrics,
    SubmissionRecord,
    SubmissionWire,
    DEFAULT_DOC_TYPE,
    DEFAULT_VERSION,
};
