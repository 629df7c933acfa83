//! Version resolution
//!
//! The backend keeps one row per version. List views show one entry per
//! submission: the row with the numerically greatest version.

use aixiv_common::SubmissionRecord;
use serde::Serialize;
use std::collections::HashMap;

/// The latest version of one submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicalSubmission {
    #[serde(flatten)]
    pub record: SubmissionRecord,

    /// How many versions of this submission the fetch contained
    pub version_count: usize,
}

impl LogicalSubmission {
    pub fn id(&self) -> &str {
        &self.record.logical_id
    }
}

/// Collapse records into one [`LogicalSubmission`] per `logical_id`.
///
/// - Records with an empty `logical_id` are dropped.
/// - Versions compare as floats; unparseable versions count as 1.0.
/// - On equal versions the record later in the input wins.
/// - Output follows the order in which each id was first seen.
pub fn resolve_latest<I>(records: I) -> Vec<LogicalSubmission>
where
    I: IntoIterator<Item = SubmissionRecord>,
{
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut resolved: Vec<LogicalSubmission> = Vec::new();
    let mut dropped = 0usize;

    for record in records {
        if record.logical_id.is_empty() {
            dropped += 1;
            continue;
        }

        match slots.get(&record.logical_id) {
            Some(&slot) => {
                let current = &mut resolved[slot];
                current.version_count += 1;
                if record.version_number() >= current.record.version_number() {
                    current.record = record;
                }
            }
            None => {
                slots.insert(record.logical_id.clone(), resolved.len());
                resolved.push(LogicalSubmission {
                    record,
                    version_count: 1,
                });
            }
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, "Dropped submission records without a logical id");
    }

    resolved
}
