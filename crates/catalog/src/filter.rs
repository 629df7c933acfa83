//! Free-text and label filtering
//!
//! Plain case-insensitive substring matching over title, abstract, authors,
//! and keywords. No tokenization or ranking.

use crate::resolver::LogicalSubmission;
use aixiv_common::SubmissionRecord;
use serde::{Deserialize, Serialize};

/// Label value that disables a label filter
pub const ALL: &str = "all";

/// Filter applied to resolved submissions. All parts are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    /// Free-text query; empty matches everything
    #[serde(default)]
    pub query: String,

    /// Exact `doc_type` match; `None` or `"all"` bypasses
    #[serde(default)]
    pub doc_type: Option<String>,

    /// Exact `status` match; `None` or `"all"` bypasses
    #[serde(default)]
    pub status: Option<String>,
}

impl CatalogFilter {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// True when every record passes
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && label_bypassed(&self.doc_type) && label_bypassed(&self.status)
    }

    pub fn matches(&self, record: &SubmissionRecord) -> bool {
        self.matches_labels(record) && matches_text(record, &self.query.to_lowercase())
    }

    fn matches_labels(&self, record: &SubmissionRecord) -> bool {
        label_matches(&self.doc_type, &record.doc_type) && label_matches(&self.status, &record.status)
    }

    /// Keep the submissions that match, preserving order
    pub fn apply(&self, items: Vec<LogicalSubmission>) -> Vec<LogicalSubmission> {
        if self.is_empty() {
            return items;
        }

        let needle = self.query.to_lowercase();
        items
            .into_iter()
            .filter(|s| self.matches_labels(&s.record) && matches_text(&s.record, &needle))
            .collect()
    }
}

fn label_bypassed(label: &Option<String>) -> bool {
    match label {
        None => true,
        Some(value) => value.is_empty() || value == ALL,
    }
}

fn label_matches(wanted: &Option<String>, actual: &str) -> bool {
    label_bypassed(wanted) || wanted.as_deref() == Some(actual)
}

/// `needle` must already be lower-cased
fn matches_text(record: &SubmissionRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    let contains = |haystack: &str| haystack.to_lowercase().contains(needle);

    contains(&record.title)
        || contains(&record.abstract_text)
        || record.authors.iter().any(|a| contains(a))
        || record.keywords.iter().any(|k| contains(k))
}
