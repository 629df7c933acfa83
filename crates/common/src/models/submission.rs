//! Submission record entity

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Version assumed for records whose `version` is absent or unparseable
pub const DEFAULT_VERSION: f64 = 1.0;

/// Document type assumed when the backend omits `doc_type`
pub const DEFAULT_DOC_TYPE: &str = "paper";

/// One item of `GET /api/submissions` exactly as it travels.
///
/// Every field may be absent or null, and a wrongly typed field never
/// rejects the whole item. Text fields take strings, numbers, or booleans.
/// List fields take an array of scalars or a single string. Counters
/// accept integers, floats, numeric strings, or garbage (which reads as 0).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionWire {
    #[serde(default, deserialize_with = "lenient_string")]
    pub aixiv_id: Option<String>,
    pub id: Option<Value>,
    pub version: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(rename = "abstract", default, deserialize_with = "lenient_string")]
    pub abstract_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub agent_authors: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub corresponding_author: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub doc_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub views: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub downloads: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub comments: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub citations: u64,
    #[serde(default, deserialize_with = "lenient_list")]
    pub keywords: Option<Vec<String>>,
}

/// Engagement counters; absent values are 0
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionMetrics {
    pub views: u64,
    pub downloads: u64,
    pub comments: u64,
    pub citations: u64,
}

/// A single persisted version of a submission, fully defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubmissionRecord {
    /// Shared by every version of the same submission (`aixiv_id`).
    /// Empty when the backend did not send one.
    pub logical_id: String,

    /// Backend row id, kept for display only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,

    /// Raw version label, e.g. "1.2"
    pub version: String,

    pub title: String,

    #[serde(rename = "abstract")]
    pub abstract_text: String,

    /// Agent authors in display order
    pub authors: Vec<String>,

    pub corresponding_author: String,

    pub doc_type: String,

    pub status: String,

    /// `None` when absent or unparseable; orders before every real instant
    pub created_at: Option<DateTime<Utc>>,

    pub metrics: SubmissionMetrics,

    pub keywords: Vec<String>,
}

/// Display tone for a workflow status label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Published,
    UnderReview,
    RevisionNeeded,
    Draft,
    Neutral,
}

impl SubmissionRecord {
    /// Normalize a transport item. This is the only place defaults are applied.
    pub fn from_wire(wire: SubmissionWire) -> Self {
        let version = wire
            .version
            .as_ref()
            .and_then(scalar_to_string)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "1.0".to_string());

        let doc_type = wire
            .doc_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_DOC_TYPE.to_string());

        Self {
            logical_id: wire.aixiv_id.map(|id| id.trim().to_string()).unwrap_or_default(),
            record_id: wire.id.as_ref().and_then(scalar_to_string),
            version,
            title: wire.title.unwrap_or_default(),
            abstract_text: wire.abstract_text.unwrap_or_default(),
            authors: wire.agent_authors.unwrap_or_default(),
            corresponding_author: wire.corresponding_author.unwrap_or_default(),
            doc_type,
            status: wire.status.unwrap_or_default(),
            created_at: wire.created_at.as_deref().and_then(parse_created_at),
            metrics: SubmissionMetrics {
                views: wire.views,
                downloads: wire.downloads,
                comments: wire.comments,
                citations: wire.citations,
            },
            keywords: wire.keywords.unwrap_or_default(),
        }
    }

    /// Numeric version used for ordering
    pub fn version_number(&self) -> f64 {
        parse_version(&self.version)
    }

    /// True when at least one agent author is listed
    pub fn is_ai_authored(&self) -> bool {
        !self.authors.is_empty()
    }

    pub fn status_tone(&self) -> StatusTone {
        let normalized = self.status.trim().to_lowercase().replace([' ', '_'], "-");
        match normalized.as_str() {
            "published" => StatusTone::Published,
            "under-review" => StatusTone::UnderReview,
            "revision-needed" => StatusTone::RevisionNeeded,
            "draft" => StatusTone::Draft,
            _ => StatusTone::Neutral,
        }
    }
}

impl From<SubmissionWire> for SubmissionRecord {
    fn from(wire: SubmissionWire) -> Self {
        SubmissionRecord::from_wire(wire)
    }
}

/// Parse a version label the way a leading-float parse would: the longest
/// numeric prefix wins ("1.2-rc" is 1.2, "1e2" is 100). No numeric prefix
/// means [`DEFAULT_VERSION`].
pub fn parse_version(raw: &str) -> f64 {
    let trimmed = raw.trim_start();
    let bytes = trimmed.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            has_digits = true;
            end = frac_end;
        }
    }

    if !has_digits {
        return DEFAULT_VERSION;
    }

    // An exponent counts only when it carries at least one digit
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    trimmed[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(DEFAULT_VERSION)
}

/// Parse an ISO-8601 timestamp; bare dates read as midnight UTC and
/// offset-less date-times as UTC.
pub fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Bool(b) => Some(b.to_string()),
        other => scalar_to_string(&other),
    }))
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(items.iter().filter_map(scalar_to_string).collect()),
        Some(Value::String(s)) => Some(vec![s]),
        _ => None,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(count_from_value).unwrap_or(0))
}

fn count_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f > 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
