//! Submission source abstraction
//!
//! The catalog only ever needs two things from the backend: "every known
//! submission record" and "one page of records". Implementations:
//! - HTTP (`GET /api/submissions?skip=&limit=`)
//! - In-memory (tests, demos), optionally scripted to fail

use crate::config::BackendConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::models::{SubmissionRecord, SubmissionWire};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};

/// Trait for fetching submission records
#[async_trait]
pub trait SubmissionSource: Send + Sync {
    /// Fetch one window of records, in backend order
    async fn fetch_page(&self, skip: usize, limit: usize) -> Result<Vec<SubmissionRecord>>;

    /// Fetch every record the catalog considers (all versions of all submissions)
    async fn fetch_all(&self) -> Result<Vec<SubmissionRecord>>;

    /// Short name used in logs and metrics
    fn name(&self) -> &str;
}

/// Backend HTTP client
pub struct HttpSubmissionSource {
    client: reqwest::Client,
    base_url: String,
    fetch_limit: usize,
}

impl HttpSubmissionSource {
    /// Create a client for the configured backend
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            fetch_limit: config.fetch_limit,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, skip: usize, limit: usize) -> Result<Vec<SubmissionRecord>> {
        let url = format!("{}/api/submissions", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("skip", skip), ("limit", limit)])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body = body.trim();
            let message = if body.is_empty() {
                format!("HTTP error! status: {}", status)
            } else {
                format!("HTTP error! status: {}: {}", status, body)
            };
            return Err(AppError::upstream_status(status.as_u16(), message));
        }

        let items: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| AppError::upstream(format!("Failed to parse response: {}", e)))?;

        Ok(decode_items(items))
    }
}

/// Decode each item independently; an item that cannot be read at all is
/// skipped instead of failing the whole list.
fn decode_items(items: Vec<serde_json::Value>) -> Vec<SubmissionRecord> {
    let total = items.len();
    let records: Vec<SubmissionRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<SubmissionWire>(item) {
            Ok(wire) => Some(SubmissionRecord::from_wire(wire)),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping undecodable submission record");
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::debug!(total, decoded = records.len(), "Some submission records were skipped");
    }
    records
}

#[async_trait]
impl SubmissionSource for HttpSubmissionSource {
    async fn fetch_page(&self, skip: usize, limit: usize) -> Result<Vec<SubmissionRecord>> {
        let start = Instant::now();
        let result = self.request(skip, limit).await;
        let elapsed = start.elapsed().as_secs_f64();

        match &result {
            Ok(records) => {
                metrics::record_fetch(elapsed, self.name(), records.len(), true);
                tracing::debug!(skip, limit, count = records.len(), "Fetched submissions");
            }
            Err(e) => {
                metrics::record_fetch(elapsed, self.name(), 0, false);
                tracing::warn!(skip, limit, error = %e, "Submission fetch failed");
            }
        }
        result
    }

    async fn fetch_all(&self) -> Result<Vec<SubmissionRecord>> {
        self.fetch_page(0, self.fetch_limit).await
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// In-memory source for testing and demos
pub struct StaticSubmissionSource {
    records: RwLock<Vec<SubmissionRecord>>,
    failures: Mutex<VecDeque<String>>,
    delay: Option<Duration>,
}

impl StaticSubmissionSource {
    pub fn new(records: Vec<SubmissionRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            failures: Mutex::new(VecDeque::new()),
            delay: None,
        }
    }

    /// Sleep before answering each fetch
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace the stored records
    pub fn replace(&self, records: Vec<SubmissionRecord>) {
        if let Ok(mut guard) = self.records.write() {
            *guard = records;
        }
    }

    /// Make the next fetch fail with the given message
    pub fn fail_next(&self, message: impl Into<String>) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push_back(message.into());
        }
    }

    fn take_failure(&self) -> Option<String> {
        self.failures.lock().ok().and_then(|mut f| f.pop_front())
    }
}

#[async_trait]
impl SubmissionSource for StaticSubmissionSource {
    async fn fetch_page(&self, skip: usize, limit: usize) -> Result<Vec<SubmissionRecord>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.take_failure() {
            return Err(AppError::upstream(message));
        }

        let records = self.records.read().map_err(|_| AppError::Internal {
            message: "static source lock poisoned".to_string(),
        })?;
        Ok(records.iter().skip(skip).take(limit).cloned().collect())
    }

    async fn fetch_all(&self) -> Result<Vec<SubmissionRecord>> {
        self.fetch_page(0, usize::MAX).await
    }

    fn name(&self) -> &str {
        "static"
    }
}
