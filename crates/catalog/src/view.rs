//! Per-view load state machine
//!
//! Each list view owns one [`CatalogView`]:
//!
//! ```text
//! Idle ──► Loading ──► Loaded
//!             ▲   └──► Failed
//!             └──────────┘ (query/filter/sort change, retry)
//! ```
//!
//! Fetches are tagged with a monotonically increasing sequence number. Only
//! the result of the most recently issued fetch is applied; older results are
//! dropped, and starting a new fetch cancels the previous one at the I/O
//! boundary. Loaded data is retained while a new fetch is in flight and when
//! it fails. Page navigation re-slices the retained data without fetching;
//! query, filter, and sort changes re-slice it too, so a snapshot always
//! describes the parameters it reports, even while the refetch is pending.

use crate::filter::CatalogFilter;
use crate::paginate::{clamp_page, Paginator};
use crate::pipeline::{self, CatalogPage};
use crate::resolver::{resolve_latest, LogicalSubmission};
use crate::sort::SortKey;
use aixiv_common::{metrics, AppError, Result, SubmissionRecord, SubmissionSource};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Message used when an error renders as an empty string
const FALLBACK_ERROR: &str = "Failed to load submissions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Parameters the reader controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub current_page: u32,
    pub page_size: usize,
    pub sort: SortKey,
    pub filter: CatalogFilter,
}

/// Handle for one issued fetch
#[derive(Debug, Clone)]
pub struct FetchTicket {
    seq: u64,
    cancel: CancellationToken,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Read-only picture of a view, as handed to renderers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub items: Vec<LogicalSubmission>,
    pub total_matching: usize,
    pub current_page: u32,
    pub total_pages: usize,
    pub status: LoadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub page_size: usize,
    pub sort: SortKey,
    pub filter: CatalogFilter,
}

pub struct CatalogView {
    state: ViewState,
    paginator: Paginator,
    status: LoadStatus,
    error: Option<String>,
    has_loaded: bool,
    resolved: Vec<LogicalSubmission>,
    page: CatalogPage,
    latest_seq: u64,
    in_flight: Option<CancellationToken>,
}

impl CatalogView {
    pub fn new(page_size: usize) -> Result<Self> {
        let paginator = Paginator::new(page_size)?;
        Ok(Self {
            state: ViewState {
                current_page: 1,
                page_size: paginator.page_size(),
                sort: SortKey::default(),
                filter: CatalogFilter::default(),
            },
            page: paginator.paginate(Vec::new(), 1),
            paginator,
            status: LoadStatus::Idle,
            error: None,
            has_loaded: false,
            resolved: Vec::new(),
            latest_seq: 0,
            in_flight: None,
        })
    }

    /// Set the initial filter without requesting a fetch
    pub fn with_filter(mut self, filter: CatalogFilter) -> Self {
        self.state.filter = filter;
        self
    }

    /// Set the initial ordering without requesting a fetch
    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.state.sort = sort;
        self
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Change the free-text query. Returns true when a fetch should follow.
    pub fn set_query(&mut self, query: impl Into<String>) -> bool {
        let query = query.into();
        if self.state.filter.query == query {
            return false;
        }
        self.state.filter.query = query;
        self.state.current_page = 1;
        self.reslice();
        true
    }

    /// Replace the whole filter. Returns true when a fetch should follow.
    pub fn set_filter(&mut self, filter: CatalogFilter) -> bool {
        if self.state.filter == filter {
            return false;
        }
        self.state.filter = filter;
        self.state.current_page = 1;
        self.reslice();
        true
    }

    /// Change the ordering. Returns true when a fetch should follow.
    pub fn set_sort(&mut self, sort: SortKey) -> bool {
        if self.state.sort == sort {
            return false;
        }
        self.state.sort = sort;
        self.state.current_page = 1;
        self.reslice();
        true
    }

    /// Navigate to another page of the retained data
    pub fn set_page(&mut self, page: u32) {
        self.state.current_page = clamp_page(page);
        self.reslice();
    }

    /// Enter `Loading` and issue a new fetch ticket, cancelling any fetch in flight
    pub fn begin_fetch(&mut self) -> FetchTicket {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }

        self.latest_seq += 1;
        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());
        self.status = LoadStatus::Loading;
        self.error = None;

        debug!(seq = self.latest_seq, "Catalog fetch started");

        FetchTicket {
            seq: self.latest_seq,
            cancel,
        }
    }

    /// Apply the result of a fetch. Returns false when the ticket was superseded
    /// and the result was dropped.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<Vec<SubmissionRecord>>) -> bool {
        if ticket.seq != self.latest_seq {
            debug!(
                seq = ticket.seq,
                latest = self.latest_seq,
                "Dropping result of superseded fetch"
            );
            metrics::record_stale_response();
            return false;
        }

        self.in_flight = None;

        match result {
            Ok(records) => {
                self.resolved = resolve_latest(records);
                self.has_loaded = true;
                self.status = LoadStatus::Loaded;
                self.error = None;
                self.rederive();
                debug!(
                    seq = ticket.seq,
                    submissions = self.resolved.len(),
                    total_matching = self.page.total_matching,
                    "Catalog fetch applied"
                );
            }
            Err(e) => {
                let message = e.to_string();
                warn!(seq = ticket.seq, error = %message, "Catalog fetch failed");
                self.status = LoadStatus::Failed;
                self.error = Some(if message.trim().is_empty() {
                    FALLBACK_ERROR.to_string()
                } else {
                    message
                });
            }
        }

        true
    }

    /// Abandon the fetch in flight, if any. Its result will be dropped.
    pub fn abort(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
            self.latest_seq += 1;
            self.status = if self.has_loaded {
                LoadStatus::Loaded
            } else {
                LoadStatus::Idle
            };
        }
    }

    /// Fetch from `source` and apply the result
    pub async fn refresh(&mut self, source: &dyn SubmissionSource) -> bool {
        let ticket = self.begin_fetch();
        let result = fetch(&ticket, source).await;
        self.complete(ticket, result)
    }

    /// Repeat the fetch after a failure
    pub async fn retry(&mut self, source: &dyn SubmissionSource) -> bool {
        self.refresh(source).await
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            items: self.page.items.clone(),
            total_matching: self.page.total_matching,
            current_page: self.page.current_page,
            total_pages: self.page.total_pages,
            status: self.status,
            error: self.error.clone(),
            page_size: self.state.page_size,
            sort: self.state.sort,
            filter: self.state.filter.clone(),
        }
    }

    /// Bring the rendered page in line with the current parameters,
    /// using retained data when there is any
    fn reslice(&mut self) {
        if self.has_loaded {
            self.rederive();
        } else {
            self.page.current_page = self.state.current_page;
        }
    }

    fn rederive(&mut self) {
        self.page = pipeline::derive(
            self.resolved.clone(),
            &self.state.filter,
            self.state.sort,
            &self.paginator,
            self.state.current_page,
        );
    }
}

/// Run the I/O for `ticket`, giving up as soon as the ticket is cancelled
pub async fn fetch(ticket: &FetchTicket, source: &dyn SubmissionSource) -> Result<Vec<SubmissionRecord>> {
    tokio::select! {
        _ = ticket.cancel.cancelled() => Err(AppError::FetchCancelled),
        result = source.fetch_all() => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aixiv_common::models::parse_created_at;
    use aixiv_common::{StaticSubmissionSource, SubmissionMetrics};
    use std::time::Duration;

    fn record(id: &str, version: &str, created: &str, views: u64) -> SubmissionRecord {
        SubmissionRecord {
            logical_id: id.to_string(),
            version: version.to_string(),
            title: format!("{id} paper"),
            created_at: parse_created_at(created),
            metrics: SubmissionMetrics {
                views,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn sample() -> Vec<SubmissionRecord> {
        vec![
            record("P1", "1.0", "2024-01-01", 5),
            record("P1", "1.1", "2024-01-02", 9),
            record("P2", "1.0", "2024-01-03", 1),
        ]
    }

    fn ids(snapshot: &ViewSnapshot) -> Vec<&str> {
        snapshot.items.iter().map(|s| s.id()).collect()
    }

    #[test]
    fn test_new_view_is_idle_and_empty() {
        let view = CatalogView::new(3).unwrap();
        let snapshot = view.snapshot();
        assert_eq!(snapshot.status, LoadStatus::Idle);
        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.current_page, 1);
        assert_eq!(snapshot.total_pages, 0);
        assert!(snapshot.error.is_none());
        assert!(CatalogView::new(0).is_err());
    }

    #[tokio::test]
    async fn test_refresh_loads_and_paginates() {
        let source = StaticSubmissionSource::new(sample());
        let mut view = CatalogView::new(1).unwrap();

        assert!(view.refresh(&source).await);
        let snapshot = view.snapshot();
        assert_eq!(snapshot.status, LoadStatus::Loaded);
        assert_eq!(ids(&snapshot), vec!["P2"]);
        assert_eq!(snapshot.total_pages, 2);

        view.set_page(2);
        let snapshot = view.snapshot();
        assert_eq!(snapshot.status, LoadStatus::Loaded);
        assert_eq!(ids(&snapshot), vec!["P1"]);
        assert_eq!(snapshot.items[0].record.version, "1.1");

        view.set_page(3);
        assert!(view.snapshot().items.is_empty());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_items_and_retry_recovers() {
        let source = StaticSubmissionSource::new(sample());
        let mut view = CatalogView::new(3).unwrap();
        view.refresh(&source).await;
        let loaded = view.snapshot();

        source.fail_next("HTTP error! status: 503");
        assert!(view.refresh(&source).await);
        let failed = view.snapshot();
        assert_eq!(failed.status, LoadStatus::Failed);
        assert_eq!(failed.items, loaded.items);
        let error = failed.error.expect("failed view carries an error");
        assert!(error.contains("503"));

        let ticket = view.begin_fetch();
        assert_eq!(view.status(), LoadStatus::Loading);
        assert!(view.error().is_none());
        assert_eq!(view.snapshot().items, loaded.items);
        view.complete(ticket, source.fetch_all().await);
        assert_eq!(view.status(), LoadStatus::Loaded);

        source.fail_next("down again");
        view.retry(&source).await;
        assert_eq!(view.status(), LoadStatus::Failed);
        view.retry(&source).await;
        assert_eq!(view.status(), LoadStatus::Loaded);
        assert!(view.error().is_none());
    }

    #[tokio::test]
    async fn test_first_fetch_failure_leaves_empty_items() {
        let source = StaticSubmissionSource::new(sample());
        source.fail_next("connection refused");
        let mut view = CatalogView::new(3).unwrap();

        view.refresh(&source).await;
        let snapshot = view.snapshot();
        assert_eq!(snapshot.status, LoadStatus::Failed);
        assert!(snapshot.items.is_empty());
        assert!(!snapshot.error.unwrap().is_empty());
    }

    #[test]
    fn test_superseded_result_is_dropped() {
        let mut view = CatalogView::new(3).unwrap();
        let first = view.begin_fetch();
        let second = view.begin_fetch();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(second.seq() > first.seq());

        assert!(view.complete(second, Ok(vec![record("NEW", "1.0", "2024-02-01", 0)])));
        assert!(!view.complete(first, Ok(vec![record("OLD", "1.0", "2024-01-01", 0)])));

        let snapshot = view.snapshot();
        assert_eq!(ids(&snapshot), vec!["NEW"]);
        assert_eq!(snapshot.status, LoadStatus::Loaded);
    }

    #[test]
    fn test_late_failure_of_superseded_fetch_is_ignored() {
        let mut view = CatalogView::new(3).unwrap();
        let first = view.begin_fetch();
        let second = view.begin_fetch();
        view.complete(second, Ok(sample()));
        assert!(!view.complete(first, Err(AppError::upstream("timed out"))));
        assert_eq!(view.status(), LoadStatus::Loaded);
        assert!(view.error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_fetch_returns_early() {
        let slow = StaticSubmissionSource::new(vec![record("OLD", "1.0", "2024-01-01", 0)])
            .with_delay(Duration::from_secs(30));
        let fast = StaticSubmissionSource::new(vec![record("NEW", "1.0", "2024-02-01", 0)]);

        let mut view = CatalogView::new(3).unwrap();
        let first = view.begin_fetch();
        let second = view.begin_fetch();

        let (old, new) = futures::join!(fetch(&first, &slow), fetch(&second, &fast));
        assert!(matches!(old, Err(AppError::FetchCancelled)));

        assert!(view.complete(second, new));
        assert!(!view.complete(first, old));
        assert_eq!(ids(&view.snapshot()), vec!["NEW"]);
    }

    #[test]
    fn test_parameter_changes_reset_page() {
        let mut view = CatalogView::new(1).unwrap();
        let ticket = view.begin_fetch();
        view.complete(ticket, Ok(sample()));
        view.set_page(2);
        assert_eq!(view.state().current_page, 2);

        assert!(view.set_query("paper"));
        assert_eq!(view.state().current_page, 1);
        assert!(!view.set_query("paper"));

        view.set_page(2);
        assert!(view.set_sort(SortKey::MostViewed));
        assert_eq!(view.state().current_page, 1);
        assert!(!view.set_sort(SortKey::MostViewed));

        view.set_page(2);
        assert!(view.set_filter(CatalogFilter::query("paper").with_doc_type("paper")));
        assert_eq!(view.state().current_page, 1);

        view.set_page(0);
        assert_eq!(view.state().current_page, 1);
    }

    #[tokio::test]
    async fn test_snapshot_follows_new_parameters_while_refetching() {
        let source = StaticSubmissionSource::new(vec![
            record("A", "1.0", "2024-01-01", 50),
            record("B", "1.0", "2024-01-02", 1),
        ]);
        let mut view = CatalogView::new(1).unwrap();
        view.refresh(&source).await;
        view.set_page(2);
        assert_eq!(ids(&view.snapshot()), vec!["A"]);

        assert!(view.set_sort(SortKey::MostViewed));
        let ticket = view.begin_fetch();
        let loading = view.snapshot();
        assert_eq!(loading.status, LoadStatus::Loading);
        assert_eq!(loading.current_page, 1);
        assert_eq!(loading.sort, SortKey::MostViewed);
        assert_eq!(ids(&loading), vec!["A"]);

        view.complete(ticket, Err(AppError::upstream("connection reset")));
        let failed = view.snapshot();
        assert_eq!(failed.status, LoadStatus::Failed);
        assert_eq!(failed.current_page, view.state().current_page);
        assert_eq!(failed.current_page, 1);
        assert_eq!(ids(&failed), vec!["A"]);
        assert_eq!(failed.total_pages, 2);

        assert!(view.set_query("B paper"));
        let narrowed = view.snapshot();
        assert_eq!(ids(&narrowed), vec!["B"]);
        assert_eq!(narrowed.total_matching, 1);
    }

    #[test]
    fn test_page_navigation_does_not_fetch() {
        let mut view = CatalogView::new(1).unwrap();
        let ticket = view.begin_fetch();
        view.complete(ticket, Ok(sample()));

        view.set_page(2);
        assert_eq!(view.status(), LoadStatus::Loaded);
        let next = view.begin_fetch();
        assert_eq!(next.seq(), 2);
    }

    #[test]
    fn test_abort_drops_in_flight_result() {
        let mut view = CatalogView::new(3).unwrap();
        let ticket = view.begin_fetch();
        view.abort();
        assert!(ticket.is_cancelled());
        assert_eq!(view.status(), LoadStatus::Idle);
        assert!(!view.complete(ticket, Ok(sample())));
        assert!(view.snapshot().items.is_empty());
    }

    #[test]
    fn test_snapshot_serialization() {
        let mut view = CatalogView::new(2)
            .unwrap()
            .with_sort(SortKey::MostViewed)
            .with_filter(CatalogFilter::query("paper"));
        let ticket = view.begin_fetch();
        view.complete(ticket, Ok(sample()));

        let json = serde_json::to_value(view.snapshot()).unwrap();
        assert_eq!(json["status"], "loaded");
        assert_eq!(json["sort"], "most-viewed");
        assert_eq!(json["total_matching"], 2);
        assert_eq!(json["items"][0]["logical_id"], "P1");
        assert_eq!(json["items"][0]["version_count"], 2);
        assert!(json.get("error").is_none());
    }
}
