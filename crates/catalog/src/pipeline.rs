//! Resolve → filter → sort → paginate
//!
//! Stage order is fixed: filtering before sorting, and resolution before
//! both, so counts always refer to latest versions only.

use crate::filter::CatalogFilter;
use crate::paginate::{Page, Paginator};
use crate::resolver::{resolve_latest, LogicalSubmission};
use crate::sort::SortKey;
use aixiv_common::{metrics, Result, SubmissionRecord, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Parameters of one list view evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub filter: CatalogFilter,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn first_page() -> u32 { 1 }
fn default_page_size() -> usize { DEFAULT_PAGE_SIZE }

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            filter: CatalogFilter::default(),
            sort: SortKey::default(),
            page: first_page(),
            page_size: default_page_size(),
        }
    }
}

/// The page a list view renders
pub type CatalogPage = Page<LogicalSubmission>;

/// Run every stage over a freshly fetched record list
pub fn run(records: Vec<SubmissionRecord>, query: &CatalogQuery) -> Result<CatalogPage> {
    let paginator = Paginator::new(query.page_size)?;
    let resolved = resolve_latest(records);
    Ok(derive(resolved, &query.filter, query.sort, &paginator, query.page))
}

/// Filter, sort, and paginate already-resolved submissions
pub fn derive(
    resolved: Vec<LogicalSubmission>,
    filter: &CatalogFilter,
    sort: SortKey,
    paginator: &Paginator,
    page: u32,
) -> CatalogPage {
    let start = Instant::now();

    let matching = filter.apply(resolved);
    let ordered = sort.sort(matching);
    let page = paginator.paginate(ordered, page);

    metrics::record_pipeline(start.elapsed().as_secs_f64(), sort.as_str(), page.total_matching);
    tracing::trace!(
        sort = %sort,
        total_matching = page.total_matching,
        current_page = page.current_page,
        total_pages = page.total_pages,
        "Catalog view derived"
    );

    page
}
