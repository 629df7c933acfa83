//! aiXiv Submission Catalog
//!
//! Turns the flat list of submission records served by the backend into the
//! list views shown to readers:
//!
//! 1. [`resolver`] collapses every version of a submission into the latest one
//! 2. [`filter`] keeps submissions matching a free-text query and labels
//! 3. [`sort`] orders them by one of the named [`SortKey`]s
//! 4. [`paginate`] slices the result into fixed-size pages
//!
//! [`pipeline`] composes the four stages for one-shot use, [`view`] wraps them in
//! the per-view load state machine, and [`highlights`] builds the home-page
//! "trending" and "latest" cards.
//!
//! Every stage is a pure function over owned values; nothing is patched in place.

pub mod filter;
pub mod highlights;
pub mod paginate;
pub mod pipeline;
pub mod resolver;
pub mod sort;
pub mod view;

pub use filter::CatalogFilter;
pub use highlights::{Highlights, LatestCard, TrendingCard};
pub use paginate::{Page, Paginator};
pub use pipeline::{CatalogPage, CatalogQuery};
pub use resolver::LogicalSubmission;
pub use sort::SortKey;
pub use view::{CatalogView, FetchTicket, LoadStatus, ViewSnapshot, ViewState};
