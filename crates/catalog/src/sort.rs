//! Display orderings
//!
//! Every ordering is applied with a stable sort, so submissions with equal
//! keys keep their relative order.

use crate::resolver::LogicalSubmission;
use aixiv_common::{AppError, SubmissionRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Named list orderings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// `created_at` descending
    #[default]
    Newest,
    /// `created_at` ascending
    Oldest,
    MostViewed,
    MostDownloaded,
    MostDiscussed,
    MostCited,
    /// Views descending, then downloads descending
    Trending,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Newest,
        SortKey::Oldest,
        SortKey::MostViewed,
        SortKey::MostDownloaded,
        SortKey::MostDiscussed,
        SortKey::MostCited,
        SortKey::Trending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::MostViewed => "most-viewed",
            SortKey::MostDownloaded => "most-downloaded",
            SortKey::MostDiscussed => "most-discussed",
            SortKey::MostCited => "most-cited",
            SortKey::Trending => "trending",
        }
    }

    /// Primary-key comparison; `Equal` leaves the stable sort to keep input order.
    /// Missing timestamps order before every real one.
    pub fn compare(&self, a: &SubmissionRecord, b: &SubmissionRecord) -> Ordering {
        match self {
            SortKey::Newest => b.created_at.cmp(&a.created_at),
            SortKey::Oldest => a.created_at.cmp(&b.created_at),
            SortKey::MostViewed => b.metrics.views.cmp(&a.metrics.views),
            SortKey::MostDownloaded => b.metrics.downloads.cmp(&a.metrics.downloads),
            SortKey::MostDiscussed => b.metrics.comments.cmp(&a.metrics.comments),
            SortKey::MostCited => b.metrics.citations.cmp(&a.metrics.citations),
            SortKey::Trending => b
                .metrics
                .views
                .cmp(&a.metrics.views)
                .then_with(|| b.metrics.downloads.cmp(&a.metrics.downloads)),
        }
    }

    /// Return the items in this order
    pub fn sort(&self, mut items: Vec<LogicalSubmission>) -> Vec<LogicalSubmission> {
        items.sort_by(|a, b| self.compare(&a.record, &b.record));
        items
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == wanted)
            .ok_or_else(|| AppError::InvalidSortKey {
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aixiv_common::models::parse_created_at;
    use aixiv_common::SubmissionMetrics;

    fn item(id: &str, created: &str, views: u64, downloads: u64) -> LogicalSubmission {
        LogicalSubmission {
            record: SubmissionRecord {
                logical_id: id.to_string(),
                created_at: parse_created_at(created),
                metrics: SubmissionMetrics {
                    views,
                    downloads,
                    comments: views % 7,
                    citations: downloads % 5,
                },
                ..Default::default()
            },
            version_count: 1,
        }
    }

    fn ids(items: &[LogicalSubmission]) -> Vec<&str> {
        items.iter().map(|s| s.id()).collect()
    }

    #[test]
    fn test_parse_names() {
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
        }
        assert_eq!("Most_Viewed".parse::<SortKey>().unwrap(), SortKey::MostViewed);
        assert!(matches!(
            "loudest".parse::<SortKey>(),
            Err(AppError::InvalidSortKey { .. })
        ));
    }

    #[test]
    fn test_newest_and_oldest() {
        let items = vec![
            item("a", "2024-01-02", 0, 0),
            item("b", "2024-01-03", 0, 0),
            item("c", "not a date", 0, 0),
            item("d", "2024-01-01", 0, 0),
        ];
        assert_eq!(ids(&SortKey::Newest.sort(items.clone())), vec!["b", "a", "d", "c"]);
        assert_eq!(ids(&SortKey::Oldest.sort(items)), vec!["c", "d", "a", "b"]);
    }

    #[test]
    fn test_metric_orderings() {
        let items = vec![
            item("a", "2024-01-01", 10, 1),
            item("b", "2024-01-01", 30, 3),
            item("c", "2024-01-01", 20, 9),
        ];
        assert_eq!(ids(&SortKey::MostViewed.sort(items.clone())), vec!["b", "c", "a"]);
        assert_eq!(ids(&SortKey::MostDownloaded.sort(items.clone())), vec!["c", "b", "a"]);
        // comments = views % 7: a=3, b=2, c=6
        assert_eq!(ids(&SortKey::MostDiscussed.sort(items.clone())), vec!["c", "a", "b"]);
        // citations = downloads % 5: a=1, b=3, c=4
        assert_eq!(ids(&SortKey::MostCited.sort(items)), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_trending_breaks_view_ties_by_downloads() {
        let items = vec![
            item("a", "2024-01-01", 50, 1),
            item("b", "2024-01-01", 50, 8),
            item("c", "2024-01-01", 90, 0),
        ];
        assert_eq!(ids(&SortKey::Trending.sort(items)), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let newest_first = SortKey::Newest.sort(vec![
            item("a", "2024-01-01", 0, 0),
            item("b", "2024-01-03", 0, 0),
            item("c", "2024-01-02", 0, 0),
        ]);
        let before = ids(&newest_first).into_iter().map(String::from).collect::<Vec<_>>();

        let by_views = SortKey::MostViewed.sort(newest_first);
        assert_eq!(ids(&by_views), before);
    }
}
