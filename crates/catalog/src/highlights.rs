//! Home-page highlight cards
//!
//! "Trending" is the top of the `trending` ordering annotated with an
//! engagement-per-day score; "latest" is the top of the `newest` ordering
//! annotated with a relative age.

use crate::resolver::{resolve_latest, LogicalSubmission};
use crate::sort::SortKey;
use aixiv_common::models::StatusTone;
use aixiv_common::SubmissionRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Upper bound of the trend score
pub const MAX_TREND_SCORE: u64 = 99;

const UNKNOWN_AUTHOR: &str = "Unknown Author";
const DEFAULT_STATUS: &str = "Published";
const UNKNOWN_AGE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingCard {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub corresponding_author: String,
    pub views: u64,
    pub downloads: u64,
    pub is_ai: bool,
    /// e.g. "+42%"
    pub trend: String,
    pub doc_type: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestCard {
    pub id: String,
    pub title: String,
    pub author: String,
    pub status: String,
    /// Badge colour for `status`
    pub tone: StatusTone,
    pub time_ago: String,
    pub is_new: bool,
    pub doc_type: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlights {
    pub trending: Vec<TrendingCard>,
    pub latest: Vec<LatestCard>,
}

impl Highlights {
    /// Resolve `records` and build both card lists with `count` entries each
    pub fn build(records: Vec<SubmissionRecord>, count: usize, now: DateTime<Utc>) -> Self {
        let resolved = resolve_latest(records);
        Self {
            trending: trending(resolved.clone(), count, now),
            latest: latest(resolved, count, now),
        }
    }
}

/// Engagement per day of age, capped at [`MAX_TREND_SCORE`].
///
/// Engagement weighs a download as three views and a citation as five.
/// Ages under a day, in the future, or unknown count as one day.
pub fn trend_score(record: &SubmissionRecord, now: DateTime<Utc>) -> u64 {
    let m = &record.metrics;
    let engagement = m
        .views
        .saturating_add(m.downloads.saturating_mul(3))
        .saturating_add(m.citations.saturating_mul(5));

    let days = record
        .created_at
        .map(|created| (now - created).num_days())
        .unwrap_or(1)
        .max(1) as u64;

    (engagement / days).min(MAX_TREND_SCORE)
}

pub fn trend_label(record: &SubmissionRecord, now: DateTime<Utc>) -> String {
    format!("+{}%", trend_score(record, now))
}

/// Coarse relative age: "Just now", "N hour(s) ago", or "N day(s) ago"
pub fn time_ago(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created) = created_at else {
        return UNKNOWN_AGE.to_string();
    };

    let hours = (now - created).num_hours();
    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{} {} ago", hours, plural(hours, "hour"))
    } else {
        let days = hours / 24;
        format!("{} {} ago", days, plural(days, "day"))
    }
}

/// Younger than a day. Unknown ages are never new.
pub fn is_new(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    created_at.is_some_and(|created| (now - created).num_hours() < 24)
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        unit.to_string()
    } else {
        format!("{unit}s")
    }
}

pub fn trending(resolved: Vec<LogicalSubmission>, count: usize, now: DateTime<Utc>) -> Vec<TrendingCard> {
    SortKey::Trending
        .sort(resolved)
        .into_iter()
        .take(count)
        .map(|s| {
            let trend = trend_label(&s.record, now);
            let r = s.record;
            TrendingCard {
                is_ai: r.is_ai_authored(),
                id: r.logical_id,
                title: r.title,
                authors: r.authors,
                corresponding_author: r.corresponding_author,
                views: r.metrics.views,
                downloads: r.metrics.downloads,
                trend,
                doc_type: r.doc_type,
                abstract_text: r.abstract_text,
                created_at: r.created_at,
            }
        })
        .collect()
}

pub fn latest(resolved: Vec<LogicalSubmission>, count: usize, now: DateTime<Utc>) -> Vec<LatestCard> {
    SortKey::Newest
        .sort(resolved)
        .into_iter()
        .take(count)
        .map(|s| {
            let r = s.record;
            let author = display_author(&r);
            let (status, tone) = if r.status.is_empty() {
                (DEFAULT_STATUS.to_string(), StatusTone::Published)
            } else {
                let tone = r.status_tone();
                (r.status, tone)
            };
            LatestCard {
                id: r.logical_id,
                title: r.title,
                author,
                status,
                tone,
                time_ago: time_ago(r.created_at, now),
                is_new: is_new(r.created_at, now),
                doc_type: r.doc_type,
                abstract_text: r.abstract_text,
            }
        })
        .collect()
}

fn display_author(record: &SubmissionRecord) -> String {
    if !record.corresponding_author.is_empty() {
        return record.corresponding_author.clone();
    }
    record
        .authors
        .first()
        .cloned()
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aixiv_common::SubmissionMetrics;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn record(id: &str, age: Duration, views: u64, downloads: u64, citations: u64) -> SubmissionRecord {
        SubmissionRecord {
            logical_id: id.to_string(),
            version: "1.0".to_string(),
            title: format!("{id} title"),
            doc_type: "paper".to_string(),
            created_at: Some(now() - age),
            metrics: SubmissionMetrics {
                views,
                downloads,
                comments: 0,
                citations,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_trend_score() {
        // 10 + 3*2 + 5*1 = 21 over 3 days
        let r = record("A", Duration::days(3), 10, 2, 1);
        assert_eq!(trend_score(&r, now()), 7);
        assert_eq!(trend_label(&r, now()), "+7%");

        // under a day counts as one day
        let fresh = record("B", Duration::hours(5), 40, 0, 0);
        assert_eq!(trend_score(&fresh, now()), 40);

        let popular = record("C", Duration::days(2), 9000, 0, 0);
        assert_eq!(trend_score(&popular, now()), MAX_TREND_SCORE);

        let undated = SubmissionRecord {
            created_at: None,
            ..record("D", Duration::zero(), 12, 0, 0)
        };
        assert_eq!(trend_score(&undated, now()), 12);
    }

    #[test]
    fn test_time_ago_labels() {
        let at = |d: Duration| Some(now() - d);
        assert_eq!(time_ago(at(Duration::minutes(59)), now()), "Just now");
        assert_eq!(time_ago(at(Duration::minutes(-30)), now()), "Just now");
        assert_eq!(time_ago(at(Duration::hours(1)), now()), "1 hour ago");
        assert_eq!(time_ago(at(Duration::hours(23)), now()), "23 hours ago");
        assert_eq!(time_ago(at(Duration::hours(24)), now()), "1 day ago");
        assert_eq!(time_ago(at(Duration::days(9)), now()), "9 days ago");
        assert_eq!(time_ago(None, now()), UNKNOWN_AGE);

        assert!(is_new(at(Duration::hours(23)), now()));
        assert!(!is_new(at(Duration::hours(24)), now()));
        assert!(!is_new(None, now()));
    }

    #[test]
    fn test_trending_cards_use_latest_versions() {
        let mut old = record("P1", Duration::days(10), 1000, 0, 0);
        old.version = "1.0".into();
        let mut new = record("P1", Duration::days(2), 5, 0, 0);
        new.version = "2.0".into();
        new.authors = vec!["ResearchBot".into()];

        let cards = Highlights::build(
            vec![
                old,
                new,
                record("P2", Duration::days(1), 50, 1, 0),
                record("P3", Duration::days(1), 50, 4, 0),
            ],
            2,
            now(),
        )
        .trending;

        let ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["P3", "P2"]);
        assert!(!cards[0].is_ai);
        assert_eq!(cards[0].trend, "+62%");
    }

    #[test]
    fn test_latest_cards() {
        let mut a = record("A", Duration::hours(2), 0, 0, 0);
        a.authors = vec!["Agent Smith".into(), "Agent Jones".into()];
        a.status = "under-review".into();
        let mut b = record("B", Duration::days(3), 0, 0, 0);
        b.corresponding_author = "Dr. Emily Chen".into();
        b.authors = vec!["ResearchBot".into()];
        let c = record("C", Duration::days(5), 0, 0, 0);
        let d = record("D", Duration::days(8), 0, 0, 0);

        let cards = Highlights::build(vec![d, c, b, a], 3, now()).latest;
        let ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);

        assert_eq!(cards[0].author, "Agent Smith");
        assert_eq!(cards[0].status, "under-review");
        assert_eq!(cards[0].tone, StatusTone::UnderReview);
        assert_eq!(cards[0].time_ago, "2 hours ago");
        assert!(cards[0].is_new);

        assert_eq!(cards[1].author, "Dr. Emily Chen");
        assert_eq!(cards[1].time_ago, "3 days ago");
        assert!(!cards[1].is_new);

        assert_eq!(cards[2].author, UNKNOWN_AUTHOR);
        assert_eq!(cards[2].status, DEFAULT_STATUS);
        assert_eq!(cards[2].tone, StatusTone::Published);
    }

    #[test]
    fn test_empty_catalog() {
        let h = Highlights::build(Vec::new(), 3, now());
        assert!(h.trending.is_empty());
        assert!(h.latest.is_empty());
    }
}
