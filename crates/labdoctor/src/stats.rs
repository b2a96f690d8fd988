//! Aggregate statistics over report rows already fetched from the store.
//!
//! Pure computation; no queries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::report_repo::StatusCountRow;

/// Status and timestamps of one transitioned report.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingSample {
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TimingSample {
    /// `updated_at - created_at` in seconds, when both are present.
    pub fn duration_secs(&self) -> Option<f64> {
        match (self.created_at, self.updated_at) {
            (Some(created), Some(updated)) => {
                Some((updated - created).num_milliseconds() as f64 / 1000.0)
            }
            _ => None,
        }
    }
}

/// Per-status processing duration statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationStats {
    pub status: Option<String>,
    /// Every sample in the group, timed or not.
    pub count: usize,
    /// Samples with both timestamps.
    pub timed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_secs: Option<f64>,
}

/// Groups samples by status and computes count, mean, min and max duration.
///
/// Ordered by count descending, then status.
pub fn duration_stats(samples: &[TimingSample]) -> Vec<DurationStats> {
    let mut groups: BTreeMap<Option<&str>, (usize, Vec<f64>)> = BTreeMap::new();
    for sample in samples {
        let entry = groups.entry(sample.status.as_deref()).or_default();
        entry.0 += 1;
        if let Some(secs) = sample.duration_secs() {
            entry.1.push(secs);
        }
    }

    let mut stats: Vec<DurationStats> = groups
        .into_iter()
        .map(|(status, (count, durations))| {
            let timed = durations.len();
            let (mean_secs, min_secs, max_secs) = if durations.is_empty() {
                (None, None, None)
            } else {
                let sum: f64 = durations.iter().sum();
                let min = durations.iter().copied().fold(f64::INFINITY, f64::min);
                let max = durations.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                (Some(sum / timed as f64), Some(min), Some(max))
            };
            DurationStats {
                status: status.map(str::to_string),
                count,
                timed,
                mean_secs,
                min_secs,
                max_secs,
            }
        })
        .collect();

    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.status.cmp(&b.status)));
    stats
}

/// Share of one status in the overall distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusShare {
    pub status: Option<String>,
    pub count: i64,
    pub percent: f64,
}

/// Status distribution over all reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub total: i64,
    pub shares: Vec<StatusShare>,
}

impl Distribution {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Computes totals and shares, preserving the order of `rows`.
pub fn distribution(rows: &[StatusCountRow]) -> Distribution {
    let total: i64 = rows.iter().map(|r| r.count).sum();
    let shares = rows
        .iter()
        .map(|row| StatusShare {
            status: row.status.clone(),
            count: row.count,
            percent: if total > 0 {
                row.count as f64 * 100.0 / total as f64
            } else {
                0.0
            },
        })
        .collect();
    Distribution { total, shares }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample(status: &str, secs: Option<i64>) -> TimingSample {
        let created = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        TimingSample {
            status: Some(status.to_string()),
            created_at: Some(created),
            updated_at: secs.map(|s| created + Duration::seconds(s)),
        }
    }

    #[test]
    fn test_duration_stats_mean_min_max() {
        let samples = vec![
            sample("completed", Some(10)),
            sample("completed", Some(20)),
            sample("completed", Some(30)),
            sample("completed", Some(30)),
        ];
        let stats = duration_stats(&samples);
        assert_eq!(stats.len(), 1);
        let s = &stats[0];
        assert_eq!(s.count, 4);
        assert_eq!(s.timed, 4);
        assert_eq!(s.mean_secs, Some(22.5));
        assert_eq!(s.min_secs, Some(10.0));
        assert_eq!(s.max_secs, Some(30.0));
    }

    #[test]
    fn test_missing_timestamp_counts_but_is_not_timed() {
        let mut untimed = sample("failed", None);
        untimed.updated_at = Some(Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap());
        untimed.created_at = None;
        let stats = duration_stats(&[untimed]);
        assert_eq!(stats[0].count, 1);
        assert_eq!(stats[0].timed, 0);
        assert!(stats[0].mean_secs.is_none());
    }

    #[test]
    fn test_duration_stats_empty() {
        assert!(duration_stats(&[]).is_empty());
    }

    #[test]
    fn test_duration_groups_ordered_by_count() {
        let samples = vec![
            sample("failed", Some(5)),
            sample("completed", Some(10)),
            sample("completed", Some(20)),
        ];
        let stats = duration_stats(&samples);
        assert_eq!(stats[0].status.as_deref(), Some("completed"));
        assert_eq!(stats[1].status.as_deref(), Some("failed"));
    }

    #[test]
    fn test_distribution_shares() {
        let rows = vec![
            StatusCountRow {
                status: Some("completed".into()),
                count: 3,
            },
            StatusCountRow {
                status: Some("processing".into()),
                count: 1,
            },
        ];
        let dist = distribution(&rows);
        assert_eq!(dist.total, 4);
        assert_eq!(dist.shares[0].percent, 75.0);
        assert_eq!(dist.shares[1].percent, 25.0);
    }

    #[test]
    fn test_distribution_empty_does_not_divide() {
        let dist = distribution(&[]);
        assert!(dist.is_empty());
        assert!(dist.shares.is_empty());
    }
}
