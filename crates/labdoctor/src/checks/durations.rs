//! Check 5: processing time per status.

use crate::db::{report_repo, StoreError};
use crate::format;
use crate::stats::DurationStats;

use super::{CheckContext, CheckId, Finding, FindingKind};

pub fn duration_statistics(ctx: &CheckContext<'_>) -> Result<Vec<Finding>, StoreError> {
    let stats = report_repo::duration_stats(ctx.session)?;
    Ok(findings(&stats))
}

/// One finding per status with a computable duration.
pub fn findings(stats: &[DurationStats]) -> Vec<Finding> {
    let findings: Vec<Finding> = stats
        .iter()
        .filter_map(|s| {
            let (mean, min, max) = (s.mean_secs?, s.min_secs?, s.max_secs?);
            let status = s.status.as_deref().unwrap_or("NULL");
            Some(
                Finding::info(
                    CheckId::DurationStats,
                    FindingKind::DurationSummary { mean_secs: mean },
                    format!("{}:", status),
                )
                .detail("Count", format!("{} reports", s.count))
                .detail("Average processing time", format::seconds(mean))
                .detail("Min processing time", format::seconds(min))
                .detail("Max processing time", format::seconds(max)),
            )
        })
        .collect();

    if findings.is_empty() {
        return vec![Finding::info(
            CheckId::DurationStats,
            FindingKind::NoData,
            "No reports with both timestamps; no processing times to report.",
        )];
    }
    findings
}
