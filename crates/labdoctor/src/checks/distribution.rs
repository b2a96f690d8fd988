//! Check 4: how reports are spread over statuses.

use crate::db::{report_repo, StoreError};
use crate::stats::{self, Distribution};

use super::{CheckContext, CheckId, Finding, FindingKind};

pub fn status_distribution(ctx: &CheckContext<'_>) -> Result<Vec<Finding>, StoreError> {
    let rows = report_repo::status_counts(ctx.session)?;
    Ok(findings(&stats::distribution(&rows)))
}

/// One informational row per status, most common first.
pub fn findings(dist: &Distribution) -> Vec<Finding> {
    if dist.is_empty() {
        return vec![Finding::info(
            CheckId::StatusDistribution,
            FindingKind::NoData,
            "No report records found.",
        )];
    }

    let width = dist
        .shares
        .iter()
        .map(|s| s.status.as_deref().unwrap_or("NULL").len())
        .max()
        .unwrap_or(0);

    let mut findings: Vec<Finding> = dist
        .shares
        .iter()
        .map(|share| {
            let status = share.status.as_deref().unwrap_or("NULL");
            Finding::info(
                CheckId::StatusDistribution,
                FindingKind::StatusCount { count: share.count },
                format!(
                    "{:<width$}  {:>6} reports  {:>5.1}%",
                    status,
                    share.count,
                    share.percent,
                    width = width
                ),
            )
        })
        .collect();
    findings.push(Finding::info(
        CheckId::StatusDistribution,
        FindingKind::StatusCount { count: dist.total },
        format!("{:<width$}  {:>6} reports", "total", dist.total, width = width),
    ));
    findings
}
