//! Check 3: did extraction produce derived rows for the stuck reports?
//!
//! Derived rows alongside a non-terminal status mean extraction ran but the
//! status transition never happened. No rows at all means extraction never
//! ran.

use crate::db::report_repo::ReportRow;
use crate::db::{derived_repo, StoreError};
use crate::state::ReportStatus;

use super::{CheckContext, CheckId, Finding, FindingKind, Severity};

pub fn cross_check(ctx: &CheckContext<'_>, reports: &[ReportRow]) -> Result<Vec<Finding>, StoreError> {
    let ids: Vec<String> = reports.iter().map(|r| r.id.clone()).collect();
    let counts = derived_repo::counts_for_reports(ctx.session, &ids)?;

    if counts.is_empty() {
        return Ok(vec![Finding::anomaly(
            CheckId::DerivedCrossCheck,
            FindingKind::NoDerivedRecords {
                report_count: ids.len(),
            },
            format!(
                "No derived records found for any of the {} stuck reports.",
                ids.len()
            ),
        )
        .detail("Report IDs", ids.join(", "))]);
    }

    Ok(reports
        .iter()
        .map(|report| {
            let count = counts.get(&report.id).copied().unwrap_or(0);
            let status = ReportStatus::parse(report.status.as_deref());
            let (severity, message) = match (count, status.is_terminal()) {
                (0, _) => (
                    Severity::Anomaly,
                    format!("Report {} has no derived records: extraction never ran", report.id),
                ),
                (n, Some(false)) => (
                    Severity::Anomaly,
                    format!(
                        "Report {} has {} derived records but is still '{}': status never advanced",
                        report.id, n, status
                    ),
                ),
                (n, _) => (
                    Severity::Informational,
                    format!("Report {} has {} derived records", report.id, n),
                ),
            };
            Finding::new(
                CheckId::DerivedCrossCheck,
                severity,
                FindingKind::DerivedCount { count },
                message,
            )
            .for_report(report.id.clone())
            .detail("Status", status.to_string())
            .detail("Derived count", count.to_string())
        })
        .collect())
}
