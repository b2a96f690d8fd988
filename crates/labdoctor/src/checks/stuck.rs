//! Check 1: reports sitting in `processing`.

use crate::db::report_repo::{self, ReportRow};
use crate::db::StoreError;
use crate::format;
use crate::state::{self, AgeClass, PROCESSING};

use super::{CheckContext, CheckId, Finding, FindingKind, Severity, StuckScan};

/// Fetches the most recent `processing` reports and describes each one.
pub fn scan(ctx: &CheckContext<'_>) -> Result<StuckScan, StoreError> {
    let reports = report_repo::recent_by_status(ctx.session, PROCESSING, ctx.options.stuck_limit)?;
    log::info!("Found {} reports in '{}' status", reports.len(), PROCESSING);

    if reports.is_empty() {
        return Ok(StuckScan {
            reports,
            findings: vec![Finding::info(
                CheckId::StuckScan,
                FindingKind::NoStuckReports,
                format!("No reports stuck in '{}' status found.", PROCESSING),
            )],
        });
    }

    let findings = reports.iter().map(|r| describe(ctx, r)).collect();
    Ok(StuckScan { reports, findings })
}

fn describe(ctx: &CheckContext<'_>, report: &ReportRow) -> Finding {
    let age = state::age(report.created_at, ctx.now);
    let class = state::classify_age(age, ctx.options.stale_after);
    let (severity, message) = match class {
        AgeClass::Overdue => (
            Severity::Anomaly,
            format!(
                "Report {} has been processing for {} (bound {})",
                report.id,
                format::optional_span(age),
                format::span(ctx.options.stale_after)
            ),
        ),
        AgeClass::Fresh => (
            Severity::Informational,
            format!(
                "Report {} is processing, within the expected bound",
                report.id
            ),
        ),
        AgeClass::Unknown => (
            Severity::Informational,
            format!("Report {} is processing, age unknown (no creation time)", report.id),
        ),
    };

    let mut finding = Finding::new(
        CheckId::StuckScan,
        severity,
        FindingKind::StuckReport {
            age_secs: age.map(|a| a.num_seconds()),
            overdue: class == AgeClass::Overdue,
        },
        message,
    )
    .for_report(report.id.clone())
    .detail("User ID", format::or_null(report.user_id.as_deref()))
    .detail("Created", format::timestamp(report.created_at))
    .detail("Updated", format::timestamp(report.updated_at))
    .detail("Age", format::optional_span(age))
    .detail("Has PDF URL", format::yes_no(report.has_pdf_url()))
    .detail("File path", format::or_null(report.file_path.as_deref()));

    if let Some(path) = report.storage_path() {
        finding = finding.at_path(path);
    }
    finding
}
