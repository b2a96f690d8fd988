//! Check 6: recently completed reports, as a baseline for the stuck ones.

use crate::db::{report_repo, StoreError};
use crate::format;
use crate::state::COMPLETED;

use super::{CheckContext, CheckId, Finding, FindingKind};

pub fn recent_completions(ctx: &CheckContext<'_>) -> Result<Vec<Finding>, StoreError> {
    let reports = report_repo::recent_by_status(ctx.session, COMPLETED, ctx.options.recent_limit)?;

    if reports.is_empty() {
        return Ok(vec![Finding::info(
            CheckId::RecentCompletions,
            FindingKind::NoData,
            format!("No '{}' reports found.", COMPLETED),
        )]);
    }

    Ok(reports
        .iter()
        .map(|report| {
            let duration = match (report.created_at, report.updated_at) {
                (Some(created), Some(updated)) => Some(updated - created),
                _ => None,
            };
            Finding::info(
                CheckId::RecentCompletions,
                FindingKind::RecentCompletion {
                    duration_secs: duration.map(|d| d.num_seconds()),
                },
                format!("Report ID: {}", report.id),
            )
            .for_report(report.id.clone())
            .detail("User ID", format::or_null(report.user_id.as_deref()))
            .detail("Created", format::timestamp(report.created_at))
            .detail("Completed", format::timestamp(report.updated_at))
            .detail("Processing time", format::optional_span(duration))
            .detail("Has PDF URL", format::yes_no(report.has_pdf_url()))
            .detail("Has file path", format::yes_no(report.storage_path().is_some()))
        })
        .collect())
}
