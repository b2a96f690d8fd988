//! Check 7: explain specific report ids someone asked about.
//!
//! A missing record is not an error. When the id shows up in a storage
//! object name, the upload happened but the record was never written.

use crate::db::{report_repo, storage_repo, StoreError};
use crate::format;
use crate::state::ReportStatus;

use super::{CheckContext, CheckId, Finding, FindingKind};

pub fn targeted_lookup(ctx: &CheckContext<'_>) -> Result<Vec<Finding>, StoreError> {
    // An empty fragment would match every storage object.
    let ids: Vec<&str> = ctx
        .options
        .report_ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .collect();

    if ids.is_empty() {
        return Ok(vec![Finding::info(
            CheckId::TargetedLookup,
            FindingKind::NothingRequested,
            "No report ids requested.",
        )]);
    }

    let mut findings = Vec::with_capacity(ids.len());
    for id in ids {
        match lookup_one(ctx, id) {
            Ok(finding) => findings.push(finding),
            Err(e) if !e.is_fatal() => {
                log::warn!("Lookup of report {} failed: {}", id, e);
                findings.push(Finding::check_error(CheckId::TargetedLookup, &e).for_report(id));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(findings)
}

fn lookup_one(ctx: &CheckContext<'_>, id: &str) -> Result<Finding, StoreError> {
    if let Some(report) = report_repo::find_by_id(ctx.session, id)? {
        let status = ReportStatus::parse(report.status.as_deref());
        return Ok(Finding::info(
            CheckId::TargetedLookup,
            FindingKind::RecordFound,
            format!("Report {} found", id),
        )
        .for_report(id)
        .detail("Status", status.to_string())
        .detail("User ID", format::or_null(report.user_id.as_deref()))
        .detail("Created", format::timestamp(report.created_at))
        .detail("Updated", format::timestamp(report.updated_at))
        .detail("File path", format::or_null(report.file_path.as_deref()))
        .detail("Has PDF URL", format::yes_no(report.has_pdf_url())));
    }

    let objects = storage_repo::find_containing(ctx.session, id, ctx.options.storage_match_limit)?;
    match objects.first() {
        Some(first) => {
            let mut finding = Finding::anomaly(
                CheckId::TargetedLookup,
                FindingKind::OrphanedUpload {
                    object_name: first.name.clone(),
                },
                format!("Report {} not found in records, found in storage: {}", id, first.name),
            )
            .for_report(id)
            .at_path(first.name.clone());
            for object in &objects {
                finding = finding.detail("Storage object", format!("{} (ID: {})", object.name, object.id));
            }
            Ok(finding)
        }
        None => Ok(Finding::info(
            CheckId::TargetedLookup,
            FindingKind::NotFoundAnywhere,
            format!("Report {} not found in records or storage", id),
        )
        .for_report(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{CheckOptions, Severity};
    use crate::db::test_support::TestStore;
    use chrono::Utc;

    const SEED: &str = "
        INSERT INTO lab_reports VALUES
          ('b2e5611c', 'u1', 'processing', 'u1/b2e5611c.pdf', NULL, '2026-01-01T00:00:00Z', NULL);
        INSERT INTO storage_objects VALUES
          ('obj-9', 'u7/1700000000-05e8faed.pdf');
    ";

    fn run(ids: &[&str], seed: &str) -> Vec<Finding> {
        let store = TestStore::new(seed);
        let session = store.session();
        let options = CheckOptions {
            report_ids: ids.iter().map(|s| s.to_string()).collect(),
            ..CheckOptions::default()
        };
        let ctx = CheckContext {
            session: &session,
            options: &options,
            now: Utc::now(),
        };
        targeted_lookup(&ctx).unwrap()
    }

    #[test]
    fn test_found_orphaned_and_missing() {
        let findings = run(&["b2e5611c", "05e8faed", "deadbeef"], SEED);
        assert_eq!(findings.len(), 3);

        assert_eq!(findings[0].kind, FindingKind::RecordFound);
        assert!(findings[0]
            .details
            .iter()
            .any(|d| d.label == "Status" && d.value == "processing"));

        assert_eq!(
            findings[1].kind,
            FindingKind::OrphanedUpload {
                object_name: "u7/1700000000-05e8faed.pdf".into()
            }
        );
        assert_eq!(findings[1].severity, Severity::Anomaly);
        assert!(findings[1].message.contains("not found in records, found in storage"));

        assert_eq!(findings[2].kind, FindingKind::NotFoundAnywhere);
        assert_eq!(findings[2].severity, Severity::Informational);
    }

    #[test]
    fn test_blank_id_never_matches_storage() {
        let seed = "INSERT INTO storage_objects VALUES ('obj-1', 'u1/other.pdf');";
        let findings = run(&["", "  ", "deadbeef"], seed);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].report_id.as_deref(), Some("deadbeef"));
        assert_eq!(findings[0].kind, FindingKind::NotFoundAnywhere);
        assert!(!findings
            .iter()
            .any(|f| matches!(f.kind, FindingKind::OrphanedUpload { .. })));
    }

    #[test]
    fn test_no_ids_requested() {
        let findings = run(&[], SEED);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::NothingRequested);

        let findings = run(&[" "], SEED);
        assert_eq!(findings[0].kind, FindingKind::NothingRequested);
    }
}
