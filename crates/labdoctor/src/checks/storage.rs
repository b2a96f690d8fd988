//! Check 2: does every stuck report's file exist in the object store?

use crate::db::report_repo::ReportRow;
use crate::db::{storage_repo, StoreError};

use super::{CheckContext, CheckId, Finding, FindingKind};

/// Looks up each report's `file_path` in the storage catalog.
///
/// Reports without a file path produce no finding. A failed lookup is
/// reported against that report only.
pub fn cross_check(ctx: &CheckContext<'_>, reports: &[ReportRow]) -> Result<Vec<Finding>, StoreError> {
    let mut findings = Vec::new();

    for report in reports {
        let Some(path) = report.storage_path() else {
            continue;
        };

        match storage_repo::find_by_name(ctx.session, path) {
            Ok(Some(object)) => findings.push(
                Finding::info(
                    CheckId::StorageCrossCheck,
                    FindingKind::FilePresent {
                        object_id: object.id.clone(),
                    },
                    format!("File found in storage: {} (ID: {})", object.name, object.id),
                )
                .for_report(report.id.clone())
                .at_path(path),
            ),
            Ok(None) => findings.push(
                Finding::anomaly(
                    CheckId::StorageCrossCheck,
                    FindingKind::FileMissing,
                    format!("File not found in storage: {}", path),
                )
                .for_report(report.id.clone())
                .at_path(path),
            ),
            Err(e) if !e.is_fatal() => {
                log::warn!("Storage lookup for report {} failed: {}", report.id, e);
                findings.push(
                    Finding::check_error(CheckId::StorageCrossCheck, &e)
                        .for_report(report.id.clone())
                        .at_path(path),
                );
            }
            Err(e) => return Err(e),
        }
    }

    Ok(findings)
}
