//! Runs every check in presentation order and assembles the [`Report`].

use chrono::{DateTime, Utc};

use crate::checks::{
    self, derived, distribution, durations, lookup, recent, storage, stuck, CheckContext, CheckId,
    CheckOptions, Finding, StuckScan,
};
use crate::db::{Session, StoreError};
use crate::report::{diagnose, Diagnosis, Report, Section};
use crate::state::PROCESSING;

/// Runs every check against `session` and derives the diagnosis.
///
/// Query failures become check-error findings; a connection failure aborts
/// the run with no report.
pub fn run(
    session: &Session,
    options: &CheckOptions,
    now: DateTime<Utc>,
) -> Result<Report, StoreError> {
    let ctx = CheckContext {
        session,
        options,
        now,
    };

    log::info!("Scanning for reports stuck in '{}'", PROCESSING);
    let scan = match stuck::scan(&ctx) {
        Ok(scan) => scan,
        Err(e) if !e.is_fatal() => {
            log::warn!("{} failed: {}", CheckId::StuckScan, e);
            StuckScan {
                reports: Vec::new(),
                findings: vec![Finding::check_error(CheckId::StuckScan, &e)],
            }
        }
        Err(e) => return Err(e),
    };

    let (stuck_section, derived_section) = if scan.reports.is_empty() {
        (
            Section::with_findings(scan.findings),
            Section::skipped("No stuck reports to cross-check."),
        )
    } else {
        let storage_findings = checks::isolate(
            CheckId::StorageCrossCheck,
            storage::cross_check(&ctx, &scan.reports),
        )?;
        let derived_findings = checks::isolate(
            CheckId::DerivedCrossCheck,
            derived::cross_check(&ctx, &scan.reports),
        )?;
        (
            Section::with_findings(interleave(scan.findings, storage_findings)),
            Section::with_findings(derived_findings),
        )
    };

    log::info!("Collecting status distribution and timing statistics");
    let distribution = checks::isolate(
        CheckId::StatusDistribution,
        distribution::status_distribution(&ctx),
    )?;
    let durations = checks::isolate(CheckId::DurationStats, durations::duration_statistics(&ctx))?;
    let recent = checks::isolate(CheckId::RecentCompletions, recent::recent_completions(&ctx))?;

    log::info!("Looking up {} requested report ids", options.report_ids.len());
    let lookups = checks::isolate(CheckId::TargetedLookup, lookup::targeted_lookup(&ctx))?;

    let mut report = Report {
        generated_at: now,
        stuck: stuck_section,
        derived: derived_section,
        distribution: Section::with_findings(distribution),
        durations: Section::with_findings(durations),
        recent: Section::with_findings(recent),
        lookups: Section::with_findings(lookups),
        diagnosis: Diagnosis::default(),
    };
    report.diagnosis = diagnose(report.findings());
    Ok(report)
}

/// Places each report's storage findings directly after its stuck finding.
fn interleave(stuck: Vec<Finding>, storage: Vec<Finding>) -> Vec<Finding> {
    let mut storage = storage;
    let mut out = Vec::with_capacity(stuck.len() + storage.len());
    for finding in stuck {
        let id = finding.report_id.clone();
        out.push(finding);
        if id.is_some() {
            let (mine, rest): (Vec<_>, Vec<_>) =
                storage.into_iter().partition(|f| f.report_id == id);
            out.extend(mine);
            storage = rest;
        }
    }
    out.extend(storage);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::FindingKind;

    #[test]
    fn test_interleave_by_report() {
        let stuck = vec![
            Finding::info(CheckId::StuckScan, FindingKind::NoData, "a").for_report("a"),
            Finding::info(CheckId::StuckScan, FindingKind::NoData, "b").for_report("b"),
        ];
        let storage = vec![
            Finding::info(CheckId::StorageCrossCheck, FindingKind::FileMissing, "sb").for_report("b"),
            Finding::info(CheckId::StorageCrossCheck, FindingKind::FileMissing, "sa").for_report("a"),
        ];
        let messages: Vec<String> = interleave(stuck, storage)
            .into_iter()
            .map(|f| f.message)
            .collect();
        assert_eq!(messages, vec!["a", "sa", "b", "sb"]);
    }
}
