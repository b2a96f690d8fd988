//! Closing diagnosis derived from the findings that actually fired.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::checks::{CheckId, Finding, FindingKind, Severity};
use crate::format;

/// One conclusion with optional supporting explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisItem {
    pub severity: Severity,
    pub headline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DiagnosisItem {
    fn new(severity: Severity, headline: impl Into<String>) -> Self {
        Self {
            severity,
            headline: headline.into(),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub items: Vec<DiagnosisItem>,
}

impl Diagnosis {
    pub fn is_healthy(&self) -> bool {
        self.items
            .iter()
            .all(|i| i.severity == Severity::Informational)
    }
}

#[derive(Default)]
struct Tally {
    failed_checks: BTreeSet<String>,
    scan_ran: bool,
    stuck: usize,
    overdue: usize,
    oldest_age: Option<i64>,
    missing_files: usize,
    present_files: usize,
    no_derived_at_all: Option<usize>,
    without_derived: usize,
    derived_but_stuck: usize,
    orphaned: Vec<String>,
    slowest_completion: Option<i64>,
}

impl Tally {
    fn from_findings<'a>(findings: impl IntoIterator<Item = &'a Finding>) -> Self {
        let mut t = Tally::default();
        for f in findings {
            match &f.kind {
                FindingKind::CheckError { .. } => {
                    t.failed_checks.insert(f.check.to_string());
                }
                FindingKind::NoStuckReports => t.scan_ran = true,
                FindingKind::StuckReport { age_secs, overdue } => {
                    t.scan_ran = true;
                    t.stuck += 1;
                    if *overdue {
                        t.overdue += 1;
                    }
                    if let Some(age) = age_secs {
                        t.oldest_age = Some(t.oldest_age.map_or(*age, |o| o.max(*age)));
                    }
                }
                FindingKind::FileMissing => t.missing_files += 1,
                FindingKind::FilePresent { .. } => t.present_files += 1,
                FindingKind::NoDerivedRecords { report_count } => {
                    t.no_derived_at_all = Some(*report_count)
                }
                FindingKind::DerivedCount { count } if f.check == CheckId::DerivedCrossCheck => {
                    if *count == 0 {
                        t.without_derived += 1;
                    } else if f.severity == Severity::Anomaly {
                        t.derived_but_stuck += 1;
                    }
                }
                FindingKind::OrphanedUpload { .. } => {
                    if let Some(id) = &f.report_id {
                        t.orphaned.push(id.clone());
                    }
                }
                FindingKind::RecentCompletion {
                    duration_secs: Some(secs),
                } => {
                    t.slowest_completion =
                        Some(t.slowest_completion.map_or(*secs, |s| s.max(*secs)));
                }
                _ => {}
            }
        }
        t
    }
}

/// Builds the closing diagnosis from the findings of a run.
pub fn diagnose<'a>(findings: impl IntoIterator<Item = &'a Finding>) -> Diagnosis {
    let t = Tally::from_findings(findings);
    let mut items = Vec::new();

    if !t.failed_checks.is_empty() {
        items.push(
            DiagnosisItem::new(
                Severity::CheckError,
                format!(
                    "{} check(s) could not complete; this diagnosis is partial.",
                    t.failed_checks.len()
                ),
            )
            .with_detail(format!(
                "Failed: {}",
                t.failed_checks.iter().cloned().collect::<Vec<_>>().join(", ")
            )),
        );
    }

    if t.scan_ran && t.stuck == 0 {
        items.push(DiagnosisItem::new(
            Severity::Informational,
            "No reports are stuck in 'processing'.",
        ));
    }

    if t.overdue > 0 {
        let mut item = DiagnosisItem::new(
            Severity::Anomaly,
            format!(
                "{} of {} inspected 'processing' reports exceed the expected processing time.",
                t.overdue, t.stuck
            ),
        );
        if let (Some(oldest), Some(slowest)) = (t.oldest_age, t.slowest_completion) {
            item = item.with_detail(format!(
                "Oldest stuck report has waited {}; the slowest recent completion took {}.",
                format::span(chrono::Duration::seconds(oldest)),
                format::span(chrono::Duration::seconds(slowest))
            ));
        }
        items.push(item);
    }

    let never_extracted = t.no_derived_at_all.unwrap_or(t.without_derived);
    if never_extracted > 0 {
        items.push(
            DiagnosisItem::new(
                Severity::Anomaly,
                format!(
                    "Missing extraction step: {} stuck report(s) have no derived records.",
                    never_extracted
                ),
            )
            .with_detail(
                "Reports are created in 'processing' but nothing extracts biomarkers from them. \
                 Check that the upload path triggers extraction.",
            ),
        );
    }

    if t.derived_but_stuck > 0 {
        items.push(
            DiagnosisItem::new(
                Severity::Anomaly,
                format!(
                    "Missing status transition: {} report(s) have derived records but are still 'processing'.",
                    t.derived_but_stuck
                ),
            )
            .with_detail(
                "Extraction ran and saved its results but never marked the report 'completed'.",
            ),
        );
    }

    if t.missing_files > 0 {
        items.push(
            DiagnosisItem::new(
                Severity::Anomaly,
                format!(
                    "Incomplete uploads: {} stuck report(s) reference files missing from storage.",
                    t.missing_files
                ),
            )
            .with_detail("Extraction cannot run without the uploaded file."),
        );
    } else if t.present_files > 0 {
        items.push(DiagnosisItem::new(
            Severity::Informational,
            "Uploads are intact: every referenced file of a stuck report exists in storage.",
        ));
    }

    if !t.orphaned.is_empty() {
        items.push(
            DiagnosisItem::new(
                Severity::Anomaly,
                format!(
                    "Orphaned uploads: {} requested id(s) exist only in storage, with no report record.",
                    t.orphaned.len()
                ),
            )
            .with_detail(format!(
                "Record creation failed after upload for: {}",
                t.orphaned.join(", ")
            )),
        );
    }

    Diagnosis { items }
}
