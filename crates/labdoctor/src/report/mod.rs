//! The assembled diagnostic report and its renderers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::checks::{Finding, Severity};

pub mod diagnosis;
pub mod render;

pub use diagnosis::{diagnose, Diagnosis, DiagnosisItem};
pub use render::{render_json, render_text};

/// Findings of one report section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub findings: Vec<Finding>,
    /// Why the section did not run, if it was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

impl Section {
    pub fn with_findings(findings: Vec<Finding>) -> Self {
        Self {
            findings,
            skipped: None,
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            findings: Vec::new(),
            skipped: Some(reason.into()),
        }
    }
}

/// Everything one diagnostic run observed, in presentation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    /// Stuck scan with the storage cross-check of each record inline.
    pub stuck: Section,
    pub derived: Section,
    pub distribution: Section,
    pub durations: Section,
    pub recent: Section,
    pub lookups: Section,
    pub diagnosis: Diagnosis,
}

impl Report {
    /// Sections in presentation order.
    pub fn sections(&self) -> [&Section; 6] {
        [
            &self.stuck,
            &self.derived,
            &self.distribution,
            &self.durations,
            &self.recent,
            &self.lookups,
        ]
    }

    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.sections().into_iter().flat_map(|s| s.findings.iter())
    }

    /// Highest severity among all findings.
    pub fn worst_severity(&self) -> Severity {
        self.findings()
            .map(|f| f.severity)
            .max()
            .unwrap_or(Severity::Informational)
    }
}
