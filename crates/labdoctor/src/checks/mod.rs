//! Consistency checks across the report table, derived rows and storage.
//!
//! Every check reads through a [`Session`] and returns findings. A query
//! failure inside a check is turned into a check-error finding by
//! [`isolate`]; connection failures are returned so the run can stop.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::db::report_repo::ReportRow;
use crate::db::{Session, StoreError};

pub mod derived;
pub mod distribution;
pub mod durations;
pub mod lookup;
pub mod recent;
pub mod storage;
pub mod stuck;

/// Which check produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    StuckScan,
    StorageCrossCheck,
    DerivedCrossCheck,
    StatusDistribution,
    DurationStats,
    RecentCompletions,
    TargetedLookup,
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckId::StuckScan => write!(f, "stuck scan"),
            CheckId::StorageCrossCheck => write!(f, "storage cross-check"),
            CheckId::DerivedCrossCheck => write!(f, "derived cross-check"),
            CheckId::StatusDistribution => write!(f, "status distribution"),
            CheckId::DurationStats => write!(f, "duration statistics"),
            CheckId::RecentCompletions => write!(f, "recent completions"),
            CheckId::TargetedLookup => write!(f, "targeted lookup"),
        }
    }
}

/// How much attention a finding deserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Informational,
    Anomaly,
    CheckError,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Informational => write!(f, "INFO"),
            Severity::Anomaly => write!(f, "ANOMALY"),
            Severity::CheckError => write!(f, "CHECK ERROR"),
        }
    }
}

/// What a finding observed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FindingKind {
    NoStuckReports,
    StuckReport {
        #[serde(skip_serializing_if = "Option::is_none")]
        age_secs: Option<i64>,
        overdue: bool,
    },
    FilePresent {
        object_id: String,
    },
    FileMissing,
    NoDerivedRecords {
        report_count: usize,
    },
    DerivedCount {
        count: i64,
    },
    StatusCount {
        count: i64,
    },
    DurationSummary {
        mean_secs: f64,
    },
    RecentCompletion {
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_secs: Option<i64>,
    },
    RecordFound,
    OrphanedUpload {
        object_name: String,
    },
    NotFoundAnywhere,
    NothingRequested,
    NoData,
    CheckError {
        error: String,
    },
}

/// One labeled line of supporting detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detail {
    pub label: String,
    pub value: String,
}

/// A classified observation with its supporting identifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub check: CheckId,
    pub severity: Severity,
    pub kind: FindingKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Detail>,
}

impl Finding {
    pub fn new(
        check: CheckId,
        severity: Severity,
        kind: FindingKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check,
            severity,
            kind,
            report_id: None,
            path: None,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn info(check: CheckId, kind: FindingKind, message: impl Into<String>) -> Self {
        Self::new(check, Severity::Informational, kind, message)
    }

    pub fn anomaly(check: CheckId, kind: FindingKind, message: impl Into<String>) -> Self {
        Self::new(check, Severity::Anomaly, kind, message)
    }

    /// A check that could not complete.
    pub fn check_error(check: CheckId, err: &StoreError) -> Self {
        Self::new(
            check,
            Severity::CheckError,
            FindingKind::CheckError {
                error: err.to_string(),
            },
            format!("{} failed: {}", check, err),
        )
    }

    pub fn for_report(mut self, id: impl Into<String>) -> Self {
        self.report_id = Some(id.into());
        self
    }

    pub fn at_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn detail(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.push(Detail {
            label: label.into(),
            value: value.into(),
        });
        self
    }

    pub fn is_signal(&self) -> bool {
        self.severity != Severity::Informational
    }
}

/// Tunables for a diagnostic run.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOptions {
    /// How many `processing` reports the stuck scan inspects.
    pub stuck_limit: u64,
    /// How many `completed` reports form the comparison baseline.
    pub recent_limit: u64,
    /// Age beyond which a `processing` report counts as overdue.
    pub stale_after: Duration,
    /// Specific report ids to look up.
    pub report_ids: Vec<String>,
    /// Maximum storage matches listed per targeted id.
    pub storage_match_limit: u64,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            stuck_limit: 10,
            recent_limit: 5,
            stale_after: Duration::hours(1),
            report_ids: Vec::new(),
            storage_match_limit: 5,
        }
    }
}

/// Per-run inputs shared by every check.
pub struct CheckContext<'a> {
    pub session: &'a Session,
    pub options: &'a CheckOptions,
    /// Reference time for age calculations.
    pub now: DateTime<Utc>,
}

/// Outcome of the stuck scan, reused by the cross-checks.
#[derive(Debug, Clone, Default)]
pub struct StuckScan {
    pub reports: Vec<ReportRow>,
    pub findings: Vec<Finding>,
}

/// Converts a non-fatal store failure into a check-error finding.
///
/// Fatal errors (connection loss) are passed through.
pub fn isolate(
    check: CheckId,
    result: Result<Vec<Finding>, StoreError>,
) -> Result<Vec<Finding>, StoreError> {
    match result {
        Ok(findings) => Ok(findings),
        Err(e) if !e.is_fatal() => {
            log::warn!("{} failed: {}", check, e);
            Ok(vec![Finding::check_error(check, &e)])
        }
        Err(e) => Err(e),
    }
}
