//! Report lifecycle model used to classify records read from the store.
//!
//! The pipeline moves a report from `processing` to `completed` (or
//! `failed`). Any other value is tolerated as [`ReportStatus::Other`] so a
//! new status written by the pipeline never breaks a diagnostic run.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

pub const PROCESSING: &str = "processing";
pub const COMPLETED: &str = "completed";
pub const FAILED: &str = "failed";

/// Status of a report record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportStatus {
    Processing,
    Completed,
    Failed,
    Other(String),
    /// The status column is NULL.
    Unset,
}

impl ReportStatus {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None => ReportStatus::Unset,
            Some(PROCESSING) => ReportStatus::Processing,
            Some(COMPLETED) => ReportStatus::Completed,
            Some(FAILED) => ReportStatus::Failed,
            Some(other) => ReportStatus::Other(other.to_string()),
        }
    }

    /// Whether no further transition is expected.
    ///
    /// `None` for values the model does not recognize.
    pub fn is_terminal(&self) -> Option<bool> {
        match self {
            ReportStatus::Processing => Some(false),
            ReportStatus::Completed | ReportStatus::Failed => Some(true),
            ReportStatus::Other(_) | ReportStatus::Unset => None,
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStatus::Processing => write!(f, "{}", PROCESSING),
            ReportStatus::Completed => write!(f, "{}", COMPLETED),
            ReportStatus::Failed => write!(f, "{}", FAILED),
            ReportStatus::Other(s) => write!(f, "{}", s),
            ReportStatus::Unset => write!(f, "NULL"),
        }
    }
}

/// How long a non-terminal report has been waiting, relative to the
/// expected bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeClass {
    /// `created_at` is missing.
    Unknown,
    Fresh,
    Overdue,
}

/// Age of a record at `now`, if its creation time is known.
pub fn age(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<Duration> {
    created_at.map(|created| now - created)
}

pub fn classify_age(age: Option<Duration>, stale_after: Duration) -> AgeClass {
    match age {
        None => AgeClass::Unknown,
        Some(age) if age > stale_after => AgeClass::Overdue,
        Some(_) => AgeClass::Fresh,
    }
}
