//! Read-only diagnostics for a lab report extraction pipeline.
//!
//! Finds reports stuck in processing, cross-checks them against the object
//! store and the derived biomarker table, summarises status and timing,
//! and turns what it saw into a diagnosis.

pub mod checks;
pub mod cli;
pub mod config;
pub mod db;
pub mod doctor;
pub mod error;
pub mod format;
pub mod probe;
pub mod report;
pub mod secrets;
pub mod state;
pub mod stats;

pub use checks::{CheckId, CheckOptions, Finding, FindingKind, Severity};
pub use config::{load_config, load_or_default, DoctorConfig, StoreSettings};
pub use db::{Session, StoreError, StoreLayout};
pub use error::{ConfigError, DoctorError, Result};
pub use probe::{McpProbe, ProbeError, ProbeOutcome};
pub use report::{render_json, render_text, Diagnosis, Report};
pub use secrets::{resolve_secret, SecretError};
