//! Test harness running the doctor against a temporary SQLite store.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, Database};
use tempfile::TempDir;

use labdoctor::checks::CheckOptions;
use labdoctor::report::Report;
use labdoctor::{doctor, Session, StoreError, StoreLayout};

const SCHEMA: &str = "
    CREATE TABLE lab_reports (
        id TEXT PRIMARY KEY,
        user_id TEXT,
        status TEXT,
        file_path TEXT,
        pdf_url TEXT,
        created_at TEXT,
        updated_at TEXT
    );
    CREATE TABLE biomarkers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        report_id TEXT,
        name TEXT
    );
    CREATE TABLE storage_objects (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL
    );
";

/// A seeded store in its own temp directory.
pub struct StoreHarness {
    _dir: TempDir,
    pub url: String,
    layout: StoreLayout,
}

impl StoreHarness {
    /// Creates the schema and runs `seed_sql` against it.
    pub fn new(seed_sql: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("store.db").display());

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("Failed to build runtime");
        runtime.block_on(async {
            let conn = Database::connect(url.as_str())
                .await
                .expect("Failed to open test store");
            conn.execute_unprepared(SCHEMA)
                .await
                .expect("Failed to create schema");
            if !seed_sql.trim().is_empty() {
                conn.execute_unprepared(seed_sql)
                    .await
                    .expect("Failed to seed store");
            }
            conn.close().await.expect("Failed to close seed connection");
        });

        Self {
            _dir: dir,
            url,
            layout: default_layout(),
        }
    }

    /// Points the checks at different tables.
    pub fn with_layout(mut self, layout: StoreLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn session(&self) -> Session {
        Session::connect(&self.url, self.layout.clone()).expect("Failed to open session")
    }

    /// Runs every check once with a fixed clock.
    pub fn run(&self, options: &CheckOptions, now: DateTime<Utc>) -> Result<Report, StoreError> {
        let session = self.session();
        let report = doctor::run(&session, options, now);
        session.close().expect("Failed to close session");
        report
    }
}

pub fn default_layout() -> StoreLayout {
    StoreLayout::new("lab_reports", "biomarkers", "report_id", "storage_objects")
        .expect("valid layout")
}

/// Fixed "now" shared by the scenarios.
pub fn fixed_now() -> DateTime<Utc> {
    "2026-01-03T12:00:00Z".parse().expect("valid timestamp")
}
