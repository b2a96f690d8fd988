//! Read-only data access for the pipeline stores.
//!
//! Uses SeaORM so the same queries run against the production Postgres
//! store and a local SQLite copy. The public API is synchronous: a
//! `Session` owns a current-thread runtime and blocks on every query, so
//! checks run strictly one after another.

use std::time::Duration;

use sea_orm::sea_query::SelectStatement;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, FromQueryResult};
use secrecy::ExposeSecret;
use tokio::runtime::{Builder, Runtime};

use crate::config::StoreSettings;

pub mod derived_repo;
pub mod error;
pub mod layout;
pub mod report_repo;
pub mod storage_repo;

pub use error::StoreError;
pub use layout::{StoreLayout, TableName};

/// An open, read-only connection to the pipeline stores.
///
/// Acquired once per run. `close` releases the connection explicitly;
/// dropping the session releases it as well.
pub struct Session {
    runtime: Runtime,
    conn: Option<DatabaseConnection>,
    layout: StoreLayout,
}

impl Session {
    /// Opens the production store described by `settings`.
    pub fn open(settings: &StoreSettings, layout: StoreLayout) -> Result<Self, StoreError> {
        let url = settings
            .connection_url()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        log::info!("Connecting to database at {}...", settings.host);
        Self::connect_with(
            url.expose_secret(),
            layout,
            Some(settings.connect_timeout),
        )
    }

    /// Connects to any SeaORM URL (`postgres://…`, `sqlite://…`).
    pub fn connect(url: &str, layout: StoreLayout) -> Result<Self, StoreError> {
        Self::connect_with(url, layout, None)
    }

    fn connect_with(
        url: &str,
        layout: StoreLayout,
        timeout: Option<Duration>,
    ) -> Result<Self, StoreError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(StoreError::Runtime)?;

        let mut options = ConnectOptions::new(url.to_string());
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        if let Some(timeout) = timeout {
            options.connect_timeout(timeout).acquire_timeout(timeout);
        }

        let conn = runtime
            .block_on(Database::connect(options))
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        runtime
            .block_on(conn.ping())
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        log::info!("Connected successfully");

        Ok(Self {
            runtime,
            conn: Some(conn),
            layout,
        })
    }

    /// The table layout queries are built against.
    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    fn conn(&self) -> Result<&DatabaseConnection, StoreError> {
        self.conn
            .as_ref()
            .ok_or_else(|| StoreError::Connection("session already closed".to_string()))
    }

    /// Runs a select and decodes every row.
    pub(crate) fn fetch_all<T>(&self, query: &SelectStatement) -> Result<Vec<T>, StoreError>
    where
        T: FromQueryResult,
    {
        let conn = self.conn()?;
        let statement = conn.get_database_backend().build(query);
        log::debug!("query: {}", statement.sql);
        let rows = self
            .runtime
            .block_on(T::find_by_statement(statement).all(conn))?;
        Ok(rows)
    }

    /// Runs a select and decodes the first row, if any.
    pub(crate) fn fetch_optional<T>(
        &self,
        query: &SelectStatement,
    ) -> Result<Option<T>, StoreError>
    where
        T: FromQueryResult,
    {
        let conn = self.conn()?;
        let statement = conn.get_database_backend().build(query);
        log::debug!("query: {}", statement.sql);
        let row = self
            .runtime
            .block_on(T::find_by_statement(statement).one(conn))?;
        Ok(row)
    }

    /// Releases the connection.
    pub fn close(mut self) -> Result<(), StoreError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), StoreError> {
        if let Some(conn) = self.conn.take() {
            self.runtime.block_on(conn.close())?;
            log::debug!("Database connection closed");
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::warn!("Failed to close database connection: {}", e);
        }
    }
}

/// Seeds a throwaway SQLite store with the pipeline schema.
#[cfg(test)]
pub(crate) mod test_support {
    use sea_orm::{ConnectionTrait, Database};
    use tempfile::TempDir;

    use super::{Session, StoreLayout};

    pub const SCHEMA: &str = "
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
            report_id TEXT NOT NULL,
            name TEXT
        );
        CREATE TABLE storage_objects (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );
    ";

    pub struct TestStore {
        _dir: TempDir,
        pub url: String,
    }

    impl TestStore {
        pub fn new(seed_sql: &str) -> Self {
            let dir = TempDir::new().expect("Failed to create temp directory");
            let url = format!("sqlite://{}?mode=rwc", dir.path().join("store.db").display());
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to build runtime");
            runtime.block_on(async {
                let conn = Database::connect(url.as_str()).await.expect("connect");
                conn.execute_unprepared(SCHEMA).await.expect("schema");
                if !seed_sql.trim().is_empty() {
                    conn.execute_unprepared(seed_sql).await.expect("seed");
                }
                conn.close().await.expect("close");
            });
            Self { _dir: dir, url }
        }

        pub fn layout() -> StoreLayout {
            StoreLayout::new("lab_reports", "biomarkers", "report_id", "storage_objects")
                .expect("valid layout")
        }

        pub fn session(&self) -> Session {
            Session::connect(&self.url, Self::layout()).expect("Failed to open session")
        }
    }
}
