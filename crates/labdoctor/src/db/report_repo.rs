//! Read queries against the report records table.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{
    Alias, Asterisk, Expr, Func, NullOrdering, Order, Query, SelectStatement, SimpleExpr,
};
use sea_orm::FromQueryResult;
use serde::Serialize;

use super::{Session, StoreError, TableName};
use crate::stats::{self, DurationStats, TimingSample};

/// A report record as stored by the pipeline.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub id: String,
    pub user_id: Option<String>,
    pub status: Option<String>,
    pub file_path: Option<String>,
    pub pdf_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ReportRow {
    /// Returns the file path when it is set and non-blank.
    pub fn storage_path(&self) -> Option<&str> {
        self.file_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub fn has_pdf_url(&self) -> bool {
        self.pdf_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

/// Number of reports sharing one status value.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCountRow {
    pub status: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, FromQueryResult)]
struct TimingRow {
    status: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

/// `CAST(col AS TEXT)`, so UUID, enum and text columns decode the same way.
fn text_col(col: &str) -> SimpleExpr {
    Expr::col(Alias::new(col)).cast_as(Alias::new("TEXT"))
}

fn select_reports(table: &TableName) -> SelectStatement {
    Query::select()
        .expr_as(text_col("id"), Alias::new("id"))
        .expr_as(text_col("user_id"), Alias::new("user_id"))
        .expr_as(text_col("status"), Alias::new("status"))
        .column(Alias::new("file_path"))
        .column(Alias::new("pdf_url"))
        .column(Alias::new("created_at"))
        .column(Alias::new("updated_at"))
        .from(table.table_ref())
        .to_owned()
}

/// Fetches the `limit` most recently created reports with `status`.
pub fn recent_by_status(
    session: &Session,
    status: &str,
    limit: u64,
) -> Result<Vec<ReportRow>, StoreError> {
    let query = select_reports(&session.layout().reports)
        .and_where(Expr::expr(text_col("status")).eq(status))
        .order_by_with_nulls(Alias::new("created_at"), Order::Desc, NullOrdering::Last)
        .order_by(Alias::new("id"), Order::Asc)
        .limit(limit)
        .to_owned();
    session.fetch_all(&query)
}

/// Fetches a single report by exact id.
pub fn find_by_id(session: &Session, id: &str) -> Result<Option<ReportRow>, StoreError> {
    let query = select_reports(&session.layout().reports)
        .and_where(Expr::expr(text_col("id")).eq(id))
        .limit(1)
        .to_owned();
    session.fetch_optional(&query)
}

/// Counts reports per status, most common first.
pub fn status_counts(session: &Session) -> Result<Vec<StatusCountRow>, StoreError> {
    let query = Query::select()
        .expr_as(text_col("status"), Alias::new("status"))
        .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
        .from(session.layout().reports.table_ref())
        .group_by_col(Alias::new("status"))
        .order_by(Alias::new("count"), Order::Desc)
        .order_by(Alias::new("status"), Order::Asc)
        .to_owned();
    session.fetch_all(&query)
}

/// Fetches status and timestamps for every report that has transitioned
/// at least once (`updated_at` present).
pub fn timing_samples(session: &Session) -> Result<Vec<TimingSample>, StoreError> {
    let query = Query::select()
        .expr_as(text_col("status"), Alias::new("status"))
        .column(Alias::new("created_at"))
        .column(Alias::new("updated_at"))
        .from(session.layout().reports.table_ref())
        .and_where(Expr::col(Alias::new("updated_at")).is_not_null())
        .to_owned();
    let rows: Vec<TimingRow> = session.fetch_all(&query)?;
    Ok(rows
        .into_iter()
        .map(|row| TimingSample {
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect())
}

/// Per-status processing duration statistics over transitioned reports.
pub fn duration_stats(session: &Session) -> Result<Vec<DurationStats>, StoreError> {
    let samples = timing_samples(session)?;
    Ok(stats::duration_stats(&samples))
}
