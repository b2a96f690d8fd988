//! Grouped counts of extracted biomarker rows.

use std::collections::BTreeMap;

use sea_orm::sea_query::{Alias, Asterisk, Expr, Func, Order, Query};
use sea_orm::FromQueryResult;

use super::{Session, StoreError};

/// Number of derived rows pointing at one report.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct DerivedCountRow {
    pub report_id: String,
    pub derived_count: i64,
}

/// Counts derived rows per report for the given report ids.
///
/// Reports without any derived rows are absent from the map. An empty id
/// set returns an empty map without querying.
pub fn counts_for_reports(
    session: &Session,
    report_ids: &[String],
) -> Result<BTreeMap<String, i64>, StoreError> {
    if report_ids.is_empty() {
        return Ok(BTreeMap::new());
    }

    let layout = session.layout();
    let fk = Alias::new(layout.derived_report_column.as_str());
    let fk_text = Expr::col(fk.clone()).cast_as(Alias::new("TEXT"));

    let query = Query::select()
        .expr_as(fk_text.clone(), Alias::new("report_id"))
        .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("derived_count"))
        .from(layout.derived.table_ref())
        .and_where(Expr::expr(fk_text).is_in(report_ids.iter().cloned()))
        .group_by_col(fk)
        .order_by(Alias::new("report_id"), Order::Asc)
        .to_owned();

    let rows: Vec<DerivedCountRow> = session.fetch_all(&query)?;
    Ok(rows
        .into_iter()
        .map(|row| (row.report_id, row.derived_count))
        .collect())
}
