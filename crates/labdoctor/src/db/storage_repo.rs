//! Existence lookups against the object store catalog.

use sea_orm::sea_query::{Alias, Expr, LikeExpr, Order, Query, SelectStatement};
use sea_orm::FromQueryResult;
use serde::Serialize;

use super::{Session, StoreError, TableName};

/// One entry of the object store catalog.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct StorageObjectRow {
    pub name: String,
    pub id: String,
}

fn select_objects(table: &TableName) -> SelectStatement {
    Query::select()
        .column(Alias::new("name"))
        .expr_as(
            Expr::col(Alias::new("id")).cast_as(Alias::new("TEXT")),
            Alias::new("id"),
        )
        .from(table.table_ref())
        .to_owned()
}

/// Escapes LIKE wildcards so `fragment` matches literally.
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Looks up an object by its exact storage path.
pub fn find_by_name(session: &Session, name: &str) -> Result<Option<StorageObjectRow>, StoreError> {
    let query = select_objects(&session.layout().objects)
        .and_where(Expr::col(Alias::new("name")).eq(name))
        .limit(1)
        .to_owned();
    session.fetch_optional(&query)
}

/// Finds objects whose name contains `fragment`, ordered by name.
pub fn find_containing(
    session: &Session,
    fragment: &str,
    limit: u64,
) -> Result<Vec<StorageObjectRow>, StoreError> {
    let pattern = format!("%{}%", escape_like(fragment));
    let query = select_objects(&session.layout().objects)
        .and_where(Expr::col(Alias::new("name")).like(LikeExpr::new(pattern).escape('\\')))
        .order_by(Alias::new("name"), Order::Asc)
        .limit(limit)
        .to_owned();
    session.fetch_all(&query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::TestStore;

    const SEED: &str = "
        INSERT INTO storage_objects VALUES
          ('o1', 'p1'),
          ('o2', 'u1/05e8faed-d5d2-4d19-a22d-7f5eb1f22129.pdf'),
          ('o3', 'u1/100%_done.pdf');
    ";

    #[test]
    fn test_find_by_exact_name() {
        let store = TestStore::new(SEED);
        let session = store.session();
        let found = find_by_name(&session, "p1").unwrap().unwrap();
        assert_eq!(found.id, "o1");
        assert!(find_by_name(&session, "p").unwrap().is_none());
    }

    #[test]
    fn test_find_containing_substring() {
        let store = TestStore::new(SEED);
        let session = store.session();
        let found =
            find_containing(&session, "05e8faed-d5d2-4d19-a22d-7f5eb1f22129", 5).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "o2");
    }

    #[test]
    fn test_wildcards_match_literally() {
        let store = TestStore::new(SEED);
        let session = store.session();
        assert_eq!(find_containing(&session, "%_", 5).unwrap().len(), 1);
        assert!(find_containing(&session, "0_", 5).unwrap().is_empty());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("a%b_c\\d"), "a\\%b\\_c\\\\d");
    }
}
