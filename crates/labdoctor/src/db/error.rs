//! Data access error types.

use sea_orm::DbErr;
use thiserror::Error;

/// Errors from store access.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached or a connection could not be acquired.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The store rejected or failed a query (syntax, missing table, decode).
    #[error("Query error: {0}")]
    Query(String),

    /// The runtime driving the store driver could not be started.
    #[error("Runtime error: {0}")]
    Runtime(#[source] std::io::Error),

    /// A table or column name from configuration is not a plain identifier.
    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),
}

impl StoreError {
    /// Returns true if the whole run must stop.
    ///
    /// Only query failures are isolated to the check that raised them.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, StoreError::Query(_))
    }
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::Conn(e) => StoreError::Connection(e.to_string()),
            DbErr::ConnectionAcquire(e) => StoreError::Connection(e.to_string()),
            other => StoreError::Query(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_errors_are_not_fatal() {
        let err = StoreError::from(DbErr::Custom("no such table: lab_reports".into()));
        assert!(matches!(err, StoreError::Query(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_connection_errors_are_fatal() {
        assert!(StoreError::Connection("refused".into()).is_fatal());
        assert!(StoreError::InvalidIdentifier("a;b".into()).is_fatal());
    }
}
