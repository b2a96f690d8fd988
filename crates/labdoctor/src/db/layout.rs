//! Table names the diagnostic reads from.
//!
//! The pipeline owns these schemas; the names are configurable so the same
//! checks run against a Supabase project (`storage.objects`) and against a
//! flat SQLite copy (`storage_objects`).

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use sea_orm::sea_query::{Alias, IntoIden, TableRef};

use super::StoreError;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"))
}

/// Checks that `name` is a bare SQL identifier.
pub fn validate_identifier(name: &str) -> Result<(), StoreError> {
    if identifier_pattern().is_match(name) {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

/// A possibly schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    pub schema: Option<String>,
    pub name: String,
}

impl TableName {
    /// Parses `table` or `schema.table`.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let (schema, name) = match raw.split_once('.') {
            Some((schema, name)) => (Some(schema), name),
            None => (None, raw),
        };
        if let Some(schema) = schema {
            validate_identifier(schema)?;
        }
        validate_identifier(name)?;
        Ok(Self {
            schema: schema.map(str::to_string),
            name: name.to_string(),
        })
    }

    pub(crate) fn table_ref(&self) -> TableRef {
        let table = Alias::new(self.name.as_str()).into_iden();
        match &self.schema {
            Some(schema) => TableRef::SchemaTable(Alias::new(schema.as_str()).into_iden(), table),
            None => TableRef::Table(table),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Where each of the three stores lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    /// Report records (`id, user_id, status, file_path, pdf_url, created_at, updated_at`).
    pub reports: TableName,
    /// Derived biomarker rows.
    pub derived: TableName,
    /// Foreign key column in `derived` pointing at a report id.
    pub derived_report_column: String,
    /// Object store catalog (`name, id`).
    pub objects: TableName,
}

impl StoreLayout {
    pub fn new(
        reports: &str,
        derived: &str,
        derived_report_column: &str,
        objects: &str,
    ) -> Result<Self, StoreError> {
        validate_identifier(derived_report_column)?;
        Ok(Self {
            reports: TableName::parse(reports)?,
            derived: TableName::parse(derived)?,
            derived_report_column: derived_report_column.to_string(),
            objects: TableName::parse(objects)?,
        })
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            reports: TableName {
                schema: None,
                name: "lab_reports".to_string(),
            },
            derived: TableName {
                schema: None,
                name: "biomarkers".to_string(),
            },
            derived_report_column: "report_id".to_string(),
            objects: TableName {
                schema: Some("storage".to_string()),
                name: "objects".to_string(),
            },
        }
    }
}
