//! Builders for seed rows.
//!
//! `Seed` collects reports, derived rows and storage objects and renders
//! them as one SQL batch for `StoreHarness::new`.

#![allow(dead_code)]

fn quote(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("'{}'", v.replace('\'', "''")),
        None => "NULL".to_string(),
    }
}

/// Builder for one `lab_reports` row.
pub struct ReportBuilder {
    id: String,
    user_id: Option<String>,
    status: Option<String>,
    file_path: Option<String>,
    pdf_url: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

impl ReportBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            user_id: Some("user-1".to_string()),
            status: Some("processing".to_string()),
            file_path: None,
            pdf_url: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn no_status(mut self) -> Self {
        self.status = None;
        self
    }

    pub fn user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    pub fn file_path(mut self, path: &str) -> Self {
        self.file_path = Some(path.to_string());
        self
    }

    pub fn pdf_url(mut self, url: &str) -> Self {
        self.pdf_url = Some(url.to_string());
        self
    }

    /// RFC 3339 creation time.
    pub fn created(mut self, ts: &str) -> Self {
        self.created_at = Some(ts.to_string());
        self
    }

    pub fn updated(mut self, ts: &str) -> Self {
        self.updated_at = Some(ts.to_string());
        self
    }

    fn to_sql(&self) -> String {
        format!(
            "INSERT INTO lab_reports (id, user_id, status, file_path, pdf_url, created_at, updated_at) \
             VALUES ({}, {}, {}, {}, {}, {}, {});",
            quote(Some(&self.id)),
            quote(self.user_id.as_deref()),
            quote(self.status.as_deref()),
            quote(self.file_path.as_deref()),
            quote(self.pdf_url.as_deref()),
            quote(self.created_at.as_deref()),
            quote(self.updated_at.as_deref()),
        )
    }
}

/// Collects seed rows for every table.
#[derive(Default)]
pub struct Seed {
    statements: Vec<String>,
}

impl Seed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(mut self, report: ReportBuilder) -> Self {
        self.statements.push(report.to_sql());
        self
    }

    /// Adds `count` derived rows for `report_id`.
    pub fn derived(mut self, report_id: &str, count: usize) -> Self {
        for i in 0..count {
            self.statements.push(format!(
                "INSERT INTO biomarkers (report_id, name) VALUES ({}, 'marker-{}');",
                quote(Some(report_id)),
                i
            ));
        }
        self
    }

    pub fn object(mut self, id: &str, name: &str) -> Self {
        self.statements.push(format!(
            "INSERT INTO storage_objects (id, name) VALUES ({}, {});",
            quote(Some(id)),
            quote(Some(name))
        ));
        self
    }

    pub fn to_sql(&self) -> String {
        self.statements.join("\n")
    }
}
