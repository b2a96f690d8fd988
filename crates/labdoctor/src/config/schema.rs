use serde::{Deserialize, Serialize};

use crate::checks::CheckOptions;

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DoctorConfig {
    pub store: StoreConfig,
    pub tables: TablesConfig,
    pub checks: ChecksConfig,
}

/// Where the pipeline database lives and how to authenticate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// Project reference (`abcd1234`) or a full host name.
    pub project_ref: Option<String>,
    /// Env var consulted when `projectRef` is not set.
    pub project_ref_env_var: String,
    /// Direct password. Prefer `passwordFile` or `passwordEnvVar`.
    pub password: Option<String>,
    pub password_file: Option<String>,
    pub password_env_var: String,
    /// Appended to a bare project reference to form the host.
    pub host_suffix: String,
    pub port: u16,
    pub user: String,
    pub database: String,
    pub connect_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            project_ref: None,
            project_ref_env_var: "SUPABASE_PROJECT_REF".to_string(),
            password: None,
            password_file: None,
            password_env_var: "SUPABASE_DB_PASSWORD".to_string(),
            host_suffix: "supabase.co".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            database: "postgres".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

/// Table names read by the checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TablesConfig {
    pub reports: String,
    pub derived: String,
    pub derived_report_column: String,
    pub storage_objects: String,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            reports: "lab_reports".to_string(),
            derived: "biomarkers".to_string(),
            derived_report_column: "report_id".to_string(),
            storage_objects: "storage.objects".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChecksConfig {
    pub stuck_limit: u64,
    pub recent_limit: u64,
    pub stale_after_secs: i64,
    pub storage_match_limit: u64,
    /// Report ids to look up on every run.
    pub report_ids: Vec<String>,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            stuck_limit: 10,
            recent_limit: 5,
            stale_after_secs: 3600,
            storage_match_limit: 5,
            report_ids: Vec::new(),
        }
    }
}

impl ChecksConfig {
    /// Builds run options, appending `extra_ids` to the configured ids.
    ///
    /// Ids are trimmed; blank ones are dropped.
    pub fn to_options(&self, extra_ids: &[String]) -> CheckOptions {
        let mut report_ids: Vec<String> = Vec::new();
        for id in self.report_ids.iter().chain(extra_ids) {
            let id = id.trim();
            if id.is_empty() {
                log::warn!("Ignoring blank report id");
                continue;
            }
            if !report_ids.iter().any(|known| known == id) {
                report_ids.push(id.to_string());
            }
        }
        CheckOptions {
            stuck_limit: self.stuck_limit,
            recent_limit: self.recent_limit,
            // Out-of-range values are rejected by validate_config.
            stale_after: chrono::Duration::try_seconds(self.stale_after_secs)
                .unwrap_or(chrono::Duration::MAX),
            report_ids,
            storage_match_limit: self.storage_match_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_check_options() {
        assert_eq!(ChecksConfig::default().to_options(&[]), CheckOptions::default());
    }

    #[test]
    fn test_extra_ids_deduplicated() {
        let config = ChecksConfig {
            report_ids: vec!["a".into()],
            ..ChecksConfig::default()
        };
        let options = config.to_options(&["a".into(), "b".into()]);
        assert_eq!(options.report_ids, vec!["a", "b"]);
    }

    #[test]
    fn test_blank_ids_dropped() {
        let options = ChecksConfig::default().to_options(&["".into(), "  ".into(), " c ".into()]);
        assert_eq!(options.report_ids, vec!["c"]);
    }

    #[test]
    fn test_huge_stale_bound_does_not_panic() {
        let config = ChecksConfig {
            stale_after_secs: i64::MAX,
            ..ChecksConfig::default()
        };
        assert_eq!(config.to_options(&[]).stale_after, chrono::Duration::MAX);
    }
}
