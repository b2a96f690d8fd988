use std::path::{Path, PathBuf};

use crate::config::schema::DoctorConfig;
use crate::db::{StoreError, StoreLayout};
use crate::error::ConfigError;

/// Loads a config file. `.yaml`/`.yml` files are parsed as YAML, anything
/// else as JSON.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<DoctorConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let config: DoctorConfig = if is_yaml {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    validate_config(&config)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn load_config_from_str(content: &str) -> Result<DoctorConfig, ConfigError> {
    let config: DoctorConfig = serde_json::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Loads `explicit` if given, else the default config file if it exists,
/// else the built-in defaults.
pub fn load_or_default(explicit: Option<&Path>) -> Result<DoctorConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match default_config_path() {
        Some(path) if path.is_file() => load_config(&path),
        _ => Ok(DoctorConfig::default()),
    }
}

/// Returns the canonical config path: `~/.labdoctor/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".labdoctor").join("config.json"))
}

/// Builds the table layout from the `tables` section.
pub fn store_layout(config: &DoctorConfig) -> Result<StoreLayout, ConfigError> {
    let tables = &config.tables;
    StoreLayout::new(
        &tables.reports,
        &tables.derived,
        &tables.derived_report_column,
        &tables.storage_objects,
    )
    .map_err(|e| match e {
        StoreError::InvalidIdentifier(name) => ConfigError::Validation {
            message: format!("Invalid table or column name '{}'", name),
        },
        other => ConfigError::Validation {
            message: other.to_string(),
        },
    })
}

pub fn validate_config(config: &DoctorConfig) -> Result<(), ConfigError> {
    let checks = &config.checks;
    if checks.stuck_limit == 0 {
        return Err(ConfigError::Validation {
            message: "checks.stuckLimit must be at least 1".to_string(),
        });
    }
    if checks.recent_limit == 0 {
        return Err(ConfigError::Validation {
            message: "checks.recentLimit must be at least 1".to_string(),
        });
    }
    if checks.stale_after_secs < 0 {
        return Err(ConfigError::Validation {
            message: "checks.staleAfterSecs must not be negative".to_string(),
        });
    }
    if chrono::Duration::try_seconds(checks.stale_after_secs).is_none() {
        return Err(ConfigError::Validation {
            message: format!(
                "checks.staleAfterSecs is out of range: {}",
                checks.stale_after_secs
            ),
        });
    }
    if checks.report_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(ConfigError::Validation {
            message: "checks.reportIds must not contain empty ids".to_string(),
        });
    }

    if config.store.port == 0 {
        return Err(ConfigError::Validation {
            message: "store.port must be non-zero".to_string(),
        });
    }

    store_layout(config)?;
    Ok(())
}
