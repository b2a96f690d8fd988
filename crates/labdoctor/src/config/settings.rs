//! Resolution of the two required connection settings.
//!
//! The project reference and the database password must both be present
//! before any connection is attempted. A missing setting is reported by
//! name, together with any other missing one.

use std::time::Duration;

use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};

use crate::config::schema::StoreConfig;
use crate::error::ConfigError;
use crate::secrets::{self, SecretError};

/// Everything needed to open the production store.
#[derive(Debug)]
pub struct StoreSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub database: String,
    pub password: SecretString,
    pub connect_timeout: Duration,
}

impl StoreSettings {
    /// Resolves settings from config, an optional CLI override, and the
    /// environment.
    pub fn resolve(
        store: &StoreConfig,
        project_ref_override: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();

        let project_ref = project_ref_override
            .map(str::to_string)
            .or_else(|| store.project_ref.clone())
            .or_else(|| std::env::var(&store.project_ref_env_var).ok())
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if project_ref.is_none() {
            missing.push(store.project_ref_env_var.clone());
        }

        let password = match secrets::resolve_secret(
            store.password.as_deref(),
            store.password_file.as_deref(),
            Some(store.password_env_var.as_str()),
        ) {
            Ok(secret) => Some(secret),
            Err(SecretError::EnvVarNotSet { name }) => {
                missing.push(name);
                None
            }
            Err(SecretError::NoSourceProvided) => {
                missing.push(store.password_env_var.clone());
                None
            }
            Err(e) => return Err(e.into()),
        };

        match (project_ref, password) {
            (Some(project_ref), Some(password)) => {
                let host = if project_ref.contains('.') {
                    project_ref
                } else {
                    format!("{}.{}", project_ref, store.host_suffix)
                };
                Ok(Self {
                    host,
                    port: store.port,
                    user: store.user.clone(),
                    database: store.database.clone(),
                    password,
                    connect_timeout: Duration::from_secs(store.connect_timeout_secs),
                })
            }
            _ => Err(ConfigError::MissingSettings { names: missing }),
        }
    }

    /// Postgres URL with the user and password percent-encoded.
    pub fn connection_url(&self) -> Result<SecretString, ConfigError> {
        let mut url = Url::parse(&format!(
            "postgres://{}:{}/{}",
            self.host, self.port, self.database
        ))
        .map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;
        url.set_username(&self.user)
            .map_err(|_| ConfigError::InvalidUrl(format!("cannot set user '{}'", self.user)))?;
        url.set_password(Some(self.password.expose_secret()))
            .map_err(|_| ConfigError::InvalidUrl("cannot set password".to_string()))?;
        Ok(SecretString::from(url.to_string()))
    }
}
