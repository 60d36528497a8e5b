use std::{env, path::PathBuf, time::Duration};

use crate::errors::DashboardError;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_LOG_FILE: &str = "salesboard.log";

pub const API_URL_VAR: &str = "SALESBOARD_API_URL";
pub const TIMEOUT_VAR: &str = "SALESBOARD_TIMEOUT_SECS";
pub const LOG_FILE_VAR: &str = "SALESBOARD_LOG_FILE";

#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub base_url: String,
    /// `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
    pub log_file: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: None,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl BackendConfig {
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DashboardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_VAR).filter(|v| !v.trim().is_empty()) {
            let url = url.trim().trim_end_matches('/').to_string();
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(DashboardError::Config(format!(
                    "{} doit être une URL http(s), reçu '{}'",
                    API_URL_VAR, url
                )));
            }
            config.base_url = url;
        }

        if let Some(secs) = lookup(TIMEOUT_VAR).filter(|v| !v.trim().is_empty()) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                DashboardError::Config(format!(
                    "{} doit être un nombre de secondes, reçu '{}'",
                    TIMEOUT_VAR, secs
                ))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        if let Some(path) = lookup(LOG_FILE_VAR).filter(|v| !v.trim().is_empty()) {
            config.log_file = PathBuf::from(path);
        }

        Ok(config)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
