//! Session configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_AUTH_API_BASE_URL: &str = "http://127.0.0.1:5000/api";
pub const DEFAULT_AUTH_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_AUTH_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SESSION_STORE_PATH: &str = ".portal-session.json";
pub const DEFAULT_ELEVATED_ROLES: &[&str] = &["admin", "superadmin"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for AuthTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_AUTH_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_AUTH_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub base_url: String,
    pub timeouts: AuthTimeouts,
    pub store_path: PathBuf,
    pub elevated_roles: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_AUTH_API_BASE_URL.to_owned(),
            timeouts: AuthTimeouts::default(),
            store_path: PathBuf::from(DEFAULT_SESSION_STORE_PATH),
            elevated_roles: DEFAULT_ELEVATED_ROLES.iter().map(|r| (*r).to_owned()).collect(),
        }
    }
}

impl AuthConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `AUTH_API_BASE_URL`: default `http://127.0.0.1:5000/api`
    /// - `AUTH_REQUEST_TIMEOUT_SECS`: default 30
    /// - `AUTH_CONNECT_TIMEOUT_SECS`: default 10
    /// - `SESSION_STORE_PATH`: persistent tier file, default `.portal-session.json`
    /// - `AUTH_ELEVATED_ROLES`: comma-separated, default `admin,superadmin`
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is blank or the role list is empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_base_url(std::env::var("AUTH_API_BASE_URL").ok().as_deref())?;
        let timeouts = AuthTimeouts {
            request_secs: env_parse_u64("AUTH_REQUEST_TIMEOUT_SECS", DEFAULT_AUTH_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("AUTH_CONNECT_TIMEOUT_SECS", DEFAULT_AUTH_CONNECT_TIMEOUT_SECS),
        };
        let store_path = std::env::var("SESSION_STORE_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_STORE_PATH), PathBuf::from);
        let elevated_roles = parse_roles(std::env::var("AUTH_ELEVATED_ROLES").ok().as_deref())?;

        Ok(Self { base_url, timeouts, store_path, elevated_roles })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_base_url(raw: Option<&str>) -> Result<String, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_AUTH_API_BASE_URL.to_owned());
    };
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid { var: "AUTH_API_BASE_URL", reason: "empty".into() });
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(ConfigError::Invalid {
            var: "AUTH_API_BASE_URL",
            reason: format!("'{trimmed}' is not an http(s) URL"),
        });
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn parse_roles(raw: Option<&str>) -> Result<Vec<String>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_ELEVATED_ROLES.iter().map(|r| (*r).to_owned()).collect());
    };
    let roles: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_owned)
        .collect();
    if roles.is_empty() {
        return Err(ConfigError::Invalid { var: "AUTH_ELEVATED_ROLES", reason: "no roles listed".into() });
    }
    Ok(roles)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
