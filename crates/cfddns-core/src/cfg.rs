//! Load run settings from an optional `cfddns.toml` and the environment

use crate::error::ConfigError;
use config::{Config, Environment, File, Map};
use serde::Deserialize;
use std::{fmt, path::Path, path::PathBuf};
use validator::Validate;

/// Log-file suffixes accepted as-is; anything else gets `.log` appended.
const LOG_SUFFIXES: &[&str] = &["log", "txt"];

/*──────── IP lookup ────────*/
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupKind {
    /// run `curl -s <endpoint>`
    #[default]
    Command,
    /// GET the endpoint in-process
    Http,
}

fn default_endpoint() -> String {
    "https://ifconfig.co".into()
}

/*──────── Settings ────────*/
#[derive(Clone, Deserialize, Validate)]
pub struct Settings {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub api_token: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub zone_name: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub record_name: String,

    #[serde(default)]
    pub logging_file: Option<String>,

    #[serde(default)]
    pub ip_lookup: LookupKind,
    #[serde(default = "default_endpoint")]
    pub ip_endpoint: String,
    /// timeout in milliseconds; no timeout when unset
    #[serde(default)]
    pub ip_lookup_timeout_ms: Option<u64>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_token", &"<redacted>")
            .field("zone_name", &self.zone_name)
            .field("record_name", &self.record_name)
            .field("logging_file", &self.logging_file)
            .field("ip_lookup", &self.ip_lookup)
            .field("ip_endpoint", &self.ip_endpoint)
            .field("ip_lookup_timeout_ms", &self.ip_lookup_timeout_ms)
            .finish()
    }
}

impl Settings {
    /// Fails with the upper-cased names of every empty required setting.
    pub fn validate_required(&self) -> Result<(), ConfigError> {
        Ok(self.validate()?)
    }

    /// Configured log file with a recognized suffix.
    pub fn log_file(&self) -> Option<PathBuf> {
        normalize_log_file(self.logging_file.as_deref()?)
    }
}

fn normalize_log_file(raw: &str) -> Option<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let known = Path::new(raw)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| LOG_SUFFIXES.iter().any(|s| e.eq_ignore_ascii_case(s)));
    if known {
        Some(PathBuf::from(raw))
    } else {
        Some(PathBuf::from(format!("{raw}.log")))
    }
}

/// Load settings from the optional TOML file at `path` and the process
/// environment (`API_TOKEN`, `ZONE_NAME`, `RECORD_NAME`, `LOGGING_FILE`, ...).
///
/// Environment values win over file values. Required fields are **not**
/// checked here; see [`Settings::validate_required`].
pub fn load_settings(path: &str) -> Result<Settings, ConfigError> {
    load_settings_from(path, None)
}

/// Like [`load_settings`], reading variables from `env` instead of the
/// process environment when it is `Some`.
pub fn load_settings_from(
    path: &str,
    env: Option<Map<String, String>>,
) -> Result<Settings, ConfigError> {
    Ok(layered(Some(path), env)?.try_deserialize()?)
}

/// Resolve only `LOGGING_FILE`, independent of every other setting.
///
/// Used when [`load_settings`] fails so the failure still reaches the log
/// file. An unreadable TOML file falls back to the environment alone.
pub fn load_log_file(path: &str) -> Option<PathBuf> {
    load_log_file_from(path, None)
}

pub fn load_log_file_from(path: &str, env: Option<Map<String, String>>) -> Option<PathBuf> {
    let raw = match layered(Some(path), env.clone()) {
        Ok(c) => c.get_string("logging_file").ok(),
        Err(_) => layered(None, env)
            .ok()
            .and_then(|c| c.get_string("logging_file").ok()),
    }?;
    normalize_log_file(&raw)
}

fn layered(
    path: Option<&str>,
    env: Option<Map<String, String>>,
) -> Result<Config, config::ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path.filter(|p| Path::new(p).exists()) {
        builder = builder.add_source(File::with_name(path).required(true));
    }
    builder
        .add_source(Environment::default().ignore_empty(true).source(env))
        .build()
}
