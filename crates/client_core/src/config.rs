use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const SETTINGS_FILE_NAME: &str = "leafchat.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    log_filter: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid api base url '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },
}

/// Defaults, then the settings file, then environment overrides.
///
/// An explicit `path` must exist. Without one, `./leafchat.toml` and then
/// `<config dir>/leafchat/leafchat.toml` are tried and silently skipped when absent.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    let file = match path {
        Some(path) => Some(path.to_path_buf()),
        None => default_settings_path(),
    };
    if let Some(file) = file {
        apply_file(&mut settings, &file)?;
    }

    apply_env(&mut settings, |name| std::env::var(name).ok());
    settings.api_base_url = normalize_base_url(&settings.api_base_url)?;
    Ok(settings)
}

impl Settings {
    /// Command-line override, applied after [`load_settings`].
    pub fn with_base_url_override(mut self, base_url: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(base_url) = base_url {
            self.api_base_url = normalize_base_url(base_url)?;
        }
        Ok(self)
    }
}

fn default_settings_path() -> Option<PathBuf> {
    let local = PathBuf::from(SETTINGS_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("leafchat").join(SETTINGS_FILE_NAME))
        .filter(|path| path.is_file())
}

fn apply_file(settings: &mut Settings, path: &Path) -> Result<(), ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file_cfg: FileSettings = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("LEAFCHAT_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = non_empty("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = non_empty("LEAFCHAT_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = non_empty("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

/// Validates an http(s) base url and strips trailing slashes so endpoint paths
/// can be appended directly.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_API_BASE_URL.to_string());
    }

    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        value: raw.to_string(),
        reason,
    };
    let parsed = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
