//! Client configuration.
//!
//! Read from TOML, then overridden by `MAMATOTO_API_URL` and
//! `MAMATOTO_TOKEN_FILE` when they are set.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const API_URL_ENV: &str = "MAMATOTO_API_URL";
pub const TOKEN_FILE_ENV: &str = "MAMATOTO_TOKEN_FILE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Backend root, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Where the session token is persisted. `None` keeps it in memory.
    pub token_file: Option<PathBuf>,
    /// Suffix for page titles.
    pub app_title: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            token_file: None,
            app_title: "Mamatoto".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Load `path` and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&raw)?;
        config.apply_env();
        Ok(config)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(TOKEN_FILE_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, base_url: Option<String>, token_file: Option<String>) {
        if let Some(url) = base_url.filter(|url| !url.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(path) = token_file.filter(|path| !path.trim().is_empty()) {
            self.token_file = Some(PathBuf::from(path));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, "http://localhost:8000");
        assert!(config.token_file.is_none());
    }

    #[test]
    fn toml_fields_are_read() {
        let config = ClientConfig::from_toml_str(
            r#"
            base_url = "https://api.mamatoto.example"
            token_file = "/var/lib/mamatoto/session.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://api.mamatoto.example");
        assert_eq!(config.token_file, Some(PathBuf::from("/var/lib/mamatoto/session.json")));
        assert_eq!(config.app_title, "Mamatoto");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ClientConfig::from_toml_str("base_uri = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn overrides_replace_non_empty_values() {
        let mut config = ClientConfig::default();
        config.apply_overrides(Some("http://10.0.0.2:8000".to_string()), Some(String::new()));
        assert_eq!(config.base_url, "http://10.0.0.2:8000");
        assert!(config.token_file.is_none());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
