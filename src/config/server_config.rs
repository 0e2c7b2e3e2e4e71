//! Server configuration
//!
//! Settings live in `settings.json` inside the config dir. Missing keys fall
//! back to their defaults, and a missing file is created on first load.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::Paths;

/// Environment variable overriding the CORS allow-list (comma separated)
pub const ALLOWED_ORIGINS_ENV: &str = "CATALOG_ALLOWED_ORIGINS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Server ID, doubles as the JWT signing secret
    #[serde(default)]
    pub server_id: String,

    /// Lifetime of access tokens and the session cookie, in seconds
    #[serde(default = "default_access_max_age")]
    pub access_max_age: i64,

    /// Largest accepted upload, in bytes
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,

    /// Origins allowed by CORS; empty means any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_id: String::new(),
            access_max_age: default_access_max_age(),
            max_upload_size: default_max_upload_size(),
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the settings file, creating it when absent
    pub fn load(paths: &Paths) -> Result<Self> {
        let settings_path = paths.settings_path();

        if settings_path.exists() {
            let content =
                std::fs::read_to_string(&settings_path).context("Failed to read settings file")?;
            let config: ServerConfig =
                serde_json::from_str(&content).context("Failed to parse settings file")?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save(paths)?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self, paths: &Paths) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(paths.settings_path(), content).context("Failed to write settings file")?;

        Ok(())
    }

    /// Generate a server id if the settings do not carry one yet.
    ///
    /// Returns true when the config changed and should be saved.
    pub fn ensure_server_id(&mut self) -> bool {
        if self.server_id.is_empty() {
            self.server_id = uuid::Uuid::new_v4().to_string();
            return true;
        }
        false
    }

    /// Apply the allowed-origins override from the environment, if set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var(ALLOWED_ORIGINS_ENV) {
            self.allowed_origins = parse_origins(&raw);
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn default_access_max_age() -> i64 {
    30 * 24 * 3600
}

fn default_max_upload_size() -> usize {
    10 * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert!(config.server_id.is_empty());
        assert_eq!(config.access_max_age, 30 * 24 * 3600);
        assert_eq!(config.max_upload_size, 10 * 1024 * 1024);
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let config: ServerConfig = serde_json::from_str(r#"{"serverId": "abc"}"#).unwrap();
        assert_eq!(config.server_id, "abc");
        assert_eq!(config.access_max_age, default_access_max_age());
    }

    #[test]
    fn test_load_creates_and_roundtrips() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::new(Some(temp_dir.path().to_path_buf())).unwrap();

        let mut config = ServerConfig::load(&paths).unwrap();
        assert!(paths.settings_path().exists());

        assert!(config.ensure_server_id());
        assert!(!config.ensure_server_id());
        config.save(&paths).unwrap();

        let reloaded = ServerConfig::load(&paths).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://localhost:5173/, https://catalog.example ,,"),
            vec!["http://localhost:5173", "https://catalog.example"]
        );
        assert!(parse_origins("  ").is_empty());
    }
}
