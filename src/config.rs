// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration management for the quest tracker server

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::{defaults, env_config};

/// Server configuration, stored as TOML next to other user config
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Port the HTTP surface listens on
    pub http_port: u16,
    /// Database connection URL
    pub database_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            database_url: defaults::DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file, falling back to environment
    /// variables when the file does not exist
    pub fn load(path: Option<String>) -> Result<Self> {
        let config_path = path.unwrap_or_else(default_config_path);

        if Path::new(&config_path).exists() {
            let content = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            toml::from_str(&content)
                .context("Failed to parse config file")
        } else {
            dotenv::dotenv().ok();

            Ok(Self {
                http_port: env_config::http_port(),
                database_url: env_config::database_url(),
            })
        }
    }

    /// Write the configuration to a TOML file, creating directories as needed
    pub fn save(&self, path: Option<String>) -> Result<()> {
        let config_path = path.unwrap_or_else(default_config_path);

        let parent = Path::new(&config_path).parent()
            .context("Invalid config path")?;
        fs::create_dir_all(parent)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;

        Ok(())
    }
}

fn default_config_path() -> String {
    dirs::config_dir()
        .map(|p| p.join("quest-tracker/config.toml"))
        .unwrap_or_else(|| "config.toml".into())
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Helper function to create a temporary config file
    fn create_temp_config_file(content: &str) -> (TempDir, String) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, content).expect("Failed to write temp config");
        (temp_dir, config_path.to_string_lossy().to_string())
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.database_url, "sqlite:./data/quest.db");
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = ServerConfig {
            http_port: 9200,
            database_url: "sqlite:/tmp/tracker.db".to_string(),
        };

        let toml_str = toml::to_string_pretty(&config).expect("Failed to serialize config");
        assert!(toml_str.contains("http_port"));
        assert!(toml_str.contains("9200"));

        let deserialized: ServerConfig =
            toml::from_str(&toml_str).expect("Failed to deserialize config");
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_config_load_from_file() {
        let config_content = r#"
http_port = 9090
database_url = "sqlite:/var/lib/quest/tracker.db"
"#;
        let (_temp_dir, config_path) = create_temp_config_file(config_content);

        let config = ServerConfig::load(Some(config_path)).expect("Failed to load config");

        assert_eq!(config.http_port, 9090);
        assert_eq!(config.database_url, "sqlite:/var/lib/quest/tracker.db");
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let (_temp_dir, config_path) = create_temp_config_file("http_port = 9001\n");

        let config = ServerConfig::load(Some(config_path)).expect("Failed to load config");

        assert_eq!(config.http_port, 9001);
        assert_eq!(config.database_url, ServerConfig::default().database_url);
    }

    #[test]
    fn test_config_load_missing_file_falls_back_to_env() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let nonexistent = temp_dir.path().join("definitely_missing_config.toml");
        let config_path = nonexistent.to_string_lossy().to_string();
        assert!(!Path::new(&config_path).exists());

        let config = ServerConfig::load(Some(config_path)).expect("Failed to load config");

        // Whatever the environment holds, the fallback must agree with the
        // env_config accessors rather than invent its own values
        assert_eq!(config.http_port, env_config::http_port());
        assert_eq!(config.database_url, env_config::database_url());
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let (_temp_dir, config_path) = create_temp_config_file("this is not valid toml [[[");

        let result = ServerConfig::load(Some(config_path));
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_save_creates_directory() {
        let config = ServerConfig {
            http_port: 9300,
            database_url: "sqlite:./quest-test.db".to_string(),
        };
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let nested_path = temp_dir.path().join("nested").join("dir").join("config.toml");
        let nested_path_str = nested_path.to_string_lossy().to_string();

        config
            .save(Some(nested_path_str.clone()))
            .expect("Failed to save config with nested path");

        assert!(nested_path.exists());
        let loaded = ServerConfig::load(Some(nested_path_str)).expect("Failed to load saved config");
        assert_eq!(loaded, config);
    }
}
