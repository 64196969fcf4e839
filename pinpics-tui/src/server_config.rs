use crate::config::{ConfigManager, ServerConfig, DEFAULT_SERVER_URL};
use anyhow::Result;

/// Environment variable naming the server
pub const SERVER_URL_ENV: &str = "PINPICS_SERVER_URL";

/// Server configuration utility for managing server URL settings
pub struct ServerConfigManager {
    config_manager: ConfigManager,
}

impl ServerConfigManager {
    pub fn new(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config_manager
    }

    /// Determine the server URL to use based on priority:
    /// 1. CLI argument (highest priority)
    /// 2. Environment variable PINPICS_SERVER_URL
    /// 3. Saved configuration file
    /// 4. Built-in default
    pub fn determine_server_url(&self, cli_override: Option<String>) -> Result<String> {
        self.resolve(cli_override, std::env::var(SERVER_URL_ENV).ok())
    }

    fn resolve(&self, cli_override: Option<String>, env_url: Option<String>) -> Result<String> {
        if let Some(url) = cli_override.filter(|u| !u.trim().is_empty()) {
            return Ok(url);
        }

        if let Some(url) = env_url.filter(|u| !u.trim().is_empty()) {
            return Ok(url);
        }

        if let Some(config) = self.config_manager.load_server_config()? {
            return Ok(config.server_url);
        }

        Ok(DEFAULT_SERVER_URL.to_string())
    }

    /// Save server URL to configuration file
    pub fn save_server_url(&self, server_url: String) -> Result<()> {
        let config = ServerConfig {
            server_url,
            last_updated: chrono::Utc::now(),
        };
        self.config_manager.save_server_config(&config)
    }

    /// Short label for the status bar
    pub fn server_description(current_url: &str) -> String {
        if current_url == DEFAULT_SERVER_URL {
            "Local Server (default)".to_string()
        } else if current_url.contains("localhost") || current_url.contains("127.0.0.1") {
            "Local Server (custom)".to_string()
        } else {
            "Custom Server".to_string()
        }
    }
}
