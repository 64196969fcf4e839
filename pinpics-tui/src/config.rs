use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Server used when nothing else is configured
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Server configuration stored locally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub server_url: String,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            last_updated: chrono::Utc::now(),
        }
    }
}

/// Persisted login, restored on the next start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSession {
    pub session_token: String,
    /// Server the token was issued by
    pub server_url: String,
}

/// Configuration manager for the `~/.pinpics` directory
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a config manager rooted at `~/.pinpics`
    pub fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Could not determine home directory")?;
        Self::with_dir(home_dir.join(".pinpics"))
    }

    /// Create a config manager rooted at an arbitrary directory
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).context("Failed to create .pinpics directory")?;
        }
        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    fn server_config_file(&self) -> PathBuf {
        self.config_dir.join("server_config.json")
    }

    fn session_file(&self) -> PathBuf {
        self.config_dir.join("session.json")
    }

    /// Save server configuration
    pub fn save_server_config(&self, config: &ServerConfig) -> Result<()> {
        let json =
            serde_json::to_string_pretty(config).context("Failed to serialize server config")?;
        fs::write(self.server_config_file(), json)
            .context("Failed to write server config file")?;
        Ok(())
    }

    /// Load server configuration
    pub fn load_server_config(&self) -> Result<Option<ServerConfig>> {
        let config_file = self.server_config_file();
        if !config_file.exists() {
            return Ok(None);
        }

        let json =
            fs::read_to_string(&config_file).context("Failed to read server config file")?;
        let config: ServerConfig =
            serde_json::from_str(&json).context("Failed to parse server config")?;
        Ok(Some(config))
    }

    /// Save the session with owner-only permissions
    ///
    /// Written to a temporary file first and renamed into place.
    pub fn save_session(&self, session: &SavedSession) -> Result<()> {
        let session_file = self.session_file();
        let temp_path = session_file.with_extension("tmp");
        let json =
            serde_json::to_string_pretty(session).context("Failed to serialize session")?;

        let mut file =
            fs::File::create(&temp_path).context("Failed to create temporary session file")?;
        file.write_all(json.as_bytes())
            .context("Failed to write session file")?;
        file.sync_all()
            .context("Failed to sync session file to disk")?;
        drop(file);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))
                .context("Failed to set session file permissions")?;
        }

        fs::rename(&temp_path, &session_file).context("Failed to rename session file")?;
        log::info!("Saved session to {}", session_file.display());
        Ok(())
    }

    /// Load the saved session
    ///
    /// A corrupt or empty session file is treated as no session.
    pub fn load_session(&self) -> Result<Option<SavedSession>> {
        let session_file = self.session_file();
        if !session_file.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&session_file).context("Failed to read session file")?;
        match serde_json::from_str::<SavedSession>(&json) {
            Ok(session) if !session.session_token.trim().is_empty() => Ok(Some(session)),
            Ok(_) => {
                log::warn!("Session file has an empty token, ignoring it");
                Ok(None)
            }
            Err(e) => {
                log::warn!("Session file is corrupted, ignoring it: {}", e);
                Ok(None)
            }
        }
    }

    /// Delete the saved session; missing files are fine
    pub fn delete_session(&self) -> Result<()> {
        let session_file = self.session_file();
        if session_file.exists() {
            fs::remove_file(&session_file).context("Failed to delete session file")?;
            log::info!("Deleted session file at {}", session_file.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager(dir: &TempDir) -> ConfigManager {
        ConfigManager::with_dir(dir.path().join("pinpics")).unwrap()
    }

    fn session() -> SavedSession {
        SavedSession {
            session_token: "token-12345".to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }

    #[test]
    fn test_with_dir_creates_directory() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);
        assert!(manager.config_dir().is_dir());
    }

    #[test]
    fn test_server_config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);
        assert!(manager.load_server_config().unwrap().is_none());

        let config = ServerConfig {
            server_url: "http://pics.local:8080".to_string(),
            last_updated: chrono::Utc::now(),
        };
        manager.save_server_config(&config).unwrap();

        let loaded = manager.load_server_config().unwrap().unwrap();
        assert_eq!(loaded.server_url, "http://pics.local:8080");
    }

    #[test]
    fn test_save_load_and_delete_session() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);

        manager.save_session(&session()).unwrap();
        assert_eq!(manager.load_session().unwrap(), Some(session()));

        manager.delete_session().unwrap();
        assert_eq!(manager.load_session().unwrap(), None);
        // Deleting twice is not an error
        manager.delete_session().unwrap();
    }

    #[test]
    fn test_corrupted_session_is_ignored() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);
        fs::write(manager.session_file(), b"{not json").unwrap();
        assert_eq!(manager.load_session().unwrap(), None);
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);
        manager
            .save_session(&SavedSession {
                session_token: "   ".to_string(),
                server_url: DEFAULT_SERVER_URL.to_string(),
            })
            .unwrap();
        assert_eq!(manager.load_session().unwrap(), None);
    }

    #[test]
    #[cfg(unix)]
    fn test_session_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);
        manager.save_session(&session()).unwrap();

        let mode = fs::metadata(manager.session_file()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!manager.session_file().with_extension("tmp").exists());
    }
}
