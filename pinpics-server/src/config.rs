use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
    /// Base URL clients use to reach this server, used for stored image links
    pub public_url: String,
    /// Adds `Secure` to the session cookie
    pub production: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub path: String,
    pub seed_demo_data: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
    pub root: String,
    pub bucket: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub storage: Storage,
    pub auth: Auth,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // settings.toml is optional, checked in the working directory and the crate directory
        let config_file_name = "settings.toml";

        let current_dir_path = PathBuf::from(config_file_name);
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        let dev_path = PathBuf::from("pinpics-server").join(config_file_name);
        if dev_path.exists() {
            builder = builder.add_source(File::from(dev_path).required(false));
        }

        builder = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.public_url", "http://127.0.0.1:3000")?
            .set_default("server.production", false)?
            .set_default("database.path", "pinpics.db")?
            .set_default("database.seed_demo_data", true)?
            .set_default("storage.root", "storage")?
            .set_default("storage.bucket", "pinpictures")?
            .set_default("auth.bcrypt_cost", i64::from(bcrypt::DEFAULT_COST))?;

        // Environment variables take priority over the file
        if let Ok(db_path) = std::env::var("DATABASE_PATH") {
            builder = builder.set_override("database.path", db_path)?;
        }
        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }
        if let Ok(host) = std::env::var("HOST") {
            builder = builder.set_override("server.host", host)?;
        }
        if let Ok(public_url) = std::env::var("PUBLIC_URL") {
            builder = builder.set_override("server.public_url", public_url)?;
        }
        if let Ok(app_env) = std::env::var("APP_ENV") {
            builder = builder.set_override("server.production", app_env.eq_ignore_ascii_case("production"))?;
        }
        if let Ok(root) = std::env::var("STORAGE_ROOT") {
            builder = builder.set_override("storage.root", root)?;
        }
        if let Ok(cost) = std::env::var("BCRYPT_COST") {
            builder = builder.set_override("auth.bcrypt_cost", cost)?;
        }

        let s = builder.build()?;
        s.try_deserialize()
    }
}

impl Storage {
    /// Directory holding the bucket's objects
    pub fn bucket_dir(&self) -> PathBuf {
        PathBuf::from(&self.root).join(&self.bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_dir_joins_root_and_bucket() {
        let storage = Storage {
            root: "data".to_string(),
            bucket: "pinpictures".to_string(),
        };
        assert_eq!(storage.bucket_dir(), PathBuf::from("data").join("pinpictures"));
    }
}
