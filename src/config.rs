//! Configuration management for Circulib

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Path to the line-oriented catalog store
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MembersConfig {
    /// Path to the member directory file (username,tier,contact)
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: String,
    pub smtp_from_name: Option<String>,
    pub smtp_use_tls: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub members: MembersConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix CIRCULIB_)
            .add_source(
                Environment::with_prefix("CIRCULIB")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override store path from STORE_PATH env var if present
            .set_override_option("store.path", env::var("STORE_PATH").ok())?
            // Override member directory path from MEMBERS_PATH env var if present
            .set_override_option("members.path", env::var("MEMBERS_PATH").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "data/catalog.txt".to_string(),
        }
    }
}

impl Default for MembersConfig {
    fn default() -> Self {
        Self {
            path: "data/members.txt".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_from: "noreply@circulib.org".to_string(),
            smtp_from_name: Some("Circulib".to_string()),
            smtp_use_tls: true,
        }
    }
}
