//! Configuration handling for mysql_diff
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) gives a working local setup.

use serde::{Deserialize, Serialize};
use std::fs;

use crate::db::connection::MySqlConnectionInfo;
use crate::error::{Error, Result};

/// Load configuration from a TOML file
pub fn load_from_file(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file: {}", e)))?;

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?;

    Ok(config)
}

/// Represents the complete mysql_diff configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub mysql: MySqlConfig,
    pub dump: DumpConfig,
    pub logging: LoggingConfig,
}

/// Connection settings for the MySQL server used to load and dump schemas
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MySqlConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub properties: Vec<String>,
}

impl Default for MySqlConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            properties: Vec::new(),
        }
    }
}

impl MySqlConfig {
    /// Build the connection info described by this section
    pub fn connection_info(&self) -> MySqlConnectionInfo {
        self.properties.iter().fold(
            MySqlConnectionInfo::builder()
                .host(&self.host)
                .port(self.port)
                .user(&self.user)
                .pass(&self.password),
            |builder, property| builder.add_property(property),
        )
        .build()
    }
}

/// Schema acquisition settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DumpConfig {
    pub mysqldump_path: String,
    /// Read schema files as dump text instead of loading them into MySQL first
    pub raw: bool,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            mysqldump_path: "mysqldump".to_string(),
            raw: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub format: String,
    /// Write logs to stderr when no file is configured
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            format: "text".to_string(),
            console: true,
        }
    }
}
