//! Error types for mysql_diff

use thiserror::Error;

/// Result type for mysql_diff operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for mysql_diff
///
/// Parsing and diffing never fail; these errors come from reading
/// configuration and from acquiring schema dumps.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Schema dump error: {0}")]
    DumpError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),
}

/// Convert TOML deserialization errors to mysql_diff errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
