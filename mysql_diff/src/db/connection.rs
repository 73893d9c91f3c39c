//! MySQL connection information
//!
//! This module describes how to reach the MySQL server that schemas are
//! loaded into and dumped from.

use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::mysql::MySqlConnectOptions;
use std::str::FromStr;

use crate::error::{Error, Result};

static SCHEME_PREFIX_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.+://").unwrap());

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3306;
const DEFAULT_USER: &str = "root";

/// Connection information for a MySQL server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlConnectionInfo {
    host: String,
    port: u16,
    user: String,
    pass: String,
    properties: Vec<String>,
}

impl Default for MySqlConnectionInfo {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MySqlConnectionInfo {
    /// Start building connection info; defaults to `root@localhost:3306` with no password
    pub fn builder() -> MySqlConnectionInfoBuilder {
        MySqlConnectionInfoBuilder {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            pass: String::new(),
            properties: Vec::new(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn pass(&self) -> &str {
        &self.pass
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    /// Server URL without credentials, e.g. `mysql://localhost:3306?ssl-mode=DISABLED`
    pub fn connection_url(&self) -> String {
        let mut url = format!("mysql://{}:{}", self.host, self.port);
        if !self.properties.is_empty() {
            url.push('?');
            url.push_str(&self.properties.join("&"));
        }
        url
    }

    /// sqlx connect options for this server, without a default database
    ///
    /// Properties are applied the way sqlx reads them from a URL query string,
    /// e.g. `ssl-mode=DISABLED` or `charset=latin1`.
    pub fn connect_options(&self) -> Result<MySqlConnectOptions> {
        let url = self.connection_url();
        let options = MySqlConnectOptions::from_str(&url).map_err(|e| {
            Error::ConfigError(format!("Invalid connection URL '{}': {}", url, e))
        })?;
        let options = options.username(&self.user);

        if self.pass.is_empty() {
            Ok(options)
        } else {
            Ok(options.password(&self.pass))
        }
    }
}

/// Builder for [`MySqlConnectionInfo`]
#[derive(Debug, Clone)]
pub struct MySqlConnectionInfoBuilder {
    host: String,
    port: u16,
    user: String,
    pass: String,
    properties: Vec<String>,
}

impl MySqlConnectionInfoBuilder {
    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn user(mut self, user: &str) -> Self {
        self.user = user.to_string();
        self
    }

    pub fn pass(mut self, pass: &str) -> Self {
        self.pass = pass.to_string();
        self
    }

    pub fn add_property(mut self, property: &str) -> Self {
        self.properties.push(property.to_string());
        self
    }

    /// Take host, port and properties from a server URL
    ///
    /// Accepts forms like `mysql://localhost:8888/some_db?charset=utf8mb4&ssl-mode=DISABLED`.
    /// The scheme and the path are ignored; the port is optional.
    pub fn url(mut self, url: &str) -> Result<Self> {
        let url = SCHEME_PREFIX_PATTERN.replace(url, "").into_owned();

        let (origin, query) = match url.split_once('?') {
            Some((origin, query)) => (origin, Some(query)),
            None => (url.as_str(), None),
        };

        let authority = origin.split('/').next().unwrap_or_default();
        let mut host_and_port = authority.split(':');
        self.host = host_and_port.next().unwrap_or_default().to_string();

        if let Some(port) = host_and_port.next() {
            self.port = port.parse().map_err(|e| {
                Error::ConfigError(format!("Invalid port '{}' in URL '{}': {}", port, url, e))
            })?;
        }

        if let Some(query) = query {
            for property in query.split('&').filter(|p| !p.is_empty()) {
                self.properties.push(property.to_string());
            }
        }

        Ok(self)
    }

    pub fn build(self) -> MySqlConnectionInfo {
        MySqlConnectionInfo {
            host: self.host,
            port: self.port,
            user: self.user,
            pass: self.pass,
            properties: self.properties,
        }
    }
}
