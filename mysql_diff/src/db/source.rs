//! Schema sources
//!
//! A schema to compare is named on the command line either as a SQL file, a
//! database on the configured server, or a database on another server given
//! as a quoted mini command line (`'-uroot -hdb.example.com shop'`).

use async_trait::async_trait;
use clap::Parser;
use std::path::PathBuf;

use crate::db::connection::MySqlConnectionInfo;
use crate::db::dumper::SchemaDumper;
use crate::error::{Error, Result};

/// Anything that can produce schema dump text
#[async_trait]
pub trait SchemaSource {
    /// Fetch the schema as `mysqldump`-formatted text
    async fn fetch_schema(&self) -> Result<String>;
}

/// Where a schema comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaArg {
    /// A SQL file on this machine
    File(PathBuf),
    /// A database on another server
    Remote {
        db_name: String,
        connection_info: MySqlConnectionInfo,
    },
    /// A database on the configured server
    Local(String),
}

/// Options accepted inside a remote database argument
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct RemoteDbArgs {
    #[arg(short = 'h', long = "host")]
    host: Option<String>,

    #[arg(short = 'u', long = "user")]
    user: Option<String>,

    #[arg(short = 'p', long = "password")]
    pass: Option<String>,

    #[arg(short = 'P', long = "port")]
    port: Option<u16>,

    db_name: Option<String>,
}

impl SchemaArg {
    /// Decide what kind of schema a command line argument names
    ///
    /// An existing path is a file; anything containing a space is a remote
    /// database description; everything else is a local database name.
    pub fn classify(arg: &str) -> Result<Self> {
        let path = PathBuf::from(arg);
        if path.exists() {
            return Ok(SchemaArg::File(path));
        }

        if arg.contains(' ') {
            return Self::parse_remote(arg);
        }

        Ok(SchemaArg::Local(arg.to_string()))
    }

    fn parse_remote(arg: &str) -> Result<Self> {
        let invalid = || Error::InvalidArgument(format!("Invalid remote DB argument is detected: {}", arg));

        let inner = arg.trim().trim_matches(|c| c == '\'' || c == '"');
        let remote = RemoteDbArgs::try_parse_from(inner.split_whitespace()).map_err(|_| invalid())?;

        let db_name = match remote.db_name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(invalid()),
        };

        let mut builder = MySqlConnectionInfo::builder();
        if let Some(host) = &remote.host {
            builder = builder.host(host);
        }
        if let Some(user) = &remote.user {
            builder = builder.user(user);
        }
        if let Some(pass) = &remote.pass {
            builder = builder.pass(pass);
        }
        if let Some(port) = remote.port {
            builder = builder.port(port);
        }

        Ok(SchemaArg::Remote {
            db_name,
            connection_info: builder.build(),
        })
    }
}

/// A [`SchemaArg`] resolved through a [`SchemaDumper`]
pub struct DumpedSchema<'a> {
    arg: SchemaArg,
    dumper: &'a SchemaDumper,
    raw: bool,
}

impl<'a> DumpedSchema<'a> {
    /// With `raw` set, files are read as dump text and never loaded into MySQL
    pub fn new(arg: SchemaArg, dumper: &'a SchemaDumper, raw: bool) -> Self {
        Self { arg, dumper, raw }
    }

    pub fn arg(&self) -> &SchemaArg {
        &self.arg
    }
}

#[async_trait]
impl<'a> SchemaSource for DumpedSchema<'a> {
    async fn fetch_schema(&self) -> Result<String> {
        match &self.arg {
            SchemaArg::File(path) if self.raw => {
                tracing::debug!(path = %path.display(), "Reading schema dump file");
                Ok(tokio::fs::read_to_string(path).await?)
            }
            SchemaArg::File(path) => {
                tracing::debug!(path = %path.display(), "Loading SQL file into a temporary database");
                self.dumper.dump_sql_file(path).await
            }
            SchemaArg::Remote {
                db_name,
                connection_info,
            } => {
                tracing::debug!(
                    database = %db_name,
                    server = %connection_info.connection_url(),
                    "Dumping remote database"
                );
                self.dumper.dump_from_remote_db(db_name, connection_info).await
            }
            SchemaArg::Local(db_name) => {
                tracing::debug!(database = %db_name, "Dumping local database");
                self.dumper.dump_from_local_db(db_name).await
            }
        }
    }
}
