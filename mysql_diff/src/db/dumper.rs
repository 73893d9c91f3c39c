//! Schema dumping through `mysqldump`
//!
//! Schemas are always compared in the shape `mysqldump --no-data` prints
//! them. SQL that did not come from `mysqldump` is first loaded into a
//! throwaway database and dumped back out, so both sides of a diff share the
//! same formatting.

use sqlx::mysql::MySqlConnection;
use sqlx::{Connection, Executor};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use uuid::Uuid;

use crate::db::connection::MySqlConnectionInfo;
use crate::error::{Error, Result};

const DEFAULT_MYSQLDUMP_PATH: &str = "mysqldump";

/// Produces schema dump text from databases and SQL
#[derive(Debug, Clone)]
pub struct SchemaDumper {
    connection_info: MySqlConnectionInfo,
    mysqldump_path: String,
}

impl Default for SchemaDumper {
    fn default() -> Self {
        Self::new(MySqlConnectionInfo::default(), DEFAULT_MYSQLDUMP_PATH)
    }
}

impl SchemaDumper {
    /// Create a dumper that loads SQL into the server described by `connection_info`
    pub fn new(connection_info: MySqlConnectionInfo, mysqldump_path: &str) -> Self {
        Self {
            connection_info,
            mysqldump_path: mysqldump_path.to_string(),
        }
    }

    pub fn connection_info(&self) -> &MySqlConnectionInfo {
        &self.connection_info
    }

    pub fn mysqldump_path(&self) -> &str {
        &self.mysqldump_path
    }

    /// Load `sql` into a temporary database and dump its schema
    ///
    /// The temporary database is dropped again whether or not loading and
    /// dumping succeeded.
    pub async fn dump_sql(&self, sql: &str) -> Result<String> {
        let temp_db_name = format!("tmp_{}", Uuid::new_v4().simple());

        let mut connection =
            MySqlConnection::connect_with(&self.connection_info.connect_options()?).await?;

        tracing::debug!(database = %temp_db_name, "Creating temporary database");
        connection
            .execute(format!("CREATE DATABASE `{}`", temp_db_name).as_str())
            .await?;

        let dumped = self.load_and_dump(&temp_db_name, sql).await;

        let dropped = connection
            .execute(format!("DROP DATABASE `{}`", temp_db_name).as_str())
            .await;
        if let Err(e) = connection.close().await {
            tracing::debug!(error = %e, "Failed to close connection cleanly");
        }

        match (dumped, dropped) {
            (Ok(schema), Ok(_)) => Ok(schema),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(_)) => Err(e),
            (Err(e), Err(drop_error)) => {
                tracing::warn!(
                    database = %temp_db_name,
                    error = %drop_error,
                    "Failed to drop temporary database"
                );
                Err(e)
            }
        }
    }

    /// Read a UTF-8 SQL file and dump the schema it defines
    pub async fn dump_sql_file(&self, path: &Path) -> Result<String> {
        let sql = tokio::fs::read_to_string(path).await?;
        self.dump_sql(&sql).await
    }

    /// Dump a database that lives on the configured server
    pub async fn dump_from_local_db(&self, db_name: &str) -> Result<String> {
        self.fetch_schema_via_mysqldump(db_name, &self.connection_info)
            .await
    }

    /// Dump a database on another server, then normalise it through the configured one
    pub async fn dump_from_remote_db(
        &self,
        db_name: &str,
        connection_info: &MySqlConnectionInfo,
    ) -> Result<String> {
        let schema = self
            .fetch_schema_via_mysqldump(db_name, connection_info)
            .await?;
        self.dump_sql(&schema).await
    }

    /// Arguments passed to `mysqldump` for one database
    ///
    /// The password is not part of the argument list; it goes through `MYSQL_PWD`.
    pub fn mysqldump_args(&self, db_name: &str, connection_info: &MySqlConnectionInfo) -> Vec<String> {
        let mut args = vec!["--no-data=true".to_string(), db_name.to_string()];

        if !connection_info.user().is_empty() {
            args.push(format!("-u{}", connection_info.user()));
        }

        if !connection_info.host().is_empty() {
            args.push(format!("-h{}", connection_info.host()));
        }

        args.push(format!("-P{}", connection_info.port()));

        args
    }

    async fn load_and_dump(&self, temp_db_name: &str, sql: &str) -> Result<String> {
        let options = self.connection_info.connect_options()?.database(temp_db_name);
        let mut connection = MySqlConnection::connect_with(&options).await?;

        connection.execute(sql).await?;
        connection.close().await?;

        self.fetch_schema_via_mysqldump(temp_db_name, &self.connection_info)
            .await
    }

    async fn fetch_schema_via_mysqldump(
        &self,
        db_name: &str,
        connection_info: &MySqlConnectionInfo,
    ) -> Result<String> {
        let args = self.mysqldump_args(db_name, connection_info);
        let command_line = format!("{} {}", self.mysqldump_path, args.join(" "));

        tracing::info!(command = %command_line, "Running mysqldump");

        let mut command = Command::new(&self.mysqldump_path);
        command
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if !connection_info.pass().is_empty() {
            command.env("MYSQL_PWD", connection_info.pass());
        }

        let output = command.output().await.map_err(|e| {
            Error::DumpError(format!(
                "Failed to execute `mysqldump` command (command: {}): {}",
                command_line, e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::DumpError(format!(
                "`mysqldump` exited with {} (command: {}): {}",
                output.status,
                command_line,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| Error::DumpError(format!("`mysqldump` output is not UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mysqldump_args() {
        let dumper = SchemaDumper::default();
        let remote = MySqlConnectionInfo::builder()
            .host("db.example.com")
            .port(3307)
            .user("reader")
            .pass("secret")
            .build();

        assert_eq!(
            dumper.mysqldump_args("shop", &remote),
            vec!["--no-data=true", "shop", "-ureader", "-hdb.example.com", "-P3307"]
        );
    }

    #[test]
    fn test_mysqldump_args_skip_empty_user_and_host() {
        let dumper = SchemaDumper::default();
        let info = MySqlConnectionInfo::builder().user("").host("").build();

        assert_eq!(
            dumper.mysqldump_args("shop", &info),
            vec!["--no-data=true", "shop", "-P3306"]
        );
    }

    #[tokio::test]
    async fn test_missing_mysqldump_binary() {
        let dumper = SchemaDumper::new(
            MySqlConnectionInfo::default(),
            "/nonexistent/bin/mysqldump-for-tests",
        );

        let result = dumper.dump_from_local_db("shop").await;
        match result {
            Err(Error::DumpError(message)) => {
                assert!(message.contains("/nonexistent/bin/mysqldump-for-tests --no-data=true shop"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
