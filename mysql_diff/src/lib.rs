//! mysql_diff: detect differences between two MySQL schemas
//!
//! Two schemas, each rendered as `mysqldump --no-data` text, are parsed into
//! tables and compared. The result is a migration script of `CREATE TABLE`
//! and `ALTER TABLE` statements that turns the old schema into the new one.
//!
//! ```
//! let old = mysql_diff::parse("CREATE TABLE `t` (\n  `id` int\n) ENGINE=InnoDB;");
//! let new = mysql_diff::parse("CREATE TABLE `t` (\n  `id` bigint\n) ENGINE=InnoDB;");
//!
//! assert_eq!(
//!     mysql_diff::extract_diff(&old, &new),
//!     "ALTER TABLE `t` MODIFY `id` bigint;\n\n"
//! );
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod schema;
pub mod utils;


// Re-export main types for easier access
pub use config::Config;
pub use db::{MySqlConnectionInfo, SchemaArg, SchemaDumper, SchemaSource};
pub use error::{Error, Result};
pub use schema::diff::{extract_diff, SchemaDiff};
pub use schema::parser::{parse, parse_with_diagnostics};
pub use schema::types::Table;

use db::source::DumpedSchema;

/// Initialize mysql_diff with the specified configuration file
pub fn init(config_path: &str) -> Result<MySqlDiffClient> {
    let config = config::load_from_file(config_path)?;
    Ok(MySqlDiffClient::new(config))
}

/// The main client: fetches two schemas and diffs them
pub struct MySqlDiffClient {
    config: Config,
    dumper: SchemaDumper,
}

impl MySqlDiffClient {
    /// Create a new client from configuration
    pub fn new(config: Config) -> Self {
        let dumper = SchemaDumper::new(
            config.mysql.connection_info(),
            &config.dump.mysqldump_path,
        );

        Self { config, dumper }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch and parse the schema named by a command line argument
    pub async fn fetch_tables(&self, arg: &str) -> Result<Vec<Table>> {
        let source = DumpedSchema::new(SchemaArg::classify(arg)?, &self.dumper, self.config.dump.raw);
        let schema = source.fetch_schema().await?;

        let output = parse_with_diagnostics(&schema);
        for warning in &output.warnings {
            // Skipped FOREIGN KEY / FULLTEXT lines are routine in real dumps
            if warning.drops_table() {
                tracing::warn!(source = arg, "{}", warning);
            } else {
                tracing::debug!(source = arg, "{}", warning);
            }
        }

        tracing::info!(source = arg, tables = output.tables.len(), "Parsed schema");
        Ok(output.tables)
    }

    /// Generate the migration script from the `old` schema to the `new` one
    pub async fn diff(&self, old: &str, new: &str) -> Result<String> {
        let old_tables = self.fetch_tables(old).await?;
        let new_tables = self.fetch_tables(new).await?;

        let diff = SchemaDiff::generate(&old_tables, &new_tables);
        if diff.is_empty() {
            tracing::info!("Schemas are already in sync");
        }

        Ok(diff.to_sql())
    }
}
