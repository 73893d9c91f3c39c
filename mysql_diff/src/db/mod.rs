//! Database module for mysql_diff
//!
//! This module acquires schema dumps from files, local databases and remote
//! servers.

pub mod connection;
pub mod dumper;
pub mod source;

// Re-export key types
pub use connection::MySqlConnectionInfo;
pub use dumper::SchemaDumper;
pub use source::{SchemaArg, SchemaSource};
