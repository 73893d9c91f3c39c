//! Schema module for mysql_diff
//!
//! This module parses schema dumps and computes the migration between two of them.

pub mod diff;
pub mod parser;
pub mod types;

// Re-export key types
pub use diff::{extract_diff, AlterClause, SchemaDiff, TableChange};
pub use parser::{parse, parse_with_diagnostics, ParseOutput, ParseWarning};
pub use types::{Column, OrdinaryKey, Table, TableBuilder, UniqueKey};
