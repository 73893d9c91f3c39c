//! Schema dump parser
//!
//! This module turns `mysqldump`-style schema text into [`Table`] values.
//! Parsing is lenient: blocks without a table name and lines that match no
//! known shape are dropped, and reported through [`ParseWarning`] for callers
//! that want to know.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::schema::types::{Column, OrdinaryKey, Table, UniqueKey};

static TABLE_BLOCK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)CREATE TABLE .*? ENGINE[^;]*").unwrap());

static TABLE_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"`(.*?)`").unwrap());

static PRIMARY_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*PRIMARY KEY\s+\((.*)\)").unwrap());

static UNIQUE_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*UNIQUE KEY\s+`(.*)`\s+\((.*)\)").unwrap());

static ORDINARY_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*KEY\s+`(.*)`\s+\((.*)\)").unwrap());

static COLUMN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*`(.*?)`\s+(.+?),?$").unwrap());

/// Something the parser dropped while reading a dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParseWarning {
    /// A `CREATE TABLE` block carried no backtick-quoted name and was discarded
    UnnamedBlock { block_index: usize },
    /// A line inside a table block matched no column or key shape
    SkippedLine {
        table: String,
        line_number: usize,
        line: String,
    },
}

impl ParseWarning {
    /// True when a whole table was discarded, not just one of its lines
    pub fn drops_table(&self) -> bool {
        matches!(self, ParseWarning::UnnamedBlock { .. })
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::UnnamedBlock { block_index } => {
                write!(f, "CREATE TABLE block #{} has no table name", block_index)
            }
            ParseWarning::SkippedLine {
                table,
                line_number,
                line,
            } => write!(
                f,
                "skipped line {} of table `{}`: {}",
                line_number,
                table,
                line.trim()
            ),
        }
    }
}

/// Tables parsed from a dump, along with everything that was skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutput {
    pub tables: Vec<Table>,
    pub warnings: Vec<ParseWarning>,
}

/// Parse a schema dump into tables, in the order they appear in the text
pub fn parse(schema: &str) -> Vec<Table> {
    parse_with_diagnostics(schema).tables
}

/// Parse a schema dump and also return the warnings for dropped blocks and lines
pub fn parse_with_diagnostics(schema: &str) -> ParseOutput {
    let mut output = ParseOutput::default();

    for (block_index, block) in TABLE_BLOCK_PATTERN.find_iter(schema).enumerate() {
        let content = block.as_str();

        let table_name = match TABLE_NAME_PATTERN.captures(content) {
            Some(caps) => caps[1].to_string(),
            None => {
                tracing::warn!(block_index, "CREATE TABLE block without a table name, skipping");
                output
                    .warnings
                    .push(ParseWarning::UnnamedBlock { block_index });
                continue;
            }
        };

        let table = parse_table_block(&table_name, content, &mut output.warnings);
        output.tables.push(table);
    }

    tracing::debug!(
        tables = output.tables.len(),
        warnings = output.warnings.len(),
        "Parsed schema dump"
    );

    output
}

/// Classify each line of a single table block
fn parse_table_block(table_name: &str, content: &str, warnings: &mut Vec<ParseWarning>) -> Table {
    let mut builder = Table::builder(table_name).content(content);

    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with("CREATE") || trimmed.starts_with(')') {
            continue;
        }

        if let Some(caps) = PRIMARY_KEY_PATTERN.captures(line) {
            builder = builder.primary_key(&caps[1]);
            continue;
        }

        if let Some(caps) = UNIQUE_KEY_PATTERN.captures(line) {
            builder = builder.unique_key(UniqueKey::new(&caps[1], &caps[2]));
            continue;
        }

        if let Some(caps) = ORDINARY_KEY_PATTERN.captures(line) {
            builder = builder.key(OrdinaryKey::new(&caps[1], &caps[2]));
            continue;
        }

        if let Some(caps) = COLUMN_PATTERN.captures(line) {
            builder = builder.column(Column::new(&caps[1], &caps[2]));
            continue;
        }

        tracing::debug!(table = table_name, line, "Unrecognised line in table definition");
        warnings.push(ParseWarning::SkippedLine {
            table: table_name.to_string(),
            line_number: index + 1,
            line: line.to_string(),
        });
    }

    builder.build()
}
