//! Type definitions for parsed MySQL table structures
//!
//! Every value here is produced once by the schema parser and only read
//! afterwards by the diff extractor.

use serde::{Deserialize, Serialize};

use crate::utils::naming::index_name_from_column_spec;

/// Represents a table column: its unquoted name and its verbatim definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    definition: String,
}

impl Column {
    /// Create a new column with the given name and definition
    pub fn new(name: &str, definition: &str) -> Self {
        Self {
            name: name.to_string(),
            definition: definition.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type and qualifiers exactly as they appeared in the dump, e.g. `varchar(64) NOT NULL`
    pub fn definition(&self) -> &str {
        &self.definition
    }
}

/// Represents a non-unique secondary index (`KEY name (cols)`)
///
/// Keys are matched by their column-spec string, never by their declared
/// name: two keys over byte-identical specs are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinaryKey {
    name: String,
    column: String,
}

impl OrdinaryKey {
    /// Create a new key from its declared name and verbatim column-spec
    pub fn new(name: &str, column: &str) -> Self {
        Self {
            name: name.to_string(),
            column: column.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column-spec as written in the dump, e.g. `` `a`,`b` ``
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Index name derived from the column-spec, used when the key has to be added
    pub fn synthesized_name(&self) -> String {
        index_name_from_column_spec(&self.column)
    }
}

/// Represents a uniqueness-enforcing index (`UNIQUE KEY name (cols)`)
///
/// Matched by column-spec string like [`OrdinaryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueKey {
    name: String,
    column: String,
}

impl UniqueKey {
    /// Create a new unique key from its declared name and verbatim column-spec
    pub fn new(name: &str, column: &str) -> Self {
        Self {
            name: name.to_string(),
            column: column.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column-spec as written in the dump, e.g. `` `email`,`name` ``
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Index name derived from the column-spec, used when the key has to be added
    pub fn synthesized_name(&self) -> String {
        index_name_from_column_spec(&self.column)
    }
}

/// Represents one `CREATE TABLE` block of a schema dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    table_name: String,
    columns: Vec<Column>,
    primary_keys: Vec<String>,
    keys: Vec<OrdinaryKey>,
    unique_keys: Vec<UniqueKey>,
    content: String,
}

impl Table {
    /// Start building a table with the given name
    pub fn builder(table_name: &str) -> TableBuilder {
        TableBuilder {
            table_name: table_name.to_string(),
            columns: Vec::new(),
            primary_keys: Vec::new(),
            keys: Vec::new(),
            unique_keys: Vec::new(),
            content: String::new(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Find a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|col| col.name == name)
    }

    /// Verbatim primary-key column-specs; these are carried but not diffed
    pub fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }

    pub fn keys(&self) -> &[OrdinaryKey] {
        &self.keys
    }

    pub fn unique_keys(&self) -> &[UniqueKey] {
        &self.unique_keys
    }

    /// The full `CREATE TABLE ...` block as it was found, without the trailing `;`
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Builder for [`Table`]
#[derive(Debug, Clone)]
pub struct TableBuilder {
    table_name: String,
    columns: Vec<Column>,
    primary_keys: Vec<String>,
    keys: Vec<OrdinaryKey>,
    unique_keys: Vec<UniqueKey>,
    content: String,
}

impl TableBuilder {
    /// Add a column. A repeated name keeps its first position but takes the new definition.
    pub fn column(mut self, column: Column) -> Self {
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        self
    }

    pub fn primary_key(mut self, spec: &str) -> Self {
        self.primary_keys.push(spec.to_string());
        self
    }

    pub fn key(mut self, key: OrdinaryKey) -> Self {
        self.keys.push(key);
        self
    }

    pub fn unique_key(mut self, key: UniqueKey) -> Self {
        self.unique_keys.push(key);
        self
    }

    pub fn content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    pub fn build(self) -> Table {
        Table {
            table_name: self.table_name,
            columns: self.columns,
            primary_keys: self.primary_keys,
            keys: self.keys,
            unique_keys: self.unique_keys,
            content: self.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_collects_everything() {
        let table = Table::builder("users")
            .column(Column::new("id", "int(10) NOT NULL"))
            .column(Column::new("email", "varchar(255) NOT NULL"))
            .primary_key("`id`")
            .key(OrdinaryKey::new("email_idx", "`email`"))
            .unique_key(UniqueKey::new("uniq", "`email`,`id`"))
            .content("CREATE TABLE `users` (...) ENGINE=InnoDB")
            .build();

        assert_eq!(table.table_name(), "users");
        assert_eq!(table.columns().len(), 2);
        assert_eq!(table.primary_keys(), &["`id`".to_string()]);
        assert_eq!(table.keys()[0].name(), "email_idx");
        assert_eq!(table.unique_keys()[0].column(), "`email`,`id`");
        assert_eq!(table.column("email").map(Column::definition), Some("varchar(255) NOT NULL"));
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_duplicate_column_last_definition_wins() {
        let table = Table::builder("t")
            .column(Column::new("a", "int"))
            .column(Column::new("b", "int"))
            .column(Column::new("a", "bigint"))
            .build();

        let names: Vec<&str> = table.columns().iter().map(Column::name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(table.column("a").unwrap().definition(), "bigint");
    }

    #[test]
    fn test_synthesized_key_names() {
        assert_eq!(
            OrdinaryKey::new("timestamp", "`created_on`,`updated_on`").synthesized_name(),
            "created_on_updated_on"
        );
        assert_eq!(
            UniqueKey::new("identifier", "`email`,`name`").synthesized_name(),
            "email_name"
        );
    }
}
