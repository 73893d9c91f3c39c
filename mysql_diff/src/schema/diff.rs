//! Schema difference calculator
//!
//! This module compares two parsed schemas and renders the `CREATE TABLE` /
//! `ALTER TABLE` statements that turn the old one into the new one.
//!
//! Keys are matched by their verbatim column-spec string. Two keys with the
//! same column-spec are the same key whatever they are called, so renaming an index
//! produces no statement, and `` `a`,`b` `` and `` `a`, `b` `` are different
//! keys. Tables that only exist in the old schema are never dropped.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use crate::schema::types::{Column, Table};
use crate::utils::naming::{index_name_from_column_spec, quote_identifier};

/// One clause of an `ALTER TABLE` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlterClause {
    AddColumn { name: String, definition: String },
    DropColumn { name: String },
    ModifyColumn { name: String, definition: String },
    AddIndex { name: String, column_spec: String },
    AddUniqueIndex { name: String, column_spec: String },
    DropIndex { name: String },
}

impl fmt::Display for AlterClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlterClause::AddColumn { name, definition } => {
                write!(f, "ADD {} {}", quote_identifier(name), definition)
            }
            AlterClause::DropColumn { name } => write!(f, "DROP {}", quote_identifier(name)),
            AlterClause::ModifyColumn { name, definition } => {
                write!(f, "MODIFY {} {}", quote_identifier(name), definition)
            }
            AlterClause::AddIndex { name, column_spec } => {
                write!(f, "ADD INDEX {} ({})", quote_identifier(name), column_spec)
            }
            AlterClause::AddUniqueIndex { name, column_spec } => {
                write!(f, "ADD UNIQUE INDEX {} ({})", quote_identifier(name), column_spec)
            }
            AlterClause::DropIndex { name } => write!(f, "DROP INDEX {}", quote_identifier(name)),
        }
    }
}

/// A change needed for a single table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableChange<'a> {
    /// The table is new and is created from its dumped definition
    Create(&'a Table),
    /// The table exists on both sides and needs at least one clause
    Alter {
        table_name: String,
        clauses: Vec<AlterClause>,
    },
}

impl fmt::Display for TableChange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableChange::Create(table) => write!(f, "{};\n\n", table.content()),
            TableChange::Alter {
                table_name,
                clauses,
            } => {
                let clauses: Vec<String> = clauses.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "ALTER TABLE {} {};\n\n",
                    quote_identifier(table_name),
                    clauses.join(", ")
                )
            }
        }
    }
}

/// Represents changes needed to migrate one schema into another
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDiff<'a> {
    pub changes: Vec<TableChange<'a>>,
}

impl<'a> SchemaDiff<'a> {
    /// Generate a schema diff between the old and the new tables
    ///
    /// Tables are visited in name order. When a name appears more than once on
    /// one side, the last table with that name is used.
    pub fn generate(old_tables: &'a [Table], new_tables: &'a [Table]) -> Self {
        let old_map: BTreeMap<&str, &Table> = old_tables
            .iter()
            .map(|table| (table.table_name(), table))
            .collect();
        let new_map: BTreeMap<&str, &Table> = new_tables
            .iter()
            .map(|table| (table.table_name(), table))
            .collect();

        let mut changes = Vec::new();

        for (table_name, new_table) in &new_map {
            match old_map.get(table_name) {
                None => {
                    tracing::debug!(table = table_name, "New table");
                    changes.push(TableChange::Create(*new_table));
                }
                Some(old_table) => {
                    let clauses = table_clauses(old_table, new_table);
                    if !clauses.is_empty() {
                        tracing::debug!(table = table_name, clauses = clauses.len(), "Altered table");
                        changes.push(TableChange::Alter {
                            table_name: table_name.to_string(),
                            clauses,
                        });
                    }
                }
            }
        }

        for table_name in old_map.keys().filter(|name| !new_map.contains_key(*name)) {
            tracing::debug!(table = table_name, "Table only exists in the old schema, not dropping it");
        }

        Self { changes }
    }

    /// Check if the diff is empty (no changes needed)
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Render the whole diff as a migration script
    pub fn to_sql(&self) -> String {
        self.changes.iter().map(ToString::to_string).collect()
    }
}

/// Build the migration script that turns `old_tables` into `new_tables`
pub fn extract_diff(old_tables: &[Table], new_tables: &[Table]) -> String {
    SchemaDiff::generate(old_tables, new_tables).to_sql()
}

/// Column clauses first, then ordinary keys, then unique keys
fn table_clauses(old_table: &Table, new_table: &Table) -> Vec<AlterClause> {
    let mut clauses = column_clauses(old_table.columns(), new_table.columns());

    clauses.extend(key_clauses(
        old_table.keys().iter().map(|k| (k.name(), k.column())),
        new_table.keys().iter().map(|k| (k.name(), k.column())),
        |name, column_spec| AlterClause::AddIndex { name, column_spec },
    ));

    clauses.extend(key_clauses(
        old_table.unique_keys().iter().map(|k| (k.name(), k.column())),
        new_table.unique_keys().iter().map(|k| (k.name(), k.column())),
        |name, column_spec| AlterClause::AddUniqueIndex { name, column_spec },
    ));

    clauses
}

/// Compare columns by name, in name order
fn column_clauses(old_columns: &[Column], new_columns: &[Column]) -> Vec<AlterClause> {
    let old_map: BTreeMap<&str, &Column> = old_columns.iter().map(|c| (c.name(), c)).collect();
    let new_map: BTreeMap<&str, &Column> = new_columns.iter().map(|c| (c.name(), c)).collect();

    let all_names: BTreeSet<&str> = old_map.keys().chain(new_map.keys()).copied().collect();

    all_names
        .into_iter()
        .filter_map(|name| match (old_map.get(name), new_map.get(name)) {
            (None, Some(new_col)) => Some(AlterClause::AddColumn {
                name: name.to_string(),
                definition: new_col.definition().to_string(),
            }),
            (Some(_), None) => Some(AlterClause::DropColumn {
                name: name.to_string(),
            }),
            (Some(old_col), Some(new_col)) if old_col.definition() != new_col.definition() => {
                Some(AlterClause::ModifyColumn {
                    name: name.to_string(),
                    definition: new_col.definition().to_string(),
                })
            }
            _ => None,
        })
        .collect()
}

/// Compare `(declared name, column-spec)` pairs by column-spec
///
/// Added keys get a name synthesized from their column-spec and are added once
/// per column-spec; dropped keys use their old declared name.
fn key_clauses<'k>(
    old_keys: impl Iterator<Item = (&'k str, &'k str)> + Clone,
    new_keys: impl Iterator<Item = (&'k str, &'k str)> + Clone,
    add: impl Fn(String, String) -> AlterClause,
) -> Vec<AlterClause> {
    let old_specs: HashSet<&str> = old_keys.clone().map(|(_, spec)| spec).collect();
    let new_specs: HashSet<&str> = new_keys.clone().map(|(_, spec)| spec).collect();

    let mut clauses = Vec::new();
    let mut added: HashSet<&str> = HashSet::new();

    for (_, spec) in new_keys.filter(|(_, spec)| !old_specs.contains(spec)) {
        if added.insert(spec) {
            clauses.push(add(index_name_from_column_spec(spec), spec.to_string()));
        }
    }

    for (name, _) in old_keys.filter(|(_, spec)| !new_specs.contains(spec)) {
        clauses.push(AlterClause::DropIndex {
            name: name.to_string(),
        });
    }

    clauses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{OrdinaryKey, UniqueKey};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn sample_table(columns: &[(&str, &str)]) -> Table {
        columns
            .iter()
            .fold(Table::builder("sample"), |builder, (name, definition)| {
                builder.column(Column::new(name, definition))
            })
            .content("CREATE TABLE `sample` (...) ENGINE=InnoDB")
            .build()
    }

    fn clause_set(diff: &str, table: &str) -> HashSet<String> {
        let prefix = format!("ALTER TABLE `{}` ", table);
        let body = diff
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(";\n\n"))
            .expect("single ALTER TABLE statement");
        body.split(", ").map(str::to_string).collect()
    }

    #[test]
    fn test_column_diff() {
        let old = vec![sample_table(&[
            ("id", "int(10) NOT NULL AUTO_INCREMENT"),
            ("title", "varchar(64) NOT NULL"),
            ("created_on", "int(10) unsigned NOT NULL"),
        ])];
        let new = vec![sample_table(&[
            ("id", "int(10) NOT NULL AUTO_INCREMENT"),
            ("title", "varchar(64) DEFAULT NULL"),
            ("updated_on", "int(10) unsigned NOT NULL"),
        ])];

        let diff = extract_diff(&old, &new);
        let expected: HashSet<String> = [
            "DROP `created_on`",
            "MODIFY `title` varchar(64) DEFAULT NULL",
            "ADD `updated_on` int(10) unsigned NOT NULL",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        assert_eq!(clause_set(&diff, "sample"), expected);
        // Column clauses come out in column-name order
        assert_eq!(
            diff,
            "ALTER TABLE `sample` DROP `created_on`, MODIFY `title` varchar(64) DEFAULT NULL, \
             ADD `updated_on` int(10) unsigned NOT NULL;\n\n"
        );
    }

    #[test]
    fn test_key_clause_order() {
        let old = vec![Table::builder("t")
            .key(OrdinaryKey::new("a", "`a`"))
            .unique_key(UniqueKey::new("u", "`u`"))
            .build()];
        let new = vec![Table::builder("t")
            .key(OrdinaryKey::new("b", "`b`"))
            .unique_key(UniqueKey::new("v", "`v`"))
            .build()];

        let diff = SchemaDiff::generate(&old, &new);
        assert_eq!(
            diff.changes,
            vec![TableChange::Alter {
                table_name: "t".to_string(),
                clauses: vec![
                    AlterClause::AddIndex {
                        name: "b".to_string(),
                        column_spec: "`b`".to_string(),
                    },
                    AlterClause::DropIndex {
                        name: "a".to_string()
                    },
                    AlterClause::AddUniqueIndex {
                        name: "v".to_string(),
                        column_spec: "`v`".to_string(),
                    },
                    AlterClause::DropIndex {
                        name: "u".to_string()
                    },
                ],
            }]
        );
    }

    #[test]
    fn test_key_spec_whitespace_is_significant() {
        let old = vec![Table::builder("t").key(OrdinaryKey::new("ab", "`a`,`b`")).build()];
        let new = vec![Table::builder("t").key(OrdinaryKey::new("ab", "`a`, `b`")).build()];

        assert_eq!(
            extract_diff(&old, &new),
            "ALTER TABLE `t` ADD INDEX `a_ b` (`a`, `b`), DROP INDEX `ab`;\n\n"
        );
    }

    #[test]
    fn test_duplicate_key_specs_are_tolerated() {
        let old = vec![Table::builder("t")
            .key(OrdinaryKey::new("x1", "`x`"))
            .key(OrdinaryKey::new("x2", "`x`"))
            .build()];
        let new = vec![Table::builder("t").key(OrdinaryKey::new("x", "`x`")).build()];

        assert_eq!(extract_diff(&old, &new), "");
    }

    #[test]
    fn test_duplicate_new_key_specs_are_added_once() {
        let old = vec![Table::builder("t").build()];
        let new = vec![Table::builder("t")
            .key(OrdinaryKey::new("x1", "`x`"))
            .key(OrdinaryKey::new("x2", "`x`"))
            .unique_key(UniqueKey::new("u1", "`u`"))
            .unique_key(UniqueKey::new("u2", "`u`"))
            .build()];

        assert_eq!(
            extract_diff(&old, &new),
            "ALTER TABLE `t` ADD INDEX `x` (`x`), ADD UNIQUE INDEX `u` (`u`);\n\n"
        );
    }

    #[test]
    fn test_duplicate_table_names_last_wins() {
        let first = Table::builder("dup").content("CREATE TABLE `dup` (first) ENGINE=InnoDB").build();
        let second = Table::builder("dup").content("CREATE TABLE `dup` (second) ENGINE=InnoDB").build();

        assert_eq!(
            extract_diff(&[], &[first, second]),
            "CREATE TABLE `dup` (second) ENGINE=InnoDB;\n\n"
        );
    }

    #[test]
    fn test_alter_clause_display() {
        assert_eq!(
            AlterClause::AddColumn {
                name: "c".to_string(),
                definition: "int".to_string()
            }
            .to_string(),
            "ADD `c` int"
        );
        assert_eq!(
            AlterClause::DropColumn {
                name: "c".to_string()
            }
            .to_string(),
            "DROP `c`"
        );
        assert_eq!(
            AlterClause::AddUniqueIndex {
                name: "email_name".to_string(),
                column_spec: "`email`,`name`".to_string()
            }
            .to_string(),
            "ADD UNIQUE INDEX `email_name` (`email`,`name`)"
        );
    }

    #[test]
    fn test_is_empty() {
        let tables = vec![sample_table(&[("id", "int")])];
        assert!(SchemaDiff::generate(&tables, &tables).is_empty());
        assert!(!SchemaDiff::generate(&[], &tables).is_empty());
    }
}
