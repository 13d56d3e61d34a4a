//! Schema Introspection Module
//!
//! Raw description of a live database schema, as produced by an external
//! introspection tool. This is the input of model generation and of model
//! updates; nothing here knows about classes, attributes or links.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Complete schema description at a point in time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSnapshot {
    #[serde(default)]
    pub database_name: String,
    #[serde(default)]
    pub database_product_name: String,
    pub tables: Vec<Table>,
}

impl SchemaSnapshot {
    /// Read a snapshot from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let snapshot: SchemaSnapshot = serde_json::from_str(&content)?;
        debug!(
            "Loaded schema snapshot from {}: {} tables, {} FKs",
            path.as_ref().display(),
            snapshot.tables.len(),
            snapshot.foreign_key_count()
        );
        Ok(snapshot)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn foreign_key_count(&self) -> usize {
        self.tables.iter().map(|t| t.foreign_keys.len()).sum()
    }
}

/// Table representation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub catalog: String,
    /// "TABLE" or "VIEW"
    #[serde(default = "default_table_type")]
    pub table_type: String,
    #[serde(default)]
    pub comment: Option<String>,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

fn default_table_type() -> String {
    "TABLE".to_string()
}

/// Column representation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    /// Native type name, e.g. "VARCHAR", "INTEGER"
    pub type_name: String,
    #[serde(default)]
    pub jdbc_type_code: i32,
    #[serde(default)]
    pub size: Option<String>,
    pub nullable: bool,
    pub ordinal_position: i32,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub is_primary_key: bool,
}

/// Foreign key constraint, scoped to its owning table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub name: String,
    pub referenced_table: String,
    pub columns: Vec<ForeignKeyColumn>,
}

/// One local column -> referenced column pair of a foreign key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyColumn {
    pub column: String,
    pub referenced_column: String,
    pub sequence: i32,
    #[serde(default)]
    pub update_rule: i32,
    #[serde(default)]
    pub delete_rule: i32,
    #[serde(default)]
    pub deferrable: i32,
}
