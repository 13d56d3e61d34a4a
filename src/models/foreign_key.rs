//! Foreign key model types

use serde::{Deserialize, Serialize};

/// Foreign key constraint owned by an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub name: String,
    pub table_name: String,
    #[serde(rename = "tableRef")]
    pub referenced_table_name: String,
    /// Column pairs ordered by sequence
    #[serde(rename = "fkcol")]
    pub columns: Vec<ForeignKeyColumn>,
}

impl ForeignKey {
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        referenced_table_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            referenced_table_name: referenced_table_name.into(),
            columns: Vec::new(),
        }
    }

    /// Add a column pair, keeping the list ordered by sequence
    pub fn store_column(&mut self, column: ForeignKeyColumn) {
        let idx = self
            .columns
            .iter()
            .position(|c| c.sequence > column.sequence)
            .unwrap_or(self.columns.len());
        self.columns.insert(idx, column);
    }

    pub fn is_simple(&self) -> bool {
        self.columns.len() == 1
    }

    pub fn is_composite(&self) -> bool {
        self.columns.len() > 1
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.column_name.as_str()).collect()
    }

    /// Same target and same ordered column pairs
    pub fn same_definition(&self, other: &ForeignKey) -> bool {
        self.referenced_table_name == other.referenced_table_name
            && self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(other.columns.iter())
                .all(|(a, b)| a.column_name == b.column_name && a.referenced_column_name == b.referenced_column_name)
    }
}

/// One (local column -> referenced column) pair of a foreign key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyColumn {
    #[serde(rename = "colname")]
    pub column_name: String,
    #[serde(rename = "colref")]
    pub referenced_column_name: String,
    pub sequence: i32,
    #[serde(default)]
    pub update_rule: i32,
    #[serde(default)]
    pub delete_rule: i32,
    #[serde(default)]
    pub deferrable: i32,
}

impl ForeignKeyColumn {
    pub fn new(column_name: impl Into<String>, referenced_column_name: impl Into<String>, sequence: i32) -> Self {
        Self {
            column_name: column_name.into(),
            referenced_column_name: referenced_column_name.into(),
            sequence,
            update_rule: 0,
            delete_rule: 0,
            deferrable: 0,
        }
    }
}

/// Participation of one attribute in one foreign key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyPart {
    pub fk_name: String,
    pub referenced_table: String,
    pub referenced_column: String,
    pub referenced_entity: String,
    pub referenced_attribute: String,
}

impl std::fmt::Display for ForeignKeyPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} : {}.{} ({}.{})",
            self.fk_name, self.referenced_table, self.referenced_column, self.referenced_entity, self.referenced_attribute
        )
    }
}
