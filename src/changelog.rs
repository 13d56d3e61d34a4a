//! Change Log Module
//!
//! Structured result of a model update: what changed, per entity, per
//! column and per foreign key.

use crate::models::{Attribute, Entity, ForeignKey};
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeType::Created => "CREATED",
            ChangeType::Updated => "UPDATED",
            ChangeType::Deleted => "DELETED",
        };
        f.write_str(label)
    }
}

/// Change on one column of an entity
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeOnColumn {
    pub change_type: ChangeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Attribute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Attribute>,
    /// Database facts that differ (updates only)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modifications: Vec<String>,
}

impl ChangeOnColumn {
    pub fn created(after: Attribute) -> Self {
        Self {
            change_type: ChangeType::Created,
            before: None,
            after: Some(after),
            modifications: Vec::new(),
        }
    }

    pub fn updated(before: Attribute, after: Attribute, modifications: Vec<String>) -> Self {
        Self {
            change_type: ChangeType::Updated,
            before: Some(before),
            after: Some(after),
            modifications,
        }
    }

    pub fn deleted(before: Attribute) -> Self {
        Self {
            change_type: ChangeType::Deleted,
            before: Some(before),
            after: None,
            modifications: Vec::new(),
        }
    }

    pub fn column_name(&self) -> &str {
        self.after
            .as_ref()
            .or(self.before.as_ref())
            .map(|a| a.database_name.as_str())
            .unwrap_or("")
    }
}

/// Change on one foreign key of an entity
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeOnForeignKey {
    pub change_type: ChangeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<ForeignKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<ForeignKey>,
}

impl ChangeOnForeignKey {
    pub fn fk_name(&self) -> &str {
        self.after
            .as_ref()
            .or(self.before.as_ref())
            .map(|fk| fk.name.as_str())
            .unwrap_or("")
    }
}

/// Change on one entity, with the detail of its columns and foreign keys
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeOnEntity {
    pub change_type: ChangeType,
    pub entity_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Entity>,
    /// Table level differences (comment, table type)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modifications: Vec<String>,
    pub column_changes: Vec<ChangeOnColumn>,
    pub foreign_key_changes: Vec<ChangeOnForeignKey>,
}

impl ChangeOnEntity {
    pub fn created(after: Entity) -> Self {
        Self::new(ChangeType::Created, after.database_table.clone(), None, Some(after))
    }

    pub fn deleted(before: Entity) -> Self {
        Self::new(ChangeType::Deleted, before.database_table.clone(), Some(before), None)
    }

    pub fn updated(before: Entity, after: Entity) -> Self {
        Self::new(ChangeType::Updated, after.database_table.clone(), Some(before), Some(after))
    }

    fn new(change_type: ChangeType, entity_name: String, before: Option<Entity>, after: Option<Entity>) -> Self {
        Self {
            change_type,
            entity_name,
            before,
            after,
            modifications: Vec::new(),
            column_changes: Vec::new(),
            foreign_key_changes: Vec::new(),
        }
    }
}

/// Result of the comparison of a model with a new schema snapshot
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLog {
    pub date: NaiveDateTime,
    pub before_checksum: String,
    pub after_checksum: String,
    changes: Vec<ChangeOnEntity>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self {
            date: Local::now().naive_local(),
            before_checksum: String::new(),
            after_checksum: String::new(),
            changes: Vec::new(),
        }
    }

    pub fn log(&mut self, change: ChangeOnEntity) {
        self.changes.push(change);
    }

    pub fn changes(&self) -> &[ChangeOnEntity] {
        &self.changes
    }

    pub(crate) fn changes_mut(&mut self) -> impl Iterator<Item = &mut ChangeOnEntity> {
        self.changes.iter_mut()
    }

    pub fn change_on(&self, entity_name: &str) -> Option<&ChangeOnEntity> {
        self.changes.iter().find(|c| c.entity_name == entity_name)
    }

    pub fn number_of_changes(&self) -> usize {
        self.changes.len()
    }

    pub fn number_of_entities_created(&self) -> usize {
        self.count(ChangeType::Created)
    }

    pub fn number_of_entities_updated(&self) -> usize {
        self.count(ChangeType::Updated)
    }

    pub fn number_of_entities_deleted(&self) -> usize {
        self.count(ChangeType::Deleted)
    }

    fn count(&self, change_type: ChangeType) -> usize {
        self.changes.iter().filter(|c| c.change_type == change_type).count()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl Default for ChangeLog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChangeLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model update {}", self.date.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(
            f,
            "{} change(s): {} created, {} updated, {} deleted",
            self.number_of_changes(),
            self.number_of_entities_created(),
            self.number_of_entities_updated(),
            self.number_of_entities_deleted()
        )?;
        if self.before_checksum == self.after_checksum {
            writeln!(f, "Schema checksum unchanged")?;
        }

        for change in &self.changes {
            writeln!(f)?;
            writeln!(f, "{} : {}", change.change_type, change.entity_name)?;
            for modification in &change.modifications {
                writeln!(f, "    {}", modification)?;
            }
            for column in &change.column_changes {
                write!(f, "  - column {} : {}", column.change_type, column.column_name())?;
                if column.modifications.is_empty() {
                    writeln!(f)?;
                } else {
                    writeln!(f, " ({})", column.modifications.join(", "))?;
                }
            }
            for fk in &change.foreign_key_changes {
                writeln!(f, "  - foreign key {} : {}", fk.change_type, fk.fk_name())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_counts() {
        let mut log = ChangeLog::new();
        assert!(log.is_empty());

        log.log(ChangeOnEntity::created(Entity::new("COUNTRY", "Country")));
        log.log(ChangeOnEntity::updated(Entity::new("TEACHER", "Teacher"), Entity::new("TEACHER", "Teacher")));
        log.log(ChangeOnEntity::updated(Entity::new("STUDENT", "Student"), Entity::new("STUDENT", "Student")));
        log.log(ChangeOnEntity::deleted(Entity::new("OLD", "Old")));

        assert_eq!(log.number_of_changes(), 4);
        assert_eq!(log.number_of_entities_created(), 1);
        assert_eq!(log.number_of_entities_updated(), 2);
        assert_eq!(log.number_of_entities_deleted(), 1);
        assert!(log.change_on("OLD").unwrap().after.is_none());
    }

    #[test]
    fn test_report() {
        let mut log = ChangeLog::new();
        let mut change = ChangeOnEntity::updated(Entity::new("TEACHER", "Teacher"), Entity::new("TEACHER", "Teacher"));
        change.modifications.push("comment changed".to_string());
        change.column_changes.push(ChangeOnColumn::updated(
            Attribute::new("CODE", "INTEGER"),
            Attribute::new("CODE", "BIGINT"),
            vec!["type: INTEGER → BIGINT".to_string()],
        ));
        change.column_changes.push(ChangeOnColumn::created(Attribute::new("EMAIL", "VARCHAR")));
        log.log(change);

        let report = log.to_string();
        assert!(report.contains("1 change(s): 0 created, 1 updated, 0 deleted"));
        assert!(report.contains("UPDATED : TEACHER"));
        assert!(report.contains("  - column UPDATED : CODE (type: INTEGER → BIGINT)"));
        assert!(report.contains("  - column CREATED : EMAIL\n"));
    }
}
