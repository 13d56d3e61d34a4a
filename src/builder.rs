//! Model Builder Module
//!
//! Turns a schema snapshot into repository entities, then into a complete
//! model (foreign keys resolved, links inferred).

use crate::error::Result;
use crate::fk_resolver::ForeignKeyResolver;
use crate::introspection::{self, SchemaSnapshot};
use crate::links::LinkInference;
use crate::models::{is_long_text_native, Attribute, Entity, ForeignKey, ForeignKeyColumn, RepositoryModel};
use crate::naming::{attribute_name, class_name, unique_name};
use chrono::Local;
use tracing::{debug, info};

/// Builds entities from introspection data, no FK resolution and no links
pub struct ModelBuilder;

impl ModelBuilder {
    /// One entity per table, class names unique in the list
    pub fn build_entities(snapshot: &SchemaSnapshot) -> Vec<Entity> {
        let mut entities: Vec<Entity> = Vec::with_capacity(snapshot.tables.len());
        for table in &snapshot.tables {
            let mut entity = Self::build_entity(table);
            entity.class_name = unique_name(&entity.class_name, |name| {
                entities.iter().any(|e| e.class_name == name)
            });
            entities.push(entity);
        }
        entities
    }

    pub fn build_entity(table: &introspection::Table) -> Entity {
        let mut entity = Entity::new(&table.name, class_name(&table.name));
        entity.database_schema = table.schema.clone();
        entity.database_catalog = table.catalog.clone();
        entity.database_type = table.table_type.clone();
        entity.database_comment = table.comment.clone().unwrap_or_default();

        let mut columns: Vec<&introspection::Column> = table.columns.iter().collect();
        columns.sort_by_key(|c| c.ordinal_position);
        for column in columns {
            let mut attribute = Self::build_attribute(column);
            attribute.name = unique_name(&attribute.name, |name| entity.attribute_by_name(name).is_some());
            entity.store_attribute(attribute);
        }

        for fk in &table.foreign_keys {
            entity.store_foreign_key(Self::build_foreign_key(&table.name, fk));
        }

        debug!(
            "Entity built: {} ({} attributes, {} FKs)",
            entity.class_name,
            entity.attributes().len(),
            entity.foreign_key_count()
        );
        entity
    }

    pub fn build_attribute(column: &introspection::Column) -> Attribute {
        let mut attribute = Attribute::new(&column.name, &column.type_name);
        attribute.database_size = column.size.clone();
        attribute.database_not_null = !column.nullable;
        attribute.key_element = column.is_primary_key;
        attribute.auto_incremented = column.auto_increment;
        attribute.database_position = column.ordinal_position;
        attribute.database_default_value = column.default_value.clone();
        attribute.database_comment = column.comment.clone().unwrap_or_default();
        attribute.jdbc_type_code = column.jdbc_type_code;

        attribute.name = attribute_name(&column.name);
        attribute.not_null = !column.nullable;
        Self::init_type_hints(&mut attribute);
        attribute
    }

    /// Default type specific hints for a freshly built (or retyped) attribute
    pub fn init_type_hints(attribute: &mut Attribute) {
        attribute.date_type = attribute.model_type.date_type();
        if attribute.model_type.is_string() {
            attribute.long_text = is_long_text_native(&attribute.database_type);
            attribute.max_length = attribute
                .database_size
                .as_deref()
                .and_then(|size| size.trim().parse::<u32>().ok());
        }
    }

    fn build_foreign_key(table_name: &str, fk: &introspection::ForeignKey) -> ForeignKey {
        let mut foreign_key = ForeignKey::new(&fk.name, table_name, &fk.referenced_table);
        for column in &fk.columns {
            foreign_key.store_column(ForeignKeyColumn {
                column_name: column.column.clone(),
                referenced_column_name: column.referenced_column.clone(),
                sequence: column.sequence,
                update_rule: column.update_rule,
                delete_rule: column.delete_rule,
                deferrable: column.deferrable,
            });
        }
        foreign_key
    }
}

/// Generates a complete model from a schema snapshot
pub struct ModelGenerator;

impl ModelGenerator {
    pub fn generate(snapshot: &SchemaSnapshot) -> Result<RepositoryModel> {
        let mut model = Self::build_resolved(snapshot)?;
        LinkInference::infer(&mut model)?;
        model.generation_date = Some(Local::now().naive_local());

        info!(
            "Model generated: {} entities, {} links",
            model.number_of_entities(),
            model.number_of_links()
        );
        Ok(model)
    }

    /// Entities built and foreign keys resolved, no links
    pub fn build_resolved(snapshot: &SchemaSnapshot) -> Result<RepositoryModel> {
        let mut model = RepositoryModel::new();
        model.database_name = snapshot.database_name.clone();
        model.database_product_name = snapshot.database_product_name.clone();
        for entity in ModelBuilder::build_entities(snapshot) {
            model.store_entity(entity);
        }
        ForeignKeyResolver::resolve(&mut model)?;
        Ok(model)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::RepositoryError;
    use crate::introspection::{Column, ForeignKeyColumn as SnapshotFkColumn, Table};
    use crate::models::{Cardinality, DateType, NeutralType};
    use pretty_assertions::assert_eq;

    pub(crate) fn column(name: &str, type_name: &str, position: i32, pk: bool) -> Column {
        Column {
            name: name.to_string(),
            type_name: type_name.to_string(),
            nullable: !pk,
            ordinal_position: position,
            is_primary_key: pk,
            ..Default::default()
        }
    }

    pub(crate) fn table(name: &str, comment: Option<&str>, columns: Vec<Column>) -> Table {
        Table {
            name: name.to_string(),
            table_type: "TABLE".to_string(),
            comment: comment.map(String::from),
            columns,
            ..Default::default()
        }
    }

    pub(crate) fn simple_fk(name: &str, column: &str, referenced_table: &str, referenced_column: &str) -> introspection::ForeignKey {
        introspection::ForeignKey {
            name: name.to_string(),
            referenced_table: referenced_table.to_string(),
            columns: vec![SnapshotFkColumn {
                column: column.to_string(),
                referenced_column: referenced_column.to_string(),
                sequence: 1,
                ..Default::default()
            }],
        }
    }

    /// STUDENT (commented) with a FK to TEACHER (not commented)
    pub(crate) fn school_snapshot() -> SchemaSnapshot {
        let teacher = table(
            "TEACHER",
            None,
            vec![column("CODE", "INTEGER", 1, true), column("LAST_NAME", "VARCHAR", 2, false)],
        );
        let mut student = table(
            "STUDENT",
            Some("My student comment"),
            vec![
                column("ID", "INTEGER", 1, true),
                column("FIRST_NAME", "VARCHAR", 2, false),
                column("TEACHER_CODE", "INTEGER", 3, false),
            ],
        );
        student.foreign_keys.push(simple_fk("FK_STUDENT_TEACHER", "TEACHER_CODE", "TEACHER", "CODE"));

        SchemaSnapshot {
            database_name: "school".to_string(),
            database_product_name: "H2".to_string(),
            tables: vec![teacher, student],
        }
    }

    #[test]
    fn test_build_attribute() {
        let mut col = column("BIRTH_DATE", "DATE", 4, false);
        col.comment = Some("birth".to_string());
        let attr = ModelBuilder::build_attribute(&col);

        assert_eq!(attr.name, "birthDate");
        assert_eq!(attr.model_type, NeutralType::Date);
        assert_eq!(attr.date_type, Some(DateType::DateOnly));
        assert_eq!(attr.database_comment, "birth");
        assert!(!attr.database_not_null);
        assert!(attr.selected);
    }

    #[test]
    fn test_string_hints() {
        let mut col = column("NOTES", "CLOB", 1, false);
        assert!(ModelBuilder::build_attribute(&col).long_text);

        col.type_name = "VARCHAR".to_string();
        col.size = Some("40".to_string());
        let attr = ModelBuilder::build_attribute(&col);
        assert!(!attr.long_text);
        assert_eq!(attr.max_length, Some(40));
    }

    #[test]
    fn test_entities_from_snapshot() {
        let snapshot = school_snapshot();
        let entities = ModelBuilder::build_entities(&snapshot);

        assert_eq!(entities.len(), 2);
        let student = &entities[1];
        assert_eq!(student.class_name, "Student");
        assert_eq!(student.database_comment, "My student comment");
        assert_eq!(entities[0].database_comment, "");
        assert_eq!(student.foreign_key("FK_STUDENT_TEACHER").unwrap().column_names(), vec!["TEACHER_CODE"]);
    }

    #[test]
    fn test_colliding_class_names() {
        let snapshot = SchemaSnapshot {
            tables: vec![
                table("ORDER_ITEM", None, vec![column("ID", "INTEGER", 1, true)]),
                table("ORDER-ITEM", None, vec![column("ID", "INTEGER", 1, true)]),
            ],
            ..Default::default()
        };
        let entities = ModelBuilder::build_entities(&snapshot);
        assert_eq!(entities[0].class_name, "OrderItem");
        assert_eq!(entities[1].class_name, "OrderItem2");
    }

    #[test]
    fn test_generate() {
        let model = ModelGenerator::generate(&school_snapshot()).unwrap();

        assert_eq!(model.number_of_entities(), 2);
        assert_eq!(model.database_product_name, "H2");
        assert!(model.generation_date.is_some());
        assert_eq!(model.entity_by_table_name("TEACHER").unwrap().database_comment, "");

        let teacher_code = model
            .entity_by_table_name("STUDENT")
            .unwrap()
            .attribute_by_column_name("TEACHER_CODE")
            .unwrap();
        assert!(teacher_code.is_fk_simple());
        assert_eq!(teacher_code.referenced_entity_class_name(), Some("Teacher"));

        let link = model.link_by_id("LINK_FK_FK_STUDENT_TEACHER_O").unwrap();
        assert_eq!(link.cardinality, Cardinality::ManyToOne);
        assert_eq!(model.number_of_links(), 2);
    }

    #[test]
    fn test_generate_with_dangling_fk() {
        let mut snapshot = school_snapshot();
        snapshot.tables.remove(0);
        let err = ModelGenerator::generate(&snapshot).unwrap_err();
        assert!(matches!(err, RepositoryError::ReferencedTableNotFound { .. }));
    }
}
