//! Foreign Key Resolver Module
//!
//! Marks the attributes taking part in foreign keys and builds their
//! FK parts (referenced table, column, class and attribute).

use crate::error::{RepositoryError, Result};
use crate::models::{ForeignKeyPart, RepositoryModel};
use tracing::debug;

/// Annotation to apply to one local attribute
struct FkAnnotation {
    table: String,
    column: String,
    simple: bool,
    part: ForeignKeyPart,
}

pub struct ForeignKeyResolver;

impl ForeignKeyResolver {
    /// Resolve every foreign key of every entity
    ///
    /// Previous FK information is cleared first, so running the resolver
    /// again on the same model gives the same result. On error the model is
    /// left untouched.
    ///
    /// Entities are walked in table name order, their foreign keys in name
    /// order and FK columns in sequence order. This order sets the order of
    /// the FK parts on an attribute, and picks the simple FK kept when
    /// several of them use the same column.
    pub fn resolve(model: &mut RepositoryModel) -> Result<()> {
        let annotations = Self::collect_annotations(model)?;

        for entity in model.entities_mut() {
            for attribute in entity.attributes_mut() {
                attribute.clear_fk_info();
            }
        }

        let count = annotations.len();
        for annotation in annotations {
            // Presence checked while collecting
            if let Some(attribute) = model
                .entity_by_table_name_mut(&annotation.table)
                .and_then(|e| e.attribute_by_column_name_mut(&annotation.column))
            {
                if annotation.simple {
                    attribute.set_simple_fk_reference(annotation.part.referenced_entity.clone());
                } else {
                    attribute.set_composite_fk_reference(annotation.part.referenced_entity.clone());
                }
                attribute.add_fk_part(annotation.part);
            }
        }

        debug!("Foreign keys resolved: {} FK parts", count);
        Ok(())
    }

    fn collect_annotations(model: &RepositoryModel) -> Result<Vec<FkAnnotation>> {
        let mut annotations = Vec::new();

        for entity in model.entities_sorted_by_table_name() {
            for fk in entity.foreign_keys() {
                if fk.columns.is_empty() {
                    continue;
                }

                let referenced = model.entity_by_table_name(&fk.referenced_table_name).ok_or_else(|| {
                    RepositoryError::ReferencedTableNotFound {
                        fk_name: fk.name.clone(),
                        table: entity.database_table.clone(),
                        referenced_table: fk.referenced_table_name.clone(),
                    }
                })?;

                let simple = fk.is_simple();
                for fk_column in &fk.columns {
                    if entity.attribute_by_column_name(&fk_column.column_name).is_none() {
                        return Err(RepositoryError::LocalColumnNotFound {
                            fk_name: fk.name.clone(),
                            table: entity.database_table.clone(),
                            column: fk_column.column_name.clone(),
                        });
                    }

                    let referenced_attribute = referenced
                        .attribute_by_column_name(&fk_column.referenced_column_name)
                        .ok_or_else(|| RepositoryError::ReferencedColumnNotFound {
                            fk_name: fk.name.clone(),
                            table: entity.database_table.clone(),
                            referenced_table: referenced.database_table.clone(),
                            referenced_column: fk_column.referenced_column_name.clone(),
                        })?;

                    annotations.push(FkAnnotation {
                        table: entity.database_table.clone(),
                        column: fk_column.column_name.clone(),
                        simple,
                        part: ForeignKeyPart {
                            fk_name: fk.name.clone(),
                            referenced_table: referenced.database_table.clone(),
                            referenced_column: referenced_attribute.database_name.clone(),
                            referenced_entity: referenced.class_name.clone(),
                            referenced_attribute: referenced_attribute.name.clone(),
                        },
                    });
                }
            }
        }

        Ok(annotations)
    }
}
