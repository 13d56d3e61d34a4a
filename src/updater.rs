//! Model Update Engine
//!
//! Compares a previously saved model with a fresh schema snapshot. Produces
//! the merged model, which keeps the hand-edited metadata of everything
//! still present in the database, and the change log.

use crate::builder::ModelBuilder;
use crate::changelog::{ChangeLog, ChangeOnColumn, ChangeOnEntity, ChangeOnForeignKey, ChangeType};
use crate::error::Result;
use crate::fk_resolver::ForeignKeyResolver;
use crate::introspection::SchemaSnapshot;
use crate::links::LinkInference;
use crate::models::{Entity, RepositoryModel};
use crate::naming::{class_name, unique_name};
use chrono::Local;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Merged model and the changes that led to it
#[derive(Debug, Clone)]
pub struct UpdateResult {
    pub model: RepositoryModel,
    pub change_log: ChangeLog,
}

pub struct ModelUpdater;

impl ModelUpdater {
    pub fn update(before: &RepositoryModel, snapshot: &SchemaSnapshot) -> Result<UpdateResult> {
        let mut change_log = ChangeLog::new();
        change_log.before_checksum = before.checksum();

        let mut model = RepositoryModel::new();
        model.name = before.name.clone();
        model.description = before.description.clone();
        model.database_id = before.database_id;
        model.database_name = if snapshot.database_name.is_empty() {
            before.database_name.clone()
        } else {
            snapshot.database_name.clone()
        };
        model.database_product_name = snapshot.database_product_name.clone();
        model.generation_date = before.generation_date;
        model.last_update_date = Some(Local::now().naive_local());

        let fresh_entities = ModelBuilder::build_entities(snapshot);
        let fresh_tables: HashSet<String> = fresh_entities.iter().map(|e| e.database_table.clone()).collect();

        for mut fresh in fresh_entities {
            match before.entity_by_table_name(&fresh.database_table) {
                None => {
                    fresh.class_name = unique_name(&class_name(&fresh.database_table), |name| {
                        model.entity_by_class_name(name).is_some()
                            || before
                                .entity_by_class_name(name)
                                .is_some_and(|e| fresh_tables.contains(&e.database_table))
                    });
                    debug!("Entity created: {}", fresh.database_table);
                    change_log.log(ChangeOnEntity::created(fresh.clone()));
                    model.store_entity(fresh);
                }
                Some(old) => {
                    let (merged, change) = Self::merge_entity(old, fresh);
                    if let Some(change) = change {
                        debug!(
                            "Entity updated: {} ({} column changes, {} FK changes)",
                            change.entity_name,
                            change.column_changes.len(),
                            change.foreign_key_changes.len()
                        );
                        change_log.log(change);
                    }
                    model.store_entity(merged);
                }
            }
        }

        for old in before.entities_sorted_by_table_name() {
            if !fresh_tables.contains(&old.database_table) {
                debug!("Entity deleted: {}", old.database_table);
                change_log.log(ChangeOnEntity::deleted(old.clone()));
            }
        }

        ForeignKeyResolver::resolve(&mut model)?;
        LinkInference::infer(&mut model)?;
        let restored = Self::restore_curated_links(before, &mut model);
        debug!("Curated options restored on {} links", restored);
        Self::refresh_after_states(&mut change_log, &model);

        change_log.after_checksum = model.checksum();

        info!(
            "Model updated: {} created, {} updated, {} deleted ({} entities)",
            change_log.number_of_entities_created(),
            change_log.number_of_entities_updated(),
            change_log.number_of_entities_deleted(),
            model.number_of_entities()
        );

        Ok(UpdateResult { model, change_log })
    }

    /// Merge the previous and fresh versions of the same table
    ///
    /// Database facts come from `fresh`, class name and curated attribute
    /// metadata from `old`. The change is `None` if no database fact differs.
    fn merge_entity(old: &Entity, fresh: Entity) -> (Entity, Option<ChangeOnEntity>) {
        let mut merged = fresh;
        merged.class_name = old.class_name.clone();

        let mut modifications = Vec::new();
        if old.database_comment != merged.database_comment {
            modifications.push(format!(
                "comment: '{}' → '{}'",
                old.database_comment, merged.database_comment
            ));
        }
        if !old.database_type.eq_ignore_ascii_case(&merged.database_type) {
            modifications.push(format!("type: {} → {}", old.database_type, merged.database_type));
        }

        let column_changes = Self::merge_attributes(old, &mut merged);
        let foreign_key_changes = Self::diff_foreign_keys(old, &merged);

        if modifications.is_empty() && column_changes.is_empty() && foreign_key_changes.is_empty() {
            return (merged, None);
        }

        let mut change = ChangeOnEntity::updated(old.clone(), merged.clone());
        change.modifications = modifications;
        change.column_changes = column_changes;
        change.foreign_key_changes = foreign_key_changes;
        (merged, Some(change))
    }

    fn merge_attributes(old: &Entity, merged: &mut Entity) -> Vec<ChangeOnColumn> {
        let mut changes = Vec::new();

        let fresh_attributes: Vec<_> = merged.attributes().to_vec();
        for fresh in fresh_attributes {
            match old.attribute_by_column_name(&fresh.database_name) {
                None => changes.push(ChangeOnColumn::created(fresh)),
                Some(previous) => {
                    let modifications = previous.database_differences(&fresh);
                    let same_type = previous.database_type.eq_ignore_ascii_case(&fresh.database_type);

                    let mut attribute = fresh;
                    attribute.carry_curated_from(previous, same_type);
                    if !modifications.is_empty() {
                        changes.push(ChangeOnColumn::updated(previous.clone(), attribute.clone(), modifications));
                    }
                    merged.store_attribute(attribute);
                }
            }
        }

        for previous in old.attributes() {
            if merged.attribute_by_column_name(&previous.database_name).is_none() {
                changes.push(ChangeOnColumn::deleted(previous.clone()));
            }
        }
        changes
    }

    fn diff_foreign_keys(old: &Entity, merged: &Entity) -> Vec<ChangeOnForeignKey> {
        let mut changes = Vec::new();

        for fk in merged.foreign_keys() {
            match old.foreign_key(&fk.name) {
                None => changes.push(ChangeOnForeignKey {
                    change_type: ChangeType::Created,
                    before: None,
                    after: Some(fk.clone()),
                }),
                Some(previous) if !previous.same_definition(fk) => changes.push(ChangeOnForeignKey {
                    change_type: ChangeType::Updated,
                    before: Some(previous.clone()),
                    after: Some(fk.clone()),
                }),
                Some(_) => {}
            }
        }

        for previous in old.foreign_keys() {
            if merged.foreign_key(&previous.name).is_none() {
                changes.push(ChangeOnForeignKey {
                    change_type: ChangeType::Deleted,
                    before: Some(previous.clone()),
                    after: None,
                });
            }
        }
        changes
    }

    /// Regenerated links keep the options edited on the link with the same id
    ///
    /// The previous field name is only taken back when no other field of the
    /// entity uses it, otherwise the inferred name stays and the inverse side
    /// is mapped by it.
    fn restore_curated_links(before: &RepositoryModel, model: &mut RepositoryModel) -> usize {
        let mut restored = 0;
        let mut inferred_mapped_by: HashMap<String, String> = HashMap::new();

        for entity in model.entities_mut() {
            let ids: Vec<String> = entity.links().iter().map(|l| l.id.clone()).collect();
            for id in ids {
                let Some(previous) = before.link_by_id(&id) else {
                    continue;
                };
                let (inferred_name, name_taken) = match entity.link_by_id(&id) {
                    Some(current) => (
                        current.field_name.clone(),
                        current.field_name != previous.field_name && entity.has_field_named(&previous.field_name),
                    ),
                    None => continue,
                };

                if let Some(link) = entity.link_by_id_mut(&id) {
                    link.carry_curated_from(previous);
                    if name_taken {
                        debug!(
                            "{} : field '{}' already used, {} keeps '{}'",
                            link.source_table_name,
                            previous.field_name,
                            link.id,
                            inferred_name
                        );
                        link.field_name = inferred_name;
                        if let (true, Some(inverse_id)) = (link.owning_side, link.inverse_side_link_id.as_ref()) {
                            inferred_mapped_by.insert(inverse_id.clone(), link.field_name.clone());
                        }
                    }
                    restored += 1;
                }
            }
        }

        if !inferred_mapped_by.is_empty() {
            for entity in model.entities_mut() {
                for link in entity.links_mut() {
                    if let Some(name) = inferred_mapped_by.get(&link.id) {
                        link.mapped_by = Some(name.clone());
                    }
                }
            }
        }
        restored
    }

    /// Change log entities and columns show the final state, with FK info and links
    fn refresh_after_states(change_log: &mut ChangeLog, model: &RepositoryModel) {
        for change in change_log.changes_mut() {
            if change.after.is_none() {
                continue;
            }
            let Some(entity) = model.entity_by_table_name(&change.entity_name) else {
                continue;
            };
            for column in change.column_changes.iter_mut().filter(|c| c.after.is_some()) {
                column.after = entity.attribute_by_column_name(column.column_name()).cloned();
            }
            change.after = Some(entity.clone());
        }
    }
}
