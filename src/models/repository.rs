//! Repository model: the whole reverse-engineered database

use super::entity::Entity;
use super::foreign_key::ForeignKey;
use super::link::{Link, LinksCriteria, Relation};
use chrono::NaiveDateTime;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// In-memory model of a database: entities keyed by table name plus model
/// metadata
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryModel {
    pub name: String,
    pub description: String,
    pub database_name: String,
    pub database_id: i32,
    pub database_product_name: String,
    pub generation_date: Option<NaiveDateTime>,
    pub last_update_date: Option<NaiveDateTime>,
    entities: BTreeMap<String, Entity>,
}

impl Default for RepositoryModel {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            database_name: String::new(),
            database_id: -1,
            database_product_name: String::new(),
            generation_date: None,
            last_update_date: None,
            entities: BTreeMap::new(),
        }
    }
}

impl RepositoryModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Model name, "Db#<database id>" when no name has been given
    pub fn name(&self) -> String {
        if self.name.is_empty() {
            format!("Db#{}", self.database_id)
        } else {
            self.name.clone()
        }
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    pub fn number_of_entities(&self) -> usize {
        self.entities.len()
    }

    /// Entities sorted by class name
    pub fn entities(&self) -> Vec<&Entity> {
        let mut list: Vec<&Entity> = self.entities.values().collect();
        list.sort_by(|a, b| a.class_name.cmp(&b.class_name));
        list
    }

    pub fn entities_sorted_by_table_name(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub(crate) fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    pub fn entity_by_table_name(&self, table_name: &str) -> Option<&Entity> {
        self.entities.get(table_name)
    }

    pub fn entity_by_table_name_mut(&mut self, table_name: &str) -> Option<&mut Entity> {
        self.entities.get_mut(table_name)
    }

    pub fn entity_by_class_name(&self, class_name: &str) -> Option<&Entity> {
        self.entities.values().find(|e| e.class_name == class_name)
    }

    /// Table names in ascending order
    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.keys().map(String::as_str).collect()
    }

    /// Insert or replace the entity stored under its table name
    pub fn store_entity(&mut self, entity: Entity) {
        self.entities.insert(entity.database_table.clone(), entity);
    }

    pub fn remove_entity(&mut self, table_name: &str) -> Option<Entity> {
        self.entities.remove(table_name)
    }

    /// Foreign key lookup across every entity
    pub fn foreign_key_by_name(&self, fk_name: &str) -> Option<&ForeignKey> {
        self.entities.values().find_map(|e| e.foreign_key(fk_name))
    }

    // ------------------------------------------------------------------
    // Links
    // ------------------------------------------------------------------

    pub fn number_of_links(&self) -> usize {
        self.entities.values().map(|e| e.links().len()).sum()
    }

    /// Every link of the model, sorted by id
    pub fn all_links(&self) -> Vec<&Link> {
        let mut list: Vec<&Link> = self.entities.values().flat_map(|e| e.links().iter()).collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        list
    }

    pub fn links(&self, criteria: &LinksCriteria) -> Vec<&Link> {
        self.all_links().into_iter().filter(|l| criteria.matches(l)).collect()
    }

    pub fn link_by_id(&self, id: &str) -> Option<&Link> {
        self.entities.values().find_map(|e| e.link_by_id(id))
    }

    pub fn remove_link_by_id(&mut self, id: &str) -> Option<Link> {
        self.entities.values_mut().find_map(|e| e.remove_link(id))
    }

    pub fn remove_all_links(&mut self) -> usize {
        self.entities.values_mut().map(|e| e.remove_all_links()).sum()
    }

    /// Remove every link going from or to the given table
    pub fn remove_links_by_entity_name(&mut self, table_name: &str) -> usize {
        self.remove_links_where(|l| l.source_table_name == table_name || l.target_table_name == table_name)
    }

    pub fn remove_links_by_foreign_key(&mut self, fk_name: &str) -> usize {
        self.remove_links_where(|l| l.foreign_key_name.as_deref() == Some(fk_name))
    }

    pub fn remove_links_by_join_table_name(&mut self, join_table_name: &str) -> usize {
        self.remove_links_where(|l| l.join_table_name.as_deref() == Some(join_table_name))
    }

    fn remove_links_where<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&Link) -> bool,
    {
        self.entities.values_mut().map(|e| e.remove_links_where(&predicate)).sum()
    }

    /// Both sides of the relation the link belongs to
    pub fn relation_by_link_id(&self, id: &str) -> Option<Relation> {
        let link = self.link_by_id(id)?;
        let relation = if link.owning_side {
            Relation {
                owning: Some(link.clone()),
                inverse: link
                    .inverse_side_link_id
                    .as_deref()
                    .and_then(|inverse_id| self.link_by_id(inverse_id))
                    .cloned(),
            }
        } else {
            Relation {
                owning: self.owning_link_of(id).cloned(),
                inverse: Some(link.clone()),
            }
        };
        Some(relation)
    }

    fn owning_link_of(&self, inverse_id: &str) -> Option<&Link> {
        self.entities
            .values()
            .flat_map(|e| e.links().iter())
            .find(|l| l.owning_side && l.inverse_side_link_id.as_deref() == Some(inverse_id))
    }

    /// All relations, one per owning link plus one per orphan inverse link
    pub fn relations(&self) -> Vec<Relation> {
        let mut relations = Vec::new();
        for link in self.all_links() {
            if link.owning_side {
                if let Some(relation) = self.relation_by_link_id(&link.id) {
                    relations.push(relation);
                }
            } else if self.owning_link_of(&link.id).is_none() {
                relations.push(Relation {
                    owning: None,
                    inverse: Some(link.clone()),
                });
            }
        }
        relations
    }

    /// Remove both sides of a relation, returns the number of links removed
    pub fn remove_relation(&mut self, relation: &Relation) -> usize {
        [&relation.owning, &relation.inverse]
            .into_iter()
            .flatten()
            .filter_map(|link| self.remove_link_by_id(&link.id))
            .count()
    }

    // ------------------------------------------------------------------
    // Checksum
    // ------------------------------------------------------------------

    /// SHA-256 of the database facts of the model (tables, columns, keys)
    ///
    /// Curated metadata and links do not take part in it, so two models of
    /// the same schema share the same checksum.
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();

        for entity in self.entities.values() {
            hasher.update(
                format!(
                    "T:{}.{}:{}:{}",
                    entity.database_schema, entity.database_table, entity.database_type, entity.database_comment
                )
                .as_bytes(),
            );
            for attr in entity.attributes() {
                hasher.update(
                    format!(
                        "C:{}:{}:{:?}:{}:{}:{}:{:?}:{}:{}",
                        attr.database_name,
                        attr.database_type,
                        attr.database_size,
                        attr.database_not_null,
                        attr.key_element,
                        attr.auto_incremented,
                        attr.database_default_value,
                        attr.database_position,
                        attr.database_comment
                    )
                    .as_bytes(),
                );
            }
            for fk in entity.foreign_keys() {
                hasher.update(format!("FK:{}->{}", fk.name, fk.referenced_table_name).as_bytes());
                for col in &fk.columns {
                    hasher.update(format!("{}={}", col.column_name, col.referenced_column_name).as_bytes());
                }
            }
        }

        let result = hasher.finalize();
        format!("{:x}", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attribute::Attribute;
    use crate::models::link::Cardinality;
    use pretty_assertions::assert_eq;

    fn model_with_relation() -> RepositoryModel {
        let mut model = RepositoryModel::new();

        let mut teacher = Entity::new("TEACHER", "Teacher");
        teacher.store_attribute(Attribute::new("CODE", "INTEGER"));
        let mut student = Entity::new("STUDENT", "Student");
        student.store_attribute(Attribute::new("TEACHER_CODE", "INTEGER"));

        let owning_id = Link::id_for_foreign_key("FK_ST", true);
        let inverse_id = Link::id_for_foreign_key("FK_ST", false);

        let mut owning = Link::new(&owning_id, "STUDENT", "TEACHER", "Teacher", Cardinality::ManyToOne, true);
        owning.foreign_key_name = Some("FK_ST".to_string());
        owning.inverse_side_link_id = Some(inverse_id.clone());
        let mut inverse = Link::new(&inverse_id, "TEACHER", "STUDENT", "Student", Cardinality::OneToMany, false);
        inverse.foreign_key_name = Some("FK_ST".to_string());

        student.store_link(owning);
        teacher.store_link(inverse);
        model.store_entity(teacher);
        model.store_entity(student);
        model
    }

    #[test]
    fn test_default_name() {
        let mut model = RepositoryModel::new();
        assert_eq!(model.name(), "Db#-1");
        model.name = "school".to_string();
        assert_eq!(model.name(), "school");
    }

    #[test]
    fn test_entity_ordering() {
        let mut model = model_with_relation();
        model.store_entity(Entity::new("A_TABLE", "Zebra"));

        assert_eq!(model.entity_names(), vec!["A_TABLE", "STUDENT", "TEACHER"]);
        let classes: Vec<&str> = model.entities().iter().map(|e| e.class_name.as_str()).collect();
        assert_eq!(classes, vec!["Student", "Teacher", "Zebra"]);
        assert_eq!(model.entity_by_class_name("Teacher").unwrap().database_table, "TEACHER");
    }

    #[test]
    fn test_relation_lookup_from_both_sides() {
        let model = model_with_relation();
        let from_owning = model.relation_by_link_id("LINK_FK_FK_ST_O").unwrap();
        let from_inverse = model.relation_by_link_id("LINK_FK_FK_ST_I").unwrap();

        assert!(from_owning.is_bidirectional());
        assert_eq!(from_owning, from_inverse);
        assert_eq!(model.relations().len(), 1);
        assert!(model.relation_by_link_id("NOPE").is_none());
    }

    #[test]
    fn test_link_removal() {
        let mut model = model_with_relation();
        assert_eq!(model.number_of_links(), 2);
        assert_eq!(model.remove_links_by_foreign_key("FK_ST"), 2);
        assert_eq!(model.number_of_links(), 0);

        let mut model = model_with_relation();
        assert_eq!(model.remove_links_by_entity_name("TEACHER"), 2);

        let mut model = model_with_relation();
        let relation = model.relation_by_link_id("LINK_FK_FK_ST_I").unwrap();
        assert_eq!(model.remove_relation(&relation), 2);
    }

    #[test]
    fn test_checksum_ignores_curated_data() {
        let model = model_with_relation();
        let mut curated = model.clone();
        curated.remove_all_links();
        curated.entity_by_table_name_mut("TEACHER").unwrap().class_name = "Master".to_string();
        assert_eq!(model.checksum(), curated.checksum());

        let mut changed = model.clone();
        changed.entity_by_table_name_mut("TEACHER").unwrap().database_comment = "x".to_string();
        assert_ne!(model.checksum(), changed.checksum());
    }
}
