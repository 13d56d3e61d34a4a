//! Entity (database table) of the repository model

use super::attribute::Attribute;
use super::foreign_key::ForeignKey;
use super::link::Link;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

fn default_table_type() -> String {
    "TABLE".to_string()
}

/// Table with its columns, foreign keys and links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(rename = "name")]
    pub database_table: String,
    #[serde(rename = "schema", default)]
    pub database_schema: String,
    #[serde(rename = "catalog", default)]
    pub database_catalog: String,
    #[serde(default = "default_table_type")]
    pub database_type: String,
    #[serde(rename = "javaBean")]
    pub class_name: String,
    #[serde(default)]
    pub database_comment: String,
    /// Ordered by database position
    #[serde(rename = "columns", default)]
    attributes: Vec<Attribute>,
    #[serde(rename = "fks", default, with = "fk_list")]
    foreign_keys: BTreeMap<String, ForeignKey>,
    #[serde(default)]
    links: Vec<Link>,
}

impl Entity {
    pub fn new(table_name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            database_table: table_name.into(),
            database_schema: String::new(),
            database_catalog: String::new(),
            database_type: default_table_type(),
            class_name: class_name.into(),
            database_comment: String::new(),
            attributes: Vec::new(),
            foreign_keys: BTreeMap::new(),
            links: Vec::new(),
        }
    }

    pub fn is_view(&self) -> bool {
        self.database_type.eq_ignore_ascii_case("VIEW")
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub(crate) fn attributes_mut(&mut self) -> impl Iterator<Item = &mut Attribute> {
        self.attributes.iter_mut()
    }

    pub fn attribute_by_column_name(&self, column_name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.database_name == column_name)
    }

    pub fn attribute_by_column_name_mut(&mut self, column_name: &str) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|a| a.database_name == column_name)
    }

    pub fn attribute_by_name(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Insert or replace (same column name) an attribute, keeping the
    /// database position order
    pub fn store_attribute(&mut self, attribute: Attribute) {
        self.attributes.retain(|a| a.database_name != attribute.database_name);
        let idx = self
            .attributes
            .iter()
            .position(|a| a.database_position > attribute.database_position)
            .unwrap_or(self.attributes.len());
        self.attributes.insert(idx, attribute);
    }

    pub fn remove_attribute(&mut self, column_name: &str) -> Option<Attribute> {
        let idx = self.attributes.iter().position(|a| a.database_name == column_name)?;
        Some(self.attributes.remove(idx))
    }

    pub fn key_attributes(&self) -> Vec<&Attribute> {
        self.attributes.iter().filter(|a| a.key_element).collect()
    }

    pub fn has_composite_primary_key(&self) -> bool {
        self.key_attributes().len() > 1
    }

    pub fn has_primary_key(&self) -> bool {
        self.attributes.iter().any(|a| a.key_element)
    }

    // ------------------------------------------------------------------
    // Foreign keys
    // ------------------------------------------------------------------

    pub fn foreign_key(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys.get(name)
    }

    /// Foreign keys ordered by name
    pub fn foreign_keys(&self) -> impl Iterator<Item = &ForeignKey> {
        self.foreign_keys.values()
    }

    pub fn foreign_key_count(&self) -> usize {
        self.foreign_keys.len()
    }

    pub fn store_foreign_key(&mut self, fk: ForeignKey) {
        self.foreign_keys.insert(fk.name.clone(), fk);
    }

    pub fn remove_foreign_key(&mut self, name: &str) -> Option<ForeignKey> {
        self.foreign_keys.remove(name)
    }

    /// True if the table only carries the keys of two other tables: exactly
    /// two foreign keys, and every column is a primary key column used by
    /// one of them
    pub fn is_join_table(&self) -> bool {
        if self.foreign_keys.len() != 2 || self.attributes.is_empty() {
            return false;
        }
        let fk_columns: HashSet<&str> = self
            .foreign_keys
            .values()
            .flat_map(|fk| fk.columns.iter().map(|c| c.column_name.as_str()))
            .collect();
        self.attributes
            .iter()
            .all(|a| a.key_element && fk_columns.contains(a.database_name.as_str()))
    }

    // ------------------------------------------------------------------
    // Links
    // ------------------------------------------------------------------

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub(crate) fn links_mut(&mut self) -> impl Iterator<Item = &mut Link> {
        self.links.iter_mut()
    }

    pub fn link_by_id(&self, id: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }

    pub(crate) fn link_by_id_mut(&mut self, id: &str) -> Option<&mut Link> {
        self.links.iter_mut().find(|l| l.id == id)
    }

    pub fn selected_links(&self) -> Vec<&Link> {
        self.links.iter().filter(|l| l.selected).collect()
    }

    /// Insert a link, replacing any link with the same id
    pub fn store_link(&mut self, link: Link) {
        match self.links.iter_mut().find(|l| l.id == link.id) {
            Some(existing) => *existing = link,
            None => self.links.push(link),
        }
    }

    pub fn remove_link(&mut self, id: &str) -> Option<Link> {
        let idx = self.links.iter().position(|l| l.id == id)?;
        Some(self.links.remove(idx))
    }

    /// Remove the links matching a predicate, returns how many were removed
    pub fn remove_links_where<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&Link) -> bool,
    {
        let before = self.links.len();
        self.links.retain(|l| !predicate(l));
        before - self.links.len()
    }

    pub fn remove_all_links(&mut self) -> usize {
        let count = self.links.len();
        self.links.clear();
        count
    }

    /// True if a field named `name` already exists (attribute or link)
    pub fn has_field_named(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name) || self.links.iter().any(|l| l.field_name == name)
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) : {} attributes, {} FKs, {} links",
            self.class_name,
            self.database_table,
            self.attributes.len(),
            self.foreign_keys.len(),
            self.links.len()
        )
    }
}

/// Foreign keys are stored as a list, kept in memory by name
mod fk_list {
    use super::ForeignKey;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(map: &BTreeMap<String, ForeignKey>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<String, ForeignKey>, D::Error> {
        let list = Vec::<ForeignKey>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|fk| (fk.name.clone(), fk)).collect())
    }
}
