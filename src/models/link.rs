//! Links (object relations) between entities

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
    Undefined,
}

impl Cardinality {
    pub fn is_to_many(&self) -> bool {
        matches!(self, Cardinality::OneToMany | Cardinality::ManyToMany)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Optional {
    True,
    False,
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FetchType {
    Default,
    Eager,
    Lazy,
    Undefined,
}

/// Tri-state flag ("insertable", "updatable")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BooleanValue {
    True,
    False,
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CascadeOption {
    All,
    Merge,
    Persist,
    Refresh,
    Remove,
}

/// Set of cascade options of a link
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CascadeOptions(BTreeSet<CascadeOption>);

impl CascadeOptions {
    pub fn add(&mut self, option: CascadeOption) {
        self.0.insert(option);
    }

    pub fn contains(&self, option: CascadeOption) -> bool {
        self.0.contains(&option)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl std::fmt::Display for CascadeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self
            .0
            .iter()
            .map(|o| match o {
                CascadeOption::All => "ALL",
                CascadeOption::Merge => "MERGE",
                CascadeOption::Persist => "PERSIST",
                CascadeOption::Refresh => "REFRESH",
                CascadeOption::Remove => "REMOVE",
            })
            .collect();
        write!(f, "{}", names.join(" "))
    }
}

/// Column used to join the two sides of a link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinColumn {
    pub name: String,
    pub referenced_column_name: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default = "default_true")]
    pub insertable: bool,
    #[serde(default = "default_true")]
    pub updatable: bool,
}

fn default_true() -> bool {
    true
}

impl JoinColumn {
    pub fn new(name: impl Into<String>, referenced_column_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            referenced_column_name: referenced_column_name.into(),
            nullable: true,
            unique: false,
            insertable: true,
            updatable: true,
        }
    }
}

/// Join table of a many-to-many link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTable {
    pub name: String,
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub catalog: String,
    pub join_columns: Vec<JoinColumn>,
    pub inverse_join_columns: Vec<JoinColumn>,
}

/// One side of a relation between two entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: String,
    #[serde(rename = "used", default = "default_true")]
    pub selected: bool,
    pub source_table_name: String,
    pub target_table_name: String,
    #[serde(rename = "targetEntity")]
    pub target_entity_class_name: String,
    pub cardinality: Cardinality,
    #[serde(rename = "javaName")]
    pub field_name: String,
    pub owning_side: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse_side_link_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_by: Option<String>,
    pub optional: Optional,
    #[serde(rename = "cascade", default)]
    pub cascade_options: CascadeOptions,
    #[serde(rename = "fetch")]
    pub fetch_type: FetchType,
    pub insertable: BooleanValue,
    pub updatable: BooleanValue,
    #[serde(default)]
    pub transient: bool,
    #[serde(rename = "foreignKeyName", default, skip_serializing_if = "Option::is_none")]
    pub foreign_key_name: Option<String>,
    #[serde(rename = "joinTableName", default, skip_serializing_if = "Option::is_none")]
    pub join_table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub join_columns: Vec<JoinColumn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_table: Option<JoinTable>,
}

const OWNING_SUFFIX: &str = "_O";
const INVERSE_SUFFIX: &str = "_I";

fn side_suffix(owning_side: bool) -> &'static str {
    if owning_side {
        OWNING_SUFFIX
    } else {
        INVERSE_SUFFIX
    }
}

impl Link {
    /// Id of a link built from a foreign key
    pub fn id_for_foreign_key(fk_name: &str, owning_side: bool) -> String {
        format!("LINK_FK_{}{}", fk_name, side_suffix(owning_side))
    }

    /// Id of a link built from a join table
    pub fn id_for_join_table(schema: &str, table: &str, owning_side: bool) -> String {
        if schema.is_empty() {
            format!("LINK_JT_{}{}", table, side_suffix(owning_side))
        } else {
            format!("LINK_JT_{}.{}{}", schema, table, side_suffix(owning_side))
        }
    }

    /// Link with default options, to be completed by the caller
    pub fn new(
        id: impl Into<String>,
        source_table_name: impl Into<String>,
        target_table_name: impl Into<String>,
        target_entity_class_name: impl Into<String>,
        cardinality: Cardinality,
        owning_side: bool,
    ) -> Self {
        Self {
            id: id.into(),
            selected: true,
            source_table_name: source_table_name.into(),
            target_table_name: target_table_name.into(),
            target_entity_class_name: target_entity_class_name.into(),
            cardinality,
            field_name: String::new(),
            owning_side,
            inverse_side_link_id: None,
            mapped_by: None,
            optional: Optional::Undefined,
            cascade_options: CascadeOptions::default(),
            fetch_type: FetchType::Default,
            insertable: BooleanValue::Undefined,
            updatable: BooleanValue::Undefined,
            transient: false,
            foreign_key_name: None,
            join_table_name: None,
            join_columns: Vec::new(),
            join_table: None,
        }
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_inverse_side(&self) -> bool {
        !self.owning_side
    }

    pub fn is_based_on_foreign_key(&self) -> bool {
        self.foreign_key_name.is_some()
    }

    pub fn is_based_on_join_table(&self) -> bool {
        self.join_table_name.is_some()
    }

    /// Copy the hand-edited options of a previous version of this link
    pub fn carry_curated_from(&mut self, previous: &Link) {
        self.field_name = previous.field_name.clone();
        self.mapped_by = previous.mapped_by.clone();
        self.cascade_options = previous.cascade_options.clone();
        self.fetch_type = previous.fetch_type;
        self.optional = previous.optional;
        self.selected = previous.selected;
        self.insertable = previous.insertable;
        self.updatable = previous.updatable;
        self.transient = previous.transient;
    }
}

impl std::fmt::Display for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} : {} --> {} ({:?}, {})",
            self.id,
            self.source_table_name,
            self.target_table_name,
            self.cardinality,
            if self.owning_side { "owning side" } else { "inverse side" }
        )
    }
}

/// Owning and inverse sides of one relation, either may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relation {
    pub owning: Option<Link>,
    pub inverse: Option<Link>,
}

impl Relation {
    pub fn new(owning: Link, inverse: Link) -> Self {
        Self {
            owning: Some(owning),
            inverse: Some(inverse),
        }
    }

    pub fn is_bidirectional(&self) -> bool {
        self.owning.is_some() && self.inverse.is_some()
    }
}

/// Filter used when listing the links of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinksCriteria {
    pub owning_side: bool,
    pub inverse_side: bool,
    pub selected: bool,
    pub unselected: bool,
}

impl LinksCriteria {
    pub fn all() -> Self {
        Self {
            owning_side: true,
            inverse_side: true,
            selected: true,
            unselected: true,
        }
    }

    pub fn selected_only() -> Self {
        Self {
            unselected: false,
            ..Self::all()
        }
    }

    pub fn matches(&self, link: &Link) -> bool {
        let side_ok = (link.owning_side && self.owning_side) || (!link.owning_side && self.inverse_side);
        let selection_ok = (link.selected && self.selected) || (!link.selected && self.unselected);
        side_ok && selection_ok
    }
}
