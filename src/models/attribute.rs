//! Attribute (table column) of an entity

use super::foreign_key::ForeignKeyPart;
use super::types::{DateType, NeutralType};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Key generation strategy declared for an attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedValue {
    /// "AUTO", "IDENTITY", "SEQUENCE" or "TABLE"
    pub strategy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceGenerator {
    pub name: String,
    pub sequence_name: String,
    pub allocation_size: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableGenerator {
    pub name: String,
    pub table: String,
    pub pk_column_name: String,
    pub pk_column_value: String,
    pub value_column_name: String,
}

/// Foreign key references held by an attribute
///
/// Simple and composite references live in separate slots; the effective
/// reference is chosen when read, simple first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FkReference {
    simple: Option<String>,
    composite: Option<String>,
}

impl FkReference {
    pub fn simple(&self) -> Option<&str> {
        self.simple.as_deref()
    }

    pub fn composite(&self) -> Option<&str> {
        self.composite.as_deref()
    }

    pub fn effective(&self) -> Option<&str> {
        self.simple().or_else(|| self.composite())
    }
}

/// Column of a table plus the generator-specific metadata of the mapped
/// attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    // Database facts
    #[serde(rename = "dbName")]
    pub database_name: String,
    #[serde(rename = "dbTypeName")]
    pub database_type: String,
    #[serde(rename = "dbSize", default, skip_serializing_if = "Option::is_none")]
    pub database_size: Option<String>,
    #[serde(rename = "dbNotNull", default)]
    pub database_not_null: bool,
    #[serde(rename = "dbPrimaryKey", default)]
    pub key_element: bool,
    #[serde(rename = "dbAutoIncremented", default)]
    pub auto_incremented: bool,
    #[serde(rename = "dbPosition", default)]
    pub database_position: i32,
    #[serde(rename = "dbDefaultValue", default, skip_serializing_if = "Option::is_none")]
    pub database_default_value: Option<String>,
    #[serde(rename = "dbComment", default)]
    pub database_comment: String,
    #[serde(default)]
    pub jdbc_type_code: i32,

    // Model facts
    #[serde(rename = "javaName")]
    pub name: String,
    #[serde(rename = "javaType")]
    pub model_type: NeutralType,
    #[serde(rename = "javaDefaultValue", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default = "default_true")]
    pub selected: bool,

    // Curated hints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default)]
    pub long_text: bool,
    #[serde(default)]
    pub not_empty: bool,
    #[serde(default)]
    pub not_blank: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_type: Option<DateType>,
    #[serde(default)]
    pub date_past: bool,
    #[serde(default)]
    pub date_future: bool,
    #[serde(default)]
    pub date_before: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_before_value: Option<String>,
    #[serde(default)]
    pub date_after: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_after_value: Option<String>,
    /// Numeric bounds, kept as written to avoid any precision loss
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<String>,
    #[serde(rename = "boolTrue", default, skip_serializing_if = "Option::is_none")]
    pub boolean_true_value: Option<String>,
    #[serde(rename = "boolFalse", default, skip_serializing_if = "Option::is_none")]
    pub boolean_false_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_value: Option<GeneratedValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_generator: Option<SequenceGenerator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_generator: Option<TableGenerator>,

    // Derived by the foreign key resolver, never persisted
    #[serde(skip)]
    fk_reference: FkReference,
    #[serde(skip)]
    fk_parts: Vec<ForeignKeyPart>,
}

impl Attribute {
    pub fn new(column_name: impl Into<String>, database_type: impl Into<String>) -> Self {
        let database_type = database_type.into();
        Self {
            database_name: column_name.into(),
            model_type: NeutralType::from_native(&database_type),
            database_type,
            database_size: None,
            database_not_null: false,
            key_element: false,
            auto_incremented: false,
            database_position: 0,
            database_default_value: None,
            database_comment: String::new(),
            jdbc_type_code: 0,
            name: String::new(),
            default_value: None,
            not_null: false,
            selected: true,
            label: None,
            input_type: None,
            long_text: false,
            not_empty: false,
            not_blank: false,
            min_length: None,
            max_length: None,
            pattern: None,
            date_type: None,
            date_past: false,
            date_future: false,
            date_before: false,
            date_before_value: None,
            date_after: false,
            date_after_value: None,
            min_value: None,
            max_value: None,
            boolean_true_value: None,
            boolean_false_value: None,
            format: None,
            generated_value: None,
            sequence_generator: None,
            table_generator: None,
            fk_reference: FkReference::default(),
            fk_parts: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Foreign key participation
    // ------------------------------------------------------------------

    pub fn is_fk(&self) -> bool {
        self.is_fk_simple() || self.is_fk_composite()
    }

    pub fn is_fk_simple(&self) -> bool {
        self.fk_reference.simple.is_some()
    }

    pub fn is_fk_composite(&self) -> bool {
        self.fk_reference.composite.is_some()
    }

    pub fn fk_reference(&self) -> &FkReference {
        &self.fk_reference
    }

    /// Class name of the referenced entity, the simple FK reference taking
    /// priority over the composite one
    pub fn referenced_entity_class_name(&self) -> Option<&str> {
        self.fk_reference.effective()
    }

    pub(crate) fn set_simple_fk_reference(&mut self, class_name: impl Into<String>) {
        self.fk_reference.simple = Some(class_name.into());
    }

    pub(crate) fn set_composite_fk_reference(&mut self, class_name: impl Into<String>) {
        self.fk_reference.composite = Some(class_name.into());
    }

    pub fn fk_parts(&self) -> &[ForeignKeyPart] {
        &self.fk_parts
    }

    pub fn has_fk_parts(&self) -> bool {
        !self.fk_parts.is_empty()
    }

    pub(crate) fn add_fk_part(&mut self, part: ForeignKeyPart) {
        self.fk_parts.push(part);
    }

    /// Forget everything the resolver derived
    pub(crate) fn clear_fk_info(&mut self) {
        self.fk_reference = FkReference::default();
        self.fk_parts.clear();
    }

    // ------------------------------------------------------------------
    // Misc
    // ------------------------------------------------------------------

    pub fn is_generated_value(&self) -> bool {
        self.auto_incremented || self.generated_value.is_some()
    }

    /// Value used to store TRUE in the database ("" if none)
    pub fn boolean_true_value(&self) -> &str {
        self.boolean_true_value.as_deref().unwrap_or("")
    }

    /// Value used to store FALSE in the database ("" if none)
    pub fn boolean_false_value(&self) -> &str {
        self.boolean_false_value.as_deref().unwrap_or("")
    }

    /// Short summary of the type specific hints ("" if none)
    pub fn special_type_info(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if self.model_type.is_string() {
            if self.long_text {
                parts.push("Long Text".to_string());
            }
            if self.not_empty {
                parts.push("NE".to_string());
            }
            if self.not_blank {
                parts.push("NB".to_string());
            }
            if self.min_length.is_some() || self.max_length.is_some() {
                parts.push(format!("[{};{}]", opt_str(&self.min_length), opt_str(&self.max_length)));
            }
            if self.pattern.as_deref().is_some_and(|p| !p.is_empty()) {
                parts.push("P".to_string());
            }
        } else if self.model_type.is_boolean() {
            if !self.boolean_true_value().is_empty() {
                parts.push(format!("{}:{}", self.boolean_true_value(), self.boolean_false_value()));
            }
        } else if self.model_type.is_number() {
            if let Some(default) = self.default_value.as_deref().filter(|d| !d.is_empty()) {
                parts.push(default.to_string());
            }
            if self.min_value.is_some() || self.max_value.is_some() {
                parts.push(format!("[{};{}]", opt_str(&self.min_value), opt_str(&self.max_value)));
            }
        } else if self.model_type.is_temporal() {
            if let Some(date_type) = self.date_type {
                parts.push(date_type.label().to_string());
            }
            for (flag, code) in [
                (self.date_past, "P"),
                (self.date_future, "F"),
                (self.date_before, "B"),
                (self.date_after, "A"),
            ] {
                if flag {
                    parts.push(code.to_string());
                }
            }
        }
        parts.join(",")
    }

    /// Reset every type specific hint
    pub fn clear_special_type_info(&mut self) {
        self.not_null = false;
        self.boolean_true_value = None;
        self.boolean_false_value = None;
        self.date_type = None;
        self.date_past = false;
        self.date_future = false;
        self.date_before = false;
        self.date_before_value = None;
        self.date_after = false;
        self.date_after_value = None;
        self.min_value = None;
        self.max_value = None;
        self.long_text = false;
        self.not_empty = false;
        self.not_blank = false;
        self.min_length = None;
        self.max_length = None;
        self.pattern = None;
    }

    /// Names of the database facts that differ between two versions of the
    /// same column
    pub fn database_differences(&self, other: &Attribute) -> Vec<String> {
        let mut modifications = Vec::new();

        if !self.database_type.eq_ignore_ascii_case(&other.database_type) {
            modifications.push(format!("type: {} → {}", self.database_type, other.database_type));
        }
        if self.database_size != other.database_size {
            modifications.push(format!("size: {:?} → {:?}", self.database_size, other.database_size));
        }
        if self.database_not_null != other.database_not_null {
            modifications.push(if other.database_not_null {
                "now NOT NULL".to_string()
            } else {
                "now nullable".to_string()
            });
        }
        if self.database_position != other.database_position {
            modifications.push(format!(
                "position: {} → {}",
                self.database_position, other.database_position
            ));
        }
        if self.database_default_value != other.database_default_value {
            modifications.push(format!(
                "default: {:?} → {:?}",
                self.database_default_value, other.database_default_value
            ));
        }
        if self.database_comment != other.database_comment {
            modifications.push("comment changed".to_string());
        }
        if self.key_element != other.key_element {
            modifications.push(if other.key_element {
                "added to PRIMARY KEY".to_string()
            } else {
                "removed from PRIMARY KEY".to_string()
            });
        }
        if self.auto_incremented != other.auto_incremented {
            modifications.push(format!("auto-increment: {}", other.auto_incremented));
        }
        modifications
    }

    /// Copy the hand-edited metadata of a previous version of this column
    ///
    /// With `keep_type_hints == false` (native type changed) only the type
    /// independent fields are copied.
    pub fn carry_curated_from(&mut self, previous: &Attribute, keep_type_hints: bool) {
        self.name = previous.name.clone();
        self.selected = previous.selected;
        self.label = previous.label.clone();
        self.input_type = previous.input_type.clone();

        if !keep_type_hints {
            return;
        }

        self.model_type = previous.model_type;
        self.default_value = previous.default_value.clone();
        self.not_null = previous.not_null;
        self.long_text = previous.long_text;
        self.not_empty = previous.not_empty;
        self.not_blank = previous.not_blank;
        self.min_length = previous.min_length;
        self.max_length = previous.max_length;
        self.pattern = previous.pattern.clone();
        self.date_type = previous.date_type;
        self.date_past = previous.date_past;
        self.date_future = previous.date_future;
        self.date_before = previous.date_before;
        self.date_before_value = previous.date_before_value.clone();
        self.date_after = previous.date_after;
        self.date_after_value = previous.date_after_value.clone();
        self.min_value = previous.min_value.clone();
        self.max_value = previous.max_value.clone();
        self.boolean_true_value = previous.boolean_true_value.clone();
        self.boolean_false_value = previous.boolean_false_value.clone();
        self.format = previous.format.clone();
        self.generated_value = previous.generated_value.clone();
        self.sequence_generator = previous.sequence_generator.clone();
        self.table_generator = previous.table_generator.clone();
    }
}

fn opt_str<T: std::fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "null".to_string(),
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}|table:{}|{}|{}|{:?}",
            self.name,
            self.database_name,
            if self.key_element { "PK" } else { "" },
            self.jdbc_type_code,
            self.model_type
        )
    }
}
