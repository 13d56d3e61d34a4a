//! Model Persistence Module
//!
//! Loads and saves repository models. The file keeps one `tableList` root
//! holding the model metadata and one entry per table. Derived FK
//! information is not stored: it is rebuilt on load.

pub mod date_format;

use crate::error::Result;
use crate::fk_resolver::ForeignKeyResolver;
use crate::models::{Entity, RepositoryModel};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Storage of a repository model
pub trait ModelStore {
    fn exists(&self) -> bool;
    fn load(&self) -> Result<RepositoryModel>;
    /// Replace the stored model
    fn save(&self, model: &RepositoryModel) -> Result<()>;
}

fn default_database_id() -> i32 {
    -1
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableList {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(default)]
    database_name: String,
    #[serde(default)]
    database_product_name: String,
    #[serde(default = "default_database_id")]
    database_id: i32,
    #[serde(rename = "generation", default, with = "date_format::option")]
    generation_date: Option<NaiveDateTime>,
    #[serde(rename = "lastUpdate", default, with = "date_format::option")]
    last_update_date: Option<NaiveDateTime>,
    #[serde(default)]
    tables: Vec<Entity>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelDocument {
    table_list: TableList,
}

impl From<&RepositoryModel> for ModelDocument {
    fn from(model: &RepositoryModel) -> Self {
        Self {
            table_list: TableList {
                name: model.name.clone(),
                description: model.description.clone(),
                database_name: model.database_name.clone(),
                database_product_name: model.database_product_name.clone(),
                database_id: model.database_id,
                generation_date: model.generation_date,
                last_update_date: model.last_update_date,
                tables: model.entities_sorted_by_table_name().cloned().collect(),
            },
        }
    }
}

impl ModelDocument {
    fn into_model(self) -> Result<RepositoryModel> {
        let list = self.table_list;
        let mut model = RepositoryModel::new();
        model.name = list.name;
        model.description = list.description;
        model.database_name = list.database_name;
        model.database_product_name = list.database_product_name;
        model.database_id = list.database_id;
        model.generation_date = list.generation_date;
        model.last_update_date = list.last_update_date;
        for entity in list.tables {
            model.store_entity(entity);
        }
        ForeignKeyResolver::resolve(&mut model)?;
        Ok(model)
    }
}

/// Serialize a model to the JSON text of the model file
pub fn to_json(model: &RepositoryModel) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ModelDocument::from(model))?)
}

/// Rebuild a model (FK information included) from the JSON text of a model
/// file
pub fn from_json(content: &str) -> Result<RepositoryModel> {
    let document: ModelDocument = serde_json::from_str(content)?;
    document.into_model()
}

/// Model stored in a single JSON file
#[derive(Debug, Clone)]
pub struct JsonModelStore {
    path: PathBuf,
}

impl JsonModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelStore for JsonModelStore {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> Result<RepositoryModel> {
        let content = std::fs::read_to_string(&self.path)?;
        let model = from_json(&content)?;
        info!(
            "Model loaded from {}: {} entities, {} links",
            self.path.display(),
            model.number_of_entities(),
            model.number_of_links()
        );
        Ok(model)
    }

    fn save(&self, model: &RepositoryModel) -> Result<()> {
        let content = to_json(model)?;
        std::fs::write(&self.path, content)?;
        debug!("Model saved to {}", self.path.display());
        Ok(())
    }
}
