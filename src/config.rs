//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

pub const DEFAULT_MODEL_FILE: &str = "dbmodel.json";
pub const DEFAULT_LOG_FILTER: &str = "info,dbmodel_repository=debug";

/// Input / output files of a generation or update run
#[derive(Debug, Clone)]
pub struct FilesConfig {
    /// Introspection output (JSON) describing the live schema
    pub schema_file: PathBuf,
    /// Persisted repository model, created or overwritten by each run
    pub model_file: PathBuf,
}

/// Model identity written into a freshly generated model
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub database_id: i32,
    pub name: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            database_id: -1,
            name: String::new(),
        }
    }
}

/// Complete application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub files: FilesConfig,
    pub model: ModelConfig,
    pub log_filter: String,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let schema_file = lookup("DBMODEL_SCHEMA_FILE")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("DBMODEL_SCHEMA_FILE".to_string()))?;

        let model_file = lookup("DBMODEL_MODEL_FILE")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL_FILE.to_string());

        let database_id = match lookup("DBMODEL_DATABASE_ID") {
            Some(raw) => raw.trim().parse::<i32>().map_err(|_| {
                ConfigError::InvalidValue(format!("DBMODEL_DATABASE_ID must be an integer, got '{}'", raw))
            })?,
            None => ModelConfig::default().database_id,
        };

        let model = ModelConfig {
            database_id,
            name: lookup("DBMODEL_NAME").unwrap_or_default(),
        };

        Ok(Self {
            files: FilesConfig {
                schema_file: PathBuf::from(schema_file),
                model_file: PathBuf::from(model_file),
            },
            model,
            log_filter: lookup("DBMODEL_LOG_FILTER").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[("DBMODEL_SCHEMA_FILE", "schema.json")])).unwrap();
        assert_eq!(settings.files.schema_file, PathBuf::from("schema.json"));
        assert_eq!(settings.files.model_file, PathBuf::from(DEFAULT_MODEL_FILE));
        assert_eq!(settings.model.database_id, -1);
        assert_eq!(settings.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_missing_schema_file() {
        let result = Settings::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::MissingVar(_))));
    }

    #[test]
    fn test_invalid_database_id() {
        let result = Settings::from_lookup(lookup_from(&[
            ("DBMODEL_SCHEMA_FILE", "schema.json"),
            ("DBMODEL_DATABASE_ID", "abc"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_explicit_values() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("DBMODEL_SCHEMA_FILE", "in.json"),
            ("DBMODEL_MODEL_FILE", "out.json"),
            ("DBMODEL_DATABASE_ID", " 3 "),
            ("DBMODEL_NAME", "school"),
        ]))
        .unwrap();
        assert_eq!(settings.model.database_id, 3);
        assert_eq!(settings.model.name, "school");
        assert_eq!(settings.files.model_file, PathBuf::from("out.json"));
    }
}
