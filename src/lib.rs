//! DbModel Repository
//!
//! Metadata model of a relational database for code generation: entities,
//! attributes, foreign keys and inferred links, built from an introspected
//! schema, saved to a model file and kept up to date when the schema
//! evolves without losing what was edited by hand.
//!
//! - `builder`: schema snapshot -> entities -> complete model
//! - `fk_resolver`: foreign key participation of attributes
//! - `links`: owning / inverse links per foreign key or join table
//! - `updater`: merge of a saved model with a new snapshot + change log
//! - `persistence`: model file load / save

pub mod builder;
pub mod changelog;
pub mod config;
pub mod error;
pub mod fk_resolver;
pub mod introspection;
pub mod links;
pub mod logging;
pub mod models;
pub mod naming;
pub mod persistence;
pub mod updater;

pub use builder::{ModelBuilder, ModelGenerator};
pub use changelog::{ChangeLog, ChangeOnColumn, ChangeOnEntity, ChangeOnForeignKey, ChangeType};
pub use error::{RepositoryError, Result};
pub use fk_resolver::ForeignKeyResolver;
pub use introspection::SchemaSnapshot;
pub use links::LinkInference;
pub use models::RepositoryModel;
pub use persistence::{JsonModelStore, ModelStore};
pub use updater::{ModelUpdater, UpdateResult};
