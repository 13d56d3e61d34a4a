//! Repository model types
//!
//! Entities, attributes, foreign keys and links of a reverse-engineered
//! database.

pub mod attribute;
pub mod entity;
pub mod foreign_key;
pub mod link;
pub mod repository;
pub mod types;

// Re-export commonly used types
pub use attribute::*;
pub use entity::*;
pub use foreign_key::*;
pub use link::*;
pub use repository::*;
pub use types::*;
