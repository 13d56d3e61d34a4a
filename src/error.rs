//! Error handling module
//!
//! Provides the unified error type for model building, foreign key
//! resolution, link inference, updates and persistence.

use thiserror::Error;

/// Repository-wide error type
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// A foreign key points to a table that is not part of the model
    #[error(
        "Table '{referenced_table}' not found in model. Referenced by foreign key '{fk_name}': table '{table}' --> '{referenced_table}'"
    )]
    ReferencedTableNotFound {
        fk_name: String,
        table: String,
        referenced_table: String,
    },

    /// A foreign key points to a column that does not exist in the referenced table
    #[error(
        "Column '{referenced_column}' not found in table '{referenced_table}'. Referenced by foreign key '{fk_name}' of table '{table}'"
    )]
    ReferencedColumnNotFound {
        fk_name: String,
        table: String,
        referenced_table: String,
        referenced_column: String,
    },

    /// A foreign key uses a local column unknown to its own entity
    #[error("Cannot get attribute by column name '{column}' in table '{table}' (foreign key '{fk_name}')")]
    LocalColumnNotFound {
        fk_name: String,
        table: String,
        column: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid date '{value}' (expected yyyy-MM-dd HH:mm:ss)")]
    InvalidDate { value: String },

    #[error("Not found: {0}")]
    NotFound(String),
}

impl RepositoryError {
    /// True for the referential / internal inconsistency errors that signal a
    /// corrupt or incomplete schema snapshot
    pub fn is_inconsistency(&self) -> bool {
        matches!(
            self,
            RepositoryError::ReferencedTableNotFound { .. }
                | RepositoryError::ReferencedColumnNotFound { .. }
                | RepositoryError::LocalColumnNotFound { .. }
        )
    }
}

/// Result type alias used across the crate
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Helper function to create a not found error
pub fn not_found_error(msg: impl Into<String>) -> RepositoryError {
    RepositoryError::NotFound(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referenced_table_message_names_everything() {
        let err = RepositoryError::ReferencedTableNotFound {
            fk_name: "FK_STUDENT_TEACHER".to_string(),
            table: "STUDENT".to_string(),
            referenced_table: "TEACHER".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("FK_STUDENT_TEACHER"));
        assert!(msg.contains("'STUDENT' --> 'TEACHER'"));
        assert!(err.is_inconsistency());
    }

    #[test]
    fn test_io_error_is_not_inconsistency() {
        let err: RepositoryError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(!err.is_inconsistency());
        assert!(not_found_error("x").to_string().contains("x"));
    }
}
