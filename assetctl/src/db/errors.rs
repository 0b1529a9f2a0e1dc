use thiserror::Error;

/// Unified error type for store operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// Entity not found by the given identifier
    #[error("Entity not found")]
    NotFound,

    /// Unique constraint violation
    #[error("Unique constraint violation")]
    UniqueViolation {
        constraint: &'static str,
        table: &'static str,
        message: String,
        /// The conflicting value that caused the violation
        conflicting_value: Option<String>,
    },

    /// A record references another record that does not exist
    #[error("Foreign key constraint violation")]
    ForeignKeyViolation {
        constraint: &'static str,
        table: &'static str,
        message: String,
    },

    /// A record failed a value constraint (empty name, inverted date range, ...)
    #[error("Check constraint violation")]
    CheckViolation {
        constraint: &'static str,
        table: &'static str,
        message: String,
    },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DbError {
    pub(crate) fn check(table: &'static str, constraint: &'static str, message: impl Into<String>) -> Self {
        DbError::CheckViolation {
            constraint,
            table,
            message: message.into(),
        }
    }

    pub(crate) fn foreign_key(table: &'static str, constraint: &'static str, message: impl Into<String>) -> Self {
        DbError::ForeignKeyViolation {
            constraint,
            table,
            message: message.into(),
        }
    }
}

/// Type alias for store operation results
pub type Result<T> = std::result::Result<T, DbError>;
