//! Error types and error handling

use std::path::PathBuf;
use thiserror::Error;

/// Result type for scaffold operations
pub type Result<T> = std::result::Result<T, ScaffoldError>;

/// A generation request that cannot produce an entity schema
///
/// Nothing is generated or written when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Model name missing or blank
    #[error("Missing required field: model name")]
    MissingModelName,

    /// Table name missing or blank
    #[error("Missing required field: table name")]
    MissingTableName,

    /// Entity short name missing or blank
    #[error("Missing required field: entity short name")]
    MissingShortName,

    /// No field row had both a column name and a type
    #[error("At least one field with a column name and a data type is required")]
    NoFields,

    /// Two fields share a column name
    #[error("Duplicate column name: '{column}'")]
    DuplicateColumn {
        /// The repeated column
        column: String,
    },

    /// Two foreign columns map to the same relation accessor
    #[error("Columns '{first}' and '{second}' both map to relation '{accessor}'")]
    RelationCollision {
        /// Column seen first
        first: String,
        /// Column that collides with it
        second: String,
        /// Shared accessor name
        accessor: String,
    },

    /// A field reuses a column the generator adds itself
    #[error("Column name '{column}' is reserved (id, created_at and updated_at are generated)")]
    ReservedColumn {
        /// The reserved column
        column: String,
    },
}

/// Scaffold engine error type
#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// Invalid generation request
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Template rendering failed
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Run record could not be encoded or decoded
    #[error("Run record error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// Filesystem operation failed
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Run directory has no stored record
    #[error("No run record found in {}", .0.display())]
    RunNotFound(PathBuf),
}

impl ScaffoldError {
    /// Attach a path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<figment::Error> for ScaffoldError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
