//! Error types for catalog operations.

use svp_dict_core::ValidationError;
use thiserror::Error;

/// Errors that can occur while reading or writing the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// A stored value could not be converted back into a catalog type.
    #[error("conversion error: {0}")]
    ConversionError(String),

    /// Migration lifecycle operation failure.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Table prefix contains invalid characters.
    #[error("invalid prefix '{0}': must contain only alphanumeric characters and underscores")]
    InvalidPrefix(String),

    /// Library or service program name rejected before it reached the store.
    #[error(transparent)]
    InvalidName(#[from] ValidationError),

    /// The service program has not been synced into the catalog.
    #[error("service program not found: {library}/{name}")]
    ServiceProgramNotFound { library: String, name: String },
}

/// Convenience alias for results with [`CatalogError`].
pub type Result<T> = std::result::Result<T, CatalogError>;
