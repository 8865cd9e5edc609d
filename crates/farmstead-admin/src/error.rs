//! Error types for the admin binary.

/// Top-level error for the admin binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// The command line could not be parsed.
    #[error("usage error: {message}")]
    Usage {
        /// What was wrong with the arguments.
        message: String,
    },

    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: farmstead_core::ConfigError,
    },

    /// The starter catalog is inconsistent.
    #[error("catalog error: {source}")]
    Catalog {
        /// The underlying validation error.
        #[from]
        source: farmstead_core::CatalogError,
    },

    /// A database operation failed.
    #[error("database error: {source}")]
    Db {
        /// The underlying data layer error.
        #[from]
        source: farmstead_db::DbError,
    },

    /// Reading the confirmation or writing the schema file failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
