//! Error types for the data layer.
//!
//! Pool, migration and seeding failures surface as [`DbError`]. Inside an
//! engine transaction the store reports
//! [`StoreError`](farmstead_core::StoreError) instead, which the engine
//! understands.

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A value does not fit the column it is written to.
    #[error("Value out of range for {field}: {value}")]
    OutOfRange {
        /// The column.
        field: &'static str,
        /// The offending value.
        value: u64,
    },

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
