//! `PostgreSQL` persistence for the Farmstead simulation.
//!
//! [`PgFarmStore`] implements the engine's
//! [`FarmStore`](farmstead_core::FarmStore) seam, so the same
//! [`FarmEngine`](farmstead_core::FarmEngine) code runs against the
//! database that runs against the in-memory store in tests.
//!
//! # Modules
//!
//! - [`postgres`] -- Connection pool, configuration and migrations
//! - [`store`] -- [`PgFarmStore`] / [`PgFarmTx`] with row locking
//! - [`catalog_store`] -- Catalog seeding and table reset
//! - [`rows`] -- Row types and enum/number conversions
//! - [`error`] -- Shared error types

pub mod catalog_store;
pub mod error;
pub mod postgres;
pub mod rows;
pub mod store;

// Re-export primary types for convenience.
pub use catalog_store::{CatalogStore, SeedSummary};
pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool, SCHEMA_SQL};
pub use store::{PgFarmStore, PgFarmTx};
