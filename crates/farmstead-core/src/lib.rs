//! The Farmstead engine: plots, villager orders, the shop, and the ledger
//! operations behind them.
//!
//! Every operation is a short unit of work on a [`FarmEngine`]: open a
//! store transaction, lock the acting player, validate, mutate, record any
//! gold movement, commit. A failure at any step rolls the whole operation
//! back.
//!
//! # Modules
//!
//! - [`catalog`] -- Items, plants, villagers, shop listings and the starter
//!   world.
//! - [`config`] -- Configuration loading from `farmstead-config.yaml` into
//!   strongly-typed structs.
//! - [`engine`] -- The [`FarmEngine`] facade.
//! - [`error`] -- [`EngineError`] and its [`ErrorKind`] categories.
//! - [`growth`] -- Pure plot lifecycle transitions.
//! - [`ledger`] -- Gold, inventory and affection mutations inside a
//!   transaction.
//! - [`memory`] -- The in-process [`MemoryStore`].
//! - [`orders`] -- Fulfilling villager orders and the order board.
//! - [`players`] -- Registration, overview and audit.
//! - [`plots`] -- Planting, watering, daily growth and harvesting.
//! - [`recorder`] -- The append-only gold transaction log.
//! - [`shop`] -- Buying from the shop.
//! - [`store`] -- The [`FarmStore`]/[`FarmTx`] persistence traits.
//!
//! # Usage
//!
//! ```
//! use farmstead_core::{Catalog, EconomyConfig, FarmEngine, MemoryStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let catalog = Catalog::starter(chrono::Utc::now());
//! let engine = FarmEngine::new(MemoryStore::with_catalog(&catalog), EconomyConfig::default());
//!
//! let overview = engine.register_player().await.ok();
//! assert_eq!(overview.map(|o| o.player.current_gold), Some(100));
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod growth;
pub mod ledger;
pub mod memory;
pub mod orders;
pub mod players;
pub mod plots;
pub mod recorder;
pub mod shop;
pub mod store;

// Re-export primary types at crate root.
pub use catalog::{Catalog, CatalogError};
pub use config::{ConfigError, EconomyConfig, FarmsteadConfig};
pub use engine::FarmEngine;
pub use error::{EngineError, ErrorKind, InvalidState, Missing, ResourceKind};
pub use memory::{FarmState, MemoryStore, MemoryTx};
pub use orders::OrderReceipt;
pub use players::PlayerOverview;
pub use plots::{DayReport, GatherReport, GatheredPlot, HarvestReceipt};
pub use shop::PurchaseReceipt;
pub use store::{FarmStore, FarmTx, StoreError};
