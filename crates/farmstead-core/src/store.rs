//! Persistence seam: transactional access to every record the engine
//! touches.
//!
//! The engine never holds a connection between calls. Each operation calls
//! [`FarmStore::begin`], reads and locks the rows it needs through the
//! returned [`FarmTx`], writes its mutations, and calls
//! [`FarmTx::commit`]. Dropping a transaction without committing rolls it
//! back, so an early `?` return can never leave a partial update behind.
//!
//! Methods prefixed `lock_` take a write lock on the row they return (or
//! the equivalent isolation in the in-memory store) that is held until
//! commit or rollback. Two transactions locking the same player serialize.
//! Read-only operations open [`FarmStore::begin_read`] and use the
//! unlocked `player` and `plots_of` reads instead.
//!
//! Implementations:
//!
//! - [`MemoryStore`](crate::memory::MemoryStore) -- in-process, one
//!   transaction at a time.
//! - `PgFarmStore` in `farmstead-db` -- `PostgreSQL` with
//!   `SELECT ... FOR UPDATE` row locks.

use std::future::Future;

use chrono::{DateTime, Utc};
use farmstead_types::{
    GoldTransaction, InventoryEntry, ItemDef, ItemId, OrderId, PlantDef, PlantId, Player,
    PlayerId, Plot, PlotId, ShopItem, VillagerId, VillagerOrder,
};

/// Errors raised by a storage backend.
///
/// These are infrastructure failures, never rule violations. The
/// surrounding transaction is rolled back and the caller may retry the
/// whole operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend failed to execute a statement, begin, or commit.
    #[error("storage backend error: {source}")]
    Backend {
        /// The underlying driver error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A stored row could not be mapped back into a typed record.
    #[error("corrupt {entity} record {id}: {reason}")]
    Corrupt {
        /// The table or record type.
        entity: &'static str,
        /// The offending row's key.
        id: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The backend was told to fail (test fault injection).
    #[error("storage unavailable: {0}")]
    Unavailable(&'static str),
}

impl StoreError {
    /// Wrap a driver error.
    pub fn backend<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(source),
        }
    }
}

/// A source of transactions.
pub trait FarmStore: Send + Sync {
    /// The transaction handle type.
    type Tx: FarmTx;

    /// Open a new transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot start a transaction.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx, StoreError>> + Send;

    /// Open a transaction for reads only.
    ///
    /// Backends that can should give it one consistent snapshot without
    /// taking row locks, so reads never wait on writers. The default is
    /// an ordinary [`FarmStore::begin`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot start a transaction.
    fn begin_read(&self) -> impl Future<Output = Result<Self::Tx, StoreError>> + Send {
        self.begin()
    }
}

/// One open transaction. Commits with [`FarmTx::commit`]; rolls back on
/// drop.
///
/// All methods return [`StoreError`] only for infrastructure failures.
/// A missing row is `Ok(None)` (or `0` for inventory cells).
pub trait FarmTx: Send {
    // --- Players ---

    /// Load a player and lock their row for the rest of the transaction.
    fn lock_player(
        &mut self,
        id: PlayerId,
    ) -> impl Future<Output = Result<Option<Player>, StoreError>> + Send;

    /// Load a player without locking the row.
    fn player(
        &mut self,
        id: PlayerId,
    ) -> impl Future<Output = Result<Option<Player>, StoreError>> + Send;

    /// Insert a newly provisioned player.
    fn insert_player(
        &mut self,
        player: &Player,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrite a player's gold balance.
    fn update_gold(
        &mut self,
        player: PlayerId,
        gold: u64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    // --- Plots ---

    /// Load a plot and lock it.
    fn lock_plot(
        &mut self,
        id: PlotId,
    ) -> impl Future<Output = Result<Option<Plot>, StoreError>> + Send;

    /// Load and lock every plot owned by a player.
    fn lock_plots_of(
        &mut self,
        player: PlayerId,
    ) -> impl Future<Output = Result<Vec<Plot>, StoreError>> + Send;

    /// Every plot owned by a player, without locking them.
    fn plots_of(
        &mut self,
        player: PlayerId,
    ) -> impl Future<Output = Result<Vec<Plot>, StoreError>> + Send;

    /// Insert or overwrite a plot.
    fn save_plot(&mut self, plot: &Plot) -> impl Future<Output = Result<(), StoreError>> + Send;

    // --- Inventory ---

    /// Units of `item` held by `player`; an absent cell is zero.
    fn inventory_quantity(
        &mut self,
        player: PlayerId,
        item: ItemId,
    ) -> impl Future<Output = Result<u32, StoreError>> + Send;

    /// Set an inventory cell, creating it if absent. Zero removes the cell.
    fn set_inventory_quantity(
        &mut self,
        player: PlayerId,
        item: ItemId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Every non-empty inventory cell of a player.
    fn inventory_of(
        &mut self,
        player: PlayerId,
    ) -> impl Future<Output = Result<Vec<InventoryEntry>, StoreError>> + Send;

    // --- Affection ---

    /// A player's affection with a villager, if a row exists.
    fn affection_level(
        &mut self,
        player: PlayerId,
        villager: VillagerId,
    ) -> impl Future<Output = Result<Option<u32>, StoreError>> + Send;

    /// Set an affection level, creating the row if absent.
    fn set_affection_level(
        &mut self,
        player: PlayerId,
        villager: VillagerId,
        level: u32,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    // --- Orders ---

    /// Load an order and lock it against concurrent fulfillment.
    fn lock_order(
        &mut self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<VillagerOrder>, StoreError>> + Send;

    /// Overwrite an order.
    fn save_order(
        &mut self,
        order: &VillagerOrder,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Orders still available and unexpired at `now`, oldest first.
    fn open_orders(
        &mut self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<VillagerOrder>, StoreError>> + Send;

    // --- Gold transactions ---

    /// Append a record to the gold transaction log.
    fn append_transaction(
        &mut self,
        record: &GoldTransaction,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// A player's gold transaction log in insertion order.
    fn transactions_of(
        &mut self,
        player: PlayerId,
    ) -> impl Future<Output = Result<Vec<GoldTransaction>, StoreError>> + Send;

    // --- Catalog (read-only) ---

    /// Look up a plant definition.
    fn plant_def(
        &mut self,
        id: PlantId,
    ) -> impl Future<Output = Result<Option<PlantDef>, StoreError>> + Send;

    /// Look up an item definition.
    fn item(
        &mut self,
        id: ItemId,
    ) -> impl Future<Output = Result<Option<ItemDef>, StoreError>> + Send;

    /// Look up an item definition by its unique name.
    fn item_by_name(
        &mut self,
        name: &str,
    ) -> impl Future<Output = Result<Option<ItemDef>, StoreError>> + Send;

    /// Look up a shop listing.
    fn shop_item(
        &mut self,
        item: ItemId,
    ) -> impl Future<Output = Result<Option<ShopItem>, StoreError>> + Send;

    // --- Lifecycle ---

    /// Make every write in this transaction durable and visible.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the commit fails; nothing is applied.
    fn commit(self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
