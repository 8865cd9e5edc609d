//! In-process [`FarmStore`] backed by a single async mutex.
//!
//! [`MemoryStore::begin`] takes the store-wide lock and clones the state
//! into a working copy. Writes go to the copy; [`FarmTx::commit`] swaps it
//! in and releases the lock. Dropping a [`MemoryTx`] discards the copy, so
//! a failed operation leaves the store exactly as it was.
//!
//! The gold transaction log is append-only and is not copied. New records
//! are staged in the transaction and appended to the committed log on
//! commit, so the cost of `begin` does not grow with the log.
//!
//! Holding one lock per transaction serializes every operation. That is
//! stricter than the per-row locks of the `PostgreSQL` store and gives the
//! same guarantees for the exactly-once properties.

use std::collections::BTreeMap;
use std::future::{Future, ready};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use farmstead_types::{
    GoldTransaction, InventoryEntry, ItemDef, ItemId, OrderId, PlantDef, PlantId, Player,
    PlayerId, Plot, PlotId, ShopItem, Villager, VillagerId, VillagerOrder,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::catalog::Catalog;
use crate::store::{FarmStore, FarmTx, StoreError};

/// Every record held by a [`MemoryStore`].
#[derive(Debug, Clone, Default)]
pub struct FarmState {
    players: BTreeMap<PlayerId, Player>,
    plots: BTreeMap<PlotId, Plot>,
    inventory: BTreeMap<(PlayerId, ItemId), u32>,
    affection: BTreeMap<(PlayerId, VillagerId), u32>,
    orders: BTreeMap<OrderId, VillagerOrder>,
    transactions: Vec<GoldTransaction>,
    items: BTreeMap<ItemId, ItemDef>,
    plants: BTreeMap<PlantId, PlantDef>,
    villagers: BTreeMap<VillagerId, Villager>,
    shop: BTreeMap<ItemId, ShopItem>,
}

impl FarmState {
    /// Copy every record except the transaction log, which a transaction
    /// only ever appends to.
    fn fork(&self) -> Self {
        Self {
            players: self.players.clone(),
            plots: self.plots.clone(),
            inventory: self.inventory.clone(),
            affection: self.affection.clone(),
            orders: self.orders.clone(),
            transactions: Vec::new(),
            items: self.items.clone(),
            plants: self.plants.clone(),
            villagers: self.villagers.clone(),
            shop: self.shop.clone(),
        }
    }

    /// Load catalog records and the opening order board.
    pub fn load_catalog(&mut self, catalog: &Catalog) {
        for item in &catalog.items {
            self.items.insert(item.id, item.clone());
        }
        for plant in &catalog.plants {
            self.plants.insert(plant.id, plant.clone());
        }
        for villager in &catalog.villagers {
            self.villagers.insert(villager.id, villager.clone());
        }
        for listing in &catalog.shop {
            self.shop.insert(listing.item, *listing);
        }
        for order in &catalog.orders {
            self.orders.insert(order.id, order.clone());
        }
    }

    /// A player record.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// A plot.
    pub fn plot(&self, id: PlotId) -> Option<&Plot> {
        self.plots.get(&id)
    }

    /// Every plot owned by `player`.
    pub fn plots_of(&self, player: PlayerId) -> Vec<Plot> {
        self.plots
            .values()
            .filter(|plot| plot.player == player)
            .copied()
            .collect()
    }

    /// Units of `item` held by `player`.
    pub fn quantity(&self, player: PlayerId, item: ItemId) -> u32 {
        self.inventory.get(&(player, item)).copied().unwrap_or(0)
    }

    /// Number of stored inventory cells across all players.
    pub fn inventory_cells(&self) -> usize {
        self.inventory.len()
    }

    /// Affection between `player` and `villager`, if a row exists.
    pub fn affection(&self, player: PlayerId, villager: VillagerId) -> Option<u32> {
        self.affection.get(&(player, villager)).copied()
    }

    /// An order.
    pub fn order(&self, id: OrderId) -> Option<&VillagerOrder> {
        self.orders.get(&id)
    }

    /// The gold transaction log of `player`, oldest first.
    pub fn transactions_of(&self, player: PlayerId) -> Vec<GoldTransaction> {
        self.transactions
            .iter()
            .filter(|record| record.player == player)
            .cloned()
            .collect()
    }

    /// Insert or overwrite a plot.
    pub fn put_plot(&mut self, plot: Plot) {
        self.plots.insert(plot.id, plot);
    }

    /// Insert or overwrite an order.
    pub fn put_order(&mut self, order: VillagerOrder) {
        self.orders.insert(order.id, order);
    }

    /// Set an inventory cell. Zero removes it.
    pub fn set_quantity(&mut self, player: PlayerId, item: ItemId, quantity: u32) {
        if quantity == 0 {
            self.inventory.remove(&(player, item));
        } else {
            self.inventory.insert((player, item), quantity);
        }
    }
}

/// A [`FarmStore`] that keeps everything in process memory.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<FarmState>>,
    fail_appends: Arc<AtomicBool>,
    /// Plot saves each transaction may make before failing.
    plot_save_budget: Arc<AtomicUsize>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::from_state(FarmState::default())
    }
}

impl MemoryStore {
    /// An empty store with no catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with `catalog`.
    pub fn with_catalog(catalog: &Catalog) -> Self {
        let mut state = FarmState::default();
        state.load_catalog(catalog);
        Self::from_state(state)
    }

    fn from_state(state: FarmState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            fail_appends: Arc::new(AtomicBool::new(false)),
            plot_save_budget: Arc::new(AtomicUsize::new(usize::MAX)),
        }
    }

    /// A copy of the committed state.
    pub async fn snapshot(&self) -> FarmState {
        self.state.lock().await.clone()
    }

    /// Mutate the committed state directly, outside any engine operation.
    pub async fn modify<F>(&self, apply: F)
    where
        F: FnOnce(&mut FarmState) + Send,
    {
        let mut state = self.state.lock().await;
        apply(&mut state);
    }

    /// Make every later [`FarmTx::append_transaction`] fail with
    /// [`StoreError::Unavailable`] until switched off again.
    pub fn fail_transaction_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Let each later transaction save `saves` plots, then fail every
    /// further [`FarmTx::save_plot`] with [`StoreError::Unavailable`].
    /// `None` lifts the limit.
    pub fn fail_plot_saves_after(&self, saves: Option<usize>) {
        self.plot_save_budget
            .store(saves.unwrap_or(usize::MAX), Ordering::SeqCst);
    }
}

impl FarmStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.fork();
        Ok(MemoryTx {
            guard,
            working,
            staged: Vec::new(),
            fail_appends: self.fail_appends.load(Ordering::SeqCst),
            plot_saves_left: self.plot_save_budget.load(Ordering::SeqCst),
        })
    }
}

/// An open [`MemoryStore`] transaction.
#[derive(Debug)]
pub struct MemoryTx {
    guard: OwnedMutexGuard<FarmState>,
    /// Every record but the log.
    working: FarmState,
    /// Log records appended by this transaction.
    staged: Vec<GoldTransaction>,
    fail_appends: bool,
    plot_saves_left: usize,
}

impl FarmTx for MemoryTx {
    fn lock_player(
        &mut self,
        id: PlayerId,
    ) -> impl Future<Output = Result<Option<Player>, StoreError>> + Send {
        ready(Ok(self.working.players.get(&id).cloned()))
    }

    fn player(
        &mut self,
        id: PlayerId,
    ) -> impl Future<Output = Result<Option<Player>, StoreError>> + Send {
        ready(Ok(self.working.players.get(&id).cloned()))
    }

    fn insert_player(
        &mut self,
        player: &Player,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.working.players.insert(player.id, player.clone());
        ready(Ok(()))
    }

    fn update_gold(
        &mut self,
        player: PlayerId,
        gold: u64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let result = self
            .working
            .players
            .get_mut(&player)
            .map(|record| record.current_gold = gold)
            .ok_or_else(|| StoreError::Corrupt {
                entity: "player",
                id: player.to_string(),
                reason: "gold update for missing row".to_owned(),
            });
        ready(result)
    }

    fn lock_plot(
        &mut self,
        id: PlotId,
    ) -> impl Future<Output = Result<Option<Plot>, StoreError>> + Send {
        ready(Ok(self.working.plots.get(&id).copied()))
    }

    fn lock_plots_of(
        &mut self,
        player: PlayerId,
    ) -> impl Future<Output = Result<Vec<Plot>, StoreError>> + Send {
        ready(Ok(self.working.plots_of(player)))
    }

    fn plots_of(
        &mut self,
        player: PlayerId,
    ) -> impl Future<Output = Result<Vec<Plot>, StoreError>> + Send {
        ready(Ok(self.working.plots_of(player)))
    }

    fn save_plot(&mut self, plot: &Plot) -> impl Future<Output = Result<(), StoreError>> + Send {
        let result = match self.plot_saves_left.checked_sub(1) {
            Some(left) => {
                self.plot_saves_left = left;
                self.working.put_plot(*plot);
                Ok(())
            }
            None => Err(StoreError::Unavailable("plots")),
        };
        ready(result)
    }

    fn inventory_quantity(
        &mut self,
        player: PlayerId,
        item: ItemId,
    ) -> impl Future<Output = Result<u32, StoreError>> + Send {
        ready(Ok(self.working.quantity(player, item)))
    }

    fn set_inventory_quantity(
        &mut self,
        player: PlayerId,
        item: ItemId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.working.set_quantity(player, item, quantity);
        ready(Ok(()))
    }

    fn inventory_of(
        &mut self,
        player: PlayerId,
    ) -> impl Future<Output = Result<Vec<InventoryEntry>, StoreError>> + Send {
        let entries = self
            .working
            .inventory
            .iter()
            .filter(|((owner, _), _)| *owner == player)
            .map(|(&(owner, item), &quantity)| InventoryEntry {
                player: owner,
                item,
                quantity,
            })
            .collect();
        ready(Ok(entries))
    }

    fn affection_level(
        &mut self,
        player: PlayerId,
        villager: VillagerId,
    ) -> impl Future<Output = Result<Option<u32>, StoreError>> + Send {
        ready(Ok(self.working.affection(player, villager)))
    }

    fn set_affection_level(
        &mut self,
        player: PlayerId,
        villager: VillagerId,
        level: u32,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.working.affection.insert((player, villager), level);
        ready(Ok(()))
    }

    fn lock_order(
        &mut self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<VillagerOrder>, StoreError>> + Send {
        ready(Ok(self.working.orders.get(&id).cloned()))
    }

    fn save_order(
        &mut self,
        order: &VillagerOrder,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.working.put_order(order.clone());
        ready(Ok(()))
    }

    fn open_orders(
        &mut self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<VillagerOrder>, StoreError>> + Send {
        let mut open: Vec<VillagerOrder> = self
            .working
            .orders
            .values()
            .filter(|order| order.is_open(now))
            .cloned()
            .collect();
        open.sort_by_key(|order| (order.posted_at, order.id));
        ready(Ok(open))
    }

    fn append_transaction(
        &mut self,
        record: &GoldTransaction,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let result = if self.fail_appends {
            Err(StoreError::Unavailable("transaction log"))
        } else {
            self.staged.push(record.clone());
            Ok(())
        };
        ready(result)
    }

    fn transactions_of(
        &mut self,
        player: PlayerId,
    ) -> impl Future<Output = Result<Vec<GoldTransaction>, StoreError>> + Send {
        let mut records = self.guard.transactions_of(player);
        records.extend(
            self.staged
                .iter()
                .filter(|record| record.player == player)
                .cloned(),
        );
        ready(Ok(records))
    }

    fn plant_def(
        &mut self,
        id: PlantId,
    ) -> impl Future<Output = Result<Option<PlantDef>, StoreError>> + Send {
        ready(Ok(self.working.plants.get(&id).cloned()))
    }

    fn item(
        &mut self,
        id: ItemId,
    ) -> impl Future<Output = Result<Option<ItemDef>, StoreError>> + Send {
        ready(Ok(self.working.items.get(&id).cloned()))
    }

    fn item_by_name(
        &mut self,
        name: &str,
    ) -> impl Future<Output = Result<Option<ItemDef>, StoreError>> + Send {
        let found = self
            .working
            .items
            .values()
            .find(|item| item.name == name)
            .cloned();
        ready(Ok(found))
    }

    fn shop_item(
        &mut self,
        item: ItemId,
    ) -> impl Future<Output = Result<Option<ShopItem>, StoreError>> + Send {
        ready(Ok(self.working.shop.get(&item).copied()))
    }

    fn commit(self) -> impl Future<Output = Result<(), StoreError>> + Send {
        let Self {
            mut guard,
            working,
            staged,
            ..
        } = self;
        let mut log = std::mem::take(&mut guard.transactions);
        log.extend(staged);
        *guard = working;
        guard.transactions = log;
        drop(guard);
        ready(Ok(()))
    }
}
