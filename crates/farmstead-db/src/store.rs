//! [`FarmStore`] over `PostgreSQL`.
//!
//! Each engine operation runs in one `sqlx` transaction. Rows returned by
//! the `lock_*` methods are read with `SELECT ... FOR UPDATE`, so two
//! operations on the same player (or the same order) serialize at the
//! database. Dropping a [`PgFarmTx`] without committing rolls it back.
//! Transactions from [`FarmStore::begin_read`] run `REPEATABLE READ, READ
//! ONLY` and take no locks, so they see one snapshot and never wait.
//!
//! Inventory and affection upserts are done as update-then-insert. The
//! engine always holds the owning player's row lock first, so no other
//! transaction can create the same cell in between.

use chrono::{DateTime, Utc};
use farmstead_core::{FarmStore, FarmTx, StoreError};
use farmstead_types::{
    GoldTransaction, InventoryEntry, ItemDef, ItemId, OrderId, PlantDef, PlantId, Player,
    PlayerId, Plot, PlotId, ShopItem, VillagerId, VillagerOrder,
};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::postgres::PostgresPool;
use crate::rows::{
    ItemRow, OrderRow, PlantRow, PlayerRow, PlotColumns, PlotRow, ShopRow, TransactionRow,
    order_status_to_db, transaction_kind_to_db, write_i32, write_i64,
};

const PLOT_COLUMNS: &str =
    "id, player_id, status::TEXT AS status, plant_id, growth_time_left, times_watered";

const ORDER_COLUMNS: &str = "id, villager_id, required_item_id, required_quantity, reward_gold, \
     reward_affection, status::TEXT AS status, fulfilled_by, posted_at, expires_at, completed_at";

const ITEM_COLUMNS: &str = "id, name, kind::TEXT AS kind, description";

/// A [`FarmStore`] backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgFarmStore {
    pool: PgPool,
}

impl PgFarmStore {
    /// Create a store sharing `pool`'s connections.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool().clone(),
        }
    }
}

impl FarmStore for PgFarmStore {
    type Tx = PgFarmTx;

    async fn begin(&self) -> Result<PgFarmTx, StoreError> {
        let tx = self.pool.begin().await.map_err(StoreError::backend)?;
        Ok(PgFarmTx { tx })
    }

    async fn begin_read(&self) -> Result<PgFarmTx, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(StoreError::backend)?;
        Ok(PgFarmTx { tx })
    }
}

/// An open `PostgreSQL` transaction.
pub struct PgFarmTx {
    tx: Transaction<'static, Postgres>,
}

impl PgFarmTx {
    async fn fetch_plot_rows(
        &mut self,
        sql: &str,
        key: uuid::Uuid,
    ) -> Result<Vec<Plot>, StoreError> {
        let rows = sqlx::query_as::<_, PlotRow>(sql)
            .bind(key)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(StoreError::backend)?;
        rows.into_iter().map(Plot::try_from).collect()
    }
}

impl FarmTx for PgFarmTx {
    async fn lock_player(&mut self, id: PlayerId) -> Result<Option<Player>, StoreError> {
        let row = sqlx::query_as::<_, PlayerRow>(
            "SELECT id, current_gold, created_at FROM players WHERE id = $1 FOR UPDATE",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(StoreError::backend)?;
        row.map(Player::try_from).transpose()
    }

    async fn player(&mut self, id: PlayerId) -> Result<Option<Player>, StoreError> {
        let row = sqlx::query_as::<_, PlayerRow>(
            "SELECT id, current_gold, created_at FROM players WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(StoreError::backend)?;
        row.map(Player::try_from).transpose()
    }

    async fn insert_player(&mut self, player: &Player) -> Result<(), StoreError> {
        let id = player.id.into_inner();
        sqlx::query("INSERT INTO players (id, current_gold, created_at) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(write_i64("player", id, player.current_gold)?)
            .bind(player.created_at)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn update_gold(&mut self, player: PlayerId, gold: u64) -> Result<(), StoreError> {
        let id = player.into_inner();
        let result = sqlx::query("UPDATE players SET current_gold = $2 WHERE id = $1")
            .bind(id)
            .bind(write_i64("player", id, gold)?)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Corrupt {
                entity: "player",
                id: id.to_string(),
                reason: "gold update for missing row".to_owned(),
            });
        }
        Ok(())
    }

    async fn lock_plot(&mut self, id: PlotId) -> Result<Option<Plot>, StoreError> {
        let sql = format!("SELECT {PLOT_COLUMNS} FROM plots WHERE id = $1 FOR UPDATE");
        let mut plots = self.fetch_plot_rows(&sql, id.into_inner()).await?;
        Ok(plots.pop())
    }

    async fn lock_plots_of(&mut self, player: PlayerId) -> Result<Vec<Plot>, StoreError> {
        let sql =
            format!("SELECT {PLOT_COLUMNS} FROM plots WHERE player_id = $1 ORDER BY id FOR UPDATE");
        self.fetch_plot_rows(&sql, player.into_inner()).await
    }

    async fn plots_of(&mut self, player: PlayerId) -> Result<Vec<Plot>, StoreError> {
        let sql = format!("SELECT {PLOT_COLUMNS} FROM plots WHERE player_id = $1 ORDER BY id");
        self.fetch_plot_rows(&sql, player.into_inner()).await
    }

    async fn save_plot(&mut self, plot: &Plot) -> Result<(), StoreError> {
        let columns = PlotColumns::from_plot(plot)?;
        let updated = sqlx::query(
            "UPDATE plots SET status = $2::plot_status, plant_id = $3, growth_time_left = $4, \
             times_watered = $5 WHERE id = $1",
        )
        .bind(plot.id.into_inner())
        .bind(columns.status)
        .bind(columns.plant_id)
        .bind(columns.growth_time_left)
        .bind(columns.times_watered)
        .execute(&mut *self.tx)
        .await
        .map_err(StoreError::backend)?;
        if updated.rows_affected() > 0 {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO plots (id, player_id, status, plant_id, growth_time_left, times_watered) \
             VALUES ($1, $2, $3::plot_status, $4, $5, $6)",
        )
        .bind(plot.id.into_inner())
        .bind(plot.player.into_inner())
        .bind(columns.status)
        .bind(columns.plant_id)
        .bind(columns.growth_time_left)
        .bind(columns.times_watered)
        .execute(&mut *self.tx)
        .await
        .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn inventory_quantity(
        &mut self,
        player: PlayerId,
        item: ItemId,
    ) -> Result<u32, StoreError> {
        let quantity: Option<i32> = sqlx::query_scalar(
            "SELECT quantity FROM inventory WHERE player_id = $1 AND item_id = $2",
        )
        .bind(player.into_inner())
        .bind(item.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(StoreError::backend)?;
        let quantity = quantity.unwrap_or(0);
        u32::try_from(quantity).map_err(|_err| StoreError::Corrupt {
            entity: "inventory",
            id: format!("{player}/{item}"),
            reason: format!("negative quantity {quantity}"),
        })
    }

    async fn set_inventory_quantity(
        &mut self,
        player: PlayerId,
        item: ItemId,
        quantity: u32,
    ) -> Result<(), StoreError> {
        if quantity == 0 {
            sqlx::query("DELETE FROM inventory WHERE player_id = $1 AND item_id = $2")
                .bind(player.into_inner())
                .bind(item.into_inner())
                .execute(&mut *self.tx)
                .await
                .map_err(StoreError::backend)?;
            return Ok(());
        }
        let value = write_i32("inventory", item.into_inner(), quantity)?;
        let updated = sqlx::query(
            "UPDATE inventory SET quantity = $3 WHERE player_id = $1 AND item_id = $2",
        )
        .bind(player.into_inner())
        .bind(item.into_inner())
        .bind(value)
        .execute(&mut *self.tx)
        .await
        .map_err(StoreError::backend)?;
        if updated.rows_affected() == 0 {
            sqlx::query("INSERT INTO inventory (player_id, item_id, quantity) VALUES ($1, $2, $3)")
                .bind(player.into_inner())
                .bind(item.into_inner())
                .bind(value)
                .execute(&mut *self.tx)
                .await
                .map_err(StoreError::backend)?;
        }
        Ok(())
    }

    async fn inventory_of(&mut self, player: PlayerId) -> Result<Vec<InventoryEntry>, StoreError> {
        let rows: Vec<(uuid::Uuid, i32)> = sqlx::query_as(
            "SELECT item_id, quantity FROM inventory WHERE player_id = $1 ORDER BY item_id",
        )
        .bind(player.into_inner())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(StoreError::backend)?;
        rows.into_iter()
            .map(|(item, quantity)| {
                let quantity = u32::try_from(quantity).map_err(|_err| StoreError::Corrupt {
                    entity: "inventory",
                    id: format!("{player}/{item}"),
                    reason: format!("negative quantity {quantity}"),
                })?;
                Ok(InventoryEntry {
                    player,
                    item: item.into(),
                    quantity,
                })
            })
            .collect()
    }

    async fn affection_level(
        &mut self,
        player: PlayerId,
        villager: VillagerId,
    ) -> Result<Option<u32>, StoreError> {
        let level: Option<i32> = sqlx::query_scalar(
            "SELECT level FROM affection WHERE player_id = $1 AND villager_id = $2",
        )
        .bind(player.into_inner())
        .bind(villager.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(StoreError::backend)?;
        level
            .map(|level| {
                u32::try_from(level).map_err(|_err| StoreError::Corrupt {
                    entity: "affection",
                    id: format!("{player}/{villager}"),
                    reason: format!("negative level {level}"),
                })
            })
            .transpose()
    }

    async fn set_affection_level(
        &mut self,
        player: PlayerId,
        villager: VillagerId,
        level: u32,
    ) -> Result<(), StoreError> {
        let value = write_i32("affection", villager.into_inner(), level)?;
        let updated = sqlx::query(
            "UPDATE affection SET level = $3 WHERE player_id = $1 AND villager_id = $2",
        )
        .bind(player.into_inner())
        .bind(villager.into_inner())
        .bind(value)
        .execute(&mut *self.tx)
        .await
        .map_err(StoreError::backend)?;
        if updated.rows_affected() == 0 {
            sqlx::query(
                "INSERT INTO affection (player_id, villager_id, level) VALUES ($1, $2, $3)",
            )
            .bind(player.into_inner())
            .bind(villager.into_inner())
            .bind(value)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::backend)?;
        }
        Ok(())
    }

    async fn lock_order(&mut self, id: OrderId) -> Result<Option<VillagerOrder>, StoreError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM villager_orders WHERE id = $1 FOR UPDATE");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::backend)?;
        row.map(VillagerOrder::try_from).transpose()
    }

    async fn save_order(&mut self, order: &VillagerOrder) -> Result<(), StoreError> {
        let id = order.id.into_inner();
        let updated = sqlx::query(
            "UPDATE villager_orders SET status = $2::order_status, fulfilled_by = $3, \
             expires_at = $4, completed_at = $5 WHERE id = $1",
        )
        .bind(id)
        .bind(order_status_to_db(order.status))
        .bind(order.fulfilled_by.map(PlayerId::into_inner))
        .bind(order.expires_at)
        .bind(order.completed_at)
        .execute(&mut *self.tx)
        .await
        .map_err(StoreError::backend)?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::Corrupt {
                entity: "order",
                id: id.to_string(),
                reason: "update of missing row".to_owned(),
            });
        }
        Ok(())
    }

    async fn open_orders(&mut self, now: DateTime<Utc>) -> Result<Vec<VillagerOrder>, StoreError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM villager_orders \
             WHERE status = 'available' AND (expires_at IS NULL OR expires_at > $1) \
             ORDER BY posted_at, id"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(now)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(StoreError::backend)?;
        rows.into_iter().map(VillagerOrder::try_from).collect()
    }

    async fn append_transaction(&mut self, record: &GoldTransaction) -> Result<(), StoreError> {
        let id = record.id.into_inner();
        sqlx::query(
            "INSERT INTO gold_transactions (id, player_id, kind, amount, source, created_at) \
             VALUES ($1, $2, $3::transaction_kind, $4, $5, $6)",
        )
        .bind(id)
        .bind(record.player.into_inner())
        .bind(transaction_kind_to_db(record.kind))
        .bind(write_i64("gold transaction", id, record.amount)?)
        .bind(Json(record.source))
        .bind(record.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn transactions_of(
        &mut self,
        player: PlayerId,
    ) -> Result<Vec<GoldTransaction>, StoreError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT id, player_id, kind::TEXT AS kind, amount, source, created_at \
             FROM gold_transactions WHERE player_id = $1 ORDER BY seq",
        )
        .bind(player.into_inner())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(StoreError::backend)?;
        rows.into_iter().map(GoldTransaction::try_from).collect()
    }

    async fn plant_def(&mut self, id: PlantId) -> Result<Option<PlantDef>, StoreError> {
        let row = sqlx::query_as::<_, PlantRow>(
            "SELECT id, name, base_growth_time, water_effect_per_time, max_water_times, \
             harvest_yield, sell_price, seed_item_id, crop_item_id FROM plants WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(StoreError::backend)?;
        row.map(PlantDef::try_from).transpose()
    }

    async fn item(&mut self, id: ItemId) -> Result<Option<ItemDef>, StoreError> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1");
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::backend)?;
        row.map(ItemDef::try_from).transpose()
    }

    async fn item_by_name(&mut self, name: &str) -> Result<Option<ItemDef>, StoreError> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE name = $1");
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::backend)?;
        row.map(ItemDef::try_from).transpose()
    }

    async fn shop_item(&mut self, item: ItemId) -> Result<Option<ShopItem>, StoreError> {
        let row = sqlx::query_as::<_, ShopRow>(
            "SELECT item_id, price FROM shop_items WHERE item_id = $1",
        )
        .bind(item.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(StoreError::backend)?;
        row.map(ShopItem::try_from).transpose()
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(StoreError::backend)
    }
}
