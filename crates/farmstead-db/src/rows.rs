//! Row types and conversions between `PostgreSQL` columns and typed
//! records.
//!
//! Enum columns are read with a `::TEXT` cast and written as strings cast
//! back to the enum type. Unsigned domain values are stored in signed
//! columns guarded by `CHECK (... >= 0)`; every conversion is checked and a
//! row that does not map back is reported as
//! [`StoreError::Corrupt`].

use chrono::{DateTime, Utc};
use farmstead_core::StoreError;
use farmstead_types::{
    GoldTransaction, ItemDef, ItemKind, OrderStatus, PlantDef, Player, Plot, PlotState,
    PlotStatus, ShopItem, SourceReference, TransactionKind, VillagerOrder,
};
use sqlx::types::Json;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enum mappings
// ---------------------------------------------------------------------------

/// Convert an [`ItemKind`] to its `PostgreSQL` enum string.
pub const fn item_kind_to_db(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Seed => "seed",
        ItemKind::Crop => "crop",
        ItemKind::Material => "material",
    }
}

fn item_kind_from_db(value: &str) -> Option<ItemKind> {
    match value {
        "seed" => Some(ItemKind::Seed),
        "crop" => Some(ItemKind::Crop),
        "material" => Some(ItemKind::Material),
        _ => None,
    }
}

/// Convert a [`PlotStatus`] to its `PostgreSQL` enum string.
pub const fn plot_status_to_db(status: PlotStatus) -> &'static str {
    match status {
        PlotStatus::Empty => "empty",
        PlotStatus::Growing => "growing",
        PlotStatus::Ready => "ready",
    }
}

/// Convert an [`OrderStatus`] to its `PostgreSQL` enum string.
pub const fn order_status_to_db(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Available => "available",
        OrderStatus::Completed => "completed",
    }
}

fn order_status_from_db(value: &str) -> Option<OrderStatus> {
    match value {
        "available" => Some(OrderStatus::Available),
        "completed" => Some(OrderStatus::Completed),
        _ => None,
    }
}

/// Convert a [`TransactionKind`] to its `PostgreSQL` enum string.
pub const fn transaction_kind_to_db(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "income",
        TransactionKind::Expense => "expense",
    }
}

fn transaction_kind_from_db(value: &str) -> Option<TransactionKind> {
    match value {
        "income" => Some(TransactionKind::Income),
        "expense" => Some(TransactionKind::Expense),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Numeric conversions
// ---------------------------------------------------------------------------

fn corrupt(entity: &'static str, id: Uuid, reason: impl Into<String>) -> StoreError {
    StoreError::Corrupt {
        entity,
        id: id.to_string(),
        reason: reason.into(),
    }
}

/// Narrow a stored `INTEGER` to `u32`.
fn read_u32(entity: &'static str, id: Uuid, field: &str, value: i32) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_err| corrupt(entity, id, format!("negative {field}: {value}")))
}

/// Narrow a stored `BIGINT` to `u64`.
fn read_u64(entity: &'static str, id: Uuid, field: &str, value: i64) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_err| corrupt(entity, id, format!("negative {field}: {value}")))
}

/// Widen a `u32` for an `INTEGER` column.
pub fn write_i32(entity: &'static str, id: Uuid, value: u32) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|_err| corrupt(entity, id, format!("{value} exceeds INTEGER")))
}

/// Widen a `u64` for a `BIGINT` column.
pub fn write_i64(entity: &'static str, id: Uuid, value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_err| corrupt(entity, id, format!("{value} exceeds BIGINT")))
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// A row from the `players` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlayerRow {
    /// Player UUID.
    pub id: Uuid,
    /// Gold balance.
    pub current_gold: i64,
    /// Provisioning time.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PlayerRow> for Player {
    type Error = StoreError;

    fn try_from(row: PlayerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            current_gold: read_u64("player", row.id, "current_gold", row.current_gold)?,
            created_at: row.created_at,
        })
    }
}

/// A row from the `plots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlotRow {
    /// Plot UUID.
    pub id: Uuid,
    /// Owning player.
    pub player_id: Uuid,
    /// Status as a string (cast from `PostgreSQL` enum).
    pub status: String,
    /// Planted crop, null when empty.
    pub plant_id: Option<Uuid>,
    /// Remaining growth ticks.
    pub growth_time_left: i32,
    /// Waterings since planting.
    pub times_watered: i32,
}

impl TryFrom<PlotRow> for Plot {
    type Error = StoreError;

    fn try_from(row: PlotRow) -> Result<Self, Self::Error> {
        let times_watered = read_u32("plot", row.id, "times_watered", row.times_watered)?;
        let state = match (row.status.as_str(), row.plant_id) {
            ("empty", None) => PlotState::Empty,
            ("growing", Some(plant)) => PlotState::Growing {
                plant: plant.into(),
                growth_time_left: read_u32(
                    "plot",
                    row.id,
                    "growth_time_left",
                    row.growth_time_left,
                )?,
                times_watered,
            },
            ("ready", Some(plant)) => PlotState::Ready {
                plant: plant.into(),
                times_watered,
            },
            (status, plant) => {
                return Err(corrupt(
                    "plot",
                    row.id,
                    format!("status {status:?} with plant {plant:?}"),
                ));
            }
        };
        Ok(Self {
            id: row.id.into(),
            player: row.player_id.into(),
            state,
        })
    }
}

/// Column values for writing a [`Plot`].
#[derive(Debug, Clone, Copy)]
pub struct PlotColumns {
    /// Status enum string.
    pub status: &'static str,
    /// Planted crop.
    pub plant_id: Option<Uuid>,
    /// Remaining growth ticks.
    pub growth_time_left: i32,
    /// Waterings since planting.
    pub times_watered: i32,
}

impl PlotColumns {
    /// Flatten a plot's state into its columns.
    pub fn from_plot(plot: &Plot) -> Result<Self, StoreError> {
        let id = plot.id.into_inner();
        Ok(Self {
            status: plot_status_to_db(plot.state.status()),
            plant_id: plot.state.plant().map(Into::into),
            growth_time_left: write_i32("plot", id, plot.state.growth_time_left().unwrap_or(0))?,
            times_watered: write_i32("plot", id, plot.state.times_watered())?,
        })
    }
}

/// A row from the `items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemRow {
    /// Item UUID.
    pub id: Uuid,
    /// Unique name.
    pub name: String,
    /// Kind as a string (cast from `PostgreSQL` enum).
    pub kind: String,
    /// Flavour text.
    pub description: Option<String>,
}

impl TryFrom<ItemRow> for ItemDef {
    type Error = StoreError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let kind = item_kind_from_db(&row.kind)
            .ok_or_else(|| corrupt("item", row.id, format!("unknown kind {:?}", row.kind)))?;
        Ok(Self {
            id: row.id.into(),
            name: row.name,
            kind,
            description: row.description,
        })
    }
}

/// A row from the `plants` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlantRow {
    /// Plant UUID.
    pub id: Uuid,
    /// Unique name.
    pub name: String,
    /// Growth ticks to maturity.
    pub base_growth_time: i32,
    /// Ticks removed per watering.
    pub water_effect_per_time: i32,
    /// Watering cap.
    pub max_water_times: i32,
    /// Crop units per harvest.
    pub harvest_yield: i32,
    /// Gold per unit.
    pub sell_price: i64,
    /// Seed item.
    pub seed_item_id: Uuid,
    /// Crop item.
    pub crop_item_id: Uuid,
}

impl TryFrom<PlantRow> for PlantDef {
    type Error = StoreError;

    fn try_from(row: PlantRow) -> Result<Self, Self::Error> {
        let id = row.id;
        Ok(Self {
            id: id.into(),
            base_growth_time: read_u32("plant", id, "base_growth_time", row.base_growth_time)?,
            water_effect_per_time: read_u32(
                "plant",
                id,
                "water_effect_per_time",
                row.water_effect_per_time,
            )?,
            max_water_times: read_u32("plant", id, "max_water_times", row.max_water_times)?,
            harvest_yield: read_u32("plant", id, "harvest_yield", row.harvest_yield)?,
            sell_price: read_u64("plant", id, "sell_price", row.sell_price)?,
            seed_item: row.seed_item_id.into(),
            crop_item: row.crop_item_id.into(),
            name: row.name,
        })
    }
}

/// A row from the `shop_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShopRow {
    /// Listed item.
    pub item_id: Uuid,
    /// Unit price.
    pub price: i64,
}

impl TryFrom<ShopRow> for ShopItem {
    type Error = StoreError;

    fn try_from(row: ShopRow) -> Result<Self, Self::Error> {
        Ok(Self {
            item: row.item_id.into(),
            price: read_u64("shop item", row.item_id, "price", row.price)?,
        })
    }
}

/// A row from the `villager_orders` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    /// Order UUID.
    pub id: Uuid,
    /// Posting villager.
    pub villager_id: Uuid,
    /// Wanted item.
    pub required_item_id: Uuid,
    /// Wanted units.
    pub required_quantity: i32,
    /// Gold reward.
    pub reward_gold: i64,
    /// Affection reward.
    pub reward_affection: i32,
    /// Status as a string (cast from `PostgreSQL` enum).
    pub status: String,
    /// Fulfilling player.
    pub fulfilled_by: Option<Uuid>,
    /// Posting time.
    pub posted_at: DateTime<Utc>,
    /// Deadline.
    pub expires_at: Option<DateTime<Utc>>,
    /// Fulfillment time.
    pub completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for VillagerOrder {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let status = order_status_from_db(&row.status)
            .ok_or_else(|| corrupt("order", id, format!("unknown status {:?}", row.status)))?;
        Ok(Self {
            id: id.into(),
            villager: row.villager_id.into(),
            required_item: row.required_item_id.into(),
            required_quantity: read_u32("order", id, "required_quantity", row.required_quantity)?,
            reward_gold: read_u64("order", id, "reward_gold", row.reward_gold)?,
            reward_affection: read_u32("order", id, "reward_affection", row.reward_affection)?,
            status,
            fulfilled_by: row.fulfilled_by.map(Into::into),
            posted_at: row.posted_at,
            expires_at: row.expires_at,
            completed_at: row.completed_at,
        })
    }
}

/// A row from the `gold_transactions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransactionRow {
    /// Record UUID.
    pub id: Uuid,
    /// Player whose gold moved.
    pub player_id: Uuid,
    /// Kind as a string (cast from `PostgreSQL` enum).
    pub kind: String,
    /// Gold moved.
    pub amount: i64,
    /// Cause, stored as JSONB.
    pub source: Json<SourceReference>,
    /// Record time.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for GoldTransaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let kind = transaction_kind_from_db(&row.kind).ok_or_else(|| {
            corrupt("gold transaction", id, format!("unknown kind {:?}", row.kind))
        })?;
        Ok(Self {
            id: id.into(),
            player: row.player_id.into(),
            kind,
            amount: read_u64("gold transaction", id, "amount", row.amount)?,
            source: row.source.0,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use farmstead_types::{PlantId, PlayerId};

    use super::*;

    fn plot_row(status: &str, plant: Option<Uuid>) -> PlotRow {
        PlotRow {
            id: Uuid::now_v7(),
            player_id: Uuid::now_v7(),
            status: status.to_owned(),
            plant_id: plant,
            growth_time_left: 12,
            times_watered: 2,
        }
    }

    #[test]
    fn enum_strings_round_trip() {
        for kind in [ItemKind::Seed, ItemKind::Crop, ItemKind::Material] {
            assert_eq!(item_kind_from_db(item_kind_to_db(kind)), Some(kind));
        }
        for status in [OrderStatus::Available, OrderStatus::Completed] {
            assert_eq!(order_status_from_db(order_status_to_db(status)), Some(status));
        }
        for kind in [TransactionKind::Income, TransactionKind::Expense] {
            assert_eq!(
                transaction_kind_from_db(transaction_kind_to_db(kind)),
                Some(kind)
            );
        }
        assert_eq!(item_kind_from_db("tool"), None);
    }

    #[test]
    fn growing_row_maps_to_growing_state() {
        let plant = Uuid::now_v7();
        let plot = Plot::try_from(plot_row("growing", Some(plant))).unwrap();
        assert_eq!(
            plot.state,
            PlotState::Growing {
                plant: PlantId(plant),
                growth_time_left: 12,
                times_watered: 2,
            }
        );
    }

    #[test]
    fn inconsistent_plot_row_is_corrupt() {
        let err = Plot::try_from(plot_row("ready", None)).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { entity: "plot", .. }));
        let err = Plot::try_from(plot_row("empty", Some(Uuid::now_v7()))).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn plot_columns_flatten_state() {
        let plot = Plot {
            state: PlotState::Ready {
                plant: PlantId::new(),
                times_watered: 3,
            },
            ..Plot::empty(PlayerId::new())
        };
        let columns = PlotColumns::from_plot(&plot).unwrap();
        assert_eq!(columns.status, "ready");
        assert!(columns.plant_id.is_some());
        assert_eq!(columns.growth_time_left, 0);
        assert_eq!(columns.times_watered, 3);
    }

    #[test]
    fn negative_gold_is_corrupt() {
        let row = PlayerRow {
            id: Uuid::now_v7(),
            current_gold: -1,
            created_at: Utc::now(),
        };
        assert!(Player::try_from(row).is_err());
    }

    #[test]
    fn oversized_values_rejected_on_write() {
        let id = Uuid::now_v7();
        assert!(write_i32("plot", id, u32::MAX).is_err());
        assert_eq!(write_i64("player", id, 100).unwrap(), 100);
        assert!(write_i64("player", id, u64::MAX).is_err());
    }
}
