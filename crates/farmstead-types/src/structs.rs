//! Core entity structs for the Farmstead simulation.
//!
//! Catalog records ([`PlantDef`], [`ItemDef`], [`Villager`], [`ShopItem`])
//! are shared and read-only during play. Player-owned records ([`Player`],
//! [`Plot`], [`InventoryEntry`], [`Affection`]) are mutated only inside an
//! engine transaction. [`VillagerOrder`] rows are global and contested, and
//! [`GoldTransaction`] is append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ItemKind, OrderStatus, PlotStatus, TransactionKind};
use crate::ids::{ItemId, OrderId, PlantId, PlayerId, PlotId, TransactionId, VillagerId};

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A plantable crop definition.
///
/// The seed it consumes and the crop it produces are explicit foreign keys
/// into the item catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlantDef {
    /// Unique plant identifier.
    pub id: PlantId,
    /// Display name, unique within the catalog.
    pub name: String,
    /// Growth ticks from planting to maturity. Always greater than zero.
    pub base_growth_time: u32,
    /// Growth ticks removed by a single watering.
    pub water_effect_per_time: u32,
    /// Maximum number of waterings per planting.
    pub max_water_times: u32,
    /// Units of the crop item produced by one harvest.
    pub harvest_yield: u32,
    /// Gold paid per unit when the harvest is sold directly.
    pub sell_price: u64,
    /// The seed item consumed when planting.
    pub seed_item: ItemId,
    /// The crop item produced when harvesting into inventory.
    pub crop_item: ItemId,
}

/// An item definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ItemDef {
    /// Unique item identifier.
    pub id: ItemId,
    /// Display name, unique within the catalog.
    pub name: String,
    /// Item category.
    pub kind: ItemKind,
    /// Optional flavour text.
    pub description: Option<String>,
}

/// A villager who posts orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Villager {
    /// Unique villager identifier.
    pub id: VillagerId,
    /// Display name.
    pub name: String,
    /// Free-form gender label.
    pub gender: String,
    /// Optional flavour text.
    pub description: Option<String>,
}

/// A fixed-price listing in the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ShopItem {
    /// The item sold.
    pub item: ItemId,
    /// Gold charged per unit.
    pub price: u64,
}

// ---------------------------------------------------------------------------
// Players and plots
// ---------------------------------------------------------------------------

/// A player's gold balance. Plots, inventory and affection are keyed by
/// the player's ID in their own records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Unique player identifier.
    pub id: PlayerId,
    /// Current gold balance. Never negative.
    pub current_gold: u64,
    /// When the player was provisioned.
    pub created_at: DateTime<Utc>,
}

/// The full state of a plot, carrying exactly the fields valid for each
/// stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum PlotState {
    /// Nothing planted.
    Empty,
    /// A crop is growing.
    Growing {
        /// The planted crop.
        plant: PlantId,
        /// Ticks remaining until maturity.
        growth_time_left: u32,
        /// Waterings applied since planting.
        times_watered: u32,
    },
    /// The crop is mature.
    Ready {
        /// The planted crop.
        plant: PlantId,
        /// Waterings applied since planting.
        times_watered: u32,
    },
}

impl PlotState {
    /// The coarse lifecycle stage.
    pub const fn status(&self) -> PlotStatus {
        match self {
            Self::Empty => PlotStatus::Empty,
            Self::Growing { .. } => PlotStatus::Growing,
            Self::Ready { .. } => PlotStatus::Ready,
        }
    }

    /// The planted crop, if any.
    pub const fn plant(&self) -> Option<PlantId> {
        match self {
            Self::Empty => None,
            Self::Growing { plant, .. } | Self::Ready { plant, .. } => Some(*plant),
        }
    }

    /// Waterings applied since planting (zero when empty).
    pub const fn times_watered(&self) -> u32 {
        match self {
            Self::Empty => 0,
            Self::Growing { times_watered, .. } | Self::Ready { times_watered, .. } => {
                *times_watered
            }
        }
    }

    /// Ticks remaining until maturity. Only meaningful while growing.
    pub const fn growth_time_left(&self) -> Option<u32> {
        match self {
            Self::Growing {
                growth_time_left, ..
            } => Some(*growth_time_left),
            Self::Empty | Self::Ready { .. } => None,
        }
    }
}

/// A unit of farmland owned by one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Plot {
    /// Unique plot identifier.
    pub id: PlotId,
    /// The owning player.
    pub player: PlayerId,
    /// Current lifecycle state.
    pub state: PlotState,
}

impl Plot {
    /// Create an empty plot for a player.
    pub fn empty(player: PlayerId) -> Self {
        Self {
            id: PlotId::new(),
            player,
            state: PlotState::Empty,
        }
    }
}

/// One inventory cell: how many units of an item a player holds.
///
/// Absent cells read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InventoryEntry {
    /// The holding player.
    pub player: PlayerId,
    /// The held item.
    pub item: ItemId,
    /// Units held.
    pub quantity: u32,
}

/// A player's relationship score with a villager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Affection {
    /// The player.
    pub player: PlayerId,
    /// The villager.
    pub villager: VillagerId,
    /// Current level. Only ever increases.
    pub level: u32,
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// A villager's standing request for a quantity of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VillagerOrder {
    /// Unique order identifier.
    pub id: OrderId,
    /// The villager who posted the order.
    pub villager: VillagerId,
    /// The item the villager wants.
    pub required_item: ItemId,
    /// Units wanted. Always greater than zero.
    pub required_quantity: u32,
    /// Gold paid on fulfillment.
    pub reward_gold: u64,
    /// Affection granted on fulfillment.
    pub reward_affection: u32,
    /// Current status.
    pub status: OrderStatus,
    /// The player who fulfilled the order, set iff completed.
    pub fulfilled_by: Option<PlayerId>,
    /// When the order was posted.
    pub posted_at: DateTime<Utc>,
    /// After this instant the order can no longer be fulfilled.
    pub expires_at: Option<DateTime<Utc>>,
    /// When the order was fulfilled, set iff completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl VillagerOrder {
    /// Whether the order's expiry has passed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| now >= expiry)
    }

    /// Whether a player could fulfill this order at `now`.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.status == OrderStatus::Available && !self.is_expired(now)
    }
}

// ---------------------------------------------------------------------------
// Gold transactions
// ---------------------------------------------------------------------------

/// What caused a gold movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SourceReference {
    /// Starting gold granted when the player was provisioned.
    Registration,
    /// A plot's crop sold at harvest.
    Harvest {
        /// The harvested plot.
        plot: PlotId,
    },
    /// A villager order reward.
    Order {
        /// The fulfilled order.
        order: OrderId,
    },
    /// Items bought from the shop.
    ShopPurchase {
        /// The purchased item.
        item: ItemId,
        /// Units purchased.
        quantity: u32,
    },
}

/// An append-only record of one gold movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GoldTransaction {
    /// Unique record identifier.
    pub id: TransactionId,
    /// The player whose balance moved.
    pub player: PlayerId,
    /// Income or expense.
    pub kind: TransactionKind,
    /// Gold moved. Always greater than zero.
    pub amount: u64,
    /// What caused the movement.
    pub source: SourceReference,
    /// When the movement was recorded.
    pub created_at: DateTime<Utc>,
}
