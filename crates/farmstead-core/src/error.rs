//! Error types for the Farmstead engine.
//!
//! Every engine operation returns [`EngineError`]. Rule violations carry
//! structured detail ([`Missing`], [`InvalidState`], [`ResourceKind`]) and
//! never formatted user text; the presentation layer turns
//! [`EngineError::kind`] into a message.

use farmstead_ledger::LedgerError;
use farmstead_types::{ItemId, OrderId, PlantId, PlayerId, PlotId, PlotStatus};

use crate::store::StoreError;

/// The coarse failure category exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced record does not exist or is not owned by the caller.
    NotFound,
    /// The operation is not legal in the current state.
    InvalidState,
    /// Gold, seed, material, or crop quantity is too low.
    InsufficientResource,
    /// Storage or arithmetic failure; nothing was applied and the caller
    /// may retry.
    Infrastructure,
}

/// A record the operation referenced but could not find.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Missing {
    /// No such player.
    #[error("player {0}")]
    Player(PlayerId),
    /// No such plot, or it belongs to another player.
    #[error("plot {0}")]
    Plot(PlotId),
    /// No such plant definition.
    #[error("plant {0}")]
    Plant(PlantId),
    /// No such item definition.
    #[error("item {0}")]
    Item(ItemId),
    /// No item with this configured name (e.g. the water material).
    #[error("item named {0:?}")]
    ItemNamed(String),
    /// No such villager order.
    #[error("order {0}")]
    Order(OrderId),
    /// The item is not sold in the shop.
    #[error("shop listing for item {0}")]
    ShopListing(ItemId),
}

/// Why an operation is not legal right now.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidState {
    /// Planting needs an empty plot.
    #[error("plot {plot} is {status:?}, expected Empty")]
    PlotNotEmpty {
        /// The plot.
        plot: PlotId,
        /// Its actual status.
        status: PlotStatus,
    },
    /// Watering needs a growing crop.
    #[error("plot {plot} is {status:?}, expected Growing")]
    PlotNotGrowing {
        /// The plot.
        plot: PlotId,
        /// Its actual status.
        status: PlotStatus,
    },
    /// Harvesting needs a ready crop.
    #[error("plot {plot} is {status:?}, expected Ready")]
    PlotNotReady {
        /// The plot.
        plot: PlotId,
        /// Its actual status.
        status: PlotStatus,
    },
    /// The crop has already been watered the maximum number of times.
    #[error("plot {plot} already watered {max_water_times} times")]
    WaterLimitReached {
        /// The plot.
        plot: PlotId,
        /// The plant's cap.
        max_water_times: u32,
    },
    /// The order was already fulfilled.
    #[error("order {0} is no longer available")]
    OrderNotAvailable(OrderId),
    /// The order's deadline has passed.
    #[error("order {0} has expired")]
    OrderExpired(OrderId),
    /// A purchase must be for at least one unit.
    #[error("quantity must be at least one")]
    ZeroQuantity,
}

/// The resource a player ran short of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Gold.
    Gold,
    /// Units of an item.
    Item(ItemId),
}

/// Errors returned by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A referenced record does not exist or is not owned by the caller.
    #[error("not found: {0}")]
    NotFound(Missing),

    /// The operation is not legal in the current state.
    #[error("invalid state: {0}")]
    InvalidState(InvalidState),

    /// The player holds too little of something.
    #[error("insufficient {resource:?}: wanted {requested}, have {available}")]
    InsufficientResource {
        /// What ran short.
        resource: ResourceKind,
        /// How much the operation needed.
        requested: u64,
        /// How much the player holds.
        available: u64,
    },

    /// Checked arithmetic overflowed.
    #[error("ledger error: {0}")]
    Ledger(LedgerError),

    /// The storage backend failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// The failure category for the presentation layer.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::InsufficientResource { .. } => ErrorKind::InsufficientResource,
            Self::Ledger(_) | Self::Store(_) => ErrorKind::Infrastructure,
        }
    }

    /// Translate a ledger error raised while mutating `resource`.
    ///
    /// Shortfalls become [`EngineError::InsufficientResource`]; anything
    /// else is kept as [`EngineError::Ledger`].
    pub fn from_ledger(err: LedgerError, resource: ResourceKind) -> Self {
        match err {
            LedgerError::InsufficientGold {
                requested,
                available,
            } => Self::InsufficientResource {
                resource,
                requested,
                available,
            },
            LedgerError::InsufficientQuantity {
                requested,
                available,
            } => Self::InsufficientResource {
                resource,
                requested,
                available: u64::from(available),
            },
            other => Self::Ledger(other),
        }
    }
}

impl From<Missing> for EngineError {
    fn from(missing: Missing) -> Self {
        Self::NotFound(missing)
    }
}

impl From<InvalidState> for EngineError {
    fn from(state: InvalidState) -> Self {
        Self::InvalidState(state)
    }
}
