//! Enumeration types for the Farmstead simulation.
//!
//! Plot lifecycle, item categories, order status, and the direction of a
//! gold movement. Database string forms live in `farmstead-db`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Item categories
// ---------------------------------------------------------------------------

/// The category of an item in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ItemKind {
    /// Planted into an empty plot; consumed on planting.
    Seed,
    /// Produced by harvesting a ready plot.
    Crop,
    /// Anything else a player can hold (water, fertilizer, ...).
    Material,
}

// ---------------------------------------------------------------------------
// Plot lifecycle
// ---------------------------------------------------------------------------

/// The coarse lifecycle stage of a plot.
///
/// The full state, including the planted crop and its counters, is
/// [`PlotState`](crate::PlotState). This flat form is what callers display
/// and what the database stores in the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum PlotStatus {
    /// Nothing planted.
    Empty,
    /// A crop is counting down towards maturity.
    Growing,
    /// The crop is mature and can be harvested.
    Ready,
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Status of a villager order. The only transition is
/// `Available -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum OrderStatus {
    /// Open for any player to fulfill.
    Available,
    /// Fulfilled by exactly one player. Terminal.
    Completed,
}

// ---------------------------------------------------------------------------
// Gold movements
// ---------------------------------------------------------------------------

/// Direction of a gold movement in the transaction log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TransactionKind {
    /// Gold credited to the player.
    Income,
    /// Gold debited from the player.
    Expense,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_status_serializes_as_variant_name() {
        let json = serde_json::to_string(&PlotStatus::Growing).ok();
        assert_eq!(json.as_deref(), Some("\"Growing\""));
    }

    #[test]
    fn order_status_orders_available_first() {
        assert!(OrderStatus::Available < OrderStatus::Completed);
    }
}
