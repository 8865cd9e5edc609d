//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity in the farm has a strongly-typed ID so a plot can never be
//! passed where a player is expected. All IDs use UUID v7 (time-ordered)
//! for efficient database indexing. IDs are generated app-side, including
//! the ones written by the `PostgreSQL` store.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a player (the owner of plots and inventory).
    PlayerId
}

define_id! {
    /// Unique identifier for a plot of farmland.
    PlotId
}

define_id! {
    /// Unique identifier for a plant definition in the catalog.
    PlantId
}

define_id! {
    /// Unique identifier for an item definition in the catalog.
    ItemId
}

define_id! {
    /// Unique identifier for a villager who posts orders.
    VillagerId
}

define_id! {
    /// Unique identifier for a villager order.
    OrderId
}

define_id! {
    /// Unique identifier for a gold transaction record.
    TransactionId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let player = PlayerId::new();
        let plot = PlotId::new();
        // These are different types -- the compiler enforces no mixing.
        assert_ne!(player.into_inner(), Uuid::nil());
        assert_ne!(plot.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let original = OrderId::new();
        let json = serde_json::to_string(&original).ok();
        assert_eq!(json, Some(format!("\"{}\"", original.into_inner())));
        let restored: Result<OrderId, _> = serde_json::from_str(
            json.as_deref().unwrap_or(""),
        );
        assert_eq!(restored.ok(), Some(original));
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = ItemId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
