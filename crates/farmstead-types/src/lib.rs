//! Shared type definitions for the Farmstead simulation.
//!
//! This crate is the single source of truth for the records that flow
//! between the engine, the stores, and whatever presentation layer sits on
//! top. Types are exported to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Item kinds, plot status, order status, transaction kind
//! - [`structs`] -- Catalog records, players, plots, inventory, orders, and
//!   the gold transaction log

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ItemKind, OrderStatus, PlotStatus, TransactionKind};
pub use ids::{ItemId, OrderId, PlantId, PlayerId, PlotId, TransactionId, VillagerId};
pub use structs::{
    Affection, GoldTransaction, InventoryEntry, ItemDef, PlantDef, Player, Plot, PlotState,
    ShopItem, SourceReference, Villager, VillagerOrder,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the presentation layer.

    #[test]
    fn export_bindings() {
        // The actual files are written to the `bindings/` directory
        // relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::PlayerId::export_all();
        let _ = crate::ids::PlotId::export_all();
        let _ = crate::ids::PlantId::export_all();
        let _ = crate::ids::ItemId::export_all();
        let _ = crate::ids::VillagerId::export_all();
        let _ = crate::ids::OrderId::export_all();
        let _ = crate::ids::TransactionId::export_all();

        // Enums
        let _ = crate::enums::ItemKind::export_all();
        let _ = crate::enums::PlotStatus::export_all();
        let _ = crate::enums::OrderStatus::export_all();
        let _ = crate::enums::TransactionKind::export_all();

        // Structs
        let _ = crate::structs::PlantDef::export_all();
        let _ = crate::structs::ItemDef::export_all();
        let _ = crate::structs::Villager::export_all();
        let _ = crate::structs::ShopItem::export_all();
        let _ = crate::structs::Player::export_all();
        let _ = crate::structs::PlotState::export_all();
        let _ = crate::structs::Plot::export_all();
        let _ = crate::structs::InventoryEntry::export_all();
        let _ = crate::structs::Affection::export_all();
        let _ = crate::structs::VillagerOrder::export_all();
        let _ = crate::structs::SourceReference::export_all();
        let _ = crate::structs::GoldTransaction::export_all();
    }
}
