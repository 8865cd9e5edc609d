//! Transactional gold, inventory and affection mutations.
//!
//! Each function reads the current value through an open [`FarmTx`],
//! computes the new one with the checked arithmetic in
//! [`farmstead_ledger::balance`], and writes it back in the same
//! transaction. Create-if-absent is explicit here: an absent inventory
//! cell or affection row reads as zero and the write creates it.

use farmstead_ledger::balance;
use farmstead_types::{ItemId, Player, PlayerId, VillagerId};

use crate::error::{EngineError, ResourceKind};
use crate::store::FarmTx;

/// Add gold to a locked player and persist the new balance.
///
/// `player` is updated in place so the caller's copy stays current.
pub async fn credit<T: FarmTx>(
    tx: &mut T,
    player: &mut Player,
    amount: u64,
) -> Result<u64, EngineError> {
    let gold = balance::credit_gold(player.current_gold, amount)
        .map_err(|e| EngineError::from_ledger(e, ResourceKind::Gold))?;
    tx.update_gold(player.id, gold).await?;
    player.current_gold = gold;
    Ok(gold)
}

/// Remove gold from a locked player and persist the new balance.
///
/// Fails with [`EngineError::InsufficientResource`] rather than going
/// negative.
pub async fn debit<T: FarmTx>(
    tx: &mut T,
    player: &mut Player,
    amount: u64,
) -> Result<u64, EngineError> {
    let gold = balance::debit_gold(player.current_gold, amount)
        .map_err(|e| EngineError::from_ledger(e, ResourceKind::Gold))?;
    tx.update_gold(player.id, gold).await?;
    player.current_gold = gold;
    Ok(gold)
}

/// Apply a signed change to one inventory cell, returning the new
/// quantity. A result of zero removes the cell.
pub async fn adjust_inventory<T: FarmTx>(
    tx: &mut T,
    player: PlayerId,
    item: ItemId,
    delta: i64,
) -> Result<u32, EngineError> {
    let current = tx.inventory_quantity(player, item).await?;
    let quantity = balance::adjust_quantity(current, delta)
        .map_err(|e| EngineError::from_ledger(e, ResourceKind::Item(item)))?;
    tx.set_inventory_quantity(player, item, quantity).await?;
    Ok(quantity)
}

/// Add `units` of `item` to a player's inventory.
pub async fn deposit<T: FarmTx>(
    tx: &mut T,
    player: PlayerId,
    item: ItemId,
    units: u32,
) -> Result<u32, EngineError> {
    adjust_inventory(tx, player, item, i64::from(units)).await
}

/// Remove `units` of `item` from a player's inventory.
pub async fn withdraw<T: FarmTx>(
    tx: &mut T,
    player: PlayerId,
    item: ItemId,
    units: u32,
) -> Result<u32, EngineError> {
    adjust_inventory(tx, player, item, i64::from(units).wrapping_neg()).await
}

/// Fail unless `player` holds at least `needed` units of `item`.
///
/// Lets an operation check every precondition before its first write.
pub async fn require_items<T: FarmTx>(
    tx: &mut T,
    player: PlayerId,
    item: ItemId,
    needed: u32,
) -> Result<(), EngineError> {
    let held = tx.inventory_quantity(player, item).await?;
    if held < needed {
        return Err(EngineError::InsufficientResource {
            resource: ResourceKind::Item(item),
            requested: u64::from(needed),
            available: u64::from(held),
        });
    }
    Ok(())
}

/// Increase affection between a player and a villager, creating the row
/// at zero if absent. Returns the new level.
pub async fn raise_affection<T: FarmTx>(
    tx: &mut T,
    player: PlayerId,
    villager: VillagerId,
    amount: u32,
) -> Result<u32, EngineError> {
    let current = tx.affection_level(player, villager).await?.unwrap_or(0);
    let level = balance::raise_affection(current, amount).map_err(EngineError::Ledger)?;
    tx.set_affection_level(player, villager, level).await?;
    Ok(level)
}
