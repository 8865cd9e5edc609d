//! Villager orders: the board of open requests and fulfilling them.
//!
//! Orders are global rows that every player competes for. The order row is
//! locked before its status is checked, so of several concurrent attempts
//! exactly one sees `Available` and the rest fail with
//! [`InvalidState::OrderNotAvailable`].

use chrono::Utc;
use farmstead_types::{
    OrderId, OrderStatus, PlayerId, SourceReference, TransactionId, TransactionKind, VillagerId,
    VillagerOrder,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::engine::{FarmEngine, lock_player, rejected};
use crate::error::{EngineError, InvalidState, Missing};
use crate::ledger;
use crate::recorder;
use crate::store::{FarmStore, FarmTx};

/// Outcome of [`FarmEngine::fulfill_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderReceipt {
    /// The completed order.
    pub order: OrderId,
    /// The villager who posted it.
    pub villager: VillagerId,
    /// Units handed over.
    pub delivered: u32,
    /// Gold received.
    pub gold_earned: u64,
    /// The player's balance afterwards.
    pub balance: u64,
    /// Affection with the villager afterwards.
    pub affection: u32,
    /// The income record, absent for orders that pay no gold.
    pub transaction: Option<TransactionId>,
}

impl<S: FarmStore> FarmEngine<S> {
    /// Deliver the items an order asks for and collect its rewards.
    ///
    /// Checks run in a fixed order: the player and order must exist, the
    /// order must still be available and unexpired, and the player must
    /// hold enough of the required item. Only then is anything written.
    pub async fn fulfill_order(
        &self,
        player: PlayerId,
        order: OrderId,
    ) -> Result<OrderReceipt, EngineError> {
        self.try_fulfill_order(player, order)
            .await
            .inspect_err(|err| rejected("fulfill_order", player, err))
    }

    async fn try_fulfill_order(
        &self,
        player: PlayerId,
        order: OrderId,
    ) -> Result<OrderReceipt, EngineError> {
        let now = Utc::now();
        let mut tx = self.store().begin().await?;
        let mut owner = lock_player(&mut tx, player).await?;
        let mut target = tx
            .lock_order(order)
            .await?
            .ok_or(Missing::Order(order))?;

        if target.status != OrderStatus::Available {
            return Err(InvalidState::OrderNotAvailable(order).into());
        }
        if target.is_expired(now) {
            return Err(InvalidState::OrderExpired(order).into());
        }
        ledger::require_items(&mut tx, player, target.required_item, target.required_quantity)
            .await?;

        ledger::withdraw(&mut tx, player, target.required_item, target.required_quantity).await?;
        let new_balance = ledger::credit(&mut tx, &mut owner, target.reward_gold).await?;
        let affection =
            ledger::raise_affection(&mut tx, player, target.villager, target.reward_affection)
                .await?;

        target.status = OrderStatus::Completed;
        target.fulfilled_by = Some(player);
        target.completed_at = Some(now);
        tx.save_order(&target).await?;

        let transaction = if target.reward_gold > 0 {
            let entry = recorder::record(
                &mut tx,
                player,
                TransactionKind::Income,
                target.reward_gold,
                SourceReference::Order { order },
                now,
            )
            .await?;
            Some(entry.id)
        } else {
            None
        };
        tx.commit().await?;

        info!(
            player = %player,
            order = %order,
            villager = %target.villager,
            gold_earned = target.reward_gold,
            affection,
            "Order fulfilled"
        );
        Ok(OrderReceipt {
            order,
            villager: target.villager,
            delivered: target.required_quantity,
            gold_earned: target.reward_gold,
            balance: new_balance,
            affection,
            transaction,
        })
    }

    /// Every order still available and unexpired, oldest first.
    pub async fn available_orders(&self) -> Result<Vec<VillagerOrder>, EngineError> {
        let mut tx = self.store().begin_read().await?;
        let open = tx.open_orders(Utc::now()).await?;
        debug!(count = open.len(), "Order board read");
        Ok(open)
    }
}
