//! Buying from the fixed-price shop.

use chrono::Utc;
use farmstead_ledger::balance;
use farmstead_types::{ItemId, PlayerId, SourceReference, TransactionId, TransactionKind};
use serde::Serialize;
use tracing::info;

use crate::engine::{FarmEngine, lock_player, rejected};
use crate::error::{EngineError, InvalidState, Missing};
use crate::ledger;
use crate::recorder;
use crate::store::{FarmStore, FarmTx};

/// Outcome of [`FarmEngine::buy_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PurchaseReceipt {
    /// The item bought.
    pub item: ItemId,
    /// Units bought.
    pub quantity: u32,
    /// Gold paid in total.
    pub total_price: u64,
    /// The player's balance afterwards.
    pub balance: u64,
    /// Units of the item now held.
    pub held: u32,
    /// The expense record, absent for free listings.
    pub transaction: Option<TransactionId>,
}

impl<S: FarmStore> FarmEngine<S> {
    /// Buy `quantity` units of a listed item at its shop price.
    pub async fn buy_item(
        &self,
        player: PlayerId,
        item: ItemId,
        quantity: u32,
    ) -> Result<PurchaseReceipt, EngineError> {
        self.try_buy_item(player, item, quantity)
            .await
            .inspect_err(|err| rejected("buy_item", player, err))
    }

    async fn try_buy_item(
        &self,
        player: PlayerId,
        item: ItemId,
        quantity: u32,
    ) -> Result<PurchaseReceipt, EngineError> {
        let now = Utc::now();
        let mut tx = self.store().begin().await?;
        let mut owner = lock_player(&mut tx, player).await?;
        let listing = tx
            .shop_item(item)
            .await?
            .ok_or(Missing::ShopListing(item))?;
        if quantity == 0 {
            return Err(InvalidState::ZeroQuantity.into());
        }

        let total_price =
            balance::total_price(listing.price, quantity).map_err(EngineError::Ledger)?;
        let new_balance = ledger::debit(&mut tx, &mut owner, total_price).await?;
        let held = ledger::deposit(&mut tx, player, item, quantity).await?;
        let transaction = if total_price > 0 {
            let entry = recorder::record(
                &mut tx,
                player,
                TransactionKind::Expense,
                total_price,
                SourceReference::ShopPurchase { item, quantity },
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
            item = %item,
            quantity,
            total_price,
            balance = new_balance,
            "Item purchased"
        );
        Ok(PurchaseReceipt {
            item,
            quantity,
            total_price,
            balance: new_balance,
            held,
            transaction,
        })
    }
}
