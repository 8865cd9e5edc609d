//! Provisioning new players and reading a player's state.

use chrono::Utc;
use farmstead_ledger::AuditResult;
use farmstead_types::{InventoryEntry, Player, PlayerId, Plot, SourceReference, TransactionKind};
use serde::Serialize;
use tracing::{debug, info};

use crate::engine::{FarmEngine, find_player, rejected};
use crate::error::{EngineError, Missing};
use crate::ledger;
use crate::recorder;
use crate::store::{FarmStore, FarmTx};

/// Everything a player owns, read in one consistent transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerOverview {
    /// The player and their gold.
    pub player: Player,
    /// Non-empty inventory cells.
    pub inventory: Vec<InventoryEntry>,
    /// Every plot the player owns.
    pub plots: Vec<Plot>,
}

impl<S: FarmStore> FarmEngine<S> {
    /// Create a player with the configured starting gold, empty plots and
    /// starter items.
    ///
    /// Starting gold is credited through the ledger and recorded as
    /// [`SourceReference::Registration`], so the audit reconciles from a
    /// zero opening balance.
    pub async fn register_player(&self) -> Result<PlayerOverview, EngineError> {
        let id = PlayerId::new();
        self.try_register_player(id)
            .await
            .inspect_err(|err| rejected("register_player", id, err))
    }

    async fn try_register_player(&self, id: PlayerId) -> Result<PlayerOverview, EngineError> {
        let rules = self.rules();
        let now = Utc::now();
        let mut tx = self.store().begin().await?;

        let mut player = Player {
            id,
            current_gold: 0,
            created_at: now,
        };
        tx.insert_player(&player).await?;

        if rules.starting_gold > 0 {
            ledger::credit(&mut tx, &mut player, rules.starting_gold).await?;
            recorder::record(
                &mut tx,
                id,
                TransactionKind::Income,
                rules.starting_gold,
                SourceReference::Registration,
                now,
            )
            .await?;
        }

        let mut plots = Vec::new();
        for _ in 0..rules.starting_plots {
            let plot = Plot::empty(id);
            tx.save_plot(&plot).await?;
            plots.push(plot);
        }

        for (name, &quantity) in &rules.starter_inventory {
            let item = tx
                .item_by_name(name)
                .await?
                .ok_or_else(|| Missing::ItemNamed(name.clone()))?;
            if quantity > 0 {
                ledger::deposit(&mut tx, id, item.id, quantity).await?;
            }
        }
        let inventory = tx.inventory_of(id).await?;
        tx.commit().await?;

        info!(
            player = %id,
            gold = player.current_gold,
            plots = plots.len(),
            items = inventory.len(),
            "Player registered"
        );
        Ok(PlayerOverview {
            player,
            inventory,
            plots,
        })
    }

    /// Read a player's gold, inventory and plots.
    ///
    /// Runs in a read-only transaction and takes no row locks, so it never
    /// waits on an operation in progress.
    pub async fn overview(&self, player: PlayerId) -> Result<PlayerOverview, EngineError> {
        let mut tx = self.store().begin_read().await?;
        let record = find_player(&mut tx, player).await?;
        let inventory = tx.inventory_of(player).await?;
        let plots = tx.plots_of(player).await?;
        debug!(player = %player, plots = plots.len(), "Overview read");
        Ok(PlayerOverview {
            player: record,
            inventory,
            plots,
        })
    }

    /// Reconcile a player's transaction log with their balance.
    pub async fn audit(&self, player: PlayerId) -> Result<AuditResult, EngineError> {
        let mut tx = self.store().begin_read().await?;
        let record = find_player(&mut tx, player).await?;
        recorder::audit(&mut tx, &record).await
    }
}
