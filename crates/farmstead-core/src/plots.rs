//! Plot lifecycle operations: plant, water, advance a day, harvest.
//!
//! Two harvest policies exist side by side. [`FarmEngine::harvest`] sells
//! one plot's crop on the spot for gold; [`FarmEngine::harvest_all`]
//! gathers every ready plot's crop into the inventory for later orders.

use chrono::Utc;
use farmstead_ledger::balance;
use farmstead_types::{
    ItemId, PlantId, PlayerId, Plot, PlotId, PlotState, SourceReference, TransactionId,
    TransactionKind,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::engine::{FarmEngine, lock_owned_plot, lock_player, plant_def, rejected};
use crate::error::{EngineError, InvalidState, Missing};
use crate::growth;
use crate::ledger;
use crate::recorder;
use crate::store::{FarmStore, FarmTx};

/// Outcome of [`FarmEngine::advance_day`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayReport {
    /// Growing plots that aged by one day.
    pub advanced: usize,
    /// Plots that became ready today.
    pub ripened: Vec<PlotId>,
}

/// Outcome of [`FarmEngine::harvest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HarvestReceipt {
    /// The harvested plot, now empty.
    pub plot: PlotId,
    /// The crop that was growing.
    pub plant: PlantId,
    /// Gold paid for the crop.
    pub gold_earned: u64,
    /// The player's balance afterwards.
    pub balance: u64,
    /// The income record, absent when the crop was worth nothing.
    pub transaction: Option<TransactionId>,
}

/// One plot gathered by [`FarmEngine::harvest_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GatheredPlot {
    /// The harvested plot, now empty.
    pub plot: PlotId,
    /// The crop that was growing.
    pub plant: PlantId,
    /// The crop item added to the inventory.
    pub item: ItemId,
    /// Units added.
    pub quantity: u32,
}

/// Outcome of [`FarmEngine::harvest_all`]. Empty when nothing was ready.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GatherReport {
    /// Every plot harvested in this batch.
    pub gathered: Vec<GatheredPlot>,
}

impl<S: FarmStore> FarmEngine<S> {
    /// Plant a seed in an empty plot, consuming one seed item.
    pub async fn plant(
        &self,
        player: PlayerId,
        plot: PlotId,
        plant: PlantId,
    ) -> Result<Plot, EngineError> {
        self.try_plant(player, plot, plant)
            .await
            .inspect_err(|err| rejected("plant", player, err))
    }

    async fn try_plant(
        &self,
        player: PlayerId,
        plot: PlotId,
        plant: PlantId,
    ) -> Result<Plot, EngineError> {
        let mut tx = self.store().begin().await?;
        lock_player(&mut tx, player).await?;
        let mut target = lock_owned_plot(&mut tx, player, plot).await?;
        let def = plant_def(&mut tx, plant).await?;

        let next = growth::sow(&target, &def)?;
        ledger::withdraw(&mut tx, player, def.seed_item, 1).await?;
        target.state = next;
        tx.save_plot(&target).await?;
        tx.commit().await?;

        info!(player = %player, plot = %plot, plant = %def.name, "Seed planted");
        Ok(target)
    }

    /// Water a growing crop, consuming one unit of the water material.
    pub async fn water(&self, player: PlayerId, plot: PlotId) -> Result<Plot, EngineError> {
        self.try_water(player, plot)
            .await
            .inspect_err(|err| rejected("water", player, err))
    }

    async fn try_water(&self, player: PlayerId, plot: PlotId) -> Result<Plot, EngineError> {
        let mut tx = self.store().begin().await?;
        lock_player(&mut tx, player).await?;
        let mut target = lock_owned_plot(&mut tx, player, plot).await?;
        let water = tx
            .item_by_name(&self.rules().water_item)
            .await?
            .ok_or_else(|| Missing::ItemNamed(self.rules().water_item.clone()))?;

        let PlotState::Growing { plant, .. } = target.state else {
            return Err(InvalidState::PlotNotGrowing {
                plot,
                status: target.state.status(),
            }
            .into());
        };
        let def = plant_def(&mut tx, plant).await?;

        let next = growth::water(&target, &def)?;
        ledger::withdraw(&mut tx, player, water.id, 1).await?;
        target.state = next;
        tx.save_plot(&target).await?;
        tx.commit().await?;

        info!(
            player = %player,
            plot = %plot,
            growth_time_left = ?target.state.growth_time_left(),
            times_watered = target.state.times_watered(),
            "Crop watered"
        );
        Ok(target)
    }

    /// Age every growing plot of a player by one day. Plots reaching zero
    /// become ready. All plots update together or not at all.
    pub async fn advance_day(&self, player: PlayerId) -> Result<DayReport, EngineError> {
        self.try_advance_day(player)
            .await
            .inspect_err(|err| rejected("advance_day", player, err))
    }

    async fn try_advance_day(&self, player: PlayerId) -> Result<DayReport, EngineError> {
        let mut tx = self.store().begin().await?;
        lock_player(&mut tx, player).await?;
        let plots = tx.lock_plots_of(player).await?;

        let mut report = DayReport::default();
        for mut plot in plots {
            let Some(next) = growth::advance_day(plot.state) else {
                continue;
            };
            if matches!(next, PlotState::Ready { .. }) {
                report.ripened.push(plot.id);
            }
            plot.state = next;
            tx.save_plot(&plot).await?;
            report.advanced = report.advanced.saturating_add(1);
        }
        tx.commit().await?;

        info!(
            player = %player,
            advanced = report.advanced,
            ripened = report.ripened.len(),
            "Day advanced"
        );
        Ok(report)
    }

    /// Sell a ready plot's crop for `sell_price * harvest_yield` gold and
    /// empty the plot.
    pub async fn harvest(
        &self,
        player: PlayerId,
        plot: PlotId,
    ) -> Result<HarvestReceipt, EngineError> {
        self.try_harvest(player, plot)
            .await
            .inspect_err(|err| rejected("harvest", player, err))
    }

    async fn try_harvest(
        &self,
        player: PlayerId,
        plot: PlotId,
    ) -> Result<HarvestReceipt, EngineError> {
        let now = Utc::now();
        let mut tx = self.store().begin().await?;
        let mut owner = lock_player(&mut tx, player).await?;
        let mut target = lock_owned_plot(&mut tx, player, plot).await?;
        let plant = growth::reap(&target)?;
        let def = plant_def(&mut tx, plant).await?;

        let gold_earned =
            balance::total_price(def.sell_price, def.harvest_yield).map_err(EngineError::Ledger)?;
        let new_balance = ledger::credit(&mut tx, &mut owner, gold_earned).await?;
        let transaction = if gold_earned > 0 {
            let entry = recorder::record(
                &mut tx,
                player,
                TransactionKind::Income,
                gold_earned,
                SourceReference::Harvest { plot },
                now,
            )
            .await?;
            Some(entry.id)
        } else {
            None
        };

        target.state = PlotState::Empty;
        tx.save_plot(&target).await?;
        tx.commit().await?;

        info!(
            player = %player,
            plot = %plot,
            gold_earned,
            balance = new_balance,
            "Crop harvested"
        );
        Ok(HarvestReceipt {
            plot,
            plant,
            gold_earned,
            balance: new_balance,
            transaction,
        })
    }

    /// Gather every ready plot's crop into the inventory and empty those
    /// plots, as one unit. Nothing ready is an empty, successful batch.
    pub async fn harvest_all(&self, player: PlayerId) -> Result<GatherReport, EngineError> {
        self.try_harvest_all(player)
            .await
            .inspect_err(|err| rejected("harvest_all", player, err))
    }

    async fn try_harvest_all(&self, player: PlayerId) -> Result<GatherReport, EngineError> {
        let mut tx = self.store().begin().await?;
        lock_player(&mut tx, player).await?;
        let plots = tx.lock_plots_of(player).await?;

        let mut report = GatherReport::default();
        for mut plot in plots {
            let Ok(plant) = growth::reap(&plot) else {
                continue;
            };
            let def = plant_def(&mut tx, plant).await?;
            ledger::deposit(&mut tx, player, def.crop_item, def.harvest_yield).await?;
            plot.state = PlotState::Empty;
            tx.save_plot(&plot).await?;
            report.gathered.push(GatheredPlot {
                plot: plot.id,
                plant,
                item: def.crop_item,
                quantity: def.harvest_yield,
            });
        }

        if report.gathered.is_empty() {
            debug!(player = %player, "Nothing ready to gather");
            return Ok(report);
        }
        tx.commit().await?;

        info!(player = %player, plots = report.gathered.len(), "Crops gathered");
        Ok(report)
    }
}
