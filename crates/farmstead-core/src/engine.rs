//! The [`FarmEngine`] facade and the lookups shared by its operations.
//!
//! The operations themselves live in [`plots`](crate::plots),
//! [`orders`](crate::orders), [`shop`](crate::shop) and
//! [`players`](crate::players). Each one opens a transaction, locks the
//! player row first, validates everything before its first write, and
//! commits once. Any `?` before the commit drops the transaction and rolls
//! it back.

use farmstead_types::{PlantDef, PlantId, Player, PlayerId, Plot, PlotId};
use tracing::warn;

use crate::config::EconomyConfig;
use crate::error::{EngineError, ErrorKind, Missing};
use crate::store::{FarmStore, FarmTx};

/// Entry point for every farm operation.
///
/// Cheap to clone when the store is (the in-memory and `PostgreSQL`
/// stores both are), so one engine can be shared across tasks.
#[derive(Debug, Clone)]
pub struct FarmEngine<S> {
    store: S,
    rules: EconomyConfig,
}

impl<S: FarmStore> FarmEngine<S> {
    /// Create an engine over `store` applying the economy `rules`.
    pub const fn new(store: S, rules: EconomyConfig) -> Self {
        Self { store, rules }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The economy rules in effect.
    pub const fn rules(&self) -> &EconomyConfig {
        &self.rules
    }
}

/// Load and lock a player, or fail with [`Missing::Player`].
pub(crate) async fn lock_player<T: FarmTx>(
    tx: &mut T,
    player: PlayerId,
) -> Result<Player, EngineError> {
    tx.lock_player(player)
        .await?
        .ok_or(EngineError::NotFound(Missing::Player(player)))
}

/// Load a player without locking, or fail with [`Missing::Player`].
pub(crate) async fn find_player<T: FarmTx>(
    tx: &mut T,
    player: PlayerId,
) -> Result<Player, EngineError> {
    tx.player(player)
        .await?
        .ok_or(EngineError::NotFound(Missing::Player(player)))
}

/// Load and lock a plot owned by `player`.
///
/// A plot belonging to someone else is reported as missing so ownership
/// cannot be probed.
pub(crate) async fn lock_owned_plot<T: FarmTx>(
    tx: &mut T,
    player: PlayerId,
    plot: PlotId,
) -> Result<Plot, EngineError> {
    match tx.lock_plot(plot).await? {
        Some(found) if found.player == player => Ok(found),
        _ => Err(EngineError::NotFound(Missing::Plot(plot))),
    }
}

/// Load a plant definition, or fail with [`Missing::Plant`].
pub(crate) async fn plant_def<T: FarmTx>(
    tx: &mut T,
    plant: PlantId,
) -> Result<PlantDef, EngineError> {
    tx.plant_def(plant)
        .await?
        .ok_or(EngineError::NotFound(Missing::Plant(plant)))
}

/// Log a failed operation. Rule violations are expected traffic and log
/// at `warn`; infrastructure failures carry the full error.
pub(crate) fn rejected(operation: &'static str, player: PlayerId, err: &EngineError) {
    match err.kind() {
        ErrorKind::Infrastructure => {
            warn!(operation, player = %player, error = %err, "Operation failed");
        }
        kind => {
            warn!(operation, player = %player, ?kind, reason = %err, "Operation rejected");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn foreign_plot_reads_as_missing() {
        let store = MemoryStore::new();
        let owner = PlayerId::new();
        let plot = Plot::empty(owner);
        store.modify(|state| state.put_plot(plot)).await;

        let mut tx = store.begin().await.unwrap();
        assert!(lock_owned_plot(&mut tx, owner, plot.id).await.is_ok());
        let err = lock_owned_plot(&mut tx, PlayerId::new(), plot.id)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(Missing::Plot(id)) if id == plot.id));
    }

    #[tokio::test]
    async fn unknown_player_and_plant_are_missing() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        assert_eq!(
            lock_player(&mut tx, PlayerId::new()).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            plant_def(&mut tx, PlantId::new()).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn engine_exposes_rules() {
        let engine = FarmEngine::new(MemoryStore::new(), EconomyConfig::default());
        assert_eq!(engine.rules().starting_gold, 100);
    }
}
