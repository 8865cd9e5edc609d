//! The gold transaction log: append and audit.

use chrono::{DateTime, Utc};
use farmstead_ledger::{AuditResult, TransactionBuilder, audit_gold};
use farmstead_types::{GoldTransaction, Player, PlayerId, SourceReference, TransactionKind};
use tracing::debug;

use crate::error::EngineError;
use crate::store::FarmTx;

/// Append one gold movement inside the caller's transaction.
///
/// Only the record's own fields are validated (positive amount). A storage
/// failure is returned to the caller, whose transaction then rolls back
/// together with the balance change the record describes.
pub async fn record<T: FarmTx>(
    tx: &mut T,
    player: PlayerId,
    kind: TransactionKind,
    amount: u64,
    source: SourceReference,
    at: DateTime<Utc>,
) -> Result<GoldTransaction, EngineError> {
    let entry = TransactionBuilder::new(player, kind)
        .amount(amount)
        .source(source)
        .at(at)
        .build()
        .map_err(EngineError::Ledger)?;
    tx.append_transaction(&entry).await?;
    debug!(
        player = %player,
        transaction = %entry.id,
        kind = ?kind,
        amount,
        "Gold transaction recorded"
    );
    Ok(entry)
}

/// Replay a player's full log from zero against their current balance.
pub async fn audit<T: FarmTx>(tx: &mut T, player: &Player) -> Result<AuditResult, EngineError> {
    let log = tx.transactions_of(player.id).await?;
    Ok(audit_gold(player.id, 0, player.current_gold, &log))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use farmstead_ledger::LedgerError;
    use farmstead_types::PlotId;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::FarmStore;

    #[tokio::test]
    async fn record_appends_in_order() {
        let store = MemoryStore::new();
        let player = PlayerId::new();
        let mut tx = store.begin().await.unwrap();
        let first = record(
            &mut tx,
            player,
            TransactionKind::Income,
            100,
            SourceReference::Registration,
            Utc::now(),
        )
        .await
        .unwrap();
        record(
            &mut tx,
            player,
            TransactionKind::Income,
            15,
            SourceReference::Harvest { plot: PlotId::new() },
            Utc::now(),
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let log = store.snapshot().await.transactions_of(player);
        assert_eq!(log.len(), 2);
        assert_eq!(log.first(), Some(&first));
    }

    #[tokio::test]
    async fn zero_amount_rejected_without_append() {
        let store = MemoryStore::new();
        let player = PlayerId::new();
        let mut tx = store.begin().await.unwrap();
        let err = record(
            &mut tx,
            player,
            TransactionKind::Income,
            0,
            SourceReference::Registration,
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::Ledger(LedgerError::ZeroAmount)));
        assert!(tx.transactions_of(player).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn storage_failure_surfaces() {
        let store = MemoryStore::new();
        store.fail_transaction_appends(true);
        let mut tx = store.begin().await.unwrap();
        let err = record(
            &mut tx,
            PlayerId::new(),
            TransactionKind::Expense,
            5,
            SourceReference::Registration,
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::Store(_)));
    }

    #[tokio::test]
    async fn audit_detects_unrecorded_gold() {
        let store = MemoryStore::new();
        let mut player = Player {
            id: PlayerId::new(),
            current_gold: 100,
            created_at: Utc::now(),
        };
        let mut tx = store.begin().await.unwrap();
        record(
            &mut tx,
            player.id,
            TransactionKind::Income,
            100,
            SourceReference::Registration,
            Utc::now(),
        )
        .await
        .unwrap();
        assert!(audit(&mut tx, &player).await.unwrap().is_balanced());

        player.current_gold = 130;
        assert!(!audit(&mut tx, &player).await.unwrap().is_balanced());
    }
}
