//! Gold audit: reconcile the transaction log with a player's balance.
//!
//! Every engine mutation of a player's gold appends a [`GoldTransaction`]
//! in the same database transaction. The audit replays those records:
//!
//! ```text
//! opening + sum(income) - sum(expense) == closing
//! ```
//!
//! A mismatch produces a [`GoldDiscrepancy`]. The check passes by
//! construction while every gold path goes through the recorder; it exists
//! to catch a path that does not.

use farmstead_types::{GoldTransaction, PlayerId, TransactionKind};

use crate::GoldDiscrepancy;

/// The result of auditing one player's gold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditResult {
    /// The log explains the balance exactly.
    Balanced,
    /// The log and the balance disagree.
    Discrepancy(GoldDiscrepancy),
}

impl AuditResult {
    /// Whether the audit passed.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Audit `player`'s gold.
///
/// `opening` is the balance before the first record in `transactions`
/// (zero when the log starts at registration). Records belonging to other
/// players are ignored.
pub fn audit_gold(
    player: PlayerId,
    opening: u64,
    closing: u64,
    transactions: &[GoldTransaction],
) -> AuditResult {
    let expected = replay(player, opening, transactions);

    if expected == Some(closing) {
        return AuditResult::Balanced;
    }

    let message = expected.map_or_else(
        || {
            format!(
                "gold audit failed for player {player}: log replay went negative or overflowed, balance is {closing}"
            )
        },
        |e| {
            format!("gold audit failed for player {player}: log predicts {e}, balance is {closing}")
        },
    );
    tracing::warn!(%player, ?expected, actual = closing, "Gold audit discrepancy");

    AuditResult::Discrepancy(GoldDiscrepancy {
        player,
        expected,
        actual: closing,
        message,
    })
}

/// Replay the log in order, returning `None` if any intermediate balance
/// would be negative or overflow.
fn replay(player: PlayerId, opening: u64, transactions: &[GoldTransaction]) -> Option<u64> {
    let mut balance = opening;
    for record in transactions.iter().filter(|t| t.player == player) {
        balance = match record.kind {
            TransactionKind::Income => balance.checked_add(record.amount)?,
            TransactionKind::Expense => balance.checked_sub(record.amount)?,
        };
    }
    Some(balance)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use farmstead_types::{ItemId, OrderId, PlotId, SourceReference};

    use super::*;
    use crate::TransactionBuilder;

    fn record(player: PlayerId, kind: TransactionKind, amount: u64) -> GoldTransaction {
        let source = match kind {
            TransactionKind::Income => SourceReference::Harvest {
                plot: PlotId::new(),
            },
            TransactionKind::Expense => SourceReference::ShopPurchase {
                item: ItemId::new(),
                quantity: 1,
            },
        };
        TransactionBuilder::new(player, kind)
            .amount(amount)
            .source(source)
            .build()
            .unwrap()
    }

    #[test]
    fn empty_log_balances_unchanged_gold() {
        let player = PlayerId::new();
        assert_eq!(audit_gold(player, 100, 100, &[]), AuditResult::Balanced);
    }

    #[test]
    fn registration_then_purchase_then_order() {
        let player = PlayerId::new();
        let log = vec![
            TransactionBuilder::new(player, TransactionKind::Income)
                .amount(100)
                .source(SourceReference::Registration)
                .build(),
            TransactionBuilder::new(player, TransactionKind::Expense)
                .amount(10)
                .source(SourceReference::ShopPurchase {
                    item: ItemId::new(),
                    quantity: 2,
                })
                .build(),
            TransactionBuilder::new(player, TransactionKind::Income)
                .amount(50)
                .source(SourceReference::Order {
                    order: OrderId::new(),
                })
                .build(),
        ];
        let log: Vec<GoldTransaction> = log.into_iter().filter_map(Result::ok).collect();
        assert_eq!(log.len(), 3);

        assert!(audit_gold(player, 0, 140, &log).is_balanced());
    }

    #[test]
    fn unrecorded_credit_is_detected() {
        let player = PlayerId::new();
        let log = vec![record(player, TransactionKind::Income, 15)];

        let result = audit_gold(player, 100, 130, &log);
        match result {
            AuditResult::Discrepancy(d) => {
                assert_eq!(d.expected, Some(115));
                assert_eq!(d.actual, 130);
                assert!(d.to_string().contains("115"));
                assert!(d.message.contains("log predicts 115, balance is 130"));
            }
            AuditResult::Balanced => panic!("expected discrepancy"),
        }
    }

    #[test]
    fn other_players_records_are_ignored() {
        let player = PlayerId::new();
        let other = PlayerId::new();
        let log = vec![
            record(other, TransactionKind::Income, 500),
            record(player, TransactionKind::Expense, 5),
        ];

        assert!(audit_gold(player, 20, 15, &log).is_balanced());
    }

    #[test]
    fn replay_going_negative_is_a_discrepancy() {
        let player = PlayerId::new();
        let log = vec![record(player, TransactionKind::Expense, 50)];

        let result = audit_gold(player, 10, 0, &log);
        match result {
            AuditResult::Discrepancy(d) => {
                assert_eq!(d.expected, None);
                assert!(d.message.contains("went negative or overflowed"));
                assert!(!d.message.contains("predicts"));
            }
            AuditResult::Balanced => panic!("expected discrepancy"),
        }
    }
}
