//! Transaction builders and validation for the gold transaction log.
//!
//! Provides a [`TransactionBuilder`] that enforces the recorder's only
//! validation rules: a movement has a strictly positive amount and names
//! what caused it. Builders validate inputs before producing a
//! [`GoldTransaction`].

use chrono::{DateTime, Utc};

use farmstead_types::{GoldTransaction, PlayerId, SourceReference, TransactionId, TransactionKind};

use crate::LedgerError;

// ---------------------------------------------------------------------------
// Transaction builder
// ---------------------------------------------------------------------------

/// Builder for constructing validated [`GoldTransaction`] values.
///
/// # Examples
///
/// ```
/// use farmstead_ledger::TransactionBuilder;
/// use farmstead_types::{OrderId, PlayerId, SourceReference, TransactionKind};
///
/// let record = TransactionBuilder::new(PlayerId::new(), TransactionKind::Income)
///     .amount(50)
///     .source(SourceReference::Order { order: OrderId::new() })
///     .build();
///
/// assert!(record.is_ok());
/// ```
#[derive(Debug)]
pub struct TransactionBuilder {
    player: PlayerId,
    kind: TransactionKind,
    amount: Option<u64>,
    source: Option<SourceReference>,
    created_at: Option<DateTime<Utc>>,
}

impl TransactionBuilder {
    /// Start building a record of a gold movement for `player`.
    pub const fn new(player: PlayerId, kind: TransactionKind) -> Self {
        Self {
            player,
            kind,
            amount: None,
            source: None,
            created_at: None,
        }
    }

    /// Set the gold moved.
    #[must_use]
    pub const fn amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Set what caused the movement.
    #[must_use]
    pub const fn source(mut self, source: SourceReference) -> Self {
        self.source = Some(source);
        self
    }

    /// Override the timestamp (defaults to now). Used when the caller
    /// already stamped the surrounding transaction.
    #[must_use]
    pub const fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Validate inputs and produce a [`GoldTransaction`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MissingField`] if the amount or source is not
    /// set, and [`LedgerError::ZeroAmount`] if the amount is zero.
    pub fn build(self) -> Result<GoldTransaction, LedgerError> {
        let amount = self.amount.ok_or(LedgerError::MissingField("amount"))?;
        let source = self.source.ok_or(LedgerError::MissingField("source"))?;

        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }

        Ok(GoldTransaction {
            id: TransactionId::new(),
            player: self.player,
            kind: self.kind,
            amount,
            source,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        })
    }
}

#[cfg(test)]
mod tests {
    use farmstead_types::{ItemId, OrderId, PlotId};

    use super::*;

    #[test]
    fn builder_produces_valid_record() {
        let player = PlayerId::new();
        let plot = PlotId::new();
        let result = TransactionBuilder::new(player, TransactionKind::Income)
            .amount(15)
            .source(SourceReference::Harvest { plot })
            .build();

        assert!(result.is_ok());
        if let Ok(record) = result {
            assert_eq!(record.player, player);
            assert_eq!(record.kind, TransactionKind::Income);
            assert_eq!(record.amount, 15);
            assert_eq!(record.source, SourceReference::Harvest { plot });
        }
    }

    #[test]
    fn zero_amount_rejected() {
        let result = TransactionBuilder::new(PlayerId::new(), TransactionKind::Income)
            .amount(0)
            .source(SourceReference::Order {
                order: OrderId::new(),
            })
            .build();

        assert_eq!(result.err(), Some(LedgerError::ZeroAmount));
    }

    #[test]
    fn missing_amount_rejected() {
        let result = TransactionBuilder::new(PlayerId::new(), TransactionKind::Expense)
            .source(SourceReference::ShopPurchase {
                item: ItemId::new(),
                quantity: 1,
            })
            .build();

        assert_eq!(result.err(), Some(LedgerError::MissingField("amount")));
    }

    #[test]
    fn missing_source_rejected() {
        let result = TransactionBuilder::new(PlayerId::new(), TransactionKind::Expense)
            .amount(5)
            .build();

        assert_eq!(result.err(), Some(LedgerError::MissingField("source")));
    }

    #[test]
    fn explicit_timestamp_is_kept() {
        let stamp = Utc::now();
        let result = TransactionBuilder::new(PlayerId::new(), TransactionKind::Income)
            .amount(100)
            .source(SourceReference::Registration)
            .at(stamp)
            .build();

        assert_eq!(result.map(|r| r.created_at).ok(), Some(stamp));
    }
}
