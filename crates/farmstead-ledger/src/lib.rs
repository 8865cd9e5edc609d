//! Gold and inventory bookkeeping for the Farmstead simulation.
//!
//! This crate holds the pure arithmetic behind every economic mutation in
//! the engine. It never touches storage: the engine loads a balance or an
//! inventory cell inside its transaction, asks this crate for the new
//! value, and writes the answer back. Every function uses checked
//! arithmetic and returns an error rather than wrapping, saturating, or
//! going negative.
//!
//! # Modules
//!
//! - [`balance`] -- Credit/debit of gold, signed inventory adjustments, and
//!   affection increments.
//! - [`transaction`] -- The [`TransactionBuilder`] for validated
//!   [`GoldTransaction`] records.
//! - [`audit`] -- Reconciliation of a player's recorded gold movements
//!   against their balance.
//!
//! # Invariants
//!
//! - Gold balances and inventory quantities are never negative.
//! - Every recorded gold movement has a strictly positive amount.
//! - The transaction log is append-only; nothing here mutates a record
//!   once built.
//!
//! # Usage
//!
//! ```
//! use farmstead_ledger::{balance, TransactionBuilder};
//! use farmstead_types::{PlayerId, PlotId, SourceReference, TransactionKind};
//!
//! let player = PlayerId::new();
//! let gold = balance::credit_gold(100, 15).ok();
//! assert_eq!(gold, Some(115));
//!
//! let record = TransactionBuilder::new(player, TransactionKind::Income)
//!     .amount(15)
//!     .source(SourceReference::Harvest { plot: PlotId::new() })
//!     .build();
//! assert!(record.is_ok());
//! ```
//!
//! [`GoldTransaction`]: farmstead_types::GoldTransaction

pub mod audit;
pub mod balance;
pub mod transaction;

// Re-export primary types at crate root.
pub use audit::{AuditResult, audit_gold};
pub use transaction::TransactionBuilder;

use farmstead_types::PlayerId;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by ledger arithmetic and record construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A debit would drive the gold balance below zero.
    #[error("insufficient gold: wanted {requested} but only have {available}")]
    InsufficientGold {
        /// Gold the caller tried to debit.
        requested: u64,
        /// Gold actually held.
        available: u64,
    },

    /// A negative adjustment would drive an inventory cell below zero.
    #[error("insufficient quantity: wanted {requested} but only have {available}")]
    InsufficientQuantity {
        /// Units the caller tried to remove.
        requested: u64,
        /// Units actually held.
        available: u32,
    },

    /// A gold movement must move a strictly positive amount.
    #[error("gold transaction amount must be non-zero")]
    ZeroAmount,

    /// A required field was not set on the builder.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Checked arithmetic overflowed.
    #[error("arithmetic overflow: {context}")]
    Overflow {
        /// What was being computed.
        context: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Discrepancy type
// ---------------------------------------------------------------------------

/// A mismatch between a player's recorded gold movements and their balance.
///
/// Produced by [`audit_gold`] when `opening + income - expense != closing`.
/// A discrepancy means some gold mutation bypassed the transaction
/// recorder, or a record was lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoldDiscrepancy {
    /// The audited player.
    pub player: PlayerId,
    /// The balance the log predicts (`None` if the prediction itself
    /// overflowed or went negative).
    pub expected: Option<u64>,
    /// The balance actually stored.
    pub actual: u64,
    /// Human-readable description for logs.
    pub message: String,
}

impl core::fmt::Display for GoldDiscrepancy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
