//! Checked arithmetic for gold balances, inventory cells, and affection.
//!
//! These are the only functions in the workspace that compute a new gold
//! balance or item quantity. Callers hold the row lock; this module decides
//! whether the mutation is legal and what the stored value becomes.

use crate::LedgerError;

/// Add `amount` gold to `balance`.
///
/// # Errors
///
/// Returns [`LedgerError::Overflow`] if the new balance does not fit.
pub fn credit_gold(balance: u64, amount: u64) -> Result<u64, LedgerError> {
    balance.checked_add(amount).ok_or(LedgerError::Overflow {
        context: "gold credit",
    })
}

/// Remove `amount` gold from `balance`.
///
/// # Errors
///
/// Returns [`LedgerError::InsufficientGold`] if `amount` exceeds the
/// balance. The balance is never allowed to go below zero.
pub fn debit_gold(balance: u64, amount: u64) -> Result<u64, LedgerError> {
    balance
        .checked_sub(amount)
        .ok_or(LedgerError::InsufficientGold {
            requested: amount,
            available: balance,
        })
}

/// Multiply a per-unit price by a unit count.
///
/// Used for harvest proceeds (`sell_price * harvest_yield`) and shop
/// purchases (`price * quantity`).
///
/// # Errors
///
/// Returns [`LedgerError::Overflow`] if the product does not fit.
pub fn total_price(unit_price: u64, units: u32) -> Result<u64, LedgerError> {
    unit_price
        .checked_mul(u64::from(units))
        .ok_or(LedgerError::Overflow {
            context: "price multiplication",
        })
}

/// Apply a signed `delta` to an inventory cell holding `current` units.
///
/// An absent cell is `current == 0`. A result of zero means the cell may
/// be pruned.
///
/// # Errors
///
/// Returns [`LedgerError::InsufficientQuantity`] if the result would be
/// negative, or [`LedgerError::Overflow`] if it exceeds `u32::MAX`.
pub fn adjust_quantity(current: u32, delta: i64) -> Result<u32, LedgerError> {
    let next = i64::from(current)
        .checked_add(delta)
        .ok_or(LedgerError::Overflow {
            context: "inventory adjustment",
        })?;

    if next < 0 {
        return Err(LedgerError::InsufficientQuantity {
            requested: delta.unsigned_abs(),
            available: current,
        });
    }

    u32::try_from(next).map_err(|_err| LedgerError::Overflow {
        context: "inventory quantity exceeds u32",
    })
}

/// Raise an affection level by `amount`. Affection never decreases.
///
/// # Errors
///
/// Returns [`LedgerError::Overflow`] if the new level does not fit.
pub fn raise_affection(level: u32, amount: u32) -> Result<u32, LedgerError> {
    level.checked_add(amount).ok_or(LedgerError::Overflow {
        context: "affection increment",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_adds() {
        assert_eq!(credit_gold(100, 15), Ok(115));
        assert_eq!(credit_gold(0, 0), Ok(0));
    }

    #[test]
    fn credit_overflow_is_error() {
        assert!(matches!(
            credit_gold(u64::MAX, 1),
            Err(LedgerError::Overflow { .. })
        ));
    }

    #[test]
    fn debit_to_exactly_zero() {
        assert_eq!(debit_gold(5, 5), Ok(0));
    }

    #[test]
    fn debit_below_zero_rejected() {
        assert_eq!(
            debit_gold(4, 5),
            Err(LedgerError::InsufficientGold {
                requested: 5,
                available: 4,
            })
        );
    }

    #[test]
    fn total_price_multiplies() {
        assert_eq!(total_price(15, 1), Ok(15));
        assert_eq!(total_price(20, 3), Ok(60));
        assert!(total_price(u64::MAX, 2).is_err());
    }

    #[test]
    fn adjust_positive_creates_from_absent() {
        assert_eq!(adjust_quantity(0, 3), Ok(3));
    }

    #[test]
    fn adjust_negative_to_zero() {
        assert_eq!(adjust_quantity(5, -5), Ok(0));
    }

    #[test]
    fn adjust_below_zero_rejected() {
        assert_eq!(
            adjust_quantity(3, -5),
            Err(LedgerError::InsufficientQuantity {
                requested: 5,
                available: 3,
            })
        );
    }

    #[test]
    fn adjust_above_u32_rejected() {
        assert!(matches!(
            adjust_quantity(u32::MAX, 1),
            Err(LedgerError::Overflow { .. })
        ));
    }

    #[test]
    fn adjust_handles_extreme_negative_delta() {
        assert!(matches!(
            adjust_quantity(0, i64::MIN),
            Err(LedgerError::InsufficientQuantity { .. })
        ));
    }

    #[test]
    fn affection_only_rises() {
        assert_eq!(raise_affection(0, 5), Ok(5));
        assert_eq!(raise_affection(5, 0), Ok(5));
        assert!(raise_affection(u32::MAX, 1).is_err());
    }
}
