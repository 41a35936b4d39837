//! # Balance Ledger
//!
//! Per-agent balances only move through [`credit`] (deposit) and [`debit`]
//! (withdrawal). [`LedgerTotals`] tracks the aggregate flow so conservation can
//! be audited: the sum of balances always equals `deposited - withdrawn`.

use crate::domain::value_objects::U256;
use serde::{Deserialize, Serialize};

/// Why a ledger primitive refused to move value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerError {
    /// Debit larger than the available balance.
    Insufficient {
        /// Amount asked for.
        requested: U256,
        /// Amount held.
        available: U256,
    },
    /// Credit would exceed the 256-bit range.
    Overflow,
}

/// Returns `balance + amount`.
///
/// # Errors
///
/// [`LedgerError::Overflow`] if the sum does not fit.
pub fn credit(balance: U256, amount: U256) -> Result<U256, LedgerError> {
    balance.checked_add(amount).ok_or(LedgerError::Overflow)
}

/// Returns `balance - amount`.
///
/// # Errors
///
/// [`LedgerError::Insufficient`] if `amount > balance`; the balance never goes negative.
pub fn debit(balance: U256, amount: U256) -> Result<U256, LedgerError> {
    balance
        .checked_sub(amount)
        .ok_or(LedgerError::Insufficient {
            requested: amount,
            available: balance,
        })
}

/// Aggregate value that entered and left the ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    /// Sum of all deposits ever accepted.
    pub deposited: U256,
    /// Sum of all withdrawals currently debited (in-flight ones included).
    pub withdrawn: U256,
}

impl LedgerTotals {
    /// Value the ledger should currently hold.
    #[must_use]
    pub fn expected_holdings(&self) -> Option<U256> {
        self.deposited.checked_sub(self.withdrawn)
    }

    /// Records a deposit.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Overflow`] if the running total does not fit.
    pub fn record_deposit(&mut self, amount: U256) -> Result<(), LedgerError> {
        self.deposited = credit(self.deposited, amount)?;
        Ok(())
    }

    /// Records a withdrawal debit.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Overflow`] if the running total does not fit.
    pub fn record_withdrawal(&mut self, amount: U256) -> Result<(), LedgerError> {
        self.withdrawn = credit(self.withdrawn, amount)?;
        Ok(())
    }

    /// Reverses a withdrawal debit after a failed payout.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Insufficient`] if more is reversed than was recorded.
    pub fn reverse_withdrawal(&mut self, amount: U256) -> Result<(), LedgerError> {
        self.withdrawn = debit(self.withdrawn, amount)?;
        Ok(())
    }
}
