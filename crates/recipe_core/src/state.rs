//! In-memory asset ledger the recipe engine executes against
//!
//! Protocol effects are modeled as balance movements on this book. The
//! executor clones the ledger before running a recipe and commits the
//! scratch copy only when every step succeeded, which is what gives the
//! engine its all-or-nothing semantics.

use crate::types::{Address, TokenAmount};
use std::collections::HashMap;
use thiserror::Error;

/// Ledger bookkeeping errors
#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum LedgerError {
    /// Holder does not own enough of the token
    #[error("insufficient balance for {holder} in token {token}: required {required}, available {available}")]
    InsufficientBalance {
        /// Account being debited
        holder: Address,
        /// Token being moved
        token: Address,
        /// Amount requested
        required: TokenAmount,
        /// Amount actually held
        available: TokenAmount,
    },

    /// A credit would overflow the holder's balance
    #[error("balance overflow for {holder} in token {token}")]
    BalanceOverflow {
        /// Account being credited
        holder: Address,
        /// Token being moved
        token: Address,
    },
}

/// Holder → token → balance book
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    balances: HashMap<(Address, Address), TokenAmount>,
}

impl Ledger {
    /// Create an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance held by `holder` in `token`
    #[must_use]
    pub fn balance_of(&self, holder: Address, token: Address) -> TokenAmount {
        self.balances.get(&(holder, token)).copied().unwrap_or(0)
    }

    /// Credit `amount` of `token` to `holder`
    ///
    /// # Errors
    ///
    /// Returns error if the credit would overflow the balance
    pub fn deposit(
        &mut self,
        holder: Address,
        token: Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        let entry = self.balances.entry((holder, token)).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow { holder, token })?;
        Ok(())
    }

    /// Debit `amount` of `token` from `holder`
    ///
    /// # Errors
    ///
    /// Returns error if the holder does not own `amount`
    pub fn withdraw(
        &mut self,
        holder: Address,
        token: Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(holder, token);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                holder,
                token,
                required: amount,
                available,
            });
        }
        self.balances.insert((holder, token), available - amount);
        Ok(())
    }

    /// Move `amount` of `token` from `from` to `to`
    ///
    /// # Errors
    ///
    /// Returns error if `from` does not own `amount`
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        token: Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        self.withdraw(from, token, amount)?;
        self.deposit(to, token, amount)
    }
}
