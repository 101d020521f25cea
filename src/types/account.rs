//! Account-related types for the Rust Transfer Engine
//!
//! This module defines the Account structure: a named balance cell that is
//! explicitly lockable. The balance can only be written through a
//! [`BalanceGuard`], and guards are only handed out by the transfer engine's
//! locking protocol.

use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;

/// Account identifier
pub type AccountId = String;

/// Client account
///
/// The id is immutable; the balance lives behind a mutex so that the
/// engine can hold both sides of a transfer exclusively while it moves
/// funds. Accounts are shared as `Arc<Account>` between the account store
/// and every transfer that references them.
#[derive(Debug)]
pub struct Account {
    /// The account id (unique, immutable)
    id: AccountId,

    /// Current balance, never negative between transfers
    balance: Mutex<Decimal>,
}

impl Account {
    /// Create a new account with the given opening balance
    ///
    /// # Arguments
    ///
    /// * `id` - The account id
    /// * `balance` - Opening balance
    pub fn new(id: impl Into<AccountId>, balance: Decimal) -> Self {
        Account {
            id: id.into(),
            balance: Mutex::new(balance),
        }
    }

    /// Create a new account with a zero balance
    pub fn empty(id: impl Into<AccountId>) -> Self {
        Self::new(id, Decimal::ZERO)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Read the current balance
    ///
    /// Takes the account lock briefly, so the value is never torn, but it is
    /// only a snapshot: a concurrent transfer may change it right after.
    /// Blocks while a transfer holds this account.
    pub fn balance(&self) -> Decimal {
        *self.balance.lock()
    }

    /// Take a snapshot suitable for reporting
    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            id: self.id.clone(),
            balance: self.balance(),
        }
    }

    /// Acquire this account's lock
    ///
    /// Blocks until the lock is free. Only the engine's locking protocol may
    /// call this for a transfer; see `TransferEngine::make_transfer`.
    pub(crate) fn lock(&self) -> BalanceGuard<'_> {
        BalanceGuard {
            account_id: &self.id,
            balance: self.balance.lock(),
        }
    }
}

/// Exclusive access to one account's balance
///
/// Holding a guard is proof that the account is locked. The lock is
/// released when the guard is dropped, on every exit path.
#[derive(Debug)]
pub struct BalanceGuard<'a> {
    account_id: &'a str,
    balance: MutexGuard<'a, Decimal>,
}

impl BalanceGuard<'_> {
    pub fn account_id(&self) -> &str {
        self.account_id
    }

    pub fn balance(&self) -> Decimal {
        *self.balance
    }

    /// Overwrite the balance
    ///
    /// Callers compute both sides of a transfer before writing either one,
    /// so a failed check never leaves a half-applied transfer behind.
    pub fn set_balance(&mut self, balance: Decimal) {
        *self.balance = balance;
    }
}

/// Point-in-time copy of an account, used for output and assertions
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub balance: Decimal,
}
