//! Transfer-related types for the Rust Transfer Engine
//!
//! This module defines the transfer request accepted at intake, the
//! not-yet-persisted transfer built by the engine, and the persisted
//! transfer record with its lifecycle state.

use super::account::{Account, AccountId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Transfer identifier
///
/// Assigned by the ledger store, strictly increasing from 1.
pub type TransferId = u64;

/// Lifecycle state of a transfer
///
/// `Pending` is the only non-terminal state and the only one the recovery
/// sweep will replay. `Completed` and `Failed` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransferState {
    /// Accepted and persisted, not yet executed
    Pending,

    /// Funds moved; both balances updated
    Completed,

    /// Execution was rejected; balances untouched
    Failed,
}

impl TransferState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransferState::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Pending => "PENDING",
            TransferState::Completed => "COMPLETED",
            TransferState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transfer request as received at the boundary
///
/// Carries account ids only; the engine resolves them to the canonical
/// accounts before anything is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub account_from_id: AccountId,
    pub account_to_id: AccountId,
    pub amount: Decimal,
}

impl TransferRequest {
    pub fn new(
        account_from_id: impl Into<AccountId>,
        account_to_id: impl Into<AccountId>,
        amount: Decimal,
    ) -> Self {
        TransferRequest {
            account_from_id: account_from_id.into(),
            account_to_id: account_to_id.into(),
            amount,
        }
    }
}

/// Validated transfer intent, not yet persisted
///
/// Built by the engine after both accounts resolved. Handing it to
/// `TransferRepository::create_transfer` is the only way to obtain a
/// [`Transfer`], which guarantees every record has a store-assigned id.
#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub account_from: Arc<Account>,
    pub account_to: Arc<Account>,
    pub amount: Decimal,
}

/// Persisted transfer record
///
/// `account_from` and `account_to` are shared references to the canonical
/// accounts, so balance changes made through the locking protocol are
/// visible through any copy of the record.
#[derive(Debug, Clone)]
pub struct Transfer {
    pub id: TransferId,
    pub account_from: Arc<Account>,
    pub account_to: Arc<Account>,
    pub amount: Decimal,
    pub state: TransferState,
    pub created_at: DateTime<Utc>,
}

impl Transfer {
    /// Build the pending record for a new transfer
    ///
    /// Used by ledger stores when they assign the id and timestamp.
    pub fn pending(id: TransferId, transfer: NewTransfer, created_at: DateTime<Utc>) -> Self {
        Transfer {
            id,
            account_from: transfer.account_from,
            account_to: transfer.account_to,
            amount: transfer.amount,
            state: TransferState::Pending,
            created_at,
        }
    }

    pub fn account_from_id(&self) -> &str {
        self.account_from.id()
    }

    pub fn account_to_id(&self) -> &str {
        self.account_to.id()
    }

    /// True when both ends point at the same account
    ///
    /// Checked by identity as well as by id: locking such a transfer would
    /// take the same lock twice.
    pub fn is_self_transfer(&self) -> bool {
        Arc::ptr_eq(&self.account_from, &self.account_to)
            || self.account_from.id() == self.account_to.id()
    }
}
