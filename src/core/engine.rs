//! Transfer processing orchestration
//!
//! This module provides the `TransferEngine` struct, which validates
//! transfer requests, runs the locking protocol around the ledger store's
//! atomic execution step, and notifies both parties afterwards.
//!
//! # Architecture
//!
//! ```text
//! TransferEngine
//!     ├── Arc<dyn AccountLookup>       (canonical shared accounts)
//!     ├── Arc<dyn TransferRepository>  (transfer records + atomic execution)
//!     ├── Arc<dyn NotificationSink>    (fire-and-forget notifications)
//!     └── Arc<Mutex<()>>               (arbitration lock)
//! ```
//!
//! # Locking protocol
//!
//! Locking `from` then `to` independently deadlocks when A→B and B→A run at
//! the same time. Instead every transfer:
//!
//! 1. takes the engine-wide arbitration lock,
//! 2. locks `account_from`, then `account_to`,
//! 3. releases the arbitration lock,
//! 4. executes the transfer while holding both account locks,
//! 5. releases both account locks (guards drop on every exit path).
//!
//! Only one transfer can be acquiring its pair at any time, and a transfer
//! that holds both of its locks never waits for anything else, so no cycle
//! of waiting transfers can form. The arbitration lock is not held during
//! execution, which keeps transfers on unrelated accounts running in
//! parallel.
//!
//! # Lifecycle
//!
//! The arbitration lock is created with the engine and shared by all of its
//! clones; it lives as long as the last clone. Engines built separately
//! over the same accounts do not share it, so all callers must go through
//! one engine (cloned as needed).

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::core::traits::{AccountLookup, NotificationSink, TransferRepository};
use crate::types::{
    Account, BalanceGuard, NewTransfer, Transfer, TransferError, TransferId, TransferRequest,
    TransferState,
};

/// Concurrent transfer orchestrator
///
/// Cheap to clone; clones share the collaborators and the arbitration lock
/// and can be handed to any number of worker threads.
#[derive(Clone)]
pub struct TransferEngine {
    /// Account lookup collaborator
    accounts: Arc<dyn AccountLookup>,

    /// Transfer persistence and atomic execution
    ledger: Arc<dyn TransferRepository>,

    /// Notification delivery
    notifier: Arc<dyn NotificationSink>,

    /// Serializes acquisition of account lock pairs
    arbiter: Arc<Mutex<()>>,
}

impl TransferEngine {
    /// Create a new TransferEngine
    ///
    /// # Arguments
    ///
    /// * `accounts` - Resolves account ids to the shared account instances
    /// * `ledger` - Stores transfers and performs the atomic balance update
    /// * `notifier` - Receives a message for each party of a completed transfer
    pub fn new(
        accounts: Arc<dyn AccountLookup>,
        ledger: Arc<dyn TransferRepository>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            accounts,
            ledger,
            notifier,
            arbiter: Arc::new(Mutex::new(())),
        }
    }

    /// Validate, persist and execute a new transfer
    ///
    /// # Arguments
    ///
    /// * `request` - Source and destination ids and the amount to move
    ///
    /// # Returns
    ///
    /// * `Ok(Transfer)` - The COMPLETED transfer record
    /// * `Err(TransferError::SameAccount)` - Both ids are equal; nothing persisted
    /// * `Err(TransferError::AccountNotFound)` - An id did not resolve; nothing persisted
    /// * `Err(TransferError::InvalidAmount)` - Amount is not positive; nothing persisted
    /// * `Err(TransferError::TransferRejected)` - Execution failed; the record is FAILED
    pub fn create_transfer(&self, request: &TransferRequest) -> Result<Transfer, TransferError> {
        info!(
            from = %request.account_from_id,
            to = %request.account_to_id,
            amount = %request.amount,
            "Creating transfer"
        );

        if request.account_from_id == request.account_to_id {
            return Err(TransferError::same_account(&request.account_from_id));
        }

        let account_from = self.resolve_account(&request.account_from_id)?;
        let account_to = self.resolve_account(&request.account_to_id)?;

        if request.amount <= Decimal::ZERO {
            return Err(TransferError::invalid_amount(request.amount));
        }

        let mut transfer = self.ledger.create_transfer(NewTransfer {
            account_from,
            account_to,
            amount: request.amount,
        });

        self.make_transfer(&mut transfer)?;
        Ok(transfer)
    }

    /// Execute a persisted PENDING transfer
    ///
    /// The single execution entry point, used both right after intake and by
    /// the recovery sweep. On success the transfer is COMPLETED and both
    /// parties are notified once the account locks are released. On
    /// execution failure the transfer is saved as FAILED before the error is
    /// returned, and nobody is notified.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Funds moved, `transfer.state` is `Completed`
    /// * `Err(TransferError::NotPending)` - The transfer already finished, either
    ///   in this copy or in the stored record
    /// * `Err(TransferError::SameAccount)` - Both ends are one account
    /// * `Err(TransferError::TransferRejected)` - Execution failed, `transfer.state` is `Failed`
    pub fn make_transfer(&self, transfer: &mut Transfer) -> Result<(), TransferError> {
        if transfer.state.is_terminal() {
            return Err(TransferError::not_pending(transfer.id, transfer.state));
        }
        if transfer.is_self_transfer() {
            return Err(TransferError::same_account(transfer.account_from_id()));
        }

        // Own handles, so the guards don't borrow `transfer` while the
        // ledger updates it
        let account_from = Arc::clone(&transfer.account_from);
        let account_to = Arc::clone(&transfer.account_to);

        {
            let (mut from, mut to) = self.lock_pair(&account_from, &account_to);

            if let Err(reason) = self.ledger.execute_transfer(transfer, &mut from, &mut to) {
                // Another holder of this record finished it first
                if let Some(state) = self.stored_terminal_state(transfer.id) {
                    transfer.state = state;
                    return Err(TransferError::not_pending(transfer.id, state));
                }

                transfer.state = TransferState::Failed;
                self.ledger.save(transfer);
                warn!(
                    transfer_id = transfer.id,
                    reason = %reason,
                    "Transfer with ID {} NOT successful",
                    transfer.id
                );
                return Err(TransferError::transfer_rejected(transfer.id, reason));
            }
        }

        info!(transfer_id = transfer.id, "Transfer with ID {} successful", transfer.id);
        self.notify_parties(transfer);
        Ok(())
    }

    /// All transfers still waiting to be executed
    pub fn find_pending_transfers(&self) -> Vec<Transfer> {
        self.ledger.find_by_state(TransferState::Pending)
    }

    fn stored_terminal_state(&self, id: TransferId) -> Option<TransferState> {
        self.ledger
            .find_by_id(id)
            .map(|stored| stored.state)
            .filter(TransferState::is_terminal)
    }

    fn resolve_account(&self, account_id: &str) -> Result<Arc<Account>, TransferError> {
        self.accounts
            .get_account(account_id)
            .ok_or_else(|| TransferError::account_not_found(account_id))
    }

    /// Acquire both account locks under the arbitration lock
    ///
    /// The arbitration guard is dropped before returning; the caller keeps
    /// only the two account guards.
    fn lock_pair<'a>(
        &self,
        from: &'a Account,
        to: &'a Account,
    ) -> (BalanceGuard<'a>, BalanceGuard<'a>) {
        let arbitration = self.arbiter.lock();
        let from_guard = from.lock();
        let to_guard = to.lock();
        drop(arbitration);

        debug!(from = from.id(), to = to.id(), "account pair locked");
        (from_guard, to_guard)
    }

    fn notify_parties(&self, transfer: &Transfer) {
        self.deliver(
            &transfer.account_from,
            &format!(
                "Sent {} to account {}",
                transfer.amount,
                transfer.account_to_id()
            ),
        );
        self.deliver(
            &transfer.account_to,
            &format!(
                "Received {} from account {}",
                transfer.amount,
                transfer.account_from_id()
            ),
        );
    }

    // The transfer is already COMPLETED; a failing sink must not turn that
    // into a panic for the caller
    fn deliver(&self, account: &Account, message: &str) {
        let delivered = panic::catch_unwind(AssertUnwindSafe(|| {
            self.notifier.notify(account, message)
        }));
        if delivered.is_err() {
            warn!(account_id = account.id(), "Notification delivery failed");
        }
    }
}

impl fmt::Debug for TransferEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferEngine")
            .field("transfers", &self.ledger.len())
            .finish_non_exhaustive()
    }
}
