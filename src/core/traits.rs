//! Core traits for account lookup, transfer storage and notifications
//!
//! These are the seams between the transfer engine and its collaborators.
//! The engine only ever talks to them through these traits, so the in-memory
//! stores shipped with this crate can be swapped for other implementations.

use crate::types::{
    Account, BalanceGuard, ExecutionError, NewTransfer, Transfer, TransferId, TransferState,
};
use std::sync::Arc;

/// Resolves account ids to the canonical shared account
///
/// Implementations must return the *same* `Arc<Account>` for repeated
/// lookups of one id: the locking protocol locks that instance, and a copy
/// would carry a different lock.
pub trait AccountLookup: Send + Sync {
    /// Get the account for `id`, or `None` if it does not exist
    fn get_account(&self, id: &str) -> Option<Arc<Account>>;
}

/// Best-effort delivery of account notifications
///
/// The engine calls this after a transfer completed and both account locks
/// were released. Nothing is returned: delivery problems are the sink's own
/// business and never change a transfer's outcome. A sink that panics is
/// caught and logged by the engine.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, account: &Account, message: &str);
}

/// Keyed persistence for transfers
///
/// Owns the atomic debit/credit step. The store never locks accounts
/// itself; `execute_transfer` takes both accounts' guards, so a caller
/// cannot reach it without holding the locks.
pub trait TransferRepository: Send + Sync {
    /// Assign an id and creation timestamp, persist, and return the PENDING record
    fn create_transfer(&self, transfer: NewTransfer) -> Transfer;

    /// All transfers currently in `state`, in no particular order
    fn find_by_state(&self, state: TransferState) -> Vec<Transfer>;

    /// A single transfer by id
    fn find_by_id(&self, id: TransferId) -> Option<Transfer>;

    /// Move the funds and mark the transfer COMPLETED
    ///
    /// # Arguments
    ///
    /// * `transfer` - The transfer to execute; its state becomes `Completed` on success
    /// * `from` - Guard over `transfer.account_from`
    /// * `to` - Guard over `transfer.account_to`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Both balances and the stored record were updated
    /// * `Err(ExecutionError)` - Nothing was modified
    fn execute_transfer(
        &self,
        transfer: &mut Transfer,
        from: &mut BalanceGuard<'_>,
        to: &mut BalanceGuard<'_>,
    ) -> Result<(), ExecutionError>;

    /// Persist the record's current state unconditionally
    fn save(&self, transfer: &Transfer);

    /// Remove every transfer (test/reset only)
    fn clear_transfers(&self);

    /// Number of persisted transfers
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
