//! In-memory ledger of transfers
//!
//! This module provides the `LedgerStore` struct, the default
//! [`TransferRepository`]. It keeps every transfer record keyed by id and
//! owns the atomic debit/credit step.
//!
//! # Design
//!
//! Records live in a `DashMap`, so reads and writes of different transfers
//! proceed in parallel. Ids come from an `AtomicU64`, which keeps them unique
//! and increasing without a lock.
//!
//! # Atomicity
//!
//! `execute_transfer` runs while the caller holds both account guards. It
//! reads the source balance once, computes both new balances, and writes
//! them only after every check passed. Other threads can only observe the
//! balances once the guards are released, by which point both sides and the
//! record's COMPLETED state are in place.
//!
//! Callers work on clones of the stored record. `execute_transfer` checks
//! the stored state before touching any balance, so two holders of the same
//! PENDING record cannot both execute it.

use crate::core::traits::TransferRepository;
use crate::types::{
    BalanceGuard, ExecutionError, NewTransfer, Transfer, TransferId, TransferState,
};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Thread-safe in-memory transfer ledger
#[derive(Debug)]
pub struct LedgerStore {
    /// Transfer records by id
    transfers: DashMap<TransferId, Transfer>,

    /// Next id to hand out
    next_id: AtomicU64,
}

impl LedgerStore {
    /// Create a new empty LedgerStore
    ///
    /// Ids start at 1.
    pub fn new() -> Self {
        Self {
            transfers: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferRepository for LedgerStore {
    fn create_transfer(&self, transfer: NewTransfer) -> Transfer {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let record = Transfer::pending(id, transfer, Utc::now());
        self.transfers.insert(id, record.clone());

        debug!(
            transfer_id = id,
            from = record.account_from_id(),
            to = record.account_to_id(),
            amount = %record.amount,
            "transfer persisted as pending"
        );
        record
    }

    fn find_by_state(&self, state: TransferState) -> Vec<Transfer> {
        self.transfers
            .iter()
            .filter(|entry| entry.value().state == state)
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn find_by_id(&self, id: TransferId) -> Option<Transfer> {
        self.transfers.get(&id).map(|entry| entry.value().clone())
    }

    fn execute_transfer(
        &self,
        transfer: &mut Transfer,
        from: &mut BalanceGuard<'_>,
        to: &mut BalanceGuard<'_>,
    ) -> Result<(), ExecutionError> {
        // The caller's copy may be stale; the stored record decides
        let stored_state = self.transfers.get(&transfer.id).map(|entry| entry.value().state);
        if let Some(state) = stored_state.filter(TransferState::is_terminal) {
            return Err(ExecutionError::already_finished(transfer.id, state));
        }

        let amount = transfer.amount;
        let from_balance = from.balance();

        if from_balance < amount {
            return Err(ExecutionError::insufficient_funds(
                from.account_id(),
                from_balance,
                amount,
            ));
        }

        // Both sides are computed before either is written
        let new_from = from_balance - amount;
        let new_to = to
            .balance()
            .checked_add(amount)
            .ok_or_else(|| ExecutionError::arithmetic_overflow(to.account_id()))?;

        from.set_balance(new_from);
        to.set_balance(new_to);
        transfer.state = TransferState::Completed;
        self.save(transfer);

        Ok(())
    }

    fn save(&self, transfer: &Transfer) {
        self.transfers.insert(transfer.id, transfer.clone());
    }

    fn clear_transfers(&self) {
        self.transfers.clear();
    }

    fn len(&self) -> usize {
        self.transfers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Account;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn new_transfer(from: &Arc<Account>, to: &Arc<Account>, amount: Decimal) -> NewTransfer {
        NewTransfer {
            account_from: Arc::clone(from),
            account_to: Arc::clone(to),
            amount,
        }
    }

    fn accounts(from_balance: i64, to_balance: i64) -> (Arc<Account>, Arc<Account>) {
        (
            Arc::new(Account::new("acc-001", Decimal::from(from_balance))),
            Arc::new(Account::new("acc-002", Decimal::from(to_balance))),
        )
    }

    #[test]
    fn test_create_transfer_assigns_increasing_ids() {
        let store = LedgerStore::new();
        let (a, b) = accounts(100, 100);

        let first = store.create_transfer(new_transfer(&a, &b, Decimal::from(10)));
        let second = store.create_transfer(new_transfer(&b, &a, Decimal::from(20)));

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(second.created_at >= first.created_at);
        assert_eq!(first.state, TransferState::Pending);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_create_transfer_has_no_balance_side_effects() {
        let store = LedgerStore::new();
        let (a, b) = accounts(100, 100);

        store.create_transfer(new_transfer(&a, &b, Decimal::from(60)));

        assert_eq!(a.balance(), Decimal::from(100));
        assert_eq!(b.balance(), Decimal::from(100));
    }

    #[test]
    fn test_find_by_state_filters_records() {
        let store = LedgerStore::new();
        let (a, b) = accounts(100, 100);

        let mut completed = store.create_transfer(new_transfer(&a, &b, Decimal::from(1)));
        let pending = store.create_transfer(new_transfer(&a, &b, Decimal::from(2)));
        let mut failed = store.create_transfer(new_transfer(&a, &b, Decimal::from(3)));

        completed.state = TransferState::Completed;
        store.save(&completed);
        failed.state = TransferState::Failed;
        store.save(&failed);

        let found = store.find_by_state(TransferState::Pending);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, pending.id);

        assert_eq!(store.find_by_state(TransferState::Completed).len(), 1);
        assert_eq!(store.find_by_state(TransferState::Failed).len(), 1);
    }

    #[test]
    fn test_find_by_id() {
        let store = LedgerStore::new();
        let (a, b) = accounts(100, 100);

        let created = store.create_transfer(new_transfer(&a, &b, Decimal::from(5)));

        let found = store.find_by_id(created.id).unwrap();
        assert_eq!(found.amount, Decimal::from(5));
        assert!(store.find_by_id(999).is_none());
    }

    #[rstest]
    #[case::partial(100, 100, 50, 50, 150)]
    #[case::whole_balance(100, 100, 100, 0, 200)]
    #[case::into_empty_account(100, 0, 1, 99, 1)]
    fn test_execute_transfer_moves_funds(
        #[case] from_balance: i64,
        #[case] to_balance: i64,
        #[case] amount: i64,
        #[case] expected_from: i64,
        #[case] expected_to: i64,
    ) {
        let store = LedgerStore::new();
        let (a, b) = accounts(from_balance, to_balance);
        let mut transfer = store.create_transfer(new_transfer(&a, &b, Decimal::from(amount)));

        {
            let mut from = a.lock();
            let mut to = b.lock();
            store
                .execute_transfer(&mut transfer, &mut from, &mut to)
                .unwrap();
        }

        assert_eq!(a.balance(), Decimal::from(expected_from));
        assert_eq!(b.balance(), Decimal::from(expected_to));
        assert_eq!(transfer.state, TransferState::Completed);
        // The stored record reflects the completion
        assert_eq!(
            store.find_by_id(transfer.id).unwrap().state,
            TransferState::Completed
        );
    }

    #[test]
    fn test_execute_transfer_insufficient_funds_changes_nothing() {
        let store = LedgerStore::new();
        let (a, b) = accounts(100, 100);
        let mut transfer = store.create_transfer(new_transfer(&a, &b, Decimal::from(101)));

        let result = {
            let mut from = a.lock();
            let mut to = b.lock();
            store.execute_transfer(&mut transfer, &mut from, &mut to)
        };

        assert_eq!(
            result.unwrap_err(),
            ExecutionError::insufficient_funds("acc-001", Decimal::from(100), Decimal::from(101))
        );
        assert_eq!(a.balance(), Decimal::from(100));
        assert_eq!(b.balance(), Decimal::from(100));
        assert_eq!(transfer.state, TransferState::Pending);
        assert_eq!(
            store.find_by_id(transfer.id).unwrap().state,
            TransferState::Pending
        );
    }

    #[test]
    fn test_execute_transfer_overflow_changes_nothing() {
        let store = LedgerStore::new();
        let a = Arc::new(Account::new("acc-001", Decimal::from(10)));
        let b = Arc::new(Account::new("acc-002", Decimal::MAX));
        let mut transfer = store.create_transfer(new_transfer(&a, &b, Decimal::from(1)));

        let result = {
            let mut from = a.lock();
            let mut to = b.lock();
            store.execute_transfer(&mut transfer, &mut from, &mut to)
        };

        assert_eq!(
            result.unwrap_err(),
            ExecutionError::arithmetic_overflow("acc-002")
        );
        assert_eq!(a.balance(), Decimal::from(10));
        assert_eq!(b.balance(), Decimal::MAX);
    }

    #[rstest]
    #[case::completed(TransferState::Completed)]
    #[case::failed(TransferState::Failed)]
    fn test_execute_transfer_refuses_stale_copy_of_finished_record(
        #[case] stored_state: TransferState,
    ) {
        let store = LedgerStore::new();
        let (a, b) = accounts(100, 100);
        let mut stale = store.create_transfer(new_transfer(&a, &b, Decimal::from(30)));
        let mut finished = stale.clone();
        finished.state = stored_state;
        store.save(&finished);

        let result = {
            let mut from = a.lock();
            let mut to = b.lock();
            store.execute_transfer(&mut stale, &mut from, &mut to)
        };

        assert_eq!(
            result.unwrap_err(),
            ExecutionError::already_finished(stale.id, stored_state)
        );
        assert_eq!(a.balance(), Decimal::from(100));
        assert_eq!(b.balance(), Decimal::from(100));
        assert_eq!(store.find_by_id(stale.id).unwrap().state, stored_state);
    }

    #[test]
    fn test_clear_transfers() {
        let store = LedgerStore::new();
        let (a, b) = accounts(100, 100);
        store.create_transfer(new_transfer(&a, &b, Decimal::from(1)));
        store.create_transfer(new_transfer(&a, &b, Decimal::from(2)));

        store.clear_transfers();

        assert!(store.is_empty());
        assert!(store.find_by_state(TransferState::Pending).is_empty());
    }

    #[test]
    fn test_concurrent_create_transfer_ids_are_unique() {
        use std::collections::HashSet;
        use std::thread;

        let store = Arc::new(LedgerStore::new());
        let (a, b) = accounts(100, 100);
        let mut handles = vec![];

        for _ in 0..8 {
            let store_clone = Arc::clone(&store);
            let (a, b) = (Arc::clone(&a), Arc::clone(&b));
            handles.push(thread::spawn(move || {
                (0..50)
                    .map(|_| {
                        store_clone
                            .create_transfer(new_transfer(&a, &b, Decimal::ONE))
                            .id
                    })
                    .collect::<Vec<_>>()
            }));
        }

        let ids: HashSet<TransferId> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(ids.len(), 400);
        assert_eq!(store.len(), 400);
    }
}
