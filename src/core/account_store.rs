//! Thread-safe account storage
//!
//! This module provides the `AccountStore` struct, the keyed store that owns
//! every account and hands out shared references to them.
//!
//! # Design
//!
//! The `AccountStore` uses `DashMap` (a concurrent HashMap) keyed by account
//! id, with each value an `Arc<Account>`. The map's own sharded locks only
//! protect the map structure; balances are protected by each account's own
//! mutex, which the transfer engine takes through its locking protocol.
//!
//! # Identity
//!
//! Lookups return a clone of the stored `Arc`, never a copy of the account.
//! Every caller asking for the same id therefore locks the same mutex.

use crate::core::traits::AccountLookup;
use crate::types::{Account, AccountSnapshot, TransferError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Thread-safe account store
///
/// All methods are safe to call from multiple threads concurrently.
#[derive(Debug, Default)]
pub struct AccountStore {
    /// Accounts by id
    accounts: DashMap<String, Arc<Account>>,
}

impl AccountStore {
    /// Create a new empty AccountStore
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Register a new account
    ///
    /// # Arguments
    ///
    /// * `account` - The account to add
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<Account>)` - The shared handle now owned by the store
    /// * `Err(TransferError::DuplicateAccount)` - If the id is already taken;
    ///   the existing account is left untouched
    pub fn create_account(&self, account: Account) -> Result<Arc<Account>, TransferError> {
        match self.accounts.entry(account.id().to_string()) {
            Entry::Occupied(_) => Err(TransferError::duplicate_account(account.id())),
            Entry::Vacant(entry) => {
                let account = Arc::new(account);
                entry.insert(Arc::clone(&account));
                Ok(account)
            }
        }
    }

    /// Snapshots of all accounts, in arbitrary order
    ///
    /// Each snapshot is individually consistent; taken while transfers are
    /// running, the set as a whole may straddle a transfer.
    pub fn snapshots(&self) -> Vec<AccountSnapshot> {
        self.handles()
            .iter()
            .map(|account| account.snapshot())
            .collect()
    }

    /// Sum of every balance
    ///
    /// Only meaningful at a quiescent point (no transfer in flight).
    pub fn total_balance(&self) -> Decimal {
        self.handles()
            .iter()
            .map(|account| account.balance())
            .sum()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Remove every account (test/reset only)
    pub fn clear_accounts(&self) {
        self.accounts.clear();
    }

    // Collect the handles first so no map shard stays locked while we wait
    // on an account mutex held by a running transfer.
    fn handles(&self) -> Vec<Arc<Account>> {
        self.accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }
}

impl AccountLookup for AccountStore {
    fn get_account(&self, id: &str) -> Option<Arc<Account>> {
        self.accounts.get(id).map(|entry| Arc::clone(entry.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get_account() {
        let store = AccountStore::new();

        store
            .create_account(Account::new("acc-001", Decimal::from(100)))
            .unwrap();

        let account = store.get_account("acc-001").unwrap();
        assert_eq!(account.id(), "acc-001");
        assert_eq!(account.balance(), Decimal::from(100));
    }

    #[test]
    fn test_get_nonexistent_account() {
        let store = AccountStore::new();
        assert!(store.get_account("acc-404").is_none());
    }

    #[test]
    fn test_create_duplicate_account_fails() {
        let store = AccountStore::new();

        store
            .create_account(Account::new("acc-001", Decimal::from(100)))
            .unwrap();
        let result = store.create_account(Account::new("acc-001", Decimal::from(5)));

        assert_eq!(result.unwrap_err(), TransferError::duplicate_account("acc-001"));
        // The original account is untouched
        assert_eq!(
            store.get_account("acc-001").unwrap().balance(),
            Decimal::from(100)
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_lookups_return_the_same_instance() {
        let store = AccountStore::new();
        let created = store.create_account(Account::empty("acc-001")).unwrap();

        let first = store.get_account("acc-001").unwrap();
        let second = store.get_account("acc-001").unwrap();

        assert!(Arc::ptr_eq(&created, &first));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_snapshots_and_total_balance() {
        let store = AccountStore::new();
        store
            .create_account(Account::new("a", Decimal::new(1050, 2)))
            .unwrap();
        store
            .create_account(Account::new("b", Decimal::new(2025, 2)))
            .unwrap();

        let mut snapshots = store.snapshots();
        snapshots.sort_by(|x, y| x.id.cmp(&y.id));

        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].id, "a");
        assert_eq!(snapshots[0].balance, Decimal::new(1050, 2));
        assert_eq!(snapshots[1].id, "b");
        assert_eq!(store.total_balance(), Decimal::new(3075, 2));
    }

    #[test]
    fn test_clear_accounts() {
        let store = AccountStore::new();
        store.create_account(Account::empty("a")).unwrap();
        store.create_account(Account::empty("b")).unwrap();

        store.clear_accounts();

        assert!(store.is_empty());
        assert!(store.get_account("a").is_none());
    }

    #[test]
    fn test_concurrent_create_same_account() {
        use std::thread;

        let store = Arc::new(AccountStore::new());
        let mut handles = vec![];

        // Spawn 10 threads, all trying to create the same account
        for _ in 0..10 {
            let store_clone = Arc::clone(&store);
            let handle = thread::spawn(move || {
                store_clone
                    .create_account(Account::new("acc-001", Decimal::from(100)))
                    .is_ok()
            });
            handles.push(handle);
        }

        let created: usize = handles
            .into_iter()
            .map(|handle| usize::from(handle.join().unwrap()))
            .sum();

        // Exactly one creation wins
        assert_eq!(created, 1);
        assert_eq!(store.len(), 1);
    }
}
