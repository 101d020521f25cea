//! Rust Transfer Engine Library
//! # Overview
//!
//! This library moves funds between in-memory accounts with many transfers
//! running at once, and ships a CSV-driven runner with a sync and an async
//! strategy.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, Transfer, errors)
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Validation, the locking protocol, execution
//!   - [`core::ledger_store`] - Transfer records and the atomic debit/credit
//!   - [`core::account_store`] - Shared, individually lockable accounts
//!   - [`core::recovery`] - Startup replay of PENDING transfers
//! - [`io`] - CSV input and output
//! - [`strategy`] - Sequential or batched concurrent submission
//! - [`cli`] - CLI arguments parsing
//! - [`logging`] - tracing subscriber setup
//!
//! # Transfer lifecycle
//!
//! A request that passes validation is persisted as **PENDING**, then
//! executed under both account locks. It ends **COMPLETED** when the funds
//! moved, or **FAILED** when execution refused it (insufficient funds).
//! Requests refused by validation (same account, unknown account,
//! non-positive amount) leave no record.
//!
//! # Example
//!
//! ```
//! use rust_transfer_engine::{
//!     Account, AccountStore, LedgerStore, LoggingNotifier, TransferEngine, TransferRequest,
//! };
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! let accounts = Arc::new(AccountStore::new());
//! accounts.create_account(Account::new("A", Decimal::from(100))).unwrap();
//! accounts.create_account(Account::new("B", Decimal::from(100))).unwrap();
//!
//! let engine = TransferEngine::new(
//!     accounts.clone(),
//!     Arc::new(LedgerStore::new()),
//!     Arc::new(LoggingNotifier),
//! );
//! engine
//!     .create_transfer(&TransferRequest::new("A", "B", Decimal::from(50)))
//!     .unwrap();
//!
//! assert_eq!(accounts.total_balance(), Decimal::from(200));
//! ```

pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use core::{
    recover_pending_transfers, AccountLookup, AccountStore, LedgerStore, LoggingNotifier,
    NotificationSink, RecoveryReport, TransferEngine, TransferRepository,
};
pub use io::write_accounts_csv;
pub use types::{
    Account, AccountId, AccountSnapshot, ExecutionError, Transfer, TransferError, TransferId,
    TransferRequest, TransferState,
};
