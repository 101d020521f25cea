//! Core business logic module
//!
//! This module contains the concurrent transfer components:
//! - `traits` - Collaborator seams (account lookup, transfer repository, notifications)
//! - `account_store` - Keyed store of shared, lockable accounts
//! - `ledger_store` - Transfer records and the atomic debit/credit step
//! - `engine` - Validation, locking protocol and execution orchestration
//! - `notification` - Fire-and-forget notification sinks
//! - `recovery` - Startup replay of PENDING transfers
//! - `batch_processor` - Concurrent submission of request batches

pub mod account_store;
pub mod batch_processor;
pub mod engine;
pub mod ledger_store;
pub mod notification;
pub mod recovery;
pub mod traits;

pub use account_store::AccountStore;
pub use batch_processor::{BatchProcessor, SubmissionResult};
pub use engine::TransferEngine;
pub use ledger_store::LedgerStore;
pub use notification::LoggingNotifier;
pub use recovery::{recover_pending_transfers, RecoveryReport};
pub use traits::{AccountLookup, NotificationSink, TransferRepository};
