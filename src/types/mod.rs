//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Lockable account balance cells
//! - `transfer`: Transfer requests, records and lifecycle states
//! - `error`: Error types for the transfer engine

pub mod account;
pub mod error;
pub mod transfer;

pub use account::{Account, AccountId, AccountSnapshot, BalanceGuard};
pub use error::{ExecutionError, TransferError};
pub use transfer::{NewTransfer, Transfer, TransferId, TransferRequest, TransferState};
