//! Error types for the Rust Transfer Engine
//!
//! Errors are split by the layer that raises them, because callers need to
//! tell the two apart:
//!
//! - **Validation errors** (`SameAccount`, `AccountNotFound`, `InvalidAmount`)
//!   are raised by the engine before anything is persisted. No side effects.
//! - **Execution errors** ([`ExecutionError`]) are raised by the ledger store
//!   while both accounts are locked. The engine records the transfer as
//!   FAILED and surfaces them wrapped in `TransferRejected`.

use super::account::AccountId;
use super::transfer::{TransferId, TransferState};
use rust_decimal::Decimal;
use thiserror::Error;

/// Failure of the atomic debit/credit step
///
/// Raised by `TransferRepository::execute_transfer`. When one of these is
/// returned no balance has been modified.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    /// The source account cannot cover the amount
    #[error(
        "Insufficient funds in account {account_id}: balance {balance}, requested {requested}"
    )]
    InsufficientFunds {
        /// Source account id
        account_id: AccountId,
        /// Balance at the time of the check
        balance: Decimal,
        /// Transfer amount
        requested: Decimal,
    },

    /// Crediting the destination would overflow the decimal range
    #[error("Arithmetic overflow crediting account {account_id}")]
    ArithmeticOverflow {
        /// Destination account id
        account_id: AccountId,
    },

    /// The stored record already reached a terminal state
    ///
    /// Another holder of the same record executed or failed it first.
    #[error("Transfer {transfer_id} is already {state}")]
    AlreadyFinished {
        /// Id of the finished transfer
        transfer_id: TransferId,
        /// State found in the store
        state: TransferState,
    },
}

impl ExecutionError {
    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account_id: &str, balance: Decimal, requested: Decimal) -> Self {
        ExecutionError::InsufficientFunds {
            account_id: account_id.to_string(),
            balance,
            requested,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(account_id: &str) -> Self {
        ExecutionError::ArithmeticOverflow {
            account_id: account_id.to_string(),
        }
    }

    /// Create an AlreadyFinished error
    pub fn already_finished(transfer_id: TransferId, state: TransferState) -> Self {
        ExecutionError::AlreadyFinished { transfer_id, state }
    }
}

/// Main error type for the transfer engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransferError {
    /// Source and destination are the same account
    ///
    /// Rejected before any lock is taken: locking one account twice from the
    /// same thread would deadlock.
    #[error("Cannot transfer to the same account ({account_id})")]
    SameAccount {
        /// The account named on both sides
        account_id: AccountId,
    },

    /// An account named in the request does not exist
    #[error("Account {account_id} doesn't exist.")]
    AccountNotFound {
        /// The id that could not be resolved
        account_id: AccountId,
    },

    /// Amount is zero or negative
    #[error("Invalid transfer amount {amount}: the value must be positive")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// Execution failed; the transfer is recorded as FAILED
    ///
    /// Every execution failure surfaces through this variant; the reason
    /// carries the detail.
    #[error("Transfer {transfer_id} cannot be processed: {reason}")]
    TransferRejected {
        /// Id of the persisted FAILED transfer
        transfer_id: TransferId,
        /// What the ledger store refused
        #[source]
        reason: ExecutionError,
    },

    /// The transfer already reached a terminal state
    ///
    /// Re-running a finished transfer would move the funds twice.
    #[error("Transfer {transfer_id} is already {state}")]
    NotPending {
        /// Id of the finished transfer
        transfer_id: TransferId,
        /// Its terminal state
        state: TransferState,
    },

    /// An account with this id is already registered
    #[error("Account id {account_id} already exists!")]
    DuplicateAccount {
        /// The duplicated id
        account_id: AccountId,
    },
}

// Helper functions for creating common errors

impl TransferError {
    /// Create a SameAccount error
    pub fn same_account(account_id: &str) -> Self {
        TransferError::SameAccount {
            account_id: account_id.to_string(),
        }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(account_id: &str) -> Self {
        TransferError::AccountNotFound {
            account_id: account_id.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal) -> Self {
        TransferError::InvalidAmount { amount }
    }

    /// Create a TransferRejected error
    pub fn transfer_rejected(transfer_id: TransferId, reason: ExecutionError) -> Self {
        TransferError::TransferRejected {
            transfer_id,
            reason,
        }
    }

    /// Create a NotPending error
    pub fn not_pending(transfer_id: TransferId, state: TransferState) -> Self {
        TransferError::NotPending { transfer_id, state }
    }

    /// Create a DuplicateAccount error
    pub fn duplicate_account(account_id: &str) -> Self {
        TransferError::DuplicateAccount {
            account_id: account_id.to_string(),
        }
    }

    /// True for errors raised before anything was persisted
    pub fn is_validation_error(&self) -> bool {
        !matches!(self, TransferError::TransferRejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use std::error::Error as _;

    #[rstest]
    #[case::same_account(
        TransferError::SameAccount { account_id: "acc-001".to_string() },
        "Cannot transfer to the same account (acc-001)"
    )]
    #[case::account_not_found(
        TransferError::AccountNotFound { account_id: "acc-404".to_string() },
        "Account acc-404 doesn't exist."
    )]
    #[case::invalid_amount(
        TransferError::InvalidAmount { amount: Decimal::new(-500, 2) },
        "Invalid transfer amount -5.00: the value must be positive"
    )]
    #[case::transfer_rejected(
        TransferError::TransferRejected {
            transfer_id: 3,
            reason: ExecutionError::InsufficientFunds {
                account_id: "acc-001".to_string(),
                balance: Decimal::from(100),
                requested: Decimal::from(101),
            },
        },
        "Transfer 3 cannot be processed: Insufficient funds in account acc-001: balance 100, requested 101"
    )]
    #[case::duplicate_account(
        TransferError::DuplicateAccount { account_id: "acc-001".to_string() },
        "Account id acc-001 already exists!"
    )]
    #[case::not_pending(
        TransferError::NotPending { transfer_id: 4, state: TransferState::Completed },
        "Transfer 4 is already COMPLETED"
    )]
    fn test_error_display(#[case] error: TransferError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::same_account(
        TransferError::same_account("acc-001"),
        TransferError::SameAccount { account_id: "acc-001".to_string() }
    )]
    #[case::account_not_found(
        TransferError::account_not_found("acc-404"),
        TransferError::AccountNotFound { account_id: "acc-404".to_string() }
    )]
    #[case::already_finished(
        TransferError::transfer_rejected(5, ExecutionError::already_finished(5, TransferState::Completed)),
        TransferError::TransferRejected {
            transfer_id: 5,
            reason: ExecutionError::AlreadyFinished { transfer_id: 5, state: TransferState::Completed },
        }
    )]
    #[case::transfer_rejected(
        TransferError::transfer_rejected(9, ExecutionError::arithmetic_overflow("acc-002")),
        TransferError::TransferRejected {
            transfer_id: 9,
            reason: ExecutionError::ArithmeticOverflow { account_id: "acc-002".to_string() },
        }
    )]
    fn test_helper_functions(#[case] result: TransferError, #[case] expected: TransferError) {
        assert_eq!(result, expected);
    }

    #[rstest]
    #[case(TransferError::same_account("a"), true)]
    #[case(TransferError::account_not_found("a"), true)]
    #[case(TransferError::invalid_amount(Decimal::ZERO), true)]
    #[case(TransferError::duplicate_account("a"), true)]
    #[case(TransferError::not_pending(1, TransferState::Failed), true)]
    #[case(
        TransferError::transfer_rejected(1, ExecutionError::insufficient_funds("a", Decimal::ZERO, Decimal::ONE)),
        false
    )]
    fn test_is_validation_error(#[case] error: TransferError, #[case] expected: bool) {
        assert_eq!(error.is_validation_error(), expected);
    }

    #[test]
    fn test_rejected_exposes_execution_error_as_source() {
        let reason = ExecutionError::insufficient_funds("acc-001", Decimal::from(5), Decimal::from(6));
        let error = TransferError::transfer_rejected(1, reason.clone());

        let source = error.source().expect("rejected transfer should carry a source");
        assert_eq!(source.to_string(), reason.to_string());
    }
}
