//! CSV format handling for accounts and transfer requests
//!
//! This module centralizes all CSV format concerns, providing:
//! - Record structures for deserialization
//! - Conversion from CSV records to domain types, with boundary validation
//! - Account balance output serialization
//!
//! All functions are pure (no I/O) for easy testing.
//!
//! # Formats
//!
//! ```text
//! accounts:   account_id,balance
//! transfers:  account_from,account_to,amount
//! output:     account_id,balance
//! ```

use crate::types::{Account, AccountSnapshot, TransferRequest};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// Opening account record
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccountCsvRecord {
    pub account_id: String,
    pub balance: Option<String>,
}

/// Transfer request record
///
/// The amount is kept as a string so malformed values can be reported with
/// the offending text instead of a generic deserialization error.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TransferCsvRecord {
    pub account_from: String,
    pub account_to: String,
    pub amount: Option<String>,
}

/// Convert an AccountCsvRecord to an Account
///
/// A missing balance opens the account at zero. Negative balances are
/// refused.
///
/// # Returns
///
/// * `Ok(Account)` - The account to register
/// * `Err(String)` - Error message describing the conversion failure
pub fn convert_account_record(csv_record: AccountCsvRecord) -> Result<Account, String> {
    let account_id = csv_record.account_id.trim();
    if account_id.is_empty() {
        return Err("Account id must not be empty".to_string());
    }

    let balance = match parse_decimal(csv_record.balance.as_deref()) {
        Some(Ok(balance)) => balance,
        Some(Err(raw)) => {
            return Err(format!(
                "Invalid balance '{}' for account {}",
                raw, account_id
            ))
        }
        None => Decimal::ZERO,
    };

    if balance < Decimal::ZERO {
        return Err(format!(
            "Initial balance must be positive for account {} (got {})",
            account_id, balance
        ));
    }

    Ok(Account::new(account_id, balance))
}

/// Convert a TransferCsvRecord to a TransferRequest
///
/// This is where request input is validated:
/// - Both account ids must be present
/// - The amount must be present, parse as a decimal, and be strictly positive
///
/// Same-account and unknown-account checks are left to the engine.
///
/// # Returns
///
/// * `Ok(TransferRequest)` - Successfully converted request
/// * `Err(String)` - Error message describing the conversion failure
pub fn convert_transfer_record(csv_record: TransferCsvRecord) -> Result<TransferRequest, String> {
    let account_from = csv_record.account_from.trim();
    let account_to = csv_record.account_to.trim();

    if account_from.is_empty() {
        return Err("Account from must not be null".to_string());
    }
    if account_to.is_empty() {
        return Err("Account to must not be null".to_string());
    }

    let amount = match parse_decimal(csv_record.amount.as_deref()) {
        Some(Ok(amount)) => amount,
        Some(Err(raw)) => {
            return Err(format!(
                "Invalid amount '{}' for transfer {} -> {}",
                raw, account_from, account_to
            ))
        }
        None => {
            return Err(format!(
                "Transfer {} -> {} requires an amount",
                account_from, account_to
            ))
        }
    };

    if amount <= Decimal::ZERO {
        return Err(format!(
            "Invalid amount {} for transfer {} -> {}: the value must be positive",
            amount, account_from, account_to
        ));
    }

    Ok(TransferRequest::new(account_from, account_to, amount))
}

// None for a missing/blank field, Some(Err(raw)) when it doesn't parse
fn parse_decimal(field: Option<&str>) -> Option<Result<Decimal, &str>> {
    match field {
        Some(raw) if !raw.trim().is_empty() => {
            Some(Decimal::from_str(raw.trim()).map_err(|_| raw))
        }
        _ => None,
    }
}

/// Write account balances to CSV format
///
/// Writes accounts with columns: account_id, balance. Accounts are sorted by
/// id for deterministic output and balances use four decimal places.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_accounts_csv(
    accounts: &[AccountSnapshot],
    output: &mut dyn Write,
) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["account_id", "balance"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by(|a, b| a.id.cmp(&b.id));

    for account in sorted_accounts {
        writer
            .write_record(&[account.id, format!("{:.4}", account.balance)])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
