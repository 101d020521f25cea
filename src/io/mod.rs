//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, output serialization)
//! - `account_loader` - Opening balances into an account store
//! - `sync_reader` - Synchronous transfer reader with iterator interface
//! - `async_reader` - Asynchronous transfer reader with batch reading interface

pub mod account_loader;
pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use account_loader::{load_accounts, LoadedAccounts};
pub use async_reader::AsyncReader;
pub use csv_format::{
    convert_account_record, convert_transfer_record, write_accounts_csv, AccountCsvRecord,
    TransferCsvRecord,
};
pub use sync_reader::SyncReader;
