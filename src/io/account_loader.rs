//! Opening balances loader
//!
//! Reads `account_id,balance` rows into an [`AccountStore`]. Rows that do
//! not convert, and repeated account ids, are logged and skipped so a single
//! bad row does not abort a run.

use crate::core::AccountStore;
use crate::io::csv_format::{convert_account_record, AccountCsvRecord};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

/// Result of loading an accounts file
#[derive(Debug)]
pub struct LoadedAccounts {
    /// Store populated with every accepted account
    pub store: AccountStore,

    /// Number of rows that were rejected
    pub skipped: usize,
}

/// Load opening balances from a CSV file
///
/// # Returns
///
/// * `Ok(LoadedAccounts)` once the whole file has been read
/// * `Err(String)` if the file could not be opened
pub fn load_accounts(path: &Path) -> Result<LoadedAccounts, String> {
    let file = File::open(path)
        .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(file);

    let store = AccountStore::new();
    let mut skipped = 0;

    for (index, row) in reader.deserialize::<AccountCsvRecord>().enumerate() {
        // Line numbers count the header
        let line = index + 2;
        let outcome = row
            .map_err(|e| format!("CSV parse error: {}", e))
            .and_then(convert_account_record)
            .and_then(|account| store.create_account(account).map_err(|e| e.to_string()));

        if let Err(e) = outcome {
            warn!(line, error = %e, "Skipping account row");
            skipped += 1;
        }
    }

    info!(
        accounts = store.len(),
        skipped,
        "Loaded accounts from '{}'",
        path.display()
    );

    Ok(LoadedAccounts { store, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AccountLookup;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file
    }

    #[test]
    fn test_load_accounts() {
        let file = create_temp_csv("account_id,balance\nA,100\nB,0.5\nC,\n");

        let loaded = load_accounts(file.path()).unwrap();

        assert_eq!(loaded.skipped, 0);
        assert_eq!(loaded.store.len(), 3);
        let a = loaded.store.get_account("A").unwrap();
        assert_eq!(a.balance(), Decimal::from(100));
        assert_eq!(loaded.store.get_account("B").unwrap().balance(), Decimal::new(5, 1));
        assert_eq!(loaded.store.get_account("C").unwrap().balance(), Decimal::ZERO);
    }

    #[test]
    fn test_load_accounts_skips_bad_rows_and_duplicates() {
        let file = create_temp_csv(
            "account_id,balance\nA,100\nA,200\nB,-5\nC,abc\nD,10\n",
        );

        let loaded = load_accounts(file.path()).unwrap();

        assert_eq!(loaded.skipped, 3);
        assert_eq!(loaded.store.len(), 2);
        // First occurrence wins
        assert_eq!(
            loaded.store.get_account("A").unwrap().balance(),
            Decimal::from(100)
        );
        assert!(loaded.store.get_account("B").is_none());
        assert!(loaded.store.get_account("D").is_some());
    }

    #[test]
    fn test_load_accounts_missing_file() {
        let result = load_accounts(Path::new("no-such-accounts.csv"));
        assert!(result.unwrap_err().contains("Failed to open file"));
    }
}
