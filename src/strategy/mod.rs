//! Processing strategy module
//!
//! A strategy decides how transfer requests are fed to the engine
//! (sequentially, or in concurrent batches). Everything around that is
//! shared: loading opening balances, wiring the engine, the recovery sweep
//! and writing the final balances.

use crate::cli::StrategyType;
use crate::core::{
    recover_pending_transfers, LedgerStore, LoggingNotifier, TransferEngine,
};
use crate::io::{load_accounts, write_accounts_csv};
use crate::types::{Transfer, TransferError};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Counters for one processing run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingSummary {
    /// Requests handed to the engine
    pub submitted: usize,

    /// Transfers that completed
    pub completed: usize,

    /// Requests the engine refused or failed to execute
    pub rejected: usize,

    /// Input rows dropped before reaching the engine
    pub skipped: usize,

    /// Account rows rejected while loading opening balances
    pub accounts_skipped: usize,
}

impl ProcessingSummary {
    /// Count the outcome of one submitted request
    pub fn record(&mut self, outcome: &Result<Transfer, TransferError>) {
        self.submitted += 1;
        match outcome {
            Ok(_) => self.completed += 1,
            Err(e) => {
                // Execution failures are already logged by the engine
                if e.is_validation_error() {
                    warn!(error = %e, "Transfer refused");
                }
                self.rejected += 1;
            }
        }
    }

    /// Count a row that could not be turned into a request
    pub fn skip(&mut self, reason: &str) {
        warn!(error = %reason, "Skipping transfer row");
        self.skipped += 1;
    }
}

/// Processing strategy trait for complete transfer runs
pub trait ProcessingStrategy: Send + Sync {
    /// Read transfer requests from `transfers_path` and submit them to `engine`
    ///
    /// Individual request failures are counted in the summary and never
    /// abort the run.
    ///
    /// # Returns
    ///
    /// * `Ok(ProcessingSummary)` once every row has been handled
    /// * `Err(String)` on a fatal error (file not found, runtime failure)
    fn submit_transfers(
        &self,
        engine: &TransferEngine,
        transfers_path: &Path,
    ) -> Result<ProcessingSummary, String>;

    /// Run a complete transfer pass and write the final balances
    ///
    /// 1. Loads opening balances from `accounts_path`, counting rejected rows
    ///    in [`ProcessingSummary::accounts_skipped`]
    /// 2. Builds the engine over fresh account and ledger stores
    /// 3. Replays PENDING transfers left in the ledger
    /// 4. Submits the requests via [`ProcessingStrategy::submit_transfers`]
    /// 5. Writes `account_id,balance` rows to `output`
    ///
    /// # Errors
    ///
    /// Returns an error if either input file cannot be opened, or the
    /// output cannot be written.
    fn process(
        &self,
        accounts_path: &Path,
        transfers_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ProcessingSummary, String> {
        let loaded = load_accounts(accounts_path)?;
        let accounts_skipped = loaded.skipped;
        let accounts = Arc::new(loaded.store);
        let engine = TransferEngine::new(
            accounts.clone(),
            Arc::new(LedgerStore::new()),
            Arc::new(LoggingNotifier),
        );

        let recovery = recover_pending_transfers(&engine);
        if recovery.replayed() > 0 {
            info!(
                completed = recovery.completed.len(),
                failed = recovery.failed.len(),
                "Recovery sweep finished"
            );
        }

        let mut summary = self.submit_transfers(&engine, transfers_path)?;
        summary.accounts_skipped = accounts_skipped;

        write_accounts_csv(&accounts.snapshots(), output)?;
        Ok(summary)
    }
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Optional configuration for async batch processing (ignored for sync)
///
/// # Returns
///
/// A boxed trait object implementing the ProcessingStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(config.unwrap_or_default())),
    }
}
