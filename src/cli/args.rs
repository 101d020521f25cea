use crate::logging::LogFormat;
use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Move funds between accounts with concurrent transfers
#[derive(Parser, Debug)]
#[command(name = "transfer-engine")]
#[command(about = "Apply transfer requests to opening balances and print the final balances", long_about = None)]
pub struct CliArgs {
    /// CSV file with opening balances (account_id,balance)
    #[arg(value_name = "ACCOUNTS", help = "Path to the accounts CSV file")]
    pub accounts_file: PathBuf,

    /// CSV file with transfer requests (account_from,account_to,amount)
    #[arg(value_name = "TRANSFERS", help = "Path to the transfers CSV file")]
    pub transfers_file: PathBuf,

    /// Processing strategy used to submit transfers
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for sequential or 'async' for concurrent batches"
    )]
    pub strategy: StrategyType,

    /// Number of transfer requests per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of transfer requests per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of transfers executing at once (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of transfers executing concurrently (default: CPU cores)"
    )]
    pub max_concurrent_transfers: Option<usize>,

    /// Log level used when RUST_LOG is not set
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error); RUST_LOG takes precedence"
    )]
    pub log_level: String,

    /// Log output format
    #[arg(
        long = "log-format",
        value_name = "FORMAT",
        default_value = "text",
        help = "Log format written to stderr: 'text' or 'json'"
    )]
    pub log_format: LogFormat,
}

/// Available processing strategies
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values use the defaults; zero values are replaced with the
    /// defaults by `BatchConfig::new`, which logs a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_none() && self.max_concurrent_transfers.is_none() {
            return BatchConfig::default();
        }

        let default = BatchConfig::default();
        BatchConfig::new(
            self.batch_size.unwrap_or(default.batch_size),
            self.max_concurrent_transfers
                .unwrap_or(default.max_concurrent_transfers),
        )
    }
}
