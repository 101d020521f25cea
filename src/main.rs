//! Rust Transfer Engine CLI
//!
//! Applies transfer requests to opening balances and prints the final
//! balances.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- accounts.csv transfers.csv > balances.csv
//! cargo run -- --strategy sync accounts.csv transfers.csv > balances.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 accounts.csv transfers.csv
//! RUST_LOG=debug cargo run -- --log-format json accounts.csv transfers.csv
//! ```
//!
//! Balances go to stdout, logs to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (file not found, file not readable, invalid log level, etc.)

use rust_transfer_engine::cli;
use rust_transfer_engine::logging;
use rust_transfer_engine::strategy;
use std::process;
use tracing::{error, info};

fn main() {
    let args = cli::parse_args();

    if let Err(e) = logging::init_logging(&args.log_level, args.log_format) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    let mut output = std::io::stdout();
    match strategy.process(&args.accounts_file, &args.transfers_file, &mut output) {
        Ok(summary) => info!(
            submitted = summary.submitted,
            completed = summary.completed,
            rejected = summary.rejected,
            skipped = summary.skipped,
            accounts_skipped = summary.accounts_skipped,
            "Processing finished"
        ),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
