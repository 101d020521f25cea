//! Asynchronous batch processing strategy
//!
//! Reads transfer requests in batches and submits every request of a batch
//! concurrently, so transfers on different accounts run in parallel and
//! transfers sharing an account contend on the engine's locks.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_transfers)
//!     ├── AsyncReader (batch CSV reading)
//!     └── BatchProcessor (one blocking task per request)
//!         └── TransferEngine
//! ```
//!
//! Batches are processed one after another; a batch is fully settled
//! before the next one is read. Within a batch no order is implied.

use crate::core::{BatchProcessor, TransferEngine};
use crate::io::async_reader::AsyncReader;
use crate::strategy::{ProcessingStrategy, ProcessingSummary};
use std::path::Path;
use tracing::{debug, warn};

/// Configuration for batch processing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of transfer requests per batch
    pub batch_size: usize,

    /// Maximum number of transfers executing at the same time
    pub max_concurrent_transfers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_transfers: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent_transfers: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                "Invalid batch_size ({}), using default ({})",
                batch_size, default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_transfers = if max_concurrent_transfers == 0 {
            warn!(
                "Invalid max_concurrent_transfers ({}), using default ({})",
                max_concurrent_transfers, default.max_concurrent_transfers
            );
            default.max_concurrent_transfers
        } else {
            max_concurrent_transfers
        };

        Self {
            batch_size,
            max_concurrent_transfers,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// Owns its tokio runtime: `submit_transfers` must not be called from
/// inside another runtime.
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy with the specified configuration
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// The configuration this strategy runs with
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn submit_transfers(
        &self,
        engine: &TransferEngine,
        transfers_path: &Path,
    ) -> Result<ProcessingSummary, String> {
        // Transfers block on account locks and run on the blocking pool,
        // whose size is the concurrency bound
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_transfers)
            .max_blocking_threads(self.config.max_concurrent_transfers)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let processor = BatchProcessor::new(engine.clone());

            let file = tokio::fs::File::open(transfers_path).await.map_err(|e| {
                format!("Failed to open file '{}': {}", transfers_path.display(), e)
            })?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let mut summary = ProcessingSummary::default();
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                debug!(size = batch.len(), "Submitting batch");
                for submission in processor.process_batch(batch).await {
                    summary.record(&submission.result);
                }
            }

            summary.skipped = reader.skipped();
            Ok(summary)
        })
    }
}
