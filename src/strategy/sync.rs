//! Synchronous processing strategy
//!
//! Streams transfer requests with [`SyncReader`] and submits them one at a
//! time on the calling thread. Requests execute in file order, which makes
//! this strategy the reference for what a run should produce.

use crate::core::TransferEngine;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{ProcessingStrategy, ProcessingSummary};
use std::path::Path;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use rust_transfer_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy;
/// let mut output = io::stdout();
///
/// strategy
///     .process(Path::new("accounts.csv"), Path::new("transfers.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn submit_transfers(
        &self,
        engine: &TransferEngine,
        transfers_path: &Path,
    ) -> Result<ProcessingSummary, String> {
        let reader = SyncReader::new(transfers_path)?;
        let mut summary = ProcessingSummary::default();

        for row in reader {
            match row {
                Ok(request) => summary.record(&engine.create_transfer(&request)),
                Err(e) => summary.skip(&e),
            }
        }

        Ok(summary)
    }
}
