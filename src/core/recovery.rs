//! Pending-transfer recovery
//!
//! A transfer is persisted as PENDING before it is executed. If the process
//! stops in between, the record stays PENDING. At startup the recovery sweep
//! hands every such record back to `TransferEngine::make_transfer`, the same
//! entry point used at intake, so recovery adds no locking or execution
//! logic of its own.
//!
//! The sweep is a one-shot replay, not a retry loop: each pending transfer
//! is attempted once, failures are logged and collected, and the sweep
//! carries on with the rest.

use crate::core::engine::TransferEngine;
use crate::types::{TransferError, TransferId};
use tracing::{info, warn};

/// Outcome of one recovery sweep
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecoveryReport {
    /// Transfers that completed on replay
    pub completed: Vec<TransferId>,

    /// Transfers whose replay failed, with the reason
    pub failed: Vec<(TransferId, TransferError)>,
}

impl RecoveryReport {
    /// Number of transfers the sweep attempted
    pub fn replayed(&self) -> usize {
        self.completed.len() + self.failed.len()
    }
}

/// Re-drive every PENDING transfer through the engine
///
/// Transfers are replayed in the order the store returns them; no ordering
/// across transfers is implied.
///
/// # Arguments
///
/// * `engine` - The engine that will serve all later intake as well
///
/// # Returns
///
/// A `RecoveryReport` listing completed and failed transfer ids.
pub fn recover_pending_transfers(engine: &TransferEngine) -> RecoveryReport {
    let pending = engine.find_pending_transfers();
    info!(
        "Found {} pending transfers waiting to be processed.",
        pending.len()
    );

    let mut report = RecoveryReport::default();
    for mut transfer in pending {
        info!(transfer_id = transfer.id, "Processing transfer with ID {}", transfer.id);

        match engine.make_transfer(&mut transfer) {
            Ok(()) => report.completed.push(transfer.id),
            Err(e) => {
                warn!(transfer_id = transfer.id, error = %e, "Recovery of transfer failed");
                report.failed.push((transfer.id, e));
            }
        }
    }

    report
}
