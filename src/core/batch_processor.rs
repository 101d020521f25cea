//! Concurrent batch submission of transfer requests
//!
//! This module provides the `BatchProcessor` struct, which submits every
//! request of a batch to the transfer engine concurrently.
//!
//! # Design
//!
//! The engine blocks on account locks, so each request runs on tokio's
//! blocking pool via `spawn_blocking` rather than on an async worker. How
//! many run at once is bounded by the runtime's `max_blocking_threads`.
//!
//! Transfers carry no ordering guarantee relative to each other, so unlike
//! per-client pipelines there is no partitioning step: every request of a
//! batch is independent.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     └── TransferEngine  (cloned into each blocking task)
//! ```

use tracing::error;

use crate::core::engine::TransferEngine;
use crate::types::{Transfer, TransferError, TransferRequest};

/// Result of submitting a single transfer request
#[derive(Debug, Clone)]
pub struct SubmissionResult {
    /// The request that was submitted
    pub request: TransferRequest,

    /// The finished transfer, or why it was refused
    pub result: Result<Transfer, TransferError>,
}

/// Submits batches of transfer requests concurrently
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    engine: TransferEngine,
}

impl BatchProcessor {
    /// Create a new BatchProcessor
    ///
    /// # Arguments
    ///
    /// * `engine` - The engine every request is submitted to
    pub fn new(engine: TransferEngine) -> Self {
        Self { engine }
    }

    /// Submit every request of a batch concurrently and wait for all of them
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    ///
    /// One `SubmissionResult` per request whose task finished. Results may be
    /// in a different order than the input. A task that panicked is logged
    /// and has no entry.
    pub async fn process_batch(&self, batch: Vec<TransferRequest>) -> Vec<SubmissionResult> {
        let mut tasks = Vec::with_capacity(batch.len());
        for request in batch {
            let engine = self.engine.clone();
            tasks.push(tokio::task::spawn_blocking(move || {
                let result = engine.create_transfer(&request);
                SubmissionResult { request, result }
            }));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(submission) => results.push(submission),
                Err(e) => error!(error = ?e, "Transfer task panicked"),
            }
        }

        results
    }
}
