//! Asynchronous CSV reader with batch interface
//!
//! Reads transfer requests with csv-async and hands them out in batches.
//! Rows that fail to parse or validate are logged, counted and skipped.
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of TransferRequests
//!                  ↓
//!           csv_format module
//!           (TransferCsvRecord, convert_transfer_record)
//! ```

use crate::io::csv_format::{convert_transfer_record, TransferCsvRecord};
use crate::types::TransferRequest;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Asynchronous CSV reader over transfer requests
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    skipped: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            skipped: 0,
        }
    }

    /// Read a batch of transfer requests
    ///
    /// Reads until `batch_size` valid requests are collected or the input
    /// ends. Invalid rows are logged and do not count toward the batch.
    ///
    /// # Returns
    ///
    /// The converted requests. An empty vector means the end of the input.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<TransferRequest> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<TransferCsvRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(csv_record)) => match convert_transfer_record(csv_record) {
                    Ok(request) => batch.push(request),
                    Err(e) => {
                        warn!(error = %e, "Skipping transfer row");
                        self.skipped += 1;
                    }
                },
                Some(Err(e)) => {
                    warn!(error = %e, "CSV parse error");
                    self.skipped += 1;
                }
                None => break,
            }
        }

        batch
    }

    /// Number of rows skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
