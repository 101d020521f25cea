//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over transfer requests from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding
//! `Result<TransferRequest, String>` for each CSV row:
//!
//! ```no_run
//! use rust_transfer_engine::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("transfers.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(request) => println!("Submitting transfer: {:?}", request),
//!         Err(e) => eprintln!("Skipping row: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row errors are yielded as Err variants in the iterator
//! - Line numbers are included in error messages

use crate::io::csv_format::{convert_transfer_record, TransferCsvRecord};
use crate::types::TransferRequest;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV reader over transfer requests
///
/// Reads one row at a time, so memory use does not grow with the file.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: usize,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// The CSV reader trims whitespace from all fields and allows flexible
    /// field counts, so a row with a missing amount is reported by the
    /// conversion step rather than as a structural error.
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReader)` if file opened successfully
    /// * `Err(String)` if file could not be opened
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 1,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<TransferRequest, String>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.reader.deserialize::<TransferCsvRecord>().next()?;
        self.line_num += 1;

        Some(match row {
            Ok(csv_record) => convert_transfer_record(csv_record)
                .map_err(|e| format!("Line {}: {}", self.line_num, e)),
            Err(e) => Err(format!("Line {}: CSV parse error: {}", self.line_num, e)),
        })
    }
}
