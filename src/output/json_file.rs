//! JSON file sink
//!
//! Buffers records in memory and writes them all as one JSON array on flush.

use crate::output::traits::{OutputResult, RecordSink};
use crate::product::Product;
use crate::PersistenceError;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// In-memory record buffer backed by a JSON file
#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
    items: Mutex<Vec<Product>>,
}

impl JsonFileSink {
    /// Creates an empty sink that writes to `path`
    ///
    /// The file is not touched until the first flush.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            items: Mutex::new(Vec::new()),
        }
    }

    /// Number of records waiting for the next flush
    pub fn buffered(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Product>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_all(&self, items: &[Product]) -> OutputResult<()> {
        let file = File::create(&self.path).map_err(|source| PersistenceError::Create {
            path: self.path.clone(),
            source,
        })?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, items)?;

        let file = writer
            .into_inner()
            .map_err(|e| PersistenceError::Write {
                path: self.path.clone(),
                source: e.into_error(),
            })?;

        file.sync_all().map_err(|source| PersistenceError::Sync {
            path: self.path.clone(),
            source,
        })
    }
}

impl RecordSink for JsonFileSink {
    fn save(&self, product: Product) -> OutputResult<()> {
        self.lock().push(product);
        Ok(())
    }

    /// Replaces the file contents with the buffered records
    ///
    /// The buffer is cleared only after the data has been synced to disk;
    /// on any failure every record stays buffered.
    fn flush(&self) -> OutputResult<usize> {
        let mut items = self.lock();
        self.write_all(&items)?;

        let written = items.len();
        items.clear();
        tracing::debug!("Flushed {} records to {}", written, self.path.display());
        Ok(written)
    }
}

impl Drop for JsonFileSink {
    fn drop(&mut self) {
        let remaining = self.lock().len();
        if remaining > 0 {
            tracing::warn!(
                "{} records were never flushed to {}",
                remaining,
                self.path.display()
            );
        }
    }
}
