//! Record sink trait
//!
//! This module defines the interface the crawl phase hands extracted
//! records to.

use crate::product::Product;
use crate::PersistenceError;

/// Result type for sink operations
pub type OutputResult<T> = Result<T, PersistenceError>;

/// Destination for extracted listing records
///
/// Implementations must be safe to call from concurrent page visits.
pub trait RecordSink: Send + Sync {
    /// Accepts one record. Must not block on I/O.
    fn save(&self, product: Product) -> OutputResult<()>;

    /// Durably writes every record accepted so far
    ///
    /// # Returns
    ///
    /// The number of records written
    fn flush(&self) -> OutputResult<usize>;
}
