//! Output module for persisting extracted listings
//!
//! This module handles:
//! - The [`RecordSink`] interface the crawl phase writes records to
//! - A JSON file implementation that buffers records and writes them on flush

mod json_file;
mod traits;

pub use json_file::JsonFileSink;
pub use traits::{OutputResult, RecordSink};
