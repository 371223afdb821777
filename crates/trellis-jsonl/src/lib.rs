//! Async JSON Lines (JSONL) support for trellis.
//!
//! Provides a buffered line reader that tracks line numbers, a resilient
//! read mode that turns bad lines into [`Warning`]s instead of failing the
//! whole load, a buffered writer, and crash-safe atomic file writes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod error;
pub mod reader;
pub mod warning;
pub mod writer;

pub use atomic::{write_jsonl_atomic, write_jsonl_atomic_iter};
pub use error::{Error, Result};
pub use reader::{read_jsonl_resilient, JsonlReader};
pub use warning::Warning;
pub use writer::JsonlWriter;
