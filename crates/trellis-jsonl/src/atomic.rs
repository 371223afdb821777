//! Atomic write operations for JSONL files.
//!
//! Data is written to a sibling temporary file, flushed and synced, then
//! renamed over the target. On POSIX systems a rename within one filesystem
//! is atomic, so readers see either the old file or the complete new one.
//!
//! ```no_run
//! use trellis_jsonl::write_jsonl_atomic;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let rows = vec![serde_json::json!({"id": "feat-1"})];
//! write_jsonl_atomic("features.jsonl", &rows).await?;
//! # Ok(())
//! # }
//! ```

use crate::{JsonlWriter, Result};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tracing::debug;

/// Atomically writes a slice of values to a JSONL file.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written, a
/// value fails to serialize, or the rename fails. The target file is left
/// unchanged in every error case.
pub async fn write_jsonl_atomic<T, P>(path: P, values: &[T]) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_jsonl_atomic_iter(path, values.iter()).await
}

/// Atomically writes an iterator of values to a JSONL file.
///
/// # Errors
///
/// See [`write_jsonl_atomic`].
pub async fn write_jsonl_atomic_iter<T, I, P>(path: P, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let temp_path = make_temp_path(path);

    let written = match write_to_temp_file(&temp_path, values).await {
        Ok(written) => written,
        Err(e) => {
            // Best-effort cleanup; the original error is what matters.
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }
    };

    tokio::fs::rename(&temp_path, path).await?;
    debug!(path = %path.display(), records = written, "Atomically wrote JSONL file");
    Ok(())
}

/// Temp path alongside the target: `data.jsonl` becomes `data.jsonl.tmp`.
pub(crate) fn make_temp_path(path: &Path) -> PathBuf {
    let mut file_name = path
        .file_name()
        .map_or_else(|| OsString::from("data"), ToOwned::to_owned);
    file_name.push(".tmp");
    path.with_file_name(file_name)
}

async fn write_to_temp_file<T, I>(temp_path: &Path, values: I) -> Result<usize>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let file = File::create(temp_path).await?;
    let mut writer = JsonlWriter::new(file);
    writer.write_all(values).await?;
    writer.flush().await?;
    let written = writer.lines_written();
    writer.into_inner().sync_all().await?;
    Ok(written)
}
