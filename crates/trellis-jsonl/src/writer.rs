//! JSONL writing operations.

use crate::error::{Error, Result};
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Async writer for JSONL (JSON Lines) data.
///
/// Each value is serialized to a single line followed by `\n`. Output is
/// buffered; call [`flush`](Self::flush) before dropping the writer.
pub struct JsonlWriter<W> {
    writer: BufWriter<W>,
    lines_written: usize,
}

impl<W: AsyncWrite + Unpin> JsonlWriter<W> {
    /// Creates a new `JsonlWriter` wrapping the given async writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            lines_written: 0,
        }
    }

    /// Number of records written so far.
    #[must_use]
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Serializes `value` as one JSON line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails and [`Error::Io`] if the
    /// write fails.
    pub async fn write<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let json = serde_json::to_string(value).map_err(|source| Error::Json {
            line: self.lines_written + 1,
            source,
        })?;
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.lines_written += 1;
        Ok(())
    }

    /// Writes every value from the iterator, one per line.
    ///
    /// # Errors
    ///
    /// Stops at the first failing value; see [`write`](Self::write).
    pub async fn write_all<T, I>(&mut self, values: I) -> Result<()>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.write(&value).await?;
        }
        Ok(())
    }

    /// Flushes buffered output to the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the flush fails.
    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await?;
        Ok(())
    }

    /// Consumes the writer, returning the underlying writer.
    ///
    /// This does not flush; call [`flush`](Self::flush) first.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    #[tokio::test]
    async fn writes_one_value_per_line() {
        let mut writer = JsonlWriter::new(Cursor::new(Vec::new()));
        writer
            .write_all([json!({"id": 1}), json!({"id": 2})])
            .await
            .unwrap();
        writer.flush().await.unwrap();
        assert_eq!(writer.lines_written(), 2);

        let bytes = writer.into_inner().into_inner();
        assert_eq!(String::from_utf8(bytes).unwrap(), "{\"id\":1}\n{\"id\":2}\n");
    }

    #[tokio::test]
    async fn empty_input_writes_nothing() {
        let mut writer = JsonlWriter::new(Cursor::new(Vec::new()));
        writer.write_all(Vec::<u32>::new()).await.unwrap();
        writer.flush().await.unwrap();
        assert_eq!(writer.lines_written(), 0);
        assert!(writer.into_inner().into_inner().is_empty());
    }
}
