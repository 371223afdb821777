//! JSONL reading operations.
//!
//! This module provides async functionality for reading JSONL data line by
//! line with buffering and line number tracking for error reporting.
//!
//! Blank (whitespace-only) lines are skipped but still counted, so reported
//! line numbers always match what an editor shows.

use crate::error::{Error, Result};
use crate::warning::Warning;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, warn};

/// Async reader for JSONL (JSON Lines) data.
///
/// `JsonlReader` wraps an async reader and provides buffered reading of JSONL
/// formatted data. It tracks line numbers to provide useful context in error
/// messages and warnings when parsing fails.
///
/// # Examples
///
/// ```no_run
/// use trellis_jsonl::JsonlReader;
/// use tokio::fs::File;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let file = File::open("data.jsonl").await?;
/// let mut reader = JsonlReader::new(file);
/// while let Some(value) = reader.read_value::<serde_json::Value>().await? {
///     println!("line {}: {}", reader.line_number(), value);
/// }
/// # Ok(())
/// # }
/// ```
pub struct JsonlReader<R> {
    /// Buffered reader wrapping the underlying async reader.
    reader: BufReader<R>,
    /// Current line number (1-based, 0 before any line is read).
    line_number: usize,
    /// Raw bytes of the most recently read line.
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Creates a new `JsonlReader` wrapping the given async reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buf: Vec::new(),
        }
    }

    /// Creates a new `JsonlReader` with a custom buffer capacity.
    #[must_use]
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
            line_number: 0,
            buf: Vec::new(),
        }
    }

    /// Returns the current line number.
    ///
    /// Returns 0 before any lines have been read. After reading, returns the
    /// 1-based line number of the last line read.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads and deserializes the next non-blank line.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the line is not valid JSON for `T`,
    /// [`Error::InvalidFormat`] if the line is not valid UTF-8, and
    /// [`Error::Io`] if the underlying reader fails.
    pub async fn read_value<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        if !self.next_nonblank_line().await? {
            return Ok(None);
        }

        let line = self.current_line().map_err(|e| {
            Error::InvalidFormat(format!("line {}: invalid UTF-8: {}", self.line_number, e))
        })?;

        serde_json::from_str(line)
            .map(Some)
            .map_err(|source| Error::Json {
                line: self.line_number,
                source,
            })
    }

    /// Reads every remaining line, skipping lines that cannot be decoded.
    ///
    /// Malformed JSON produces [`Warning::MalformedJson`]; lines that are not
    /// valid UTF-8 produce [`Warning::SkippedLine`]. Only I/O failures abort
    /// the read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the underlying reader fails.
    pub async fn read_all_resilient<T: DeserializeOwned>(
        &mut self,
    ) -> Result<(Vec<T>, Vec<Warning>)> {
        let mut values = Vec::new();
        let mut warnings = Vec::new();

        while self.next_nonblank_line().await? {
            let line_number = self.line_number;
            let warning = match self.current_line() {
                Ok(line) => match serde_json::from_str::<T>(line) {
                    Ok(value) => {
                        values.push(value);
                        continue;
                    }
                    Err(e) => Warning::MalformedJson {
                        line_number,
                        error: e.to_string(),
                    },
                },
                Err(e) => Warning::SkippedLine {
                    line_number,
                    reason: format!("invalid UTF-8: {e}"),
                },
            };
            warn!(line_number, kind = warning.kind(), "{}", warning.description());
            warnings.push(warning);
        }

        debug!(
            records = values.len(),
            warnings = warnings.len(),
            lines = self.line_number,
            "Finished resilient JSONL read"
        );
        Ok((values, warnings))
    }

    /// Consumes the reader, returning the underlying buffered reader.
    #[must_use]
    pub fn into_inner(self) -> BufReader<R> {
        self.reader
    }

    /// Advances to the next line containing something other than whitespace.
    ///
    /// Returns `false` at end of input.
    async fn next_nonblank_line(&mut self) -> Result<bool> {
        loop {
            self.buf.clear();
            let read = self.reader.read_until(b'\n', &mut self.buf).await?;
            if read == 0 {
                return Ok(false);
            }
            self.line_number += 1;
            if !self.buf.iter().all(u8::is_ascii_whitespace) {
                return Ok(true);
            }
        }
    }

    fn current_line(&self) -> std::result::Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.buf).map(str::trim)
    }
}

/// Reads a whole JSONL file, collecting warnings for lines that fail to parse.
///
/// A missing file is an error; an empty file yields no values and no
/// warnings.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read.
pub async fn read_jsonl_resilient<T, P>(path: P) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref()).await?;
    JsonlReader::new(file).read_all_resilient().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Cursor;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: u32,
        name: String,
    }

    #[test]
    fn new_reader_starts_at_line_zero() {
        let reader = JsonlReader::new(Cursor::new(b""));
        assert_eq!(reader.line_number(), 0);
    }

    #[tokio::test]
    async fn read_value_returns_rows_in_order() {
        let data = b"{\"id\":1,\"name\":\"a\"}\n{\"id\":2,\"name\":\"b\"}\n";
        let mut reader = JsonlReader::new(Cursor::new(&data[..]));

        let first: Row = reader.read_value().await.unwrap().unwrap();
        assert_eq!(first, Row { id: 1, name: "a".into() });
        assert_eq!(reader.line_number(), 1);

        let second: Row = reader.read_value().await.unwrap().unwrap();
        assert_eq!(second.id, 2);
        assert!(reader.read_value::<Row>().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_lines_are_skipped_but_counted() {
        let data = b"\n   \n{\"id\":7,\"name\":\"x\"}";
        let mut reader = JsonlReader::new(Cursor::new(&data[..]));

        let row: Row = reader.read_value().await.unwrap().unwrap();
        assert_eq!(row.id, 7);
        assert_eq!(reader.line_number(), 3);
    }

    #[tokio::test]
    async fn malformed_line_reports_line_number() {
        let data = b"{\"id\":1,\"name\":\"a\"}\n{not json}\n";
        let mut reader = JsonlReader::new(Cursor::new(&data[..]));

        reader.read_value::<Row>().await.unwrap();
        let err = reader.read_value::<Row>().await.unwrap_err();
        assert!(matches!(err, Error::Json { line: 2, .. }));
    }

    #[tokio::test]
    async fn resilient_read_collects_warnings() {
        let mut data = b"{\"id\":1,\"name\":\"a\"}\n{broken\n".to_vec();
        data.extend_from_slice(&[0xff, 0xfe, b'\n']);
        data.extend_from_slice(b"{\"id\":4,\"name\":\"d\"}\n");
        let mut reader = JsonlReader::new(Cursor::new(data));

        let (rows, warnings): (Vec<Row>, _) = reader.read_all_resilient().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id, 4);
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].kind(), "malformed_json");
        assert_eq!(warnings[0].line_number(), 2);
        assert_eq!(warnings[1].kind(), "skipped_line");
        assert_eq!(warnings[1].line_number(), 3);
    }
}
