//! Per-table file persistence.
//!
//! One table owns exactly one backing file. The format is line-oriented:
//! the first line is a header record carrying the table name and the
//! current primary-sequence value, followed by one JSON record per row
//! in insertion order.
//!
//! Every committed mutation rewrites the file via write-new-then-replace:
//! the new contents go to a sibling `.tmp` file, are synced, and then
//! atomically renamed over the live file. A crash mid-write leaves the
//! previous consistent file intact.

use std::{
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use simpledb_types::{decode_line, encode_line, Row, RowId};
use snafu::ResultExt;

use crate::error::{CodecSnafu, CorruptedSnafu, IoSnafu, Result};

/// First line of every table file.
#[derive(Debug, Serialize, Deserialize)]
struct Header {
    table: String,
    sequence: RowId,
}

/// Owns the backing file of one table. The table store is the sole
/// writer; no other component touches the file.
pub(crate) struct TableFile {
    path: PathBuf,
    tmp_path: PathBuf,
    sync_on_write: bool,
}

impl TableFile {
    pub(crate) fn new(root: &Path, table: &str, extension: &str, sync_on_write: bool) -> Self {
        let path = root.join(format!("{table}.{extension}"));
        let tmp_path = root.join(format!("{table}.{extension}.tmp"));
        Self { path, tmp_path, sync_on_write }
    }

    /// The live file path.
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Loads all rows and the persisted sequence.
    ///
    /// Returns `None` if the file does not exist or is zero-length
    /// (a fresh table).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read,
    /// [`Error::Corrupted`] if the header names a different table or a
    /// line is malformed, and [`Error::Codec`] if a record fails to
    /// decode.
    pub(crate) fn load<R: Row>(&self) -> Result<Option<(Vec<R>, RowId)>> {
        let file = match OpenOptions::new().read(true).open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err).context(IoSnafu { path: self.path.clone() }),
        };

        let mut lines = BufReader::new(file).lines();

        let header_line = match lines.next() {
            Some(line) => line.context(IoSnafu { path: self.path.clone() })?,
            // Zero-length file: treat as fresh.
            None => return Ok(None),
        };
        let header: Header = decode_line(&header_line).context(CodecSnafu)?;
        if header.table != R::TABLE {
            return CorruptedSnafu {
                path: self.path.clone(),
                reason: format!("header names table {:?}, expected {:?}", header.table, R::TABLE),
            }
            .fail();
        }

        let mut rows = Vec::new();
        for line in lines {
            let line = line.context(IoSnafu { path: self.path.clone() })?;
            if line.is_empty() {
                continue;
            }
            let row: R = decode_line(&line).context(CodecSnafu)?;
            rows.push(row);
        }

        tracing::debug!(
            table = R::TABLE,
            rows = rows.len(),
            sequence = header.sequence,
            "loaded table file"
        );
        Ok(Some((rows, header.sequence)))
    }

    /// Rewrites the file with the given rows and sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the temporary file cannot be written,
    /// synced, or renamed, and [`Error::Codec`] if a record fails to
    /// encode. The live file is untouched on any failure.
    pub(crate) fn rewrite<R: Row>(&self, sequence: RowId, rows: &[R]) -> Result<()> {
        let mut contents = String::new();
        let header = Header { table: R::TABLE.to_string(), sequence };
        contents.push_str(&encode_line(&header).context(CodecSnafu)?);
        contents.push('\n');
        for row in rows {
            contents.push_str(&encode_line(row).context(CodecSnafu)?);
            contents.push('\n');
        }

        self.replace_with(&contents)
    }

    fn replace_with(&self, contents: &str) -> Result<()> {
        {
            let mut tmp =
                File::create(&self.tmp_path).context(IoSnafu { path: self.tmp_path.clone() })?;
            tmp.write_all(contents.as_bytes())
                .context(IoSnafu { path: self.tmp_path.clone() })?;
            if self.sync_on_write {
                tmp.sync_all().context(IoSnafu { path: self.tmp_path.clone() })?;
            }
        }

        fs::rename(&self.tmp_path, &self.path).context(IoSnafu { path: self.path.clone() })?;
        Ok(())
    }
}

impl std::fmt::Debug for TableFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableFile").field("path", &self.path).finish()
    }
}
