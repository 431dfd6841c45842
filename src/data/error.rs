use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::model::Column;

// ---------------------------------------------------------------------------
// DataSourceError – fatal for the whole session
// ---------------------------------------------------------------------------

/// The backing file could not be turned into an incident table.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid {format} table: {message}", path.display())]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    #[error("{} is missing required column(s): {}", path.display(), join_columns(missing))]
    MissingColumns { path: PathBuf, missing: Vec<Column> },

    #[error("unsupported file extension: .{extension}")]
    UnsupportedFormat { extension: String },
}

impl DataSourceError {
    pub(crate) fn parse(path: &std::path::Path, format: &'static str, err: impl fmt::Display) -> Self {
        DataSourceError::Parse {
            path: path.to_path_buf(),
            format,
            message: err.to_string(),
        }
    }
}

fn join_columns(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| c.header())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// RowParseWarning – one bad cell, row kept with a null
// ---------------------------------------------------------------------------

/// A single cell that could not be parsed. The row is retained with a null
/// in the affected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowParseWarning {
    /// Zero-based data row (header excluded).
    pub row: usize,
    pub column: Column,
    pub value: String,
    pub reason: &'static str,
}

impl fmt::Display for RowParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}: {} value '{}' {}",
            self.row,
            self.column.header(),
            self.value,
            self.reason
        )
    }
}

// ---------------------------------------------------------------------------
// EmptyResultNotice – the current selection matches nothing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyResultNotice;

impl fmt::Display for EmptyResultNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("No data for selected filters.")
    }
}
