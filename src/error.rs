use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Load-time failures (fatal: no report is computed)
// ---------------------------------------------------------------------------

/// The opportunity source is missing, unreadable or not a valid table.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("unreadable Arrow batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("source is not tabular: {0}")]
    NotTabular(String),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("{at}: column '{column}' has invalid value '{value}'")]
    InvalidValue {
        at: SourcePosition,
        column: &'static str,
        value: String,
    },
}

/// Where a bad cell sits in its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePosition {
    /// 1-based text line where the CSV record starts.
    Line(u64),
    /// 1-based record number (JSON array element, Parquet row).
    Record(usize),
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourcePosition::Line(n) => write!(f, "line {n}"),
            SourcePosition::Record(n) => write!(f, "record {n}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-record failures (recovered locally)
// ---------------------------------------------------------------------------

/// A `Deal_Closure_Date` that does not parse as a date.
///
/// The record is excluded from revenue computations; it is never surfaced as a
/// hard failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparsable closure date '{value}'")]
pub struct DateParseError {
    pub value: String,
}

// ---------------------------------------------------------------------------
// Export failures
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer flush failed: {0}")]
    Flush(#[from] csv::IntoInnerError<csv::Writer<Vec<u8>>>),

    #[error("writing export failed: {0}")]
    Io(#[from] std::io::Error),
}
