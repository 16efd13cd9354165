use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Ingestion errors – fatal at startup
// ---------------------------------------------------------------------------

/// Raised while turning a raw row set into a typed [`Table`](crate::data::model::Table).
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{source_name}: table has no rows")]
    Empty { source_name: String },

    #[error("{source_name}: missing required column '{column}'")]
    MissingColumn {
        source_name: String,
        column: &'static str,
    },

    #[error("{source_name}, row {row}: '{value}' is not a valid date")]
    InvalidDate {
        source_name: String,
        row: usize,
        value: String,
    },

    #[error("{source_name}, row {row}: column '{column}' has invalid value '{value}'")]
    InvalidValue {
        source_name: String,
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("{source_name}: unsupported column type {data_type} for '{column}'")]
    UnsupportedColumn {
        source_name: String,
        column: String,
        data_type: String,
    },

    #[error("{source_name}: {message}")]
    Malformed {
        source_name: String,
        message: String,
    },

    #[error("reading {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing CSV")]
    Csv(#[from] csv::Error),

    #[error("parsing JSON")]
    Json(#[from] serde_json::Error),

    #[error("reading parquet")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("reading arrow batch")]
    Arrow(#[from] arrow::error::ArrowError),
}

// ---------------------------------------------------------------------------
// Filter errors – recoverable, the caller keeps its previous selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A range predicate whose lower bound exceeds its upper bound.
    #[error("invalid {field} range: {lower} > {upper}")]
    InvalidRange {
        field: &'static str,
        lower: String,
        upper: String,
    },

    /// A category code outside the declared set was requested.
    #[error("unknown {field} code {code}")]
    UnknownCategory { field: &'static str, code: u8 },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
