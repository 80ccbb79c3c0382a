//! Error types for CSV export and import.

use std::path::PathBuf;

use abpanel_model::PanelError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    /// Failed to create or open a file.
    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read or write CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Required column absent from an imported file.
    #[error("Missing column '{column}'")]
    MissingColumn { column: &'static str },

    /// A data row that the inventory would not accept.
    #[error("Row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: PanelError,
    },
}

pub type Result<T> = std::result::Result<T, ReportError>;
