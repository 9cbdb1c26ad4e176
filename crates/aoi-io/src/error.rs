//! Worksheet adapter errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorksheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("row {row}: invalid {column} value {value:?}")]
    InvalidField {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("worksheet has no header row")]
    EmptyWorksheet,
}
