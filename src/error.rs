use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong inside the categorization engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("The statement is missing the required column {column:?}.")]
    Schema { column: String },

    #[error("Row {row}: the {column} value {value:?} cannot be read.")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },

    #[error("The rule file {path:?} is corrupt: {reason}")]
    CorruptStore { path: PathBuf, reason: String },

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("The category {0:?} is reserved and cannot hold keywords.")]
    ReservedCategory(String),

    #[error("{0:?} is not a usable category name.")]
    InvalidCategoryName(String),

    #[error("Cannot add an empty keyword to the category {0:?}.")]
    EmptyKeyword(String),

    #[error("The edited batch has {edited} transactions but the original has {original}.")]
    BatchMismatch { original: usize, edited: usize },

    #[error("Row {row}: only the category may be changed during review, but {column} was edited.")]
    ReviewedRowChanged { row: usize, column: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
