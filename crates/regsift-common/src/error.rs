use thiserror::Error;

use crate::client::FetchError;

#[derive(Debug, Error)]
pub enum RegsiftError {
    #[error("HTTP fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RegsiftError>;
