//! Error types for lab result classification

use ferrum_hl7::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Message parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Reference table error: {0}")]
    ReferenceTable(#[from] csv::Error),

    #[error("Reference source error: {0}")]
    ReferenceSource(String),
}

pub type Result<T> = std::result::Result<T, Error>;
