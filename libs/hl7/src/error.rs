use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("HL7 message is empty")]
    Empty,

    #[error("HL7 message contains no segments")]
    NoSegments,
}
