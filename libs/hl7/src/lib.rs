//! HL7 v2 message decoding.
//!
//! Splits a pipe-delimited HL7 v2 message into segments and decodes each field
//! into a [`FieldValue`]. Only one level of structure is decoded: a field with
//! repetitions becomes a list of raw repetitions, a field with components
//! becomes a list of components.

#![forbid(unsafe_code)]

mod error;
mod field;
mod parser;

pub use error::{ParseError, Result};
pub use field::{FieldValue, Segment};
pub use parser::{parse, Delimiters, Message};
