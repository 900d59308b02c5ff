//! Lab result classification for HL7 v2 observation messages.
//!
//! The pipeline decodes a message with [`ferrum_hl7`], extracts OBX
//! observations, and classifies each one against a [`ReferenceRangeIndex`]:
//!
//! ```
//! use ferrum_labs::{analyze, ReferenceRangeIndex, ReferenceRow};
//!
//! let index = ReferenceRangeIndex::new([ReferenceRow::new("2345-7", "mg/dL", "70", "100")]);
//! let results = analyze("OBX|1|NM|2345-7^Glucose||120|mg/dL", &index).unwrap();
//! assert!(results[0].is_abnormal);
//! assert_eq!(results[0].range, "70 - 100");
//! ```
//!
//! Defective observations and observations without a reference row are
//! dropped from the result. Only an undecodable message is an error.

#![forbid(unsafe_code)]

mod classify;
mod error;
mod number;
mod observation;
mod reference;
mod source;
mod units;

pub use classify::{classify, ClassifiedObservation, Classifier};
pub use error::{Error, Result};
pub use number::parse_leading_float;
pub use observation::{extract_observations, Observation};
pub use reference::{ReferenceRange, ReferenceRangeIndex, ReferenceRow};
pub use source::{ReferenceIndexCell, ReferenceSource, StaticSource};
pub use units::normalize_units;

/// Parse, extract and classify one message.
pub fn analyze(text: &str, index: &ReferenceRangeIndex) -> Result<Vec<ClassifiedObservation>> {
    let message = ferrum_hl7::parse(text)?;
    let observations = extract_observations(&message.segments, &message.delimiters);
    let results = Classifier::new(index).classify_all(&observations);
    tracing::debug!(
        segments = message.segments.len(),
        observations = observations.len(),
        classified = results.len(),
        "Message analyzed"
    );
    Ok(results)
}

/// [`analyze`] over a raw byte buffer.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn analyze_bytes(
    bytes: &[u8],
    index: &ReferenceRangeIndex,
) -> Result<Vec<ClassifiedObservation>> {
    analyze(&String::from_utf8_lossy(bytes), index)
}
