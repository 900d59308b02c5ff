use crate::number::parse_leading_float;
use crate::units::{leading_component, normalize_units};
use ferrum_hl7::{Delimiters, FieldValue, Segment};

const OBX: &str = "OBX";
const OBX_CODE: usize = 3;
const OBX_VALUE: usize = 5;
const OBX_UNITS: usize = 6;

/// A lab result read from one OBX segment.
///
/// Only built through [`Observation::new`], so the code and units are never
/// empty and the value is always finite.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    code: String,
    value: f64,
    units: String,
}

impl Observation {
    pub fn new(code: impl Into<String>, value: f64, units: impl Into<String>) -> Option<Self> {
        let code = code.into();
        let units = units.into();
        if code.is_empty() || units.is_empty() || !value.is_finite() {
            return None;
        }
        Some(Self { code, value, units })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    /// Read an observation out of an OBX segment.
    ///
    /// The code is the identifier of the first coded entry of OBX-3, so a
    /// repeated `2345-7^Glucose^LN~...` still yields `2345-7`. Returns `None`
    /// for any other segment type and for OBX segments missing a usable code,
    /// numeric value or units.
    pub fn from_segment(segment: &Segment, delimiters: &Delimiters) -> Option<Self> {
        if !segment.is_type(OBX) {
            return None;
        }

        let code = segment
            .field(OBX_CODE)
            .and_then(FieldValue::first_atom)
            .map(|raw| leading_component(raw, delimiters.component))
            .unwrap_or_default();
        let value = segment
            .field(OBX_VALUE)
            .and_then(FieldValue::first_atom)
            .and_then(parse_leading_float);
        let units = segment
            .field(OBX_UNITS)
            .map(|field| normalize_units(field, delimiters.component))
            .unwrap_or_default();

        let observation = value.and_then(|value| Observation::new(code, value, units));
        if observation.is_none() {
            tracing::debug!(
                code = %code,
                value = ?segment.field(OBX_VALUE),
                "Dropping OBX segment without code, numeric value or units"
            );
        }
        observation
    }
}

/// Observations of every valid OBX segment, in segment order.
///
/// `delimiters` are those of the message the segments were decoded from.
pub fn extract_observations(segments: &[Segment], delimiters: &Delimiters) -> Vec<Observation> {
    segments
        .iter()
        .filter_map(|segment| Observation::from_segment(segment, delimiters))
        .collect()
}
