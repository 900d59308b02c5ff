use crate::observation::Observation;
use crate::reference::{ReferenceRange, ReferenceRangeIndex};
use serde::{Serialize, Serializer};

/// An observation checked against its reference range.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedObservation {
    pub code: String,
    #[serde(serialize_with = "serialize_value")]
    pub value: f64,
    pub units: String,
    pub is_abnormal: bool,
    pub range: String,
}

/// Largest magnitude below which every integral f64 is exact as an i64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Integral values are written as JSON integers (`95`, not `95.0`).
fn serialize_value<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Classify one observation against a range.
///
/// The value is abnormal when it lies strictly outside `[lower, upper]`. A
/// bound that is not a number never flags the value.
pub fn classify(observation: &Observation, range: &ReferenceRange) -> ClassifiedObservation {
    let value = observation.value();
    ClassifiedObservation {
        code: observation.code().to_string(),
        value,
        units: observation.units().to_string(),
        is_abnormal: value < range.lower || value > range.upper,
        range: range.display(),
    }
}

/// Classifies observations against a shared reference index.
#[derive(Clone, Copy, Debug)]
pub struct Classifier<'a> {
    index: &'a ReferenceRangeIndex,
}

impl<'a> Classifier<'a> {
    pub fn new(index: &'a ReferenceRangeIndex) -> Self {
        Self { index }
    }

    /// Classify against the first matching table row.
    ///
    /// Returns `None` when no row lists the observation's code and units.
    pub fn classify(&self, observation: &Observation) -> Option<ClassifiedObservation> {
        let range = self
            .index
            .first_match(observation.code(), observation.units());
        if range.is_none() {
            tracing::debug!(
                code = observation.code(),
                units = observation.units(),
                "No reference range for observation"
            );
        }
        range.map(|range| classify(observation, range))
    }

    /// Classify every observation that has a reference range, keeping order.
    pub fn classify_all(&self, observations: &[Observation]) -> Vec<ClassifiedObservation> {
        observations
            .iter()
            .filter_map(|observation| self.classify(observation))
            .collect()
    }
}
