//! Reference ranges and the lookup index built from the reference table.

use crate::error::Result;
use crate::number::parse_leading_float;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::io;

const LIST_SEPARATOR: char = ';';

/// One raw row of the reference table.
///
/// Codes and units are `;`-separated lists. Column names follow the
/// diagnostic metrics export the table is produced from.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ReferenceRow {
    #[serde(rename = "oru_sonic_codes")]
    pub codes: String,
    #[serde(rename = "oru_sonic_units")]
    pub units: String,
    #[serde(rename = "everlab_lower")]
    pub lower: String,
    #[serde(rename = "everlab_higher")]
    pub upper: String,
}

impl ReferenceRow {
    pub fn new(
        codes: impl Into<String>,
        units: impl Into<String>,
        lower: impl Into<String>,
        upper: impl Into<String>,
    ) -> Self {
        Self {
            codes: codes.into(),
            units: units.into(),
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    /// Read rows from CSV with a header line, in file order.
    ///
    /// Columns other than the four reference columns are ignored.
    pub fn read_csv<R: io::Read>(reader: R) -> Result<Vec<ReferenceRow>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        let rows = reader
            .deserialize()
            .collect::<std::result::Result<Vec<ReferenceRow>, csv::Error>>()?;
        Ok(rows)
    }
}

/// A parsed reference table row.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceRange {
    pub codes: BTreeSet<String>,
    pub units: BTreeSet<String>,
    /// Lower bound; NaN when the table text is not a number.
    pub lower: f64,
    pub lower_text: String,
    /// Upper bound; NaN when the table text is not a number.
    pub upper: f64,
    pub upper_text: String,
}

impl ReferenceRange {
    pub fn from_row(row: &ReferenceRow) -> Self {
        let lower_text = row.lower.clone();
        let upper_text = row.upper.clone();
        Self {
            codes: split_list(&row.codes),
            units: split_list(&row.units),
            lower: parse_leading_float(&lower_text).unwrap_or(f64::NAN),
            lower_text,
            upper: parse_leading_float(&upper_text).unwrap_or(f64::NAN),
            upper_text,
        }
    }

    pub fn matches(&self, code: &str, units: &str) -> bool {
        self.codes.contains(code) && self.units.contains(units)
    }

    /// Display form of the range, built from the table text so no precision
    /// is lost.
    pub fn display(&self) -> String {
        format!("{} - {}", self.lower_text, self.upper_text)
    }
}

fn split_list(raw: &str) -> BTreeSet<String> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read-only index over the reference table, keyed by exact `(code, units)`.
#[derive(Clone, Debug, Default)]
pub struct ReferenceRangeIndex {
    ranges: Vec<ReferenceRange>,
    // code -> units -> row positions, ascending
    by_key: HashMap<String, HashMap<String, Vec<usize>>>,
}

impl ReferenceRangeIndex {
    pub fn new(rows: impl IntoIterator<Item = ReferenceRow>) -> Self {
        let ranges: Vec<ReferenceRange> = rows
            .into_iter()
            .map(|row| ReferenceRange::from_row(&row))
            .collect();

        let mut by_key: HashMap<String, HashMap<String, Vec<usize>>> = HashMap::new();
        for (position, range) in ranges.iter().enumerate() {
            for code in &range.codes {
                let by_units = by_key.entry(code.clone()).or_default();
                for units in &range.units {
                    by_units.entry(units.clone()).or_default().push(position);
                }
            }
        }

        Self { ranges, by_key }
    }

    /// Build the index straight from CSV text.
    pub fn from_csv<R: io::Read>(reader: R) -> Result<Self> {
        Ok(Self::new(ReferenceRow::read_csv(reader)?))
    }

    /// All ranges listing both `code` and `units`, in table order.
    pub fn lookup(&self, code: &str, units: &str) -> Vec<&ReferenceRange> {
        self.positions(code, units)
            .iter()
            .map(|&position| &self.ranges[position])
            .collect()
    }

    /// The earliest table row listing both `code` and `units`.
    pub fn first_match(&self, code: &str, units: &str) -> Option<&ReferenceRange> {
        self.positions(code, units)
            .first()
            .map(|&position| &self.ranges[position])
    }

    fn positions(&self, code: &str, units: &str) -> &[usize] {
        self.by_key
            .get(code)
            .and_then(|by_units| by_units.get(units))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn ranges(&self) -> &[ReferenceRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of distinct `(code, units)` keys.
    pub fn key_count(&self) -> usize {
        self.by_key.values().map(HashMap::len).sum()
    }
}
