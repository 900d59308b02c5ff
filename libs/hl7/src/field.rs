#[cfg(feature = "serde")]
use serde::Serialize;

/// A decoded field value.
///
/// HL7 fields are either a plain string or carry one level of structure
/// (repetitions or components). Consumers match on the variant instead of
/// inspecting the raw text.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(untagged))]
pub enum FieldValue {
    Atom(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn atom(value: impl Into<String>) -> Self {
        FieldValue::Atom(value.into())
    }

    /// The string content, if this is an atom.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            FieldValue::Atom(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }

    /// The leading value: the atom itself, or the first element of a list.
    pub fn first(&self) -> Option<&FieldValue> {
        match self {
            FieldValue::Atom(_) => Some(self),
            FieldValue::List(items) => items.first(),
        }
    }

    /// The leading value as a string, if it is an atom.
    ///
    /// `Atom("a")` and `List([Atom("a"), ..])` both yield `"a"`; an empty list
    /// or a list whose first element is itself a list yields `None`.
    pub fn first_atom(&self) -> Option<&str> {
        self.first().and_then(FieldValue::as_atom)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Atom(s) => s.is_empty(),
            FieldValue::List(items) => items.iter().all(FieldValue::is_empty),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Atom(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Atom(value)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        FieldValue::List(items)
    }
}

/// One segment of a message. Field 0 holds the segment type code.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(transparent))]
pub struct Segment {
    pub fields: Vec<FieldValue>,
}

impl Segment {
    pub fn new(fields: Vec<FieldValue>) -> Self {
        Self { fields }
    }

    pub fn field(&self, index: usize) -> Option<&FieldValue> {
        self.fields.get(index)
    }

    /// Segment type code (e.g. `OBX`), trimmed.
    pub fn type_code(&self) -> Option<&str> {
        self.field(0).and_then(FieldValue::first_atom).map(str::trim)
    }

    pub fn is_type(&self, code: &str) -> bool {
        self.type_code() == Some(code)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
