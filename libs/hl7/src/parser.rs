//! Segment and field decoding.

use crate::error::{ParseError, Result};
use crate::field::{FieldValue, Segment};

/// MLLP framing bytes that may wrap a message received over the wire.
const MLLP_START_BLOCK: char = '\u{0b}';
const MLLP_END_BLOCK: char = '\u{1c}';

/// Delimiter characters of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delimiters {
    pub field: char,
    pub component: char,
    pub repetition: char,
    pub escape: char,
    pub subcomponent: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            field: '|',
            component: '^',
            repetition: '~',
            escape: '\\',
            subcomponent: '&',
        }
    }
}

impl Delimiters {
    /// Read the delimiters declared by an MSH segment line.
    ///
    /// MSH-1 is the character right after `MSH`; MSH-2 lists the component,
    /// repetition, escape and subcomponent characters in that order. Missing
    /// encoding characters keep their default.
    pub fn from_msh(line: &str) -> Option<Self> {
        let rest = line.strip_prefix("MSH")?;
        let mut chars = rest.chars();
        let field = chars.next()?;
        if field.is_alphanumeric() || field.is_whitespace() {
            return None;
        }

        let mut delimiters = Delimiters {
            field,
            ..Delimiters::default()
        };
        let mut encoding = chars.take_while(|c| *c != field);
        if let Some(c) = encoding.next() {
            delimiters.component = c;
        }
        if let Some(c) = encoding.next() {
            delimiters.repetition = c;
        }
        if let Some(c) = encoding.next() {
            delimiters.escape = c;
        }
        if let Some(c) = encoding.next() {
            delimiters.subcomponent = c;
        }
        Some(delimiters)
    }
}

/// A decoded message: its delimiters and segments in source order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub delimiters: Delimiters,
    pub segments: Vec<Segment>,
}

impl Message {
    /// Segments of the given type, in source order.
    pub fn segments_of_type<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Segment> {
        self.segments.iter().filter(move |s| s.is_type(code))
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }
}

/// Decode a raw HL7 v2 message.
///
/// Segments may be terminated by `\r`, `\n` or `\r\n`. Blank lines and lines
/// without a segment name are skipped.
pub fn parse(text: &str) -> Result<Message> {
    let text = text.trim_matches(|c: char| c.is_whitespace() || is_framing(c));
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut lines = text
        .split(|c: char| c == '\r' || c == '\n')
        .map(|line| line.trim_matches(|c: char| c.is_whitespace() || is_framing(c)))
        .filter(|line| !line.is_empty())
        .peekable();

    let delimiters = lines
        .peek()
        .and_then(|first| Delimiters::from_msh(first))
        .unwrap_or_default();

    let segments: Vec<Segment> = lines
        .filter_map(|line| parse_segment(line, &delimiters))
        .collect();

    if segments.is_empty() {
        return Err(ParseError::NoSegments);
    }

    Ok(Message {
        delimiters,
        segments,
    })
}

fn is_framing(c: char) -> bool {
    c == MLLP_START_BLOCK || c == MLLP_END_BLOCK
}

fn parse_segment(line: &str, delimiters: &Delimiters) -> Option<Segment> {
    let fields = match msh_body(line, delimiters.field) {
        Some(body) => parse_msh_fields(body, delimiters),
        None => line
            .split(delimiters.field)
            .map(|raw| decode_field(raw, delimiters))
            .collect(),
    };

    let segment = Segment::new(fields);
    match segment.type_code() {
        Some(code) if !code.is_empty() => Some(segment),
        _ => None,
    }
}

/// The text after `MSH<field separator>`, if the line is an MSH segment.
fn msh_body(line: &str, field_sep: char) -> Option<&str> {
    line.strip_prefix("MSH")?.strip_prefix(field_sep)
}

/// MSH-1 is the field separator itself and MSH-2 the encoding characters.
/// Neither is split.
fn parse_msh_fields(body: &str, delimiters: &Delimiters) -> Vec<FieldValue> {
    let mut fields = vec![
        FieldValue::atom("MSH"),
        FieldValue::Atom(delimiters.field.to_string()),
    ];

    let mut parts = body.split(delimiters.field);
    if let Some(encoding) = parts.next() {
        fields.push(FieldValue::atom(encoding));
    }
    fields.extend(parts.map(|raw| decode_field(raw, delimiters)));
    fields
}

fn decode_field(raw: &str, delimiters: &Delimiters) -> FieldValue {
    if raw.contains(delimiters.repetition) {
        // Repetitions keep their raw text, components included.
        FieldValue::List(
            raw.split(delimiters.repetition)
                .map(FieldValue::atom)
                .collect(),
        )
    } else if raw.contains(delimiters.component) {
        FieldValue::List(raw.split(delimiters.component).map(FieldValue::atom).collect())
    } else {
        FieldValue::atom(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msh_delimiters_are_detected() {
        let d = Delimiters::from_msh("MSH#*@!%#APP").unwrap();
        assert_eq!(d.field, '#');
        assert_eq!(d.component, '*');
        assert_eq!(d.repetition, '@');
        assert_eq!(d.escape, '!');
        assert_eq!(d.subcomponent, '%');
    }

    #[test]
    fn short_encoding_keeps_defaults() {
        let d = Delimiters::from_msh("MSH|^|APP").unwrap();
        assert_eq!(d.component, '^');
        assert_eq!(d.repetition, '~');
        assert_eq!(d.subcomponent, '&');
    }

    #[test]
    fn non_msh_line_has_no_delimiters() {
        assert!(Delimiters::from_msh("PID|1").is_none());
        assert!(Delimiters::from_msh("MSHX").is_none());
    }

    #[test]
    fn repetition_wins_over_components() {
        let d = Delimiters::default();
        assert_eq!(
            decode_field("a^b~c", &d),
            FieldValue::List(vec!["a^b".into(), "c".into()])
        );
    }
}
