use ferrum_hl7::FieldValue;

/// Resolve a units field (OBX-6) to its unit code.
///
/// `component` is the message's component separator. An atom yields the text
/// before its first component separator, trimmed. A list yields the same for
/// its first element when that element is an atom. Every other shape (empty
/// list, nested list) yields an empty string, which makes the owning
/// observation invalid.
pub fn normalize_units(field: &FieldValue, component: char) -> String {
    match field {
        FieldValue::Atom(raw) => leading_component(raw, component).to_string(),
        FieldValue::List(items) => match items.first() {
            Some(FieldValue::Atom(raw)) => leading_component(raw, component).to_string(),
            Some(FieldValue::List(_)) | None => String::new(),
        },
    }
}

/// Text before the first `component` separator, trimmed.
///
/// Repetitions keep their raw text, so the first repetition of a coded field
/// may still carry its components.
pub(crate) fn leading_component(raw: &str, component: char) -> &str {
    raw.split(component).next().unwrap_or_default().trim()
}
