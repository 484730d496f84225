//! Reading and writing persisted tab documents.
//!
//! Documents are stored as JSON; YAML is accepted too, which makes hand-written
//! fixtures and demo tabs easier to read. [`parse`] picks the format from the first
//! non-blank character.

use crate::document::TabDocument;
use crate::error::TablineError;

/// Parse a tab document from JSON or YAML source.
///
/// # Example
/// ```
/// use tabline::parse;
///
/// let yaml = r#"
/// title: Warmup
/// bpm: 90
/// sections:
///   - id: intro
///     data:
///       - type: tab
///         bpm: -1
///         data:
///           - ["", "", "", "", "", "", "0", "", "quarter", "c1"]
/// "#;
///
/// let document = parse(yaml).unwrap();
/// assert_eq!(document.title, "Warmup");
/// assert_eq!(document.bpm, Some(90.0));
/// assert_eq!(document.sections[0].subsections[0].bpm(), None);
/// ```
pub fn parse(source: &str) -> Result<TabDocument, TablineError> {
    match source.trim_start().chars().next() {
        Some('{') => parse_json(source),
        _ => parse_yaml(source),
    }
}

pub fn parse_json(source: &str) -> Result<TabDocument, TablineError> {
    Ok(serde_json::from_str(source)?)
}

pub fn parse_yaml(source: &str) -> Result<TabDocument, TablineError> {
    Ok(serde_yaml::from_str(source)?)
}

/// Serialize a document back to its persisted JSON shape.
pub fn to_json(document: &TabDocument) -> String {
    // A TabDocument only holds strings, numbers and sequences, which always serialize
    serde_json::to_string_pretty(document).unwrap_or_default()
}
