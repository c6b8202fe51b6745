//! Cell codec for list-valued fields.
//!
//! Lists are stored as one cell joined with `", "`. Decoding splits on `,`,
//! trims each part and drops empty parts. The round-trip is lossy for values
//! that contain a comma or are blank after trimming; such values cannot be
//! represented in a single cell.

/// Separator written between list items.
pub const LIST_SEPARATOR: &str = ", ";

/// Join values into a single cell. An empty list encodes to an empty cell.
pub fn encode_list<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

/// Split a cell back into its values.
pub fn decode_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}
