//! Bounded section search.
//!
//! A label that appears in the SCEE block may also appear later in an
//! unrelated section, so SCEE searches only look at a fixed number of
//! characters after the section anchor.

use super::patterns::SCEE_ANCHOR;

/// Slice of at most `len` characters starting at byte offset `start`.
///
/// `start` must sit on a character boundary; the end is clamped to the text
/// and never splits a character.
pub fn char_window(text: &str, start: usize, len: usize) -> &str {
    let rest = &text[start..];
    let end = rest
        .char_indices()
        .nth(len)
        .map_or(rest.len(), |(i, _)| i);
    &rest[..end]
}

/// The SCEE block: `len` characters from the first `INFORMAÇÕES DO SCEE`.
pub fn scee_window(text: &str, len: usize) -> Option<&str> {
    let start = text.find(SCEE_ANCHOR)?;
    Some(char_window(text, start, len))
}

/// Text after the first `label`, up to the earliest of `stops` (or the end).
pub fn segment_until<'a>(text: &'a str, label: &str, stops: &[&str]) -> Option<&'a str> {
    let start = text.find(label)? + label.len();
    let rest = &text[start..];
    let end = stops
        .iter()
        .filter_map(|stop| rest.find(stop))
        .min()
        .unwrap_or(rest.len());
    Some(&rest[..end])
}
