//! Canonical text form used by every extractor.

/// Upper-case the text and collapse every whitespace run (line breaks
/// included) into a single space.
pub fn normalize_text(raw: &str) -> String {
    let upper = raw.to_uppercase();
    let mut output = String::with_capacity(upper.len());

    for word in upper.split_whitespace() {
        if !output.is_empty() {
            output.push(' ');
        }
        output.push_str(word);
    }

    output
}
