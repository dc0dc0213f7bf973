//! Header-to-tag normalization.
//!
//! Free-text spreadsheet column headers become structurally valid element
//! names for the hierarchical store: `"Data d'incidència"` →
//! `"Data_d_incidència"`. The function is total and deterministic; it never
//! checks uniqueness across headers (the converter does that, failing loudly
//! on collisions).

/// Normalize a raw column header into a valid element tag.
///
/// Surrounding whitespace is trimmed, every character outside
/// alphanumerics / `_` / `-` / `.` becomes `_`, and a leading underscore is
/// inserted if the result would start with a digit. An empty or
/// entirely-symbolic header normalizes to an empty or underscore-only
/// string, which is accepted as a degenerate tag.
pub fn safe_tag(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut tag = String::with_capacity(trimmed.len() + 1);
    for ch in trimmed.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == '-' || ch == '.' {
            tag.push(ch);
        } else {
            tag.push('_');
        }
    }
    if tag.chars().next().is_some_and(char::is_numeric) {
        tag.insert(0, '_');
    }
    tag
}
