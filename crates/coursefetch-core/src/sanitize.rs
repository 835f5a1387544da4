//! Filename sanitization for course, module, and content titles.

/// Sanitizes one path segment for safe use as a directory or file name.
///
/// Allowlist approach: ASCII letters, digits, and `-_.() ` survive; every
/// other character becomes `_`. Leading/trailing whitespace is trimmed.
/// An input that sanitizes to nothing yields `"untitled"` so callers never
/// produce an empty path segment.
pub fn sanitize_segment(name: &str) -> String {
    let out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '(' | ')' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = out.trim();
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}
