// Utility functions
pub mod sanitize;
pub mod validation;

/// Normalize a tag name: trimmed and lowercased. Blank names yield `None`.
pub fn normalize_tag(name: &str) -> Option<String> {
    let normalized = name.trim().to_lowercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Separates several tag names inside one value, on write and in filters alike
pub const TAG_SEPARATOR: char = ',';

/// Normalize a list of tag names, dropping blanks and duplicates while
/// keeping first-seen order. A name containing [`TAG_SEPARATOR`] yields
/// one tag per part.
pub fn normalize_tags<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = Vec::new();
    for name in names {
        for part in name.as_ref().split(TAG_SEPARATOR) {
            if let Some(tag) = normalize_tag(part) {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }
    }
    tags
}

/// Escape `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'` pattern
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
