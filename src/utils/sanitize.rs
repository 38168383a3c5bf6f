// Sanitization utilities

/// Sanitize user-authored profile text.
/// Markup is reduced to ammonia's safe subset and surrounding whitespace is trimmed.
pub fn sanitize_user_text(text: &str) -> String {
    ammonia::clean(text).trim().to_string()
}
