// Validation utilities
use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

/// bcrypt only looks at the first 72 bytes of a password
const MAX_PASSWORD_BYTES: usize = 72;

/// Validate an email address and return it trimmed
pub fn validate_email(email: &str) -> Result<String> {
    let email = email.trim();
    if email.len() > 255 || !EMAIL_RE.is_match(email) {
        return Err(Error::Validation(format!("Invalid email address: {email}")));
    }
    Ok(email.to_string())
}

/// Validate a required free-text field and return it trimmed
pub fn validate_text(field: &str, value: &str, max_len: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(Error::Validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(value.to_string())
}

/// Validate a password before hashing
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(Error::Validation("Password must not be empty".to_string()));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        warn!("Rejected password longer than {} bytes", MAX_PASSWORD_BYTES);
        return Err(Error::Validation(format!(
            "Password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}

/// Validate a user theme name
pub fn validate_theme(theme: &str) -> Result<String> {
    let theme = validate_text("Theme", theme, 32)?;
    if !theme
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::Validation(format!("Invalid theme: {theme}")));
    }
    Ok(theme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert_eq!(
            validate_email(" cook@example.com ").unwrap(),
            "cook@example.com"
        );
        assert!(validate_email("user@mail.example.ru").is_ok());

        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("spaces in@example.com").is_err());
    }

    #[test]
    fn test_validate_text() {
        assert_eq!(validate_text("Name", "  Borscht ", 10).unwrap(), "Borscht");
        assert!(validate_text("Name", "   ", 10).is_err());
        assert!(validate_text("Name", "Борщ", 4).is_ok());
        assert!(validate_text("Name", "Borscht!!", 4).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("hunter2").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"x".repeat(73)).is_err());
    }

    #[test]
    fn test_validate_theme() {
        assert_eq!(validate_theme("dark").unwrap(), "dark");
        assert!(validate_theme("high-contrast").is_ok());
        assert!(validate_theme("<b>").is_err());
    }
}
