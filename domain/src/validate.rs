//! Lightweight input validation helpers. Keep logic minimal and deterministic.

use crate::CoreError;

/// Maximum accepted length of a destination URL.
pub const MAX_URL_LEN: usize = 2048;

/// Validate a card's destination URL. We keep this intentionally light to
/// avoid heavy parsing crates: ensure http/https scheme, a host, and a
/// reasonable length.
pub fn validate_original_url(s: &str) -> Result<(), CoreError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidUrl("empty".into()));
    }
    let Some(rest) = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
    else {
        return Err(CoreError::InvalidUrl("must start with http:// or https://".into()));
    };
    if rest.is_empty() || rest.starts_with('/') {
        return Err(CoreError::InvalidUrl("missing host".into()));
    }
    if trimmed.len() > MAX_URL_LEN {
        return Err(CoreError::InvalidUrl("too long".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_validation_basic() {
        assert!(validate_original_url("https://example.com").is_ok());
        assert!(validate_original_url("http://example.com/path?q=1").is_ok());
        assert!(validate_original_url("").is_err());
        assert!(validate_original_url("ftp://example.com").is_err());
        assert!(validate_original_url("https://").is_err());
        let long = format!("https://e.com/{}", "a".repeat(MAX_URL_LEN));
        assert!(validate_original_url(&long).is_err());
    }
}
