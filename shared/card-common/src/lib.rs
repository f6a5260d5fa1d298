//! Shared display utilities for the link card list.
//!
//! Formatting used when rendering a card: compact click counts, apex domains
//! for favicons, and short-link construction. Kept framework-agnostic so any
//! front end (or the replay CLI) can use it.

use chrono::{DateTime, SecondsFormat, Utc};
use std::time::SystemTime;
use url::Url;

// ============================================================================
// Counts
// ============================================================================

const SUFFIXES: [(f64, &str); 7] = [
    (1e18, "E"),
    (1e15, "P"),
    (1e12, "T"),
    (1e9, "G"),
    (1e6, "M"),
    (1e3, "K"),
    (1.0, ""),
];

/// Compact a count into `1.5K` / `12M` form.
///
/// `digits` is the number of decimals kept before trailing zeros are trimmed
/// (at least 1). Zero renders as `"0"`.
pub fn format_count(n: u64, digits: usize) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let value = n as f64;
    let Some((unit, symbol)) = SUFFIXES.iter().find(|(unit, _)| value >= *unit) else {
        return "0".to_string();
    };
    let mut s = format!("{:.*}", digits.max(1), value / unit);
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    format!("{}{}", s, symbol)
}

/// Label for a card's click counter. `None` means the count is still loading.
pub fn clicks_label(clicks: Option<u64>) -> String {
    match clicks {
        Some(n) => format!("{} clicks", format_count(n, 1)),
        None => "... clicks".to_string(),
    }
}

// ============================================================================
// Domains
// ============================================================================

// Second-level labels under country-code TLDs (e.g. `co.uk`, `com.au`).
const SECOND_LEVEL_DOMAINS: [&str; 8] = ["co", "com", "org", "net", "gov", "edu", "ac", "ne"];

/// Extract the lowercase host from an `http(s)` URL.
///
/// Returns `None` for anything that is not an absolute `http`/`https` URL
/// with a host.
pub fn url_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .map(|host| host.to_ascii_lowercase())
}

/// Registrable ("apex") domain of `url`, or an empty string when the URL
/// cannot be parsed.
pub fn apex_domain(url: &str) -> String {
    let Some(host) = url_host(url) else {
        return String::new();
    };
    if host == "youtu.be" {
        return "youtube.com".to_string();
    }
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() <= 2 {
        return host;
    }
    let n = parts.len();
    let tld = parts[n - 1];
    let keep = if tld.len() == 2 && SECOND_LEVEL_DOMAINS.contains(&parts[n - 2]) {
        3
    } else {
        2
    };
    parts[n - keep..].join(".")
}

/// Favicon image for a card avatar.
pub fn favicon_url(apex: &str) -> String {
    format!(
        "https://www.google.com/s2/favicons?sz=64&domain_url={}",
        apex
    )
}

// ============================================================================
// URL Building
// ============================================================================

/// Build the short URL for `key` on `domain`.
///
/// The root key (`_root`) maps to the bare domain. With `pretty` the scheme is
/// dropped, which is how cards display their link.
pub fn build_short_url(domain: &str, key: &str, pretty: bool) -> String {
    let domain = domain.trim_end_matches('/');
    let domain = domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(domain);
    let path = if key == "_root" {
        String::new()
    } else {
        format!("/{}", key)
    };
    if pretty {
        format!("{}{}", domain, path)
    } else {
        format!("https://{}{}", domain, path)
    }
}

// ============================================================================
// Time Utilities
// ============================================================================

/// Convert SystemTime to RFC3339 string (seconds precision, UTC).
pub fn system_time_to_rfc3339(t: SystemTime) -> String {
    let dt: DateTime<Utc> = t.into();
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0, 1), "0");
        assert_eq!(format_count(7, 1), "7");
        assert_eq!(format_count(999, 1), "999");
        assert_eq!(format_count(1000, 1), "1K");
        assert_eq!(format_count(1500, 1), "1.5K");
        assert_eq!(format_count(1234, 2), "1.23K");
        assert_eq!(format_count(2_000_000, 1), "2M");
        assert_eq!(format_count(3_460_000_000, 1), "3.5G");
        // digits below one are treated as one
        assert_eq!(format_count(1260, 0), "1.3K");
    }

    #[test]
    fn test_clicks_label() {
        assert_eq!(clicks_label(None), "... clicks");
        assert_eq!(clicks_label(Some(0)), "0 clicks");
        assert_eq!(clicks_label(Some(12_400)), "12.4K clicks");
    }

    #[test]
    fn test_url_host() {
        assert_eq!(url_host("https://GitHub.com/x"), Some("github.com".to_string()));
        assert_eq!(url_host("http://user@host.io:8080/p?q#f"), Some("host.io".to_string()));
        assert_eq!(url_host("not a url"), None);
        assert_eq!(url_host("https://"), None);
        assert_eq!(url_host("ftp://files.example.com"), None);
        // Backslashes end the authority of http(s) URLs.
        assert_eq!(url_host("https://example.com\\evil"), Some("example.com".to_string()));
    }

    #[test]
    fn test_apex_domain() {
        assert_eq!(apex_domain("https://github.com/steven-tey/dub"), "github.com");
        assert_eq!(apex_domain("https://www.vercel.com"), "vercel.com");
        assert_eq!(apex_domain("https://docs.rs.example.org/a"), "example.org");
        assert_eq!(apex_domain("https://www.bbc.co.uk/news"), "bbc.co.uk");
        assert_eq!(apex_domain("https://youtu.be/dQw4w9WgXcQ"), "youtube.com");
        assert_eq!(apex_domain("garbage"), "");
        assert_eq!(apex_domain("https://example.com\\evil"), "example.com");
    }

    #[test]
    fn test_build_short_url() {
        assert_eq!(build_short_url("dub.sh", "github", false), "https://dub.sh/github");
        assert_eq!(build_short_url("dub.sh", "github", true), "dub.sh/github");
        assert_eq!(build_short_url("https://dub.sh/", "_root", false), "https://dub.sh");
        assert_eq!(build_short_url("dub.sh", "_root", true), "dub.sh");
    }

    #[test]
    fn test_favicon_url() {
        assert_eq!(
            favicon_url("github.com"),
            "https://www.google.com/s2/favicons?sz=64&domain_url=github.com"
        );
    }

    #[test]
    fn test_system_time_to_rfc3339() {
        assert_eq!(system_time_to_rfc3339(SystemTime::UNIX_EPOCH), "1970-01-01T00:00:00Z");
    }
}
