//! Element extraction for the service's `Robot.XML` answers.
//!
//! The answers are small, flat and machine generated, so a handful of
//! anchored patterns is enough. Nested blocks (`<Vendor>`, `<Region>`) are
//! captured whole and searched again.

use regex::Regex;
use std::sync::LazyLock;

// ============================================================================
// Regex Patterns
// ============================================================================

/// `<AccessToken>..</AccessToken>`
pub(crate) static ACCESS_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<AccessToken>(.*?)</AccessToken>").expect("Invalid regex"));

/// `<ExpirationDate>..</ExpirationDate>`
pub(crate) static EXPIRATION_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<ExpirationDate>(.*?)</ExpirationDate>").expect("Invalid regex")
});

/// `<Message>..</Message>`
pub(crate) static MESSAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<Message>(.*?)</Message>").expect("Invalid regex"));

/// `<Code>..</Code>`
pub(crate) static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<Code>(.*?)</Code>").expect("Invalid regex"));

/// A text-only `<Vendor>` element, as in the vendor list.
pub(crate) static VENDOR_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Vendor>([^<]*)</Vendor>").expect("Invalid regex"));

/// A `<Vendor>` block with children, as in vendors and regions.
pub(crate) static VENDOR_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<Vendor>(\s*<.*?)</Vendor>").expect("Invalid regex"));

/// `<Number>..</Number>`
pub(crate) static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<Number>(.*?)</Number>").expect("Invalid regex"));

/// `<Region>..</Region>`
pub(crate) static REGION_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<Region>(.*?)</Region>").expect("Invalid regex"));

/// `<Report>..</Report>`
pub(crate) static REPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<Report>(.*?)</Report>").expect("Invalid regex"));

/// Root element name after an optional declaration.
static ROOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:<\?xml[^>]*\?>\s*)?<([A-Za-z][A-Za-z0-9_.-]*)").expect("Invalid regex")
});

// ============================================================================
// Helpers
// ============================================================================

/// Returns true if the text looks like an XML document.
pub(crate) fn looks_like_xml(text: &str) -> bool {
    text.trim_start().starts_with('<')
}

/// Returns the name of the root element.
pub(crate) fn root_name(text: &str) -> Option<&str> {
    ROOT_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Returns the trimmed, unescaped text of the first match.
pub(crate) fn first(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| unescape(m.as_str().trim()))
        .filter(|s| !s.is_empty())
}

/// Returns the trimmed, unescaped text of every match, skipping empty ones.
pub(crate) fn all(re: &Regex, text: &str) -> Vec<String> {
    re.captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| unescape(m.as_str().trim()))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Returns the raw inner text of every match, for blocks searched again.
pub(crate) fn blocks<'t>(re: &Regex, text: &'t str) -> Vec<&'t str> {
    re.captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect()
}

fn unescape(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

// ============================================================================
// Service Errors
// ============================================================================

/// An `<Error>` answer from the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// Service error code, such as `101`.
    pub code: Option<String>,
    /// Human-readable message.
    pub message: String,
}

/// Parses an `<Error><Code/><Message/></Error>` body.
///
/// Returns `None` when the body is not an error document.
pub fn parse_service_error(text: &str) -> Option<ServiceError> {
    if root_name(text) != Some("Error") {
        return None;
    }
    Some(ServiceError {
        code: first(&CODE_RE, text),
        message: first(&MESSAGE_RE, text).unwrap_or_else(|| "unknown service error".to_string()),
    })
}
