//! URL handling module for Bookmark-Audit
//!
//! Only bookmarks whose address starts with `http://` or `https://` are
//! probed; everything else (`chrome://`, `file://`, `javascript:`, `ftp://`,
//! bookmarklets) is skipped before a scan starts.

/// Schemes the scanner knows how to probe, with their `://` separator
const PROBEABLE_PREFIXES: [&str; 2] = ["http://", "https://"];

/// Returns true if the URL uses the http or https scheme
///
/// The scheme is matched case-insensitively and must be followed by `//`,
/// so `HTTPS://example.com` is accepted while `http:example.com` is not.
///
/// # Examples
///
/// ```
/// use bookmark_audit::url::is_probeable;
///
/// assert!(is_probeable("https://example.com/"));
/// assert!(is_probeable("HTTP://example.com/"));
/// assert!(!is_probeable("chrome://settings"));
/// assert!(!is_probeable("ftp://example.com/file"));
/// ```
pub fn is_probeable(url: &str) -> bool {
    PROBEABLE_PREFIXES.iter().any(|prefix| {
        url.get(..prefix.len())
            .map(|head| head.eq_ignore_ascii_case(prefix))
            .unwrap_or(false)
    })
}

/// Extracts the scheme of a URL-like string, lowercased
///
/// Returns None when there is no `scheme:` prefix at all.
pub fn scheme_of(url: &str) -> Option<String> {
    let (scheme, _) = url.split_once(':')?;
    let valid = !scheme.is_empty()
        && scheme
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic())
            .unwrap_or(false)
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    valid.then(|| scheme.to_ascii_lowercase())
}
