//! Product link resolution.

use url::Url;

/// Resolve a card `href` against the site base URL.
///
/// Blank hrefs and `javascript:` pseudo-links yield `None`.
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.to_ascii_lowercase().starts_with("javascript:") {
        return None;
    }

    match base.join(href) {
        Ok(u) => Some(u.to_string()),
        Err(e) => {
            tracing::debug!(href, "unresolvable product link: {e}");
            None
        }
    }
}
