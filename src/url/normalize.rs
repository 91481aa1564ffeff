use crate::url::domain::site_root;
use url::Url;

/// Builds an absolute URL from a base domain and a relative or partial href
///
/// # Normalization Steps
///
/// 1. Give the base an explicit scheme (`https://`) if it has none
/// 2. Reduce the base to scheme + host (+ port); path, query and fragment are dropped
/// 3. Strip leading slashes from the relative component
/// 4. Join the relative component onto the root
///
/// Relative hrefs are therefore always resolved against the domain root, never
/// against the current page path. Absolute hrefs resolve to themselves.
/// Malformed input degrades to a best-effort `root/relative` string.
///
/// # Examples
///
/// ```
/// use aisle_walker::url::normalize;
///
/// assert_eq!(normalize("example.com", "/path"), "https://example.com/path");
/// assert_eq!(
///     normalize("https://example.com/sub/page", "itm/5"),
///     "https://example.com/itm/5"
/// );
/// ```
pub fn normalize(base: &str, relative: &str) -> String {
    let root = site_root(base);
    let relative = relative.trim_start_matches('/');

    match Url::parse(&root).and_then(|root_url| root_url.join(relative)) {
        Ok(joined) => joined.to_string(),
        Err(_) => format!("{}/{}", root.trim_end_matches('/'), relative),
    }
}
