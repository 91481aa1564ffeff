use url::Url;

/// Prefixes `https://` onto a domain that carries no explicit scheme
///
/// # Examples
///
/// ```
/// use aisle_walker::url::ensure_scheme;
///
/// assert_eq!(ensure_scheme("www.ebay.com"), "https://www.ebay.com");
/// assert_eq!(ensure_scheme("http://shop.test/"), "http://shop.test/");
/// ```
pub fn ensure_scheme(domain: &str) -> String {
    let domain = domain.trim();
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{}", domain)
    }
}

/// Reduces a URL or bare host to `scheme://host[:port]`
///
/// Returns the scheme-prefixed input unchanged when it cannot be parsed.
pub fn site_root(base: &str) -> String {
    let with_scheme = ensure_scheme(base);

    let Ok(url) = Url::parse(&with_scheme) else {
        return with_scheme;
    };

    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}://{}:{}", url.scheme(), host, port),
        (Some(host), None) => format!("{}://{}", url.scheme(), host),
        (None, _) => with_scheme,
    }
}

/// Extracts the lowercase host of a URL string, if it has one
pub fn extract_domain(url: &str) -> Option<String> {
    Url::parse(&ensure_scheme(url))
        .ok()?
        .host_str()
        .map(|h| h.to_lowercase())
}
