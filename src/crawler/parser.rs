//! HTML parser for extracting anchor hrefs
//!
//! Hrefs are returned raw (trimmed, not resolved) because product shapes are
//! matched against the href as written in the markup. Resolution against the
//! domain root happens later, in the extractor.
//!
//! The parsed document never leaves this module, so callers can hold the
//! result across `.await` points.

use scraper::{Html, Selector};

/// Collects the href of every followable `<a>` element, in document order
///
/// # Exclusions
///
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Empty and fragment-only hrefs
///
/// # Example
///
/// ```
/// use aisle_walker::crawler::collect_hrefs;
///
/// let html = r#"<a href="/itm/1">One</a><a href="mailto:x@y.z">Mail</a>"#;
/// assert_eq!(collect_hrefs(html), vec!["/itm/1".to_string()]);
/// ```
pub fn collect_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| is_followable(href))
        .map(String::from)
        .collect()
}

/// Returns false for hrefs that can never name a page
fn is_followable(href: &str) -> bool {
    if href.is_empty() || href.starts_with('#') {
        return false;
    }

    let lower = href.to_ascii_lowercase();
    !(lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_and_absolute_hrefs_kept_raw() {
        let html = r#"
            <html>
            <body>
                <a href="/itm/123">Item</a>
                <a href="p/widget">Widget</a>
                <a href="https://other.com/page">Elsewhere</a>
            </body>
            </html>
        "#;
        assert_eq!(
            collect_hrefs(html),
            vec![
                "/itm/123".to_string(),
                "p/widget".to_string(),
                "https://other.com/page".to_string()
            ]
        );
    }

    #[test]
    fn test_hrefs_are_trimmed() {
        let html = r#"<a href="  /dp/B0001  ">Padded</a>"#;
        assert_eq!(collect_hrefs(html), vec!["/dp/B0001".to_string()]);
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"
            <a href="javascript:void(0)">JS</a>
            <a href="JavaScript:alert(1)">JS upper</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+1234567890">Call</a>
            <a href="data:text/html,<h1>Test</h1>">Data</a>
            <a href="/valid">Valid</a>
        "#;
        assert_eq!(collect_hrefs(html), vec!["/valid".to_string()]);
    }

    #[test]
    fn test_skip_download_link() {
        let html = r#"<a href="/catalog.pdf" download>Download</a>"#;
        assert!(collect_hrefs(html).is_empty());
    }

    #[test]
    fn test_skip_fragment_only_and_empty() {
        let html = r##"<a href="#reviews">Jump</a><a href="">Empty</a><a>No href</a>"##;
        assert!(collect_hrefs(html).is_empty());
    }

    #[test]
    fn test_duplicates_preserved() {
        let html = r#"<a href="/item/a">A</a><a href="/item/a">A again</a>"#;
        assert_eq!(collect_hrefs(html).len(), 2);
    }

    #[test]
    fn test_malformed_markup_is_tolerated() {
        let html = r#"<div><a href="/products/x">X<div></span><a href="/products/y">"#;
        assert_eq!(
            collect_hrefs(html),
            vec!["/products/x".to_string(), "/products/y".to_string()]
        );
    }
}
