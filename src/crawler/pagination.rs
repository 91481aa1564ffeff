//! Next-page detection for listing pages
//!
//! Strategies are tried in a fixed order and the first hit wins:
//!
//! 1. `<link rel="next">` SEO hint
//! 2. An anchor whose class names a next button
//! 3. An anchor whose own text or `aria-label` mentions "next"
//! 4. The anchor following the selected page marker
//! 5. Incrementing a `page=N` query parameter of the current URL
//!
//! The winning href is resolved against the root of the current URL.

use crate::url::normalize;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::fmt;

lazy_static! {
    /// A `page=N` query parameter; the `per_page`/`items_page` kind is not matched
    static ref PAGE_PARAM: Regex =
        Regex::new(r"(^|[?&;])page=(\d+)").expect("Invalid page parameter regex");
}

/// Which detection strategy produced a next-page link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStrategy {
    SeoHint,
    ButtonClass,
    TextOrAriaLabel,
    SiblingNavigation,
    QueryParameter,
}

impl fmt::Display for PaginationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SeoHint => "rel=next",
            Self::ButtonClass => "button class",
            Self::TextOrAriaLabel => "link text",
            Self::SiblingNavigation => "sibling navigation",
            Self::QueryParameter => "page parameter",
        };
        write!(f, "{}", name)
    }
}

/// A detected next page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPage {
    /// Absolute URL of the next page
    pub url: String,
    pub strategy: PaginationStrategy,
}

/// Returns the absolute URL of the page following `current_url`, if any
pub fn find_next_page(content: &str, current_url: &str) -> Option<String> {
    detect_next_page(content, current_url).map(|next| next.url)
}

/// Like [`find_next_page`], but also reports which strategy matched
pub fn detect_next_page(content: &str, current_url: &str) -> Option<NextPage> {
    let from_markup = {
        let document = Html::parse_document(content);
        from_seo_hint(&document)
            .map(|href| (href, PaginationStrategy::SeoHint))
            .or_else(|| from_button_class(&document).map(|h| (h, PaginationStrategy::ButtonClass)))
            .or_else(|| {
                from_text_or_aria_label(&document).map(|h| (h, PaginationStrategy::TextOrAriaLabel))
            })
            .or_else(|| {
                from_sibling_navigation(&document)
                    .map(|h| (h, PaginationStrategy::SiblingNavigation))
            })
    };

    let (href, strategy) = from_markup.or_else(|| {
        by_query_parameter(current_url).map(|h| (h, PaginationStrategy::QueryParameter))
    })?;

    Some(NextPage {
        url: normalize(current_url, &href),
        strategy,
    })
}

fn href_of(element: ElementRef<'_>) -> Option<String> {
    element
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(String::from)
}

fn has_class_containing(element: ElementRef<'_>, needle: &str) -> bool {
    element
        .value()
        .classes()
        .any(|class| class.to_lowercase().contains(needle))
}

fn from_seo_hint(document: &Html) -> Option<String> {
    let selector = Selector::parse("link[rel]").ok()?;
    document
        .select(&selector)
        .find(|link| {
            link.value()
                .attr("rel")
                .map(|rel| rel.split_whitespace().any(|t| t.eq_ignore_ascii_case("next")))
                .unwrap_or(false)
        })
        .and_then(href_of)
}

fn from_button_class(document: &Html) -> Option<String> {
    // Covers s-pagination-next, pagination-next and btn-next
    let selector = Selector::parse("a[class]").ok()?;
    document
        .select(&selector)
        .find(|anchor| has_class_containing(*anchor, "next"))
        .and_then(href_of)
}

/// The text of an element whose content is one string, possibly wrapped
///
/// `<a>Next</a>` and `<a><span>Next</span></a>` qualify. A product card
/// mixing several nodes does not.
fn single_string<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    let mut children = element.children();
    let only = children.next()?;
    if children.next().is_some() {
        return None;
    }

    match only.value() {
        Node::Text(text) => Some(&**text),
        Node::Element(_) => ElementRef::wrap(only).and_then(single_string),
        _ => None,
    }
}

fn from_text_or_aria_label(document: &Html) -> Option<String> {
    let selector = Selector::parse("a").ok()?;

    let by_text = document.select(&selector).find(|anchor| {
        single_string(*anchor)
            .map(|text| text.to_lowercase().contains("next"))
            .unwrap_or(false)
    });

    let by_label = || {
        document.select(&selector).find(|anchor| {
            anchor
                .value()
                .attr("aria-label")
                .map(|label| label.to_lowercase().contains("next"))
                .unwrap_or(false)
        })
    };

    by_text.or_else(by_label).and_then(href_of)
}

fn from_sibling_navigation(document: &Html) -> Option<String> {
    let selector = Selector::parse("span[class]").ok()?;
    let selected = document
        .select(&selector)
        .find(|span| has_class_containing(*span, "pagination-selected"))?;

    selected
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "a")
        .and_then(href_of)
}

fn by_query_parameter(current_url: &str) -> Option<String> {
    let current: u64 = PAGE_PARAM.captures(current_url)?.get(2)?.as_str().parse().ok()?;
    let next = current.checked_add(1)?;

    Some(
        PAGE_PARAM
            .replace_all(current_url, format!("${{1}}page={}", next).as_str())
            .into_owned(),
    )
}
