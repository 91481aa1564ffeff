//! URL handling module for Aisle-Walker
//!
//! This module provides href normalization against a domain root, scheme and
//! host helpers, and the image filter applied before any URL is reported.

mod domain;
mod normalize;

use url::Url;

// Re-export main functions
pub use domain::{ensure_scheme, extract_domain, site_root};
pub use normalize::normalize;

/// File extensions that are never reported as product pages
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".png", ".gif", ".jpeg"];

/// Returns true if the URL points at an image
///
/// Both the full string and the parsed path are checked, so `photo.JPG` and
/// `photo.jpg?w=200` are caught as well.
pub fn is_image_url(url: &str) -> bool {
    let ends_with_image = |s: &str| {
        let lower = s.to_lowercase();
        IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
    };

    if ends_with_image(url) {
        return true;
    }

    Url::parse(url)
        .map(|parsed| ends_with_image(parsed.path()))
        .unwrap_or(false)
}
