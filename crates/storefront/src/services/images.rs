//! Product image URL binding.
//!
//! Products store either an absolute URL or a path inside the public image
//! bucket. Responses always carry a fetchable URL.

use url::Url;

/// Binds stored image paths to public URLs.
#[derive(Debug, Clone, Default)]
pub struct ImageResolver {
    base_url: Option<Url>,
}

impl ImageResolver {
    /// `base_url` should end with `/` so paths join beneath it.
    #[must_use]
    pub const fn new(base_url: Option<Url>) -> Self {
        Self { base_url }
    }

    /// Resolve a stored image reference.
    ///
    /// Absolute `http(s)` URLs and empty values pass through unchanged, as
    /// does everything when no base URL is configured.
    #[must_use]
    pub fn resolve(&self, image: &str) -> String {
        if image.is_empty() || is_absolute_http(image) {
            return image.to_owned();
        }
        let Some(base) = &self.base_url else {
            return image.to_owned();
        };
        base.join(image.trim_start_matches('/'))
            .map_or_else(|_| image.to_owned(), String::from)
    }
}

fn is_absolute_http(image: &str) -> bool {
    Url::parse(image).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}
