use super::models::Link;

/// Builds absolute hypermedia links from the configured base URL.
///
/// The base URL is taken verbatim from settings; only a trailing `/` is
/// trimmed so that joining never produces `//`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    base_url: String,
}

impl LinkBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/{segment}/{segment}...`
    pub fn href(&self, segments: &[&str]) -> String {
        let mut href = self.base_url.clone();
        for segment in segments {
            href.push('/');
            href.push_str(segment);
        }
        href
    }

    /// `{base}/{segments...}?{key}={value}&...`
    pub fn href_with_query(&self, segments: &[&str], query: &[(&str, String)]) -> String {
        let mut href = self.href(segments);
        for (index, (key, value)) in query.iter().enumerate() {
            href.push(if index == 0 { '?' } else { '&' });
            href.push_str(key);
            href.push('=');
            href.push_str(value);
        }
        href
    }

    pub fn link(&self, segments: &[&str]) -> Link {
        Link {
            href: self.href(segments),
        }
    }
}
