use std::fmt;

use async_trait::async_trait;
use log::debug;
use ratatui::style::Color;

use super::markup;
use super::types::{Content, Link, Page, Project};

/// Errors from talking to the page service.
#[derive(Debug)]
pub enum ApiError {
    /// The page has no fetch address. Raised before any request is made.
    EmptyAddress,
    /// Transport failure (DNS, connection refused, timeout), passed through as-is.
    Network(reqwest::Error),
    /// The service answered with a non-success status.
    Status { status: u16, body: String },
    /// The response body was not the JSON we expected.
    Decode(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::EmptyAddress => write!(f, "page has no fetch address"),
            ApiError::Network(e) => write!(f, "network error: {e}"),
            ApiError::Status { status, body } => write!(f, "HTTP {status}: {body}"),
            ApiError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e)
    }
}

/// Where pages come from. The TUI only talks to this trait.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// The project page addresses are derived from.
    fn project(&self) -> &Project;

    /// One batch of the page listing.
    async fn list_pages(&self, skip: usize, limit: usize) -> Result<Vec<Page>, ApiError>;

    /// Raw markup of a page, fetched from its text address.
    async fn page_text(&self, page: &Page) -> Result<String, ApiError>;

    /// One-hop then two-hop related pages, fetched from the detail address.
    async fn related_links(&self, page: &Page) -> Result<Vec<Link>, ApiError>;
}

impl Page {
    /// Fetches and renders the page.
    pub async fn read(&self, source: &dyn PageSource, accent: Color) -> Result<Content, ApiError> {
        if self.text_url.is_empty() {
            return Err(ApiError::EmptyAddress);
        }
        let raw = source.page_text(self).await?;
        let content = markup::parse(&raw, accent);
        debug!(
            "Parsed '{}': {} bytes, {} lines, {} links",
            self.title,
            raw.len(),
            content.body.lines.len(),
            content.links.len()
        );
        Ok(content)
    }

    /// Fetches the pages related to this one, tagged with their hop source.
    pub async fn nhop_links(&self, source: &dyn PageSource) -> Result<Vec<Link>, ApiError> {
        if self.detail_url.is_empty() {
            return Err(ApiError::EmptyAddress);
        }
        source.related_links(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubSource;

    #[tokio::test]
    async fn test_read_with_empty_address_makes_no_request() {
        let source = StubSource::new();
        let mut page = source.project().page("Foo");
        page.text_url.clear();

        let result = page.read(&source, Color::Cyan).await;

        assert!(matches!(result, Err(ApiError::EmptyAddress)));
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_nhop_with_empty_address_makes_no_request() {
        let source = StubSource::new();
        let mut page = source.project().page("Foo");
        page.detail_url.clear();

        let result = page.nhop_links(&source).await;

        assert!(matches!(result, Err(ApiError::EmptyAddress)));
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_read_renders_fetched_markup() {
        let source = StubSource::new().with_text("Foo", "Foo\n[Bar] and [Baz]\n [Bar]");
        let page = source.project().page("Foo");

        let content = page.read(&source, Color::Cyan).await.unwrap();

        let titles: Vec<&str> = content.links.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Bar", "Baz"]);
        assert_eq!(content.body.lines.len(), 2);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_read_propagates_source_error() {
        let source = StubSource::new();
        let page = source.project().page("Missing");

        let result = page.read(&source, Color::Cyan).await;

        assert!(matches!(result, Err(ApiError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_nhop_links_returns_source_order() {
        let source = StubSource::new().with_related(
            "Foo",
            vec![
                Link::tagged("A", "foo"),
                Link::tagged("B", ""),
                Link::tagged("C", "a"),
            ],
        );
        let page = source.project().page("Foo");

        let links = page.nhop_links(&source).await.unwrap();

        let titles: Vec<&str> = links.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(ApiError::EmptyAddress.to_string(), "page has no fetch address");
        let err = ApiError::Status {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }
}
