//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ratatui::style::Color;

use crate::core::state::{App, LayoutContext};
use crate::scrapbox::{ApiError, DEFAULT_BASE_URL, Link, Page, PageSource, Project};

pub const TEST_ACCENT: Color = Color::Rgb(0x17, 0xc0, 0xeb);

/// In-memory page source with canned responses. Counts every call.
pub struct StubSource {
    project: Project,
    listing: Option<Vec<String>>,
    texts: HashMap<String, String>,
    related: HashMap<String, Vec<Link>>,
    calls: AtomicUsize,
}

impl StubSource {
    pub fn new() -> Self {
        Self {
            project: test_project(),
            listing: Some(Vec::new()),
            texts: HashMap::new(),
            related: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Listing of `count` pages titled `page-0`, `page-1`, ...
    pub fn with_listing(mut self, count: usize) -> Self {
        self.listing = Some((0..count).map(|i| format!("page-{i}")).collect());
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.listing = None;
        self
    }

    pub fn with_text(mut self, title: &str, raw: &str) -> Self {
        self.texts.insert(title.to_string(), raw.to_string());
        self
    }

    pub fn with_related(mut self, title: &str, links: Vec<Link>) -> Self {
        self.related.insert(title.to_string(), links);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn not_found(title: &str) -> ApiError {
        ApiError::Status {
            status: 404,
            body: format!("{title} not found"),
        }
    }
}

#[async_trait]
impl PageSource for StubSource {
    fn project(&self) -> &Project {
        &self.project
    }

    async fn list_pages(&self, skip: usize, limit: usize) -> Result<Vec<Page>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let listing = self.listing.as_ref().ok_or(ApiError::Status {
            status: 500,
            body: "listing unavailable".to_string(),
        })?;
        Ok(listing
            .iter()
            .skip(skip)
            .take(limit)
            .map(|title| self.project.page(title.as_str()))
            .collect())
    }

    async fn page_text(&self, page: &Page) -> Result<String, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts
            .get(&page.title)
            .cloned()
            .ok_or_else(|| Self::not_found(&page.title))
    }

    async fn related_links(&self, page: &Page) -> Result<Vec<Link>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.related
            .get(&page.title)
            .cloned()
            .ok_or_else(|| Self::not_found(&page.title))
    }
}

pub fn test_project() -> Project {
    Project::new("test-project", DEFAULT_BASE_URL)
}

/// Creates a test App sized like a 80x24 terminal.
pub fn test_app() -> App {
    let mut app = App::new(test_project(), TEST_ACCENT);
    app.resize(LayoutContext::new(80, 24));
    app
}

/// Test App whose page list holds the given titles.
pub fn test_app_with_pages(titles: &[&str]) -> App {
    let mut app = test_app();
    app.list.pages = titles.iter().map(|t| app.project.page(*t)).collect();
    app
}
