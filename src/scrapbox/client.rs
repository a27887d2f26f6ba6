//! HTTP client for the Scrapbox REST API.
//!
//! Three read-only endpoints are used:
//!
//! - `GET /pages/<project>?skip=&limit=`: page listing (JSON)
//! - `GET /pages/<project>/<title>/text`: raw page markup (plain text)
//! - `GET /pages/<project>/<title>`: page detail incl. related pages (JSON)

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use super::source::{ApiError, PageSource};
use super::types::{Link, Page, PageDetailResponse, PageListResponse, Project};

pub struct ScrapboxClient {
    project: Project,
    client: reqwest::Client,
}

impl ScrapboxClient {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            client: reqwest::Client::new(),
        }
    }

    /// Sends a GET and fails on non-success statuses.
    async fn get(&self, url: &str, query: &[(&str, usize)]) -> Result<reqwest::Response, ApiError> {
        debug!("GET {} {:?}", url, query);
        let response = self.client.get(url).query(query).send().await?;
        debug!("Response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Scrapbox API error: {} - {}", status, body);
            return Err(ApiError::Status { status, body });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, usize)],
    ) -> Result<T, ApiError> {
        let body = self.get(url, query).await?.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to decode response from {}: {}", url, e);
            ApiError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl PageSource for ScrapboxClient {
    fn project(&self) -> &Project {
        &self.project
    }

    async fn list_pages(&self, skip: usize, limit: usize) -> Result<Vec<Page>, ApiError> {
        let url = self.project.list_url();
        let response: PageListResponse = self
            .get_json(&url, &[("skip", skip), ("limit", limit)])
            .await?;

        let pages: Vec<Page> = response
            .pages
            .into_iter()
            .map(|raw| {
                let mut page = self.project.page(raw.title);
                page.id = raw.id;
                page
            })
            .collect();
        info!(
            "Listed {} pages of '{}' (skip={}, limit={})",
            pages.len(),
            self.project.name,
            skip,
            limit
        );
        Ok(pages)
    }

    async fn page_text(&self, page: &Page) -> Result<String, ApiError> {
        let text = self.get(&page.text_url, &[]).await?.text().await?;
        info!("Fetched '{}' ({} bytes)", page.title, text.len());
        Ok(text)
    }

    async fn related_links(&self, page: &Page) -> Result<Vec<Link>, ApiError> {
        let detail: PageDetailResponse = self.get_json(&page.detail_url, &[]).await?;
        let links = detail.into_links();
        info!("Resolved {} related links for '{}'", links.len(), page.title);
        Ok(links)
    }
}
