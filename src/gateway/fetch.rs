//! Page fetch gateway implementation using daedra
//!
//! daedra fetches the page and converts it to markdown; the markdown body
//! becomes the page's `inner_text`.

use crate::types::{AppError, Result, WebPage};
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// A remote page-fetch service. Each call is one attempt; retry policy lives
/// in the fetch-summarize engine.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FetchGateway: Send + Sync {
    /// Fetch `url` and return its extracted text.
    async fn fetch(&self, url: &str) -> Result<WebPage>;
}

/// Page fetching powered by daedra
#[derive(Debug, Clone, Copy, Default)]
pub struct DaedraFetch;

impl DaedraFetch {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FetchGateway for DaedraFetch {
    async fn fetch(&self, url: &str) -> Result<WebPage> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::InvalidInput(format!("Not an http(s) URL: {}", url)));
        }

        let fetch_args = daedra::VisitPageArgs {
            url: url.to_string(),
            include_images: false,
            selector: None,
        };

        match daedra::tools::fetch::fetch_page(&fetch_args).await {
            Ok(page_content) => Ok(WebPage::new(page_content.url, page_content.content)),
            Err(e) => Err(AppError::Fetch(format!("Failed to fetch {}: {}", url, e))),
        }
    }
}
