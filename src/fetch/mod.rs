// src/fetch/mod.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

/// Fetch-by-identifier capability consumed by the pipeline.
#[async_trait]
pub trait PageSource {
    /// `Ok(None)` means the source has no page for this table.
    async fn fetch(&self, table: &str) -> Result<Option<String>>;
}

/// Fetches table reference pages as `<base>/<lowercased name>.html`.
pub struct PageClient {
    client: Client,
    base: Url,
    max_retries: u32,
    initial_backoff_ms: u64,
}

impl PageClient {
    pub fn new(client: Client, base: Url) -> Self {
        Self {
            client,
            base,
            max_retries: 3,
            initial_backoff_ms: 500,
        }
    }

    pub fn page_url(&self, table: &str) -> Result<Url> {
        self.base
            .join(&format!("{}.html", table.to_lowercase()))
            .with_context(|| format!("building page URL for {}", table))
    }

    async fn get_page_core(&self, url: &Url) -> Result<Option<String>> {
        debug!(%url, "fetching page");
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = resp
            .error_for_status()
            .with_context(|| format!("non-success status from {}", url))?
            .text()
            .await
            .with_context(|| format!("reading body from {}", url))?;
        Ok(Some(body))
    }
}

#[async_trait]
impl PageSource for PageClient {
    async fn fetch(&self, table: &str) -> Result<Option<String>> {
        let url = self.page_url(table)?;
        let mut attempts = 0;
        loop {
            match self.get_page_core(&url).await {
                Ok(page) => return Ok(page),
                Err(e) if attempts < self.max_retries => {
                    attempts += 1;
                    let backoff = self.initial_backoff_ms * 2u64.pow(attempts - 1);
                    warn!(%url, attempt = attempts, delay_ms = backoff, error = %e, "retrying");
                    sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_lowercases_the_table_name() {
        let client = PageClient::new(
            Client::new(),
            Url::parse("https://leanx.eu/en/sap/table/").unwrap(),
        );
        assert_eq!(
            client.page_url("TCURR").unwrap().as_str(),
            "https://leanx.eu/en/sap/table/tcurr.html"
        );
    }
}
