pub mod error;
pub mod types;

pub use error::{Result, SerpError};
pub use types::{RawFeature, RawImage, RawShoppingItem, RawVariant, SearchResponse};

use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

const BASE_URL: &str = "https://serpapi.com";
const ENGINE: &str = "google_shopping";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SerpApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SerpApiClient {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Run one Google Shopping search. The GET is idempotent, so a
    /// transient network failure or timeout is retried exactly once;
    /// an API rejection is surfaced as-is.
    pub async fn search_shopping(&self, query: &str) -> Result<Vec<RawShoppingItem>> {
        let url = self.search_url(query)?;

        match self.fetch(url.clone()).await {
            Ok(items) => Ok(items),
            Err(err) if err.is_transient() => {
                warn!(error = %err, "shopping search failed, retrying once");
                self.fetch(url).await
            }
            Err(err) => Err(err),
        }
    }

    fn search_url(&self, query: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/search.json", self.base_url))
            .map_err(|e| SerpError::Parse(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("engine", ENGINE)
            .append_pair("q", query)
            .append_pair("api_key", &self.api_key)
            .append_pair("gl", "us")
            .append_pair("hl", "en");
        Ok(url)
    }

    async fn fetch(&self, url: Url) -> Result<Vec<RawShoppingItem>> {
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SerpError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: SearchResponse = resp.json().await?;
        debug!(count = data.shopping_results.len(), "shopping results received");
        Ok(data.shopping_results)
    }
}
