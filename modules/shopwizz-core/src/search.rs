//! Search orchestration: structured intent in, canonical products out.

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use serpapi_client::{SerpApiClient, SerpError};
use shopwizz_common::{Filters, Product, ShopWizzError};

use crate::cache::ResultCache;
use crate::filter::apply_filters;
use crate::normalize::{is_usable, normalize_item};

pub struct SearchOrchestrator {
    serp: SerpApiClient,
    cache: Mutex<ResultCache>,
}

impl SearchOrchestrator {
    pub fn new(serp: SerpApiClient) -> Self {
        Self::with_cache(serp, ResultCache::default())
    }

    pub fn with_cache(serp: SerpApiClient, cache: ResultCache) -> Self {
        Self {
            serp,
            cache: Mutex::new(cache),
        }
    }

    /// Build the upstream full-text query. The provider has no
    /// structured filter support in use, so every filter value rides
    /// along as extra query tokens, in filter insertion order.
    pub fn build_query(keywords: &str, filters: &Filters) -> String {
        let mut query = keywords.to_string();
        for (_, value) in filters.iter() {
            match value {
                Value::String(s) if !s.trim().is_empty() => {
                    query.push(' ');
                    query.push_str(s);
                }
                Value::Array(items) => {
                    let joined = items
                        .iter()
                        .filter_map(Value::as_str)
                        .filter(|s| !s.trim().is_empty())
                        .collect::<Vec<_>>()
                        .join(" ");
                    if !joined.is_empty() {
                        query.push(' ');
                        query.push_str(&joined);
                    }
                }
                Value::Number(n) => {
                    query.push(' ');
                    query.push_str(&n.to_string());
                }
                _ => {}
            }
        }
        query
    }

    /// Run one search: provider call, normalization, server-side
    /// filtering. A cache hit skips the provider entirely.
    pub async fn search(
        &self,
        keywords: &str,
        filters: &Filters,
    ) -> Result<Vec<Product>, ShopWizzError> {
        let key = ResultCache::key(keywords, filters);
        {
            let cache = self.cache.lock().await;
            if let Some(hit) = cache.get(&key) {
                debug!(keywords, "result cache hit");
                return Ok(hit.to_vec());
            }
        }

        let query = Self::build_query(keywords, filters);
        let raw = self
            .serp
            .search_shopping(&query)
            .await
            .map_err(map_serp_err)?;

        let received = raw.len();
        let products: Vec<Product> = raw
            .iter()
            .filter(|item| is_usable(item))
            .enumerate()
            .map(|(idx, item)| normalize_item(item, idx))
            .collect();
        let normalized = products.len();
        let filtered = apply_filters(products, filters);

        info!(
            keywords,
            received,
            normalized,
            kept = filtered.len(),
            "search complete"
        );

        let mut cache = self.cache.lock().await;
        cache.insert(key, filtered.clone());
        Ok(filtered)
    }

    /// Resolve a single product by re-running the search it came from.
    /// The shared cache means a lookup issued after a search in the same
    /// process sees the identical result set; a cache miss falls back to
    /// a fresh upstream search, which is only approximately stable.
    pub async fn lookup_by_id(
        &self,
        product_id: &str,
        keywords: &str,
    ) -> Result<Product, ShopWizzError> {
        let products = self.search(keywords, &Filters::new()).await?;
        products
            .into_iter()
            .find(|p| p.product_id == product_id)
            .ok_or_else(|| {
                ShopWizzError::NotFound(format!(
                    "product {product_id} not in results for \"{keywords}\""
                ))
            })
    }
}

fn map_serp_err(err: SerpError) -> ShopWizzError {
    match err {
        SerpError::Timeout => ShopWizzError::Timeout("shopping search".to_string()),
        other => ShopWizzError::upstream("serpapi", other.to_string()),
    }
}
