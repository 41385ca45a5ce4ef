//! Bounded in-memory cache of finished search results. Explicit
//! component rather than a module-level singleton: the bound and the
//! eviction order are part of its contract.

use std::collections::{HashMap, VecDeque};

use shopwizz_common::{Filters, Product};

pub const DEFAULT_CAPACITY: usize = 10;

/// FIFO cache keyed by the serialized `{keywords, filters}` pair,
/// holding the most recent distinct searches. A hit short-circuits the
/// upstream provider call entirely, which also makes lookup-by-id
/// resolve against the same result set the search produced.
#[derive(Debug)]
pub struct ResultCache {
    capacity: usize,
    entries: HashMap<String, Vec<Product>>,
    order: VecDeque<String>,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Canonical cache key for a search. Filters serialize in insertion
    /// order, so the same intent always maps to the same key.
    pub fn key(keywords: &str, filters: &Filters) -> String {
        serde_json::json!({ "keywords": keywords, "filters": filters }).to_string()
    }

    pub fn get(&self, key: &str) -> Option<&[Product]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn insert(&mut self, key: String, products: Vec<Product>) {
        if self.entries.insert(key.clone(), products).is_some() {
            // refreshed an existing key; its eviction slot is unchanged
            return;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
