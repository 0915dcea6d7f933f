//! Query orchestration shared by the CLI and HTTP shells.
//!
//! A search runs: cache lookup (or fan-out + keyword inclusion on a miss),
//! then site selection, ban filtering and ranking on the cached set. Bans
//! and site selection never trigger a new fan-out.

use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::cache::{CacheStatus, QueryCache};
use crate::filter::{self, SiteSelection};
use crate::product::Product;
use crate::website::Website;

/// Parsed search parameters.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    /// Raw query text; trimmed before use as cache key.
    pub query: String,
    /// Ban keywords.
    pub bans: Vec<String>,
    /// Bypass and overwrite the cached entry.
    pub refresh: bool,
    /// Site restriction.
    pub sites: SiteSelection,
}

impl SearchRequest {
    /// Request for `query` with no bans, no refresh and every site.
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), ..Default::default() }
    }

    /// Trimmed query used as the cache key.
    pub fn cache_key(&self) -> &str {
        self.query.trim()
    }

    /// Inclusion keywords derived from the query.
    pub fn keywords(&self) -> Vec<String> {
        filter::split_keywords(&self.query)
    }
}

/// How many ranked products a view returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// The configured top-N.
    Top,
    /// Every rankable product.
    All,
}

/// Result of a search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Trimmed query text.
    pub query: String,
    /// Size of the cached, inclusion-filtered set.
    pub found: usize,
    /// Records left after site selection and bans, before ranking.
    pub remaining: usize,
    /// Ranked (and possibly truncated) products.
    pub products: Vec<Product>,
    pub cache: CacheStatus,
}

/// Search service wiring websites, aggregator and cache together.
#[derive(Clone)]
pub struct ProductSearch {
    websites: Arc<Vec<Website>>,
    aggregator: Aggregator,
    cache: Arc<QueryCache>,
    top_n: usize,
}

impl ProductSearch {
    pub fn new(websites: Vec<Website>, aggregator: Aggregator, cache: Arc<QueryCache>, top_n: usize) -> Self {
        Self { websites: Arc::new(websites), aggregator, cache, top_n: top_n.max(1) }
    }

    /// Configured websites, in aggregation order.
    pub fn websites(&self) -> &[Website] {
        &self.websites
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Fan out to every site and keep names matching all keywords.
    pub async fn aggregate(&self, keywords: &[String]) -> Vec<Product> {
        let raw = self.aggregator.collect(&self.websites, keywords).await;
        let included = filter::include_by_keywords(&raw, keywords);
        tracing::info!(raw = raw.len(), included = included.len(), "aggregated products");
        included
    }

    /// Cached inclusion-filtered set for `query`, aggregating on a miss.
    pub async fn lookup(&self, query: &str, refresh: bool) -> (Arc<Vec<Product>>, CacheStatus) {
        let key = query.trim();
        let keywords = filter::split_keywords(key);
        self.cache
            .get_or_fetch(key, refresh, || self.aggregate(&keywords))
            .await
    }

    /// Run a full search. Returns `None` when the query has no keywords.
    pub async fn search(&self, request: &SearchRequest, limit: Limit) -> Option<SearchOutcome> {
        if request.keywords().is_empty() {
            return None;
        }

        let (items, cache) = self.lookup(request.cache_key(), request.refresh).await;
        let selected = request.sites.apply(&items);
        let filtered = filter::exclude_by_keywords(&selected, &request.bans);

        let limit = match limit {
            Limit::Top => Some(self.top_n),
            Limit::All => None,
        };
        let products = filter::rank(&filtered, limit);

        Some(SearchOutcome {
            query: request.cache_key().to_string(),
            found: items.len(),
            remaining: filtered.len(),
            products,
            cache,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::AdapterRegistry;
    use crate::aggregator::tests::{FakeAdapter, product, website};
    use std::time::Duration;

    fn mouse_search() -> (ProductSearch, Arc<FakeAdapter>) {
        let shop_a = FakeAdapter::ok(vec![
            product("shopa", "Wireless Mouse X", 19999),
            product("shopa", "Gaming Mouse Pro", 0),
        ]);
        let shop_b = FakeAdapter::ok(vec![product("shopb", "Mouse Pad", 500), product("shopb", "Keyboard", 300)]);

        let mut registry = AdapterRegistry::new();
        registry.register("shopa", shop_a.clone());
        registry.register("shopb", shop_b);
        let aggregator = Aggregator::new(registry, Duration::from_secs(1), 2);

        let search = ProductSearch::new(
            vec![website("shopa"), website("shopb")],
            aggregator,
            Arc::new(QueryCache::new(30)),
            5,
        );
        (search, shop_a)
    }

    #[tokio::test]
    async fn test_search_end_to_end_mouse() {
        let (search, _) = mouse_search();
        let outcome = search.search(&SearchRequest::new("mouse"), Limit::Top).await.unwrap();

        assert_eq!(outcome.found, 3);
        let prices: Vec<i64> = outcome.products.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![500, 19999]);
        assert_eq!(outcome.cache, CacheStatus::Miss);
    }

    #[tokio::test]
    async fn test_ban_applies_to_cached_post_inclusion_set() {
        let (search, adapter) = mouse_search();
        search.search(&SearchRequest::new("mouse"), Limit::Top).await.unwrap();

        let request = SearchRequest { bans: vec!["gaming".into()], ..SearchRequest::new("mouse") };
        let outcome = search.search(&request, Limit::Top).await.unwrap();

        assert_eq!(outcome.cache, CacheStatus::Hit);
        assert_eq!(outcome.found, 3);
        assert_eq!(outcome.remaining, 2);
        let prices: Vec<i64> = outcome.products.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![500, 19999]);
        assert_eq!(adapter.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_query_yields_none() {
        let (search, adapter) = mouse_search();
        assert!(search.search(&SearchRequest::new("   "), Limit::Top).await.is_none());
        assert!(adapter.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_empty_site_selection_yields_nothing() {
        let (search, _) = mouse_search();
        let request = SearchRequest { sites: SiteSelection::only(Vec::<String>::new()), ..SearchRequest::new("mouse") };
        let outcome = search.search(&request, Limit::All).await.unwrap();
        assert!(outcome.products.is_empty());
        assert_eq!(outcome.found, 3);
    }

    #[tokio::test]
    async fn test_site_selection_restricts_view() {
        let (search, _) = mouse_search();
        let request = SearchRequest { sites: SiteSelection::only(["ShopA"]), ..SearchRequest::new("mouse") };
        let outcome = search.search(&request, Limit::All).await.unwrap();
        assert_eq!(outcome.products.len(), 1);
        assert_eq!(outcome.products[0].website, "shopa");
    }

    #[tokio::test]
    async fn test_refresh_refetches_and_keeps_key_count() {
        let (search, adapter) = mouse_search();
        search.search(&SearchRequest::new("mouse"), Limit::Top).await.unwrap();

        let request = SearchRequest { refresh: true, ..SearchRequest::new("mouse") };
        let outcome = search.search(&request, Limit::Top).await.unwrap();
        assert_eq!(outcome.cache, CacheStatus::Refreshed);
        assert_eq!(adapter.seen.lock().unwrap().len(), 2);
        assert_eq!(search.cache().len().await, 1);
    }

    #[tokio::test]
    async fn test_cache_key_is_trimmed_query() {
        let (search, adapter) = mouse_search();
        search.search(&SearchRequest::new("  mouse "), Limit::Top).await.unwrap();
        assert!(search.cache().contains("mouse").await);

        let outcome = search.search(&SearchRequest::new("mouse"), Limit::Top).await.unwrap();
        assert_eq!(outcome.cache, CacheStatus::Hit);
        assert_eq!(adapter.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_limit_top_truncates() {
        let many: Vec<Product> = (1..=9).map(|i| product("shopa", &format!("cable {i}"), i * 10)).collect();
        let mut registry = AdapterRegistry::new();
        registry.register("shopa", FakeAdapter::ok(many));
        let search = ProductSearch::new(
            vec![website("shopa")],
            Aggregator::new(registry, Duration::from_secs(1), 1),
            Arc::new(QueryCache::default()),
            5,
        );

        let top = search.search(&SearchRequest::new("cable"), Limit::Top).await.unwrap();
        assert_eq!(top.products.len(), 5);
        let all = search.search(&SearchRequest::new("cable"), Limit::All).await.unwrap();
        assert_eq!(all.products.len(), 9);
    }
}
