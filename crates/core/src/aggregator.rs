//! Site adapter registry and fan-out aggregation.
//!
//! Every configured [`Website`] is resolved to a [`SiteAdapter`] by
//! case-folded name and fetched with a bounded timeout. Adapters run
//! concurrently (bounded by a semaphore), but results are concatenated in
//! site-list order, then adapter order, so output is deterministic.
//!
//! One site failing, timing out or being unregistered never affects the
//! others: it contributes zero records and is reported in the log.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::Error;
use crate::filter::fold;
use crate::product::Product;
use crate::website::Website;

/// Capability every site integration provides.
#[async_trait::async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Fetch the search page at `url` and extract its product records.
    async fn fetch(&self, url: &str) -> Result<Vec<Product>, Error>;
}

/// Adapters keyed by case-folded site identifier.
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn SiteAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `adapter` for `site`, replacing any previous registration.
    pub fn register(&mut self, site: &str, adapter: Arc<dyn SiteAdapter>) {
        if self.adapters.insert(fold(site), adapter).is_some() {
            tracing::warn!(site, "replaced existing adapter registration");
        }
    }

    /// Look up the adapter for `site`, ignoring case.
    pub fn resolve(&self, site: &str) -> Option<Arc<dyn SiteAdapter>> {
        self.adapters.get(&fold(site)).cloned()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// What a single site contributed to an aggregation.
#[derive(Debug)]
pub enum SiteOutcome {
    /// Adapter returned at least one record.
    Fetched(Vec<Product>),
    /// Adapter succeeded but found nothing.
    Empty,
    /// Adapter failed or timed out.
    Failed(Error),
    /// No adapter registered for this site.
    Unregistered,
}

/// Per-site line of an aggregation report.
#[derive(Debug)]
pub struct SiteReport {
    pub website: String,
    pub url: String,
    pub outcome: SiteOutcome,
}

impl SiteReport {
    /// Records contributed by this site.
    pub fn products(&self) -> &[Product] {
        match &self.outcome {
            SiteOutcome::Fetched(items) => items,
            _ => &[],
        }
    }
}

/// Fan-out aggregator over the adapter registry.
#[derive(Clone)]
pub struct Aggregator {
    registry: Arc<AdapterRegistry>,
    timeout: Duration,
    max_concurrency: usize,
}

impl Aggregator {
    pub fn new(registry: AdapterRegistry, timeout: Duration, max_concurrency: usize) -> Self {
        Self { registry: Arc::new(registry), timeout, max_concurrency: max_concurrency.max(1) }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Collect products for `keywords` from every website, in site order.
    pub async fn collect(&self, websites: &[Website], keywords: &[String]) -> Vec<Product> {
        self.collect_reports(websites, keywords)
            .await
            .into_iter()
            .flat_map(|report| match report.outcome {
                SiteOutcome::Fetched(items) => items,
                _ => Vec::new(),
            })
            .collect()
    }

    /// Run every adapter and return one report per website, in site order.
    pub async fn collect_reports(&self, websites: &[Website], keywords: &[String]) -> Vec<SiteReport> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut join_set = JoinSet::new();
        let mut slots: Vec<Option<SiteOutcome>> = Vec::with_capacity(websites.len());
        let urls: Vec<String> = websites.iter().map(|w| w.search_url(keywords)).collect();

        for (idx, (website, url)) in websites.iter().zip(&urls).enumerate() {
            let Some(adapter) = self.registry.resolve(&website.name) else {
                tracing::warn!(site = %website.name, "no adapter registered, skipping site");
                slots.push(Some(SiteOutcome::Unregistered));
                continue;
            };
            slots.push(None);

            let semaphore = semaphore.clone();
            let timeout = self.timeout;
            let site = website.name.clone();
            let url = url.clone();

            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let outcome = match tokio::time::timeout(timeout, adapter.fetch(&url)).await {
                    Ok(Ok(items)) if items.is_empty() => SiteOutcome::Empty,
                    Ok(Ok(items)) => SiteOutcome::Fetched(items),
                    Ok(Err(e)) => SiteOutcome::Failed(e),
                    Err(_) => {
                        SiteOutcome::Failed(Error::FetchTimeout(format!("{site} after {}ms", timeout.as_millis())))
                    }
                };
                (idx, outcome)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((idx, outcome)) => slots[idx] = Some(outcome),
                Err(e) => tracing::error!(error = %e, "site adapter task aborted"),
            }
        }

        websites
            .iter()
            .zip(urls)
            .zip(slots)
            .map(|((website, url), slot)| {
                let outcome =
                    slot.unwrap_or_else(|| SiteOutcome::Failed(Error::HttpError("adapter task aborted".into())));
                log_outcome(&website.name, &url, &outcome);
                SiteReport { website: website.name.clone(), url, outcome }
            })
            .collect()
    }
}

fn log_outcome(site: &str, url: &str, outcome: &SiteOutcome) {
    match outcome {
        SiteOutcome::Fetched(items) => tracing::debug!(site, url, count = items.len(), "site returned products"),
        SiteOutcome::Empty => tracing::info!(site, url, "site returned no products"),
        SiteOutcome::Failed(e) => tracing::warn!(site, url, error = %e, "site adapter failed"),
        SiteOutcome::Unregistered => {}
    }
}
