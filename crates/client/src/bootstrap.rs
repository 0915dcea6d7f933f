//! Wire configuration, catalogs and adapters into a [`ProductSearch`].

use std::sync::Arc;

use pricescout_core::filter::fold;
use pricescout_core::website::{Website, load_websites};
use pricescout_core::{AppConfig, Aggregator, Error, ProductSearch, QueryCache};

use crate::adapter::build_registry;
use crate::extract::{SiteProfile, load_site_profiles};
use crate::fetch::{FetchClient, FetchConfig};
use crate::render::Renderer;

/// Build the search service described by `config`.
///
/// Missing or malformed catalogs are logged and treated as empty; only a
/// failure to build the HTTP client is an error.
pub async fn build_search(config: &AppConfig) -> Result<ProductSearch, Error> {
    let websites = load_websites(&config.websites_path);
    let profiles = load_site_profiles(&config.site_profiles_paths);

    for site in unprofiled_sites(&websites, &profiles) {
        tracing::warn!(site, "website has no extraction descriptor");
    }

    let fetcher = Arc::new(FetchClient::new(FetchConfig::from(config))?);
    let renderer = build_renderer(config, profiles.iter().any(|s| s.render)).await;
    let registry = build_registry(profiles, fetcher, renderer);

    tracing::info!(websites = websites.len(), adapters = registry.len(), "search service ready");

    let aggregator = Aggregator::new(registry, config.adapter_timeout(), config.max_concurrency);
    let cache = Arc::new(QueryCache::new(config.cache_capacity));
    Ok(ProductSearch::new(websites, aggregator, cache, config.top_n))
}

/// Websites no profile will be registered for, matched the way the
/// adapter registry resolves names.
fn unprofiled_sites<'a>(websites: &'a [Website], profiles: &[SiteProfile]) -> Vec<&'a str> {
    let known: Vec<String> = profiles.iter().map(|p| fold(&p.website)).collect();
    websites
        .iter()
        .filter(|w| !known.contains(&fold(&w.name)))
        .map(|w| w.name.as_str())
        .collect()
}

#[cfg(feature = "render")]
async fn build_renderer(config: &AppConfig, needed: bool) -> Option<Arc<dyn Renderer>> {
    if !config.render_enabled || !needed {
        return None;
    }
    match crate::render::HeadlessRenderer::new().await {
        Ok(renderer) => Some(Arc::new(renderer)),
        Err(e) => {
            tracing::warn!(error = %e, "headless browser unavailable, rendered sites fall back to plain fetch");
            None
        }
    }
}

#[cfg(not(feature = "render"))]
async fn build_renderer(config: &AppConfig, needed: bool) -> Option<Arc<dyn Renderer>> {
    if config.render_enabled && needed {
        tracing::warn!("render_enabled is set but this build lacks the `render` feature");
    }
    None
}
