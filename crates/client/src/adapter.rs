//! Site adapters backed by [`SiteProfile`] extraction.

use std::sync::Arc;

use pricescout_core::{AdapterRegistry, Error, Product, SiteAdapter};
use url::Url;

use crate::extract::SiteProfile;
use crate::fetch::FetchClient;
use crate::render::{RenderOptions, Renderer, render_budget_ms};

/// Fetches one site's search page and extracts its product cards.
pub struct HtmlAdapter {
    profile: Arc<SiteProfile>,
    fetcher: Arc<FetchClient>,
    renderer: Option<Arc<dyn Renderer>>,
}

impl HtmlAdapter {
    pub fn new(profile: SiteProfile, fetcher: Arc<FetchClient>, renderer: Option<Arc<dyn Renderer>>) -> Self {
        Self { profile: Arc::new(profile), fetcher, renderer }
    }

    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    async fn page_html(&self, url: &str) -> Result<String, Error> {
        if self.profile.render {
            match &self.renderer {
                Some(renderer) => {
                    let url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
                    let opts = RenderOptions {
                        timeout_ms: render_budget_ms(self.fetcher.config().timeout),
                        wait_for: Some(self.profile.item_sel.clone()),
                        reject_cookie_ids: self.profile.reject_cookie_ids.clone(),
                    };
                    let page = renderer.render(&url, &opts).await?;
                    return Ok(page.html);
                }
                None => {
                    tracing::debug!(site = %self.profile.website, "renderer unavailable, using plain fetch");
                }
            }
        }

        Ok(self.fetcher.fetch(url).await?.text())
    }
}

#[async_trait::async_trait]
impl SiteAdapter for HtmlAdapter {
    async fn fetch(&self, url: &str) -> Result<Vec<Product>, Error> {
        let html = self.page_html(url).await?;
        let products = self.profile.parse_products(&html)?;
        tracing::debug!(site = %self.profile.website, count = products.len(), "extracted products");
        Ok(products)
    }
}

/// Register one [`HtmlAdapter`] per extraction descriptor.
pub fn build_registry(
    profiles: Vec<SiteProfile>, fetcher: Arc<FetchClient>, renderer: Option<Arc<dyn Renderer>>,
) -> AdapterRegistry {
    let mut registry = AdapterRegistry::new();
    for profile in profiles {
        let site = profile.website.clone();
        registry.register(&site, Arc::new(HtmlAdapter::new(profile, fetcher.clone(), renderer.clone())));
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchConfig;
    use crate::render::{RenderError, RenderedPage};
    use std::sync::Mutex;

    struct CannedRenderer {
        html: String,
        calls: Mutex<Vec<RenderOptions>>,
    }

    #[async_trait::async_trait]
    impl Renderer for CannedRenderer {
        async fn render(&self, url: &Url, opts: &RenderOptions) -> Result<RenderedPage, RenderError> {
            self.calls.lock().unwrap().push(opts.clone());
            Ok(RenderedPage { html: self.html.clone(), final_url: url.clone(), render_time_ms: 1 })
        }
    }

    fn profile(render: bool) -> SiteProfile {
        SiteProfile {
            website: "trendyol".into(),
            base_url: "https://www.trendyol.com".into(),
            item_sel: "div.p-card-wrppr".into(),
            title_sel: vec!["span.name".into()],
            price_sel: vec!["div.price".into()],
            link_sel: vec!["a[href]".into()],
            reject_cookie_ids: vec!["onetrust-reject-all-handler".into()],
            render,
            ..Default::default()
        }
    }

    fn fetcher() -> Arc<FetchClient> {
        Arc::new(FetchClient::new(FetchConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn test_render_sites_use_renderer() {
        let html = concat!(
            r#"<div class="p-card-wrppr"><a href="/p-1"><span class="name">Mouse</span></a>"#,
            r#"<div class="price">99 TL</div></div>"#,
        );
        let renderer = Arc::new(CannedRenderer { html: html.into(), calls: Mutex::new(Vec::new()) });
        let adapter = HtmlAdapter::new(profile(true), fetcher(), Some(renderer.clone()));

        let products = adapter.fetch("https://www.trendyol.com/sr?q=mouse").await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].url, "https://www.trendyol.com/p-1");

        let calls = renderer.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].wait_for.as_deref(), Some("div.p-card-wrppr"));
        assert_eq!(calls[0].reject_cookie_ids, vec!["onetrust-reject-all-handler".to_string()]);
        assert!(calls[0].timeout_ms < FetchConfig::default().timeout.as_millis() as u64);
    }

    #[tokio::test]
    async fn test_render_site_rejects_invalid_url() {
        let renderer = Arc::new(CannedRenderer { html: String::new(), calls: Mutex::new(Vec::new()) });
        let adapter = HtmlAdapter::new(profile(true), fetcher(), Some(renderer));
        assert!(matches!(adapter.fetch("::nope").await, Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_plain_fetch_invalid_url() {
        let adapter = HtmlAdapter::new(profile(false), fetcher(), None);
        assert!(matches!(adapter.fetch("not a url").await, Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_build_registry_keys_by_site() {
        let profiles = vec![profile(false), SiteProfile { website: "n11".into(), ..profile(false) }];
        let registry = build_registry(profiles, fetcher(), None);
        assert_eq!(registry.len(), 2);
        assert!(registry.resolve("Trendyol").is_some());
        assert!(registry.resolve("n11").is_some());
        assert!(registry.resolve("amazon").is_none());
    }
}
