//! Headless browser rendering for script-built result pages.
//!
//! The [`Renderer`] trait is always available so adapters can hold an
//! optional renderer; the chromiumoxide implementation is only compiled
//! with the `render` feature.

use std::time::Duration;

use url::Url;

use pricescout_core::Error;

/// Headless rendering failures; all of them fail the site like a fetch error.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cannot start browser: {0}")]
    Launch(String),

    #[error("cannot open page: {0}")]
    Navigate(String),

    #[error("cannot read rendered page: {0}")]
    ReadPage(String),

    #[error("page not ready within {0}ms")]
    Timeout(u64),
}

impl From<RenderError> for Error {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::Timeout(ms) => Error::FetchTimeout(format!("render exceeded {ms}ms")),
            other => Error::RenderFailed(other.to_string()),
        }
    }
}

/// Headroom left between the render budget and the adapter timeout so a
/// timed-out render can still close its tab.
const CLOSE_MARGIN_MS: u64 = 1_000;

/// Render budget for a site whose adapter runs under `adapter_timeout`.
///
/// Always strictly below the adapter timeout (half of it for very short ones).
pub fn render_budget_ms(adapter_timeout: Duration) -> u64 {
    let total = adapter_timeout.as_millis() as u64;
    total.saturating_sub(CLOSE_MARGIN_MS).max(total / 2)
}

/// Options for rendering one search page.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Overall budget in milliseconds (default: 12000).
    pub timeout_ms: u64,

    /// Selector whose presence means the result list has loaded.
    pub wait_for: Option<String>,

    /// Element ids of cookie-consent "reject" buttons to click if present.
    pub reject_cookie_ids: Vec<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { timeout_ms: 12_000, wait_for: None, reject_cookie_ids: Vec::new() }
    }
}

/// HTML of a page after its scripts ran.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    pub final_url: Url,
    pub render_time_ms: u64,
}

/// Renders a URL to its post-script HTML.
#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &Url, opts: &RenderOptions) -> Result<RenderedPage, RenderError>;
}

#[cfg(feature = "render")]
pub use headless::HeadlessRenderer;

#[cfg(feature = "render")]
mod headless {
    use super::*;
    use chromiumoxide::Page;

    const POLL_INTERVAL: Duration = Duration::from_millis(250);
    const SETTLE_DELAY: Duration = Duration::from_millis(1500);

    /// Headless Chrome/Chromium renderer using chromiumoxide.
    ///
    /// One browser is shared; every render opens and closes its own tab.
    pub struct HeadlessRenderer {
        browser: chromiumoxide::Browser,
    }

    impl HeadlessRenderer {
        /// Launch a headless browser and drive its CDP event loop in the background.
        pub async fn new() -> Result<Self, RenderError> {
            use chromiumoxide::browser::{Browser, BrowserConfig};
            use futures_util::StreamExt;

            let config = BrowserConfig::builder()
                .window_size(1920, 1080)
                .arg("--disable-gpu")
                .arg("--no-sandbox")
                .build()
                .map_err(RenderError::Launch)?;

            let (browser, mut handler) = Browser::launch(config)
                .await
                .map_err(|e| RenderError::Launch(e.to_string()))?;

            tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if let Err(e) = event {
                        tracing::debug!(error = %e, "devtools event loop stopped");
                        break;
                    }
                }
            });

            Ok(Self { browser })
        }
    }

    async fn load(page: &Page, url: &Url, opts: &RenderOptions) -> Result<(String, Option<String>), RenderError> {
        page.goto(url.as_str())
            .await
            .map_err(|e| RenderError::Navigate(e.to_string()))?;

        for id in &opts.reject_cookie_ids {
            if let Ok(button) = page.find_element(format!("#{id}")).await {
                match button.click().await {
                    Ok(_) => tracing::debug!(button = %id, "dismissed cookie banner"),
                    Err(e) => tracing::debug!(button = %id, "cookie button click failed: {e}"),
                }
            }
        }

        match &opts.wait_for {
            Some(selector) => {
                while page.find_element(selector.as_str()).await.is_err() {
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
            None => tokio::time::sleep(SETTLE_DELAY).await,
        }

        let html = page
            .content()
            .await
            .map_err(|e| RenderError::ReadPage(e.to_string()))?;
        let final_url = page.url().await.ok().flatten();
        Ok((html, final_url))
    }

    /// Owns one browser tab and closes it however the render ends.
    ///
    /// If the render future is dropped before [`Tab::close`] runs, the close
    /// is handed to the runtime instead.
    struct Tab(Option<Page>);

    impl Tab {
        async fn close(mut self) {
            if let Some(page) = self.0.take()
                && let Err(e) = page.close().await
            {
                tracing::debug!(error = %e, "failed to close tab");
            }
        }
    }

    impl Drop for Tab {
        fn drop(&mut self) {
            if let Some(page) = self.0.take()
                && let Ok(runtime) = tokio::runtime::Handle::try_current()
            {
                runtime.spawn(async move {
                    page.close().await.ok();
                });
            }
        }
    }

    #[async_trait::async_trait]
    impl Renderer for HeadlessRenderer {
        async fn render(&self, url: &Url, opts: &RenderOptions) -> Result<RenderedPage, RenderError> {
            let started = std::time::Instant::now();

            let page = self
                .browser
                .new_page("about:blank")
                .await
                .map_err(|e| RenderError::Navigate(e.to_string()))?;
            let tab = Tab(Some(page.clone()));

            let loaded = tokio::time::timeout(Duration::from_millis(opts.timeout_ms), load(&page, url, opts))
                .await
                .map_err(|_| RenderError::Timeout(opts.timeout_ms))
                .and_then(|r| r);
            tab.close().await;
            let (html, page_url) = loaded?;

            let final_url = page_url
                .and_then(|u| Url::parse(&u).ok())
                .unwrap_or_else(|| url.clone());

            let render_time_ms = started.elapsed().as_millis() as u64;
            tracing::debug!(url = %final_url, render_time_ms, size = html.len(), "page rendered");

            Ok(RenderedPage { final_url, render_time_ms, html })
        }
    }

}
