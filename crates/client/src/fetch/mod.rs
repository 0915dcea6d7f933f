//! Plain HTTP retrieval of search result pages.
//!
//! One [`FetchClient`] is shared by every site adapter. It follows at most
//! five redirects, decodes gzip/brotli/deflate bodies and refuses pages
//! larger than the configured byte limit. Any non-2xx status is an error,
//! reported by the adapter as a failure for that site only.

use bytes::Bytes;
use reqwest::{Client, StatusCode, Url, header};
use std::time::{Duration, Instant};

use pricescout_core::{AppConfig, Error};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "tr-TR,tr;q=0.9,en-US;q=0.8,en;q=0.7";

/// Knobs for the shared HTTP client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Body size limit; larger pages fail with `FetchTooLarge`.
    pub max_bytes: usize,
    /// Whole-request budget, usually the adapter timeout.
    pub timeout: Duration,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "pricescout/0.1".to_string(),
            max_bytes: 5_242_880,
            timeout: Duration::from_millis(12_000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.adapter_timeout(),
            ..Default::default()
        }
    }
}

/// A downloaded search page.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Where the page ended up after redirects.
    pub final_url: Url,
    pub status: StatusCode,
    pub bytes: Bytes,
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

fn too_large(size: u64, limit: usize) -> Error {
    Error::FetchTooLarge(format!("{size} bytes exceeds {limit}"))
}

/// HTTP client shared by every site adapter.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("cannot build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Download the page at `url`.
    ///
    /// # Errors
    ///
    /// `InvalidUrl` for unparsable input, `FetchTimeout` when the request
    /// budget runs out, `FetchTooLarge` past `max_bytes`, and `HttpError`
    /// for network failures or non-2xx statuses.
    pub async fn fetch(&self, url: &str) -> Result<FetchResponse, Error> {
        let started = Instant::now();
        let target = Url::parse(url.trim()).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;

        let response = self
            .http
            .get(target.clone())
            .header(header::ACCEPT, ACCEPT_HTML)
            .header(header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::FetchTimeout(format!("{target}: {e}"))
                } else {
                    Error::HttpError(format!("{target}: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpError(format!("{target} answered {}", status.as_u16())));
        }

        let limit = self.config.max_bytes;
        if let Some(declared) = response.content_length().filter(|&n| n > limit as u64) {
            return Err(too_large(declared, limit));
        }

        let final_url = response.url().clone();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::HttpError(format!("{target}: body read failed: {e}")))?;
        if bytes.len() > limit {
            return Err(too_large(bytes.len() as u64, limit));
        }

        let fetch_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(url = %target, final_url = %final_url, fetch_ms, size = bytes.len(), "page fetched");

        Ok(FetchResponse { final_url, status, bytes, fetch_ms })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}
