//! Runtime settings for both binaries.
//!
//! Values are layered with figment; later layers win:
//!
//! 1. built-in defaults
//! 2. the TOML file named by `PRICESCOUT_CONFIG_FILE`, if set
//! 3. `PRICESCOUT_*` environment variables
//!
//! Site catalogs are only referenced by path here and are loaded fail-soft
//! by the client crate.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Settings shared by the CLI and HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// JSON list of website search-URL descriptors.
    ///
    /// Set via PRICESCOUT_WEBSITES_PATH environment variable.
    #[serde(default = "default_websites_path")]
    pub websites_path: PathBuf,

    /// JSON lists of per-site extraction descriptors.
    ///
    /// Set via PRICESCOUT_SITE_PROFILES_PATHS environment variable.
    #[serde(default = "default_site_profiles_paths")]
    pub site_profiles_paths: Vec<PathBuf>,

    /// Maximum number of distinct queries kept in the cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Number of products shown in ranked views.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Per-site adapter timeout in milliseconds.
    ///
    /// Set via PRICESCOUT_ADAPTER_TIMEOUT_MS environment variable.
    #[serde(default = "default_adapter_timeout_ms")]
    pub adapter_timeout_ms: u64,

    /// Number of sites fetched concurrently.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// User-Agent sent with every page request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per page.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Whether headless rendering is used for sites that ask for it.
    ///
    /// Set via PRICESCOUT_RENDER_ENABLED environment variable.
    #[serde(default)]
    pub render_enabled: bool,

    /// Listen address for the HTTP server.
    ///
    /// Set via PRICESCOUT_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Optional log file, written in addition to stderr.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_websites_path() -> PathBuf {
    PathBuf::from("data/websites.json")
}

fn default_site_profiles_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("data/sites.json")]
}

fn default_cache_capacity() -> usize {
    crate::cache::DEFAULT_CAPACITY
}

fn default_top_n() -> usize {
    5
}

fn default_adapter_timeout_ms() -> u64 {
    12_000
}

fn default_max_concurrency() -> usize {
    4
}

fn default_user_agent() -> String {
    "pricescout/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_bind_addr() -> String {
    "0.0.0.0:5000".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            websites_path: default_websites_path(),
            site_profiles_paths: default_site_profiles_paths(),
            cache_capacity: default_cache_capacity(),
            top_n: default_top_n(),
            adapter_timeout_ms: default_adapter_timeout_ms(),
            max_concurrency: default_max_concurrency(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            render_enabled: false,
            bind_addr: default_bind_addr(),
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Adapter timeout as Duration for use with tokio/reqwest.
    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_millis(self.adapter_timeout_ms)
    }

    /// Resolve defaults, the optional TOML file and the environment.
    ///
    /// # Errors
    ///
    /// `ConfigError::LoadFailed` when a layer cannot be read or a value has
    /// the wrong type, `ConfigError::Invalid` when validation rejects it.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PRICESCOUT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PRICESCOUT_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.websites_path, PathBuf::from("data/websites.json"));
        assert_eq!(config.site_profiles_paths, vec![PathBuf::from("data/sites.json")]);
        assert_eq!(config.cache_capacity, 30);
        assert_eq!(config.top_n, 5);
        assert_eq!(config.adapter_timeout_ms, 12_000);
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.user_agent, "pricescout/0.1");
        assert_eq!(config.bind_addr, "0.0.0.0:5000");
        assert!(!config.render_enabled);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_adapter_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.adapter_timeout(), Duration::from_millis(12_000));
    }

    #[test]
    fn test_toml_layer_overrides_defaults() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::string(
            r#"
            top_n = 3
            cache_capacity = 10
            site_profiles_paths = ["data/a.json", "data/b.json"]
            "#,
        ));

        let config = AppConfig::extract(figment).unwrap();
        assert_eq!(config.top_n, 3);
        assert_eq!(config.cache_capacity, 10);
        assert_eq!(config.site_profiles_paths.len(), 2);
        assert_eq!(config.max_concurrency, 4);
    }

    #[test]
    fn test_invalid_layer_fails_validation() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::string("top_n = 0"));
        let result = AppConfig::extract(figment);
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "top_n"));
    }
}
