//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_capacity` or `top_n` is 0
    /// - `adapter_timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `max_concurrency` is outside 1..=16
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `user_agent` or `bind_addr` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(invalid("cache_capacity", "must be greater than 0"));
        }
        if self.top_n == 0 {
            return Err(invalid("top_n", "must be greater than 0"));
        }

        if self.adapter_timeout_ms < 100 {
            return Err(invalid("adapter_timeout_ms", "must be at least 100ms"));
        }
        if self.adapter_timeout_ms > 300_000 {
            return Err(invalid("adapter_timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.max_concurrency == 0 || self.max_concurrency > 16 {
            return Err(invalid("max_concurrency", "must be between 1 and 16"));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }
        if self.bind_addr.trim().is_empty() {
            return Err(invalid("bind_addr", "must not be empty"));
        }

        if self.site_profiles_paths.is_empty() {
            tracing::warn!("no site_profiles_paths configured; every site will be skipped");
        }

        Ok(())
    }
}
