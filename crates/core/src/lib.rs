//! Core types and shared functionality for pricescout.
//!
//! This crate provides:
//! - Product records and price normalization
//! - Website search-URL composition and fail-soft catalog loading
//! - Site adapter registry and fan-out aggregation
//! - Bounded in-memory query cache
//! - Keyword/site filters, ranking and CSV export
//! - Unified error types, configuration and logging setup

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod price;
pub mod product;
pub mod search;
pub mod telemetry;
pub mod website;

pub use aggregator::{AdapterRegistry, Aggregator, SiteAdapter, SiteOutcome, SiteReport};
pub use cache::{CacheStatus, QueryCache};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use filter::SiteSelection;
pub use product::Product;
pub use search::{Limit, ProductSearch, SearchOutcome, SearchRequest};
pub use website::Website;
