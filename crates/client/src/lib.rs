//! Site integration code for pricescout.
//!
//! This crate provides the HTTP fetch pipeline, data-driven product
//! extraction, optional headless rendering and the adapter wiring shared by
//! the server and CLI.

pub mod adapter;
pub mod bootstrap;
pub mod extract;
pub mod fetch;
pub mod render;

pub use adapter::{HtmlAdapter, build_registry};
pub use bootstrap::build_search;
pub use extract::{SiteProfile, load_site_profiles};
pub use fetch::{FetchClient, FetchConfig, FetchResponse};
pub use render::{RenderError, RenderOptions, RenderedPage, Renderer};
