//! Canonical product record produced by every site adapter.

use serde::{Deserialize, Serialize};

use crate::price;

/// A single product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Site identifier the listing came from.
    pub website: String,
    /// Listing title; may be empty.
    pub name: String,
    /// Price exactly as displayed by the site.
    pub price_text: String,
    /// Normalized price, see [`price::normalize`].
    pub price: i64,
    /// Absolute listing URL.
    pub url: String,
}

impl Product {
    /// Build a product, normalizing the displayed price text.
    pub fn new(
        website: impl Into<String>, name: impl Into<String>, price_text: impl Into<String>, url: impl Into<String>,
    ) -> Self {
        let price_text = price_text.into();
        let price = price::normalize(&price_text);
        Self { website: website.into(), name: name.into(), price_text, price, url: url.into() }
    }

    /// Whether this record takes part in ranking.
    pub fn is_rankable(&self) -> bool {
        price::is_rankable(self.price)
    }
}
