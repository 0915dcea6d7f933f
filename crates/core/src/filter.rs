//! Keyword, site and price filters applied to aggregated product sets.
//!
//! Order matters and is fixed by [`crate::search::ProductSearch`]:
//! inclusion runs once before caching, then site selection, exclusion and
//! ranking run on every view of the cached set.
//!
//! Inclusion is AND-of-substrings, exclusion is OR-of-substrings. All
//! comparisons use full Unicode case folding, so `"STRASSE"` matches
//! `"straße"`.

use std::collections::HashSet;

use crate::product::Product;

/// Case-fold a string for keyword comparison.
pub fn fold(s: &str) -> String {
    caseless::default_case_fold_str(s)
}

/// Split user input into keywords on whitespace.
pub fn split_keywords(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}

/// Keep products whose name contains every keyword.
///
/// An empty keyword list keeps everything.
pub fn include_by_keywords(products: &[Product], keywords: &[String]) -> Vec<Product> {
    if keywords.is_empty() {
        return products.to_vec();
    }
    let keys: Vec<String> = keywords.iter().map(|k| fold(k)).collect();

    products
        .iter()
        .filter(|p| {
            let name = fold(&p.name);
            keys.iter().all(|k| name.contains(k.as_str()))
        })
        .cloned()
        .collect()
}

/// Drop products whose name contains any ban keyword.
///
/// An empty ban list keeps everything.
pub fn exclude_by_keywords(products: &[Product], bans: &[String]) -> Vec<Product> {
    if bans.is_empty() {
        return products.to_vec();
    }
    let bans: Vec<String> = bans.iter().map(|b| fold(b)).collect();

    products
        .iter()
        .filter(|p| {
            let name = fold(&p.name);
            !bans.iter().any(|b| name.contains(b.as_str()))
        })
        .cloned()
        .collect()
}

/// Which sites a view is restricted to.
///
/// `touched` records that the caller made an explicit choice. An untouched
/// selection keeps every site; a touched selection with no sites keeps none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteSelection {
    touched: bool,
    sites: HashSet<String>,
}

impl SiteSelection {
    /// No selection made: every configured site is kept.
    pub fn all() -> Self {
        Self::default()
    }

    /// Explicit selection; an empty iterator selects no site at all.
    pub fn only<I, S>(sites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sites = sites
            .into_iter()
            .map(|s| fold(s.as_ref().trim()))
            .filter(|s| !s.is_empty())
            .collect();
        Self { touched: true, sites }
    }

    /// Whether the caller supplied an explicit selection.
    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Whether products from `website` survive this selection.
    pub fn allows(&self, website: &str) -> bool {
        !self.touched || self.sites.contains(&fold(website))
    }

    /// Apply the selection to a product set.
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        if !self.touched {
            return products.to_vec();
        }
        products.iter().filter(|p| self.allows(&p.website)).cloned().collect()
    }
}

/// Rank by ascending price, keeping only rankable records.
///
/// The sort is stable, so equal prices keep their aggregation order.
/// `limit` of `None` returns the full sorted set.
pub fn rank(products: &[Product], limit: Option<usize>) -> Vec<Product> {
    let mut ranked: Vec<Product> = products.iter().filter(|p| p.is_rankable()).cloned().collect();
    ranked.sort_by_key(|p| p.price);
    if let Some(n) = limit {
        ranked.truncate(n);
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(website: &str, name: &str, price: i64) -> Product {
        Product {
            website: website.into(),
            name: name.into(),
            price_text: price.to_string(),
            price,
            url: format!("https://{website}.example/{price}"),
        }
    }

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn sample() -> Vec<Product> {
        vec![
            product("trendyol", "Wireless Mouse X", 19999),
            product("trendyol", "Gaming Mouse Pro", 0),
            product("n11", "Mouse Pad", 500),
            product("amazon", "USB Keyboard", 750),
        ]
    }

    #[test]
    fn test_split_keywords() {
        assert_eq!(split_keywords("  gaming   mouse \t"), kw(&["gaming", "mouse"]));
        assert!(split_keywords("   ").is_empty());
    }

    #[test]
    fn test_include_empty_is_identity() {
        let items = sample();
        assert_eq!(include_by_keywords(&items, &[]), items);
    }

    #[test]
    fn test_include_is_and_of_substrings() {
        let out = include_by_keywords(&sample(), &kw(&["mouse", "pro"]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Gaming Mouse Pro");
    }

    #[test]
    fn test_include_case_insensitive() {
        let out = include_by_keywords(&sample(), &kw(&["MOUSE"]));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_include_uses_case_folding() {
        let items = vec![product("n11", "Straße Bisiklet", 100)];
        assert_eq!(include_by_keywords(&items, &kw(&["STRASSE"])).len(), 1);
    }

    #[test]
    fn test_include_empty_name_never_matches() {
        let items = vec![product("n11", "", 100)];
        assert!(include_by_keywords(&items, &kw(&["a"])).is_empty());
    }

    #[test]
    fn test_exclude_empty_is_identity() {
        let items = sample();
        assert_eq!(exclude_by_keywords(&items, &[]), items);
    }

    #[test]
    fn test_exclude_is_or_of_substrings() {
        let out = exclude_by_keywords(&sample(), &kw(&["gaming", "PAD"]));
        let names: Vec<&str> = out.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Wireless Mouse X", "USB Keyboard"]);
    }

    #[test]
    fn test_exclude_leaves_no_banned_term() {
        let bans = kw(&["mouse"]);
        let out = exclude_by_keywords(&sample(), &bans);
        assert!(out.iter().all(|p| !fold(&p.name).contains("mouse")));
    }

    #[test]
    fn test_site_selection_untouched_keeps_all() {
        let items = sample();
        assert_eq!(SiteSelection::all().apply(&items), items);
    }

    #[test]
    fn test_site_selection_touched_empty_keeps_none() {
        let selection = SiteSelection::only(Vec::<String>::new());
        assert!(selection.is_touched());
        assert!(selection.apply(&sample()).is_empty());
    }

    #[test]
    fn test_site_selection_case_insensitive() {
        let selection = SiteSelection::only(["N11", "Amazon"]);
        let out = selection.apply(&sample());
        let sites: Vec<&str> = out.iter().map(|p| p.website.as_str()).collect();
        assert_eq!(sites, vec!["n11", "amazon"]);
    }

    #[test]
    fn test_site_selection_ignores_blank_entries() {
        let selection = SiteSelection::only(["", "  "]);
        assert!(selection.is_touched());
        assert!(selection.apply(&sample()).is_empty());
    }

    #[test]
    fn test_rank_sorts_and_drops_unpriced() {
        let out = rank(&sample(), Some(5));
        let prices: Vec<i64> = out.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![500, 750, 19999]);
    }

    #[test]
    fn test_rank_drops_parse_failures() {
        let items = vec![product("n11", "A", -1), product("n11", "B", 10)];
        let out = rank(&items, None);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "B");
    }

    #[test]
    fn test_rank_truncates() {
        let items: Vec<Product> = (1..=8).rev().map(|i| product("n11", "x", i)).collect();
        let out = rank(&items, Some(5));
        assert_eq!(out.len(), 5);
        assert_eq!(out[0].price, 1);
        assert_eq!(out[4].price, 5);
    }

    #[test]
    fn test_rank_unlimited_returns_all_rankable() {
        let items: Vec<Product> = (0..8).map(|i| product("n11", "x", i)).collect();
        assert_eq!(rank(&items, None).len(), 7);
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let items = vec![product("a", "first", 100), product("b", "second", 100), product("c", "cheap", 50)];
        let out = rank(&items, None);
        let names: Vec<&str> = out.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["cheap", "first", "second"]);
    }
}
