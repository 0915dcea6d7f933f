//! Data-driven product extraction from search result pages.
//!
//! Each site is described by a [`SiteProfile`]: CSS selectors for the result
//! cards and, within a card, the title parts, price and link. Profiles are
//! loaded from JSON at startup so site markup changes are fixed in
//! configuration rather than code.
//!
//! ### Per-card rules
//! - Cards matching `sponsored_sel` are skipped.
//! - Fields are read from the card root: the nearest ancestor-or-self
//!   matching `root_sel`, or the card itself.
//! - The name joins brand, the card's `title_attr` attribute and every
//!   `title_sel` text, in that order, skipping empty parts.
//! - The first `price_sel` with non-empty text gives the price.
//! - The link is the card's own `href` (anchor cards), else the first
//!   `link_sel` with an `href`, else `dp_path` filled with the card's
//!   `id_attr` value. Cards without a link are skipped.

pub mod links;

pub use links::resolve_href;

use std::path::Path;

use pricescout_core::{Error, Product, website::load_list};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

/// Extraction descriptor for one site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Site identifier; becomes `Product::website`.
    pub website: String,
    /// Base for resolving relative links.
    pub base_url: String,
    /// Selector for one result card.
    pub item_sel: String,
    #[serde(default)]
    pub title_sel: Vec<String>,
    /// Card attribute holding the title (e.g. `title` on anchor cards).
    #[serde(default)]
    pub title_attr: Option<String>,
    #[serde(default)]
    pub brand_sel: Option<String>,
    /// Ancestor selector locating the card root from the matched element.
    #[serde(default)]
    pub root_sel: Option<String>,
    #[serde(default)]
    pub price_sel: Vec<String>,
    #[serde(default)]
    pub link_sel: Vec<String>,
    #[serde(default)]
    pub sponsored_sel: Option<String>,
    /// Card attribute holding the product id for `dp_path`.
    #[serde(default)]
    pub id_attr: Option<String>,
    /// Product path template with an `{id}` placeholder.
    #[serde(default)]
    pub dp_path: Option<String>,
    /// Cookie-consent button ids clicked before reading a rendered page.
    #[serde(default)]
    pub reject_cookie_ids: Vec<String>,
    /// Whether the page needs headless rendering.
    #[serde(default)]
    pub render: bool,
}

/// Load every extraction descriptor list, skipping unreadable files.
pub fn load_site_profiles<P: AsRef<Path>>(paths: &[P]) -> Vec<SiteProfile> {
    paths.iter().flat_map(|p| load_list::<SiteProfile>(p.as_ref())).collect()
}

fn compile(selector: &str) -> Result<Selector, Error> {
    Selector::parse(selector).map_err(|e| Error::ExtractFailed(format!("invalid selector {selector:?}: {e}")))
}

fn compile_all(selectors: &[String]) -> Result<Vec<Selector>, Error> {
    selectors.iter().map(|s| compile(s)).collect()
}

fn compile_opt(selector: Option<&str>) -> Result<Option<Selector>, Error> {
    selector.map(compile).transpose()
}

/// Selectors compiled once per page.
struct Compiled {
    item: Selector,
    title: Vec<Selector>,
    brand: Option<Selector>,
    root: Option<Selector>,
    price: Vec<Selector>,
    link: Vec<Selector>,
    sponsored: Option<Selector>,
}

impl Compiled {
    fn new(profile: &SiteProfile) -> Result<Self, Error> {
        Ok(Self {
            item: compile(&profile.item_sel)?,
            title: compile_all(&profile.title_sel)?,
            brand: compile_opt(profile.brand_sel.as_deref())?,
            root: compile_opt(profile.root_sel.as_deref())?,
            price: compile_all(&profile.price_sel)?,
            link: compile_all(&profile.link_sel)?,
            sponsored: compile_opt(profile.sponsored_sel.as_deref())?,
        })
    }
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text(root: ElementRef<'_>, selector: &Selector) -> Option<String> {
    root.select(selector).map(text_of).find(|t| !t.is_empty())
}

fn card_root<'a>(item: ElementRef<'a>, root: Option<&Selector>) -> ElementRef<'a> {
    let Some(root) = root else {
        return item;
    };
    if root.matches(&item) {
        return item;
    }
    item.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| root.matches(el))
        .unwrap_or(item)
}

impl SiteProfile {
    /// Extract every product card from `html`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ExtractFailed` when a selector is invalid or
    /// `base_url` cannot be parsed.
    pub fn parse_products(&self, html: &str) -> Result<Vec<Product>, Error> {
        let sel = Compiled::new(self)?;
        let base = Url::parse(&self.base_url)
            .map_err(|e| Error::ExtractFailed(format!("invalid base_url {:?}: {e}", self.base_url)))?;
        let document = Html::parse_document(html);

        let mut out = Vec::new();
        for item in document.select(&sel.item) {
            if let Some(sponsored) = &sel.sponsored
                && item.select(sponsored).next().is_some()
            {
                continue;
            }

            let root = card_root(item, sel.root.as_ref());
            let name = self.card_name(item, root, &sel);
            let price_text = sel.price.iter().find_map(|s| first_text(root, s)).unwrap_or_default();

            if name.is_empty() && price_text.is_empty() {
                continue;
            }

            let Some(url) = self.card_link(item, root, &sel, &base) else {
                tracing::debug!(site = %self.website, name, "skipping card without link");
                continue;
            };

            out.push(Product::new(self.website.clone(), name, price_text, url));
        }

        Ok(out)
    }

    fn card_name(&self, item: ElementRef<'_>, root: ElementRef<'_>, sel: &Compiled) -> String {
        let brand = sel.brand.as_ref().and_then(|s| first_text(root, s));
        let attr_title = self
            .title_attr
            .as_deref()
            .and_then(|attr| item.value().attr(attr))
            .map(|t| t.trim().to_string());
        let titles = sel.title.iter().filter_map(|s| first_text(root, s));

        brand
            .into_iter()
            .chain(attr_title)
            .chain(titles)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn card_link(&self, item: ElementRef<'_>, root: ElementRef<'_>, sel: &Compiled, base: &Url) -> Option<String> {
        let own = (item.value().name() == "a")
            .then(|| item.value().attr("href"))
            .flatten();
        let selected = || {
            sel.link
                .iter()
                .find_map(|s| root.select(s).find_map(|a| a.value().attr("href")))
        };

        if let Some(href) = own.or_else(selected) {
            return resolve_href(base, href);
        }

        let id = item.value().attr(self.id_attr.as_deref()?)?.trim();
        if id.is_empty() {
            return None;
        }
        let path = self.dp_path.as_deref()?.replace("{id}", id);
        resolve_href(base, &path)
    }
}
