//! Query-string parsing shared by `/` and `/export`.
//!
//! Scalar parameters take their first occurrence; `site` is repeatable.
//! `site_sel=1` marks the site list as deliberately supplied, so an empty
//! list then means "no sites" instead of "all sites".

use pricescout_core::{SearchRequest, SiteSelection, filter::split_keywords};

/// Parameters of a search page or export request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub q: String,
    pub ban: String,
    pub refresh: bool,
    pub sites: Vec<String>,
    pub site_sel: bool,
}

impl SearchParams {
    /// Parse a raw (still percent-encoded) query string.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut params = Self::default();
        let (mut q, mut ban, mut refresh, mut site_sel) = (None, None, None, None);

        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "q" => {
                    q.get_or_insert_with(|| value.into_owned());
                }
                "ban" => {
                    ban.get_or_insert_with(|| value.into_owned());
                }
                "refresh" => {
                    refresh.get_or_insert(value == "1");
                }
                "site_sel" => {
                    site_sel.get_or_insert(value == "1");
                }
                "site" => params.sites.push(value.into_owned()),
                _ => {}
            }
        }

        params.q = q.unwrap_or_default().trim().to_string();
        params.ban = ban.unwrap_or_default().trim().to_string();
        params.refresh = refresh.unwrap_or(false);
        params.site_sel = site_sel.unwrap_or(false);
        params
    }

    /// Site restriction carried by these parameters.
    pub fn selection(&self) -> SiteSelection {
        if self.site_sel { SiteSelection::only(self.sites.iter()) } else { SiteSelection::all() }
    }

    pub fn to_request(&self) -> SearchRequest {
        SearchRequest {
            query: self.q.clone(),
            bans: split_keywords(&self.ban),
            refresh: self.refresh,
            sites: self.selection(),
        }
    }

    /// Query string reproducing these parameters, minus `refresh`.
    pub fn export_query(&self) -> String {
        let mut out = url::form_urlencoded::Serializer::new(String::new());
        out.append_pair("q", &self.q);
        if !self.ban.is_empty() {
            out.append_pair("ban", &self.ban);
        }
        if self.site_sel {
            out.append_pair("site_sel", "1");
            for site in &self.sites {
                out.append_pair("site", site);
            }
        }
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_params() {
        let raw = "q=kablosuz+mouse&ban=gaming%20pad&refresh=1&site=n11&site=Amazon&site_sel=1";
        let params = SearchParams::parse(Some(raw));
        assert_eq!(params.q, "kablosuz mouse");
        assert_eq!(params.ban, "gaming pad");
        assert!(params.refresh);
        assert_eq!(params.sites, vec!["n11", "Amazon"]);
        assert!(params.site_sel);

        let request = params.to_request();
        assert_eq!(request.bans, vec!["gaming", "pad"]);
        assert!(request.sites.is_touched());
        assert!(request.sites.allows("amazon"));
        assert!(!request.sites.allows("trendyol"));
    }

    #[test]
    fn test_parse_missing_query() {
        let params = SearchParams::parse(None);
        assert_eq!(params, SearchParams::default());
        assert!(!params.to_request().sites.is_touched());
    }

    #[test]
    fn test_parse_first_value_wins() {
        let params = SearchParams::parse(Some("q=first&q=second&refresh=0&refresh=1"));
        assert_eq!(params.q, "first");
        assert!(!params.refresh);
    }

    #[test]
    fn test_sites_without_marker_are_ignored() {
        let params = SearchParams::parse(Some("q=mouse&site=n11"));
        assert!(!params.selection().is_touched());
        assert!(params.selection().allows("trendyol"));
    }

    #[test]
    fn test_explicit_empty_selection() {
        let params = SearchParams::parse(Some("q=mouse&site_sel=1"));
        let selection = params.selection();
        assert!(selection.is_touched());
        assert!(!selection.allows("n11"));
    }

    #[test]
    fn test_export_query_round_trips() {
        let params = SearchParams::parse(Some("q=usb+hub&ban=type-c&refresh=1&site_sel=1&site=n11"));
        let query = params.export_query();
        assert_eq!(query, "q=usb+hub&ban=type-c&site_sel=1&site=n11");
        assert_eq!(SearchParams::parse(Some(&query)), SearchParams { refresh: false, ..params });
    }
}
