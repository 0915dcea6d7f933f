//! Search-URL descriptors and fail-soft catalog loading.
//!
//! A [`Website`] only knows how to turn a keyword list into the search page
//! URL handed to a site adapter. Catalog files are read once at startup; a
//! missing or malformed file yields an empty list and an error log line,
//! never a crash.

use std::path::Path;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Search-URL descriptor for one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Website {
    /// Site identifier, matched case-insensitively against adapters.
    pub name: String,
    /// Search endpoint without query string.
    pub base_url: String,
    /// Query parameters that all receive the joined keywords.
    pub query_param_keys: Vec<String>,
    /// Separator placed between encoded keywords.
    #[serde(default = "default_joiner")]
    pub joiner: String,
    /// Static parameters appended after the keyword parameters.
    #[serde(default)]
    pub extra_params: String,
}

fn default_joiner() -> String {
    "+".into()
}

impl Website {
    /// Compose the search URL for the given keywords.
    ///
    /// Each keyword is percent-encoded on its own (nothing is left unescaped
    /// except RFC 3986 unreserved characters), then joined with
    /// [`Website::joiner`].
    pub fn search_url(&self, keywords: &[String]) -> String {
        let joined = keywords
            .iter()
            .map(|k| urlencoding::encode(k))
            .collect::<Vec<_>>()
            .join(self.joiner.as_str());

        let params = self
            .query_param_keys
            .iter()
            .map(|key| format!("{key}={joined}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut url = format!("{}?{}", self.base_url, params);
        if !self.extra_params.is_empty() {
            url.push('&');
            url.push_str(self.extra_params.trim_start_matches(['&', '?']));
        }
        url
    }
}

/// Read a JSON array of descriptors, falling back to an empty list.
pub fn load_list<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to read catalog file");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(items) => {
            tracing::debug!(path = %path.display(), count = items.len(), "loaded catalog file");
            items
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "malformed catalog file");
            Vec::new()
        }
    }
}

/// Load the website descriptor list.
pub fn load_websites(path: &Path) -> Vec<Website> {
    load_list(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(keys: &[&str], joiner: &str, extra: &str) -> Website {
        Website {
            name: "Trendyol".into(),
            base_url: "https://www.trendyol.com/sr".into(),
            query_param_keys: keys.iter().map(|k| k.to_string()).collect(),
            joiner: joiner.into(),
            extra_params: extra.into(),
        }
    }

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_search_url_basic() {
        let url = site(&["q"], "+", "").search_url(&kw(&["gaming", "mouse"]));
        assert_eq!(url, "https://www.trendyol.com/sr?q=gaming+mouse");
    }

    #[test]
    fn test_search_url_encodes_each_keyword() {
        let url = site(&["q"], "+", "").search_url(&kw(&["çanta", "a&b"]));
        assert_eq!(url, "https://www.trendyol.com/sr?q=%C3%A7anta+a%26b");
    }

    #[test]
    fn test_search_url_multiple_keys_and_joiner() {
        let url = site(&["q", "qt"], "%20", "").search_url(&kw(&["usb", "hub"]));
        assert_eq!(url, "https://www.trendyol.com/sr?q=usb%20hub&qt=usb%20hub");
    }

    #[test]
    fn test_search_url_extra_params_strip_leading_separators() {
        let url = site(&["k"], "+", "?&ref=nb_sb_noss").search_url(&kw(&["ssd"]));
        assert_eq!(url, "https://www.trendyol.com/sr?k=ssd&ref=nb_sb_noss");
    }

    #[test]
    fn test_website_deserialize_defaults() {
        let json = r#"{"name":"n11","baseUrl":"https://www.n11.com/arama","queryParamKeys":["q"]}"#;
        let w: Website = serde_json::from_str(json).unwrap();
        assert_eq!(w.joiner, "+");
        assert_eq!(w.extra_params, "");
    }

    #[test]
    fn test_load_websites_missing_file_is_empty() {
        let sites = load_websites(Path::new("/definitely/not/here/websites.json"));
        assert!(sites.is_empty());
    }

    #[test]
    fn test_load_websites_malformed_file_is_empty() {
        let path = std::env::temp_dir().join(format!("pricescout-malformed-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let sites = load_websites(&path);
        std::fs::remove_file(&path).ok();
        assert!(sites.is_empty());
    }

    #[test]
    fn test_load_websites_valid_file() {
        let path = std::env::temp_dir().join(format!("pricescout-websites-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[{"name":"amazon","baseUrl":"https://www.amazon.com.tr/s","queryParamKeys":["k"],"extraParams":"ref=nb"}]"#,
        )
        .unwrap();
        let sites = load_websites(&path);
        std::fs::remove_file(&path).ok();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].name, "amazon");
        assert_eq!(sites[0].extra_params, "ref=nb");
    }
}
