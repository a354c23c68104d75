use serde::{Deserialize, Serialize};

/// How a search phrase is embedded into a marketplace search URL
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QueryEncoding {
    /// Words joined with `-` inside the path (`/oferty/q-laptop-dell/`)
    Hyphenated,
    /// Form-encoded query string value (`?string=laptop+dell`)
    FormEncoded,
}

/// Site-specific selectors and URLs the page sources need to drive a marketplace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteNavigation {
    /// Landing page opened before the first search
    pub home_url: String,
    /// Search URL with a `{query}` placeholder
    pub search_url_template: String,
    pub query_encoding: QueryEncoding,
    pub search_input: String,
    pub search_submit: String,
    pub cookie_consent: String,
    /// Present once search results have rendered
    pub results_ready: String,
    pub next_page: String,
}

impl SiteNavigation {
    /// Build the direct search URL for a phrase
    pub fn search_url(&self, phrase: &str) -> String {
        let query = match self.query_encoding {
            QueryEncoding::Hyphenated => phrase
                .split_whitespace()
                .map(|word| url::form_urlencoded::byte_serialize(word.as_bytes()).collect::<String>())
                .collect::<Vec<_>>()
                .join("-"),
            QueryEncoding::FormEncoded => {
                url::form_urlencoded::byte_serialize(phrase.trim().as_bytes()).collect()
            }
        };

        self.search_url_template.replace("{query}", &query)
    }
}
