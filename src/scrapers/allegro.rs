use scraper::{ElementRef, Selector};
use url::Url;

use crate::error::{Result, ScoutError};
use crate::models::{Site, DATE_NOT_AVAILABLE, NO_LOCATION, NO_PRICE, NO_TITLE};
use crate::scrapers::traits::{select_href, select_text, selector, SiteAdapter};
use crate::scrapers::types::{QueryEncoding, SiteNavigation};

const BASE_URL: &str = "https://allegro.pl";
const CARD: &str = r#"article[data-role="offer"]"#;
const NEXT_PAGE: &str = r#"a[data-role="next-page"]"#;

/// Allegro.pl offer cards. Search results never show a posting date.
pub struct AllegroAdapter {
    base_url: Url,
    navigation: SiteNavigation,
    card: Selector,
    title: Selector,
    location: Selector,
    price: Selector,
    link: Selector,
    next_page: Selector,
}

impl AllegroAdapter {
    pub fn new() -> Result<Self> {
        let base_url = Url::parse(BASE_URL)
            .map_err(|e| ScoutError::Config(format!("invalid Allegro base URL: {}", e)))?;

        Ok(Self {
            base_url,
            navigation: SiteNavigation {
                home_url: format!("{}/", BASE_URL),
                search_url_template: format!("{}/listing?string={{query}}", BASE_URL),
                query_encoding: QueryEncoding::FormEncoded,
                search_input: r#"input[data-role="search-input"]"#.to_string(),
                search_submit: r#"button[data-role="search-button"]"#.to_string(),
                cookie_consent: r#"button[data-role="accept-consent"]"#.to_string(),
                results_ready: CARD.to_string(),
                next_page: NEXT_PAGE.to_string(),
            },
            card: selector(CARD)?,
            title: selector("h2")?,
            location: selector(r#"div[data-role="seller-info"] span"#)?,
            price: selector(r#"div[data-role="price"]"#)?,
            link: selector("a[href]")?,
            next_page: selector(NEXT_PAGE)?,
        })
    }
}

impl SiteAdapter for AllegroAdapter {
    fn site(&self) -> Site {
        Site::Allegro
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn navigation(&self) -> &SiteNavigation {
        &self.navigation
    }

    fn card_selector(&self) -> &Selector {
        &self.card
    }

    fn next_page_selector(&self) -> &Selector {
        &self.next_page
    }

    fn extract_title(&self, card: ElementRef<'_>) -> String {
        select_text(card, &self.title).unwrap_or_else(|| NO_TITLE.to_string())
    }

    fn extract_location_and_date(&self, card: ElementRef<'_>) -> (String, String) {
        let location = select_text(card, &self.location).unwrap_or_else(|| NO_LOCATION.to_string());
        (location, DATE_NOT_AVAILABLE.to_string())
    }

    fn extract_price(&self, card: ElementRef<'_>) -> String {
        select_text(card, &self.price).unwrap_or_else(|| NO_PRICE.to_string())
    }

    fn extract_url(&self, card: ElementRef<'_>) -> Result<String> {
        select_href(card, &self.link, &self.base_url)
    }
}
