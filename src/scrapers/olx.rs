use scraper::{ElementRef, Selector};
use url::Url;

use crate::error::{Result, ScoutError};
use crate::models::{Site, NO_DATE, NO_LOCATION, NO_PRICE, NO_TITLE};
use crate::scrapers::traits::{select_href, select_text, selector, SiteAdapter};
use crate::scrapers::types::{QueryEncoding, SiteNavigation};

const BASE_URL: &str = "https://www.olx.pl";
const CARD: &str = r#"div[data-cy="l-card"]"#;
const NEXT_PAGE: &str = r#"a[data-testid="pagination-forward"]"#;

/// OLX.pl listing cards: "Location - Date" share one paragraph
pub struct OlxAdapter {
    base_url: Url,
    navigation: SiteNavigation,
    card: Selector,
    title: Selector,
    location_date: Selector,
    price: Selector,
    link: Selector,
    next_page: Selector,
}

impl OlxAdapter {
    pub fn new() -> Result<Self> {
        let base_url = Url::parse(BASE_URL)
            .map_err(|e| ScoutError::Config(format!("invalid OLX base URL: {}", e)))?;

        Ok(Self {
            base_url,
            navigation: SiteNavigation {
                home_url: format!("{}/", BASE_URL),
                search_url_template: format!("{}/oferty/q-{{query}}/", BASE_URL),
                query_encoding: QueryEncoding::Hyphenated,
                search_input: r#"input[data-testid="search-input"]"#.to_string(),
                search_submit: r#"button[data-testid="search-submit"]"#.to_string(),
                cookie_consent: "#onetrust-accept-btn-handler".to_string(),
                results_ready: CARD.to_string(),
                next_page: NEXT_PAGE.to_string(),
            },
            card: selector(CARD)?,
            title: selector("h6")?,
            location_date: selector(r#"p[data-testid="location-date"]"#)?,
            price: selector(r#"p[data-testid="ad-price"]"#)?,
            link: selector("a[href]")?,
            next_page: selector(NEXT_PAGE)?,
        })
    }
}

impl SiteAdapter for OlxAdapter {
    fn site(&self) -> Site {
        Site::Olx
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
        let text = select_text(card, &self.location_date).unwrap_or_else(|| NO_LOCATION.to_string());

        // "Location - Date"; anything after a second separator is dropped
        let mut parts = text.split(" - ");
        let location = parts.next().unwrap_or_default().trim().to_string();
        match parts.next() {
            Some(date) => (location, date.trim().to_string()),
            None => (location, NO_DATE.to_string()),
        }
    }

    fn extract_price(&self, card: ElementRef<'_>) -> String {
        select_text(card, &self.price).unwrap_or_else(|| NO_PRICE.to_string())
    }

    fn extract_url(&self, card: ElementRef<'_>) -> Result<String> {
        select_href(card, &self.link, &self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, NO_URL};
    use scraper::Html;

    const PAGE: &str = r#"
        <html><body>
          <div data-cy="l-card">
            <a href="/d/oferta/mieszkanie-55m2-CID3-ID1.html">
              <h6>Mieszkanie 55m2 centrum</h6>
            </a>
            <p data-testid="ad-price">450 000 zł</p>
            <p data-testid="location-date">Kraków, Stare Miasto - Dzisiaj o 12:30</p>
          </div>
          <div data-cy="l-card">
            <a href="https://www.otodom.pl/pl/oferta/dom-ID2"><h6>Dom 120 m²</h6></a>
            <p data-testid="ad-price">1 200 000,00 zł</p>
            <p data-testid="location-date">Wieliczka</p>
          </div>
          <div data-cy="l-card">
            <p data-testid="location-date">Gdańsk - 12 maja 2024</p>
          </div>
          <div data-cy="l-card">
            <a href="http://[::1"><h6>Uszkodzony link</h6></a>
          </div>
          <a data-testid="pagination-forward" href="/oferty/q-mieszkanie/?page=2">Dalej</a>
        </body></html>
    "#;

    #[test]
    fn test_extract_page_reads_cards() {
        let adapter = OlxAdapter::new().unwrap();
        let listings = adapter.extract_page(PAGE, "mieszkanie").unwrap();

        // The card with a malformed link is skipped, the others survive
        assert_eq!(listings.len(), 3);

        let first = &listings[0];
        assert_eq!(first.title(), "Mieszkanie 55m2 centrum");
        assert_eq!(first.location(), "Kraków, Stare Miasto");
        assert_eq!(first.date_posted_raw(), "Dzisiaj o 12:30");
        assert_eq!(first.numeric_price(), 450000.0);
        assert_eq!(first.square_meters(), 55.0);
        assert_eq!(first.category(), Category::RealEstate);
        assert_eq!(first.url(), "https://www.olx.pl/d/oferta/mieszkanie-55m2-CID3-ID1.html");
        assert_eq!(first.search_phrase(), "mieszkanie");
    }

    #[test]
    fn test_location_without_date_separator() {
        let adapter = OlxAdapter::new().unwrap();
        let listings = adapter.extract_page(PAGE, "dom").unwrap();
        let second = &listings[1];
        assert_eq!(second.location(), "Wieliczka");
        assert_eq!(second.date_posted_raw(), NO_DATE);
        assert_eq!(second.url(), "https://www.otodom.pl/pl/oferta/dom-ID2");
        assert_eq!(second.numeric_price(), 1200000.0);
    }

    #[test]
    fn test_date_is_second_segment_only() {
        let adapter = OlxAdapter::new().unwrap();
        let html = r#"<div data-cy="l-card"><h6>Rower</h6>
            <p data-testid="location-date">Warszawa - Odświeżono dnia 3 maja - Wyróżnione</p></div>"#;
        let listings = adapter.extract_page(html, "rower").unwrap();
        assert_eq!(listings[0].location(), "Warszawa");
        assert_eq!(listings[0].date_posted_raw(), "Odświeżono dnia 3 maja");
    }

    #[test]
    fn test_missing_elements_degrade_to_sentinels() {
        let adapter = OlxAdapter::new().unwrap();
        let listings = adapter.extract_page(PAGE, "x").unwrap();
        let bare = &listings[2];
        assert_eq!(bare.title(), NO_TITLE);
        assert_eq!(bare.raw_price(), NO_PRICE);
        assert_eq!(bare.numeric_price(), 0.0);
        assert_eq!(bare.url(), NO_URL);
        assert_eq!(bare.location(), "Gdańsk");
        assert_eq!(bare.date_posted_raw(), "12 maja 2024");
    }

    #[test]
    fn test_next_page_url() {
        let adapter = OlxAdapter::new().unwrap();
        let document = Html::parse_document(PAGE);
        assert_eq!(
            adapter.next_page_url(&document).as_deref(),
            Some("https://www.olx.pl/oferty/q-mieszkanie/?page=2")
        );

        let last = Html::parse_document("<html><body></body></html>");
        assert_eq!(adapter.next_page_url(&last), None);
    }

    #[test]
    fn test_blocked_page_is_page_error() {
        let adapter = OlxAdapter::new().unwrap();
        let html = "<html><body><div id=\"px-captcha\"></div></body></html>";
        assert!(adapter.extract_page(html, "x").is_err());
    }

    #[test]
    fn test_empty_result_page_is_not_an_error() {
        let adapter = OlxAdapter::new().unwrap();
        let html = "<html><body><p>Nie znaleźliśmy ogłoszeń</p></body></html>";
        assert!(adapter.extract_page(html, "x").unwrap().is_empty());
    }
}
