use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Result, ScoutError};
use crate::models::{Listing, RawListing, Site, NO_URL};
use crate::scrapers::types::SiteNavigation;

/// Markers of bot-protection pages served instead of search results
const BLOCK_MARKERS: &[&str] = &["Access Denied", "px-captcha", "cf-challenge", "captcha-delivery"];

/// Per-marketplace rules for reading listings out of one rendered page.
/// Adding a marketplace means adding one implementation.
pub trait SiteAdapter: Send + Sync {
    fn site(&self) -> Site;

    /// Absolute base URL used to resolve relative listing links
    fn base_url(&self) -> &Url;

    fn navigation(&self) -> &SiteNavigation;

    fn card_selector(&self) -> &Selector;

    fn next_page_selector(&self) -> &Selector;

    fn locate_cards<'a>(&self, page: &'a Html) -> Vec<ElementRef<'a>> {
        page.select(self.card_selector()).collect()
    }

    fn extract_title(&self, card: ElementRef<'_>) -> String;

    fn extract_location_and_date(&self, card: ElementRef<'_>) -> (String, String);

    fn extract_price(&self, card: ElementRef<'_>) -> String;

    /// Absolute URL of the listing, or the "No URL" sentinel when the card has no link
    fn extract_url(&self, card: ElementRef<'_>) -> Result<String>;

    /// Absolute URL of the next results page, if the page links to one
    fn next_page_url(&self, page: &Html) -> Option<String> {
        let href = page.select(self.next_page_selector()).next()?.value().attr("href")?;
        resolve_url(self.base_url(), href).ok()
    }

    fn extract_listing(&self, card: ElementRef<'_>, search_phrase: &str) -> Result<Listing> {
        let (location, date_posted) = self.extract_location_and_date(card);
        let raw = RawListing {
            title: self.extract_title(card),
            location,
            date_posted,
            price: self.extract_price(card),
            url: self.extract_url(card)?,
        };

        Ok(Listing::from_raw(raw, search_phrase))
    }

    /// Extract every readable listing on a page.
    ///
    /// Cards that fail are logged and skipped. Fails only when the page is a
    /// bot-protection page rather than a result list.
    fn extract_page(&self, html: &str, search_phrase: &str) -> Result<Vec<Listing>> {
        let document = Html::parse_document(html);
        let cards = self.locate_cards(&document);
        info!("Found {} listing cards on {} page", cards.len(), self.site());

        if cards.is_empty() {
            if let Some(marker) = BLOCK_MARKERS.iter().find(|m| html.contains(**m)) {
                return Err(ScoutError::PageSource(format!(
                    "{} served a bot-protection page (marker '{}')",
                    self.site(),
                    marker
                )));
            }
        }

        let mut listings = Vec::with_capacity(cards.len());
        for (idx, card) in cards.into_iter().enumerate() {
            match self.extract_listing(card, search_phrase) {
                Ok(listing) => {
                    debug!("Card {}: {} ({})", idx, listing.title(), listing.raw_price());
                    listings.push(listing);
                }
                Err(e) => warn!("Skipping card {} on {} page: {}", idx, self.site(), e),
            }
        }

        Ok(listings)
    }
}

/// Compile a CSS selector, reporting the offending selector on failure
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScoutError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// Whitespace-normalized text of the first element matching `selector`
pub fn select_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = card.select(selector).next()?;
    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// `href` of the first matching link resolved against `base`, or the sentinel
pub fn select_href(card: ElementRef<'_>, selector: &Selector, base: &Url) -> Result<String> {
    match card.select(selector).next().and_then(|a| a.value().attr("href")) {
        Some(href) if !href.trim().is_empty() => resolve_url(base, href.trim()),
        _ => Ok(NO_URL.to_string()),
    }
}

pub fn resolve_url(base: &Url, href: &str) -> Result<String> {
    base.join(href)
        .map(String::from)
        .map_err(|e| ScoutError::Card(format!("cannot resolve link '{}': {}", href, e)))
}

/// Contract the crawl needs from whatever supplies rendered pages: a
/// browser, an HTTP client or saved fixtures. Calls are blocking.
pub trait PageSource {
    fn navigate(&mut self, url: &str) -> Result<()>;

    fn submit_search(&mut self, phrase: &str) -> Result<()>;

    fn current_page_html(&mut self) -> Result<String>;

    fn has_next_page(&mut self) -> bool;

    fn go_to_next_page(&mut self) -> Result<()>;
}

impl<P: PageSource + ?Sized> PageSource for Box<P> {
    fn navigate(&mut self, url: &str) -> Result<()> {
        (**self).navigate(url)
    }

    fn submit_search(&mut self, phrase: &str) -> Result<()> {
        (**self).submit_search(phrase)
    }

    fn current_page_html(&mut self) -> Result<String> {
        (**self).current_page_html()
    }

    fn has_next_page(&mut self) -> bool {
        (**self).has_next_page()
    }

    fn go_to_next_page(&mut self) -> Result<()> {
        (**self).go_to_next_page()
    }
}
