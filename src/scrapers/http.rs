use reqwest::blocking::Client;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Result, ScoutError};
use crate::scrapers::traits::{PageSource, SiteAdapter};
use crate::scrapers::types::SiteNavigation;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Plain HTTP page source: searches through the site's search URL and
/// follows next-page links instead of clicking them.
///
/// Only works for result pages that are rendered server-side.
pub struct HttpPageSource<'a> {
    client: Client,
    adapter: &'a dyn SiteAdapter,
    current_html: Option<String>,
}

impl<'a> HttpPageSource<'a> {
    pub fn new(adapter: &'a dyn SiteAdapter) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            adapter,
            current_html: None,
        })
    }

    fn navigation(&self) -> &SiteNavigation {
        self.adapter.navigation()
    }

    fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching URL: {}", url);
        let response = self.client.get(url).send()?;

        if !response.status().is_success() {
            warn!("{} returned status: {}", url, response.status());
            return Err(ScoutError::PageSource(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }

        let html = response.text()?;
        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(html)
    }

    fn next_url(&self) -> Option<String> {
        let html = self.current_html.as_deref()?;
        self.adapter.next_page_url(&Html::parse_document(html))
    }
}

impl PageSource for HttpPageSource<'_> {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.current_html = Some(self.fetch(url)?);
        Ok(())
    }

    fn submit_search(&mut self, phrase: &str) -> Result<()> {
        let url = self.navigation().search_url(phrase);
        info!("Searching {} for '{}'", self.adapter.site(), phrase);
        self.navigate(&url)
    }

    fn current_page_html(&mut self) -> Result<String> {
        self.current_html
            .clone()
            .ok_or_else(|| ScoutError::PageSource("no page fetched yet".to_string()))
    }

    fn has_next_page(&mut self) -> bool {
        self.next_url().is_some()
    }

    fn go_to_next_page(&mut self) -> Result<()> {
        let url = self
            .next_url()
            .ok_or_else(|| ScoutError::PageSource("page has no next-page link".to_string()))?;
        info!("Navigating to next page");
        self.navigate(&url)
    }
}
