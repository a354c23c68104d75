use chrono::{DateTime, Utc};
use regex::Regex;

use crate::analytics::region::compile_region;
use crate::error::{Result, ScoutError};
use crate::models::{Listing, Site};
use crate::repository::ListingRepository;

/// Scope of one search phrase's crawl. Passed by value through the
/// pipeline; sessions never share listings.
#[derive(Debug, Clone)]
pub struct SearchSession {
    site: Site,
    search_phrase: String,
    max_pages: usize,
    region: Option<Regex>,
    started_at: DateTime<Utc>,
    repository: ListingRepository,
}

impl SearchSession {
    pub fn new(site: Site, search_phrase: impl Into<String>, max_pages: usize) -> Result<Self> {
        let search_phrase = search_phrase.into();
        if max_pages == 0 {
            return Err(ScoutError::Config("max_pages must be at least 1".to_string()));
        }
        if search_phrase.trim().is_empty() {
            return Err(ScoutError::Config("search phrase must not be empty".to_string()));
        }

        Ok(Self {
            site,
            search_phrase,
            max_pages,
            region: None,
            started_at: Utc::now(),
            repository: ListingRepository::new(),
        })
    }

    /// Attach a case-insensitive region pattern for later comparison
    pub fn with_region(mut self, pattern: &str) -> Result<Self> {
        self.region = Some(compile_region(pattern)?);
        Ok(self)
    }

    pub fn site(&self) -> Site {
        self.site
    }

    pub fn search_phrase(&self) -> &str {
        &self.search_phrase
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    pub fn region(&self) -> Option<&Regex> {
        self.region.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn record_page(&mut self, listings: Vec<Listing>) {
        self.repository.insert_all(listings);
    }

    pub fn repository(&self) -> &ListingRepository {
        &self.repository
    }

    pub fn listings(&self) -> &[Listing] {
        self.repository.listings()
    }
}
