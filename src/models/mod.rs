use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScoutError;
use crate::fields;

pub const NO_TITLE: &str = "No Title";
pub const NO_LOCATION: &str = "No Location";
pub const NO_DATE: &str = "No Date";
pub const DATE_NOT_AVAILABLE: &str = "Not available";
pub const NO_PRICE: &str = "0 zł";
pub const NO_URL: &str = "No URL";

/// Marketplace a listing was scraped from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Olx,
    Allegro,
}

impl Site {
    pub fn as_str(&self) -> &'static str {
        match self {
            Site::Olx => "olx",
            Site::Allegro => "allegro",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Site {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "olx" => Ok(Site::Olx),
            "allegro" => Ok(Site::Allegro),
            other => Err(ScoutError::UnsupportedSite(other.to_string())),
        }
    }
}

/// Coarse classification bucket assigned from title keywords
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Electronics,
    Vehicles,
    RealEstate,
    Jobs,
    Services,
    Fashion,
    Furniture,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "electronics",
            Category::Vehicles => "vehicles",
            Category::RealEstate => "real_estate",
            Category::Jobs => "jobs",
            Category::Services => "services",
            Category::Fashion => "fashion",
            Category::Furniture => "furniture",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw strings pulled out of one listing card before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawListing {
    pub title: String,
    pub location: String,
    pub date_posted: String,
    pub price: String,
    pub url: String,
}

/// Normalized classified-ad record.
///
/// Fields are read-only; `price_per_sqm` is always derived from
/// `numeric_price` and `square_meters` at construction.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Listing {
    title: String,
    location: String,
    raw_price: String,
    numeric_price: f64,
    url: String,
    date_posted_raw: String,
    category: Category,
    square_meters: f64,
    price_per_sqm: f64,
    search_phrase: String,
    scraped_at: DateTime<Utc>,
}

impl Listing {
    /// Normalize a raw card into a listing, stamped with the current time
    pub fn from_raw(raw: RawListing, search_phrase: &str) -> Self {
        Self::from_raw_at(raw, search_phrase, Utc::now())
    }

    pub fn from_raw_at(raw: RawListing, search_phrase: &str, scraped_at: DateTime<Utc>) -> Self {
        let numeric_price = fields::parse_price(&raw.price);
        let square_meters = fields::parse_square_meters(&raw.title);
        let category = fields::classify(&raw.title);

        Self {
            price_per_sqm: price_per_sqm(numeric_price, square_meters),
            title: raw.title,
            location: raw.location,
            raw_price: raw.price,
            numeric_price,
            url: raw.url,
            date_posted_raw: raw.date_posted,
            category,
            square_meters,
            search_phrase: search_phrase.to_string(),
            scraped_at,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn raw_price(&self) -> &str {
        &self.raw_price
    }

    pub fn numeric_price(&self) -> f64 {
        self.numeric_price
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn date_posted_raw(&self) -> &str {
        &self.date_posted_raw
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn square_meters(&self) -> f64 {
        self.square_meters
    }

    pub fn price_per_sqm(&self) -> f64 {
        self.price_per_sqm
    }

    pub fn search_phrase(&self) -> &str {
        &self.search_phrase
    }

    pub fn scraped_at(&self) -> DateTime<Utc> {
        self.scraped_at
    }
}

fn price_per_sqm(price: f64, square_meters: f64) -> f64 {
    if price > 0.0 && square_meters > 0.0 {
        price / square_meters
    } else {
        0.0
    }
}
