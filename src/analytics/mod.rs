//! Statistics, region comparison, reports and chart specifications over a
//! finished session's listings.

pub mod charts;
pub mod region;
pub mod report;
pub mod stats;

pub use charts::{ChartData, ChartKind, ChartSpec};
pub use region::{RegionComparison, RegionPartition};
pub use report::ReportFormat;
pub use stats::PriceStats;

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

use crate::models::{Category, Listing, Site};
use crate::session::SearchSession;

/// Locations listed in text reports
pub const REPORT_TOP_LOCATIONS: usize = 5;
/// Locations and listings shown in charts
pub const CHART_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationCount {
    pub location: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: Category,
    pub count: usize,
    pub percent: f64,
}

/// Everything the reports are built from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub price: PriceStats,
    pub price_per_sqm: PriceStats,
    pub mean_square_meters: f64,
    pub top_locations: Vec<LocationCount>,
    pub categories: Vec<CategoryShare>,
    pub region: Option<RegionComparison>,
}

pub struct AnalyticsEngine<'a> {
    listings: &'a [Listing],
    search_phrase: &'a str,
    site: Option<Site>,
    region: Option<&'a Regex>,
}

impl<'a> AnalyticsEngine<'a> {
    pub fn new(session: &'a SearchSession) -> Self {
        Self {
            listings: session.listings(),
            search_phrase: session.search_phrase(),
            site: Some(session.site()),
            region: session.region(),
        }
    }

    /// Analyze a bare listing set without session metadata
    pub fn from_listings(listings: &'a [Listing]) -> Self {
        Self {
            listings,
            search_phrase: "",
            site: None,
            region: None,
        }
    }

    pub fn with_region(mut self, region: &'a Regex) -> Self {
        self.region = Some(region);
        self
    }

    pub fn listings(&self) -> &'a [Listing] {
        self.listings
    }

    pub fn search_phrase(&self) -> &'a str {
        self.search_phrase
    }

    pub fn site(&self) -> Option<Site> {
        self.site
    }

    pub fn region(&self) -> Option<&'a Regex> {
        self.region
    }

    pub fn price_stats(&self) -> PriceStats {
        let prices: Vec<f64> = self.listings.iter().map(|l| l.numeric_price()).collect();
        PriceStats::from_values(&prices)
    }

    /// Over listings with a known area only
    pub fn price_per_sqm_stats(&self) -> PriceStats {
        let values: Vec<f64> = self
            .with_area()
            .map(|l| l.price_per_sqm())
            .collect();
        PriceStats::from_values(&values)
    }

    pub fn mean_square_meters(&self) -> f64 {
        let areas: Vec<f64> = self.with_area().map(|l| l.square_meters()).collect();
        stats::mean(&areas)
    }

    /// Most frequent locations; ties keep first-seen order
    pub fn top_locations(&self, n: usize) -> Vec<LocationCount> {
        let mut counts = count_in_order(self.listings.iter().map(|l| l.location()));
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
            .into_iter()
            .take(n)
            .map(|(location, count)| LocationCount {
                location: location.to_string(),
                count,
            })
            .collect()
    }

    /// Count and share of each category present, most common first
    pub fn category_distribution(&self) -> Vec<CategoryShare> {
        let total = self.listings.len();
        let mut counts = count_in_order(self.listings.iter().map(|l| l.category()));
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
            .into_iter()
            .map(|(category, count)| CategoryShare {
                category,
                count,
                percent: count as f64 / total as f64 * 100.0,
            })
            .collect()
    }

    pub fn compare_region(&self, region: &Regex) -> RegionComparison {
        RegionComparison::compute(self.listings, region)
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total: self.listings.len(),
            price: self.price_stats(),
            price_per_sqm: self.price_per_sqm_stats(),
            mean_square_meters: self.mean_square_meters(),
            top_locations: self.top_locations(REPORT_TOP_LOCATIONS),
            categories: self.category_distribution(),
            region: self.region.map(|r| self.compare_region(r)),
        }
    }

    pub fn render_report(&self, format: ReportFormat) -> String {
        report::render(self, &self.summary(), format)
    }

    pub fn chart_specs(&self) -> Vec<ChartSpec> {
        charts::build(self)
    }

    fn with_area(&self) -> impl Iterator<Item = &'a Listing> {
        self.listings.iter().filter(|l| l.square_meters() > 0.0)
    }
}

/// Occurrence counts keyed in first-seen order
pub(crate) fn count_in_order<K, I>(items: I) -> Vec<(K, usize)>
where
    K: Eq + std::hash::Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();
    for item in items {
        match index.get(&item) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(item.clone(), counts.len());
                counts.push((item, 1));
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawListing;

    fn listing(title: &str, location: &str, price: &str) -> Listing {
        Listing::from_raw(
            RawListing {
                title: title.to_string(),
                location: location.to_string(),
                date_posted: "Dzisiaj".to_string(),
                price: price.to_string(),
                url: "https://www.olx.pl/d/oferta/x".to_string(),
            },
            "test",
        )
    }

    fn sample() -> Vec<Listing> {
        vec![
            listing("Mieszkanie 50m2", "Gdańsk", "500 000 zł"),
            listing("Laptop Lenovo", "Gdynia", "2 000 zł"),
            listing("Mieszkanie 25m2", "Gdańsk", "300 000 zł"),
            listing("Rower miejski", "Sopot", "800 zł"),
            listing("Stara szafa", "Gdynia", "200 zł"),
            listing("Kawalerka 20 mkw", "Gdańsk", "Zapytaj o cenę"),
        ]
    }

    #[test]
    fn test_price_stats_cover_all_listings() {
        let listings = sample();
        let stats = AnalyticsEngine::from_listings(&listings).price_stats();
        assert_eq!(stats.count, 6);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 500000.0);
        assert_eq!(stats.median, 1400.0);
    }

    #[test]
    fn test_price_per_sqm_only_with_area() {
        let listings = sample();
        let engine = AnalyticsEngine::from_listings(&listings);
        let stats = engine.price_per_sqm_stats();
        // 10 000, 12 000 and 0 for the listing without a price
        assert_eq!(stats.count, 3);
        assert_eq!(stats.max, 12000.0);
        assert_eq!(stats.min, 0.0);
        assert!((engine.mean_square_meters() - 95.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_locations_by_frequency() {
        let listings = sample();
        let top = AnalyticsEngine::from_listings(&listings).top_locations(2);
        assert_eq!(
            top,
            vec![
                LocationCount { location: "Gdańsk".to_string(), count: 3 },
                LocationCount { location: "Gdynia".to_string(), count: 2 },
            ]
        );
    }

    #[test]
    fn test_category_distribution_percentages() {
        let listings = sample();
        let shares = AnalyticsEngine::from_listings(&listings).category_distribution();
        assert_eq!(shares[0].category, Category::RealEstate);
        assert_eq!(shares[0].count, 2);
        let total: usize = shares.iter().map(|s| s.count).sum();
        assert_eq!(total, 6);
        let pct: f64 = shares.iter().map(|s| s.percent).sum();
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_listing_set() {
        let listings: Vec<Listing> = Vec::new();
        let summary = AnalyticsEngine::from_listings(&listings).summary();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.price, PriceStats::default());
        assert!(summary.top_locations.is_empty());
        assert!(summary.categories.is_empty());
        assert!(summary.region.is_none());
    }
}
