use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::analytics::stats::mean;
use crate::error::{Result, ScoutError};
use crate::models::Listing;

/// Compile a user-supplied region pattern for case-insensitive search
pub fn compile_region(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| ScoutError::InvalidRegion {
            pattern: pattern.to_string(),
            source,
        })
}

/// Disjoint split of a listing set by region pattern; together the two
/// halves are exactly the input.
#[derive(Debug, Clone)]
pub struct RegionPartition<'a> {
    pub matches: Vec<&'a Listing>,
    pub others: Vec<&'a Listing>,
}

impl<'a> RegionPartition<'a> {
    pub fn split(listings: &'a [Listing], region: &Regex) -> Self {
        let (matches, others): (Vec<&Listing>, Vec<&Listing>) =
            listings.iter().partition(|l| region.is_match(l.location()));
        Self { matches, others }
    }
}

/// Averages of one side of a region partition
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RegionGroup {
    pub count: usize,
    pub mean_price: f64,
    /// Over listings with a known area only
    pub mean_price_per_sqm: f64,
}

impl RegionGroup {
    fn from_listings(listings: &[&Listing]) -> Self {
        let prices: Vec<f64> = listings.iter().map(|l| l.numeric_price()).collect();
        let per_sqm: Vec<f64> = listings
            .iter()
            .filter(|l| l.square_meters() > 0.0)
            .map(|l| l.price_per_sqm())
            .collect();

        Self {
            count: listings.len(),
            mean_price: mean(&prices),
            mean_price_per_sqm: mean(&per_sqm),
        }
    }
}

/// Difference of the region against everything else
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Delta {
    pub absolute: f64,
    /// `None` when the baseline is empty or zero
    pub percent: Option<f64>,
}

impl Delta {
    fn between(value: f64, baseline: f64, baseline_count: usize) -> Self {
        let absolute = value - baseline;
        let percent = if baseline_count == 0 || baseline == 0.0 {
            None
        } else {
            Some(absolute / baseline * 100.0)
        };
        Self { absolute, percent }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionComparison {
    pub pattern: String,
    pub region: RegionGroup,
    pub others: RegionGroup,
    pub price_delta: Delta,
    pub price_per_sqm_delta: Delta,
}

impl RegionComparison {
    pub fn compute(listings: &[Listing], region: &Regex) -> Self {
        let partition = RegionPartition::split(listings, region);
        let inside = RegionGroup::from_listings(&partition.matches);
        let outside = RegionGroup::from_listings(&partition.others);

        Self {
            pattern: region.as_str().to_string(),
            price_delta: Delta::between(inside.mean_price, outside.mean_price, outside.count),
            price_per_sqm_delta: Delta::between(
                inside.mean_price_per_sqm,
                outside.mean_price_per_sqm,
                outside.count,
            ),
            region: inside,
            others: outside,
        }
    }
}
