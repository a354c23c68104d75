use serde::Serialize;
use std::collections::HashMap;

use crate::analytics::stats::{self, LinearFit};
use crate::analytics::{count_in_order, AnalyticsEngine, CHART_TOP_N};
use crate::models::{Listing, DATE_NOT_AVAILABLE, NO_DATE};

const OUTLIER_QUANTILE: f64 = 0.95;
const HISTOGRAM_BINS: usize = 20;
const TITLE_LABEL_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Pie,
    Histogram,
    ScatterRegression,
}

/// Aggregated series handed to the chart renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartData {
    Categorical {
        labels: Vec<String>,
        values: Vec<f64>,
    },
    Distribution {
        values: Vec<f64>,
        bins: usize,
        mean: f64,
        median: f64,
    },
    Scatter {
        /// `(square_meters, price)`
        points: Vec<(f64, f64)>,
        fit: Option<LinearFit>,
        mean_price_per_sqm: f64,
    },
}

/// One chart to render: what, from which series, into which file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// File name of the rendered image
    pub artifact: String,
    pub data: ChartData,
}

impl ChartSpec {
    fn new(kind: ChartKind, title: impl Into<String>, x: &str, y: &str, artifact: &str, data: ChartData) -> Self {
        Self {
            kind,
            title: title.into(),
            x_label: x.to_string(),
            y_label: y.to_string(),
            artifact: artifact.to_string(),
            data,
        }
    }
}

/// Charts in their fixed order; the region chart only when a region is set
pub fn build(engine: &AnalyticsEngine<'_>) -> Vec<ChartSpec> {
    let listings = engine.listings();
    let mut specs = vec![
        price_by_location(listings),
        category_distribution(engine),
        price_distribution(listings),
        price_vs_area(listings),
    ];

    if let Some(region) = engine.region() {
        let comparison = engine.compare_region(region);
        specs.push(ChartSpec::new(
            ChartKind::Bar,
            format!("Average Price: {} vs Other Regions", comparison.pattern),
            "Region",
            "Average Price (zł)",
            "region_comparison.png",
            ChartData::Categorical {
                labels: vec![
                    format!("Other Regions ({} listings)", comparison.others.count),
                    format!("{} ({} listings)", comparison.pattern, comparison.region.count),
                ],
                values: vec![comparison.others.mean_price, comparison.region.mean_price],
            },
        ));
    }

    specs.push(highest_prices(listings));
    specs.push(date_distribution(listings));
    specs
}

fn price_by_location(listings: &[Listing]) -> ChartSpec {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(&str, f64, usize)> = Vec::new();
    for listing in listings {
        match index.get(listing.location()) {
            Some(&i) => {
                totals[i].1 += listing.numeric_price();
                totals[i].2 += 1;
            }
            None => {
                index.insert(listing.location(), totals.len());
                totals.push((listing.location(), listing.numeric_price(), 1));
            }
        }
    }

    let mut means: Vec<(&str, f64)> = totals
        .into_iter()
        .map(|(loc, sum, n)| (loc, sum / n as f64))
        .collect();
    means.sort_by(|a, b| b.1.total_cmp(&a.1));
    means.truncate(CHART_TOP_N);

    ChartSpec::new(
        ChartKind::Bar,
        format!("Average Price by Top {} Locations", CHART_TOP_N),
        "Location",
        "Average Price (zł)",
        "avg_price_by_location.png",
        ChartData::Categorical {
            labels: means.iter().map(|(loc, _)| loc.to_string()).collect(),
            values: means.iter().map(|(_, mean)| *mean).collect(),
        },
    )
}

fn category_distribution(engine: &AnalyticsEngine<'_>) -> ChartSpec {
    let shares = engine.category_distribution();
    ChartSpec::new(
        ChartKind::Pie,
        "Distribution of Listings by Category",
        "Category",
        "Listings",
        "category_distribution.png",
        ChartData::Categorical {
            labels: shares.iter().map(|s| s.category.to_string()).collect(),
            values: shares.iter().map(|s| s.count as f64).collect(),
        },
    )
}

fn price_distribution(listings: &[Listing]) -> ChartSpec {
    let prices: Vec<f64> = listings.iter().map(|l| l.numeric_price()).collect();
    let cutoff = stats::quantile(&prices, OUTLIER_QUANTILE);
    let kept: Vec<f64> = prices.into_iter().filter(|p| *p < cutoff).collect();
    let summary = stats::PriceStats::from_values(&kept);

    ChartSpec::new(
        ChartKind::Histogram,
        "Price Distribution (excluding top 5% outliers)",
        "Price (zł)",
        "Number of Listings",
        "price_distribution.png",
        ChartData::Distribution {
            values: kept,
            bins: HISTOGRAM_BINS,
            mean: summary.mean,
            median: summary.median,
        },
    )
}

fn price_vs_area(listings: &[Listing]) -> ChartSpec {
    let valid: Vec<&Listing> = listings
        .iter()
        .filter(|l| l.square_meters() > 0.0 && l.numeric_price() > 0.0)
        .collect();
    let per_sqm: Vec<f64> = valid.iter().map(|l| l.price_per_sqm()).collect();
    let cutoff = stats::quantile(&per_sqm, OUTLIER_QUANTILE);
    let kept: Vec<&Listing> = valid.into_iter().filter(|l| l.price_per_sqm() < cutoff).collect();

    let points: Vec<(f64, f64)> = kept.iter().map(|l| (l.square_meters(), l.numeric_price())).collect();
    let kept_per_sqm: Vec<f64> = kept.iter().map(|l| l.price_per_sqm()).collect();

    ChartSpec::new(
        ChartKind::ScatterRegression,
        "Price vs Size (m²)",
        "Size (m²)",
        "Price (zł)",
        "price_per_sqm.png",
        ChartData::Scatter {
            fit: LinearFit::from_points(&points),
            points,
            mean_price_per_sqm: stats::mean(&kept_per_sqm),
        },
    )
}

fn highest_prices(listings: &[Listing]) -> ChartSpec {
    let mut ranked: Vec<&Listing> = listings.iter().collect();
    ranked.sort_by(|a, b| b.numeric_price().total_cmp(&a.numeric_price()));
    ranked.truncate(CHART_TOP_N);

    ChartSpec::new(
        ChartKind::Bar,
        format!("Top {} Most Expensive Listings", CHART_TOP_N),
        "Price (zł)",
        "Title",
        "highest_prices.png",
        ChartData::Categorical {
            labels: ranked.iter().map(|l| truncate_label(l.title())).collect(),
            values: ranked.iter().map(|l| l.numeric_price()).collect(),
        },
    )
}

fn date_distribution(listings: &[Listing]) -> ChartSpec {
    let mut counts = count_in_order(
        listings
            .iter()
            .map(|l| l.date_posted_raw())
            .filter(|d| *d != NO_DATE && *d != DATE_NOT_AVAILABLE),
    );
    counts.sort_by(|a, b| a.0.cmp(b.0));

    ChartSpec::new(
        ChartKind::Bar,
        "Listings by Date Posted",
        "Date Posted",
        "Number of Listings",
        "date_distribution.png",
        ChartData::Categorical {
            labels: counts.iter().map(|(d, _)| d.to_string()).collect(),
            values: counts.iter().map(|(_, n)| *n as f64).collect(),
        },
    )
}

fn truncate_label(title: &str) -> String {
    let truncated: String = title.chars().take(TITLE_LABEL_CHARS).collect();
    format!("{}...", truncated)
}
