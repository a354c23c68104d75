use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analytics::region::{Delta, RegionComparison};
use crate::analytics::stats::PriceStats;
use crate::analytics::{AnalyticsEngine, Summary};
use crate::error::ScoutError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Plain,
    #[default]
    Markdown,
    Html,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Plain => "plain",
            ReportFormat::Markdown => "markdown",
            ReportFormat::Html => "html",
        }
    }

    /// File extension for a written report
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Plain => "txt",
            ReportFormat::Markdown => "md",
            ReportFormat::Html => "html",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" | "text" | "txt" => Ok(ReportFormat::Plain),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "html" => Ok(ReportFormat::Html),
            other => Err(ScoutError::Config(format!("unknown report format '{}'", other))),
        }
    }
}

struct Section {
    heading: String,
    lines: Vec<String>,
}

struct Document {
    title: String,
    sections: Vec<Section>,
}

pub fn render(engine: &AnalyticsEngine<'_>, summary: &Summary, format: ReportFormat) -> String {
    let document = build(engine, summary);
    match format {
        ReportFormat::Plain => plain(&document),
        ReportFormat::Markdown => markdown(&document),
        ReportFormat::Html => html_from_markdown(&markdown(&document)),
    }
}

fn build(engine: &AnalyticsEngine<'_>, summary: &Summary) -> Document {
    let title = if engine.search_phrase().is_empty() {
        "Listing Report".to_string()
    } else {
        format!("Listing Report: {}", engine.search_phrase())
    };

    let mut overview = vec![format!("Total listings: {}", summary.total)];
    if let Some(site) = engine.site() {
        overview.insert(0, format!("Site: {}", site));
    }

    let mut sections = vec![
        Section {
            heading: "Overview".to_string(),
            lines: overview,
        },
        Section {
            heading: "Price".to_string(),
            lines: stats_lines(&summary.price, "zł"),
        },
    ];

    let mut per_sqm = vec![format!(
        "Average area: {:.2} m²",
        summary.mean_square_meters
    )];
    per_sqm.extend(stats_lines(&summary.price_per_sqm, "zł/m²"));
    sections.push(Section {
        heading: "Price per m²".to_string(),
        lines: per_sqm,
    });

    sections.push(Section {
        heading: "Top Locations".to_string(),
        lines: summary
            .top_locations
            .iter()
            .enumerate()
            .map(|(i, l)| format!("{}. {} ({} listings)", i + 1, l.location, l.count))
            .collect(),
    });

    sections.push(Section {
        heading: "Categories".to_string(),
        lines: summary
            .categories
            .iter()
            .map(|c| format!("{}: {} ({:.1}%)", c.category, c.count, c.percent))
            .collect(),
    });

    if let Some(comparison) = &summary.region {
        sections.push(region_section(comparison));
    }

    Document { title, sections }
}

fn stats_lines(stats: &PriceStats, unit: &str) -> Vec<String> {
    vec![
        format!("Count: {}", stats.count),
        format!("Average: {:.2} {}", stats.mean, unit),
        format!("Median: {:.2} {}", stats.median, unit),
        format!("Lowest: {:.2} {}", stats.min, unit),
        format!("Highest: {:.2} {}", stats.max, unit),
    ]
}

fn region_section(comparison: &RegionComparison) -> Section {
    let group = |name: &str, count: usize, price: f64, per_sqm: f64| {
        format!(
            "{}: {} listings, average {:.2} zł, {:.2} zł/m²",
            name, count, price, per_sqm
        )
    };

    Section {
        heading: format!("Region: {}", comparison.pattern),
        lines: vec![
            group(
                "Matching",
                comparison.region.count,
                comparison.region.mean_price,
                comparison.region.mean_price_per_sqm,
            ),
            group(
                "Other regions",
                comparison.others.count,
                comparison.others.mean_price,
                comparison.others.mean_price_per_sqm,
            ),
            format!("Price difference: {}", delta(&comparison.price_delta, "zł")),
            format!(
                "Price per m² difference: {}",
                delta(&comparison.price_per_sqm_delta, "zł/m²")
            ),
        ],
    }
}

fn delta(delta: &Delta, unit: &str) -> String {
    match delta.percent {
        Some(percent) => format!("{:+.2} {} ({:+.1}%)", delta.absolute, unit, percent),
        None => format!("{:+.2} {} (n/a)", delta.absolute, unit),
    }
}

fn plain(document: &Document) -> String {
    let mut out = String::new();
    out.push_str(&document.title);
    out.push('\n');
    out.push_str(&"=".repeat(document.title.chars().count()));
    out.push('\n');

    for section in &document.sections {
        out.push('\n');
        out.push_str(&section.heading);
        out.push('\n');
        out.push_str(&"-".repeat(section.heading.chars().count()));
        out.push('\n');
        for line in &section.lines {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

fn markdown(document: &Document) -> String {
    let mut out = format!("# {}\n", document.title);
    for section in &document.sections {
        out.push_str(&format!("\n## {}\n", section.heading));
        for line in &section.lines {
            out.push_str(&format!("- {}\n", line));
        }
    }
    out
}

/// Literal substitution: headings become tags, every other line gets a `<br>`
fn html_from_markdown(markdown: &str) -> String {
    markdown
        .lines()
        .map(|line| {
            if let Some(text) = line.strip_prefix("## ") {
                format!("<h2>{}</h2>", text)
            } else if let Some(text) = line.strip_prefix("# ") {
                format!("<h1>{}</h1>", text)
            } else {
                format!("{}<br>", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
