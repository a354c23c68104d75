use anyhow::Context;
use clap::Parser;
use regex::Regex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use listing_scout::config::{ScoutConfig, SourceKind, DEFAULT_MAX_PAGES, DEFAULT_OUTPUT_DIR};
use listing_scout::export::{JsonExporter, SqliteStore};
use listing_scout::pagination::ExhaustedReason;
use listing_scout::scrapers::{
    self, BrowserPageSource, FixturePageSource, HttpPageSource, RetryingPageSource,
};
use listing_scout::{Pipeline, ScoutError, SessionResult};

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrape OLX and Allegro listings and summarize them")]
struct Args {
    /// Marketplace to search: olx or allegro
    #[arg(short, long, default_value = "olx")]
    site: String,

    /// Search phrases, comma-separated
    #[arg(short = 'q', long)]
    phrases: String,

    /// Maximum number of result pages per phrase
    #[arg(short, long, default_value_t = DEFAULT_MAX_PAGES)]
    pages: usize,

    /// Regex matched against listing locations for a regional comparison
    #[arg(short, long)]
    region: Option<String>,

    /// Report format: plain, markdown or html
    #[arg(short, long, default_value = "markdown")]
    format: String,

    /// Directory for listings, reports and chart specs
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: String,

    /// Also store listings in this SQLite database
    #[arg(long)]
    sqlite: Option<String>,

    /// Where result pages come from
    #[arg(long, value_enum, default_value = "browser")]
    source: SourceKind,

    /// Directory of saved result pages for the fixture source
    #[arg(long)]
    fixture_dir: Option<String>,

    /// Attempts per page action before giving up on a page
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Save every fetched page's HTML under <output>/debug
    #[arg(long)]
    debug_pages: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> listing_scout::Result<ScoutConfig> {
        let mut config = ScoutConfig::new(self.site.parse()?, &self.phrases);
        config.max_pages = self.pages;
        config.region = self.region;
        config.report_format = self.format.parse()?;
        config.output_dir = self.output.into();
        config.sqlite_path = self.sqlite.map(Into::into);
        config.source = self.source;
        config.fixture_dir = self.fixture_dir.map(Into::into);
        config.retries = self.retries;
        config.headed = self.headed;
        config.debug_pages = self.debug_pages;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("🏠 Listing Scout");
    info!("================");

    let config = args.into_config().context("Invalid arguments")?;
    let region = config.validate().context("Invalid configuration")?;
    info!(
        "Site: {} | Phrases: {} | Pages: {} | Source: {:?}",
        config.site,
        config.phrases.join(", "),
        config.max_pages,
        config.source
    );

    let run_config = config.clone();
    let results = tokio::task::spawn_blocking(move || scrape(&run_config, region))
        .await
        .context("Scraper task panicked")?
        .context("Scraping failed")?;

    tokio::fs::create_dir_all(config.reports_dir()).await?;
    tokio::fs::create_dir_all(config.charts_dir()).await?;

    for result in &results {
        let stem = file_stem(result);

        let report_path = config
            .reports_dir()
            .join(format!("{}.{}", stem, config.report_format.extension()));
        tokio::fs::write(&report_path, &result.report).await?;
        info!("📝 Saved report to {}", report_path.display());

        let charts_path = config.charts_dir().join(format!("{}_charts.json", stem));
        let charts_json = serde_json::to_string_pretty(&result.charts)?;
        tokio::fs::write(&charts_path, charts_json).await?;
        info!("📊 Saved {} chart specs to {}", result.charts.len(), charts_path.display());

        if let ExhaustedReason::PageError(detail) = &result.reason {
            warn!("'{}' ended early: {}", result.session.search_phrase(), detail);
        }

        println!("{}", result.report);
    }

    let total: usize = results.iter().map(|r| r.session.listings().len()).sum();
    info!("\n✅ Scraped {} listings across {} phrases", total, results.len());

    Ok(())
}

/// Blocking part of the run: page source, crawl, sinks and analytics
fn scrape(config: &ScoutConfig, region: Option<Regex>) -> listing_scout::Result<Vec<SessionResult>> {
    let adapter = scrapers::adapter_for(config.site)?;

    let mut pipeline = Pipeline::new(adapter.as_ref(), config.max_pages, config.report_format)
        .with_region(region)
        .with_sink(Box::new(JsonExporter::new(config.listings_dir())));
    if let Some(path) = &config.sqlite_path {
        pipeline = pipeline.with_sink(Box::new(SqliteStore::open(path)?));
    }

    let policy = config.retry_policy();
    match config.source {
        SourceKind::Browser => {
            let browser = BrowserPageSource::launch(
                config.site,
                adapter.navigation().clone(),
                config.browser_options(),
            )?;
            pipeline.run(&config.phrases, &mut RetryingPageSource::new(browser, policy))
        }
        SourceKind::Http => {
            let http = HttpPageSource::new(adapter.as_ref())?;
            pipeline.run(&config.phrases, &mut RetryingPageSource::new(http, policy))
        }
        SourceKind::Fixture => {
            let dir = config
                .fixture_dir
                .as_deref()
                .ok_or_else(|| ScoutError::Config("missing fixture directory".to_string()))?;
            let fixture = FixturePageSource::from_dir(dir)?;
            pipeline.run(&config.phrases, &mut RetryingPageSource::new(fixture, policy))
        }
    }
}

fn file_stem(result: &SessionResult) -> String {
    let phrase = result
        .session
        .search_phrase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!(
        "{}_{}_{}",
        result.session.site(),
        phrase,
        result.session.started_at().format("%Y%m%d_%H%M%S")
    )
}
