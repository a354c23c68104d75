use regex::Regex;
use tracing::{info, warn};

use crate::analytics::{AnalyticsEngine, ChartSpec, ReportFormat};
use crate::error::Result;
use crate::export::ListingSink;
use crate::pagination::{ExhaustedReason, PaginationController};
use crate::scrapers::{PageSource, SiteAdapter};
use crate::session::SearchSession;

/// Everything produced for one search phrase
#[derive(Debug)]
pub struct SessionResult {
    pub session: SearchSession,
    pub pages_visited: usize,
    pub reason: ExhaustedReason,
    pub report: String,
    pub charts: Vec<ChartSpec>,
}

/// Runs one independent session per search phrase against a single page
/// source, then hands each finished session to analytics and the sinks.
pub struct Pipeline<'a> {
    adapter: &'a dyn SiteAdapter,
    max_pages: usize,
    region: Option<Regex>,
    report_format: ReportFormat,
    sinks: Vec<Box<dyn ListingSink>>,
}

impl<'a> Pipeline<'a> {
    pub fn new(adapter: &'a dyn SiteAdapter, max_pages: usize, report_format: ReportFormat) -> Self {
        Self {
            adapter,
            max_pages,
            region: None,
            report_format,
            sinks: Vec::new(),
        }
    }

    pub fn with_region(mut self, region: Option<Regex>) -> Self {
        self.region = region;
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn ListingSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Not being able to open the marketplace at all is fatal. Once it has
    /// been reached, a failure in one phrase only cuts that session short.
    pub fn run<S>(&mut self, phrases: &[String], source: &mut S) -> Result<Vec<SessionResult>>
    where
        S: PageSource + ?Sized,
    {
        let home_url = self.adapter.navigation().home_url.clone();
        source.navigate(&home_url)?;

        let mut results = Vec::with_capacity(phrases.len());
        for (i, phrase) in phrases.iter().enumerate() {
            info!("🔍 [{}/{}] Searching {} for '{}'", i + 1, phrases.len(), self.adapter.site(), phrase);
            let session = self.new_session(phrase)?;

            if i > 0 {
                if let Err(e) = source.navigate(&home_url) {
                    warn!("Could not return to {} before '{}': {}", home_url, phrase, e);
                    let reason = ExhaustedReason::PageError(format!("home page: {}", e));
                    results.push(self.finish(session, 0, reason));
                    continue;
                }
            }

            let outcome = PaginationController::new(self.adapter).run(session, source);
            results.push(self.finish(outcome.session, outcome.pages_visited, outcome.reason));
        }

        Ok(results)
    }

    fn new_session(&self, phrase: &str) -> Result<SearchSession> {
        let session = SearchSession::new(self.adapter.site(), phrase, self.max_pages)?;
        match &self.region {
            Some(region) => session.with_region(region.as_str()),
            None => Ok(session),
        }
    }

    /// Store the session in every sink and build its report and charts
    fn finish(&mut self, session: SearchSession, pages_visited: usize, reason: ExhaustedReason) -> SessionResult {
        let phrase = session.search_phrase().to_string();
        info!(
            "✅ '{}': {} listings from {} pages",
            phrase,
            session.listings().len(),
            pages_visited
        );

        if session.listings().is_empty() {
            warn!("No listings found for '{}'", phrase);
        } else {
            for sink in self.sinks.iter_mut() {
                if let Err(e) = sink.store(&session) {
                    warn!("Could not store '{}' in {}: {}", phrase, sink.name(), e);
                }
            }
        }

        let engine = AnalyticsEngine::new(&session);
        let report = engine.render_report(self.report_format);
        let charts = engine.chart_specs();

        SessionResult {
            pages_visited,
            reason,
            report,
            charts,
            session,
        }
    }
}
