use std::path::PathBuf;

use clap::ValueEnum;
use regex::Regex;

use crate::analytics::region::compile_region;
use crate::analytics::ReportFormat;
use crate::error::{Result, ScoutError};
use crate::models::Site;
use crate::scrapers::{BrowserOptions, RetryPolicy};

pub const DEFAULT_MAX_PAGES: usize = 3;
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Where rendered result pages come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Headless Chrome, typing the query into the site's search box
    #[default]
    Browser,
    /// Plain HTTP against the search URL, following next-page links
    Http,
    /// Saved HTML pages replayed from a directory
    Fixture,
}

/// Run settings as given on the command line, before validation
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    pub site: Site,
    pub phrases: Vec<String>,
    pub max_pages: usize,
    pub region: Option<String>,
    pub report_format: ReportFormat,
    pub output_dir: PathBuf,
    pub sqlite_path: Option<PathBuf>,
    pub source: SourceKind,
    pub fixture_dir: Option<PathBuf>,
    pub retries: u32,
    pub headed: bool,
    pub debug_pages: bool,
}

impl ScoutConfig {
    pub fn new(site: Site, phrases: &str) -> Self {
        Self {
            site,
            phrases: split_phrases(phrases),
            max_pages: DEFAULT_MAX_PAGES,
            region: None,
            report_format: ReportFormat::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            sqlite_path: None,
            source: SourceKind::default(),
            fixture_dir: None,
            retries: RetryPolicy::default().max_attempts,
            headed: false,
            debug_pages: false,
        }
    }

    /// Check the settings and compile the region pattern.
    /// Every failure here is fatal for the run.
    pub fn validate(&self) -> Result<Option<Regex>> {
        if self.phrases.is_empty() {
            return Err(ScoutError::Config("at least one search phrase is required".to_string()));
        }
        if self.max_pages == 0 {
            return Err(ScoutError::Config("pages must be at least 1".to_string()));
        }
        if self.retries == 0 {
            return Err(ScoutError::Config("retries must be at least 1".to_string()));
        }
        if self.source == SourceKind::Fixture && self.fixture_dir.is_none() {
            return Err(ScoutError::Config(
                "the fixture source needs --fixture-dir".to_string(),
            ));
        }

        self.region.as_deref().map(compile_region).transpose()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retries,
            ..RetryPolicy::default()
        }
    }

    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            headless: !self.headed,
            pacing: true,
            debug_dir: self.debug_pages.then(|| self.output_dir.join("debug")),
        }
    }

    pub fn charts_dir(&self) -> PathBuf {
        self.output_dir.join("charts")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.output_dir.join("reports")
    }

    pub fn listings_dir(&self) -> PathBuf {
        self.output_dir.join("listings")
    }
}

/// Comma-separated phrases, trimmed, blanks dropped
pub fn split_phrases(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_phrases() {
        assert_eq!(
            split_phrases(" laptop , rower miejski,,  "),
            vec!["laptop".to_string(), "rower miejski".to_string()]
        );
        assert!(split_phrases(" , ").is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = ScoutConfig::new(Site::Olx, "mieszkanie");
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.report_format, ReportFormat::Markdown);
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.source, SourceKind::Browser);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert!(config.validate().unwrap().is_none());
    }

    #[test]
    fn test_rejects_empty_phrases_and_zero_pages() {
        assert!(ScoutConfig::new(Site::Olx, " ,").validate().is_err());

        let mut config = ScoutConfig::new(Site::Olx, "laptop");
        config.max_pages = 0;
        assert!(matches!(config.validate(), Err(ScoutError::Config(_))));
    }

    #[test]
    fn test_fixture_source_needs_dir() {
        let mut config = ScoutConfig::new(Site::Allegro, "laptop");
        config.source = SourceKind::Fixture;
        assert!(config.validate().is_err());

        config.fixture_dir = Some(PathBuf::from("fixtures"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_region_compiled_during_validation() {
        let mut config = ScoutConfig::new(Site::Olx, "laptop");
        config.region = Some("warszawa|kraków".to_string());
        let region = config.validate().unwrap().unwrap();
        assert!(region.is_match("KRAKÓW, Podgórze"));

        config.region = Some("([unclosed".to_string());
        assert!(matches!(config.validate(), Err(ScoutError::InvalidRegion { .. })));
    }

    #[test]
    fn test_browser_options_follow_flags() {
        let mut config = ScoutConfig::new(Site::Olx, "laptop");
        config.headed = true;
        config.debug_pages = true;
        let options = config.browser_options();
        assert!(!options.headless);
        assert_eq!(options.debug_dir, Some(PathBuf::from("output").join("debug")));
    }
}
