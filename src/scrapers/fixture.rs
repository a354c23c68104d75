use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Result, ScoutError};
use crate::scrapers::traits::PageSource;

/// Replays saved result pages in order; useful offline and in tests.
///
/// Every search restarts from the first page.
#[derive(Debug, Clone, Default)]
pub struct FixturePageSource {
    pages: Vec<String>,
    current: Option<usize>,
}

impl FixturePageSource {
    pub fn new(pages: Vec<String>) -> Self {
        Self {
            pages,
            current: None,
        }
    }

    /// Load every `*.html` file in `dir`, ordered by file name
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut paths = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().map(|ext| ext == "html").unwrap_or(false))
            .collect::<Vec<_>>();
        paths.sort();

        let pages = paths
            .iter()
            .map(fs::read_to_string)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        info!("Loaded {} fixture pages from {}", pages.len(), dir.display());
        Ok(Self::new(pages))
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

impl PageSource for FixturePageSource {
    fn navigate(&mut self, url: &str) -> Result<()> {
        debug!("Fixture source ignoring navigation to {}", url);
        self.current = None;
        Ok(())
    }

    fn submit_search(&mut self, phrase: &str) -> Result<()> {
        if self.pages.is_empty() {
            return Err(ScoutError::PageSource(format!(
                "no fixture pages to answer search '{}'",
                phrase
            )));
        }
        self.current = Some(0);
        Ok(())
    }

    fn current_page_html(&mut self) -> Result<String> {
        self.current
            .and_then(|idx| self.pages.get(idx))
            .cloned()
            .ok_or_else(|| ScoutError::PageSource("no fixture page loaded".to_string()))
    }

    fn has_next_page(&mut self) -> bool {
        matches!(self.current, Some(idx) if idx + 1 < self.pages.len())
    }

    fn go_to_next_page(&mut self) -> Result<()> {
        match self.current {
            Some(idx) if idx + 1 < self.pages.len() => {
                self.current = Some(idx + 1);
                Ok(())
            }
            _ => Err(ScoutError::PageSource("no further fixture page".to_string())),
        }
    }
}
