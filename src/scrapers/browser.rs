use headless_chrome::{Browser, LaunchOptions, Tab};
use rand::seq::SliceRandom;
use rand::Rng;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Result, ScoutError};
use crate::models::Site;
use crate::scrapers::traits::PageSource;
use crate::scrapers::types::SiteNavigation;

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// Launch settings for the headless browser
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    /// Randomized pauses between actions
    pub pacing: bool,
    /// Save every captured page under this directory
    pub debug_dir: Option<PathBuf>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            pacing: true,
            debug_dir: None,
        }
    }
}

/// Page source driving a headless Chrome tab
pub struct BrowserPageSource {
    // Keeps the Chrome process alive for as long as the tab is used
    _browser: Browser,
    tab: Arc<Tab>,
    site: Site,
    navigation: SiteNavigation,
    options: BrowserOptions,
    pages_captured: usize,
}

impl BrowserPageSource {
    /// Launch Chrome with a random user agent. Failure here is fatal for the run.
    pub fn launch(site: Site, navigation: SiteNavigation, options: BrowserOptions) -> Result<Self> {
        info!("Launching headless Chrome...");

        let user_agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);

        let launch_options = LaunchOptions::default_builder()
            .headless(options.headless)
            .window_size(Some((1920, 1080)))
            .args(vec![
                OsStr::new("--disable-notifications"),
                OsStr::new("--disable-blink-features=AutomationControlled"),
            ])
            .build()
            .map_err(|e| ScoutError::Browser(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options).map_err(ScoutError::browser)?;
        let tab = browser.new_tab().map_err(ScoutError::browser)?;
        tab.set_user_agent(user_agent, None, None)
            .map_err(ScoutError::browser)?;

        info!("Browser ready with user agent: {}", user_agent);

        Ok(Self {
            _browser: browser,
            tab,
            site,
            navigation,
            options,
            pages_captured: 0,
        })
    }

    fn pause(&self, min_secs: f64, max_secs: f64) {
        if !self.options.pacing {
            return;
        }
        let secs = rand::thread_rng().gen_range(min_secs..max_secs);
        debug!("Waiting {:.2} seconds", secs);
        thread::sleep(Duration::from_secs_f64(secs));
    }

    fn hide_automation(&self) {
        let _ = self.tab.evaluate(
            "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})",
            false,
        );
    }

    fn accept_cookies(&self) {
        match self
            .tab
            .wait_for_element_with_custom_timeout(&self.navigation.cookie_consent, Duration::from_secs(8))
        {
            Ok(button) => {
                if button.click().is_ok() {
                    info!("Accepted cookies");
                    self.pause(1.0, 2.0);
                }
            }
            Err(_) => debug!("No cookie popup found"),
        }
    }

    fn dump_page(&self, html: &str) {
        let Some(dir) = &self.options.debug_dir else {
            return;
        };
        match save_debug_page(dir, self.site, self.pages_captured, html) {
            Ok(path) => info!("Saved page HTML to {} ({} bytes)", path.display(), html.len()),
            Err(e) => warn!("Could not save page HTML under {}: {}", dir.display(), e),
        }
    }
}

/// Write `{site}_page_{index}.html` under `dir`
fn save_debug_page(dir: &Path, site: Site, index: usize, html: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}_page_{:02}.html", site, index));
    std::fs::write(&path, html)?;
    Ok(path)
}

impl PageSource for BrowserPageSource {
    fn navigate(&mut self, url: &str) -> Result<()> {
        info!("Opening {}...", url);
        self.tab.navigate_to(url).map_err(ScoutError::browser)?;
        self.tab.wait_until_navigated().map_err(ScoutError::browser)?;
        self.hide_automation();
        self.pause(3.0, 6.0);
        self.accept_cookies();
        Ok(())
    }

    fn submit_search(&mut self, phrase: &str) -> Result<()> {
        let input = self
            .tab
            .wait_for_element_with_custom_timeout(&self.navigation.search_input, Duration::from_secs(10))
            .map_err(ScoutError::browser)?;
        input.click().map_err(ScoutError::browser)?;

        // Clear whatever the previous search left behind
        let _ = self.tab.evaluate(
            &format!(
                "document.querySelector('{}').value = ''",
                self.navigation.search_input.replace('\'', "\\'")
            ),
            false,
        );

        for c in phrase.chars() {
            input.type_into(&c.to_string()).map_err(ScoutError::browser)?;
            if self.options.pacing {
                let millis = rand::thread_rng().gen_range(50..200);
                thread::sleep(Duration::from_millis(millis));
            }
        }
        self.pause(0.5, 1.5);

        self.tab
            .find_element(&self.navigation.search_submit)
            .map_err(ScoutError::browser)?
            .click()
            .map_err(ScoutError::browser)?;
        info!("Searched for: {}", phrase);

        self.pause(4.0, 7.0);
        if self
            .tab
            .wait_for_element_with_custom_timeout(&self.navigation.results_ready, Duration::from_secs(10))
            .is_err()
        {
            warn!("Could not confirm search results loaded. Continuing anyway...");
        }
        Ok(())
    }

    fn current_page_html(&mut self) -> Result<String> {
        let html = self.tab.get_content().map_err(ScoutError::browser)?;
        self.pages_captured += 1;
        self.dump_page(&html);
        Ok(html)
    }

    fn has_next_page(&mut self) -> bool {
        self.tab.find_element(&self.navigation.next_page).is_ok()
    }

    fn go_to_next_page(&mut self) -> Result<()> {
        self.pause(1.0, 3.0);
        self.tab
            .find_element(&self.navigation.next_page)
            .map_err(ScoutError::browser)?
            .click()
            .map_err(ScoutError::browser)?;
        info!("Navigating to next page");
        self.pause(4.0, 7.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_page_named_by_site_and_index() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("debug");

        let path = save_debug_page(&target, Site::Olx, 3, "<html></html>").unwrap();
        assert_eq!(path, target.join("olx_page_03.html"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<html></html>");
    }

    #[test]
    fn test_debug_page_into_unwritable_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("debug");
        std::fs::write(&blocker, "not a directory").unwrap();

        assert!(save_debug_page(&blocker, Site::Allegro, 1, "<html></html>").is_err());
    }
}
