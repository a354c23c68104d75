//! Page-by-page crawl of one search session.
//!
//! ```text
//! SearchSubmitted -> PageLoaded -> HasNextPage -> PageLoaded -> ... -> Exhausted
//!                              \-> Exhausted
//! ```
//!
//! Pages are fetched strictly one at a time. Failures end the crawl for the
//! session but keep what was already collected; nothing is retried here.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::scrapers::{PageSource, SiteAdapter};
use crate::session::SearchSession;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum ExhaustedReason {
    PageLimit,
    NoNextPage,
    /// Search, page read, extraction or navigation failed
    PageError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    SearchSubmitted,
    PageLoaded { page: usize },
    HasNextPage { page: usize },
    Exhausted(ExhaustedReason),
}

/// Session after the crawl, with how and where it stopped
#[derive(Debug, Clone)]
pub struct PaginationOutcome {
    pub session: SearchSession,
    pub pages_visited: usize,
    pub reason: ExhaustedReason,
}

pub struct PaginationController<'a> {
    adapter: &'a dyn SiteAdapter,
}

impl<'a> PaginationController<'a> {
    pub fn new(adapter: &'a dyn SiteAdapter) -> Self {
        Self { adapter }
    }

    /// Submit the session's search and extract pages until the page limit,
    /// the last page, or the first page-level failure.
    pub fn run<S>(&self, mut session: SearchSession, source: &mut S) -> PaginationOutcome
    where
        S: PageSource + ?Sized,
    {
        let phrase = session.search_phrase().to_string();
        let max_pages = session.max_pages();
        let mut pages_visited = 0;

        let mut state = match source.submit_search(&phrase) {
            Ok(()) => PageState::SearchSubmitted,
            Err(e) => PageState::Exhausted(ExhaustedReason::PageError(format!("search failed: {}", e))),
        };

        let reason = loop {
            debug!("Pagination state: {:?}", state);
            state = match state {
                PageState::SearchSubmitted => PageState::PageLoaded { page: 1 },

                PageState::PageLoaded { page } => {
                    pages_visited = page;
                    let extracted = source
                        .current_page_html()
                        .and_then(|html| self.adapter.extract_page(&html, &phrase));

                    match extracted {
                        Err(e) => PageState::Exhausted(ExhaustedReason::PageError(format!(
                            "page {}: {}",
                            page, e
                        ))),
                        Ok(listings) => {
                            info!("Page {}: extracted {} listings", page, listings.len());
                            session.record_page(listings);
                            info!("Scraped {} listings so far", session.listings().len());

                            if page >= max_pages {
                                PageState::Exhausted(ExhaustedReason::PageLimit)
                            } else if source.has_next_page() {
                                PageState::HasNextPage { page }
                            } else {
                                PageState::Exhausted(ExhaustedReason::NoNextPage)
                            }
                        }
                    }
                }

                PageState::HasNextPage { page } => match source.go_to_next_page() {
                    Ok(()) => PageState::PageLoaded { page: page + 1 },
                    Err(e) => PageState::Exhausted(ExhaustedReason::PageError(format!(
                        "navigation after page {}: {}",
                        page, e
                    ))),
                },

                PageState::Exhausted(reason) => break reason,
            };
        };

        match &reason {
            ExhaustedReason::PageError(detail) => warn!(
                "Stopping '{}' early, keeping {} listings: {}",
                phrase,
                session.listings().len(),
                detail
            ),
            ExhaustedReason::NoNextPage => info!("No more pages"),
            ExhaustedReason::PageLimit => info!("Reached page limit of {}", max_pages),
        }

        PaginationOutcome {
            session,
            pages_visited,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, ScoutError};
    use crate::models::Site;
    use crate::scrapers::OlxAdapter;

    fn card(title: &str, price: u32) -> String {
        format!(
            r#"<div data-cy="l-card"><a href="/d/oferta/{title}"><h6>{title}</h6></a>
               <p data-testid="ad-price">{price} zł</p>
               <p data-testid="location-date">Warszawa - Dzisiaj</p></div>"#
        )
    }

    fn page(cards: &[(&str, u32)]) -> String {
        let body: String = cards.iter().map(|(t, p)| card(t, *p)).collect();
        format!("<html><body>{}</body></html>", body)
    }

    /// Scripted source that records how it was driven
    #[derive(Default)]
    struct Scripted {
        pages: Vec<Result<String>>,
        next_available: Vec<bool>,
        fail_search: bool,
        fail_navigation: bool,
        current: usize,
        page_reads: usize,
    }

    impl PageSource for Scripted {
        fn navigate(&mut self, _url: &str) -> Result<()> {
            Ok(())
        }

        fn submit_search(&mut self, _phrase: &str) -> Result<()> {
            if self.fail_search {
                return Err(ScoutError::PageSource("search box missing".to_string()));
            }
            self.current = 0;
            Ok(())
        }

        fn current_page_html(&mut self) -> Result<String> {
            self.page_reads += 1;
            match self.pages.get(self.current) {
                Some(Ok(html)) => Ok(html.clone()),
                Some(Err(e)) => Err(ScoutError::PageSource(e.to_string())),
                None => Err(ScoutError::PageSource("past last page".to_string())),
            }
        }

        fn has_next_page(&mut self) -> bool {
            self.next_available.get(self.current).copied().unwrap_or(false)
        }

        fn go_to_next_page(&mut self) -> Result<()> {
            if self.fail_navigation {
                return Err(ScoutError::PageSource("click intercepted".to_string()));
            }
            self.current += 1;
            Ok(())
        }
    }

    fn session(max_pages: usize) -> SearchSession {
        SearchSession::new(Site::Olx, "laptop", max_pages).unwrap()
    }

    #[test]
    fn test_stops_at_page_limit() {
        let adapter = OlxAdapter::new().unwrap();
        let mut source = Scripted {
            pages: (0..5).map(|i| Ok(page(&[("laptop", 100 * (i + 1))]))).collect(),
            next_available: vec![true; 5],
            ..Default::default()
        };

        let outcome = PaginationController::new(&adapter).run(session(3), &mut source);
        assert_eq!(outcome.reason, ExhaustedReason::PageLimit);
        assert_eq!(outcome.pages_visited, 3);
        assert_eq!(source.page_reads, 3);
        assert_eq!(outcome.session.listings().len(), 3);
    }

    #[test]
    fn test_single_page_without_next_control() {
        let adapter = OlxAdapter::new().unwrap();
        let mut source = Scripted {
            pages: vec![Ok(page(&[("a", 1), ("b", 2)]))],
            next_available: vec![false],
            ..Default::default()
        };

        let outcome = PaginationController::new(&adapter).run(session(5), &mut source);
        assert_eq!(outcome.reason, ExhaustedReason::NoNextPage);
        assert_eq!(outcome.pages_visited, 1);
        assert_eq!(outcome.session.listings().len(), 2);
    }

    #[test]
    fn test_page_error_keeps_partial_results() {
        let adapter = OlxAdapter::new().unwrap();
        let mut source = Scripted {
            pages: vec![
                Ok(page(&[("a", 1), ("b", 2)])),
                Err(ScoutError::PageSource("timeout".to_string())),
                Ok(page(&[("c", 3)])),
            ],
            next_available: vec![true, true, false],
            ..Default::default()
        };

        let outcome = PaginationController::new(&adapter).run(session(3), &mut source);
        assert!(matches!(outcome.reason, ExhaustedReason::PageError(_)));
        assert_eq!(outcome.pages_visited, 2);
        assert_eq!(outcome.session.listings().len(), 2);
    }

    #[test]
    fn test_navigation_error_keeps_partial_results() {
        let adapter = OlxAdapter::new().unwrap();
        let mut source = Scripted {
            pages: vec![Ok(page(&[("a", 1)])), Ok(page(&[("b", 2)]))],
            next_available: vec![true, false],
            fail_navigation: true,
            ..Default::default()
        };

        let outcome = PaginationController::new(&adapter).run(session(3), &mut source);
        assert!(matches!(outcome.reason, ExhaustedReason::PageError(_)));
        assert_eq!(outcome.pages_visited, 1);
        assert_eq!(outcome.session.listings().len(), 1);
    }

    #[test]
    fn test_failed_search_yields_empty_session() {
        let adapter = OlxAdapter::new().unwrap();
        let mut source = Scripted {
            fail_search: true,
            ..Default::default()
        };

        let outcome = PaginationController::new(&adapter).run(session(3), &mut source);
        assert!(matches!(outcome.reason, ExhaustedReason::PageError(_)));
        assert_eq!(outcome.pages_visited, 0);
        assert_eq!(source.page_reads, 0);
        assert!(outcome.session.listings().is_empty());
    }

    #[test]
    fn test_never_exceeds_max_pages_for_any_limit() {
        let adapter = OlxAdapter::new().unwrap();
        for max_pages in 1..=6 {
            for available in 0..=6usize {
                let mut source = Scripted {
                    pages: (0..available).map(|_| Ok(page(&[("x", 1)]))).collect(),
                    next_available: (0..available).map(|i| i + 1 < available).collect(),
                    ..Default::default()
                };
                let outcome = PaginationController::new(&adapter).run(session(max_pages), &mut source);
                assert!(source.page_reads <= max_pages);
                assert!(outcome.pages_visited <= max_pages);
            }
        }
    }
}
