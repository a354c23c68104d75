pub mod allegro;
pub mod browser;
pub mod fixture;
pub mod http;
pub mod olx;
pub mod retry;
pub mod traits;
pub mod types;

pub use allegro::AllegroAdapter;
pub use browser::{BrowserOptions, BrowserPageSource};
pub use fixture::FixturePageSource;
pub use http::HttpPageSource;
pub use olx::OlxAdapter;
pub use retry::{RetryPolicy, RetryingPageSource};
pub use traits::{PageSource, SiteAdapter};
pub use types::SiteNavigation;

use crate::error::Result;
use crate::models::Site;

/// Pick the adapter for a marketplace once, at session construction
pub fn adapter_for(site: Site) -> Result<Box<dyn SiteAdapter>> {
    Ok(match site {
        Site::Olx => Box::new(OlxAdapter::new()?),
        Site::Allegro => Box::new(AllegroAdapter::new()?),
    })
}
