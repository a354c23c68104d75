//! Classified-ad marketplace scraper: crawls OLX and Allegro result pages,
//! normalizes listings, and summarizes them into reports and chart specs.

pub mod analytics;
pub mod config;
pub mod error;
pub mod export;
pub mod fields;
pub mod models;
pub mod pagination;
pub mod pipeline;
pub mod repository;
pub mod scrapers;
pub mod session;

pub use error::{Result, ScoutError};
pub use models::{Category, Listing, Site};
pub use pipeline::{Pipeline, SessionResult};
pub use session::SearchSession;
