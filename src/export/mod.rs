//! Destinations a finished session's listings are written to.

pub mod json;
pub mod sqlite;

pub use json::JsonExporter;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::session::SearchSession;

pub trait ListingSink: Send {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Persist every listing of the session, returning how many were written
    fn store(&mut self, session: &SearchSession) -> Result<usize>;
}
