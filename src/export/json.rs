use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::export::ListingSink;
use crate::session::SearchSession;

/// Writes one pretty-printed JSON array per session, named after the
/// search phrase and the session start time.
pub struct JsonExporter {
    dir: PathBuf,
}

impl JsonExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<phrase_with_underscores>_<YYYYmmdd_HHMMSS>.json`
    pub fn path_for(&self, session: &SearchSession) -> PathBuf {
        let phrase = session
            .search_phrase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
        let stamp = session.started_at().format("%Y%m%d_%H%M%S");
        self.dir.join(format!("{}_{}.json", phrase, stamp))
    }

    pub fn write(&self, session: &SearchSession) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(session);
        let json = serde_json::to_string_pretty(session.listings())?;
        fs::write(&path, json)?;
        Ok(path)
    }
}

impl ListingSink for JsonExporter {
    fn name(&self) -> &str {
        "json"
    }

    fn store(&mut self, session: &SearchSession) -> Result<usize> {
        let path = self.write(session)?;
        info!("💾 Saved {} listings to {}", session.listings().len(), path.display());
        Ok(session.listings().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Listing, RawListing, Site};

    fn session() -> SearchSession {
        let mut session = SearchSession::new(Site::Olx, "rower  miejski", 1).unwrap();
        session.record_page(vec![Listing::from_raw(
            RawListing {
                title: "Rower miejski damski".to_string(),
                location: "Łódź".to_string(),
                date_posted: "Dzisiaj".to_string(),
                price: "450 zł".to_string(),
                url: "https://www.olx.pl/d/oferta/rower".to_string(),
            },
            "rower  miejski",
        )]);
        session
    }

    #[test]
    fn test_file_name_from_phrase_and_start_time() {
        let exporter = JsonExporter::new("/tmp/out");
        let session = session();
        let name = exporter.path_for(&session);
        let name = name.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("rower_miejski_"));
        assert!(name.ends_with(".json"));
        assert_eq!(name.len(), "rower_miejski_".len() + "YYYYmmdd_HHMMSS".len() + ".json".len());
    }

    #[test]
    fn test_store_writes_listing_array() {
        let dir = tempfile::tempdir().unwrap();
        let mut exporter = JsonExporter::new(dir.path().join("nested"));
        let session = session();

        assert_eq!(exporter.store(&session).unwrap(), 1);

        let written = fs::read_to_string(exporter.path_for(&session)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "Rower miejski damski");
        assert_eq!(items[0]["numeric_price"], 450.0);
        assert_eq!(items[0]["category"], "vehicles");
    }
}
