use std::path::Path;

use rusqlite::{params, Connection};
use tracing::info;

use crate::error::Result;
use crate::export::ListingSink;
use crate::session::SearchSession;

/// Listings table in a local SQLite database; rows accumulate across runs
pub struct SqliteStore {
    db: Connection,
}

impl SqliteStore {
    /// Open or create the database and its `listings` table
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(db: Connection) -> Result<Self> {
        db.execute_batch(
            "CREATE TABLE IF NOT EXISTS listings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT,
                location TEXT,
                price TEXT,
                price_value REAL,
                url TEXT,
                date_posted TEXT,
                category TEXT,
                square_meters REAL,
                price_per_sqm REAL,
                search_phrase TEXT,
                scraped_date TEXT
            );",
        )?;
        Ok(Self { db })
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .db
            .query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Listing count per search phrase
    pub fn count_for_phrase(&self, phrase: &str) -> Result<usize> {
        let count: i64 = self.db.query_row(
            "SELECT COUNT(*) FROM listings WHERE search_phrase = ?1",
            params![phrase],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl ListingSink for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn store(&mut self, session: &SearchSession) -> Result<usize> {
        let tx = self.db.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO listings (title, location, price, price_value, url, date_posted,
                    category, square_meters, price_per_sqm, search_phrase, scraped_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for listing in session.listings() {
                stmt.execute(params![
                    listing.title(),
                    listing.location(),
                    listing.raw_price(),
                    listing.numeric_price(),
                    listing.url(),
                    listing.date_posted_raw(),
                    listing.category().as_str(),
                    listing.square_meters(),
                    listing.price_per_sqm(),
                    listing.search_phrase(),
                    listing.scraped_at().format("%Y-%m-%d %H:%M:%S").to_string(),
                ])?;
            }
        }
        tx.commit()?;

        let stored = session.listings().len();
        info!("💾 Stored {} listings in SQLite", stored);
        Ok(stored)
    }
}
