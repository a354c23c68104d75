use crate::models::Listing;

/// Append-only, arrival-ordered listings of one search session.
///
/// No deduplication: the same ad scraped twice is stored twice.
#[derive(Debug, Clone, Default)]
pub struct ListingRepository {
    listings: Vec<Listing>,
}

impl ListingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_all(&mut self, listings: impl IntoIterator<Item = Listing>) {
        self.listings.extend(listings);
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Listing> {
        self.listings.iter()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn into_inner(self) -> Vec<Listing> {
        self.listings
    }
}

impl<'a> IntoIterator for &'a ListingRepository {
    type Item = &'a Listing;
    type IntoIter = std::slice::Iter<'a, Listing>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawListing;

    fn listing(title: &str) -> Listing {
        Listing::from_raw(
            RawListing {
                title: title.to_string(),
                location: "Łódź".to_string(),
                date_posted: "Dzisiaj".to_string(),
                price: "100 zł".to_string(),
                url: "https://www.olx.pl/d/oferta/1".to_string(),
            },
            "test",
        )
    }

    #[test]
    fn test_insert_all_preserves_arrival_order() {
        let mut repo = ListingRepository::new();
        repo.insert_all(vec![listing("a"), listing("b")]);
        repo.insert_all(vec![listing("c")]);

        let titles: Vec<_> = repo.iter().map(|l| l.title()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut repo = ListingRepository::new();
        repo.insert_all(vec![listing("same")]);
        repo.insert_all(vec![listing("same")]);
        assert_eq!(repo.len(), 2);
    }
}
