//! Text-to-value parsers for listing fields.
//!
//! Every parser here is total: unrecognized input maps to a zero value or
//! [`Category::Other`], never to an error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Category;

/// Bumped whenever [`CATEGORY_KEYWORDS`] changes, since order and content
/// both affect classification results.
pub const CATEGORY_KEYWORDS_VERSION: u32 = 1;

/// Ordered keyword table; the first category with a substring hit wins.
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Electronics,
        &["laptop", "komputer", "telefon", "smartfon", "tablet", "tv", "telewizor", "elektronika"],
    ),
    (
        Category::Vehicles,
        &["samochód", "auto", "samochod", "pojazd", "motocykl", "skuter", "rower"],
    ),
    (
        Category::RealEstate,
        &["mieszkanie", "dom", "działka", "dzialka", "nieruchomość", "nieruchomosc"],
    ),
    (
        Category::Jobs,
        &["praca", "etat", "zatrudnienie", "zatrudnię", "zatrudnie", "job"],
    ),
    (
        Category::Services,
        &["usługa", "usluga", "usługi", "uslugi", "serwis"],
    ),
    (
        Category::Fashion,
        &["ubranie", "odzież", "odziez", "buty", "kurtka", "spodnie", "sukienka"],
    ),
    (
        Category::Furniture,
        &["meble", "stół", "stol", "krzesło", "krzeslo", "szafa", "łóżko", "lozko", "sofa"],
    ),
];

// Tried in order, first match wins
static AREA_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)([0-9]+[.,]?[0-9]*)\s*m2",
        r"(?i)([0-9]+[.,]?[0-9]*)\s*mkw",
        r"(?i)([0-9]+[.,]?[0-9]*)\s*m²",
        r"(?i)([0-9]+[.,]?[0-9]*)\s*metr(?:ów|y)",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Extract a numeric price from free text such as `"1 234,50 zł"`.
///
/// Commas are read as decimal points and everything except digits and `.`
/// is dropped. Returns `0.0` when nothing numeric is left or the remainder
/// is ambiguous (e.g. `"1.234.567"`).
pub fn parse_price(text: &str) -> f64 {
    let digits: String = text
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if digits.is_empty() {
        return 0.0;
    }

    digits.parse::<f64>().unwrap_or(0.0)
}

/// Extract a floor area in square meters (`55m2`, `40 mkw`, `72,5 m²`,
/// `60 metrów`). Returns `0.0` when no unit pattern matches.
pub fn parse_square_meters(text: &str) -> f64 {
    for pattern in AREA_PATTERNS.iter() {
        let Some(number) = pattern.captures(text).and_then(|caps| caps.get(1)) else {
            continue;
        };
        if let Ok(value) = number.as_str().replace(',', ".").parse::<f64>() {
            return value;
        }
    }

    0.0
}

/// Assign a category from title keywords
pub fn classify(title: &str) -> Category {
    let title_lower = title.to_lowercase();

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| title_lower.contains(kw)))
        .map(|(category, _)| *category)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_with_thousands_and_decimal_comma() {
        assert_eq!(parse_price("1 234,50 zł"), 1234.50);
    }

    #[test]
    fn test_parse_price_empty_and_garbage() {
        assert_eq!(parse_price(""), 0.0);
        assert_eq!(parse_price("abc"), 0.0);
        assert_eq!(parse_price("Za darmo"), 0.0);
    }

    #[test]
    fn test_parse_price_non_breaking_space() {
        assert_eq!(parse_price("2\u{a0}500 zł"), 2500.0);
    }

    #[test]
    fn test_parse_price_ambiguous_dots() {
        assert_eq!(parse_price("1.234.567 zł"), 0.0);
    }

    #[test]
    fn test_parse_square_meters_m2() {
        assert_eq!(parse_square_meters("Mieszkanie 55m2 centrum"), 55.0);
    }

    #[test]
    fn test_parse_square_meters_other_units() {
        assert_eq!(parse_square_meters("Kawalerka 28 mkw"), 28.0);
        assert_eq!(parse_square_meters("Dom 120,5 m²"), 120.5);
        assert_eq!(parse_square_meters("Lokal 60 metrów"), 60.0);
        assert_eq!(parse_square_meters("Działka 900 metry"), 900.0);
        assert_eq!(parse_square_meters("POKÓJ 14 M2"), 14.0);
    }

    #[test]
    fn test_parse_square_meters_first_pattern_wins() {
        assert_eq!(parse_square_meters("40 mkw, po remoncie 42 m2"), 42.0);
    }

    #[test]
    fn test_parse_square_meters_ascii_digits_only() {
        assert_eq!(parse_square_meters("٥٥m2 lub 40 mkw"), 40.0);
        assert_eq!(parse_square_meters("５０ m²"), 0.0);
    }

    #[test]
    fn test_parse_square_meters_missing() {
        assert_eq!(parse_square_meters("brak metrażu"), 0.0);
        assert_eq!(parse_square_meters(""), 0.0);
    }

    #[test]
    fn test_classify_electronics() {
        assert_eq!(classify("Sprzedam laptop Dell"), Category::Electronics);
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(classify("zzz nic"), Category::Other);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("MIESZKANIE 3 pokoje"), Category::RealEstate);
        assert_eq!(classify("Rower górski"), Category::Vehicles);
        assert_eq!(classify("Szafa przesuwna"), Category::Furniture);
    }

    #[test]
    fn test_classify_order_decides_ties() {
        // Matches both electronics ("telewizor") and furniture ("stolik" via "stol")
        assert_eq!(classify("Stolik pod telewizor"), Category::Electronics);
    }

    #[test]
    fn test_keyword_table_has_no_other_entry() {
        assert!(CATEGORY_KEYWORDS.iter().all(|(c, _)| *c != Category::Other));
    }
}
