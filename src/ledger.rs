use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::{DATE_FORMAT, Entry, YearMonth};

/// In-memory table of entries plus the session's category history.
/// Insertion order is the only ordering; entries are never edited or
/// deleted in place.
#[derive(Debug, Default)]
pub struct Ledger {
    entries: Vec<Entry>,
    categories: Vec<String>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the table contents, e.g. after loading the data file.
    /// The category history is left untouched; it only grows through
    /// successful adds within the session.
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            categories: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Distinct categories seen this session, in first-use order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Validates and appends a new entry. Category must be non-empty and
    /// the amount must be a non-empty ASCII decimal digit string.
    pub fn add(&mut self, category: &str, amount: &str, date: NaiveDate) -> Result<()> {
        if category.is_empty() {
            return Err(AppError::Validation("category must not be empty".into()));
        }
        if amount.is_empty() || !amount.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::Validation(
                "amount must be a decimal digit string".into(),
            ));
        }

        self.entries.push(Entry {
            category: category.to_string(),
            amount: amount.to_string(),
            date: date.format(DATE_FORMAT).to_string(),
        });

        if !self.categories.iter().any(|c| c == category) {
            self.categories.push(category.to_string());
        }

        Ok(())
    }

    /// Sums the amounts of all entries falling in the given year-month.
    /// Rows whose date or amount fails to parse are skipped.
    pub fn month_total(&self, month: YearMonth) -> u64 {
        self.entries
            .iter()
            .filter(|e| e.parsed_date().map(YearMonth::from) == Some(month))
            .filter_map(Entry::parsed_amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(category: &str, amount: &str, date: &str) -> Entry {
        Entry {
            category: category.to_string(),
            amount: amount.to_string(),
            date: date.to_string(),
        }
    }

    #[test]
    fn add_appends_one_row_with_given_values() {
        let mut ledger = Ledger::new();
        ledger.add("食費", "5000", date(2024, 6, 1)).unwrap();

        assert_eq!(
            ledger.entries(),
            &[entry("食費", "5000", "2024-06-01")]
        );
    }

    #[test]
    fn add_rejects_invalid_input_and_leaves_table_unchanged() {
        let mut ledger = Ledger::new();

        assert!(ledger.add("食費", "abc", date(2024, 6, 1)).is_err());
        assert!(ledger.add("食費", "", date(2024, 6, 1)).is_err());
        assert!(ledger.add("食費", "50.5", date(2024, 6, 1)).is_err());
        assert!(ledger.add("食費", "-100", date(2024, 6, 1)).is_err());
        assert!(ledger.add("", "5000", date(2024, 6, 1)).is_err());

        assert!(ledger.entries().is_empty());
        assert!(ledger.categories().is_empty());
    }

    #[test]
    fn entries_keep_insertion_order() {
        let mut ledger = Ledger::new();
        ledger.add("食費", "1000", date(2024, 6, 1)).unwrap();
        ledger.add("娯楽", "500", date(2024, 5, 20)).unwrap();
        ledger.add("食費", "2000", date(2024, 6, 15)).unwrap();

        let categories: Vec<&str> =
            ledger.entries().iter().map(|e| e.category.as_str()).collect();
        assert_eq!(categories, ["食費", "娯楽", "食費"]);
    }

    #[test]
    fn category_history_does_not_duplicate() {
        let mut ledger = Ledger::new();
        ledger.add("食費", "1000", date(2024, 6, 1)).unwrap();
        ledger.add("娯楽", "500", date(2024, 6, 2)).unwrap();
        ledger.add("食費", "2000", date(2024, 6, 3)).unwrap();

        assert_eq!(ledger.categories(), ["食費", "娯楽"]);
    }

    #[test]
    fn month_total_sums_matching_rows_only() {
        let ledger = Ledger::from_entries(vec![
            entry("食費", "1000", "2024-06-01"),
            entry("食費", "2000", "2024-06-15"),
            entry("娯楽", "500", "2024-07-01"),
        ]);

        assert_eq!(
            ledger.month_total(YearMonth {
                year: 2024,
                month: 6
            }),
            3000
        );
        assert_eq!(
            ledger.month_total(YearMonth {
                year: 2024,
                month: 7
            }),
            500
        );
        assert_eq!(
            ledger.month_total(YearMonth {
                year: 2024,
                month: 8
            }),
            0
        );
    }

    #[test]
    fn month_total_skips_unparseable_rows() {
        let ledger = Ledger::from_entries(vec![
            entry("食費", "1000", "2024-06-01"),
            entry("雑費", "300", "not-a-date"),
            entry("雑費", "abc", "2024-06-10"),
        ]);

        assert_eq!(
            ledger.month_total(YearMonth {
                year: 2024,
                month: 6
            }),
            1000
        );
    }

    #[test]
    fn loading_does_not_seed_category_history() {
        let ledger = Ledger::from_entries(vec![entry("食費", "1000", "2024-06-01")]);
        assert!(ledger.categories().is_empty());
    }
}
