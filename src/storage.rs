use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Result;
use crate::models::Entry;

/// Default data file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "household_data.csv";

/// Fixed CSV header row: category, amount, date.
pub const CSV_HEADER: [&str; 3] = ["項目", "金額", "日付"];

/// Raw CSV row, decoded positionally so the header content itself is
/// skipped rather than matched by name.
#[derive(Debug, Deserialize)]
struct RawRow(String, String, String);

/// CSV-backed persistence for the entry table. The path is explicit
/// configuration; the whole file is rewritten on every save.
#[derive(Debug)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads all entries from the data file. A missing file is not an
    /// error; the table simply starts empty. Anything else propagates.
    pub fn load(&self) -> Result<Vec<Entry>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        read_entries(file)
    }

    /// Overwrites the data file with the header row followed by every
    /// entry in table order.
    pub fn save(&self, entries: &[Entry]) -> Result<()> {
        let file = File::create(&self.path)?;
        write_entries(file, entries)
    }
}

/// Reads entries from CSV, skipping the header row. Rows must have
/// exactly 3 fields; malformed rows fail the whole read.
pub fn read_entries(reader: impl Read) -> Result<Vec<Entry>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let mut entries = Vec::new();
    for row in csv_reader.deserialize() {
        let RawRow(category, amount, date) = row?;
        entries.push(Entry {
            category,
            amount,
            date,
        });
    }
    Ok(entries)
}

/// Writes the fixed header followed by one record per entry. The header
/// is emitted even when there are no entries.
pub fn write_entries(writer: impl Write, entries: &[Entry]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for entry in entries {
        csv_writer.write_record([
            entry.category.as_str(),
            entry.amount.as_str(),
            entry.date.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(category: &str, amount: &str, date: &str) -> Entry {
        Entry {
            category: category.to_string(),
            amount: amount.to_string(),
            date: date.to_string(),
        }
    }

    #[test]
    fn write_then_read_round_trips_in_order() {
        let entries = vec![
            entry("食費", "5000", "2024-06-01"),
            entry("娯楽", "1200", "2024-06-03"),
            entry("食費", "800", "2024-07-10"),
        ];

        let mut buffer = Vec::new();
        write_entries(&mut buffer, &entries).unwrap();
        let loaded = read_entries(buffer.as_slice()).unwrap();

        assert_eq!(loaded, entries);
    }

    #[test]
    fn write_emits_header_even_for_empty_table() {
        let mut buffer = Vec::new();
        write_entries(&mut buffer, &[]).unwrap();

        assert_eq!(String::from_utf8(buffer).unwrap(), "項目,金額,日付\n");
    }

    #[test]
    fn read_skips_header_row_by_position() {
        let data = "category,amount,date\n食費,5000,2024-06-01\n";
        let loaded = read_entries(data.as_bytes()).unwrap();

        assert_eq!(loaded, vec![entry("食費", "5000", "2024-06-01")]);
    }

    #[test]
    fn read_keeps_unparseable_field_values() {
        let data = "項目,金額,日付\n雑費,abc,not-a-date\n";
        let loaded = read_entries(data.as_bytes()).unwrap();

        assert_eq!(loaded, vec![entry("雑費", "abc", "not-a-date")]);
    }

    #[test]
    fn read_fails_on_wrong_field_count() {
        let data = "項目,金額,日付\n食費,5000\n";
        assert!(read_entries(data.as_bytes()).is_err());
    }

    #[test]
    fn load_returns_empty_when_file_is_absent() {
        let store = CsvStore::new("definitely-missing-kakeibo-data.csv");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_through_a_real_file() {
        let path = std::env::temp_dir().join(format!(
            "kakeibo-store-test-{}.csv",
            std::process::id()
        ));
        let store = CsvStore::new(&path);

        let entries = vec![
            entry("食費", "5000", "2024-06-01"),
            entry("交通費", "300", "2024-06-02"),
        ];
        store.save(&entries).unwrap();
        let loaded = store.load().unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, entries);
    }
}
