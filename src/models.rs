use std::fmt;

use chrono::{Datelike, NaiveDate};

/// Date format used in the table and the CSV file.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One household transaction record, in the raw shape it has as a table
/// row / CSV record. Amount and date stay strings so that rows loaded
/// from a hand-edited file may carry values that do not parse; such rows
/// are displayed as-is and skipped by the month-total scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub category: String,
    pub amount: String,
    pub date: String,
}

impl Entry {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }

    pub fn parsed_amount(&self) -> Option<u64> {
        self.amount.parse().ok()
    }
}

/// A year-month selection for the monthly total, displayed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl YearMonth {
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}
