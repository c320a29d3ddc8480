use chrono::NaiveDate;

use crate::models::YearMonth;

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Insert,
}

/// Form field that currently has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveField {
    #[default]
    Category,
    Amount,
    Date,
    Month,
}

impl ActiveField {
    pub fn next(&self) -> Self {
        match self {
            Self::Category => Self::Amount,
            Self::Amount => Self::Date,
            Self::Date => Self::Month,
            Self::Month => Self::Category,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Self::Category => Self::Month,
            Self::Amount => Self::Category,
            Self::Date => Self::Amount,
            Self::Month => Self::Date,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Category => "項目",
            Self::Amount => "金額",
            Self::Date => "日付",
            Self::Month => "月",
        }
    }
}

/// Shared application state
#[derive(Debug, Default)]
pub struct State {
    /// Current input mode
    pub input_mode: InputMode,
    /// Which form field has focus
    pub active_field: ActiveField,
    /// Input buffer for the category field
    pub category_input: String,
    /// Input buffer for the amount field
    pub amount_input: String,
    /// Date for the next entry
    pub date: NaiveDate,
    /// Selected year-month for the total
    pub month: YearMonth,
    /// Last computed month total, in yen
    pub month_total: u64,
    /// Cursor into the category suggestion history
    pub suggestion: Option<usize>,
    /// Status message to display
    pub status_message: Option<String>,
    /// Whether to show help overlay
    pub show_help: bool,
}

impl State {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: today,
            month: YearMonth::from(today),
            ..Default::default()
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_cycle_visits_every_field_once() {
        let mut field = ActiveField::Category;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(field);
            field = field.next();
        }
        assert_eq!(field, ActiveField::Category);
        assert_eq!(
            seen,
            [
                ActiveField::Category,
                ActiveField::Amount,
                ActiveField::Date,
                ActiveField::Month,
            ]
        );
    }

    #[test]
    fn prev_inverts_next() {
        for field in [
            ActiveField::Category,
            ActiveField::Amount,
            ActiveField::Date,
            ActiveField::Month,
        ] {
            assert_eq!(field.next().prev(), field);
        }
    }

    #[test]
    fn new_state_selects_the_current_month() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let state = State::new(today);
        assert_eq!(state.date, today);
        assert_eq!(state.month.to_string(), "2024-06");
        assert_eq!(state.month_total, 0);
    }
}
