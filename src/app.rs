use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::action::Action;
use crate::error::Result;
use crate::ledger::Ledger;
use crate::models::DATE_FORMAT;
use crate::state::{ActiveField, InputMode, State};
use crate::storage::{CSV_HEADER, CsvStore};
use crate::tui::{self, Tui};

/// Main application struct
pub struct App {
    store: CsvStore,
    ledger: Ledger,
    state: State,
    should_quit: bool,
}

impl App {
    pub fn new(data_file: impl Into<PathBuf>) -> Result<Self> {
        let store = CsvStore::new(data_file);
        let ledger = Ledger::from_entries(store.load()?);
        let state = State::new(Local::now().date_naive());

        Ok(Self {
            store,
            ledger,
            state,
            should_quit: false,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = tui::restore();
            original_hook(panic_info);
        }));

        let mut terminal = tui::init()?;
        let result = self.run_loop(&mut terminal);
        tui::restore()?;
        result
    }

    fn run_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        while !self.should_quit {
            self.draw(terminal)?;
            if let Some(action) = self.handle_events()? {
                self.update(action)?;
            }
        }
        Ok(())
    }

    fn draw(&mut self, terminal: &mut Tui) -> Result<()> {
        terminal.draw(|frame| {
            let area = frame.area();
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(0),
                    Constraint::Length(3),
                    Constraint::Length(3),
                ])
                .split(area);

            self.draw_input_form(frame, layout[0]);
            self.draw_table(frame, layout[1]);
            self.draw_month_total(frame, layout[2]);
            self.draw_footer(frame, layout[3]);

            if self.state.show_help {
                self.draw_help_overlay(frame, area);
            }
        })?;
        Ok(())
    }

    fn field_style(&self, field: ActiveField) -> Style {
        if self.state.active_field == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        }
    }

    fn draw_input_form(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(45),
                Constraint::Percentage(25),
                Constraint::Length(14),
            ])
            .split(area);

        let category_title = if self.ledger.categories().is_empty() {
            format!(" {} ", ActiveField::Category.title())
        } else {
            format!(
                " {} ({}件の履歴) ",
                ActiveField::Category.title(),
                self.ledger.categories().len()
            )
        };
        let category_input = Paragraph::new(self.state.category_input.as_str())
            .style(self.field_style(ActiveField::Category))
            .block(Block::default().borders(Borders::ALL).title(category_title));
        frame.render_widget(category_input, layout[0]);

        let amount_input = Paragraph::new(self.state.amount_input.as_str())
            .style(self.field_style(ActiveField::Amount))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", ActiveField::Amount.title())),
            );
        frame.render_widget(amount_input, layout[1]);

        let date_input = Paragraph::new(self.state.date.format(DATE_FORMAT).to_string())
            .style(self.field_style(ActiveField::Date))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", ActiveField::Date.title())),
            );
        frame.render_widget(date_input, layout[2]);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let entries = self.ledger.entries();

        // Keep the newest rows visible; borders plus the header row take
        // three lines of the area.
        let visible = area.height.saturating_sub(3) as usize;
        let skip = entries.len().saturating_sub(visible);

        let rows: Vec<Row> = entries
            .iter()
            .skip(skip)
            .map(|e| {
                Row::new(vec![
                    Cell::from(e.category.clone()).style(Style::default().fg(Color::Cyan)),
                    Cell::from(format!("{:>10}", e.amount)),
                    Cell::from(e.date.clone()).style(Style::default().fg(Color::DarkGray)),
                ])
            })
            .collect();

        let header = Row::new(CSV_HEADER.to_vec()).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(45),
                Constraint::Percentage(25),
                Constraint::Percentage(30),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" 家計簿 ({}件) ", entries.len())),
        );
        frame.render_widget(table, area);
    }

    fn draw_month_total(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(11), Constraint::Min(0)])
            .split(area);

        let month_input = Paragraph::new(self.state.month.to_string())
            .style(self.field_style(ActiveField::Month))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", ActiveField::Month.title())),
            );
        frame.render_widget(month_input, layout[0]);

        let total_label = Line::from(vec![
            Span::styled(
                format!("その月の合計金額: {}円", self.state.month_total),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "  (月欄で Enter: 再計算)",
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        let total = Paragraph::new(total_label).block(Block::default().borders(Borders::ALL));
        frame.render_widget(total, layout[1]);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let mode_str = match self.state.input_mode {
            InputMode::Normal => "NORMAL",
            InputMode::Insert => "INSERT",
        };

        let status = self
            .state
            .status_message
            .clone()
            .unwrap_or_else(|| "Ready".to_string());

        let footer_text = Line::from(vec![
            Span::styled(
                format!(" {} ", mode_str),
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(status, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled("? for Help", Style::default().fg(Color::DarkGray)),
        ]);

        let footer = Paragraph::new(footer_text).block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, area);
    }

    fn draw_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let help_text = vec![
            Line::from("Navigation:"),
            Line::from("  Tab/Shift+Tab  Switch form field"),
            Line::from("  Up/Down        Pick category from history,"),
            Line::from("                 adjust date or month"),
            Line::from(""),
            Line::from("Input:"),
            Line::from("  i              Enter insert mode"),
            Line::from("  Esc            Exit insert mode"),
            Line::from("  Enter          Add entry (compute total on 月)"),
            Line::from(""),
            Line::from("General:"),
            Line::from("  ?              Toggle help"),
            Line::from("  q              Quit application"),
        ];

        let help_block = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help ")
                    .style(Style::default().bg(Color::DarkGray)),
            )
            .alignment(Alignment::Left);

        let popup_area = centered_rect(50, 60, area);
        frame.render_widget(Clear, popup_area);
        frame.render_widget(help_block, popup_area);
    }

    fn handle_events(&mut self) -> Result<Option<Action>> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(None);
                }

                if key.code == KeyCode::Char('q') && self.state.input_mode == InputMode::Normal {
                    return Ok(Some(Action::Quit));
                }

                if key.code == KeyCode::Char('?') && self.state.input_mode == InputMode::Normal {
                    return Ok(Some(Action::ToggleHelp));
                }

                match self.state.input_mode {
                    InputMode::Normal => return self.handle_normal_mode(key),
                    InputMode::Insert => return self.handle_insert_mode(key),
                }
            }
        }
        Ok(None)
    }

    fn submit_action(&self) -> Action {
        if self.state.active_field == ActiveField::Month {
            Action::CalculateTotal
        } else {
            Action::SubmitEntry
        }
    }

    fn handle_normal_mode(&mut self, key: event::KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    Ok(Some(Action::PrevField))
                } else {
                    Ok(Some(Action::NextField))
                }
            }
            KeyCode::BackTab => Ok(Some(Action::PrevField)),
            KeyCode::Char('i') => Ok(Some(Action::EnterInsert)),
            KeyCode::Up | KeyCode::Char('k') => Ok(Some(Action::Up)),
            KeyCode::Down | KeyCode::Char('j') => Ok(Some(Action::Down)),
            KeyCode::Enter => Ok(Some(self.submit_action())),
            _ => Ok(None),
        }
    }

    fn handle_insert_mode(&mut self, key: event::KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Esc => Ok(Some(Action::EnterNormal)),
            KeyCode::Enter => Ok(Some(self.submit_action())),
            KeyCode::Tab => Ok(Some(Action::NextField)),
            KeyCode::BackTab => Ok(Some(Action::PrevField)),
            KeyCode::Char(c) => Ok(Some(Action::InputChar(c))),
            KeyCode::Backspace => Ok(Some(Action::InputBackspace)),
            KeyCode::Up => Ok(Some(Action::Up)),
            KeyCode::Down => Ok(Some(Action::Down)),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::ToggleHelp => {
                self.state.show_help = !self.state.show_help;
            }
            Action::EnterInsert => {
                self.state.input_mode = InputMode::Insert;
            }
            Action::EnterNormal => {
                self.state.input_mode = InputMode::Normal;
            }
            Action::NextField => {
                self.state.active_field = self.state.active_field.next();
                self.state.suggestion = None;
            }
            Action::PrevField => {
                self.state.active_field = self.state.active_field.prev();
                self.state.suggestion = None;
            }
            Action::InputChar(c) => match self.state.active_field {
                ActiveField::Category => {
                    self.state.category_input.push(c);
                    self.state.suggestion = None;
                }
                ActiveField::Amount => {
                    if c.is_ascii_digit() {
                        self.state.amount_input.push(c);
                    }
                }
                ActiveField::Date | ActiveField::Month => {}
            },
            Action::InputBackspace => match self.state.active_field {
                ActiveField::Category => {
                    self.state.category_input.pop();
                    self.state.suggestion = None;
                }
                ActiveField::Amount => {
                    self.state.amount_input.pop();
                }
                ActiveField::Date | ActiveField::Month => {}
            },
            Action::Up => match self.state.active_field {
                ActiveField::Category => self.cycle_suggestion(true),
                ActiveField::Amount => {}
                ActiveField::Date => {
                    if let Some(next) = self.state.date.succ_opt() {
                        self.state.date = next;
                    }
                }
                ActiveField::Month => {
                    self.state.month = self.state.month.next();
                }
            },
            Action::Down => match self.state.active_field {
                ActiveField::Category => self.cycle_suggestion(false),
                ActiveField::Amount => {}
                ActiveField::Date => {
                    if let Some(prev) = self.state.date.pred_opt() {
                        self.state.date = prev;
                    }
                }
                ActiveField::Month => {
                    self.state.month = self.state.month.prev();
                }
            },
            Action::SubmitEntry => {
                self.submit_entry()?;
            }
            Action::CalculateTotal => {
                self.state.month_total = self.ledger.month_total(self.state.month);
            }
        }
        Ok(())
    }

    /// Fills the category buffer from the suggestion history, cycling
    /// backwards (`Up`) or forwards (`Down`) through first-use order.
    fn cycle_suggestion(&mut self, backwards: bool) {
        let history = self.ledger.categories();
        if history.is_empty() {
            return;
        }

        let index = match (self.state.suggestion, backwards) {
            (None, true) => history.len() - 1,
            (None, false) => 0,
            (Some(i), true) => i.checked_sub(1).unwrap_or(history.len() - 1),
            (Some(i), false) => (i + 1) % history.len(),
        };

        self.state.suggestion = Some(index);
        self.state.category_input = history[index].clone();
    }

    /// Validates the form and, on success, appends the entry, registers
    /// the category, rewrites the data file and clears the amount
    /// buffer. Invalid input is ignored without any message.
    fn submit_entry(&mut self) -> Result<()> {
        let category = self.state.category_input.clone();
        let amount = self.state.amount_input.clone();
        let date = self.state.date;

        if self.ledger.add(&category, &amount, date).is_err() {
            return Ok(());
        }

        self.store.save(self.ledger.entries())?;

        self.state.amount_input.clear();
        self.state.suggestion = None;
        self.state.set_status(format!(
            "追加しました: {} {}円 ({})",
            category,
            amount,
            date.format(DATE_FORMAT)
        ));
        Ok(())
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
