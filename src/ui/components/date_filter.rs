use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::grid::{DateField, DateMode, DatePicker, FilterChange};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by the date filter that the view needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFilterEvent {
  Changed(FilterChange),
  Cancelled,
}

fn date_char(c: char) -> bool {
  c.is_ascii_digit() || c == '-'
}

/// Single date / date range overlay for a date column
#[derive(Debug, Clone, Default)]
pub struct DateFilterPopup {
  picker: Option<DatePicker>,
  header: String,
  focus: usize,
  input: TextInput,
  error: Option<String>,
}

impl DateFilterPopup {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.picker.is_some()
  }

  pub fn open(&mut self, header: &str, picker: DatePicker) {
    self.header = header.to_string();
    self.picker = Some(picker);
    self.error = None;
    self.focus_field(0);
  }

  fn close(&mut self) {
    self.picker = None;
    self.error = None;
  }

  fn focused(&self) -> Option<DateField> {
    let picker = self.picker.as_ref()?;
    picker.fields().get(self.focus).copied()
  }

  /// Move the text cursor to another field, loading its current text
  fn focus_field(&mut self, idx: usize) {
    self.focus = idx;
    self.input = TextInput::restricted(date_char);
    if let (Some(picker), Some(field)) = (self.picker.as_ref(), self.focused()) {
      self.input.set_value(picker.input(field));
    }
  }

  fn store_input(&mut self) {
    if let Some(field) = self.focused() {
      if let Some(picker) = self.picker.as_mut() {
        picker.set_input(field, self.input.value());
      }
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<DateFilterEvent> {
    let Some(picker) = self.picker.as_mut() else {
      return KeyResult::NotHandled;
    };

    match key.code {
      KeyCode::Esc => {
        self.close();
        return KeyResult::Event(DateFilterEvent::Cancelled);
      }
      KeyCode::Char('m') => {
        let mode = match picker.mode() {
          DateMode::Single => DateMode::Range,
          DateMode::Range => DateMode::Single,
        };
        picker.set_mode(mode);
        self.error = None;
        self.focus_field(0);
        return KeyResult::Handled;
      }
      KeyCode::Char('c') => {
        let change = picker.clear();
        self.close();
        return KeyResult::Event(DateFilterEvent::Changed(change));
      }
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
        let count = picker.fields().len();
        let next = match key.code {
          KeyCode::BackTab | KeyCode::Up => (self.focus + count - 1) % count,
          _ => (self.focus + 1) % count,
        };
        self.focus_field(next);
        return KeyResult::Handled;
      }
      _ => {}
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(_) => self.submit(),
      InputResult::Consumed => {
        self.store_input();
        self.error = None;
        KeyResult::Handled
      }
      InputResult::Cancelled | InputResult::NotHandled => KeyResult::Handled,
    }
  }

  /// Apply, or keep the overlay open with the validation error
  fn submit(&mut self) -> KeyResult<DateFilterEvent> {
    let Some(picker) = self.picker.as_ref() else {
      return KeyResult::Handled;
    };
    match picker.apply() {
      Ok(change) => {
        self.close();
        KeyResult::Event(DateFilterEvent::Changed(change))
      }
      Err(e) => {
        self.error = Some(e.to_string());
        KeyResult::Handled
      }
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    let Some(picker) = self.picker.as_ref() else {
      return;
    };

    let width = 46.min(area.width);
    let height = 9.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let mode_label = match picker.mode() {
      DateMode::Single => "single date",
      DateMode::Range => "date range",
    };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" Filter: {} ({}) ", self.header, mode_label));

    let mut lines = Vec::new();
    for (idx, field) in picker.fields().iter().enumerate() {
      let label = match field {
        DateField::Single => "Date ",
        DateField::From => "From ",
        DateField::To => "To   ",
      };
      let mut spans = vec![Span::styled(label, Style::default().fg(Color::Cyan))];
      if idx == self.focus {
        spans.extend(self.input.spans(Style::default().fg(Color::Yellow)));
      } else if picker.input(*field).is_empty() {
        spans.push(Span::styled("YYYY-MM-DD", Style::default().fg(Color::DarkGray)));
      } else {
        spans.push(Span::raw(picker.input(*field)));
      }
      lines.push(Line::from(spans));
    }

    lines.push(Line::raw(""));
    match &self.error {
      Some(error) => lines.push(Line::styled(
        error.clone(),
        Style::default().fg(Color::Red),
      )),
      None => lines.push(Line::raw("")),
    }
    lines.push(Line::from(vec![
      Span::styled("tab", Style::default().fg(Color::Cyan)),
      Span::styled(" field ", Style::default().fg(Color::DarkGray)),
      Span::styled("m", Style::default().fg(Color::Cyan)),
      Span::styled(" mode ", Style::default().fg(Color::DarkGray)),
      Span::styled("enter", Style::default().fg(Color::Cyan)),
      Span::styled(" apply ", Style::default().fg(Color::DarkGray)),
      Span::styled("c", Style::default().fg(Color::Cyan)),
      Span::styled(" clear", Style::default().fg(Color::DarkGray)),
    ]));

    frame.render_widget(Paragraph::new(lines).block(block), overlay_area);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grid::filter::{DateFilter as Criterion, FilterCriterion};
  use chrono::NaiveDate;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_str(filter: &mut DateFilterPopup, text: &str) {
    for c in text.chars() {
      filter.handle_key(key(KeyCode::Char(c)));
    }
  }

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn open_filter(active: Option<&FilterCriterion>) -> DateFilterPopup {
    let mut filter = DateFilterPopup::new();
    filter.open("Created", DatePicker::new("created_at", active));
    filter
  }

  #[test]
  fn test_single_date() {
    let mut filter = open_filter(None);
    type_str(&mut filter, "2024-03-05");
    assert_eq!(
      filter.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(DateFilterEvent::Changed(FilterChange::set(
        "created_at",
        FilterCriterion::Date(Criterion::SingleDate(day(2024, 3, 5)))
      )))
    );
  }

  #[test]
  fn test_range_with_tab() {
    let mut filter = open_filter(None);
    filter.handle_key(key(KeyCode::Char('m')));
    type_str(&mut filter, "2024-01-01");
    filter.handle_key(key(KeyCode::Tab));
    type_str(&mut filter, "2024-01-31");

    assert_eq!(
      filter.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(DateFilterEvent::Changed(FilterChange::set(
        "created_at",
        FilterCriterion::Date(Criterion::DateRange {
          from: day(2024, 1, 1),
          to: day(2024, 1, 31),
        })
      )))
    );
  }

  #[test]
  fn test_invalid_input_stays_open_with_error() {
    let mut filter = open_filter(None);
    filter.handle_key(key(KeyCode::Char('m')));
    type_str(&mut filter, "2024-02-01");
    filter.handle_key(key(KeyCode::Tab));
    type_str(&mut filter, "2024-01-01");

    assert_eq!(filter.handle_key(key(KeyCode::Enter)), KeyResult::Handled);
    assert!(filter.is_active());
    assert_eq!(filter.error.as_deref(), Some("start date is after end date"));
  }

  #[test]
  fn test_letters_are_ignored() {
    let mut filter = open_filter(None);
    type_str(&mut filter, "2024-x01-01");
    assert_eq!(filter.input.value(), "2024-01-01");
  }

  #[test]
  fn test_prefilled_range_and_clear() {
    let active = FilterCriterion::Date(Criterion::DateRange {
      from: day(2024, 1, 1),
      to: day(2024, 1, 31),
    });
    let mut filter = open_filter(Some(&active));
    assert_eq!(filter.input.value(), "2024-01-01");

    assert_eq!(
      filter.handle_key(key(KeyCode::Char('c'))),
      KeyResult::Event(DateFilterEvent::Changed(FilterChange::remove("created_at")))
    );
    assert!(!filter.is_active());
  }
}
