use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::grid::{FilterChange, ValuePicker};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

/// Events emitted by the value filter that the view needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueFilterEvent {
  /// Apply or clear was pressed
  Changed(FilterChange),
  Cancelled,
}

/// Checklist overlay over a column's candidate values
#[derive(Debug, Clone, Default)]
pub struct ValueFilterPopup {
  picker: Option<ValuePicker>,
  header: String,
  list_state: ListState,
  search: TextInput,
  searching: bool,
}

impl ValueFilterPopup {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.picker.is_some()
  }

  /// Show the overlay for a column
  pub fn open(&mut self, header: &str, picker: ValuePicker) {
    self.header = header.to_string();
    self.picker = Some(picker);
    self.list_state = ListState::default();
    self.list_state.select(Some(0));
    self.search.clear();
    self.searching = false;
  }

  /// Swap in candidates that arrived after opening (master data lists)
  pub fn set_candidates(&mut self, column: &str, candidates: Vec<String>) {
    if let Some(picker) = self.picker.as_mut().filter(|p| p.column() == column) {
      picker.set_candidates(candidates);
    }
  }

  fn close(&mut self) {
    self.picker = None;
    self.searching = false;
  }

  fn visible_len(&self) -> usize {
    self.picker.as_ref().map_or(0, |p| p.visible().len())
  }

  fn move_cursor(&mut self, forward: bool) {
    let len = self.visible_len();
    if len == 0 {
      return;
    }
    let current = self.list_state.selected().unwrap_or(0).min(len - 1);
    let next = if forward {
      (current + 1) % len
    } else {
      (current + len - 1) % len
    };
    self.list_state.select(Some(next));
  }

  fn toggle_current(&mut self) {
    let Some(picker) = self.picker.as_mut() else {
      return;
    };
    let idx = self.list_state.selected().unwrap_or(0);
    if let Some(value) = picker.visible().get(idx).map(|v| v.to_string()) {
      picker.toggle(&value);
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ValueFilterEvent> {
    if self.picker.is_none() {
      return KeyResult::NotHandled;
    }

    if self.searching {
      return self.handle_search_key(key);
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.close();
        return KeyResult::Event(ValueFilterEvent::Cancelled);
      }
      KeyCode::Char('j') | KeyCode::Down => self.move_cursor(true),
      KeyCode::Char('k') | KeyCode::Up => self.move_cursor(false),
      KeyCode::Char(' ') => self.toggle_current(),
      KeyCode::Char('/') => self.searching = true,
      _ => {}
    }

    let Some(picker) = self.picker.as_mut() else {
      return KeyResult::Handled;
    };
    match key.code {
      KeyCode::Char('a') => picker.select_all_visible(),
      KeyCode::Char('x') => picker.clear_visible(),
      KeyCode::Enter => {
        let change = picker.apply();
        self.close();
        return KeyResult::Event(ValueFilterEvent::Changed(change));
      }
      KeyCode::Char('c') => {
        let change = picker.clear();
        self.close();
        return KeyResult::Event(ValueFilterEvent::Changed(change));
      }
      _ => {}
    }
    // Modal
    KeyResult::Handled
  }

  fn handle_search_key(&mut self, key: KeyEvent) -> KeyResult<ValueFilterEvent> {
    match self.search.handle_key(key) {
      InputResult::Submitted(_) => self.searching = false,
      InputResult::Cancelled => {
        self.searching = false;
        self.search.clear();
      }
      InputResult::Consumed | InputResult::NotHandled => {}
    }
    if let Some(picker) = self.picker.as_mut() {
      picker.set_search(self.search.value());
    }
    self.list_state.select(Some(0));
    KeyResult::Handled
  }

  pub fn render_overlay(&mut self, frame: &mut Frame, area: Rect) {
    let Some(picker) = self.picker.as_ref() else {
      return;
    };

    let visible = picker.visible();
    ensure_valid_selection(&mut self.list_state, visible.len());

    let width = 50.min(area.width.saturating_sub(4)).max(20.min(area.width));
    let height = (visible.len() as u16 + 6).clamp(8, 20).min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(
        " Filter: {} ({} selected) ",
        self.header,
        picker.selected().len()
      ));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height < 3 {
      return;
    }

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Search
        Constraint::Min(1),    // Values
        Constraint::Length(1), // Hints
      ])
      .split(inner);

    let search_style = if self.searching {
      Style::default().fg(Color::Yellow)
    } else {
      Style::default().fg(Color::DarkGray)
    };
    let mut search_line = vec![Span::styled("/", search_style)];
    if self.searching {
      search_line.extend(self.search.spans(search_style));
    } else {
      search_line.push(Span::raw(self.search.value()));
    }
    frame.render_widget(Paragraph::new(Line::from(search_line)), chunks[0]);

    if visible.is_empty() {
      let text = if picker.candidates().is_empty() {
        "No values to filter on"
      } else {
        "No values match"
      };
      frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        chunks[1],
      );
    } else {
      let label_width = inner.width.saturating_sub(5) as usize;
      let items: Vec<ListItem> = visible
        .iter()
        .map(|value| {
          let (mark, style) = if picker.is_selected(value) {
            ("[x] ", Style::default().fg(Color::Cyan))
          } else {
            ("[ ] ", Style::default().fg(Color::White))
          };
          ListItem::new(Line::from(vec![
            Span::styled(mark, style),
            Span::styled(truncate(value, label_width), style),
          ]))
        })
        .collect();

      let list =
        List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));
      frame.render_stateful_widget(list, chunks[1], &mut self.list_state);
    }

    let hints = Line::from(vec![
      Span::styled("space", Style::default().fg(Color::Cyan)),
      Span::styled(" toggle ", Style::default().fg(Color::DarkGray)),
      Span::styled("a/x", Style::default().fg(Color::Cyan)),
      Span::styled(" all/none ", Style::default().fg(Color::DarkGray)),
      Span::styled("enter", Style::default().fg(Color::Cyan)),
      Span::styled(" apply ", Style::default().fg(Color::DarkGray)),
      Span::styled("c", Style::default().fg(Color::Cyan)),
      Span::styled(" clear", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(hints), chunks[2]);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grid::filter::{FilterCriterion, ValueSet};
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn regions() -> Vec<String> {
    ["Asia Pacific", "Europe", "Latin America", "North America"]
      .iter()
      .map(|s| s.to_string())
      .collect()
  }

  fn open_filter(active: Option<&FilterCriterion>) -> ValueFilterPopup {
    let mut filter = ValueFilterPopup::new();
    filter.open("Region", ValuePicker::new("region", regions(), active));
    filter
  }

  #[test]
  fn test_toggle_and_apply() {
    let mut filter = open_filter(None);
    filter.handle_key(key(KeyCode::Char('j')));
    filter.handle_key(key(KeyCode::Char(' ')));

    assert_eq!(
      filter.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(ValueFilterEvent::Changed(FilterChange::values(
        "region",
        vec!["Europe".to_string()]
      )))
    );
    assert!(!filter.is_active());
  }

  #[test]
  fn test_search_then_select_all_visible() {
    let mut filter = open_filter(None);
    filter.handle_key(key(KeyCode::Char('/')));
    for c in "america".chars() {
      filter.handle_key(key(KeyCode::Char(c)));
    }
    filter.handle_key(key(KeyCode::Enter));
    filter.handle_key(key(KeyCode::Char('a')));

    let KeyResult::Event(ValueFilterEvent::Changed(change)) = filter.handle_key(key(KeyCode::Enter))
    else {
      panic!("expected a filter change");
    };
    let Some(FilterCriterion::AnyOf(values)) = change.criterion else {
      panic!("expected a value filter");
    };
    assert_eq!(values.values(), ["Latin America", "North America"]);
  }

  #[test]
  fn test_prefilled_selection_and_clear() {
    let active = FilterCriterion::AnyOf(ValueSet::new(vec!["Europe".to_string()]).unwrap());
    let mut filter = open_filter(Some(&active));

    assert_eq!(
      filter.handle_key(key(KeyCode::Char('c'))),
      KeyResult::Event(ValueFilterEvent::Changed(FilterChange::remove("region")))
    );
  }

  #[test]
  fn test_empty_selection_removes_filter() {
    let active = FilterCriterion::AnyOf(ValueSet::new(vec!["Europe".to_string()]).unwrap());
    let mut filter = open_filter(Some(&active));
    filter.handle_key(key(KeyCode::Char('x')));

    assert_eq!(
      filter.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(ValueFilterEvent::Changed(FilterChange::remove("region")))
    );
  }

  #[test]
  fn test_escape_cancels() {
    let mut filter = open_filter(None);
    assert_eq!(
      filter.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(ValueFilterEvent::Cancelled)
    );
    assert_eq!(filter.handle_key(key(KeyCode::Esc)), KeyResult::NotHandled);
  }

  #[test]
  fn test_late_candidates_only_for_same_column() {
    let mut filter = ValueFilterPopup::new();
    filter.open("Country", ValuePicker::new("country", Vec::new(), None));
    filter.set_candidates("region", regions());
    assert_eq!(filter.visible_len(), 0);
    filter.set_candidates("country", vec!["France".to_string()]);
    assert_eq!(filter.visible_len(), 1);
  }
}
