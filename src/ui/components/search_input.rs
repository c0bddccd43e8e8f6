use super::input::{InputResult, TextInput};
use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by search input that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
  /// Search term changed (each keystroke; the previous term on cancel)
  Changed(String),
  /// Search submitted (overlay closed, term persists)
  Submitted,
}

/// Search box for the grid. Opening it again edits the current term instead
/// of starting from scratch, and Esc restores the term it opened with.
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
  input: TextInput,
  active: bool,
  /// Term to restore on cancel
  original: String,
}

impl SearchInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn query(&self) -> &str {
    self.input.value()
  }

  /// Open the search box with `current` as the starting term
  pub fn activate(&mut self, current: &str) {
    self.active = true;
    self.original = current.to_string();
    self.input.set_value(current);
  }

  /// Handle a key event.
  /// Call this regardless of active state, it handles activation too.
  pub fn handle_key(&mut self, key: KeyEvent, current: &str) -> KeyResult<SearchEvent> {
    if !self.active {
      if key.code == KeyCode::Char('/') {
        self.activate(current);
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(_) => {
        self.active = false;
        KeyResult::Event(SearchEvent::Submitted)
      }
      InputResult::Cancelled => {
        self.active = false;
        self.input.set_value(&self.original);
        KeyResult::Event(SearchEvent::Changed(self.original.clone()))
      }
      InputResult::Consumed => {
        KeyResult::Event(SearchEvent::Changed(self.input.value().to_string()))
      }
      // Swallow everything else so list bindings don't fire while typing
      InputResult::NotHandled => KeyResult::Handled,
    }
  }

  /// Render the search overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (area.width * 60 / 100).clamp(30, 60).min(area.width);
    let overlay_area = Rect::new(area.x + 1, area.y + 1, width, 3);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Search ");

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let mut input_line = vec![Span::styled("/", Style::default().fg(Color::Yellow))];
    input_line.extend(self.input.spans(Style::default().fg(Color::Yellow)));
    frame.render_widget(Paragraph::new(Line::from(input_line)), inner);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_inactive_ignores_keys() {
    let mut search = SearchInput::new();
    assert_eq!(
      search.handle_key(key(KeyCode::Char('j')), ""),
      KeyResult::NotHandled
    );
  }

  #[test]
  fn test_typing_emits_changes() {
    let mut search = SearchInput::new();
    search.handle_key(key(KeyCode::Char('/')), "");
    assert!(search.is_active());
    assert_eq!(
      search.handle_key(key(KeyCode::Char('a')), ""),
      KeyResult::Event(SearchEvent::Changed("a".to_string()))
    );
    assert_eq!(
      search.handle_key(key(KeyCode::Enter), "a"),
      KeyResult::Event(SearchEvent::Submitted)
    );
    assert!(!search.is_active());
  }

  #[test]
  fn test_reopen_edits_current_term() {
    let mut search = SearchInput::new();
    search.handle_key(key(KeyCode::Char('/')), "acme");
    assert_eq!(search.query(), "acme");
    assert_eq!(
      search.handle_key(key(KeyCode::Char('s')), "acme"),
      KeyResult::Event(SearchEvent::Changed("acmes".to_string()))
    );
  }

  #[test]
  fn test_cancel_restores_previous_term() {
    let mut search = SearchInput::new();
    search.handle_key(key(KeyCode::Char('/')), "acme");
    search.handle_key(key(KeyCode::Backspace), "acme");
    assert_eq!(
      search.handle_key(key(KeyCode::Esc), "acm"),
      KeyResult::Event(SearchEvent::Changed("acme".to_string()))
    );
  }
}
