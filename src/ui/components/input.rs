use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;

/// Result of handling a key event in an input component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
  /// Key was handled, continue input mode
  Consumed,
  /// Enter pressed, here's the submitted value
  Submitted(String),
  /// Escape pressed, input cancelled
  Cancelled,
  /// Key not handled, pass to next handler
  NotHandled,
}

/// Single-line text input. The cursor counts characters, not bytes, so
/// names like "Zürich" edit correctly.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
  buffer: String,
  cursor: usize,
  /// Only these characters are accepted when set
  accept: Option<fn(char) -> bool>,
}

impl TextInput {
  pub fn new() -> Self {
    Self::default()
  }

  /// Input that ignores characters failing `accept`
  pub fn restricted(accept: fn(char) -> bool) -> Self {
    Self {
      accept: Some(accept),
      ..Self::default()
    }
  }

  pub fn value(&self) -> &str {
    &self.buffer
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  /// Replace the contents and move the cursor to the end
  pub fn set_value(&mut self, value: &str) {
    self.buffer = value.to_string();
    self.cursor = self.char_count();
  }

  pub fn clear(&mut self) {
    self.buffer.clear();
    self.cursor = 0;
  }

  /// Cursor position in characters
  pub fn cursor_position(&self) -> usize {
    self.cursor
  }

  /// Text with the character under the cursor drawn in `cursor` style.
  /// At the end of the text the cursor is a trailing underscore.
  pub fn spans(&self, cursor: Style) -> Vec<Span<'_>> {
    let at = self.byte_offset(self.cursor_position());
    let (before, rest) = self.buffer.split_at(at);
    let mut spans = vec![Span::raw(before)];
    match rest.chars().next() {
      Some(c) => {
        let (current, after) = rest.split_at(c.len_utf8());
        spans.push(Span::styled(current, cursor.add_modifier(Modifier::REVERSED)));
        spans.push(Span::raw(after));
      }
      None => spans.push(Span::styled("_", cursor)),
    }
    spans
  }

  fn char_count(&self) -> usize {
    self.buffer.chars().count()
  }

  /// Byte offset of the `idx`-th character
  fn byte_offset(&self, idx: usize) -> usize {
    self
      .buffer
      .char_indices()
      .nth(idx)
      .map(|(i, _)| i)
      .unwrap_or(self.buffer.len())
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Esc => InputResult::Cancelled,
      KeyCode::Enter => InputResult::Submitted(self.buffer.clone()),
      KeyCode::Backspace => {
        if self.cursor > 0 {
          self.cursor -= 1;
          let at = self.byte_offset(self.cursor);
          self.buffer.remove(at);
        }
        InputResult::Consumed
      }
      KeyCode::Delete => {
        if self.cursor < self.char_count() {
          let at = self.byte_offset(self.cursor);
          self.buffer.remove(at);
        }
        InputResult::Consumed
      }
      KeyCode::Left => {
        self.cursor = self.cursor.saturating_sub(1);
        InputResult::Consumed
      }
      KeyCode::Right => {
        self.cursor = (self.cursor + 1).min(self.char_count());
        InputResult::Consumed
      }
      KeyCode::Home => {
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::End => {
        self.cursor = self.char_count();
        InputResult::Consumed
      }
      KeyCode::Char('a') if ctrl => {
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::Char('e') if ctrl => {
        self.cursor = self.char_count();
        InputResult::Consumed
      }
      KeyCode::Char('u') if ctrl => {
        // Clear line before cursor
        let at = self.byte_offset(self.cursor);
        self.buffer.replace_range(..at, "");
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::Char('w') if ctrl => {
        // Delete word before cursor
        let at = self.byte_offset(self.cursor);
        let start = self.buffer[..at]
          .trim_end()
          .rfind(' ')
          .map(|i| i + 1)
          .unwrap_or(0);
        self.buffer.replace_range(start..at, "");
        self.cursor = self.buffer[..start].chars().count();
        InputResult::Consumed
      }
      KeyCode::Char(_) if ctrl => InputResult::NotHandled,
      KeyCode::Char(c) => {
        if self.accept.is_some_and(|accept| !accept(c)) {
          return InputResult::NotHandled;
        }
        let at = self.byte_offset(self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
        InputResult::Consumed
      }
      _ => InputResult::NotHandled,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn ctrl_key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::CONTROL)
  }

  fn type_str(input: &mut TextInput, text: &str) {
    for c in text.chars() {
      input.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_spans_follow_cursor() {
    let mut input = TextInput::new();
    type_str(&mut input, "Zürich");
    let texts = |input: &TextInput| -> Vec<String> {
      input
        .spans(Style::default())
        .iter()
        .map(|s| s.content.to_string())
        .collect()
    };
    assert_eq!(texts(&input), vec!["Zürich", "_"]);

    input.handle_key(key(KeyCode::Home));
    input.handle_key(key(KeyCode::Right));
    assert_eq!(texts(&input), vec!["Z", "ü", "rich"]);
  }

  #[test]
  fn test_basic_input_and_submit() {
    let mut input = TextInput::new();
    assert!(input.is_empty());
    type_str(&mut input, "acme");
    assert_eq!(
      input.handle_key(key(KeyCode::Enter)),
      InputResult::Submitted("acme".to_string())
    );
  }

  #[test]
  fn test_cancel() {
    let mut input = TextInput::new();
    type_str(&mut input, "x");
    assert_eq!(input.handle_key(key(KeyCode::Esc)), InputResult::Cancelled);
  }

  #[test]
  fn test_multibyte_editing() {
    let mut input = TextInput::new();
    type_str(&mut input, "Zürich");
    input.handle_key(key(KeyCode::Left));
    input.handle_key(key(KeyCode::Left));
    input.handle_key(key(KeyCode::Left));
    input.handle_key(key(KeyCode::Left));
    input.handle_key(key(KeyCode::Backspace));
    assert_eq!(input.value(), "Zrich");
    input.handle_key(key(KeyCode::Char('ü')));
    assert_eq!(input.value(), "Zürich");
    assert_eq!(input.cursor_position(), 2);
  }

  #[test]
  fn test_ctrl_u_clear_before_cursor() {
    let mut input = TextInput::new();
    type_str(&mut input, "north america");
    for _ in 0..7 {
      input.handle_key(key(KeyCode::Left));
    }
    input.handle_key(ctrl_key(KeyCode::Char('u')));
    assert_eq!(input.value(), "america");
  }

  #[test]
  fn test_ctrl_w_deletes_word() {
    let mut input = TextInput::new();
    type_str(&mut input, "asia pacific");
    input.handle_key(ctrl_key(KeyCode::Char('w')));
    assert_eq!(input.value(), "asia ");
    assert_eq!(input.cursor_position(), 5);
  }

  #[test]
  fn test_restricted_input() {
    let mut input = TextInput::restricted(|c| c.is_ascii_digit() || c == '-');
    type_str(&mut input, "2024-0x1");
    assert_eq!(input.value(), "2024-01");
    assert_eq!(
      input.handle_key(key(KeyCode::Char('m'))),
      InputResult::NotHandled
    );
  }

  #[test]
  fn test_set_value() {
    let mut input = TextInput::new();
    input.set_value("2024-01-31");
    assert_eq!(input.cursor_position(), 10);
    input.handle_key(key(KeyCode::Backspace));
    assert_eq!(input.value(), "2024-01-3");
  }
}
