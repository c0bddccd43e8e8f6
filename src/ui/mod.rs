pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::{ListState, TableState};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let shortcuts = app.shortcuts();
  let entity = app.current_entity().map(|e| e.label());
  renderfns::draw_header(
    frame,
    chunks[0],
    app.title(),
    app.host(),
    entity,
    &shortcuts,
  );

  if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[1]);
  }
  app.command_input().render_overlay(frame, chunks[1]);

  renderfns::draw_footer(
    frame,
    chunks[2],
    &app.breadcrumb(),
    app.notification(),
  );
}

/// Widget state with an optional selected index
pub trait Selectable {
  fn selected(&self) -> Option<usize>;
  fn select(&mut self, index: Option<usize>);
}

impl Selectable for ListState {
  fn selected(&self) -> Option<usize> {
    ListState::selected(self)
  }

  fn select(&mut self, index: Option<usize>) {
    ListState::select(self, index)
  }
}

impl Selectable for TableState {
  fn selected(&self) -> Option<usize> {
    TableState::selected(self)
  }

  fn select(&mut self, index: Option<usize>) {
    TableState::select(self, index)
  }
}

/// Keep the selection inside `0..len`: nothing selected for an empty list,
/// the first row when nothing was selected, the last row when the list
/// shrank under the cursor.
pub fn ensure_valid_selection<S: Selectable>(state: &mut S, len: usize) {
  match state.selected() {
    _ if len == 0 => state.select(None),
    None => state.select(Some(0)),
    Some(idx) if idx >= len => state.select(Some(len - 1)),
    Some(_) => {}
  }
}
