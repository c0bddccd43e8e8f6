use crate::app::AppContext;
use crate::crm::EntityKind;
use crate::grid::{Column, ColumnKind, Record};
use crate::query::Query;
use crate::ui::ensure_valid_selection;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

/// Read-only list of every field on one record
pub struct RecordDetailView {
  entity: EntityKind,
  title: String,
  rows: Vec<(String, String)>,
  list_state: ListState,

  /// Row index and lookup for a region that is blank but derivable from the country
  region_lookup: Option<(usize, Query<Option<String>>)>,
}

impl RecordDetailView {
  pub fn new(ctx: AppContext, entity: EntityKind, record: Record) -> Self {
    let title = record
      .id()
      .map(|id| format!("{} {}", entity.singular(), id))
      .unwrap_or_else(|| entity.singular().to_string());
    let columns = entity.columns();

    let region_lookup = missing_region(&record, columns).map(|(row, country)| {
      let master = ctx.master.clone();
      let mut query = Query::new(move || {
        let master = master.clone();
        let country = country.clone();
        async move { Ok(master.region_by_country(&country).await) }
      });
      query.fetch();
      (row, query)
    });

    Self {
      entity,
      title,
      rows: detail_rows(&record, columns),
      list_state: ListState::default(),
      region_lookup,
    }
  }
}

/// Row of an empty region column plus the country to look it up by
fn missing_region(record: &Record, columns: &[Column]) -> Option<(usize, String)> {
  let row = columns
    .iter()
    .position(|c| c.kind == ColumnKind::Region && c.display(record).trim().is_empty())?;
  let country = columns
    .iter()
    .filter(|c| c.kind == ColumnKind::Country)
    .filter_map(|c| c.value_of(record).to_text())
    .find(|text| !text.trim().is_empty())?;
  Some((row, country))
}

/// Label/value pairs: the entity's columns in declared order, then every
/// other field alphabetically by name
pub fn detail_rows(record: &Record, columns: &[Column]) -> Vec<(String, String)> {
  let mut rows: Vec<(String, String)> = columns
    .iter()
    .map(|c| (c.header.to_string(), c.display(record)))
    .collect();

  // Record fields are kept in a sorted map, so these come out alphabetically
  rows.extend(
    record
      .fields()
      .filter(|(key, _)| !columns.iter().any(|c| c.key == *key))
      .map(|(key, value)| (key.to_string(), value.to_string())),
  );
  rows
}

impl View for RecordDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('g') | KeyCode::Home => self.list_state.select_first(),
      KeyCode::Char('G') | KeyCode::End => self.list_state.select_last(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    ensure_valid_selection(&mut self.list_state, self.rows.len());

    let label_width = self
      .rows
      .iter()
      .map(|(label, _)| label.chars().count())
      .max()
      .unwrap_or(0)
      .min(30);

    let items: Vec<ListItem> = self
      .rows
      .iter()
      .map(|(label, value)| {
        ListItem::new(Line::from(vec![
          Span::styled(
            format!("{:<width$}  ", label, width = label_width),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(value.clone()),
        ]))
      })
      .collect();

    let block = Block::default()
      .title(format!(" {} ", self.title))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray));

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }

  fn breadcrumb_label(&self) -> String {
    self.title.clone()
  }

  fn entity(&self) -> Option<EntityKind> {
    Some(self.entity)
  }

  fn tick(&mut self) {
    let Some((row, query)) = self.region_lookup.as_mut() else {
      return;
    };
    if !query.poll() {
      return;
    }
    if let Some(Some(region)) = query.data() {
      if let Some((_, value)) = self.rows.get_mut(*row) {
        *value = format!("{} (from country)", region);
      }
    }
    self.region_lookup = None;
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("j/k", "scroll").with_priority(20),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
