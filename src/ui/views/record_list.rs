use crate::app::AppContext;
use crate::crm::EntityKind;
use crate::grid::{
  candidate_values, ActiveFilters, Column, ColumnKind, CsvFileExporter, DataTable, DatePicker,
  Exporter, FilterChange, Record, TableView, ValuePicker,
};
use crate::master_data::{Clock, MasterDataCache, MasterDataSource};
use crate::query::{Query, QueryStatus};
use crate::ui::components::{
  render_filter_bar, ConfirmDialog, ConfirmEvent, DateFilterEvent, DateFilterPopup, KeyResult,
  SearchEvent, SearchInput, ValueFilterEvent, ValueFilterPopup,
};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{status_color, truncate};
use crate::ui::view::{Notification, ShortcutInfo, View, ViewAction};
use crate::ui::views::RecordDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use tracing::{debug, info, warn};

/// Widest a cell is drawn before truncation
const MAX_CELL_WIDTH: usize = 40;

/// Paginated, searchable, sortable and filterable table of one entity
pub struct RecordListView {
  ctx: AppContext,
  entity: EntityKind,
  columns: &'static [Column],
  exporter: Box<dyn Exporter>,

  // Data
  query: Query<Vec<Record>>,
  delete: Option<Query<String>>,
  master_names: Option<Query<(String, Vec<String>)>>,

  // Grid state
  filters: ActiveFilters,
  table: DataTable,
  table_state: TableState,
  focus_column: usize,

  // Components
  search: SearchInput,
  value_filter: ValueFilterPopup,
  date_filter: DateFilterPopup,
  confirm: ConfirmDialog,
  pending_delete: Option<String>,

  notification: Option<Notification>,
}

impl RecordListView {
  pub fn new(ctx: AppContext, entity: EntityKind) -> Self {
    let crm = ctx.crm.clone();
    let mut query = Query::new(move || {
      let crm = crm.clone();
      async move { crm.list_records(entity).await.map_err(|e| e.to_string()) }
    });

    // Start fetching immediately
    query.fetch();

    let exporter = CsvFileExporter::new(ctx.export_dir.clone()).with_prefix(entity.command());

    Self {
      ctx,
      entity,
      columns: entity.columns(),
      exporter: Box::new(exporter),
      query,
      delete: None,
      master_names: None,
      filters: ActiveFilters::new(),
      table: DataTable::new(),
      table_state: TableState::default(),
      focus_column: 0,
      search: SearchInput::new(),
      value_filter: ValueFilterPopup::new(),
      date_filter: DateFilterPopup::new(),
      confirm: ConfirmDialog::new(),
      pending_delete: None,
      notification: None,
    }
  }

  fn records(&self) -> &[Record] {
    self.query.data().map(Vec::as_slice).unwrap_or(&[])
  }

  fn focused_column(&self) -> Option<&'static Column> {
    self.columns.get(self.focus_column)
  }

  /// Filtered rows, then search, sort and paging
  fn table_view(&self) -> TableView<'_> {
    let filtered = self.filters.apply(self.records(), self.columns);
    self.table.view(&filtered, self.columns)
  }

  fn selected_record(&self) -> Option<Record> {
    let idx = self.table_state.selected()?;
    self.table_view().page_rows().get(idx).map(|r| (*r).clone())
  }

  fn notify(&mut self, notification: Notification) {
    self.notification = Some(notification);
  }

  fn apply_filter(&mut self, change: FilterChange) {
    info!(
      entity = self.entity.command(),
      column = %change.column,
      removed = change.criterion.is_none(),
      "Column filter changed"
    );
    self.filters.apply_change(change);
    self.table.set_page(1);
    self.table_state.select(Some(0));
  }

  /// Open the value list or date picker for the focused column
  fn open_filter(&mut self) {
    let Some(column) = self.focused_column() else {
      return;
    };
    if !column.filterable {
      self.notify(Notification::info(format!(
        "{} is not filterable",
        column.header
      )));
      return;
    }

    let active = self.filters.get(column.key);
    match column.kind {
      ColumnKind::Date => {
        let picker = DatePicker::new(column.key, active);
        self.date_filter.open(column.header, picker);
      }
      ColumnKind::Text => {
        let candidates = candidate_values(self.records(), column);
        let picker = ValuePicker::new(column.key, candidates, active);
        self.value_filter.open(column.header, picker);
      }
      ColumnKind::Region | ColumnKind::Country => {
        // Reference list comes from the master data cache; fill it in on tick
        let picker = ValuePicker::new(column.key, Vec::new(), active);
        self.value_filter.open(column.header, picker);
        self.fetch_master_names(column);
      }
    }
  }

  fn fetch_master_names(&mut self, column: &'static Column) {
    let master = self.ctx.master.clone();
    let mut query = Query::new(move || {
      let master = master.clone();
      async move {
        let names = master_candidates(&master, column.kind).await;
        Ok((column.key.to_string(), names))
      }
    });
    query.fetch();
    self.master_names = Some(query);
  }

  fn ask_delete(&mut self) {
    let Some(record) = self.selected_record() else {
      return;
    };
    let Some(id) = record.id() else {
      self.notify(Notification::error(format!(
        "This {} has no id and cannot be deleted",
        self.entity.singular()
      )));
      return;
    };
    let label = record_label(&record, self.columns).unwrap_or_else(|| id.clone());
    self
      .confirm
      .show(format!("Delete {} \"{}\"?", self.entity.singular(), label));
    self.pending_delete = Some(id);
  }

  fn start_delete(&mut self, id: String) {
    info!(entity = self.entity.command(), id = %id, "Deleting record");
    let crm = self.ctx.crm.clone();
    let entity = self.entity;
    let mut query = Query::new(move || {
      let crm = crm.clone();
      let id = id.clone();
      async move {
        crm
          .delete_record(entity, &id)
          .await
          .map(|_| id)
          .map_err(|e| e.to_string())
      }
    });
    query.fetch();
    self.delete = Some(query);
  }

  fn export(&mut self) {
    let result = {
      let view = self.table_view();
      self.exporter.export(view.rows(), self.columns)
    };
    match result {
      Ok(outcome) => {
        let message = match outcome.path {
          Some(path) => format!("Exported {} rows to {}", outcome.rows, path.display()),
          None => format!("Exported {} rows", outcome.rows),
        };
        self.notify(Notification::info(message));
      }
      Err(e) => {
        warn!(entity = self.entity.command(), error = %e, "Export failed");
        self.notify(Notification::error(format!("Export failed: {}", e)));
      }
    }
  }

  fn poll_delete(&mut self) {
    let Some(query) = self.delete.as_mut() else {
      return;
    };
    if !query.poll() {
      return;
    }

    let outcome = match (query.data().cloned(), query.error()) {
      (Some(id), _) => Ok(id),
      (None, Some(e)) => Err(e.to_string()),
      (None, None) => return,
    };
    self.delete = None;

    match outcome {
      Ok(id) => {
        if let Some(records) = self.query.data_mut() {
          records.retain(|r| r.id().as_deref() != Some(id.as_str()));
        }
        self.notify(Notification::info(format!(
          "Deleted {} {}",
          self.entity.singular(),
          id
        )));
        self.query.refetch();
      }
      Err(e) => {
        warn!(entity = self.entity.command(), error = %e, "Delete failed");
        self.notify(Notification::error(format!("Delete failed: {}", e)));
      }
    }
  }

  fn poll_master_names(&mut self) {
    let Some(query) = self.master_names.as_mut() else {
      return;
    };
    if !query.poll() {
      return;
    }
    if let Some((column, names)) = query.data().cloned() {
      debug!(column = %column, count = names.len(), "Filter candidates from master data");
      self.value_filter.set_candidates(&column, names);
    }
    self.master_names = None;
  }

  fn render_table(&mut self, frame: &mut Frame, area: Rect) {
    let records = self.query.data().map(Vec::as_slice).unwrap_or(&[]);
    let filtered = self.filters.apply(records, self.columns);
    let view = self.table.view(&filtered, self.columns);
    let page_rows = view.page_rows();
    ensure_valid_selection(&mut self.table_state, page_rows.len());

    let count = if self.filters.is_empty() && self.table.search().is_empty() {
      format!("{}", records.len())
    } else {
      format!("{} of {}", view.total(), records.len())
    };
    let mut title = match self.query.status() {
      QueryStatus::Loading if self.query.data().is_none() => {
        format!(" {} (loading...) ", self.entity.label())
      }
      QueryStatus::Loading => format!(" {} ({}, refreshing...) ", self.entity.label(), count),
      QueryStatus::Failed(e) => format!(" {} (error: {}) ", self.entity.label(), e),
      _ => format!(" {} ({}) ", self.entity.label(), count),
    };
    if !self.table.search().is_empty() {
      title.push_str(&format!("[/{}] ", self.table.search()));
    }

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let header = Row::new(self.columns.iter().enumerate().map(|(idx, column)| {
      let mut label = column.header.to_string();
      if let Some(sort) = self.table.sort().filter(|s| s.key == column.key) {
        label.push(' ');
        label.push_str(sort.direction.arrow());
      }
      if self.filters.is_active(column.key) {
        label.push_str(" ●");
      }
      let mut style = Style::default().fg(Color::Yellow).bold();
      if self.filters.is_active(column.key) {
        style = style.fg(Color::Cyan);
      }
      if idx == self.focus_column {
        style = style.add_modifier(Modifier::REVERSED);
      }
      Cell::from(label).style(style)
    }));

    let rows: Vec<Row> = if page_rows.is_empty() {
      let text = if self.query.data().is_none() && self.query.is_loading() {
        "Loading..."
      } else {
        "No data found"
      };
      vec![Row::new([Cell::from(text).style(Style::default().fg(Color::DarkGray))])]
    } else {
      page_rows
        .iter()
        .map(|record| {
          Row::new(self.columns.iter().map(|column| {
            let text = truncate(&column.display(record), MAX_CELL_WIDTH);
            let style = if is_status_column(column) {
              Style::default().fg(status_color(&text))
            } else {
              Style::default()
            };
            Cell::from(text).style(style)
          }))
        })
        .collect()
    };

    let widths = vec![Constraint::Fill(1); self.columns.len().max(1)];
    let table = Table::new(rows, widths)
      .header(header)
      .block(block)
      .column_spacing(1)
      .row_highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(table, area, &mut self.table_state);
  }

  fn render_status_line(&self, frame: &mut Frame, area: Rect) {
    let view = self.table_view();
    let text = match view.showing() {
      Some((start, end, total)) => format!(
        " Showing {} to {} of {}   Page {} of {}",
        start,
        end,
        total,
        view.page(),
        view.page_count()
      ),
      None => " Showing 0 results".to_string(),
    };
    let text = match self.query.age() {
      Some(age) => format!("{}   Updated {}s ago", text, age.as_secs()),
      None => text,
    };
    frame.render_widget(
      Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
      area,
    );
  }
}

/// Full reference list for a region or country column
async fn master_candidates<S: MasterDataSource, C: Clock>(
  master: &MasterDataCache<S, C>,
  kind: ColumnKind,
) -> Vec<String> {
  match kind {
    ColumnKind::Country => master.country_names().await,
    _ => master.region_names().await,
  }
}

fn is_status_column(column: &Column) -> bool {
  column.key == "stage" || column.key.ends_with("status")
}

/// Human name for a record: its first non-empty filterable text column
fn record_label(record: &Record, columns: &[Column]) -> Option<String> {
  columns
    .iter()
    .filter(|c| c.filterable && c.kind == ColumnKind::Text)
    .filter_map(|c| c.value_of(record).to_text())
    .find(|text| !text.trim().is_empty())
}

impl View for RecordListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // Modal components first, in the order they stack on screen
    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Confirmed) => {
        if let Some(id) = self.pending_delete.take() {
          self.start_delete(id);
        }
        return ViewAction::None;
      }
      KeyResult::Event(ConfirmEvent::Cancelled) => {
        self.pending_delete = None;
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match self.value_filter.handle_key(key) {
      KeyResult::Event(ValueFilterEvent::Changed(change)) => {
        self.apply_filter(change);
        return ViewAction::None;
      }
      KeyResult::Event(ValueFilterEvent::Cancelled) | KeyResult::Handled => {
        return ViewAction::None
      }
      KeyResult::NotHandled => {}
    }

    match self.date_filter.handle_key(key) {
      KeyResult::Event(DateFilterEvent::Changed(change)) => {
        self.apply_filter(change);
        return ViewAction::None;
      }
      KeyResult::Event(DateFilterEvent::Cancelled) | KeyResult::Handled => {
        return ViewAction::None
      }
      KeyResult::NotHandled => {}
    }

    let current = self.table.search().to_string();
    let search = self.search.handle_key(key, &current);
    if let KeyResult::Event(SearchEvent::Changed(term)) = &search {
      self.table.set_search(term.as_str());
      self.table_state.select(Some(0));
    }
    if search.is_consumed() {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.table_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.table_state.select_previous(),
      KeyCode::Char('h') | KeyCode::Left => {
        self.focus_column = self.focus_column.saturating_sub(1);
      }
      KeyCode::Char('l') | KeyCode::Right => {
        self.focus_column = (self.focus_column + 1).min(self.columns.len().saturating_sub(1));
      }
      KeyCode::Char('s') => {
        if let Some(column) = self.focused_column() {
          self.table.toggle_sort(column.key);
        }
      }
      KeyCode::Char('S') => self.table.clear_sort(),
      KeyCode::Char('n') | KeyCode::PageDown => {
        let pages = self.table_view().page_count();
        self.table.next_page(pages);
        self.table_state.select(Some(0));
      }
      KeyCode::Char('p') | KeyCode::PageUp => {
        let pages = self.table_view().page_count();
        self.table.prev_page(pages);
        self.table_state.select(Some(0));
      }
      KeyCode::Char('f') => self.open_filter(),
      KeyCode::Char('F') => {
        if !self.filters.is_empty() {
          self.filters.clear();
          self.table.set_page(1);
          self.notify(Notification::info("Filters cleared"));
        }
      }
      KeyCode::Enter => {
        if let Some(record) = self.selected_record() {
          let detail = RecordDetailView::new(self.ctx.clone(), self.entity, record);
          return ViewAction::Push(Box::new(detail));
        }
      }
      KeyCode::Char('d') => self.ask_delete(),
      KeyCode::Char('e') => self.export(),
      KeyCode::Char('i') => {
        self.notify(Notification::info(format!(
          "Importing {} is not supported yet",
          self.entity.label().to_lowercase()
        )));
      }
      KeyCode::Char('r') => self.query.refetch(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let bar_height = if self.filters.is_empty() { 0 } else { 1 };
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(bar_height), // Filter bar
        Constraint::Min(3),             // Table
        Constraint::Length(1),          // Showing x to y of z
      ])
      .split(area);

    render_filter_bar(frame, chunks[0], &self.filters, self.columns);
    self.render_table(frame, chunks[1]);
    self.render_status_line(frame, chunks[2]);

    // Overlays
    self.search.render_overlay(frame, chunks[1]);
    self.value_filter.render_overlay(frame, chunks[1]);
    self.date_filter.render_overlay(frame, chunks[1]);
    self.confirm.render_overlay(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    self.entity.label().to_string()
  }

  fn entity(&self) -> Option<EntityKind> {
    Some(self.entity)
  }

  fn tick(&mut self) {
    if self.query.poll() {
      match self.query.status() {
        QueryStatus::Failed(e) => {
          warn!(entity = self.entity.command(), error = %e, "Failed to load records");
          let message = format!("Failed to load {}: {}", self.entity.label().to_lowercase(), e);
          self.notify(Notification::error(message));
        }
        _ => debug!(
          entity = self.entity.command(),
          count = self.records().len(),
          "Records loaded"
        ),
      }
    }
    self.poll_delete();
    self.poll_master_names();
  }

  fn captures_input(&self) -> bool {
    self.search.is_active()
      || self.value_filter.is_active()
      || self.date_filter.is_active()
      || self.confirm.is_active()
  }

  fn take_notification(&mut self) -> Option<Notification> {
    self.notification.take()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "search").with_priority(20),
      ShortcutInfo::new("s", "sort").with_priority(30),
      ShortcutInfo::new("f", "filter").with_priority(40),
      ShortcutInfo::new("n/p", "page").with_priority(50),
      ShortcutInfo::new("d", "delete").with_priority(60),
      ShortcutInfo::new("e", "export").with_priority(70),
      ShortcutInfo::new("r", "refresh").with_priority(80),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::crm::columns::{CLIENTS, EMPLOYEES, LEADS};
  use crate::master_data::{Country, Region, SystemClock};
  use color_eyre::Result;

  struct FixedSource;

  impl MasterDataSource for FixedSource {
    async fn fetch_regions(&self) -> Result<Vec<Region>> {
      Ok(vec![Region {
        id: "1".to_string(),
        name: "Europe".to_string(),
      }])
    }

    async fn fetch_countries(&self) -> Result<Vec<Country>> {
      Ok(
        [("Germany", "Europe"), ("Japan", "Asia Pacific"), ("Chile", "Latin America")]
          .into_iter()
          .map(|(name, region)| Country {
            id: name.to_lowercase(),
            name: name.to_string(),
            region: Some(region.to_string()),
          })
          .collect(),
      )
    }
  }

  #[test]
  fn test_status_columns() {
    let status: Vec<&str> = LEADS
      .iter()
      .chain(CLIENTS)
      .filter(|c| is_status_column(c))
      .map(|c| c.key)
      .collect();
    assert_eq!(status, vec!["lead_status", "client_status"]);
  }

  #[test]
  fn test_record_label_uses_first_text_filter_column() {
    let record = Record::new()
      .with("id", 3.0)
      .with("client_name", "")
      .with("opportunity_name", "Cloud migration");
    assert_eq!(
      record_label(&record, LEADS),
      Some("Cloud migration".to_string())
    );

    let employee = Record::new().with("full_name", "Ana Silva");
    assert_eq!(record_label(&employee, EMPLOYEES), Some("Ana Silva".to_string()));

    assert_eq!(record_label(&Record::new(), LEADS), None);
  }

  #[tokio::test]
  async fn test_country_options_ignore_region_filter() {
    let master: MasterDataCache<FixedSource, SystemClock> = MasterDataCache::new(FixedSource);

    let mut filters = ActiveFilters::new();
    filters.apply_change(FilterChange::values("country", vec!["Japan".to_string()]));
    filters.apply_change(FilterChange::values("region", vec!["Europe".to_string()]));

    let names = master_candidates(&master, ColumnKind::Country).await;
    assert_eq!(names, vec!["Germany", "Japan", "Chile"]);

    // A country chosen before the region filter stays visible and removable
    let mut picker = ValuePicker::new("country", names, filters.get("country"));
    assert!(picker.visible().contains(&"Japan"));
    picker.clear_visible();
    assert!(picker.apply().criterion.is_none());

    assert_eq!(
      master_candidates(&master, ColumnKind::Region).await,
      vec!["Europe"]
    );
  }
}
