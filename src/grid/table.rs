//! Search, sort and pagination state for the generic data grid.
//!
//! The grid receives rows that the page has already filtered and derives
//! its own view from them on every render: search first, then sort, then
//! pagination. Nothing here mutates the rows it is given.

use super::column::{value_for, Column};
use super::record::Record;

/// Rows per page
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
  Ascending,
  Descending,
}

impl SortDirection {
  pub fn toggled(self) -> Self {
    match self {
      SortDirection::Ascending => SortDirection::Descending,
      SortDirection::Descending => SortDirection::Ascending,
    }
  }

  pub fn arrow(self) -> &'static str {
    match self {
      SortDirection::Ascending => "↑",
      SortDirection::Descending => "↓",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortConfig {
  pub key: String,
  pub direction: SortDirection,
}

/// Number of pages needed for `total` rows
pub fn page_count(total: usize) -> usize {
  total.div_ceil(PAGE_SIZE)
}

/// True if some column's value contains `term` (case-insensitive).
/// An empty term matches every record.
pub fn matches_search(record: &Record, columns: &[Column], term: &str) -> bool {
  if term.is_empty() {
    return true;
  }
  let needle = term.to_lowercase();
  columns
    .iter()
    .any(|column| column.value_of(record).contains_lowercase(&needle))
}

/// Stable sort of row references by one column
pub fn sort_rows(rows: &mut [&Record], columns: &[Column], sort: &SortConfig) {
  rows.sort_by(|a, b| {
    let a = value_for(columns, &sort.key, a);
    let b = value_for(columns, &sort.key, b);
    let ordering = a.compare(&b);
    match sort.direction {
      SortDirection::Ascending => ordering,
      SortDirection::Descending => ordering.reverse(),
    }
  });
}

/// Grid state owned by a list view
#[derive(Debug, Clone)]
pub struct DataTable {
  search: String,
  sort: Option<SortConfig>,
  page: usize,
}

impl Default for DataTable {
  fn default() -> Self {
    Self::new()
  }
}

impl DataTable {
  pub fn new() -> Self {
    Self {
      search: String::new(),
      sort: None,
      page: 1,
    }
  }

  pub fn search(&self) -> &str {
    &self.search
  }

  /// Update the free-text search; any change sends the grid back to page 1
  pub fn set_search(&mut self, term: impl Into<String>) {
    let term = term.into();
    if term != self.search {
      self.search = term;
      self.page = 1;
    }
  }

  pub fn sort(&self) -> Option<&SortConfig> {
    self.sort.as_ref()
  }

  /// Header click: a new column sorts ascending, the same column flips direction
  pub fn toggle_sort(&mut self, key: &str) {
    self.sort = Some(match self.sort.take() {
      Some(current) if current.key == key => SortConfig {
        key: current.key,
        direction: current.direction.toggled(),
      },
      _ => SortConfig {
        key: key.to_string(),
        direction: SortDirection::Ascending,
      },
    });
  }

  pub fn clear_sort(&mut self) {
    self.sort = None;
  }

  /// Requested page (1-based, not yet clamped against the data)
  pub fn page(&self) -> usize {
    self.page
  }

  pub fn set_page(&mut self, page: usize) {
    self.page = page.max(1);
  }

  pub fn next_page(&mut self, page_count: usize) {
    let last = page_count.max(1);
    self.page = (self.page.min(last) + 1).min(last);
  }

  pub fn prev_page(&mut self, page_count: usize) {
    let last = page_count.max(1);
    self.page = self.page.min(last).saturating_sub(1).max(1);
  }

  /// Derive the searched, sorted and paginated view of `data`
  pub fn view<'a>(&self, data: &[&'a Record], columns: &[Column]) -> TableView<'a> {
    let mut rows: Vec<&'a Record> = data
      .iter()
      .copied()
      .filter(|record| matches_search(record, columns, &self.search))
      .collect();

    if let Some(sort) = &self.sort {
      sort_rows(&mut rows, columns, sort);
    }

    let page_count = page_count(rows.len());
    let page = self.page.clamp(1, page_count.max(1));

    TableView {
      rows,
      page,
      page_count,
    }
  }
}

/// A derived, read-only view of the grid
#[derive(Debug, Clone)]
pub struct TableView<'a> {
  rows: Vec<&'a Record>,
  page: usize,
  page_count: usize,
}

impl<'a> TableView<'a> {
  /// All rows after search and sort (what export writes)
  pub fn rows(&self) -> &[&'a Record] {
    &self.rows
  }

  pub fn total(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  /// Current page, clamped to the valid range
  pub fn page(&self) -> usize {
    self.page
  }

  pub fn page_count(&self) -> usize {
    self.page_count
  }

  /// Rows on the current page
  pub fn page_rows(&self) -> &[&'a Record] {
    let start = ((self.page - 1) * PAGE_SIZE).min(self.rows.len());
    let end = (start + PAGE_SIZE).min(self.rows.len());
    &self.rows[start..end]
  }

  /// 1-based `(first, last, total)` for the "Showing x to y of z" line
  pub fn showing(&self) -> Option<(usize, usize, usize)> {
    if self.rows.is_empty() {
      return None;
    }
    let start = (self.page - 1) * PAGE_SIZE;
    let end = (start + PAGE_SIZE).min(self.rows.len());
    Some((start + 1, end, self.rows.len()))
  }
}
