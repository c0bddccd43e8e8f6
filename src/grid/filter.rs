//! Per-column filters and their application to record collections.
//!
//! A column is either filtered (present in [`ActiveFilters`] with a
//! non-empty criterion) or not present at all. There is no "empty filter"
//! state: clearing a column's filter removes the entry.

use super::column::{value_for, Column};
use super::dates::{self, parse_local};
use super::record::{Record, Value};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use tracing::debug;

/// Non-empty, duplicate-free list of selected filter values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSet(Vec<String>);

impl ValueSet {
  /// Returns `None` for an empty selection, which callers treat as removal
  pub fn new(values: Vec<String>) -> Option<Self> {
    let mut unique: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
      if !unique.contains(&value) {
        unique.push(value);
      }
    }
    if unique.is_empty() {
      None
    } else {
      Some(Self(unique))
    }
  }

  pub fn values(&self) -> &[String] {
    &self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn contains(&self, value: &str) -> bool {
    self.0.iter().any(|v| v == value)
  }

  /// OR semantics: the cell passes if it contains any selected value
  /// (case-insensitive). Null cells never pass.
  pub fn matches(&self, value: &Value) -> bool {
    let Some(text) = value.to_text() else {
      return false;
    };
    let text = text.to_lowercase();
    self.0.iter().any(|selected| text.contains(&selected.to_lowercase()))
  }
}

/// Date criterion for date-like columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
  /// Same local calendar day
  SingleDate(NaiveDate),
  /// Inclusive range, through the last millisecond of `to`
  DateRange { from: NaiveDate, to: NaiveDate },
}

impl DateFilter {
  /// Inclusive local bounds of this filter
  pub fn bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    match *self {
      DateFilter::SingleDate(day) => (day.and_time(NaiveTime::MIN), day.and_time(end_of_day)),
      DateFilter::DateRange { from, to } => (from.and_time(NaiveTime::MIN), to.and_time(end_of_day)),
    }
  }

  /// Records without a parseable date pass: a malformed field must not
  /// hide the row.
  pub fn matches(&self, value: &Value) -> bool {
    let Some(text) = value.to_text() else {
      return true;
    };
    let Some(at) = parse_local(&text) else {
      debug!(value = %text, "unparseable date passes filter");
      return true;
    };

    match *self {
      DateFilter::SingleDate(day) => at.date() == day,
      DateFilter::DateRange { .. } => {
        let (start, end) = self.bounds();
        at >= start && at <= end
      }
    }
  }
}

impl fmt::Display for DateFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DateFilter::SingleDate(day) => f.write_str(&dates::format_day(*day)),
      DateFilter::DateRange { from, to } => write!(
        f,
        "{} to {}",
        dates::format_day(*from),
        dates::format_day(*to)
      ),
    }
  }
}

/// What an active column filter tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCriterion {
  AnyOf(ValueSet),
  Date(DateFilter),
}

impl FilterCriterion {
  pub fn matches(&self, value: &Value) -> bool {
    match self {
      FilterCriterion::AnyOf(values) => values.matches(value),
      FilterCriterion::Date(date) => date.matches(value),
    }
  }

  /// Short label for the filter bar
  pub fn summary(&self) -> String {
    match self {
      FilterCriterion::AnyOf(values) if values.len() == 1 => values.values()[0].clone(),
      FilterCriterion::AnyOf(values) => format!("{} selected", values.len()),
      FilterCriterion::Date(date) => date.to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFilter {
  pub column: String,
  pub criterion: FilterCriterion,
}

/// Filter change reported by a column filter picker.
/// `criterion: None` removes the column's filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChange {
  pub column: String,
  pub criterion: Option<FilterCriterion>,
}

impl FilterChange {
  pub fn set(column: impl Into<String>, criterion: FilterCriterion) -> Self {
    Self {
      column: column.into(),
      criterion: Some(criterion),
    }
  }

  pub fn remove(column: impl Into<String>) -> Self {
    Self {
      column: column.into(),
      criterion: None,
    }
  }

  /// Value-list change; an empty list means removal
  pub fn values(column: impl Into<String>, values: Vec<String>) -> Self {
    Self {
      column: column.into(),
      criterion: ValueSet::new(values).map(FilterCriterion::AnyOf),
    }
  }
}

/// The set of column filters a page currently applies, in the order they
/// were first added
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFilters {
  filters: Vec<ActiveFilter>,
}

impl ActiveFilters {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add, replace in place, or remove a column filter
  pub fn apply_change(&mut self, change: FilterChange) {
    let existing = self.filters.iter().position(|f| f.column == change.column);
    match (change.criterion, existing) {
      (Some(criterion), Some(idx)) => self.filters[idx].criterion = criterion,
      (Some(criterion), None) => self.filters.push(ActiveFilter {
        column: change.column,
        criterion,
      }),
      (None, Some(idx)) => {
        self.filters.remove(idx);
      }
      (None, None) => {}
    }
  }

  pub fn get(&self, column: &str) -> Option<&FilterCriterion> {
    self
      .filters
      .iter()
      .find(|f| f.column == column)
      .map(|f| &f.criterion)
  }

  pub fn is_active(&self, column: &str) -> bool {
    self.get(column).is_some()
  }

  pub fn clear(&mut self) {
    self.filters.clear();
  }

  pub fn len(&self) -> usize {
    self.filters.len()
  }

  pub fn is_empty(&self) -> bool {
    self.filters.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &ActiveFilter> {
    self.filters.iter()
  }

  /// Every active filter must pass (AND across columns)
  pub fn matches(&self, record: &Record, columns: &[Column]) -> bool {
    self.filters.iter().all(|filter| {
      let value = value_for(columns, &filter.column, record);
      filter.criterion.matches(&value)
    })
  }

  /// Derive the filtered view; the source collection is left untouched
  pub fn apply<'a>(&self, records: &'a [Record], columns: &[Column]) -> Vec<&'a Record> {
    records
      .iter()
      .filter(|record| self.matches(record, columns))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn leads() -> Vec<Record> {
    let regions = [
      "Europe",
      "North America",
      "Europe",
      "Asia Pacific",
      "Africa",
      "Europe",
      "Latin America",
      "North America",
      "Middle East",
      "Asia Pacific",
      "Africa",
      "Latin America",
    ];
    regions
      .iter()
      .enumerate()
      .map(|(i, region)| {
        Record::new()
          .with("id", i as i64)
          .with("client_name", format!("Client {}", i))
          .with("region", *region)
      })
      .collect()
  }

  fn columns() -> Vec<Column> {
    vec![
      Column::new("client_name", "Client").filterable(),
      Column::new("region", "Region").filterable(),
      Column::new("created_at", "Created"),
    ]
  }

  #[test]
  fn test_empty_value_set_is_none() {
    assert!(ValueSet::new(Vec::new()).is_none());
    assert_eq!(FilterChange::values("region", Vec::new()).criterion, None);
  }

  #[test]
  fn test_value_set_deduplicates() {
    let set = ValueSet::new(vec!["a".into(), "b".into(), "a".into()]).unwrap();
    assert_eq!(set.values(), &["a".to_string(), "b".to_string()]);
  }

  #[test]
  fn test_region_filter_scenario() {
    let data = leads();
    let mut filters = ActiveFilters::new();
    filters.apply_change(FilterChange::values("region", vec!["Europe".into()]));

    let filtered = filters.apply(&data, &columns());
    assert_eq!(filtered.len(), 3);
    assert!(filtered
      .iter()
      .all(|r| r.get("region") == &Value::from("Europe")));
    // Source collection is untouched
    assert_eq!(data.len(), 12);
  }

  #[test]
  fn test_values_use_or_semantics() {
    let data = leads();
    let mut filters = ActiveFilters::new();
    filters.apply_change(FilterChange::values(
      "region",
      vec!["Europe".into(), "Africa".into()],
    ));

    assert_eq!(filters.apply(&data, &columns()).len(), 5);
  }

  #[test]
  fn test_columns_use_and_semantics() {
    let data = leads();
    let mut filters = ActiveFilters::new();
    filters.apply_change(FilterChange::values("region", vec!["Europe".into()]));
    filters.apply_change(FilterChange::values(
      "client_name",
      vec!["Client 0".into()],
    ));

    let filtered = filters.apply(&data, &columns());
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id(), Some("0".to_string()));
  }

  #[test]
  fn test_removing_filter_passes_everything() {
    let data = leads();
    let mut filters = ActiveFilters::new();
    filters.apply_change(FilterChange::values("region", vec!["Europe".into()]));
    filters.apply_change(FilterChange::values("region", Vec::new()));

    assert!(filters.is_empty());
    assert_eq!(filters.apply(&data, &columns()).len(), data.len());
  }

  #[test]
  fn test_change_replaces_in_place() {
    let mut filters = ActiveFilters::new();
    filters.apply_change(FilterChange::values("region", vec!["Europe".into()]));
    filters.apply_change(FilterChange::values("client_name", vec!["x".into()]));
    filters.apply_change(FilterChange::values("region", vec!["Africa".into()]));

    let order: Vec<&str> = filters.iter().map(|f| f.column.as_str()).collect();
    assert_eq!(order, vec!["region", "client_name"]);
    assert_eq!(filters.get("region").unwrap().summary(), "Africa");
  }

  #[test]
  fn test_value_match_is_case_insensitive_substring() {
    let set = ValueSet::new(vec!["europe".into()]).unwrap();
    assert!(set.matches(&Value::from("Western Europe")));
    assert!(!set.matches(&Value::Null));
  }

  #[test]
  fn test_date_range_includes_end_of_day() {
    let filter = DateFilter::DateRange {
      from: day(2024, 1, 1),
      to: day(2024, 1, 31),
    };

    assert!(filter.matches(&Value::from("2024-01-31T23:59:00")));
    assert!(filter.matches(&Value::from("2024-01-01T00:00:00")));
    assert!(!filter.matches(&Value::from("2024-02-01T00:00:01")));
    assert!(!filter.matches(&Value::from("2023-12-31T23:59:59")));
  }

  #[test]
  fn test_single_date_matches_calendar_day() {
    let filter = DateFilter::SingleDate(day(2024, 3, 10));

    assert!(filter.matches(&Value::from("2024-03-10T00:00:00")));
    assert!(filter.matches(&Value::from("2024-03-10T23:30:00.500")));
    assert!(!filter.matches(&Value::from("2024-03-11T00:00:00")));
  }

  #[test]
  fn test_unparseable_date_passes() {
    let filter = DateFilter::SingleDate(day(2024, 3, 10));
    assert!(filter.matches(&Value::from("not a date")));
    assert!(filter.matches(&Value::Null));

    let data = vec![
      Record::new().with("created_at", "garbage"),
      Record::new().with("created_at", "2020-01-01T00:00:00"),
    ];
    let mut filters = ActiveFilters::new();
    filters.apply_change(FilterChange::set("created_at", FilterCriterion::Date(filter)));
    assert_eq!(filters.apply(&data, &columns()).len(), 1);
  }

  #[test]
  fn test_date_filter_display() {
    let single = DateFilter::SingleDate(day(2024, 1, 1));
    let range = DateFilter::DateRange {
      from: day(2024, 1, 1),
      to: day(2024, 1, 31),
    };
    assert_eq!(single.to_string(), "2024-01-01");
    assert_eq!(range.to_string(), "2024-01-01 to 2024-01-31");
  }
}
