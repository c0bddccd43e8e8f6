//! Selection state behind the column filter overlays.
//!
//! Neither picker touches the active filter set directly: `apply` and
//! `clear` produce a [`FilterChange`] that the owning view feeds into its
//! [`ActiveFilters`](super::filter::ActiveFilters).

use super::column::Column;
use super::dates::{format_day, parse_day};
use super::filter::{DateFilter, FilterChange, FilterCriterion};
use super::record::{Record, Value};
use std::cmp::Ordering;
use thiserror::Error;

/// Distinct, non-empty values of a column across `records`, sorted with
/// numbers first (numerically) then text (case-insensitive).
pub fn candidate_values(records: &[Record], column: &Column) -> Vec<String> {
  let mut values: Vec<Value> = Vec::new();
  for record in records {
    let value = column.value_of(record).into_owned();
    let Some(text) = value.to_text() else {
      continue;
    };
    let text = text.trim();
    if text.is_empty() || text == "N/A" {
      continue;
    }
    if !values.iter().any(|v| v.to_string() == text) {
      values.push(match value {
        Value::Number(_) | Value::Bool(_) => value,
        _ => Value::Text(text.to_string()),
      });
    }
  }

  values.sort_by(|a, b| match (a, b) {
    (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
    (Value::Number(_), _) => Ordering::Less,
    (_, Value::Number(_)) => Ordering::Greater,
    _ => {
      let (a, b) = (a.to_string(), b.to_string());
      a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(&b))
    }
  });
  values.iter().map(|v| v.to_string()).collect()
}

/// Multi-value checklist over a column's candidate values
#[derive(Debug, Clone)]
pub struct ValuePicker {
  column: String,
  candidates: Vec<String>,
  selected: Vec<String>,
  search: String,
}

impl ValuePicker {
  /// Open a picker, pre-selecting whatever the column's active filter holds
  pub fn new(
    column: impl Into<String>,
    candidates: Vec<String>,
    active: Option<&FilterCriterion>,
  ) -> Self {
    let selected = match active {
      Some(FilterCriterion::AnyOf(values)) => values.values().to_vec(),
      _ => Vec::new(),
    };
    Self {
      column: column.into(),
      candidates,
      selected,
      search: String::new(),
    }
  }

  pub fn column(&self) -> &str {
    &self.column
  }

  /// Replace candidates (master data arriving after open). Selection is kept.
  pub fn set_candidates(&mut self, candidates: Vec<String>) {
    self.candidates = candidates;
  }

  pub fn candidates(&self) -> &[String] {
    &self.candidates
  }

  pub fn search(&self) -> &str {
    &self.search
  }

  pub fn set_search(&mut self, term: impl Into<String>) {
    self.search = term.into();
  }

  /// Candidates matching the search term (case-insensitive contains)
  pub fn visible(&self) -> Vec<&str> {
    let needle = self.search.to_lowercase();
    self
      .candidates
      .iter()
      .filter(|c| needle.is_empty() || c.to_lowercase().contains(&needle))
      .map(String::as_str)
      .collect()
  }

  pub fn is_selected(&self, value: &str) -> bool {
    self.selected.iter().any(|v| v == value)
  }

  pub fn selected(&self) -> &[String] {
    &self.selected
  }

  pub fn toggle(&mut self, value: &str) {
    match self.selected.iter().position(|v| v == value) {
      Some(idx) => {
        self.selected.remove(idx);
      }
      None => self.selected.push(value.to_string()),
    }
  }

  /// Select every currently visible candidate
  pub fn select_all_visible(&mut self) {
    let visible: Vec<String> = self.visible().into_iter().map(str::to_string).collect();
    for value in visible {
      if !self.is_selected(&value) {
        self.selected.push(value);
      }
    }
  }

  /// Deselect every currently visible candidate
  pub fn clear_visible(&mut self) {
    let visible: Vec<String> = self.visible().into_iter().map(str::to_string).collect();
    self.selected.retain(|v| !visible.contains(v));
  }

  /// Report the selection; an empty selection removes the filter
  pub fn apply(&self) -> FilterChange {
    FilterChange::values(self.column.clone(), self.selected.clone())
  }

  pub fn clear(&mut self) -> FilterChange {
    self.selected.clear();
    FilterChange::remove(self.column.clone())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateMode {
  #[default]
  Single,
  Range,
}

/// Text field being edited in the date picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
  Single,
  From,
  To,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatePickerError {
  #[error("{0} date is required")]
  Missing(&'static str),
  #[error("{0} date must be YYYY-MM-DD")]
  Invalid(&'static str),
  #[error("start date is after end date")]
  Reversed,
}

/// Single-date or range input for a date column
#[derive(Debug, Clone)]
pub struct DatePicker {
  column: String,
  mode: DateMode,
  single: String,
  from: String,
  to: String,
}

impl DatePicker {
  /// Open a picker, pre-filled from the column's active date filter
  pub fn new(column: impl Into<String>, active: Option<&FilterCriterion>) -> Self {
    let mut picker = Self {
      column: column.into(),
      mode: DateMode::Single,
      single: String::new(),
      from: String::new(),
      to: String::new(),
    };
    match active {
      Some(FilterCriterion::Date(DateFilter::SingleDate(day))) => {
        picker.single = format_day(*day);
      }
      Some(FilterCriterion::Date(DateFilter::DateRange { from, to })) => {
        picker.mode = DateMode::Range;
        picker.from = format_day(*from);
        picker.to = format_day(*to);
      }
      _ => {}
    }
    picker
  }

  pub fn column(&self) -> &str {
    &self.column
  }

  pub fn mode(&self) -> DateMode {
    self.mode
  }

  pub fn set_mode(&mut self, mode: DateMode) {
    self.mode = mode;
  }

  /// Fields shown for the current mode, in tab order
  pub fn fields(&self) -> &'static [DateField] {
    match self.mode {
      DateMode::Single => &[DateField::Single],
      DateMode::Range => &[DateField::From, DateField::To],
    }
  }

  pub fn input(&self, field: DateField) -> &str {
    match field {
      DateField::Single => &self.single,
      DateField::From => &self.from,
      DateField::To => &self.to,
    }
  }

  pub fn set_input(&mut self, field: DateField, text: impl Into<String>) {
    let text = text.into();
    match field {
      DateField::Single => self.single = text,
      DateField::From => self.from = text,
      DateField::To => self.to = text,
    }
  }

  /// Validate the inputs of the current mode into a date filter
  pub fn build(&self) -> Result<DateFilter, DatePickerError> {
    match self.mode {
      DateMode::Single => Ok(DateFilter::SingleDate(parse_field(&self.single, "Selected")?)),
      DateMode::Range => {
        let from = parse_field(&self.from, "Start")?;
        let to = parse_field(&self.to, "End")?;
        if from > to {
          return Err(DatePickerError::Reversed);
        }
        Ok(DateFilter::DateRange { from, to })
      }
    }
  }

  pub fn apply(&self) -> Result<FilterChange, DatePickerError> {
    let filter = self.build()?;
    Ok(FilterChange::set(self.column.clone(), FilterCriterion::Date(filter)))
  }

  pub fn clear(&mut self) -> FilterChange {
    self.single.clear();
    self.from.clear();
    self.to.clear();
    FilterChange::remove(self.column.clone())
  }
}

fn parse_field(text: &str, label: &'static str) -> Result<chrono::NaiveDate, DatePickerError> {
  if text.trim().is_empty() {
    return Err(DatePickerError::Missing(label));
  }
  parse_day(text).ok_or(DatePickerError::Invalid(label))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grid::filter::ValueSet;
  use chrono::NaiveDate;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn picker() -> ValuePicker {
    ValuePicker::new(
      "industry",
      vec![
        "Banking".to_string(),
        "Healthcare".to_string(),
        "Retail".to_string(),
        "Retail Banking".to_string(),
      ],
      None,
    )
  }

  #[test]
  fn test_candidate_values_dedup_and_sort() {
    let column = Column::new("industry", "Industry");
    let records = vec![
      Record::new().with("industry", "retail"),
      Record::new().with("industry", "Banking"),
      Record::new().with("industry", "N/A"),
      Record::new().with("industry", ""),
      Record::new(),
      Record::new().with("industry", "Banking"),
      Record::new().with("industry", "Healthcare"),
    ];

    assert_eq!(
      candidate_values(&records, &column),
      vec!["Banking", "Healthcare", "retail"]
    );
  }

  #[test]
  fn test_candidate_values_numbers_first() {
    let column = Column::new("lead_score", "Score");
    let records = vec![
      Record::new().with("lead_score", 80i64),
      Record::new().with("lead_score", "high"),
      Record::new().with("lead_score", 9i64),
      Record::new().with("lead_score", 80i64),
    ];

    assert_eq!(candidate_values(&records, &column), vec!["9", "80", "high"]);
  }

  #[test]
  fn test_search_narrows_visible() {
    let mut picker = picker();
    picker.set_search("bank");
    assert_eq!(picker.visible(), vec!["Banking", "Retail Banking"]);
  }

  #[test]
  fn test_select_all_acts_on_visible_only() {
    let mut picker = picker();
    picker.toggle("Healthcare");
    picker.set_search("bank");
    picker.select_all_visible();

    assert_eq!(
      picker.selected(),
      &["Healthcare", "Banking", "Retail Banking"]
    );

    picker.clear_visible();
    assert_eq!(picker.selected(), &["Healthcare"]);
  }

  #[test]
  fn test_toggle_twice_deselects() {
    let mut picker = picker();
    picker.toggle("Retail");
    picker.toggle("Retail");
    assert!(picker.selected().is_empty());
  }

  #[test]
  fn test_apply_empty_selection_removes() {
    let picker = picker();
    assert_eq!(picker.apply(), FilterChange::remove("industry"));
  }

  #[test]
  fn test_apply_reports_selection() {
    let mut picker = picker();
    picker.toggle("Retail");
    let change = picker.apply();

    assert_eq!(change.column, "industry");
    assert_eq!(
      change.criterion,
      Some(FilterCriterion::AnyOf(
        ValueSet::new(vec!["Retail".into()]).unwrap()
      ))
    );
  }

  #[test]
  fn test_opens_with_active_selection() {
    let active = FilterCriterion::AnyOf(ValueSet::new(vec!["Banking".into()]).unwrap());
    let picker = ValuePicker::new("industry", Vec::new(), Some(&active));
    assert!(picker.is_selected("Banking"));
  }

  #[test]
  fn test_date_picker_single() {
    let mut picker = DatePicker::new("created_at", None);
    picker.set_input(DateField::Single, "2024-03-10");

    assert_eq!(
      picker.apply().unwrap(),
      FilterChange::set(
        "created_at",
        FilterCriterion::Date(DateFilter::SingleDate(day(2024, 3, 10)))
      )
    );
  }

  #[test]
  fn test_date_picker_refuses_bad_input() {
    let mut picker = DatePicker::new("created_at", None);
    assert_eq!(picker.build(), Err(DatePickerError::Missing("Selected")));

    picker.set_input(DateField::Single, "10/03/2024");
    assert_eq!(picker.build(), Err(DatePickerError::Invalid("Selected")));

    picker.set_mode(DateMode::Range);
    picker.set_input(DateField::From, "2024-02-01");
    assert_eq!(picker.build(), Err(DatePickerError::Missing("End")));

    picker.set_input(DateField::To, "2024-01-01");
    assert_eq!(picker.build(), Err(DatePickerError::Reversed));
  }

  #[test]
  fn test_date_picker_range_and_prefill() {
    let active = FilterCriterion::Date(DateFilter::DateRange {
      from: day(2024, 1, 1),
      to: day(2024, 1, 31),
    });
    let picker = DatePicker::new("created_at", Some(&active));

    assert_eq!(picker.mode(), DateMode::Range);
    assert_eq!(picker.input(DateField::From), "2024-01-01");
    assert_eq!(picker.input(DateField::To), "2024-01-31");
    assert_eq!(picker.build().unwrap().to_string(), "2024-01-01 to 2024-01-31");
  }

  #[test]
  fn test_date_picker_clear_removes() {
    let mut picker = DatePicker::new("created_at", None);
    picker.set_input(DateField::Single, "2024-03-10");
    assert_eq!(picker.clear(), FilterChange::remove("created_at"));
    assert_eq!(picker.input(DateField::Single), "");
  }
}
