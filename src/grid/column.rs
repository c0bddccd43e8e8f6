use super::record::{Record, Value};
use std::borrow::Cow;

/// Formats a cell for display. Receives the raw value and the whole row.
pub type RenderFn = fn(&Value, &Record) -> String;

/// Derives a column value from one or more fields of the row.
pub type AccessorFn = fn(&Record) -> Value;

/// Decides which filter UI a column gets and where its candidate values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnKind {
  /// Multi-value filter over values found in the data
  #[default]
  Text,
  /// Single-date or date-range filter
  Date,
  /// Multi-value filter over the master region list
  Region,
  /// Multi-value filter over the master country list
  Country,
}

/// Column definition, declared by the page that owns the grid
#[derive(Debug, Clone)]
pub struct Column {
  pub key: &'static str,
  pub header: &'static str,
  pub filterable: bool,
  pub kind: ColumnKind,
  render: Option<RenderFn>,
  accessor: Option<AccessorFn>,
}

impl Column {
  pub const fn new(key: &'static str, header: &'static str) -> Self {
    Self {
      key,
      header,
      filterable: false,
      kind: ColumnKind::Text,
      render: None,
      accessor: None,
    }
  }

  pub const fn filterable(mut self) -> Self {
    self.filterable = true;
    self
  }

  pub const fn kind(mut self, kind: ColumnKind) -> Self {
    self.kind = kind;
    self
  }

  pub const fn render(mut self, render: RenderFn) -> Self {
    self.render = Some(render);
    self
  }

  pub const fn derived(mut self, accessor: AccessorFn) -> Self {
    self.accessor = Some(accessor);
    self
  }

  /// Raw value of this column for a row (used for search, sort, filter, export)
  pub fn value_of<'a>(&self, record: &'a Record) -> Cow<'a, Value> {
    match self.accessor {
      Some(accessor) => Cow::Owned(accessor(record)),
      None => Cow::Borrowed(record.get(self.key)),
    }
  }

  /// Display string for a cell; `render` overrides the raw value
  pub fn display(&self, record: &Record) -> String {
    let value = self.value_of(record);
    match self.render {
      Some(render) => render(&value, record),
      None => value.to_string(),
    }
  }
}

/// Look up the value of `key` for a row, going through the column definition
/// when there is one so derived columns resolve the same way everywhere.
pub fn value_for<'a>(columns: &[Column], key: &str, record: &'a Record) -> Cow<'a, Value> {
  match columns.iter().find(|c| c.key == key) {
    Some(column) => column.value_of(record),
    None => Cow::Borrowed(record.get(key)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn contact(record: &Record) -> Value {
    let email = record.get("contact_email").to_text().unwrap_or_default();
    let phone = record.get("contact_phone").to_text().unwrap_or_default();
    Value::Text(format!("{} {}", email, phone).trim().to_string())
  }

  fn shout(value: &Value, _row: &Record) -> String {
    value.to_string().to_uppercase()
  }

  #[test]
  fn test_render_overrides_display_not_value() {
    let column = Column::new("region", "Region").render(shout);
    let record = Record::new().with("region", "Europe");

    assert_eq!(column.display(&record), "EUROPE");
    assert_eq!(column.value_of(&record).as_ref(), &Value::from("Europe"));
  }

  #[test]
  fn test_derived_column() {
    let column = Column::new("contact_details", "Contact").derived(contact);
    let record = Record::new().with("contact_email", "a@b.com");

    assert_eq!(column.value_of(&record).as_ref(), &Value::from("a@b.com"));
  }

  #[test]
  fn test_value_for_unknown_column_reads_field() {
    let columns = [Column::new("name", "Name")];
    let record = Record::new().with("stage", "Proposal");

    assert_eq!(
      value_for(&columns, "stage", &record).as_ref(),
      &Value::from("Proposal")
    );
  }
}
