//! Loosely-typed records as returned by the CRM backend.
//!
//! The backend returns plain JSON objects whose shape differs per entity
//! (lead, client, SOW, ...). The grid never assumes a schema: columns name
//! the fields they read and everything else is carried along untouched.

use serde::{Deserialize, Deserializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

static NULL: Value = Value::Null;

/// A single field value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
  #[default]
  Null,
  Text(String),
  Number(f64),
  Bool(bool),
}

impl Value {
  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null)
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::Text(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Value::Number(n) => Some(*n),
      _ => None,
    }
  }

  /// Stringified form used by search, filters and export.
  /// Returns `None` for null so callers can treat it as "no value".
  pub fn to_text(&self) -> Option<String> {
    if self.is_null() {
      None
    } else {
      Some(self.to_string())
    }
  }

  /// Case-insensitive substring test against an already-lowercased needle.
  pub fn contains_lowercase(&self, needle: &str) -> bool {
    match self.to_text() {
      Some(text) => text.to_lowercase().contains(needle),
      None => false,
    }
  }

  /// Value-typed ordering: numbers numerically, text lexically,
  /// false before true. Nulls sort after everything else; mixed types
  /// fall back to comparing their string forms.
  pub fn compare(&self, other: &Value) -> Ordering {
    match (self, other) {
      (Value::Null, Value::Null) => Ordering::Equal,
      (Value::Null, _) => Ordering::Greater,
      (_, Value::Null) => Ordering::Less,
      (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
      (Value::Text(a), Value::Text(b)) => a.cmp(b),
      (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
      (a, b) => a.to_string().cmp(&b.to_string()),
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Null => Ok(()),
      Value::Text(s) => f.write_str(s),
      // Whole numbers print without a trailing ".0"
      Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
      Value::Number(n) => write!(f, "{}", n),
      Value::Bool(b) => write!(f, "{}", b),
    }
  }
}

impl From<serde_json::Value> for Value {
  fn from(value: serde_json::Value) -> Self {
    match value {
      serde_json::Value::Null => Value::Null,
      serde_json::Value::Bool(b) => Value::Bool(b),
      serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
      serde_json::Value::String(s) => Value::Text(s),
      // Nested structures (attachments, stakeholders, ...) are kept as JSON text
      other => Value::Text(other.to_string()),
    }
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::Text(value.to_string())
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::Text(value)
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Value::Number(value)
  }
}

impl From<i64> for Value {
  fn from(value: i64) -> Self {
    Value::Number(value as f64)
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Value::Bool(value)
  }
}

/// One entity row (lead, client, opportunity, ...)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
  fields: BTreeMap<String, Value>,
}

impl Record {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builder-style field setter
  pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.fields.insert(key.into(), value.into());
    self
  }

  /// Get a field, or `Value::Null` when the record doesn't carry it
  pub fn get(&self, key: &str) -> &Value {
    self.fields.get(key).unwrap_or(&NULL)
  }

  /// Backend identifier used for delete calls and row keys
  pub fn id(&self) -> Option<String> {
    self.get("id").to_text().filter(|id| !id.is_empty())
  }

  pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.fields.iter().map(|(k, v)| (k.as_str(), v))
  }

  pub fn len(&self) -> usize {
    self.fields.len()
  }

  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }
}

impl<'de> Deserialize<'de> for Record {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let raw: BTreeMap<String, serde_json::Value> = BTreeMap::deserialize(deserializer)?;
    Ok(Self {
      fields: raw.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_deserialize_mixed_fields() {
    let record: Record = serde_json::from_str(
      r#"{"id": 7, "client_name": "Acme", "lead_score": 72.5, "active": true,
          "region": null, "attachments": [{"name": "a.pdf"}]}"#,
    )
    .unwrap();

    assert_eq!(record.id(), Some("7".to_string()));
    assert_eq!(record.get("client_name"), &Value::Text("Acme".into()));
    assert_eq!(record.get("lead_score"), &Value::Number(72.5));
    assert_eq!(record.get("active"), &Value::Bool(true));
    assert!(record.get("region").is_null());
    assert!(record.get("missing").is_null());
    assert!(record.get("attachments").as_str().unwrap().contains("a.pdf"));
  }

  #[test]
  fn test_display_whole_numbers() {
    assert_eq!(Value::Number(50000.0).to_string(), "50000");
    assert_eq!(Value::Number(12.5).to_string(), "12.5");
    assert_eq!(Value::Null.to_string(), "");
  }

  #[test]
  fn test_compare_numbers_numerically() {
    assert_eq!(Value::from(9i64).compare(&Value::from(10i64)), Ordering::Less);
    // Lexically "9" > "10", numerically it is not
    assert_eq!(Value::from("9").compare(&Value::from("10")), Ordering::Greater);
  }

  #[test]
  fn test_compare_nulls_last() {
    assert_eq!(Value::Null.compare(&Value::from("a")), Ordering::Greater);
    assert_eq!(Value::from(1i64).compare(&Value::Null), Ordering::Less);
    assert_eq!(Value::Null.compare(&Value::Null), Ordering::Equal);
  }

  #[test]
  fn test_contains_lowercase() {
    let value = Value::from("North America");
    assert!(value.contains_lowercase("america"));
    assert!(!value.contains_lowercase("europe"));
    assert!(!Value::Null.contains_lowercase(""));
  }

  #[test]
  fn test_empty_id_is_none() {
    assert_eq!(Record::new().with("id", "").id(), None);
    assert_eq!(Record::new().id(), None);
  }
}
