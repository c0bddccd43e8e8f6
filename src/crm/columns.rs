//! Column layouts for each entity list.

use crate::grid::dates::display_date;
use crate::grid::{Column, ColumnKind, Record, Value};

fn date(value: &Value, _row: &Record) -> String {
  value
    .to_text()
    .map(|text| display_date(&text))
    .unwrap_or_else(|| "N/A".to_string())
}

fn or_na(value: &Value, _row: &Record) -> String {
  match value.to_text() {
    Some(text) if !text.trim().is_empty() => text,
    _ => "N/A".to_string(),
  }
}

/// Numbers may also arrive as numeric text
fn number(value: &Value) -> Option<f64> {
  value
    .as_f64()
    .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn percent(value: &Value, _row: &Record) -> String {
  match number(value) {
    Some(n) => format!("{}%", n),
    None => "N/A".to_string(),
  }
}

fn score(value: &Value, _row: &Record) -> String {
  let Some(score) = number(value) else {
    return "N/A".to_string();
  };
  let band = if score >= 70.0 {
    "high"
  } else if score >= 40.0 {
    "med"
  } else {
    "low"
  };
  format!("{} ({})", score, band)
}

fn money(value: &Value, row: &Record) -> String {
  let Some(amount) = number(value) else {
    return "N/A".to_string();
  };
  let currency = row.get("currency").to_text().unwrap_or_else(|| "USD".to_string());
  format!("{} {:.0}", currency, amount)
}

fn list(value: &Value, _row: &Record) -> String {
  // Arrays arrive as JSON text
  match value.as_str().map(serde_json::from_str::<Vec<String>>) {
    Some(Ok(items)) => items.join(", "),
    _ => value.to_string(),
  }
}

/// Stored contact details, or email and phone joined
fn contact_details(row: &Record) -> Value {
  if let Some(details) = row.get("contact_details").to_text() {
    if !details.trim().is_empty() {
      return Value::Text(details);
    }
  }
  let email = row.get("contact_email").to_text().unwrap_or_default();
  let phone = row.get("contact_phone").to_text().unwrap_or_default();
  let joined = format!("{} {}", email, phone).trim().to_string();
  if joined.is_empty() {
    Value::Null
  } else {
    Value::Text(joined)
  }
}

pub const LEADS: &[Column] = &[
  Column::new("task_id", "Lead ID").render(or_na),
  Column::new("client_name", "Client / Account Name").filterable(),
  Column::new("opportunity_name", "Opportunity Name").filterable(),
  Column::new("lead_score", "Lead Score").render(score),
  Column::new("lead_owner", "Lead Owner").filterable(),
  Column::new("sales_poc", "Lead Assignee").filterable(),
  Column::new("lead_status", "Lead Status").filterable(),
  Column::new("region", "Region")
    .filterable()
    .kind(ColumnKind::Region),
  Column::new("country", "Country")
    .filterable()
    .kind(ColumnKind::Country),
  Column::new("industry", "Industry").filterable(),
  Column::new("probability", "Probability (%)").render(percent),
  Column::new("created_at", "Created Date")
    .filterable()
    .kind(ColumnKind::Date)
    .render(date),
];

pub const CLIENTS: &[Column] = &[
  Column::new("client_name", "Client Name").filterable(),
  Column::new("created_at", "Date")
    .filterable()
    .kind(ColumnKind::Date)
    .render(date),
  Column::new("contact_details", "Contact Details")
    .filterable()
    .derived(contact_details),
  Column::new("region", "Region")
    .filterable()
    .kind(ColumnKind::Region),
  Column::new("country", "Country")
    .filterable()
    .kind(ColumnKind::Country),
  Column::new("service_type", "Service Type").render(list),
  Column::new("client_tier", "Tier").filterable(),
  Column::new("client_status", "Status").filterable(),
];

pub const OPPORTUNITIES: &[Column] = &[
  Column::new("task_id", "Opportunity ID").render(or_na),
  Column::new("created_at", "Date")
    .filterable()
    .kind(ColumnKind::Date)
    .render(date),
  Column::new("client_name", "Client").filterable(),
  Column::new("opportunity_name", "Opportunity").filterable(),
  Column::new("deal_value", "Deal Value").render(money),
  Column::new("probability_percent", "Probability").render(percent),
  Column::new("industry", "Industry").filterable(),
  Column::new("region", "Region")
    .filterable()
    .kind(ColumnKind::Region),
  Column::new("solution", "Solution").filterable(),
  Column::new("stage", "Stage").filterable(),
  Column::new("expected_closure_date", "Expected Closure")
    .filterable()
    .kind(ColumnKind::Date)
    .render(date),
  Column::new("sales_owner", "Sales Owner").filterable(),
];

pub const SOWS: &[Column] = &[
  Column::new("created_at", "Date")
    .filterable()
    .kind(ColumnKind::Date)
    .render(date),
  Column::new("client_name", "Client").filterable(),
  Column::new("project_name", "Project").filterable(),
  Column::new("sow_title", "SOW Title"),
  Column::new("sow_type", "Type").filterable(),
  Column::new("start_date", "Start")
    .filterable()
    .kind(ColumnKind::Date)
    .render(date),
  Column::new("end_date", "End")
    .filterable()
    .kind(ColumnKind::Date)
    .render(date),
  Column::new("value", "Value").render(money),
  Column::new("billing_type", "Billing").filterable(),
  Column::new("status", "Status").filterable(),
  Column::new("owner", "Owner").filterable(),
];

pub const PARTNERS: &[Column] = &[
  Column::new("name", "Partner Name").filterable(),
  Column::new("created_at", "Date")
    .filterable()
    .kind(ColumnKind::Date)
    .render(date),
  Column::new("partner_type", "Type").filterable(),
  Column::new("category", "Category").filterable(),
  Column::new("region", "Region")
    .filterable()
    .kind(ColumnKind::Region),
  Column::new("status", "Status").filterable(),
];

pub const EMPLOYEES: &[Column] = &[
  Column::new("full_name", "Full Name").filterable(),
  Column::new("email", "Email Address"),
  Column::new("role", "Access Role").filterable(),
  Column::new("assigned_regions", "Assigned Regions").render(list),
  Column::new("status", "Status").filterable(),
  Column::new("created_at", "Date")
    .filterable()
    .kind(ColumnKind::Date)
    .render(date),
];

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grid::column::value_for;

  fn column(columns: &[Column], key: &str) -> Column {
    columns.iter().find(|c| c.key == key).cloned().unwrap()
  }

  #[test]
  fn test_keys_are_unique_per_entity() {
    for columns in [LEADS, CLIENTS, OPPORTUNITIES, SOWS, PARTNERS, EMPLOYEES] {
      let mut keys: Vec<&str> = columns.iter().map(|c| c.key).collect();
      keys.sort();
      keys.dedup();
      assert_eq!(keys.len(), columns.len());
    }
  }

  #[test]
  fn test_contact_details_derived_from_email_and_phone() {
    let row = Record::new()
      .with("contact_email", "ops@acme.test")
      .with("contact_phone", "+1 555 0100");
    assert_eq!(
      value_for(CLIENTS, "contact_details", &row).as_ref(),
      &Value::from("ops@acme.test +1 555 0100")
    );

    let stored = Record::new().with("contact_details", "call Bob");
    assert_eq!(
      value_for(CLIENTS, "contact_details", &stored).as_ref(),
      &Value::from("call Bob")
    );
    assert!(value_for(CLIENTS, "contact_details", &Record::new()).is_null());
  }

  #[test]
  fn test_renderers() {
    let row = Record::new()
      .with("created_at", "2024-05-02T10:00:00")
      .with("lead_score", 72i64)
      .with("probability", 40i64)
      .with("task_id", Value::Null);

    assert_eq!(column(LEADS, "created_at").display(&row), "02-05-2024");
    assert_eq!(column(LEADS, "lead_score").display(&row), "72 (high)");
    assert_eq!(column(LEADS, "probability").display(&row), "40%");
    assert_eq!(column(LEADS, "task_id").display(&row), "N/A");
  }

  #[test]
  fn test_list_and_money() {
    let row: Record = serde_json::from_str(
      r#"{"service_type": ["Cloud", "Data"], "value": 125000, "currency": "EUR"}"#,
    )
    .unwrap();

    assert_eq!(column(CLIENTS, "service_type").display(&row), "Cloud, Data");
    assert_eq!(column(SOWS, "value").display(&row), "EUR 125000");
  }

  #[test]
  fn test_missing_numbers_render_na() {
    let empty = Record::new()
      .with("lead_score", Value::Null)
      .with("probability", "n/a");
    assert_eq!(column(LEADS, "lead_score").display(&empty), "N/A");
    assert_eq!(column(LEADS, "probability").display(&empty), "N/A");
    assert_eq!(column(SOWS, "value").display(&empty), "N/A");

    let text = Record::new().with("probability", "65");
    assert_eq!(column(LEADS, "probability").display(&text), "65%");
  }
}
