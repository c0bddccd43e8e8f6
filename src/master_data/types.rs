use serde::{Deserialize, Serialize};

/// Geographic region as used by region columns and filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
  pub id: String,
  pub name: String,
}

/// Country, optionally attached to a region by region name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
  pub id: String,
  pub name: String,
  pub region: Option<String>,
}
