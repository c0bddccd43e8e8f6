//! Wire shapes of the master data endpoints.
//!
//! Stored master data has drifted over time: names appear as `name` or
//! `region_name`/`country_name`, and ids as strings or numbers. Everything
//! is normalized here so the rest of the crate only sees [`Region`] and
//! [`Country`].

use crate::master_data::{Country, Region};
use serde::{Deserialize, Deserializer};

/// Accept `"7"` or `7` for an id
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<serde_json::Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(serde_json::Value::String(s)) => Some(s),
    Some(serde_json::Value::Number(n)) => Some(n.to_string()),
    _ => None,
  })
}

#[derive(Debug, Deserialize)]
pub struct ApiRegion {
  #[serde(default, deserialize_with = "string_or_number")]
  pub id: Option<String>,
  pub name: Option<String>,
  pub region_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiCountry {
  #[serde(default, deserialize_with = "string_or_number")]
  pub id: Option<String>,
  pub name: Option<String>,
  pub country_name: Option<String>,
  pub region: Option<String>,
  pub region_name: Option<String>,
}

fn first_non_empty(a: Option<String>, b: Option<String>) -> Option<String> {
  a.filter(|s| !s.trim().is_empty())
    .or_else(|| b.filter(|s| !s.trim().is_empty()))
}

impl ApiRegion {
  /// `None` when the entry carries no usable name
  pub fn normalize(self) -> Option<Region> {
    let name = first_non_empty(self.name, self.region_name)?;
    Some(Region {
      id: self.id.unwrap_or_else(|| name.clone()),
      name,
    })
  }
}

impl ApiCountry {
  pub fn normalize(self) -> Option<Country> {
    let name = first_non_empty(self.name, self.country_name)?;
    Some(Country {
      id: self.id.unwrap_or_else(|| name.clone()),
      name,
      region: first_non_empty(self.region, self.region_name),
    })
  }
}

pub fn normalize_regions(raw: Vec<ApiRegion>) -> Vec<Region> {
  raw.into_iter().filter_map(ApiRegion::normalize).collect()
}

pub fn normalize_countries(raw: Vec<ApiCountry>) -> Vec<Country> {
  raw.into_iter().filter_map(ApiCountry::normalize).collect()
}
