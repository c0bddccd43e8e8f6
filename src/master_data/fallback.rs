//! Built-in reference data used when the backend has none to offer.

use super::types::{Country, Region};

const REGIONS: &[&str] = &[
  "North America",
  "Europe",
  "Asia Pacific",
  "Latin America",
  "Middle East",
  "Africa",
];

const COUNTRIES: &[(&str, &str)] = &[
  ("United States", "North America"),
  ("Canada", "North America"),
  ("Mexico", "North America"),
  ("Germany", "Europe"),
  ("France", "Europe"),
  ("United Kingdom", "Europe"),
  ("Italy", "Europe"),
  ("Spain", "Europe"),
  ("Netherlands", "Europe"),
  ("Sweden", "Europe"),
  ("Norway", "Europe"),
  ("Denmark", "Europe"),
  ("Poland", "Europe"),
  ("Singapore", "Asia Pacific"),
  ("Japan", "Asia Pacific"),
  ("China", "Asia Pacific"),
  ("India", "Asia Pacific"),
  ("Australia", "Asia Pacific"),
  ("South Korea", "Asia Pacific"),
  ("Malaysia", "Asia Pacific"),
  ("Thailand", "Asia Pacific"),
  ("Indonesia", "Asia Pacific"),
  ("Philippines", "Asia Pacific"),
  ("Brazil", "Latin America"),
  ("Argentina", "Latin America"),
  ("Chile", "Latin America"),
  ("Colombia", "Latin America"),
  ("Peru", "Latin America"),
  ("Venezuela", "Latin America"),
  ("United Arab Emirates", "Middle East"),
  ("Saudi Arabia", "Middle East"),
  ("Israel", "Middle East"),
  ("Qatar", "Middle East"),
  ("Kuwait", "Middle East"),
  ("Oman", "Middle East"),
  ("South Africa", "Africa"),
  ("Egypt", "Africa"),
  ("Nigeria", "Africa"),
  ("Kenya", "Africa"),
  ("Morocco", "Africa"),
  ("Ghana", "Africa"),
];

/// Six regions, ids "1" through "6"
pub fn fallback_regions() -> Vec<Region> {
  REGIONS
    .iter()
    .enumerate()
    .map(|(i, name)| Region {
      id: (i + 1).to_string(),
      name: name.to_string(),
    })
    .collect()
}

/// Forty-one countries, each attached to one of the fallback regions
pub fn fallback_countries() -> Vec<Country> {
  COUNTRIES
    .iter()
    .enumerate()
    .map(|(i, (name, region))| Country {
      id: (i + 1).to_string(),
      name: name.to_string(),
      region: Some(region.to_string()),
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fallback_sizes() {
    assert_eq!(fallback_regions().len(), 6);
    assert_eq!(fallback_countries().len(), 41);
  }

  #[test]
  fn test_every_country_has_known_region() {
    let regions: Vec<String> = fallback_regions().into_iter().map(|r| r.name).collect();
    for country in fallback_countries() {
      let region = country.region.unwrap();
      assert!(regions.contains(&region), "{} -> {}", country.name, region);
    }
  }

  #[test]
  fn test_ids_are_sequential() {
    let countries = fallback_countries();
    assert_eq!(countries[0].id, "1");
    assert_eq!(countries[0].name, "United States");
    assert_eq!(countries[40].id, "41");
    assert_eq!(countries[40].name, "Ghana");
  }
}
