//! TTL cache for regions and countries with last-known-good fallback.

use super::clock::{Clock, SystemClock};
use super::fallback::{fallback_countries, fallback_regions};
use super::source::MasterDataSource;
use super::types::{Country, Region};
use chrono::{DateTime, Duration, Utc};
use color_eyre::Result;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// How long fetched master data stays fresh unless configured otherwise
pub const DEFAULT_TTL_MINUTES: i64 = 10;

struct Slot<T> {
  data: Arc<Vec<T>>,
  expires_at: DateTime<Utc>,
}

type SlotCell<T> = Mutex<Option<Slot<T>>>;

fn lock<T>(cell: &SlotCell<T>) -> MutexGuard<'_, Option<Slot<T>>> {
  // Slots hold plain data, a poisoned lock is still usable
  cell.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Cache for region and country lists.
///
/// Each list is served from memory until its slot expires, then re-fetched
/// from the source. The cache never hands out an empty list: an empty
/// backend response installs the built-in fallback data, and a failed fetch
/// serves the previous (stale) list or, with nothing cached yet, the
/// fallback data.
pub struct MasterDataCache<S, C = SystemClock> {
  source: S,
  clock: C,
  ttl: Duration,
  regions: SlotCell<Region>,
  countries: SlotCell<Country>,
}

impl<S: MasterDataSource> MasterDataCache<S, SystemClock> {
  pub fn new(source: S) -> Self {
    Self::with_clock(source, SystemClock, Duration::minutes(DEFAULT_TTL_MINUTES))
  }
}

impl<S: MasterDataSource, C: Clock> MasterDataCache<S, C> {
  pub fn with_clock(source: S, clock: C, ttl: Duration) -> Self {
    Self {
      source,
      clock,
      ttl,
      regions: Mutex::new(None),
      countries: Mutex::new(None),
    }
  }

  /// Set how long fetched data stays fresh
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }

  pub async fn regions(&self) -> Arc<Vec<Region>> {
    self
      .load(
        &self.regions,
        "regions",
        || self.source.fetch_regions(),
        fallback_regions,
      )
      .await
  }

  pub async fn countries(&self) -> Arc<Vec<Country>> {
    self
      .load(
        &self.countries,
        "countries",
        || self.source.fetch_countries(),
        fallback_countries,
      )
      .await
  }

  /// Region names in cache order, for dropdowns and filter candidates
  pub async fn region_names(&self) -> Vec<String> {
    self.regions().await.iter().map(|r| r.name.clone()).collect()
  }

  pub async fn country_names(&self) -> Vec<String> {
    self.countries().await.iter().map(|c| c.name.clone()).collect()
  }

  /// Countries whose region equals `region` exactly (case-sensitive)
  #[allow(dead_code)]
  pub async fn countries_by_region(&self, region: &str) -> Vec<Country> {
    self
      .countries()
      .await
      .iter()
      .filter(|c| c.region.as_deref() == Some(region))
      .cloned()
      .collect()
  }

  #[allow(dead_code)]
  pub async fn country_names_by_region(&self, region: &str) -> Vec<String> {
    self
      .countries_by_region(region)
      .await
      .into_iter()
      .map(|c| c.name)
      .collect()
  }

  /// Region of the country named exactly `country`
  pub async fn region_by_country(&self, country: &str) -> Option<String> {
    self
      .countries()
      .await
      .iter()
      .find(|c| c.name == country)
      .and_then(|c| c.region.clone())
  }

  /// Drop both lists; the next access fetches again
  pub fn clear(&self) {
    *lock(&self.regions) = None;
    *lock(&self.countries) = None;
    debug!("Master data cache cleared");
  }

  /// Fill both lists concurrently
  pub async fn warm(&self) {
    let (regions, countries) = futures::join!(self.regions(), self.countries());
    debug!(
      regions = regions.len(),
      countries = countries.len(),
      "Master data warmed"
    );
  }

  async fn load<T, F, Fut>(
    &self,
    cell: &SlotCell<T>,
    kind: &'static str,
    fetch: F,
    fallback: fn() -> Vec<T>,
  ) -> Arc<Vec<T>>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
  {
    let stale = {
      let slot = lock(cell);
      match slot.as_ref() {
        Some(slot) if self.clock.now() < slot.expires_at => return Arc::clone(&slot.data),
        Some(slot) => Some(Arc::clone(&slot.data)),
        None => None,
      }
    };

    match fetch().await {
      Ok(items) if !items.is_empty() => {
        debug!(kind, count = items.len(), "Fetched master data");
        self.store(cell, items)
      }
      Ok(_) => {
        warn!(kind, "Backend returned no master data, using built-in list");
        self.store(cell, fallback())
      }
      Err(e) => match stale {
        Some(data) => {
          warn!(kind, error = %e, "Master data fetch failed, serving stale list");
          data
        }
        None => {
          warn!(kind, error = %e, "Master data fetch failed, using built-in list");
          self.store(cell, fallback())
        }
      },
    }
  }

  fn store<T>(&self, cell: &SlotCell<T>, items: Vec<T>) -> Arc<Vec<T>> {
    let data = Arc::new(items);
    *lock(cell) = Some(Slot {
      data: Arc::clone(&data),
      expires_at: self
        .clock
        .now()
        .checked_add_signed(self.ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC),
    });
    data
  }
}
