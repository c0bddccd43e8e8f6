use super::types::{Country, Region};
use color_eyre::Result;
use std::future::Future;

/// Backend the master data cache fills itself from
pub trait MasterDataSource: Send + Sync {
  fn fetch_regions(&self) -> impl Future<Output = Result<Vec<Region>>> + Send;

  fn fetch_countries(&self) -> impl Future<Output = Result<Vec<Country>>> + Send;
}
