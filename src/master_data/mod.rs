//! Region and country reference data.
//!
//! Entity pages and filter pickers read these lists through a shared
//! [`MasterDataCache`], which keeps them in memory for a configurable time
//! and falls back to a built-in dataset when the backend cannot help.

mod cache;
mod clock;
mod fallback;
mod source;
mod types;

pub use cache::{MasterDataCache, DEFAULT_TTL_MINUTES};
pub use clock::{Clock, SystemClock};
pub use fallback::{fallback_countries, fallback_regions};
pub use source::MasterDataSource;
pub use types::{Country, Region};
