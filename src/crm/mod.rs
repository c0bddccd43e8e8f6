//! CRM backend access: entity kinds, their column layouts, and the REST client.

mod api_types;
mod client;
pub mod columns;
mod error;
mod types;

pub use client::CrmClient;
pub use types::EntityKind;
