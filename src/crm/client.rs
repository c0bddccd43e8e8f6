use super::api_types::{normalize_countries, normalize_regions, ApiCountry, ApiRegion};
use super::error::ApiError;
use super::types::EntityKind;
use crate::config::Config;
use crate::grid::Record;
use crate::master_data::{Country, MasterDataSource, Region};
use color_eyre::{eyre::eyre, Result};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// HTTP request timeout
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// CRM REST client.
/// Clone is cheap, reqwest::Client shares its connection pool.
#[derive(Clone)]
pub struct CrmClient {
  client: Client,
  base: Url,
  token: Option<String>,
}

impl CrmClient {
  pub fn new(config: &Config) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Self::with_client(client, &config.backend.url, Config::get_api_token())
  }

  fn with_client(client: Client, base_url: &str, token: Option<String>) -> Result<Self> {
    let base = Url::parse(base_url.trim())
      .map_err(|e| eyre!("Invalid backend url '{}': {}", base_url, e))?;
    if base.cannot_be_a_base() {
      return Err(eyre!("Backend url '{}' cannot be used as a base", base_url));
    }
    Ok(Self {
      client,
      base,
      token,
    })
  }

  /// Host name shown in the header
  pub fn host(&self) -> &str {
    self.base.host_str().unwrap_or("localhost")
  }

  /// Base URL with `segments` appended (each one percent-encoded)
  fn url(&self, segments: &[&str]) -> Result<Url> {
    let mut url = self.base.clone();
    url
      .path_segments_mut()
      .map_err(|_| eyre!("Backend url cannot be used as a base"))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  fn request(&self, method: Method, url: Url) -> RequestBuilder {
    let builder = self.client.request(method, url);
    match &self.token {
      Some(token) => builder.bearer_auth(token),
      None => builder,
    }
  }

  async fn check_response(response: Response) -> Result<Response> {
    if response.status().is_success() {
      Ok(response)
    } else {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      Err(ApiError::from_status(status, &body).into())
    }
  }

  async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
    let url = self.url(segments)?;
    debug!(%url, "GET");

    let response = self
      .request(Method::GET, url.clone())
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?;

    Self::check_response(response)
      .await?
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse response from {}: {}", url, e))
  }

  /// Fetch a whole entity collection
  pub async fn list_records(&self, entity: EntityKind) -> Result<Vec<Record>> {
    let records: Vec<Record> = self.get_json(&[entity.endpoint()]).await?;
    info!(entity = entity.command(), count = records.len(), "Fetched records");
    Ok(records)
  }

  /// Delete one record by backend id
  pub async fn delete_record(&self, entity: EntityKind, id: &str) -> Result<()> {
    let url = self.url(&[entity.endpoint(), id])?;
    debug!(%url, "DELETE");

    let response = self
      .request(Method::DELETE, url.clone())
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?;
    Self::check_response(response).await?;

    info!(entity = entity.command(), id, "Deleted record");
    Ok(())
  }

  pub async fn get_regions(&self) -> Result<Vec<Region>> {
    let raw: Vec<ApiRegion> = self.get_json(&["master", "regions"]).await?;
    Ok(normalize_regions(raw))
  }

  pub async fn get_countries(&self) -> Result<Vec<Country>> {
    let raw: Vec<ApiCountry> = self.get_json(&["master", "countries"]).await?;
    Ok(normalize_countries(raw))
  }
}

impl MasterDataSource for CrmClient {
  async fn fetch_regions(&self) -> Result<Vec<Region>> {
    self.get_regions().await
  }

  async fn fetch_countries(&self) -> Result<Vec<Country>> {
    self.get_countries().await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(base: &str) -> CrmClient {
    CrmClient::with_client(Client::new(), base, None).unwrap()
  }

  #[test]
  fn test_url_keeps_base_path() {
    let crm = client("https://crm.example.com/api");
    assert_eq!(
      crm.url(&["leads"]).unwrap().as_str(),
      "https://crm.example.com/api/leads"
    );

    let crm = client("https://crm.example.com/api/");
    assert_eq!(
      crm.url(&["master", "regions"]).unwrap().as_str(),
      "https://crm.example.com/api/master/regions"
    );
  }

  #[test]
  fn test_url_encodes_ids() {
    let crm = client("http://localhost:8000/api");
    assert_eq!(
      crm.url(&["users", "a b/c"]).unwrap().as_str(),
      "http://localhost:8000/api/users/a%20b%2Fc"
    );
  }

  #[test]
  fn test_host() {
    assert_eq!(client("http://10.0.0.5:8000/api").host(), "10.0.0.5");
  }

  #[test]
  fn test_rejects_bad_url() {
    assert!(CrmClient::with_client(Client::new(), "not a url", None).is_err());
    assert!(CrmClient::with_client(Client::new(), "mailto:sales@example.com", None).is_err());
  }
}
