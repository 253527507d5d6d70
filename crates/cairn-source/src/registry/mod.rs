//! Package-registry HTTP clients.

mod crates_io;

pub use crates_io::{CrateInfo, CratesIoClient};

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::Cache;
use crate::retry::retry_with_backoff;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "cairn/0.1 (+https://github.com/cairn-viz/cairn)";

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status {status} for {url}")]
    Status { status: u16, url: String },
}

impl RegistryError {
    /// Transport failures and server errors are worth another attempt;
    /// missing resources and malformed bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            RegistryError::Network(err) => !err.is_decode(),
            RegistryError::Status { status, .. } => *status >= 500,
            RegistryError::NotFound(_) => false,
        }
    }
}

pub(crate) fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
}

pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    headers: &[(&str, String)],
) -> Result<T, RegistryError> {
    let mut req = client.get(url);
    for (name, value) in headers {
        req = req.header(*name, value.as_str());
    }

    let resp = req.send().await?;
    let status = resp.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(RegistryError::NotFound(url.to_string()));
    }
    if !status.is_success() {
        return Err(RegistryError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(resp.json().await?)
}

/// Cache-then-fetch discipline shared by the registry clients: serve a fresh
/// cache hit, otherwise fetch with backoff and write the result back.
/// Expired entries fall through to the fetch.
pub(crate) async fn fetch_with_cache<T, F, Fut>(
    cache: &Cache,
    key: &str,
    refresh: bool,
    fetch: F,
) -> Result<T, RegistryError>
where
    T: Serialize + DeserializeOwned,
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, RegistryError>>,
{
    if !refresh {
        if let Ok(Some(value)) = cache.get::<T>(key) {
            return Ok(value);
        }
    }

    let value = retry_with_backoff(fetch, RegistryError::is_retryable).await?;
    if let Err(err) = cache.set(key, &value) {
        tracing::debug!(key, error = %err, "cache write failed");
    }
    Ok(value)
}
