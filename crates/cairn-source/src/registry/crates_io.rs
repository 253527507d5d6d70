//! crates.io client.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{fetch_with_cache, get_json, http_client, RegistryError};
use crate::cache::Cache;
use crate::{PackageInfo, RepoInfo};
use cairn::Metadata;

const BASE_URL: &str = "https://crates.io/api/v1";

/// A crate at its newest published version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub dependencies: Vec<String>,
    pub repository: String,
    pub home_page: String,
    pub description: String,
    pub license: String,
    pub downloads: u64,
}

pub struct CratesIoClient {
    http: reqwest::Client,
    cache: Cache,
    base_url: String,
}

impl CratesIoClient {
    pub fn new(cache_ttl: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            http: http_client()?,
            cache: Cache::new(None, cache_ttl)?,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Points the client at a different API root. For tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn fetch_crate(&self, name: &str, refresh: bool) -> Result<CrateInfo, RegistryError> {
        let key = format!("crates:{name}");
        fetch_with_cache(&self.cache, &key, refresh, || self.fetch_uncached(name)).await
    }

    async fn fetch_uncached(&self, name: &str) -> Result<CrateInfo, RegistryError> {
        let url = format!("{}/crates/{name}", self.base_url);
        let data: CrateResponse = get_json(&self.http, &url, &[]).await?;

        // A missing dependency listing degrades to a leaf crate rather than
        // failing the whole fetch.
        let dependencies = self
            .fetch_dependencies(name, &data.krate.max_version)
            .await
            .unwrap_or_default();

        Ok(CrateInfo {
            name: data.krate.name,
            version: data.krate.max_version,
            dependencies,
            repository: data.krate.repository.unwrap_or_default(),
            home_page: data.krate.homepage.unwrap_or_default(),
            description: data.krate.description.unwrap_or_default(),
            license: data.krate.license.unwrap_or_default(),
            downloads: data.krate.downloads,
        })
    }

    async fn fetch_dependencies(
        &self,
        name: &str,
        version: &str,
    ) -> Result<Vec<String>, RegistryError> {
        let url = format!("{}/crates/{name}/{version}/dependencies", self.base_url);
        let data: DepsResponse = get_json(&self.http, &url, &[]).await?;

        Ok(data
            .dependencies
            .into_iter()
            .filter(|d| d.kind == "normal" && !d.optional)
            .map(|d| d.crate_id)
            .collect())
    }
}

impl PackageInfo for CrateInfo {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    fn to_metadata(&self) -> Metadata {
        let mut meta = Metadata::new();
        meta.insert("version".to_string(), self.version.clone().into());
        if !self.description.is_empty() {
            meta.insert("description".to_string(), self.description.clone().into());
        }
        if !self.license.is_empty() {
            meta.insert("license".to_string(), self.license.clone().into());
        }
        if self.downloads > 0 {
            meta.insert("downloads".to_string(), self.downloads.into());
        }
        meta
    }

    fn repo_info(&self) -> RepoInfo {
        let mut urls = BTreeMap::new();
        if !self.repository.is_empty() {
            urls.insert("Repository".to_string(), self.repository.clone());
        }
        if !self.home_page.is_empty() {
            urls.insert("Homepage".to_string(), self.home_page.clone());
        }
        RepoInfo {
            name: self.name.clone(),
            version: self.version.clone(),
            project_urls: urls,
            home_page: self.home_page.clone(),
            manifest_file: "Cargo.toml".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CrateResponse {
    #[serde(rename = "crate")]
    krate: CrateData,
}

#[derive(Debug, Deserialize)]
struct CrateData {
    name: String,
    max_version: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    license: Option<String>,
    #[serde(default)]
    repository: Option<String>,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    downloads: u64,
}

#[derive(Debug, Deserialize)]
struct DepsResponse {
    #[serde(default)]
    dependencies: Vec<DependencyDoc>,
}

#[derive(Debug, Deserialize)]
struct DependencyDoc {
    crate_id: String,
    kind: String,
    #[serde(default)]
    optional: bool,
}
