//! Dependency-graph sources for cairn.
//!
//! The crawler is generic over anything that can tell it a package's name,
//! version, and dependency names; registry clients (crates.io) provide such
//! packages over HTTP with disk caching and retry, and metadata providers
//! annotate the resulting nodes with repository facts.

pub mod cache;
pub mod crawl;
pub mod metadata;
pub mod registry;
pub mod retry;

pub use cache::{Cache, CacheError};
pub use crawl::{crawl, CrawlError, CrawlOptions, DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES};
pub use metadata::{Composite, GitHub, MetadataProvider};
pub use registry::{CrateInfo, CratesIoClient, RegistryError};

use std::collections::BTreeMap;
use std::time::Duration;

use cairn::Metadata;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Hints for locating a package's repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoInfo {
    pub name: String,
    pub version: String,
    pub project_urls: BTreeMap<String, String>,
    pub home_page: String,
    pub manifest_file: String,
}

/// What the crawler needs to know about a fetched package.
pub trait PackageInfo: Send + Sync + 'static {
    fn name(&self) -> &str;
    fn version(&self) -> &str;
    fn dependencies(&self) -> &[String];
    fn to_metadata(&self) -> Metadata;
    fn repo_info(&self) -> RepoInfo;
}
