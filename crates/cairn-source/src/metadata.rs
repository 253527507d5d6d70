//! Metadata providers: repository facts layered onto crawled nodes.
//!
//! Providers fill the `repo_*` keys the tower heuristics read. Enrichment is
//! strictly best-effort; a provider error never fails a crawl.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use crate::cache::Cache;
use crate::registry;
use crate::RepoInfo;
use cairn::Metadata;

pub const REPO_URL: &str = "repo_url";
pub const REPO_OWNER: &str = "repo_owner";
pub const REPO_STARS: &str = "repo_stars";
pub const REPO_ARCHIVED: &str = "repo_archived";
pub const REPO_LANGUAGE: &str = "repo_language";
pub const REPO_TOPICS: &str = "repo_topics";
pub const REPO_MAINTAINERS: &str = "repo_maintainers";
pub const REPO_LAST_COMMIT: &str = "repo_last_commit";
pub const REPO_LAST_RELEASE: &str = "repo_last_release";
pub const REPO_LICENSE: &str = "repo_license";

#[async_trait]
pub trait MetadataProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn enrich(&self, repo: &RepoInfo, refresh: bool) -> anyhow::Result<Metadata>;
}

/// Runs several providers in sequence and merges whatever they return,
/// dropping individual failures on the floor.
pub struct Composite {
    providers: Vec<Arc<dyn MetadataProvider>>,
}

impl Composite {
    pub fn new(providers: Vec<Arc<dyn MetadataProvider>>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl MetadataProvider for Composite {
    fn name(&self) -> &str {
        "composite"
    }

    async fn enrich(&self, repo: &RepoInfo, refresh: bool) -> anyhow::Result<Metadata> {
        let mut meta = Metadata::new();
        for provider in &self.providers {
            if let Ok(extra) = provider.enrich(repo, refresh).await {
                meta.extend(extra);
            }
        }
        Ok(meta)
    }
}

/// The URL hint keys worth checking first, in order.
const REPO_URL_KEYS: [&str; 4] = ["Source", "Repository", "Code", "Homepage"];

/// Picks an `owner/repo` pair out of a package's URL hints.
pub fn extract_repo_url(
    re: &Regex,
    project_urls: &std::collections::BTreeMap<String, String>,
    homepage: &str,
) -> Option<(String, String)> {
    for key in REPO_URL_KEYS {
        if let Some(url) = project_urls.get(key) {
            if let Some(found) = match_repo_url(re, url) {
                return Some(found);
            }
        }
    }
    for url in project_urls.values() {
        if let Some(found) = match_repo_url(re, url) {
            return Some(found);
        }
    }
    if !homepage.is_empty() {
        return match_repo_url(re, homepage);
    }
    None
}

fn match_repo_url(re: &Regex, url: &str) -> Option<(String, String)> {
    if url.contains("/sponsors/") {
        return None;
    }
    let caps = re.captures(url)?;
    let owner = caps.get(1)?.as_str().to_string();
    let repo = caps.get(2)?.as_str().trim_end_matches(".git").to_string();
    Some((owner, repo))
}

/// Repository metadata from the GitHub API.
pub struct GitHub {
    http: reqwest::Client,
    cache: Cache,
    token: Option<String>,
    url_re: Regex,
    api_base: String,
}

impl GitHub {
    pub fn new(token: Option<String>, cache_ttl: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            http: registry::http_client()?,
            cache: Cache::new(None, cache_ttl)?,
            token,
            url_re: Regex::new(r"github\.com[:/]([^/\s]+)/([^/\s#?]+)")
                .expect("repository URL pattern"),
            api_base: "https://api.github.com".to_string(),
        })
    }

    /// Points the provider at a different API root. For tests.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    async fn fetch_repo(
        &self,
        owner: &str,
        repo: &str,
        refresh: bool,
    ) -> Result<RepoDoc, registry::RegistryError> {
        let key = format!("github:{owner}/{repo}");
        let url = format!("{}/repos/{owner}/{repo}", self.api_base);
        let mut headers: Vec<(&str, String)> =
            vec![("Accept", "application/vnd.github+json".to_string())];
        if let Some(token) = &self.token {
            headers.push(("Authorization", format!("Bearer {token}")));
        }

        registry::fetch_with_cache(&self.cache, &key, refresh, || {
            registry::get_json(&self.http, &url, &headers)
        })
        .await
    }
}

#[async_trait]
impl MetadataProvider for GitHub {
    fn name(&self) -> &str {
        "github"
    }

    async fn enrich(&self, repo: &RepoInfo, refresh: bool) -> anyhow::Result<Metadata> {
        let Some((owner, name)) = extract_repo_url(&self.url_re, &repo.project_urls, &repo.home_page)
        else {
            return Ok(Metadata::new());
        };

        let doc = self.fetch_repo(&owner, &name, refresh).await?;

        let mut meta = Metadata::new();
        meta.insert(REPO_URL.to_string(), doc.html_url.clone().into());
        meta.insert(REPO_OWNER.to_string(), doc.owner.login.clone().into());
        meta.insert(REPO_STARS.to_string(), doc.stargazers_count.into());
        meta.insert(REPO_ARCHIVED.to_string(), doc.archived.into());
        if let Some(language) = &doc.language {
            meta.insert(REPO_LANGUAGE.to_string(), language.clone().into());
        }
        if !doc.topics.is_empty() {
            meta.insert(REPO_TOPICS.to_string(), doc.topics.clone().into());
        }
        if let Some(pushed_at) = &doc.pushed_at {
            let date = pushed_at.split('T').next().unwrap_or(pushed_at);
            meta.insert(REPO_LAST_COMMIT.to_string(), date.into());
        }
        if let Some(license) = doc.license.and_then(|l| l.spdx_id) {
            meta.insert(REPO_LICENSE.to_string(), license.into());
        }
        Ok(meta)
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct RepoDoc {
    html_url: String,
    owner: OwnerDoc,
    #[serde(default)]
    stargazers_count: i64,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    pushed_at: Option<String>,
    #[serde(default)]
    license: Option<LicenseDoc>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct OwnerDoc {
    login: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct LicenseDoc {
    #[serde(default)]
    spdx_id: Option<String>,
}
