use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use cairn::Metadata;
use cairn_source::metadata::{extract_repo_url, Composite};
use cairn_source::{CrateInfo, MetadataProvider, PackageInfo, RepoInfo};
use regex::Regex;
use serde_json::json;

fn github_re() -> Regex {
    Regex::new(r"github\.com[:/]([^/\s]+)/([^/\s#?]+)").unwrap()
}

fn urls(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn source_key_wins_over_other_urls() {
    let got = extract_repo_url(
        &github_re(),
        &urls(&[
            ("Homepage", "https://github.com/other/home"),
            ("Source", "https://github.com/rust-lang/cargo"),
        ]),
        "",
    );
    assert_eq!(got, Some(("rust-lang".to_string(), "cargo".to_string())));
}

#[test]
fn falls_back_to_any_url_then_homepage() {
    let got = extract_repo_url(
        &github_re(),
        &urls(&[("Docs", "https://github.com/tokio-rs/tokio")]),
        "",
    );
    assert_eq!(got, Some(("tokio-rs".to_string(), "tokio".to_string())));

    let got = extract_repo_url(&github_re(), &BTreeMap::new(), "https://github.com/serde-rs/serde");
    assert_eq!(got, Some(("serde-rs".to_string(), "serde".to_string())));
}

#[test]
fn git_suffix_is_stripped_and_sponsors_skipped() {
    let got = extract_repo_url(
        &github_re(),
        &urls(&[("Repository", "https://github.com/dtolnay/anyhow.git")]),
        "",
    );
    assert_eq!(got, Some(("dtolnay".to_string(), "anyhow".to_string())));

    let got = extract_repo_url(
        &github_re(),
        &urls(&[("Funding", "https://github.com/sponsors/dtolnay")]),
        "",
    );
    assert_eq!(got, None);
}

#[test]
fn non_github_urls_yield_nothing() {
    let got = extract_repo_url(
        &github_re(),
        &urls(&[("Repository", "https://gitlab.com/a/b")]),
        "https://example.com",
    );
    assert_eq!(got, None);
}

struct StaticProvider(&'static str, serde_json::Value);

#[async_trait]
impl MetadataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn enrich(&self, _repo: &RepoInfo, _refresh: bool) -> anyhow::Result<Metadata> {
        let mut meta = Metadata::new();
        meta.insert(self.0.to_string(), self.1.clone());
        Ok(meta)
    }
}

struct NeverProvider;

#[async_trait]
impl MetadataProvider for NeverProvider {
    fn name(&self) -> &str {
        "never"
    }

    async fn enrich(&self, _repo: &RepoInfo, _refresh: bool) -> anyhow::Result<Metadata> {
        anyhow::bail!("offline")
    }
}

#[tokio::test]
async fn composite_merges_and_tolerates_failures() {
    let composite = Composite::new(vec![
        Arc::new(StaticProvider("repo_stars", json!(10))),
        Arc::new(NeverProvider),
        Arc::new(StaticProvider("repo_owner", json!("octo"))),
    ]);

    let meta = composite
        .enrich(&RepoInfo::default(), false)
        .await
        .unwrap();

    assert_eq!(meta.get("repo_stars"), Some(&json!(10)));
    assert_eq!(meta.get("repo_owner"), Some(&json!("octo")));
}

#[test]
fn crate_info_exposes_the_package_surface() {
    let info = CrateInfo {
        name: "serde".to_string(),
        version: "1.0.200".to_string(),
        dependencies: vec!["serde_derive".to_string()],
        repository: "https://github.com/serde-rs/serde".to_string(),
        home_page: "https://serde.rs".to_string(),
        description: "serialization framework".to_string(),
        license: "MIT OR Apache-2.0".to_string(),
        downloads: 9000,
    };

    assert_eq!(info.name(), "serde");
    assert_eq!(info.dependencies(), &["serde_derive".to_string()]);

    let meta = info.to_metadata();
    assert_eq!(meta.get("version"), Some(&json!("1.0.200")));
    assert_eq!(meta.get("downloads"), Some(&json!(9000)));

    let repo = info.repo_info();
    assert_eq!(repo.manifest_file, "Cargo.toml");
    assert_eq!(
        repo.project_urls.get("Repository"),
        Some(&"https://github.com/serde-rs/serde".to_string())
    );
    assert_eq!(
        extract_repo_url(&github_re(), &repo.project_urls, &repo.home_page),
        Some(("serde-rs".to_string(), "serde".to_string()))
    );
}
