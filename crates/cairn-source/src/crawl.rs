//! Concurrent dependency-graph crawler.
//!
//! A fixed worker pool drains a bounded jobs channel and posts fetch results
//! to a single handler. All shared state (the graph under construction, the
//! visited set, the pending metadata, and the in-flight counter) sits behind
//! one mutex, taken briefly around each mutation.
//!
//! Termination discipline: a job's in-flight slot is reserved before its
//! submit returns, the handler releases its own slot only after spawning any
//! dependency submitter, and that submitter holds an extra slot until it has
//! enqueued everything. The crawl is done exactly when the counter returns
//! to zero; that transition is the only completion signal.

use std::future::Future;
use std::sync::{Arc, Mutex};

use cairn::{Dag, Edge, Metadata, Node};
use rustc_hash::FxHashSet;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

use crate::metadata::MetadataProvider;
use crate::PackageInfo;

pub const DEFAULT_MAX_DEPTH: usize = 50;
pub const DEFAULT_MAX_NODES: usize = 5000;
const NUM_WORKERS: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("fetch root package {name}: {source}")]
    Root {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Default)]
pub struct CrawlOptions {
    /// Dependency depth cap; 0 means the default.
    pub max_depth: usize,
    /// Fetched-package cap; 0 means the default.
    pub max_nodes: usize,
    /// Bypass registry caches.
    pub refresh: bool,
    pub metadata_providers: Vec<Arc<dyn MetadataProvider>>,
}

impl CrawlOptions {
    fn with_defaults(mut self) -> Self {
        if self.max_depth == 0 {
            self.max_depth = DEFAULT_MAX_DEPTH;
        }
        if self.max_nodes == 0 {
            self.max_nodes = DEFAULT_MAX_NODES;
        }
        self
    }
}

#[derive(Debug, Clone)]
struct Job {
    name: String,
    depth: usize,
}

struct FetchResult<T> {
    name: String,
    depth: usize,
    outcome: anyhow::Result<T>,
}

#[derive(Default)]
struct Shared {
    g: Dag,
    visited: FxHashSet<String>,
    meta: Vec<(String, Metadata)>,
    inflight: i64,
    fetched: usize,
}

struct Crawler<T> {
    opts: CrawlOptions,
    shared: Arc<Mutex<Shared>>,
    jobs_tx: mpsc::Sender<Job>,
    done_tx: watch::Sender<bool>,
    submitters: JoinSet<()>,
    _marker: std::marker::PhantomData<T>,
}

/// Builds the dependency graph rooted at `root` by calling `fetch` for every
/// reachable package. A failing root fetch aborts the crawl; any other fetch
/// failure is logged and its subtree skipped.
pub async fn crawl<T, F, Fut>(root: &str, opts: CrawlOptions, fetch: F) -> Result<Dag, CrawlError>
where
    T: PackageInfo,
    F: Fn(String, bool) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send,
{
    let opts = opts.with_defaults();
    let refresh = opts.refresh;

    let (jobs_tx, jobs_rx) = mpsc::channel::<Job>(NUM_WORKERS * 2);
    let jobs_rx = Arc::new(tokio::sync::Mutex::new(jobs_rx));
    let (results_tx, mut results_rx) = mpsc::channel::<FetchResult<T>>(NUM_WORKERS * 2);
    let (done_tx, mut done_rx) = watch::channel(false);

    let fetch = Arc::new(fetch);
    let mut workers: JoinSet<()> = JoinSet::new();
    for _ in 0..NUM_WORKERS {
        let jobs_rx = Arc::clone(&jobs_rx);
        let results_tx = results_tx.clone();
        let fetch = Arc::clone(&fetch);
        workers.spawn(async move {
            loop {
                let job = {
                    let mut rx = jobs_rx.lock().await;
                    rx.recv().await
                };
                let Some(job) = job else { break };
                let outcome = (fetch)(job.name.clone(), refresh).await;
                let result = FetchResult {
                    name: job.name,
                    depth: job.depth,
                    outcome,
                };
                if results_tx.send(result).await.is_err() {
                    break;
                }
            }
        });
    }
    drop(results_tx);

    let mut crawler = Crawler::<T> {
        opts,
        shared: Arc::new(Mutex::new(Shared::default())),
        jobs_tx,
        done_tx,
        submitters: JoinSet::new(),
        _marker: std::marker::PhantomData,
    };

    crawler
        .submit(Job {
            name: root.to_string(),
            depth: 0,
        })
        .await;

    let outcome = loop {
        tokio::select! {
            result = results_rx.recv() => {
                let Some(result) = result else { break Ok(()) };
                if let Err(err) = crawler.handle_result(result, root).await {
                    break Err(err);
                }
            }
            _ = done_rx.changed() => break Ok(()),
        }
    };

    // Close the jobs channel and let the pool drain before touching the
    // graph exclusively.
    let Crawler {
        shared,
        jobs_tx,
        submitters,
        ..
    } = crawler;
    drop(jobs_tx);
    drop(submitters);
    while workers.join_next().await.is_some() {}

    outcome?;

    let mut s = shared.lock().expect("crawler state mutex");
    let pending = std::mem::take(&mut s.meta);
    for (id, meta) in pending {
        if let Some(node) = s.g.node_mut(&id) {
            node.meta = meta;
        }
    }
    Ok(std::mem::take(&mut s.g))
}

impl<T: PackageInfo> Crawler<T> {
    async fn submit(&self, job: Job) -> bool {
        submit_job(&self.shared, &self.jobs_tx, &self.done_tx, job).await
    }

    fn adjust_inflight(&self, delta: i64) {
        adjust_inflight(&self.shared, &self.done_tx, delta);
    }

    async fn handle_result(
        &mut self,
        result: FetchResult<T>,
        root: &str,
    ) -> Result<(), CrawlError> {
        let outcome = match result.outcome {
            Err(source) if result.name == root => Err(CrawlError::Root {
                name: result.name.clone(),
                source,
            }),
            Err(source) => {
                tracing::warn!(package = %result.name, error = %source, "fetch failed; skipping subtree");
                Ok(())
            }
            Ok(info) => {
                self.add_node(&result.name, &info).await;
                self.submit_dependencies(&result.name, result.depth, &info);
                Ok(())
            }
        };
        self.adjust_inflight(-1);
        outcome
    }

    async fn add_node(&self, name: &str, info: &T) {
        {
            let mut s = self.shared.lock().expect("crawler state mutex");
            let _ = s.g.add_node(Node::new(name, 0));
            s.fetched += 1;
        }

        let meta = self.enrich_metadata(info).await;
        if !meta.is_empty() {
            let mut s = self.shared.lock().expect("crawler state mutex");
            s.meta.push((name.to_string(), meta));
        }
    }

    /// Providers run sequentially within one result; enrichment failures are
    /// logged and skipped.
    async fn enrich_metadata(&self, info: &T) -> Metadata {
        let mut meta = info.to_metadata();
        if self.opts.metadata_providers.is_empty() {
            return meta;
        }
        let repo = info.repo_info();
        for provider in &self.opts.metadata_providers {
            match provider.enrich(&repo, self.opts.refresh).await {
                Ok(extra) => meta.extend(extra),
                Err(err) => {
                    tracing::warn!(
                        package = info.name(),
                        provider = provider.name(),
                        error = %err,
                        "metadata enrichment failed",
                    );
                }
            }
        }
        meta
    }

    fn submit_dependencies(&mut self, name: &str, depth: usize, info: &T) {
        if depth >= self.opts.max_depth {
            return;
        }
        let deps = info.dependencies();
        if deps.is_empty() {
            return;
        }

        let mut to_submit = Vec::new();
        {
            let mut s = self.shared.lock().expect("crawler state mutex");
            let fetched = s.fetched;
            for dep in deps {
                let _ = s.g.add_node(Node::new(dep.clone(), 0));
                let _ = s.g.add_edge(Edge::new(name, dep.clone()));
                if fetched < self.opts.max_nodes {
                    to_submit.push(Job {
                        name: dep.clone(),
                        depth: depth + 1,
                    });
                }
            }
        }
        if to_submit.is_empty() {
            return;
        }

        // Reserve a slot for the submitter task before it exists, so the
        // counter cannot hit zero while jobs are still on their way in.
        self.adjust_inflight(1);

        let shared = Arc::clone(&self.shared);
        let jobs_tx = self.jobs_tx.clone();
        let done_tx = self.done_tx.clone();
        self.submitters.spawn(async move {
            for job in to_submit {
                submit_job(&shared, &jobs_tx, &done_tx, job).await;
            }
            adjust_inflight(&shared, &done_tx, -1);
        });
    }
}

/// Marks the job visited and reserves its in-flight slot before enqueueing,
/// so the done edge cannot fire while the job is between queues.
async fn submit_job(
    shared: &Mutex<Shared>,
    jobs_tx: &mpsc::Sender<Job>,
    done_tx: &watch::Sender<bool>,
    job: Job,
) -> bool {
    {
        let mut s = shared.lock().expect("crawler state mutex");
        if s.visited.contains(&job.name) {
            return false;
        }
        s.visited.insert(job.name.clone());
        s.inflight += 1;
    }

    if jobs_tx.send(job).await.is_err() {
        adjust_inflight(shared, done_tx, -1);
        return false;
    }
    true
}

fn adjust_inflight(shared: &Mutex<Shared>, done_tx: &watch::Sender<bool>, delta: i64) {
    let is_done = {
        let mut s = shared.lock().expect("crawler state mutex");
        s.inflight += delta;
        s.inflight == 0
    };
    if is_done {
        let _ = done_tx.send(true);
    }
}
