//! Exhaustive row-permutation search with branch-and-bound pruning.
//!
//! The graph is flattened to dense indices per row so the inner loop counts
//! crossings over integer arrays with a reused workspace. The DFS descends
//! row by row; the crossing total of the rows fixed so far is a lower bound
//! for every completion, so a branch meeting the best-known score is cut.
//! The barycentric ordering seeds both the best-known score and the first
//! DFS path, which makes early pruning tight, and is also the fallback when
//! the timeout expires.

use std::fmt;
use std::time::{Duration, Instant};

use crate::crossings::{count_crossings_idx, CrossingWorkspace};
use crate::dag::{pos_map, Dag};
use crate::order::{init_orders, Barycentric, Orderer, RowOrders};

/// Callback reporting `(explored, pruned, best_score)`. Invoked periodically
/// during the search and once after it ends, so the final report always
/// matches the returned ordering.
pub type ProgressFn = Box<dyn Fn(u64, u64, i64) + Send + Sync>;

#[derive(Default)]
pub struct OptimalSearch {
    /// Wall-clock bound; when it elapses the best ordering found so far is
    /// returned. `None` searches to completion.
    pub timeout: Option<Duration>,
    pub progress: Option<ProgressFn>,
}

impl fmt::Debug for OptimalSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimalSearch")
            .field("timeout", &self.timeout)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl Orderer for OptimalSearch {
    fn order_rows(&self, g: &Dag) -> RowOrders {
        self.order_rows_with_cancel(g, &|| false)
    }
}

impl OptimalSearch {
    /// Cancellation-aware form: `cancel` is polled during the search and a
    /// true return unwinds it, yielding the best ordering found so far.
    pub fn order_rows_with_cancel(&self, g: &Dag, cancel: &dyn Fn() -> bool) -> RowOrders {
        let base_orders = init_orders(g);
        if base_orders.is_empty() {
            return base_orders;
        }

        let rows: Vec<usize> = base_orders.keys().copied().collect();
        let base: Vec<Vec<String>> = rows.iter().map(|r| base_orders[r].clone()).collect();
        let index_of: Vec<_> = base.iter().map(|ids| pos_map(ids)).collect();

        // Dense adjacency between each pair of neighboring rows.
        let edges_down: Vec<Vec<Vec<usize>>> = (0..rows.len().saturating_sub(1))
            .map(|i| {
                let mut adj = vec![Vec::new(); base[i].len()];
                if rows[i + 1] == rows[i] + 1 {
                    for (ui, id) in base[i].iter().enumerate() {
                        for child in g.children(id) {
                            if let Some(&li) = index_of[i + 1].get(child.as_str()) {
                                adj[ui].push(li);
                            }
                        }
                        adj[ui].sort_unstable();
                    }
                }
                adj
            })
            .collect();

        let max_width = base.iter().map(Vec::len).max().unwrap_or(0);
        let mut ws = CrossingWorkspace::new(max_width);

        // Barycentric seed: initial best and first DFS path.
        let seed_orders = Barycentric::default().order_rows(g);
        let seed: Vec<Vec<usize>> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| match seed_orders.get(r) {
                Some(ids) => ids
                    .iter()
                    .filter_map(|id| index_of[i].get(id.as_str()).copied())
                    .collect(),
                None => (0..base[i].len()).collect(),
            })
            .collect();

        let mut seed_score = 0;
        for i in 1..seed.len() {
            seed_score += count_crossings_idx(&edges_down[i - 1], &seed[i - 1], &seed[i], &mut ws);
        }

        let deadline = self.timeout.map(|t| Instant::now() + t);
        let mut search = Search {
            edges_down: &edges_down,
            seed: &seed,
            ws,
            best_perms: seed.clone(),
            best_score: seed_score,
            explored: 0,
            pruned: 0,
            deadline,
            cancel,
            progress: self.progress.as_deref(),
            last_report: Instant::now(),
            ticks: 0,
            stop: false,
        };

        let mut perms: Vec<Vec<usize>> = Vec::with_capacity(rows.len());
        search.dfs(0, 0, &mut perms, &base);

        if let Some(report) = search.progress {
            report(search.explored, search.pruned, search.best_score as i64);
        }

        rows.iter()
            .enumerate()
            .map(|(i, &r)| {
                let ids = search.best_perms[i]
                    .iter()
                    .map(|&idx| base[i][idx].clone())
                    .collect();
                (r, ids)
            })
            .collect()
    }
}

struct Search<'a> {
    edges_down: &'a [Vec<Vec<usize>>],
    seed: &'a [Vec<usize>],
    ws: CrossingWorkspace,
    best_perms: Vec<Vec<usize>>,
    best_score: usize,
    explored: u64,
    pruned: u64,
    deadline: Option<Instant>,
    cancel: &'a dyn Fn() -> bool,
    progress: Option<&'a (dyn Fn(u64, u64, i64) + Send + Sync)>,
    last_report: Instant,
    ticks: u32,
    stop: bool,
}

const STOP_CHECK_MASK: u32 = 0xff;
const REPORT_INTERVAL: Duration = Duration::from_millis(20);

impl Search<'_> {
    fn dfs(&mut self, depth: usize, cost: usize, perms: &mut Vec<Vec<usize>>, base: &[Vec<String>]) {
        if depth == base.len() {
            self.explored += 1;
            if cost < self.best_score {
                self.best_score = cost;
                self.best_perms = perms.clone();
            }
            self.maybe_report();
            return;
        }

        let seed_perm = self.seed[depth].clone();
        let width = base[depth].len();
        let rest = crate::perm::Permutations::new(width).filter(|p| *p != seed_perm);
        let candidates = std::iter::once(seed_perm.clone()).chain(rest);

        for perm in candidates {
            if self.should_stop() {
                return;
            }

            let added = if depth > 0 {
                count_crossings_idx(
                    &self.edges_down[depth - 1],
                    &perms[depth - 1],
                    &perm,
                    &mut self.ws,
                )
            } else {
                0
            };
            let cost = cost + added;
            if cost >= self.best_score {
                self.pruned += 1;
                self.maybe_report();
                continue;
            }

            self.explored += 1;
            perms.push(perm);
            self.dfs(depth + 1, cost, perms, base);
            perms.pop();
            if self.stop {
                return;
            }
        }
    }

    fn should_stop(&mut self) -> bool {
        if self.stop {
            return true;
        }
        self.ticks = self.ticks.wrapping_add(1);
        if self.ticks & STOP_CHECK_MASK == 0 {
            let expired = self.deadline.is_some_and(|d| Instant::now() >= d);
            if expired || (self.cancel)() {
                self.stop = true;
            }
        }
        self.stop
    }

    fn maybe_report(&mut self) {
        let Some(report) = self.progress else {
            return;
        };
        if self.last_report.elapsed() >= REPORT_INTERVAL {
            report(self.explored, self.pruned, self.best_score as i64);
            self.last_report = Instant::now();
        }
    }
}
