//! Edge-crossing counters for pairs of ordered layers.
//!
//! The bilayer counter sorts edges by (upper, lower) position and sweeps a
//! Fenwick tree over lower positions, so a full count is O(|E| log |L|). The
//! index form operates on dense per-row integer permutations and reuses a
//! caller-owned workspace, which keeps the optimizer's hot loop free of
//! allocation.

use crate::dag::{pos_map, Dag};
use crate::order::RowOrders;
use rustc_hash::FxHashMap;

/// Scratch buffers for [`count_crossings_idx`], sized for the widest row.
#[derive(Debug)]
pub struct CrossingWorkspace {
    ft: Vec<usize>,
    pos: Vec<usize>,
}

impl CrossingWorkspace {
    pub fn new(max_width: usize) -> Self {
        Self {
            ft: vec![0; max_width + 2],
            pos: vec![0; max_width + 2],
        }
    }
}

/// Total crossings of a full layout: the sum over consecutive row pairs.
pub fn count_crossings(g: &Dag, orders: &RowOrders) -> usize {
    let mut crossings = 0;
    for (&row, upper) in orders {
        if let Some(lower) = orders.get(&(row + 1)) {
            crossings += count_layer_crossings(g, upper, lower);
        }
    }
    crossings
}

/// Number of edge-pair inversions between two ordered layers.
pub fn count_layer_crossings(g: &Dag, upper: &[String], lower: &[String]) -> usize {
    if upper.is_empty() || lower.is_empty() {
        return 0;
    }

    let lower_pos = pos_map(lower);

    let mut edges: Vec<(usize, usize)> = Vec::with_capacity(upper.len() * 2);
    for (i, node_id) in upper.iter().enumerate() {
        for child in g.children(node_id) {
            if let Some(&pos) = lower_pos.get(child.as_str()) {
                edges.push((i, pos));
            }
        }
    }
    if edges.len() < 2 {
        return 0;
    }

    edges.sort_unstable();

    let mut fenwick = vec![0usize; lower.len() + 1];
    let (mut crossings, mut total) = (0, 0);
    for (_, lower_idx) in edges {
        let mut less_or_equal = 0;
        let mut q = lower_idx + 1;
        while q > 0 {
            less_or_equal += fenwick[q];
            q -= q & q.wrapping_neg();
        }
        crossings += total - less_or_equal;

        total += 1;
        let mut idx = lower_idx + 1;
        while idx < fenwick.len() {
            fenwick[idx] += 1;
            idx += idx & idx.wrapping_neg();
        }
    }
    crossings
}

/// Index-form bilayer count. `edges[upper_idx]` lists the lower-row indices
/// adjacent to that upper node; the permutations map position to original
/// index. The workspace must be at least as wide as the lower row.
pub fn count_crossings_idx(
    edges: &[Vec<usize>],
    upper_perm: &[usize],
    lower_perm: &[usize],
    ws: &mut CrossingWorkspace,
) -> usize {
    if upper_perm.is_empty() || lower_perm.is_empty() {
        return 0;
    }

    for (pos, &orig_idx) in lower_perm.iter().enumerate() {
        ws.pos[orig_idx] = pos;
    }

    let limit = lower_perm.len() + 1;
    ws.ft[..limit].fill(0);

    let (mut crossings, mut total) = (0, 0);
    for &upper_idx in upper_perm {
        let targets = &edges[upper_idx];
        for &target_idx in targets {
            let target_pos = ws.pos[target_idx];
            let mut less_or_equal = 0;
            let mut q = target_pos + 1;
            while q > 0 {
                less_or_equal += ws.ft[q];
                q -= q & q.wrapping_neg();
            }
            crossings += total - less_or_equal;
        }

        for &target_idx in targets {
            let target_pos = ws.pos[target_idx];
            total += 1;
            let mut idx = target_pos + 1;
            while idx < limit {
                ws.ft[idx] += 1;
                idx += idx & idx.wrapping_neg();
            }
        }
    }
    crossings
}

/// Inversions contributed by the pair `(left, right)` in that order, counted
/// against the adjacent layer (parents if `use_parents`, else children).
pub fn count_pair_crossings(
    g: &Dag,
    left: &str,
    right: &str,
    adj_order: &[String],
    use_parents: bool,
) -> usize {
    count_pair_crossings_with_pos(g, left, right, &pos_map(adj_order), use_parents)
}

pub fn count_pair_crossings_with_pos(
    g: &Dag,
    left: &str,
    right: &str,
    adj_pos: &FxHashMap<&str, usize>,
    use_parents: bool,
) -> usize {
    let (lnbr, rnbr) = if use_parents {
        (g.parents(left), g.parents(right))
    } else {
        (g.children(left), g.children(right))
    };

    let mut crossings = 0;
    for ln in lnbr {
        let Some(&lp) = adj_pos.get(ln.as_str()) else {
            continue;
        };
        for rn in rnbr {
            if let Some(&rp) = adj_pos.get(rn.as_str()) {
                if lp > rp {
                    crossings += 1;
                }
            }
        }
    }
    crossings
}
