//! Averaging heuristic with transpose refinement.
//!
//! Rows are seeded in ID-sorted order and refined by alternating sweeps:
//! downward sweeps re-key each row by the mean of its parents' positions,
//! upward sweeps by the weighted median of its children's positions. Each
//! refined row then gets a transpose pass that swaps adjacent nodes whenever
//! that strictly lowers the crossings against both neighboring rows. The
//! best ordering seen across sweeps (including the ID-sorted baseline) is
//! what comes back, so the result never regresses against the baseline.

use crate::crossings::{count_crossings, count_pair_crossings_with_pos};
use crate::dag::{pos_map, Dag, Node};
use crate::order::{barycenter_deviation, init_orders, median_position, Orderer, RowOrders};
use rustc_hash::FxHashMap;

const DEFAULT_PASSES: usize = 24;

#[derive(Debug, Clone, Copy, Default)]
pub struct Barycentric {
    /// Number of sweeps; 0 means the default.
    pub passes: usize,
}

impl Orderer for Barycentric {
    fn order_rows(&self, g: &Dag) -> RowOrders {
        let mut orders = init_orders(g);
        let rows: Vec<usize> = orders.keys().copied().collect();
        if rows.len() < 2 {
            return orders;
        }

        let mut best = orders.clone();
        let mut best_crossings = count_crossings(g, &orders);
        let mut best_deviation = total_deviation(g, &orders);
        let mut prev_crossings = best_crossings;

        let passes = if self.passes == 0 {
            DEFAULT_PASSES
        } else {
            self.passes
        };

        for pass in 0..passes {
            let down = pass % 2 == 0;
            if down {
                for w in rows.windows(2) {
                    refine_row(g, &mut orders, w[1], w[0], true, false);
                }
            } else {
                for w in rows.windows(2).rev() {
                    refine_row(g, &mut orders, w[0], w[1], false, true);
                }
            }

            let crossings = count_crossings(g, &orders);
            let deviation = total_deviation(g, &orders);
            if crossings < best_crossings
                || (crossings == best_crossings && deviation < best_deviation)
            {
                best_crossings = crossings;
                best_deviation = deviation;
                best = orders.clone();
            }
            if crossings == prev_crossings {
                break;
            }
            prev_crossings = crossings;
        }

        best
    }
}

/// Total squared drift of every row from its parents' barycenters. Sweeps
/// that tie on crossings are ranked by this: the ordering closest to its own
/// averaging fixpoint gives the straightest edges.
fn total_deviation(g: &Dag, orders: &RowOrders) -> f64 {
    let mut total = 0.0;
    for (&row, ids) in orders {
        let Some(adj) = row.checked_sub(1).and_then(|r| orders.get(&r)) else {
            continue;
        };
        total += barycenter_deviation(g, ids, &pos_map(adj), true);
    }
    total
}

/// Re-keys one row against its adjacent row and sorts it, ties broken by ID
/// so runs are reproducible, then transposes.
fn refine_row(
    g: &Dag,
    orders: &mut RowOrders,
    row: usize,
    adj_row: usize,
    use_parents: bool,
    use_median: bool,
) {
    let Some(adj) = orders.get(&adj_row).cloned() else {
        return;
    };
    let adj_pos = adjacent_positions(g, &adj);

    let current = orders.get(&row).cloned().unwrap_or_default();
    let mut keyed: Vec<(f64, String)> = current
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let key = match g.node(id) {
                Some(node) => {
                    let positions = neighbor_positions(g, node, &adj_pos, use_parents);
                    if positions.is_empty() {
                        i as f64
                    } else if use_median {
                        median_position(&positions).unwrap_or(0) as f64
                    } else {
                        positions.iter().sum::<usize>() as f64 / positions.len() as f64
                    }
                }
                None => i as f64,
            };
            (key, id.clone())
        })
        .collect();

    keyed.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.1.cmp(&b.1))
    });

    orders.insert(row, keyed.into_iter().map(|(_, id)| id).collect());
    transpose(g, orders, row);
}

/// Positions in the adjacent row, keyed by node id and, where that leaves a
/// slot free, by effective id, so a subdivider chain one row over reads as
/// the same column as its master.
fn adjacent_positions<'a>(g: &'a Dag, adj: &'a [String]) -> FxHashMap<&'a str, usize> {
    let mut adj_pos = pos_map(adj);
    for (i, id) in adj.iter().enumerate() {
        if let Some(node) = g.node(id) {
            let eff = node.effective_id();
            if eff != id {
                adj_pos.entry(eff).or_insert(i);
            }
        }
    }
    adj_pos
}

/// Neighbor positions for the averaging key. Lookups go through the node's
/// effective id first, which keeps a chain gliding under its master's
/// column; chain members too deep for the master's own adjacency fall back
/// to their direct neighbors.
fn neighbor_positions(
    g: &Dag,
    node: &Node,
    adj_pos: &FxHashMap<&str, usize>,
    use_parents: bool,
) -> Vec<usize> {
    let effective = node.effective_id();
    let neighbors = if use_parents {
        g.parents(effective)
    } else {
        g.children(effective)
    };
    let mut positions: Vec<usize> = neighbors
        .iter()
        .filter_map(|n| adj_pos.get(n.as_str()).copied())
        .collect();

    if positions.is_empty() && node.is_synthetic() {
        let own = if use_parents {
            g.parents(&node.id)
        } else {
            g.children(&node.id)
        };
        positions = own
            .iter()
            .filter_map(|n| adj_pos.get(n.as_str()).copied())
            .collect();
    }
    positions
}

/// Local refinement: walk the row left to right and swap each adjacent pair
/// whenever the swap strictly lowers its crossings against both neighboring
/// rows, until a full pass changes nothing.
pub fn transpose(g: &Dag, orders: &mut RowOrders, row: usize) {
    let up = row
        .checked_sub(1)
        .and_then(|r| orders.get(&r))
        .cloned();
    let down = orders.get(&(row + 1)).cloned();
    let up_pos = up.as_deref().map(pos_map);
    let down_pos = down.as_deref().map(pos_map);

    let Some(mut ids) = orders.get(&row).cloned() else {
        return;
    };

    let pair_cost = |left: &str, right: &str| {
        let mut cost = 0;
        if let Some(pos) = &up_pos {
            cost += count_pair_crossings_with_pos(g, left, right, pos, true);
        }
        if let Some(pos) = &down_pos {
            cost += count_pair_crossings_with_pos(g, left, right, pos, false);
        }
        cost
    };

    loop {
        let mut improved = false;
        for i in 0..ids.len().saturating_sub(1) {
            let current = pair_cost(&ids[i], &ids[i + 1]);
            let swapped = pair_cost(&ids[i + 1], &ids[i]);
            if swapped < current {
                ids.swap(i, i + 1);
                improved = true;
            }
        }
        if !improved {
            break;
        }
    }

    orders.insert(row, ids);
}
