//! Position helpers shared by the orderers.

use crate::dag::Dag;
use rustc_hash::FxHashMap;

/// The weighted median of a set of neighbor positions: the left median for
/// even counts, the middle element for odd counts. `None` when there are no
/// positions.
pub fn median_position(pos: &[usize]) -> Option<usize> {
    if pos.is_empty() {
        return None;
    }
    let mut sorted = pos.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();
    if n % 2 == 0 {
        Some(sorted[n / 2 - 1])
    } else {
        Some(sorted[n / 2])
    }
}

/// Sum of squared distances between each node's index and the barycenter of
/// its neighbors in the adjacent layer. Measures how far a row sits from its
/// own averaging fixpoint; the heuristic uses it to rank orderings that tie
/// on crossings, and lower means straighter edges.
pub fn barycenter_deviation(
    g: &Dag,
    row: &[String],
    adj_pos: &FxHashMap<&str, usize>,
    use_parents: bool,
) -> f64 {
    let mut deviation = 0.0;
    for (i, id) in row.iter().enumerate() {
        let Some(node) = g.node(id) else {
            continue;
        };
        let neighbors = if use_parents {
            g.parents(node.effective_id())
        } else {
            g.children(node.effective_id())
        };

        let (mut sum, mut count) = (0usize, 0usize);
        for neighbor in neighbors {
            if let Some(&pos) = adj_pos.get(neighbor.as_str()) {
                sum += pos;
                count += 1;
            }
        }

        if count > 0 {
            let barycenter = sum as f64 / count as f64;
            let delta = i as f64 - barycenter;
            deviation += delta * delta;
        }
    }
    deviation
}
