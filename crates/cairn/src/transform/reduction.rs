//! Transitive reduction.

use crate::dag::Dag;
use rustc_hash::FxHashMap;

/// Removes every edge `(u, v)` for which some other direct successor of `u`
/// still reaches `v`. Metadata on surviving edges is untouched.
pub fn transitive_reduction(g: &mut Dag) {
    if g.node_count() == 0 {
        return;
    }

    let node_index: FxHashMap<String, usize> = g
        .node_ids()
        .enumerate()
        .map(|(i, id)| (id.to_string(), i))
        .collect();

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); node_index.len()];
    for e in g.edges() {
        if let (Some(&src), Some(&dst)) = (node_index.get(&e.from), node_index.get(&e.to)) {
            adjacency[src].push(dst);
        }
    }

    let reachable = compute_reachability(&adjacency);

    for e in g.edges().to_vec() {
        let (src, dst) = (node_index[&e.from], node_index[&e.to]);
        if adjacency[src]
            .iter()
            .any(|&mid| mid != dst && reachable[mid][dst])
        {
            g.remove_edge(&e.from, &e.to);
        }
    }
}

fn compute_reachability(adjacency: &[Vec<usize>]) -> Vec<Vec<bool>> {
    let n = adjacency.len();
    let mut reachable = vec![vec![false; n]; n];

    let mut stack: Vec<usize> = Vec::new();
    for source in 0..n {
        stack.push(source);
        while let Some(current) = stack.pop() {
            if reachable[source][current] {
                continue;
            }
            reachable[source][current] = true;
            stack.extend(&adjacency[current]);
        }
    }
    reachable
}
