//! Longest-path layer assignment.

use std::collections::VecDeque;

use crate::dag::Dag;
use rustc_hash::FxHashMap;

/// Assigns `row(v) = max over predecessors u of row(u) + 1` via a Kahn
/// traversal. Sources land on row 0 and every node's row equals the length
/// of its longest path from a source.
pub fn assign_layers(g: &mut Dag) {
    let mut in_degree: FxHashMap<String, usize> = FxHashMap::default();
    let mut rows: FxHashMap<String, usize> = FxHashMap::default();
    let mut queue: VecDeque<String> = VecDeque::new();

    for node in g.nodes() {
        let degree = g.in_degree(&node.id);
        in_degree.insert(node.id.clone(), degree);
        rows.insert(node.id.clone(), 0);
        if degree == 0 {
            queue.push_back(node.id.clone());
        }
    }

    while let Some(curr) = queue.pop_front() {
        let next_row = rows[&curr] + 1;
        for child in g.children(&curr).to_vec() {
            let row = rows.entry(child.clone()).or_insert(0);
            if next_row > *row {
                *row = next_row;
            }
            let degree = in_degree.entry(child.clone()).or_insert(0);
            *degree = degree.saturating_sub(1);
            if *degree == 0 {
                queue.push_back(child);
            }
        }
    }

    g.set_rows(&rows);
}
