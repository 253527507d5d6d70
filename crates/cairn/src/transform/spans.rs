//! Span-overlap resolution.
//!
//! A parent whose children all sit in the next row covers the index interval
//! of those children (its span, in the row's ID-sorted order). Where two or
//! more spans cover the same gap, the parents' skirts would overlap; an
//! auxiliary separator row is inserted between them and the contested edges
//! are routed through it.

use std::collections::BTreeSet;

use crate::dag::{node_pos_map, Dag, Edge, Node, NodeKind};
use rustc_hash::{FxHashMap, FxHashSet};

pub fn resolve_span_overlaps(g: &mut Dag) {
    let mut used: FxHashSet<String> = g.node_ids().map(str::to_string).collect();
    let mut row = 1;
    while row <= g.max_row() {
        while insert_separator_at(g, row, &mut used) {}
        row += 1;
    }
}

/// One resolution step for `row`: find the overlapping ranges, shift the row
/// (and everything below it) down, and place one separator per range.
/// Returns whether anything changed.
fn insert_separator_at(g: &mut Dag, row: usize, used: &mut FxHashSet<String>) -> bool {
    let children = g.nodes_in_row(row);
    if children.len() < 2 {
        return false;
    }
    if children.iter().any(|n| n.is_subdivider()) {
        return false;
    }

    let mut sorted: Vec<String> = children.iter().map(|n| n.id.clone()).collect();
    sorted.sort();

    let ranges = find_overlapping_spans(g, row, &sorted);
    if ranges.is_empty() {
        return false;
    }

    shift_rows_down(g, row);
    for r in ranges {
        insert_separator(g, row, &sorted, r, used);
    }
    true
}

#[derive(Debug, Clone, Copy)]
struct Span {
    lo: usize,
    hi: usize,
}

fn find_overlapping_spans(g: &Dag, row: usize, sorted: &[String]) -> Vec<Span> {
    if sorted.len() < 2 {
        return Vec::new();
    }

    let sorted_nodes: Vec<&Node> = sorted.iter().filter_map(|id| g.node(id)).collect();
    let child_pos = node_pos_map(&sorted_nodes);
    let mut overlap_counts = vec![0usize; sorted.len() - 1];

    for parent in g.nodes_in_row(row - 1) {
        if !eligible_for_separation(g, parent, row) {
            continue;
        }

        let indices: Vec<usize> = g
            .children(&parent.id)
            .iter()
            .filter_map(|id| child_pos.get(id.as_str()).copied())
            .collect();
        if indices.len() < 2 {
            continue;
        }

        let (min_idx, max_idx) = (
            *indices.iter().min().expect("non-empty"),
            *indices.iter().max().expect("non-empty"),
        );
        for (i, count) in overlap_counts
            .iter_mut()
            .enumerate()
            .take(max_idx)
            .skip(min_idx)
        {
            if can_insert_between(&sorted_nodes, i) {
                *count += 1;
            }
        }
    }

    collect_ranges(&overlap_counts)
}

/// A parent takes part only when it has at least two children, all of them
/// in the target row, none of them subdividers.
fn eligible_for_separation(g: &Dag, parent: &Node, target_row: usize) -> bool {
    let children = g.children_in_row(&parent.id, target_row);
    if children.len() < 2 || children.len() != g.out_degree(&parent.id) {
        return false;
    }
    !children
        .iter()
        .any(|id| g.node(id).is_some_and(Node::is_subdivider))
}

/// A contiguous subdivider pair sharing a master is one visual column; never
/// split it.
fn can_insert_between(children: &[&Node], i: usize) -> bool {
    if i + 1 >= children.len() {
        return true;
    }
    let (left, right) = (children[i], children[i + 1]);
    if !left.is_subdivider() || !right.is_subdivider() {
        return true;
    }
    left.master_id.is_none() || left.master_id != right.master_id
}

/// Collapses runs of gaps covered by two or more spans into maximal child
/// index ranges.
fn collect_ranges(overlap_counts: &[usize]) -> Vec<Span> {
    let mut ranges = Vec::new();
    let mut i = 0;
    while i < overlap_counts.len() {
        if overlap_counts[i] >= 2 {
            let start = i;
            while i < overlap_counts.len() && overlap_counts[i] >= 2 {
                i += 1;
            }
            ranges.push(Span { lo: start, hi: i });
        } else {
            i += 1;
        }
    }
    ranges
}

fn shift_rows_down(g: &mut Dag, from_row: usize) {
    let new_rows: FxHashMap<String, usize> = g
        .nodes()
        .map(|n| {
            let row = if n.row >= from_row { n.row + 1 } else { n.row };
            (n.id.clone(), row)
        })
        .collect();
    g.set_rows(&new_rows);
}

/// Places one auxiliary separator at `row` and routes the contested skirt
/// through it. Every parent with an edge into the range is rerouted
/// wholesale so no partially-routed parent is left straddling the new row.
fn insert_separator(g: &mut Dag, row: usize, sorted: &[String], span: Span, used: &mut FxHashSet<String>) {
    let separator_id = unique_id(row, &sorted[span.lo], &sorted[span.hi], used);
    g.add_node(Node {
        id: separator_id.clone(),
        row,
        kind: NodeKind::Auxiliary,
        ..Default::default()
    })
    .expect("generated id is unique");

    let in_range: FxHashSet<&str> = sorted[span.lo..=span.hi]
        .iter()
        .map(String::as_str)
        .collect();

    let mut parents: BTreeSet<String> = BTreeSet::new();
    for e in g.edges() {
        if g.node(&e.from).is_some_and(|n| n.row + 1 == row) && in_range.contains(e.to.as_str()) {
            parents.insert(e.from.clone());
        }
    }

    let mut children: BTreeSet<String> = BTreeSet::new();
    for e in g.edges().to_vec() {
        if parents.contains(&e.from) && g.node(&e.to).is_some_and(|n| n.row == row + 1) {
            children.insert(e.to.clone());
            g.remove_edge(&e.from, &e.to);
        }
    }

    for parent in &parents {
        g.add_edge(Edge::new(parent.clone(), separator_id.clone()))
            .expect("separator endpoints exist");
    }
    for child in &children {
        g.add_edge(Edge::new(separator_id.clone(), child.clone()))
            .expect("separator endpoints exist");
    }
}

fn unique_id(row: usize, first_child: &str, last_child: &str, used: &mut FxHashSet<String>) -> String {
    let first_clean = first_child.replace('_', "");
    let last_clean = last_child.replace('_', "");

    let id = format!("Sep_{row}_{first_clean}_{last_clean}");
    if used.insert(id.clone()) {
        return id;
    }
    for i in 1.. {
        let id = format!("Sep_{row}_{first_clean}_{last_clean}__{i}");
        if used.insert(id.clone()) {
            return id;
        }
    }
    unreachable!()
}
