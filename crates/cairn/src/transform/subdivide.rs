//! Long-edge subdivision and sink extension.

use crate::dag::{Dag, Edge, Node, NodeKind};
use rustc_hash::FxHashSet;

/// Replaces every edge spanning more than one row with a chain of
/// subdivider nodes, then extends every sink below the bottom row with a
/// chain down to it so all sinks visually align.
pub fn subdivide(g: &mut Dag) {
    let mut gen = IdGen::new(g);
    subdivide_long_edges(g, &mut gen);
    extend_sinks_to_bottom(g, &mut gen);
}

fn subdivide_long_edges(g: &mut Dag, gen: &mut IdGen) {
    let mut to_remove: Vec<Edge> = Vec::new();
    for e in g.edges().to_vec() {
        let (Some(src), Some(dst)) = (g.node(&e.from), g.node(&e.to)) else {
            continue;
        };
        if dst.row <= src.row + 1 {
            continue;
        }
        let (src_id, src_row, dst_id, dst_row) =
            (src.id.clone(), src.row, dst.id.clone(), dst.row);

        let mut prev_id = src_id.clone();
        for row in src_row + 1..dst_row {
            prev_id = add_subdivider(g, gen, &prev_id, &src_id, row);
        }
        g.add_edge(Edge {
            from: prev_id,
            to: dst_id,
            meta: e.meta.clone(),
        })
        .expect("chain endpoints exist");

        to_remove.push(e);
    }

    for e in to_remove {
        g.remove_edge(&e.from, &e.to);
    }
}

fn add_subdivider(g: &mut Dag, gen: &mut IdGen, from: &str, master: &str, row: usize) -> String {
    let id = gen.next(master, row);
    g.add_node(Node {
        id: id.clone(),
        row,
        kind: NodeKind::Subdivider,
        master_id: Some(master.to_string()),
        ..Default::default()
    })
    .expect("generated id is unique");
    g.add_edge(Edge::new(from, id.clone()))
        .expect("chain endpoints exist");
    id
}

fn extend_sinks_to_bottom(g: &mut Dag, gen: &mut IdGen) {
    let max_row = g.max_row();
    let sinks: Vec<(String, String, usize)> = g
        .nodes()
        .filter(|n| g.out_degree(&n.id) == 0 && n.row < max_row)
        .map(|n| (n.id.clone(), n.effective_id().to_string(), n.row))
        .collect();

    for (id, master, row) in sinks {
        let mut prev_id = id;
        for r in row + 1..=max_row {
            prev_id = add_subdivider(g, gen, &prev_id, &master, r);
        }
    }
}

struct IdGen {
    used: FxHashSet<String>,
}

impl IdGen {
    fn new(g: &Dag) -> Self {
        Self {
            used: g.node_ids().map(str::to_string).collect(),
        }
    }

    fn next(&mut self, base: &str, row: usize) -> String {
        let id = format!("{base}_sub_{row}");
        if self.used.insert(id.clone()) {
            return id;
        }
        for i in 1.. {
            let id = format!("{base}_sub_{row}__{i}");
            if self.used.insert(id.clone()) {
                return id;
            }
        }
        unreachable!()
    }
}
