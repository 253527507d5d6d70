//! Layered directed acyclic graph model.
//!
//! Nodes carry a stable string id, a row (layer) index, and a kind. Synthetic
//! nodes point back at the regular node they stand in for via `master_id`.
//! The graph keeps derived indices (adjacency in both directions, row
//! buckets) up to date on every mutation so the layout passes can query them
//! without rebuilding.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

/// Free-form metadata attached to nodes, edges, and the graph itself.
///
/// Values are arbitrary JSON so unrecognized keys survive an import/export
/// round-trip verbatim.
pub type Metadata = BTreeMap<String, serde_json::Value>;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("node ID must not be empty")]
    InvalidNodeId,

    #[error("duplicate node ID: {0}")]
    DuplicateNodeId(String),

    #[error("unknown source node: {0}")]
    UnknownSourceNode(String),

    #[error("unknown target node: {0}")]
    UnknownTargetNode(String),

    #[error("edge {from} -> {to} references a missing node")]
    InvalidEdgeEndpoint { from: String, to: String },

    #[error("edge {from} -> {to} must connect consecutive rows (rows {from_row} and {to_row})")]
    NonConsecutiveRows {
        from: String,
        to: String,
        from_row: usize,
        to_row: usize,
    },

    #[error("graph contains a cycle")]
    GraphHasCycle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeKind {
    /// Original graph nodes.
    #[default]
    Regular,
    /// Inserted to subdivide long edges into unit-length chains.
    Subdivider,
    /// Helper nodes for layout (span separators).
    Auxiliary,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub id: String,
    pub row: usize,
    pub kind: NodeKind,
    /// Links synthetic nodes to their origin.
    pub master_id: Option<String>,
    pub meta: Metadata,
}

impl Node {
    pub fn new(id: impl Into<String>, row: usize) -> Self {
        Self {
            id: id.into(),
            row,
            ..Default::default()
        }
    }

    pub fn is_subdivider(&self) -> bool {
        self.kind == NodeKind::Subdivider
    }

    pub fn is_auxiliary(&self) -> bool {
        self.kind == NodeKind::Auxiliary
    }

    pub fn is_synthetic(&self) -> bool {
        self.kind != NodeKind::Regular
    }

    /// The semantic identity of the node: `master_id` if set, else `id`.
    pub fn effective_id(&self) -> &str {
        self.master_id.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub meta: Metadata,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            meta: Metadata::new(),
        }
    }
}

/// A layered DAG owning its nodes and edges plus derived indices.
#[derive(Debug, Clone, Default)]
pub struct Dag {
    nodes: IndexMap<String, Node>,
    edges: Vec<Edge>,
    outgoing: FxHashMap<String, Vec<String>>,
    incoming: FxHashMap<String, Vec<String>>,
    rows: BTreeMap<usize, Vec<String>>,
    meta: Metadata,
}

impl Dag {
    pub fn new(meta: Metadata) -> Self {
        Self {
            meta,
            ..Default::default()
        }
    }

    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut Metadata {
        &mut self.meta
    }

    pub fn add_node(&mut self, node: Node) -> Result<()> {
        if node.id.is_empty() {
            return Err(GraphError::InvalidNodeId);
        }
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNodeId(node.id));
        }
        self.rows.entry(node.row).or_default().push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        if !self.nodes.contains_key(&edge.from) {
            return Err(GraphError::UnknownSourceNode(edge.from));
        }
        if !self.nodes.contains_key(&edge.to) {
            return Err(GraphError::UnknownTargetNode(edge.to));
        }
        self.outgoing
            .entry(edge.from.clone())
            .or_default()
            .push(edge.to.clone());
        self.incoming
            .entry(edge.to.clone())
            .or_default()
            .push(edge.from.clone());
        self.edges.push(edge);
        Ok(())
    }

    /// Removes every edge `from -> to`. Adjacency lists keep insertion order
    /// otherwise.
    pub fn remove_edge(&mut self, from: &str, to: &str) {
        self.edges.retain(|e| !(e.from == from && e.to == to));
        if let Some(out) = self.outgoing.get_mut(from) {
            out.retain(|id| id != to);
        }
        if let Some(inc) = self.incoming.get_mut(to) {
            inc.retain(|id| id != from);
        }
    }

    /// Reassigns rows in bulk and rebuilds the row buckets. Nodes missing
    /// from the mapping keep their current row.
    pub fn set_rows(&mut self, rows: &FxHashMap<String, usize>) {
        self.rows.clear();
        for (id, node) in &mut self.nodes {
            if let Some(&row) = rows.get(id) {
                node.row = row;
            }
            self.rows.entry(node.row).or_default().push(id.clone());
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn children(&self, id: &str) -> &[String] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parents(&self, id: &str) -> &[String] {
        self.incoming.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.children(id).len()
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.parents(id).len()
    }

    pub fn children_in_row(&self, id: &str, row: usize) -> Vec<&str> {
        self.children(id)
            .iter()
            .filter(|c| self.nodes.get(*c).is_some_and(|n| n.row == row))
            .map(String::as_str)
            .collect()
    }

    pub fn parents_in_row(&self, id: &str, row: usize) -> Vec<&str> {
        self.parents(id)
            .iter()
            .filter(|p| self.nodes.get(*p).is_some_and(|n| n.row == row))
            .map(String::as_str)
            .collect()
    }

    /// Members of a row in insertion order.
    pub fn nodes_in_row(&self, row: usize) -> Vec<&Node> {
        self.rows
            .get(&row)
            .map(|ids| ids.iter().filter_map(|id| self.nodes.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row_ids(&self) -> Vec<usize> {
        self.rows.keys().copied().collect()
    }

    pub fn max_row(&self) -> usize {
        self.rows.keys().next_back().copied().unwrap_or(0)
    }

    pub fn sources(&self) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|n| self.in_degree(&n.id) == 0)
            .collect()
    }

    pub fn sinks(&self) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|n| self.out_degree(&n.id) == 0)
            .collect()
    }

    /// Checks the structural invariants: every edge endpoint exists, every
    /// edge connects consecutive rows, and the graph is acyclic.
    pub fn validate(&self) -> Result<()> {
        self.validate_edge_consistency()?;
        self.detect_cycles()
    }

    fn validate_edge_consistency(&self) -> Result<()> {
        for e in &self.edges {
            let (Some(src), Some(dst)) = (self.nodes.get(&e.from), self.nodes.get(&e.to)) else {
                return Err(GraphError::InvalidEdgeEndpoint {
                    from: e.from.clone(),
                    to: e.to.clone(),
                });
            };
            if dst.row != src.row + 1 {
                return Err(GraphError::NonConsecutiveRows {
                    from: e.from.clone(),
                    to: e.to.clone(),
                    from_row: src.row,
                    to_row: dst.row,
                });
            }
        }
        Ok(())
    }

    fn detect_cycles(&self) -> Result<()> {
        let mut in_degree: FxHashMap<&str, usize> = self
            .nodes
            .keys()
            .map(|id| (id.as_str(), self.in_degree(id)))
            .collect();

        let mut queue: Vec<&str> = self
            .nodes
            .keys()
            .map(String::as_str)
            .filter(|id| in_degree[id] == 0)
            .collect();

        let mut processed = 0;
        while let Some(curr) = queue.pop() {
            processed += 1;
            for child in self.children(curr) {
                let degree = in_degree.get_mut(child.as_str()).expect("indexed node");
                *degree -= 1;
                if *degree == 0 {
                    queue.push(child);
                }
            }
        }

        if processed != self.nodes.len() {
            return Err(GraphError::GraphHasCycle);
        }
        Ok(())
    }
}

/// Index of each id within an ordering.
pub fn pos_map(ids: &[String]) -> FxHashMap<&str, usize> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect()
}

/// Index of each node within a row slice.
pub fn node_pos_map<'a>(nodes: &[&'a Node]) -> FxHashMap<&'a str, usize> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect()
}

pub fn node_ids(nodes: &[&Node]) -> Vec<String> {
    nodes.iter().map(|n| n.id.clone()).collect()
}
