//! JSON import and export.
//!
//! The schema is a flat node/edge listing. `row` is omitted when 0, `kind`
//! when Regular, `meta` when empty, so a plain dependency graph stays
//! readable. Unknown kind strings are rejected on import.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dag::{Dag, Edge, GraphError, Metadata, Node, NodeKind};

pub type Result<T> = std::result::Result<T, IoError>;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("node {id}: unknown kind {kind:?}")]
    UnknownKind { id: String, kind: String },

    #[error("node {id}: {source}")]
    Node { id: String, source: GraphError },

    #[error("edge {from}->{to}: {source}")]
    Edge {
        from: String,
        to: String,
        source: GraphError,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct GraphDoc {
    #[serde(default)]
    nodes: Vec<NodeDoc>,
    #[serde(default)]
    edges: Vec<EdgeDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeDoc {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    row: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<Metadata>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeDoc {
    from: String,
    to: String,
}

pub fn read_json(r: impl Read) -> Result<Dag> {
    let doc: GraphDoc = serde_json::from_reader(r)?;

    let mut g = Dag::default();
    for n in doc.nodes {
        let kind = match n.kind.as_deref() {
            None => NodeKind::Regular,
            Some("subdivider") => NodeKind::Subdivider,
            Some("auxiliary") => NodeKind::Auxiliary,
            Some(other) => {
                return Err(IoError::UnknownKind {
                    id: n.id,
                    kind: other.to_string(),
                })
            }
        };
        let id = n.id.clone();
        g.add_node(Node {
            id: n.id,
            row: n.row.unwrap_or(0),
            kind,
            master_id: None,
            meta: n.meta.unwrap_or_default(),
        })
        .map_err(|source| IoError::Node { id, source })?;
    }

    for e in doc.edges {
        let (from, to) = (e.from.clone(), e.to.clone());
        g.add_edge(Edge::new(e.from, e.to))
            .map_err(|source| IoError::Edge { from, to, source })?;
    }

    Ok(g)
}

pub fn write_json(g: &Dag, w: impl Write) -> Result<()> {
    let doc = GraphDoc {
        nodes: g
            .nodes()
            .map(|n| NodeDoc {
                id: n.id.clone(),
                row: (n.row != 0).then_some(n.row),
                kind: match n.kind {
                    NodeKind::Regular => None,
                    NodeKind::Subdivider => Some("subdivider".to_string()),
                    NodeKind::Auxiliary => Some("auxiliary".to_string()),
                },
                meta: (!n.meta.is_empty()).then(|| n.meta.clone()),
            })
            .collect(),
        edges: g
            .edges()
            .iter()
            .map(|e| EdgeDoc {
                from: e.from.clone(),
                to: e.to.clone(),
            })
            .collect(),
    };

    serde_json::to_writer_pretty(w, &doc)?;
    Ok(())
}

pub fn import_json(path: impl AsRef<Path>) -> Result<Dag> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IoError::Open {
        path: path.display().to_string(),
        source,
    })?;
    read_json(BufReader::new(file))
}

pub fn export_json(g: &Dag, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| IoError::Write {
        path: path.display().to_string(),
        source,
    })?;
    write_json(g, BufWriter::new(file))
}
