use cairn::transform::transitive_reduction;
use cairn::{Dag, Edge, Node};

fn graph(nodes: &[(&str, usize)], edges: &[(&str, &str)]) -> Dag {
    let mut g = Dag::default();
    for (id, row) in nodes {
        g.add_node(Node::new(*id, *row)).unwrap();
    }
    for (from, to) in edges {
        g.add_edge(Edge::new(*from, *to)).unwrap();
    }
    g
}

fn has_edge(g: &Dag, from: &str, to: &str) -> bool {
    g.edges().iter().any(|e| e.from == from && e.to == to)
}

#[test]
fn empty_graph_is_a_noop() {
    let mut g = Dag::default();
    transitive_reduction(&mut g);
    assert_eq!(g.node_count(), 0);
}

#[test]
fn triangle_loses_its_shortcut() {
    let mut g = graph(
        &[("a", 0), ("b", 1), ("c", 2)],
        &[("a", "b"), ("b", "c"), ("a", "c")],
    );
    transitive_reduction(&mut g);

    assert_eq!(g.edge_count(), 2);
    assert!(has_edge(&g, "a", "b"));
    assert!(has_edge(&g, "b", "c"));
    assert!(!has_edge(&g, "a", "c"));
}

#[test]
fn diamond_is_preserved() {
    let mut g = graph(
        &[("a", 0), ("b", 1), ("c", 1), ("d", 2)],
        &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
    );
    transitive_reduction(&mut g);
    assert_eq!(g.edge_count(), 4);
}

#[test]
fn chain_with_all_shortcuts_reduces_to_the_chain() {
    let mut g = graph(
        &[("a", 0), ("b", 1), ("c", 2), ("d", 3)],
        &[
            ("a", "b"),
            ("b", "c"),
            ("c", "d"),
            ("a", "c"),
            ("a", "d"),
            ("b", "d"),
        ],
    );
    transitive_reduction(&mut g);

    assert_eq!(g.edge_count(), 3);
    assert!(has_edge(&g, "a", "b"));
    assert!(has_edge(&g, "b", "c"));
    assert!(has_edge(&g, "c", "d"));
}

#[test]
fn removed_edges_keep_a_longer_path() {
    let mut g = graph(
        &[("a", 0), ("b", 1), ("c", 1), ("d", 2), ("e", 3)],
        &[
            ("a", "b"),
            ("a", "c"),
            ("b", "d"),
            ("c", "d"),
            ("d", "e"),
            ("a", "d"),
            ("b", "e"),
        ],
    );
    transitive_reduction(&mut g);

    assert!(!has_edge(&g, "a", "d"));
    assert!(!has_edge(&g, "b", "e"));
    // Survivors have no alternate path.
    assert!(has_edge(&g, "a", "b"));
    assert!(has_edge(&g, "d", "e"));
}

#[test]
fn fan_out_is_untouched() {
    let mut g = graph(&[("a", 0), ("b", 1), ("c", 1)], &[("a", "b"), ("a", "c")]);
    transitive_reduction(&mut g);
    assert_eq!(g.edge_count(), 2);
}

#[test]
fn edge_metadata_survives_on_kept_edges() {
    let mut g = Dag::default();
    g.add_node(Node::new("a", 0)).unwrap();
    g.add_node(Node::new("b", 1)).unwrap();
    let mut edge = Edge::new("a", "b");
    edge.meta
        .insert("label".to_string(), serde_json::json!("direct"));
    g.add_edge(edge).unwrap();

    transitive_reduction(&mut g);

    assert_eq!(
        g.edges()[0].meta.get("label"),
        Some(&serde_json::json!("direct"))
    );
}
