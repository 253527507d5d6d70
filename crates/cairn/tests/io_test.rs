use cairn::io::{export_json, import_json, read_json, write_json, IoError};
use cairn::{Dag, Edge, Node, NodeKind};
use serde_json::json;

fn sample_graph() -> Dag {
    let mut g = Dag::default();
    let mut app = Node::new("app", 0);
    app.meta.insert("version".to_string(), json!("2.1.0"));
    app.meta.insert(
        "repo_topics".to_string(),
        json!(["graph", {"nested": true}]),
    );
    g.add_node(app).unwrap();
    g.add_node(Node::new("lib", 1)).unwrap();
    g.add_node(Node {
        id: "sep".to_string(),
        row: 1,
        kind: NodeKind::Auxiliary,
        master_id: None,
        meta: Default::default(),
    })
    .unwrap();
    g.add_edge(Edge::new("app", "lib")).unwrap();
    g.add_edge(Edge::new("app", "sep")).unwrap();
    g
}

#[test]
fn round_trip_preserves_everything() {
    let g = sample_graph();

    let mut buf = Vec::new();
    write_json(&g, &mut buf).unwrap();
    let back = read_json(buf.as_slice()).unwrap();

    assert_eq!(back.node_count(), g.node_count());
    assert_eq!(back.edge_count(), g.edge_count());

    let app = back.node("app").unwrap();
    assert_eq!(app.row, 0);
    assert_eq!(app.meta.get("version"), Some(&json!("2.1.0")));
    assert_eq!(
        app.meta.get("repo_topics"),
        Some(&json!(["graph", {"nested": true}])),
        "unrecognized structures survive verbatim"
    );

    let sep = back.node("sep").unwrap();
    assert_eq!(sep.kind, NodeKind::Auxiliary);
    assert_eq!(sep.row, 1);

    assert_eq!(back.children("app"), g.children("app"));
}

#[test]
fn regular_kind_and_zero_row_are_omitted() {
    let mut g = Dag::default();
    g.add_node(Node::new("solo", 0)).unwrap();

    let mut buf = Vec::new();
    write_json(&g, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert!(text.contains("\"solo\""));
    assert!(!text.contains("\"row\""));
    assert!(!text.contains("\"kind\""));
    assert!(!text.contains("\"meta\""));
}

#[test]
fn minimal_document_imports() {
    let doc = r#"{
        "nodes": [
            {"id": "a"},
            {"id": "b", "row": 1, "kind": "subdivider"},
            {"id": "c", "row": 1, "kind": "auxiliary", "meta": {"x": 1}}
        ],
        "edges": [{"from": "a", "to": "b"}]
    }"#;

    let g = read_json(doc.as_bytes()).unwrap();
    assert_eq!(g.node("a").unwrap().row, 0);
    assert_eq!(g.node("b").unwrap().kind, NodeKind::Subdivider);
    assert_eq!(g.node("c").unwrap().meta.get("x"), Some(&json!(1)));
    assert_eq!(g.edge_count(), 1);
}

#[test]
fn unknown_kind_is_an_error() {
    let doc = r#"{"nodes": [{"id": "a", "kind": "mystery"}], "edges": []}"#;
    match read_json(doc.as_bytes()) {
        Err(IoError::UnknownKind { id, kind }) => {
            assert_eq!(id, "a");
            assert_eq!(kind, "mystery");
        }
        other => panic!("expected UnknownKind, got {other:?}"),
    }
}

#[test]
fn duplicate_nodes_are_an_error() {
    let doc = r#"{"nodes": [{"id": "a"}, {"id": "a"}], "edges": []}"#;
    assert!(matches!(
        read_json(doc.as_bytes()),
        Err(IoError::Node { .. })
    ));
}

#[test]
fn dangling_edges_are_an_error() {
    let doc = r#"{"nodes": [{"id": "a"}], "edges": [{"from": "a", "to": "ghost"}]}"#;
    assert!(matches!(
        read_json(doc.as_bytes()),
        Err(IoError::Edge { .. })
    ));
}

#[test]
fn malformed_json_is_an_error() {
    assert!(matches!(
        read_json("{not json".as_bytes()),
        Err(IoError::Decode(_))
    ));
}

#[test]
fn file_round_trip_carries_path_context() {
    let dir = std::env::temp_dir().join(format!("cairn-io-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("graph.json");

    let g = sample_graph();
    export_json(&g, &path).unwrap();
    let back = import_json(&path).unwrap();
    assert_eq!(back.node_count(), g.node_count());

    let missing = dir.join("nope.json");
    match import_json(&missing) {
        Err(IoError::Open { path, .. }) => assert!(path.contains("nope.json")),
        other => panic!("expected Open error, got {other:?}"),
    }

    std::fs::remove_dir_all(&dir).ok();
}
