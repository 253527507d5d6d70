use cairn::tower::{self, merge_subdividers, BuildOptions};
use cairn::transform::normalize;
use cairn::{Dag, Edge, Node};

#[test]
fn one_block_per_effective_id() {
    let mut g = Dag::default();
    for id in ["a", "b", "c", "d"] {
        g.add_node(Node::new(id, 0)).unwrap();
    }
    // a -> d is a long edge once b and c stretch the tower.
    g.add_edge(Edge::new("a", "b")).unwrap();
    g.add_edge(Edge::new("b", "c")).unwrap();
    g.add_edge(Edge::new("c", "d")).unwrap();
    g.add_edge(Edge::new("a", "d")).unwrap();
    normalize(&mut g);

    let layout = tower::build(&g, 1000.0, 800.0, &BuildOptions::default());
    let merged = merge_subdividers(&layout, &g);

    let effective: std::collections::BTreeSet<&str> =
        g.nodes().map(|n| n.effective_id()).collect();
    assert_eq!(merged.blocks.len(), effective.len());
    for id in effective {
        assert!(merged.blocks.contains_key(id), "missing block for {id}");
    }
}

#[test]
fn merged_bounds_are_the_union() {
    // A branch that stops above the bottom row is guaranteed a subdivider
    // tail from sink extension.
    let mut g = Dag::default();
    for id in ["root", "left", "right", "bottom"] {
        g.add_node(Node::new(id, 0)).unwrap();
    }
    g.add_edge(Edge::new("root", "left")).unwrap();
    g.add_edge(Edge::new("root", "right")).unwrap();
    g.add_edge(Edge::new("right", "bottom")).unwrap();
    normalize(&mut g);

    let chain: Vec<String> = g
        .nodes()
        .filter(|n| n.effective_id() == "left")
        .map(|n| n.id.clone())
        .collect();
    assert!(chain.len() > 1, "left should grow a subdivider tail: {chain:?}");

    let layout = tower::build(&g, 1000.0, 800.0, &BuildOptions::default());
    let merged = merge_subdividers(&layout, &g);

    let block = &merged.blocks["left"];
    let mut want_left = f64::MAX;
    let mut want_right = f64::MIN;
    let mut want_bottom = f64::MAX;
    let mut want_top = f64::MIN;
    for id in &chain {
        let b = &layout.blocks[id];
        want_left = want_left.min(b.left);
        want_right = want_right.max(b.right);
        want_bottom = want_bottom.min(b.bottom);
        want_top = want_top.max(b.top);
    }

    assert_eq!(block.left, want_left);
    assert_eq!(block.right, want_right);
    assert_eq!(block.bottom, want_bottom);
    assert_eq!(block.top, want_top);
}

#[test]
fn subdividers_leave_the_row_orders() {
    let mut g = Dag::default();
    for id in ["root", "left", "right", "bottom"] {
        g.add_node(Node::new(id, 0)).unwrap();
    }
    g.add_edge(Edge::new("root", "left")).unwrap();
    g.add_edge(Edge::new("root", "right")).unwrap();
    g.add_edge(Edge::new("right", "bottom")).unwrap();
    normalize(&mut g);

    let layout = tower::build(&g, 1000.0, 800.0, &BuildOptions::default());
    let merged = merge_subdividers(&layout, &g);

    for ids in merged.row_orders.values() {
        for id in ids {
            let node = g.node(id).expect("known node");
            assert!(!node.is_subdivider(), "{id} should have been merged away");
        }
        assert!(!ids.is_empty());
    }

    assert_eq!(merged.frame_width, layout.frame_width);
    assert_eq!(merged.margin_x, layout.margin_x);
}

#[test]
fn plain_graphs_come_back_unchanged_in_count() {
    let mut g = Dag::default();
    for id in ["a", "b"] {
        g.add_node(Node::new(id, 0)).unwrap();
    }
    g.add_edge(Edge::new("a", "b")).unwrap();
    normalize(&mut g);

    let layout = tower::build(&g, 100.0, 100.0, &BuildOptions::default());
    let merged = merge_subdividers(&layout, &g);

    assert_eq!(merged.blocks.len(), 2);
    assert_eq!(merged.blocks["a"], layout.blocks["a"]);
}
