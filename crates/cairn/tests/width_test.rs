use cairn::tower::{compute_widths, compute_widths_bottom_up};
use cairn::{Dag, Edge, Node, RowOrders};

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

fn orders(rows: &[(usize, &[&str])]) -> RowOrders {
    rows.iter()
        .map(|(r, ids)| (*r, ids.iter().map(|s| s.to_string()).collect()))
        .collect()
}

fn assert_close(got: f64, want: f64) {
    assert!((got - want).abs() < 1e-9, "want {want}, got {got}");
}

#[test]
fn empty_graph_has_no_widths() {
    let g = Dag::default();
    let widths = compute_widths(&g, &RowOrders::new(), 100.0);
    assert!(widths.is_empty());
}

#[test]
fn single_row_divides_evenly() {
    let g = graph(&[("a", 0), ("b", 0), ("c", 0)], &[]);
    let o = orders(&[(0, &["a", "b", "c"])]);
    let widths = compute_widths(&g, &o, 120.0);

    assert_close(widths["a"], 40.0);
    assert_close(widths["b"], 40.0);
    assert_close(widths["c"], 40.0);
}

#[test]
fn chain_passes_width_through() {
    let g = graph(&[("a", 0), ("b", 1)], &[("a", "b")]);
    let o = orders(&[(0, &["a"]), (1, &["b"])]);
    let widths = compute_widths(&g, &o, 100.0);

    assert_close(widths["a"], 100.0);
    assert_close(widths["b"], 100.0);
}

#[test]
fn fan_out_splits_evenly() {
    let g = graph(&[("a", 0), ("b", 1), ("c", 1)], &[("a", "b"), ("a", "c")]);
    let o = orders(&[(0, &["a"]), (1, &["b", "c"])]);
    let widths = compute_widths(&g, &o, 100.0);

    assert_close(widths["b"], 50.0);
    assert_close(widths["c"], 50.0);
}

#[test]
fn fan_in_accumulates() {
    let g = graph(&[("a", 0), ("b", 0), ("c", 1)], &[("a", "c"), ("b", "c")]);
    let o = orders(&[(0, &["a", "b"]), (1, &["c"])]);
    let widths = compute_widths(&g, &o, 100.0);

    assert_close(widths["a"], 50.0);
    assert_close(widths["c"], 100.0);
}

#[test]
fn diamond_splits_and_rejoins() {
    let g = graph(
        &[("a", 0), ("b", 1), ("c", 1), ("d", 2)],
        &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
    );
    let o = orders(&[(0, &["a"]), (1, &["b", "c"]), (2, &["d"])]);
    let widths = compute_widths(&g, &o, 100.0);

    assert_close(widths["a"], 100.0);
    assert_close(widths["b"], 50.0);
    assert_close(widths["c"], 50.0);
    assert_close(widths["d"], 100.0);
}

#[test]
fn uneven_shares_renormalize_to_the_frame() {
    let g = graph(
        &[("a", 0), ("b", 0), ("c", 1), ("d", 1)],
        &[("a", "c"), ("a", "d"), ("b", "d")],
    );
    let o = orders(&[(0, &["a", "b"]), (1, &["c", "d"])]);
    let widths = compute_widths(&g, &o, 100.0);

    let sum: f64 = widths["c"] + widths["d"];
    assert_close(sum, 100.0);
    assert!(widths["d"] > widths["c"], "d feeds from both parents");
}

#[test]
fn every_row_sums_to_the_frame_width() {
    let g = graph(
        &[
            ("a", 0),
            ("b", 0),
            ("c", 1),
            ("d", 1),
            ("e", 1),
            ("f", 2),
            ("g", 2),
        ],
        &[
            ("a", "c"),
            ("a", "d"),
            ("b", "d"),
            ("b", "e"),
            ("c", "f"),
            ("d", "f"),
            ("d", "g"),
            ("e", "g"),
        ],
    );
    let o = orders(&[(0, &["a", "b"]), (1, &["c", "d", "e"]), (2, &["f", "g"])]);

    for widths in [
        compute_widths(&g, &o, 640.0),
        compute_widths_bottom_up(&g, &o, 640.0),
    ] {
        for (row, ids) in [(0usize, vec!["a", "b"]), (1, vec!["c", "d", "e"]), (2, vec!["f", "g"])]
        {
            let sum: f64 = ids.iter().map(|id| widths[*id]).sum();
            assert!((sum - 640.0).abs() < 1e-9, "row {row} sums to {sum}");
        }
    }
}

#[test]
fn bottom_up_starts_at_the_sinks() {
    let g = graph(&[("a", 0), ("b", 1), ("c", 1)], &[("a", "b"), ("a", "c")]);
    let o = orders(&[(0, &["a"]), (1, &["b", "c"])]);
    let widths = compute_widths_bottom_up(&g, &o, 100.0);

    assert_close(widths["b"], 50.0);
    assert_close(widths["c"], 50.0);
    assert_close(widths["a"], 100.0);
}
