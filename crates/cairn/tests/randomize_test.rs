use cairn::tower::{self, randomize, BuildOptions, RandomizeOptions};
use cairn::transform::normalize;
use cairn::{Dag, Edge, Node};

fn layout_fixture() -> (cairn::Layout, Dag) {
    let mut g = Dag::default();
    for id in ["app", "web", "db", "core", "util"] {
        g.add_node(Node::new(id, 0)).unwrap();
    }
    for (from, to) in [
        ("app", "web"),
        ("app", "db"),
        ("web", "core"),
        ("db", "core"),
        ("core", "util"),
    ] {
        g.add_edge(Edge::new(from, to)).unwrap();
    }
    normalize(&mut g);
    let layout = tower::build(&g, 1000.0, 800.0, &BuildOptions::default());
    (layout, g)
}

#[test]
fn zero_shrink_returns_the_layout_untouched() {
    let (layout, g) = layout_fixture();
    let opts = RandomizeOptions {
        width_shrink: 0.0,
        ..Default::default()
    };
    let jittered = randomize(&layout, &g, 42, &opts);

    for (id, block) in &layout.blocks {
        assert_eq!(&jittered.blocks[id], block);
    }
}

#[test]
fn same_seed_same_jitter() {
    let (layout, g) = layout_fixture();
    let opts = RandomizeOptions::default();

    let a = randomize(&layout, &g, 7, &opts);
    let b = randomize(&layout, &g, 7, &opts);

    for (id, block) in &a.blocks {
        assert_eq!(&b.blocks[id], block, "{id} differs between runs");
    }
}

#[test]
fn different_seeds_usually_differ() {
    let (layout, g) = layout_fixture();
    let opts = RandomizeOptions::default();

    let a = randomize(&layout, &g, 1, &opts);
    let b = randomize(&layout, &g, 2, &opts);

    let moved = a
        .blocks
        .iter()
        .any(|(id, block)| &b.blocks[id] != block);
    assert!(moved, "two seeds produced identical jitter");
}

#[test]
fn parents_and_children_keep_contact() {
    let (layout, g) = layout_fixture();
    let opts = RandomizeOptions::default();
    let jittered = randomize(&layout, &g, 99, &opts);

    for e in g.edges() {
        let parent = &jittered.blocks[&e.from];
        let child = &jittered.blocks[&e.to];
        let overlap = parent.right.min(child.right) - parent.left.max(child.left);
        assert!(
            overlap >= opts.min_overlap - 1e-9,
            "{} -> {} overlap {overlap}",
            e.from,
            e.to
        );
    }
}

#[test]
fn top_row_is_never_shrunk() {
    let (layout, g) = layout_fixture();
    let jittered = randomize(&layout, &g, 3, &RandomizeOptions::default());

    let top_ids = &layout.row_orders[layout.row_orders.keys().next().unwrap()];
    for id in top_ids {
        let before = &layout.blocks[id];
        let after = &jittered.blocks[id];
        assert!(
            after.width() >= before.width() - 1e-9,
            "{id} shrank on the top row"
        );
    }
}
