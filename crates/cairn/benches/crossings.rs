use cairn::{count_crossings_idx, count_layer_crossings, CrossingWorkspace, Dag, Edge, Node};
use criterion::{criterion_group, criterion_main, Criterion};

fn bilayer(width: usize, fan: usize) -> (Dag, Vec<String>, Vec<String>) {
    let mut g = Dag::default();
    let upper: Vec<String> = (0..width).map(|i| format!("u{i}")).collect();
    let lower: Vec<String> = (0..width).map(|i| format!("l{i}")).collect();
    for id in &upper {
        g.add_node(Node::new(id.clone(), 0)).unwrap();
    }
    for id in &lower {
        g.add_node(Node::new(id.clone(), 1)).unwrap();
    }
    for i in 0..width {
        for j in 0..fan {
            let target = (i * 7 + j * 13) % width;
            g.add_edge(Edge::new(upper[i].clone(), lower[target].clone()))
                .unwrap();
        }
    }
    (g, upper, lower)
}

fn bench_layer_crossings(c: &mut Criterion) {
    let (g, upper, lower) = bilayer(200, 4);
    c.bench_function("count_layer_crossings/200x4", |b| {
        b.iter(|| count_layer_crossings(&g, &upper, &lower))
    });
}

fn bench_index_form(c: &mut Criterion) {
    let width = 200;
    let edges: Vec<Vec<usize>> = (0..width)
        .map(|i| {
            let mut targets: Vec<usize> = (0..4).map(|j| (i * 7 + j * 13) % width).collect();
            targets.sort_unstable();
            targets.dedup();
            targets
        })
        .collect();
    let perm: Vec<usize> = (0..width).collect();
    let mut ws = CrossingWorkspace::new(width);

    c.bench_function("count_crossings_idx/200x4", |b| {
        b.iter(|| count_crossings_idx(&edges, &perm, &perm, &mut ws))
    });
}

criterion_group!(benches, bench_layer_crossings, bench_index_form);
criterion_main!(benches);
