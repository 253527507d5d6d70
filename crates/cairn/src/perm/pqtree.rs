//! PQ-tree over the elements `0..n`.
//!
//! P-node children may appear in any order; Q-node children admit only their
//! stored order or its reverse. Reducing with a subset S restructures the
//! tree so S occupies consecutive positions in every remaining frontier,
//! following the Booth–Lueker template rules bottom-up from the pertinent
//! leaves. Nodes live in an arena and refer to each other by index, so
//! template rewrites are cheap splices of child vectors.

use std::fmt;

use super::{factorial, Permutations};
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Leaf(usize),
    P,
    Q,
}

#[derive(Debug, Clone)]
struct PqNode {
    kind: Kind,
    children: Vec<usize>,
}

/// Classification of a subtree against the reduction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    /// No pertinent leaf below.
    Empty,
    /// Every leaf below is pertinent.
    Full,
    /// Rearranged into a Q run: empty children first, full children last.
    Partial,
}

#[derive(Debug)]
struct Unsatisfiable;

#[derive(Debug, Clone)]
pub struct PqTree {
    nodes: Vec<PqNode>,
    root: usize,
    n: usize,
}

impl PqTree {
    /// The universal tree: one P-node over `n` leaves, admitting all `n!`
    /// permutations.
    pub fn new(n: usize) -> Self {
        let mut nodes: Vec<PqNode> = (0..n)
            .map(|e| PqNode {
                kind: Kind::Leaf(e),
                children: Vec::new(),
            })
            .collect();
        let root = nodes.len();
        nodes.push(PqNode {
            kind: Kind::P,
            children: (0..n).collect(),
        });
        Self { nodes, root, n }
    }

    fn add(&mut self, kind: Kind, children: Vec<usize>) -> usize {
        self.nodes.push(PqNode { kind, children });
        self.nodes.len() - 1
    }

    /// Applies the constraint "the elements of `subset` are consecutive".
    /// Returns false when the constraint cannot be satisfied together with
    /// the ones already applied; the tree is then no longer meaningful and
    /// should be discarded.
    pub fn reduce(&mut self, subset: &[usize]) -> bool {
        let s: FxHashSet<usize> = subset.iter().copied().collect();
        if s.iter().any(|&e| e >= self.n) {
            return false;
        }
        if s.len() <= 1 || s.len() == self.n {
            return true;
        }

        let root = self.pertinent_root(self.root, &s);
        self.apply_root(root, &s).is_ok()
    }

    /// The deepest node whose subtree contains every pertinent leaf.
    fn pertinent_root(&self, mut x: usize, s: &FxHashSet<usize>) -> usize {
        loop {
            let children = self.nodes[x].children.clone();
            let inner = children
                .into_iter()
                .find(|&c| self.count_pertinent(c, s) == s.len());
            match inner {
                Some(c) => x = c,
                None => return x,
            }
        }
    }

    fn count_pertinent(&self, x: usize, s: &FxHashSet<usize>) -> usize {
        match self.nodes[x].kind {
            Kind::Leaf(e) => usize::from(s.contains(&e)),
            _ => self.nodes[x]
                .children
                .iter()
                .map(|&c| self.count_pertinent(c, s))
                .sum(),
        }
    }

    /// Non-root labeling pass. A node that ends up Partial is rewritten into
    /// a Q-node whose children run empty-side to full-side, left to right.
    fn label(&mut self, x: usize, s: &FxHashSet<usize>) -> Result<Label, Unsatisfiable> {
        match self.nodes[x].kind {
            Kind::Leaf(e) => Ok(if s.contains(&e) {
                Label::Full
            } else {
                Label::Empty
            }),
            Kind::P => {
                let (empty, full, part) = self.partition(x, s)?;
                if part.len() > 1 {
                    return Err(Unsatisfiable);
                }
                if full.is_empty() && part.is_empty() {
                    return Ok(Label::Empty);
                }
                if empty.is_empty() && part.is_empty() {
                    return Ok(Label::Full);
                }

                let mut seq = Vec::new();
                self.push_group(&mut seq, empty);
                if let Some(&pc) = part.first() {
                    seq.extend(self.nodes[pc].children.iter().copied());
                }
                self.push_group(&mut seq, full);
                self.nodes[x].kind = Kind::Q;
                self.nodes[x].children = seq;
                Ok(Label::Partial)
            }
            Kind::Q => {
                let children = self.nodes[x].children.clone();
                let mut labels = Vec::with_capacity(children.len());
                for &c in &children {
                    labels.push(self.label(c, s)?);
                }

                if labels.iter().all(|&l| l == Label::Empty) {
                    return Ok(Label::Empty);
                }
                if labels.iter().all(|&l| l == Label::Full) {
                    return Ok(Label::Full);
                }

                let (children, labels) = if fits_empty_then_full(&labels) {
                    (children, labels)
                } else {
                    let rev_children: Vec<usize> = children.into_iter().rev().collect();
                    let rev_labels: Vec<Label> = labels.into_iter().rev().collect();
                    if !fits_empty_then_full(&rev_labels) {
                        return Err(Unsatisfiable);
                    }
                    (rev_children, rev_labels)
                };

                let mut seq = Vec::new();
                for (&c, &l) in children.iter().zip(&labels) {
                    if l == Label::Partial {
                        seq.extend(self.nodes[c].children.iter().copied());
                    } else {
                        seq.push(c);
                    }
                }
                self.nodes[x].children = seq;
                Ok(Label::Partial)
            }
        }
    }

    /// Template application at the pertinent root, where the pertinent block
    /// only has to be consecutive, not anchored to an end.
    fn apply_root(&mut self, x: usize, s: &FxHashSet<usize>) -> Result<(), Unsatisfiable> {
        match self.nodes[x].kind {
            Kind::Leaf(_) => Ok(()),
            Kind::P => {
                let (empty, full, part) = self.partition(x, s)?;
                if part.len() > 2 {
                    return Err(Unsatisfiable);
                }

                if part.is_empty() {
                    // A single full child (or an all-full node) is already a
                    // contiguous frontier; otherwise gather the full
                    // children under one P-node so they stay together.
                    if !empty.is_empty() && full.len() >= 2 {
                        let group = self.add(Kind::P, full);
                        let mut children = empty;
                        children.push(group);
                        self.nodes[x].children = children;
                    }
                    return Ok(());
                }

                let mut seq: Vec<usize> = self.nodes[part[0]].children.clone();
                self.push_group(&mut seq, full);
                if let Some(&p2) = part.get(1) {
                    seq.extend(self.nodes[p2].children.iter().rev().copied());
                }

                if empty.is_empty() {
                    self.nodes[x].kind = Kind::Q;
                    self.nodes[x].children = seq;
                } else {
                    let q = self.add(Kind::Q, seq);
                    let mut children = empty;
                    children.push(q);
                    self.nodes[x].children = children;
                }
                Ok(())
            }
            Kind::Q => {
                let children = self.nodes[x].children.clone();
                let mut labels = Vec::with_capacity(children.len());
                for &c in &children {
                    labels.push(self.label(c, s)?);
                }

                // The pertinent run may sit anywhere: leading empties, an
                // optional partial opening the run, the full block, an
                // optional partial closing it, trailing empties.
                #[derive(PartialEq, Eq, Clone, Copy)]
                enum Phase {
                    Lead,
                    Run,
                    Tail,
                }
                let mut phase = Phase::Lead;
                let mut seq = Vec::new();
                for (&c, &l) in children.iter().zip(&labels) {
                    match (phase, l) {
                        (Phase::Lead, Label::Empty) | (Phase::Tail, Label::Empty) => seq.push(c),
                        (Phase::Lead, Label::Partial) => {
                            phase = Phase::Run;
                            seq.extend(self.nodes[c].children.iter().copied());
                        }
                        (Phase::Lead, Label::Full) => {
                            phase = Phase::Run;
                            seq.push(c);
                        }
                        (Phase::Run, Label::Full) => seq.push(c),
                        (Phase::Run, Label::Partial) => {
                            phase = Phase::Tail;
                            seq.extend(self.nodes[c].children.iter().rev().copied());
                        }
                        (Phase::Run, Label::Empty) => {
                            phase = Phase::Tail;
                            seq.push(c);
                        }
                        _ => return Err(Unsatisfiable),
                    }
                }
                self.nodes[x].children = seq;
                Ok(())
            }
        }
    }

    fn partition(
        &mut self,
        x: usize,
        s: &FxHashSet<usize>,
    ) -> Result<(Vec<usize>, Vec<usize>, Vec<usize>), Unsatisfiable> {
        let children = self.nodes[x].children.clone();
        let (mut empty, mut full, mut part) = (Vec::new(), Vec::new(), Vec::new());
        for c in children {
            match self.label(c, s)? {
                Label::Empty => empty.push(c),
                Label::Full => full.push(c),
                Label::Partial => part.push(c),
            }
        }
        Ok((empty, full, part))
    }

    /// Appends a group of same-label children: nothing for zero, the child
    /// itself for one, a fresh P-node for more.
    fn push_group(&mut self, seq: &mut Vec<usize>, group: Vec<usize>) {
        match group.len() {
            0 => {}
            1 => seq.push(group[0]),
            _ => {
                let p = self.add(Kind::P, group);
                seq.push(p);
            }
        }
    }

    /// Number of frontiers the tree admits: `k!` per P-node, 2 per Q-node
    /// with at least two children.
    pub fn valid_count(&self) -> u64 {
        self.count_node(self.root)
    }

    fn count_node(&self, x: usize) -> u64 {
        let node = &self.nodes[x];
        let below: u64 = node.children.iter().map(|&c| self.count_node(c)).product();
        match node.kind {
            Kind::Leaf(_) => 1,
            Kind::P => factorial(node.children.len()) * below,
            Kind::Q if node.children.len() >= 2 => 2 * below,
            Kind::Q => below,
        }
    }

    /// All admissible permutations, capped at `limit` (0 = unlimited).
    pub fn enumerate(&self, limit: usize) -> Vec<Vec<usize>> {
        self.frontiers(self.root, limit)
    }

    fn frontiers(&self, x: usize, limit: usize) -> Vec<Vec<usize>> {
        let node = &self.nodes[x];
        match node.kind {
            Kind::Leaf(e) => vec![vec![e]],
            Kind::P => {
                let per_child: Vec<Vec<Vec<usize>>> = node
                    .children
                    .iter()
                    .map(|&c| self.frontiers(c, limit))
                    .collect();
                let mut out = Vec::new();
                for perm in Permutations::new(per_child.len()) {
                    let ordered: Vec<&Vec<Vec<usize>>> =
                        perm.iter().map(|&i| &per_child[i]).collect();
                    compose(&ordered, &mut out, limit);
                    if limit > 0 && out.len() >= limit {
                        break;
                    }
                }
                out
            }
            Kind::Q => {
                let per_child: Vec<Vec<Vec<usize>>> = node
                    .children
                    .iter()
                    .map(|&c| self.frontiers(c, limit))
                    .collect();
                let mut out = Vec::new();
                let forward: Vec<&Vec<Vec<usize>>> = per_child.iter().collect();
                compose(&forward, &mut out, limit);
                if node.children.len() >= 2 && (limit == 0 || out.len() < limit) {
                    let backward: Vec<&Vec<Vec<usize>>> = per_child.iter().rev().collect();
                    compose(&backward, &mut out, limit);
                }
                out
            }
        }
    }

    pub fn to_string_with_labels(&self, labels: &[&str]) -> String {
        let mut out = String::new();
        self.fmt_node(self.root, labels, &mut out);
        out
    }

    fn fmt_node(&self, x: usize, labels: &[&str], out: &mut String) {
        let node = &self.nodes[x];
        match node.kind {
            Kind::Leaf(e) => match labels.get(e) {
                Some(l) => out.push_str(l),
                None => out.push_str(&e.to_string()),
            },
            Kind::P | Kind::Q => {
                let (open, close) = if node.kind == Kind::P {
                    ('(', ')')
                } else {
                    ('[', ']')
                };
                out.push(open);
                for (i, &c) in node.children.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    self.fmt_node(c, labels, out);
                }
                out.push(close);
            }
        }
    }

    pub(super) fn root(&self) -> usize {
        self.root
    }

    pub(super) fn shape(&self, x: usize) -> (Option<usize>, &[usize]) {
        let node = &self.nodes[x];
        match node.kind {
            Kind::Leaf(e) => (Some(e), &[]),
            _ => (None, &node.children),
        }
    }

    pub(super) fn is_p(&self, x: usize) -> bool {
        self.nodes[x].kind == Kind::P
    }
}

impl fmt::Display for PqTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with_labels(&[]))
    }
}

/// Non-root pattern: empties, at most one partial, then fulls.
fn fits_empty_then_full(labels: &[Label]) -> bool {
    let mut in_full = false;
    for &l in labels {
        match (in_full, l) {
            (false, Label::Empty) => {}
            (false, Label::Partial) | (false, Label::Full) => in_full = true,
            (true, Label::Full) => {}
            (true, _) => return false,
        }
    }
    true
}

/// Odometer product of the child frontier lists, in the given child order.
fn compose(per_child: &[&Vec<Vec<usize>>], out: &mut Vec<Vec<usize>>, limit: usize) {
    if per_child.is_empty() {
        out.push(Vec::new());
        return;
    }
    if per_child.iter().any(|c| c.is_empty()) {
        return;
    }

    let mut idx = vec![0usize; per_child.len()];
    loop {
        let mut seq = Vec::new();
        for (j, child) in per_child.iter().enumerate() {
            seq.extend(&child[idx[j]]);
        }
        out.push(seq);
        if limit > 0 && out.len() >= limit {
            return;
        }

        let mut j = per_child.len();
        loop {
            if j == 0 {
                return;
            }
            j -= 1;
            idx[j] += 1;
            if idx[j] < per_child[j].len() {
                break;
            }
            idx[j] = 0;
        }
    }
}
