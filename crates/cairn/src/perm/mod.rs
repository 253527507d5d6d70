//! Permutation utilities and the PQ-tree.

mod dot;
mod pqtree;

pub use pqtree::PqTree;

/// `[0, 1, ..., n-1]`.
pub fn seq(n: usize) -> Vec<usize> {
    (0..n).collect()
}

pub fn factorial(n: usize) -> u64 {
    (2..=n as u64).product()
}

/// Lazy permutation generator using Heap's algorithm. Yields each
/// permutation of `0..n` exactly once, starting with the identity.
#[derive(Debug)]
pub struct Permutations {
    perm: Vec<usize>,
    state: Vec<usize>,
    i: usize,
    started: bool,
}

impl Permutations {
    pub fn new(n: usize) -> Self {
        Self {
            perm: seq(n),
            state: vec![0; n],
            i: 0,
            started: false,
        }
    }
}

impl Iterator for Permutations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if !self.started {
            self.started = true;
            return Some(self.perm.clone());
        }

        let n = self.perm.len();
        while self.i < n {
            let i = self.i;
            if self.state[i] < i {
                if i % 2 == 0 {
                    self.perm.swap(0, i);
                } else {
                    self.perm.swap(self.state[i], i);
                }
                self.state[i] += 1;
                self.i = 0;
                return Some(self.perm.clone());
            }
            self.state[i] = 0;
            self.i += 1;
        }
        None
    }
}

/// All permutations of `0..n`, capped at `limit` (0 = unlimited).
pub fn generate(n: usize, limit: usize) -> Vec<Vec<usize>> {
    let cap = if limit == 0 { usize::MAX } else { limit };
    Permutations::new(n).take(cap).collect()
}
