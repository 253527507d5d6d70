//! Seeded jitter for a hand-drawn look.
//!
//! Alternating rows get their blocks shrunk by a random factor around their
//! centers (a checkerboard, so towers stay readable), then a repair pass
//! restores a minimum horizontal overlap between every parent and child so
//! no edge ends up floating.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dag::Dag;
use crate::tower::Layout;

#[derive(Debug, Clone, Copy)]
pub struct RandomizeOptions {
    /// Maximum random width reduction, 0..=1. Zero disables jitter.
    pub width_shrink: f64,
    pub min_block_width: f64,
    pub min_gap: f64,
    pub min_overlap: f64,
}

impl Default for RandomizeOptions {
    fn default() -> Self {
        Self {
            width_shrink: 0.85,
            min_block_width: 30.0,
            min_gap: 5.0,
            min_overlap: 10.0,
        }
    }
}

pub fn randomize(layout: &Layout, g: &Dag, seed: u64, opts: &RandomizeOptions) -> Layout {
    let shrink = opts.width_shrink.clamp(0.0, 1.0);
    if shrink == 0.0 {
        return layout.clone();
    }

    let mut out = layout.clone();
    let mut rng = StdRng::seed_from_u64(seed);

    shrink_checkerboard(&mut out, &mut rng, shrink, opts);
    ensure_minimum_overlap(g, &mut out, opts.min_overlap);
    out
}

fn shrink_checkerboard(layout: &mut Layout, rng: &mut StdRng, shrink: f64, opts: &RandomizeOptions) {
    let rows: Vec<usize> = layout.row_orders.keys().copied().collect();
    for (row_idx, row) in rows.iter().enumerate() {
        if row_idx == 0 {
            continue;
        }
        for node_id in &layout.row_orders[row] {
            let Some(block) = layout.blocks.get_mut(node_id) else {
                continue;
            };
            let center = (block.left + block.right) / 2.0;
            let mut width = block.right - block.left - 2.0 * opts.min_gap;
            if row_idx % 2 == 1 {
                width *= 1.0 - rng.random::<f64>() * shrink;
            }
            width = width.max(opts.min_block_width);
            block.left = center - width / 2.0;
            block.right = center + width / 2.0;
        }
    }
}

fn ensure_minimum_overlap(g: &Dag, layout: &mut Layout, min_overlap: f64) {
    for _ in 0..10 {
        let mut changed = false;
        for edge in g.edges() {
            let (Some(parent), Some(child)) =
                (layout.blocks.get(&edge.from), layout.blocks.get(&edge.to))
            else {
                continue;
            };
            if overlap(parent.left, parent.right, child.left, child.right) >= min_overlap {
                continue;
            }
            changed = true;

            let (mut p_left, mut p_right) = (parent.left, parent.right);
            let (mut c_left, mut c_right) = (child.left, child.right);
            if (p_left + p_right) / 2.0 < (c_left + c_right) / 2.0 {
                p_right = p_right.max(c_left + min_overlap);
                c_left = c_left.min(p_right - min_overlap);
            } else {
                p_left = p_left.min(c_right - min_overlap);
                c_right = c_right.max(p_left + min_overlap);
            }

            if let Some(parent) = layout.blocks.get_mut(&edge.from) {
                parent.left = p_left;
                parent.right = p_right;
            }
            if let Some(child) = layout.blocks.get_mut(&edge.to) {
                child.left = c_left;
                child.right = c_right;
            }
        }
        if !changed {
            break;
        }
    }
}

fn overlap(a1: f64, a2: f64, b1: f64, b2: f64) -> f64 {
    (a2.min(b2) - a1.max(b1)).max(0.0)
}
