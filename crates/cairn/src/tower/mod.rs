//! Tower layout: row orders, widths, and block geometry for a normalized
//! layered graph.

mod block;
mod brittle;
mod maintainers;
mod merge;
mod randomize;
mod svg;
mod width;

pub use block::Block;
pub use brittle::is_brittle;
pub use maintainers::{rank_maintainers, MaintainerRanking, PackageRole, Role};
pub use merge::merge_subdividers;
pub use randomize::{randomize, RandomizeOptions};
pub use svg::{render_svg, EdgeLine, Simple, Style, StyledBlock};
pub use width::{compute_widths, compute_widths_bottom_up};

use std::collections::BTreeMap;

use crate::dag::Dag;
use crate::order::{Barycentric, Orderer, RowOrders};
use rustc_hash::FxHashMap;

const DEFAULT_AUX_RATIO: f64 = 0.2;
const DEFAULT_MARGIN_RATIO: f64 = 0.05;

/// The geometry a renderer consumes: one block per node, plus the orders and
/// frame parameters they were derived from.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub frame_width: f64,
    pub frame_height: f64,
    pub blocks: BTreeMap<String, Block>,
    pub row_orders: RowOrders,
    pub margin_x: f64,
    pub margin_y: f64,
}

pub struct BuildOptions {
    pub orderer: Box<dyn Orderer>,
    /// Height of an all-auxiliary row relative to a normal row.
    pub aux_ratio: f64,
    /// Margin on each side, as a fraction of the frame dimension.
    pub margin_ratio: f64,
    /// Propagate widths from the top row down instead of bottom-up.
    pub top_down_widths: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            orderer: Box::new(Barycentric::default()),
            aux_ratio: DEFAULT_AUX_RATIO,
            margin_ratio: DEFAULT_MARGIN_RATIO,
            top_down_widths: false,
        }
    }
}

pub fn build(g: &Dag, width: f64, height: f64, opts: &BuildOptions) -> Layout {
    let margin_x = width * opts.margin_ratio;
    let margin_y = height * opts.margin_ratio;

    let orders = opts.orderer.order_rows(g);
    let widths = if opts.top_down_widths {
        compute_widths(g, &orders, width - 2.0 * margin_x)
    } else {
        compute_widths_bottom_up(g, &orders, width - 2.0 * margin_x)
    };
    let heights = compute_row_heights(g, height - 2.0 * margin_y, opts.aux_ratio);
    let bottoms = compute_row_bottoms(&heights);
    let blocks = assemble_blocks(&orders, &widths, &heights, &bottoms, margin_x, margin_y);

    Layout {
        frame_width: width,
        frame_height: height,
        blocks,
        row_orders: orders,
        margin_x,
        margin_y,
    }
}

/// Rows made up entirely of auxiliary nodes get only `aux_ratio` of a normal
/// row's height; subdividers do not qualify a row.
fn compute_row_heights(g: &Dag, total_height: f64, aux_ratio: f64) -> BTreeMap<usize, f64> {
    let rows = g.row_ids();
    if rows.is_empty() {
        return BTreeMap::new();
    }

    let mut is_aux = Vec::with_capacity(rows.len());
    let mut aux_count = 0usize;
    for &r in &rows {
        let nodes = g.nodes_in_row(r);
        let all_auxiliary = !nodes.is_empty() && nodes.iter().all(|n| n.is_auxiliary());
        is_aux.push(all_auxiliary);
        if all_auxiliary {
            aux_count += 1;
        }
    }

    let regular_count = (rows.len() - aux_count) as f64;
    let unit = total_height / (regular_count + aux_count as f64 * aux_ratio);

    rows.iter()
        .zip(is_aux)
        .map(|(&r, aux)| (r, if aux { unit * aux_ratio } else { unit }))
        .collect()
}

fn compute_row_bottoms(heights: &BTreeMap<usize, f64>) -> BTreeMap<usize, f64> {
    let mut bottoms = BTreeMap::new();
    let mut y = 0.0;
    for (&r, &h) in heights {
        bottoms.insert(r, y);
        y += h;
    }
    bottoms
}

fn assemble_blocks(
    orders: &RowOrders,
    widths: &FxHashMap<String, f64>,
    heights: &BTreeMap<usize, f64>,
    bottoms: &BTreeMap<usize, f64>,
    margin_x: f64,
    margin_y: f64,
) -> BTreeMap<String, Block> {
    let mut blocks = BTreeMap::new();
    for (row, ids) in orders {
        let mut x = margin_x;
        let y = bottoms.get(row).copied().unwrap_or(0.0) + margin_y;
        let h = heights.get(row).copied().unwrap_or(0.0);

        for id in ids {
            let w = widths.get(id.as_str()).copied().unwrap_or(0.0);
            blocks.insert(
                id.clone(),
                Block {
                    node_id: id.clone(),
                    left: x,
                    right: x + w,
                    bottom: y,
                    top: y + h,
                },
            );
            x += w;
        }
    }
    blocks
}
