//! Within-row ordering to minimize edge crossings.
//!
//! Two orderers share one contract: given a layered graph, produce the
//! left-to-right order of every row. [`Barycentric`] is the fast heuristic;
//! [`OptimalSearch`] is an exhaustive branch-and-bound that falls back to
//! its best-known answer when a timeout expires.

mod barycentric;
mod optimal;
mod position;

pub use barycentric::{transpose, Barycentric};
pub use optimal::{OptimalSearch, ProgressFn};
pub use position::{barycenter_deviation, median_position};

use std::collections::BTreeMap;
use std::time::Duration;

use crate::dag::Dag;

/// Left-to-right node ids per row.
pub type RowOrders = BTreeMap<usize, Vec<String>>;

pub trait Orderer {
    fn order_rows(&self, g: &Dag) -> RowOrders;
}

/// Preset trade-offs between layout quality and wall time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    #[default]
    Fast,
    Balanced,
    Optimal,
}

pub const DEFAULT_TIMEOUT_FAST: Duration = Duration::from_millis(100);
pub const DEFAULT_TIMEOUT_BALANCED: Duration = Duration::from_secs(5);
pub const DEFAULT_TIMEOUT_OPTIMAL: Duration = Duration::from_secs(60);

impl Quality {
    pub fn orderer(self) -> Box<dyn Orderer> {
        match self {
            Quality::Fast => Box::new(Barycentric::default()),
            Quality::Balanced => Box::new(OptimalSearch {
                timeout: Some(DEFAULT_TIMEOUT_BALANCED),
                ..Default::default()
            }),
            Quality::Optimal => Box::new(OptimalSearch {
                timeout: Some(DEFAULT_TIMEOUT_OPTIMAL),
                ..Default::default()
            }),
        }
    }
}

/// The ID-sorted baseline ordering every refinement starts from.
pub(crate) fn init_orders(g: &Dag) -> RowOrders {
    let mut orders = RowOrders::new();
    for row in g.row_ids() {
        let mut ids: Vec<String> = g.nodes_in_row(row).iter().map(|n| n.id.clone()).collect();
        ids.sort();
        orders.insert(row, ids);
    }
    orders
}
