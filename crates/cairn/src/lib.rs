//! Layered dependency-tower layout.
//!
//! A dependency graph becomes a wall of stacked blocks: every package is a
//! rectangle, each row sits on the row of its dependencies, and widths flow
//! so a parent covers the union of its children. The pipeline is
//! [`transform::normalize`] to rewrite the raw DAG into a layered form with
//! unit-length edges, an [`order::Orderer`] to pick left-to-right orders
//! that keep edge crossings down, and [`tower::build`] to turn the orders
//! into block geometry.
//!
//! The [`perm`] module carries a standalone PQ-tree for reasoning about
//! which row permutations survive consecutivity constraints; it is an
//! analysis aid, not part of the pipeline.

pub mod dag;
pub mod dot;
pub mod io;
pub mod order;
pub mod perm;
pub mod tower;
pub mod transform;

mod crossings;

pub use crossings::{
    count_crossings, count_crossings_idx, count_layer_crossings, count_pair_crossings,
    count_pair_crossings_with_pos, CrossingWorkspace,
};
pub use dag::{Dag, Edge, GraphError, Metadata, Node, NodeKind};
pub use order::{Barycentric, OptimalSearch, Orderer, Quality, RowOrders};
pub use tower::{Block, Layout};
