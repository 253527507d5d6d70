//! Graph normalization pipeline.
//!
//! The passes run strictly in order: transitive reduction, longest-path
//! layering, long-edge subdivision with sink extension, span-overlap
//! resolution, and a second subdivision pass that restores unit-length edges
//! stretched by separator row shifts. The pipeline is idempotent only as a
//! whole.

mod layering;
mod reduction;
mod spans;
mod subdivide;

pub use layering::assign_layers;
pub use reduction::transitive_reduction;
pub use spans::resolve_span_overlaps;
pub use subdivide::subdivide;

use crate::dag::Dag;

pub fn normalize(g: &mut Dag) {
    transitive_reduction(g);
    assign_layers(g);
    subdivide(g);
    resolve_span_overlaps(g);
    subdivide(g);
}
