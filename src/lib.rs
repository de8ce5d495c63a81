//! A Bézier-triangle intersection kernel.
//!
//! The crate models degree-`n` Bézier triangles in the plane and computes
//! the region where two of them overlap, reported either as curved
//! polygons assembled from boundary arcs or as containment of one surface
//! in the other. A subdivision-driven point locator with Newton refinement
//! answers the inverse question of which parameters map to a given point.

pub mod error;
pub mod geometry;
pub mod intersect;
pub mod locate;
pub mod math;

pub use error::{BeztriError, Result};
pub use geometry::Surface;
pub use intersect::{
    algebraic_intersect, geometric_intersect, Containment, EdgeInfo, SurfaceIntersectionResult,
};
pub use locate::{locate_point, newton_refine};
