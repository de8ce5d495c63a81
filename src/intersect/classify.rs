//! Classification of raw curve-curve crossings: endpoint normalization,
//! corner handling, and the tangent-based side test that decides which
//! surface's boundary continues into the intersection region.

use crate::error::{GeometryError, Result};
use crate::geometry::curve::{curvature, evaluate_hodograph};
use crate::math::{cross_product, Point2, Vector2};

use super::{Intersection, IntersectionClassification};

/// Normalizes crossings that land on an edge endpoint.
///
/// A parameter of exactly `1.0` is moved onto the adjacent edge's parameter
/// `0.0`; such a crossing is a duplicate of the corner intersection found
/// on the adjacent edge pair. Returns whether either parameter was an edge
/// end, along with the corrected construction arguments.
#[must_use]
pub fn handle_ends(
    index1: usize,
    s: f64,
    index2: usize,
    t: f64,
) -> (bool, (usize, f64, usize, f64)) {
    let mut edge_end = false;
    let (mut index1, mut s, mut index2, mut t) = (index1, s, index2, t);
    if s == 1.0 {
        s = 0.0;
        index1 = (index1 + 1) % 3;
        edge_end = true;
    }
    if t == 1.0 {
        t = 0.0;
        index2 = (index2 + 1) % 3;
        edge_end = true;
    }
    (edge_end, (index1, s, index2, t))
}

/// The corner cone of a surface at an edge start: spanned counterclockwise
/// from the outgoing edge tangent to the reversed tangent of the edge
/// arriving at the corner.
struct CornerCone {
    outgoing: Vector2,
    reversed_incoming: Vector2,
}

impl CornerCone {
    fn new(outgoing: Vector2, previous_edge: &[Point2]) -> Self {
        Self {
            outgoing,
            reversed_incoming: -evaluate_hodograph(previous_edge, 1.0),
        }
    }

    /// Whether `direction` lies (weakly) inside the cone. Corners of a
    /// valid surface are convex, so the cone spans less than a half turn
    /// and two half-plane tests suffice.
    fn contains(&self, direction: &Vector2) -> bool {
        cross_product(&self.outgoing, direction) >= 0.0
            && cross_product(direction, &self.reversed_incoming) >= 0.0
    }
}

/// A crossing where one curve starts at its surface's corner while the
/// other passes through: ignored when the corner cone lies entirely on the
/// exterior side of the passing edge.
fn ignored_edge_corner(
    edge_tangent: &Vector2,
    corner_tangent: &Vector2,
    corner_previous_edge: &[Point2],
) -> bool {
    if cross_product(edge_tangent, corner_tangent) > 0.0 {
        return false;
    }
    let reversed_incoming = -evaluate_hodograph(corner_previous_edge, 1.0);
    cross_product(edge_tangent, &reversed_incoming) <= 0.0
}

/// A crossing at a corner of both surfaces: ignored when the two corner
/// cones share no direction, i.e. the surfaces only touch at the point.
fn ignored_double_corner(
    intersection: &Intersection,
    tangent_s: &Vector2,
    tangent_t: &Vector2,
    edge_nodes1: &[Vec<Point2>; 3],
    edge_nodes2: &[Vec<Point2>; 3],
) -> bool {
    let prev1 = &edge_nodes1[(intersection.index_first + 2) % 3];
    let prev2 = &edge_nodes2[(intersection.index_second + 2) % 3];
    let cone1 = CornerCone::new(*tangent_s, prev1);
    let cone2 = CornerCone::new(*tangent_t, prev2);
    !(cone1.contains(&cone2.outgoing)
        || cone1.contains(&cone2.reversed_incoming)
        || cone2.contains(&cone1.outgoing)
        || cone2.contains(&cone1.reversed_incoming))
}

fn ignored_corner(
    intersection: &Intersection,
    tangent_s: &Vector2,
    tangent_t: &Vector2,
    edge_nodes1: &[Vec<Point2>; 3],
    edge_nodes2: &[Vec<Point2>; 3],
) -> bool {
    if intersection.s == 0.0 {
        if intersection.t == 0.0 {
            ignored_double_corner(intersection, tangent_s, tangent_t, edge_nodes1, edge_nodes2)
        } else {
            let prev1 = &edge_nodes1[(intersection.index_first + 2) % 3];
            ignored_edge_corner(tangent_t, tangent_s, prev1)
        }
    } else if intersection.t == 0.0 {
        let prev2 = &edge_nodes2[(intersection.index_second + 2) % 3];
        ignored_edge_corner(tangent_s, tangent_t, prev2)
    } else {
        false
    }
}

/// Side test for a crossing with parallel tangents, using curvature to
/// decide which boundary stays interior.
fn classify_tangent(
    nodes1: &[Point2],
    tangent1: &Vector2,
    s: f64,
    nodes2: &[Point2],
    tangent2: &Vector2,
    t: f64,
) -> Result<IntersectionClassification> {
    let dot_prod = tangent1.dot(tangent2);
    let curvature1 = curvature(nodes1, tangent1, s);
    let curvature2 = curvature(nodes2, tangent2, t);
    if dot_prod < 0.0 {
        // Curves traversed in opposite directions; the tangency is usable
        // only when the arcs bend away from one another.
        let sign1 = sign(curvature1);
        let sign2 = sign(curvature2);
        if sign1 == sign2 {
            if sign1 == 1 {
                return Ok(IntersectionClassification::Opposed);
            }
            return Err(GeometryError::Degenerate(
                "tangent curves define an interior pocket".into(),
            )
            .into());
        }
        let delta = curvature1.abs() - curvature2.abs();
        if delta == 0.0 {
            return Err(GeometryError::Degenerate(
                "tangent curves with the same curvature, moving in opposite directions".into(),
            )
            .into());
        }
        if sign1 == sign(delta) {
            Ok(IntersectionClassification::Opposed)
        } else {
            Err(GeometryError::Degenerate(
                "tangent curves define an interior pocket".into(),
            )
            .into())
        }
    } else if curvature1 > curvature2 {
        Ok(IntersectionClassification::TangentFirst)
    } else if curvature1 < curvature2 {
        Ok(IntersectionClassification::TangentSecond)
    } else {
        Ok(IntersectionClassification::Coincident)
    }
}

fn sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

/// Classifies a crossing by comparing the two curves' tangent directions.
///
/// Expects `s < 1.0` and `t < 1.0` (edge ends were normalized away by
/// [`handle_ends`]). A negative tangent cross product means the first
/// surface's boundary continues into the intersection, positive means the
/// second's; parallel tangents fall through to the curvature comparison.
///
/// # Errors
///
/// Returns an error for tangent configurations whose topology cannot be
/// decided from local data (equal-curvature osculation of distinct curves).
pub fn classify_intersection(
    intersection: &Intersection,
    edge_nodes1: &[Vec<Point2>; 3],
    edge_nodes2: &[Vec<Point2>; 3],
) -> Result<IntersectionClassification> {
    let nodes1 = &edge_nodes1[intersection.index_first];
    let nodes2 = &edge_nodes2[intersection.index_second];
    if nodes1 == nodes2 {
        // The edges carry identical control nets, so every point of the
        // pair is shared; the crossing contributes no boundary arc.
        return Ok(IntersectionClassification::Coincident);
    }
    let tangent1 = evaluate_hodograph(nodes1, intersection.s);
    let tangent2 = evaluate_hodograph(nodes2, intersection.t);
    if ignored_corner(intersection, &tangent1, &tangent2, edge_nodes1, edge_nodes2) {
        return Ok(IntersectionClassification::IgnoredCorner);
    }
    let cross_prod = cross_product(&tangent1, &tangent2);
    if cross_prod < 0.0 {
        Ok(IntersectionClassification::First)
    } else if cross_prod > 0.0 {
        Ok(IntersectionClassification::Second)
    } else {
        classify_tangent(
            nodes1,
            &tangent1,
            intersection.s,
            nodes2,
            &tangent2,
            intersection.t,
        )
    }
}
