//! Intersection of two Bézier triangles in the plane.
//!
//! The entry points are [`geometric_intersect`] and [`algebraic_intersect`],
//! which differ only in the curve-curve primitive used to intersect the
//! surfaces' boundary edges. Everything downstream of that primitive is
//! shared: raw parameter pairs are classified edge pair by edge pair, corner
//! duplicates are filtered (and optionally verified), and the surviving
//! crossings are chained into curved polygons bounding the intersection
//! region.

use std::collections::BTreeSet;

use crate::error::{IntersectionError, Result};
use crate::geometry::Surface;
use crate::math::bbox::{bbox_intersect, BoxIntersection};
use crate::math::Point2;

mod algebraic;
mod classify;
mod geometric;
mod polygon;

pub use algebraic::AlgebraicIntersector;
pub use classify::{classify_intersection, handle_ends};
pub use geometric::GeometricIntersector;
pub use polygon::{Containment, EdgeInfo};

/// Relative tolerance under which two parameter values on the same edge
/// pair count as the same intersection: `2^-40`.
const SAME_INTERSECTION_WIGGLE: f64 = f64::EPSILON * 4096.0;

/// A point where an edge of one surface meets an edge of the other.
///
/// Parameters satisfy `0.0 <= s < 1.0` and `0.0 <= t < 1.0` after corner
/// normalization by [`handle_ends`]; `interior_curve` records which
/// surface's boundary continues into the intersection region, and stays
/// `None` for corner duplicates that were never classified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub index_first: usize,
    pub s: f64,
    pub index_second: usize,
    pub t: f64,
    pub interior_curve: Option<IntersectionClassification>,
}

impl Intersection {
    #[must_use]
    pub fn new(index_first: usize, s: f64, index_second: usize, t: f64) -> Self {
        Self {
            index_first,
            s,
            index_second,
            t,
            interior_curve: None,
        }
    }
}

/// How a single edge-edge crossing relates to the intersection region.
///
/// Only [`First`](Self::First) and [`Second`](Self::Second) crossings
/// contribute arcs to the boundary of the region; every other kind is set
/// aside, though the full set of kinds seen still decides the outcome when
/// no usable crossing remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntersectionClassification {
    /// The first surface's edge continues into the region.
    First,
    /// The second surface's edge continues into the region.
    Second,
    /// Tangent crossing with the surfaces on opposite sides; no interior
    /// is shared near the point.
    Opposed,
    /// Tangent crossing where the first surface's edge stays interior.
    TangentFirst,
    /// Tangent crossing where the second surface's edge stays interior.
    TangentSecond,
    /// A corner touch with no shared interior.
    IgnoredCorner,
    /// The edges coincide near the crossing.
    Coincident,
}

/// Pairwise intersection of two Bézier curves, pluggable into
/// [`generic_intersect`].
pub trait CurveIntersector {
    /// Returns every parameter pair `(s, t)` with `B1(s) = B2(t)`, both in
    /// the unit interval, sorted by `s`.
    ///
    /// Coincident curves are reported through the parameter pairs of the
    /// shared segment's endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error when the pair is too degenerate to resolve, e.g.
    /// coincident algebraic curves whose overlap cannot be parameterized.
    fn all_intersections(&self, nodes1: &[Point2], nodes2: &[Point2]) -> Result<Vec<(f64, f64)>>;
}

/// The outcome of intersecting two surfaces.
#[derive(Debug, Clone)]
pub struct SurfaceIntersectionResult {
    /// Curved polygons bounding the intersection region, each a chain of
    /// [`EdgeInfo`] arcs. `None` when one surface is contained in the
    /// other; `Some` and empty when the surfaces are disjoint.
    pub curved_polygons: Option<Vec<Vec<EdgeInfo>>>,
    /// Which surface is contained in the other, when either is.
    pub contained: Option<Containment>,
    /// The six boundary edges referenced by [`EdgeInfo::index`]: the first
    /// surface's three edges followed by the second's. Empty unless
    /// `curved_polygons` holds at least one polygon.
    pub edge_nodes: Vec<Vec<Point2>>,
}

fn parameter_close(value: f64, other: f64) -> bool {
    (value - other).abs() <= SAME_INTERSECTION_WIGGLE * other.abs()
}

/// Whether two intersections agree to within relative round-off on the
/// same edge pair.
#[must_use]
pub fn same_intersection(intersection1: &Intersection, intersection2: &Intersection) -> bool {
    intersection1.index_first == intersection2.index_first
        && intersection1.index_second == intersection2.index_second
        && parameter_close(intersection1.s, intersection2.s)
        && parameter_close(intersection1.t, intersection2.t)
}

/// Checks that the corner duplicates produced by an edge-pair sweep are
/// exactly the ones the sweep geometry predicts.
///
/// Every crossing at a surface corner is rediscovered by the adjacent edge
/// pairs: once more when one parameter is zero, three more times when both
/// are. Anything else indicates the underlying curve intersector
/// misbehaved.
///
/// # Errors
///
/// Returns an error when two uniques coincide, a duplicate matches no
/// unique (or several), or a matched unique has a duplicate count that
/// disagrees with its corner configuration.
pub fn verify_duplicates(duplicates: &[Intersection], uniques: &[Intersection]) -> Result<()> {
    for (position, unique1) in uniques.iter().enumerate() {
        for unique2 in &uniques[position + 1..] {
            if same_intersection(unique1, unique2) {
                return Err(IntersectionError::NonUnique {
                    index_first: unique2.index_first,
                    s: unique2.s,
                    index_second: unique2.index_second,
                    t: unique2.t,
                }
                .into());
            }
        }
    }

    let mut counts = vec![0_usize; uniques.len()];
    for duplicate in duplicates {
        let matches: Vec<usize> = uniques
            .iter()
            .enumerate()
            .filter(|(_, unique)| same_intersection(duplicate, unique))
            .map(|(index, _)| index)
            .collect();
        match matches[..] {
            [matched] => counts[matched] += 1,
            _ => {
                return Err(IntersectionError::DuplicateNotMatched {
                    index_first: duplicate.index_first,
                    s: duplicate.s,
                    index_second: duplicate.index_second,
                    t: duplicate.t,
                    matches: matches.len(),
                }
                .into())
            }
        }
    }

    for (index, &count) in counts.iter().enumerate() {
        let unique = &uniques[index];
        match count {
            0 => {}
            1 => {
                if (unique.s == 0.0) == (unique.t == 0.0) {
                    return Err(IntersectionError::SingleCornerExpected {
                        s: unique.s,
                        t: unique.t,
                    }
                    .into());
                }
            }
            3 => {
                if unique.s != 0.0 || unique.t != 0.0 {
                    return Err(IntersectionError::DoubleCornerExpected {
                        s: unique.s,
                        t: unique.t,
                    }
                    .into());
                }
            }
            other => return Err(IntersectionError::UnexpectedDuplicateCount(other).into()),
        }
    }
    Ok(())
}

/// Classifies one raw parameter pair and routes the resulting
/// [`Intersection`] to the duplicate, accepted, or unused bucket.
fn add_intersection(
    index1: usize,
    s: f64,
    index2: usize,
    t: f64,
    edge_nodes1: &[Vec<Point2>; 3],
    edge_nodes2: &[Vec<Point2>; 3],
    duplicates: &mut Vec<Intersection>,
    intersections: &mut Vec<Intersection>,
    unused: &mut Vec<Intersection>,
    all_types: &mut BTreeSet<IntersectionClassification>,
) -> Result<()> {
    let (edge_end, (index1, s, index2, t)) = handle_ends(index1, s, index2, t);
    if edge_end {
        duplicates.push(Intersection::new(index1, s, index2, t));
        return Ok(());
    }
    let mut intersection = Intersection::new(index1, s, index2, t);
    let interior = classify_intersection(&intersection, edge_nodes1, edge_nodes2)?;
    all_types.insert(interior);
    intersection.interior_curve = Some(interior);
    match interior {
        IntersectionClassification::First | IntersectionClassification::Second => {
            intersections.push(intersection);
        }
        _ => unused.push(intersection),
    }
    Ok(())
}

/// Intersects all nine pairs of boundary edges.
///
/// Crossings with `s == 1.0` or `t == 1.0` are normalized onto the
/// adjacent edge and reported as duplicates rather than classified.
///
/// # Errors
///
/// Propagates curve-intersector failures and unclassifiable tangencies.
pub fn surface_intersections(
    edge_nodes1: &[Vec<Point2>; 3],
    edge_nodes2: &[Vec<Point2>; 3],
    intersector: &impl CurveIntersector,
) -> Result<(
    Vec<Intersection>,
    Vec<Intersection>,
    Vec<Intersection>,
    BTreeSet<IntersectionClassification>,
)> {
    let mut intersections = Vec::new();
    let mut duplicates = Vec::new();
    let mut unused = Vec::new();
    let mut all_types = BTreeSet::new();
    for (index1, nodes1) in edge_nodes1.iter().enumerate() {
        for (index2, nodes2) in edge_nodes2.iter().enumerate() {
            for (s, t) in intersector.all_intersections(nodes1, nodes2)? {
                add_intersection(
                    index1,
                    s,
                    index2,
                    t,
                    edge_nodes1,
                    edge_nodes2,
                    &mut duplicates,
                    &mut intersections,
                    &mut unused,
                    &mut all_types,
                )?;
            }
        }
    }
    Ok((intersections, duplicates, unused, all_types))
}

/// Intersects two surfaces with the given curve-curve primitive.
///
/// With `verify` set, the corner duplicates collected during the edge
/// sweep are checked for consistency before assembly.
///
/// # Errors
///
/// Propagates curve-intersector failures, unclassifiable tangencies,
/// duplicate-verification failures, and polygon-assembly failures.
pub fn generic_intersect(
    surface1: &Surface,
    surface2: &Surface,
    verify: bool,
    intersector: &impl CurveIntersector,
) -> Result<SurfaceIntersectionResult> {
    if bbox_intersect(surface1.nodes(), surface2.nodes()) != BoxIntersection::Intersection {
        return Ok(SurfaceIntersectionResult {
            curved_polygons: Some(Vec::new()),
            contained: None,
            edge_nodes: Vec::new(),
        });
    }
    let edge_nodes1 = surface1.edges();
    let edge_nodes2 = surface2.edges();
    let (intersections, duplicates, unused, all_types) =
        surface_intersections(&edge_nodes1, &edge_nodes2, intersector)?;
    if verify {
        let uniques: Vec<Intersection> =
            intersections.iter().chain(&unused).copied().collect();
        verify_duplicates(&duplicates, &uniques)?;
    }
    let (curved_polygons, contained) =
        polygon::combine_intersections(&intersections, surface1, surface2, &all_types)?;
    let edge_nodes = match &curved_polygons {
        Some(polygons) if !polygons.is_empty() => {
            edge_nodes1.into_iter().chain(edge_nodes2).collect()
        }
        _ => Vec::new(),
    };
    Ok(SurfaceIntersectionResult {
        curved_polygons,
        contained,
        edge_nodes,
    })
}

/// Intersects two surfaces with the subdivision-based curve primitive.
///
/// # Errors
///
/// See [`generic_intersect`].
pub fn geometric_intersect(
    surface1: &Surface,
    surface2: &Surface,
    verify: bool,
) -> Result<SurfaceIntersectionResult> {
    generic_intersect(surface1, surface2, verify, &GeometricIntersector)
}

/// Intersects two surfaces with the resultant-based curve primitive.
///
/// # Errors
///
/// See [`generic_intersect`].
pub fn algebraic_intersect(
    surface1: &Surface,
    surface2: &Surface,
    verify: bool,
) -> Result<SurfaceIntersectionResult> {
    generic_intersect(surface1, surface2, verify, &AlgebraicIntersector)
}

/// Parameter pairs for curves whose control nets are exactly equal or
/// exactly reversed, the two coincidence configurations a boundary-edge
/// sweep produces for matching surfaces.
fn exact_coincident_parameters(nodes1: &[Point2], nodes2: &[Point2]) -> Option<Vec<(f64, f64)>> {
    if nodes1 == nodes2 {
        return Some(vec![(0.0, 0.0), (1.0, 1.0)]);
    }
    if nodes1.len() == nodes2.len() && nodes1.iter().rev().eq(nodes2.iter()) {
        return Some(vec![(0.0, 1.0), (1.0, 0.0)]);
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_triangle() -> Surface {
        Surface::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(0.0, 2.0),
            ],
            1,
        )
        .unwrap()
    }

    #[test]
    fn same_intersection_respects_edge_indices() {
        let int1 = Intersection::new(0, 0.5, 2, 0.25);
        let int2 = Intersection::new(1, 0.5, 2, 0.25);
        assert!(!same_intersection(&int1, &int2));
        assert!(same_intersection(&int1, &int1));
    }

    #[test]
    fn same_intersection_allows_relative_wiggle() {
        let int1 = Intersection::new(0, 0.5, 2, 0.25);
        let nudged = Intersection::new(0, 0.5 * (1.0 + f64::EPSILON * 8.0), 2, 0.25);
        assert!(same_intersection(&int1, &nudged));
        let moved = Intersection::new(0, 0.5 + 1e-6, 2, 0.25);
        assert!(!same_intersection(&int1, &moved));
    }

    #[test]
    fn verify_duplicates_accepts_single_corner() {
        let uniques = vec![Intersection::new(0, 0.0, 0, 0.5)];
        let duplicates = vec![Intersection::new(0, 0.0, 0, 0.5)];
        verify_duplicates(&duplicates, &uniques).unwrap();
    }

    #[test]
    fn verify_duplicates_accepts_double_corner() {
        let uniques = vec![Intersection::new(1, 0.0, 2, 0.0)];
        let duplicates = vec![
            Intersection::new(1, 0.0, 2, 0.0),
            Intersection::new(1, 0.0, 2, 0.0),
            Intersection::new(1, 0.0, 2, 0.0),
        ];
        verify_duplicates(&duplicates, &uniques).unwrap();
    }

    #[test]
    fn verify_duplicates_rejects_unmatched() {
        let uniques = vec![Intersection::new(0, 0.0, 0, 0.5)];
        let duplicates = vec![Intersection::new(2, 0.0, 0, 0.5)];
        assert!(verify_duplicates(&duplicates, &uniques).is_err());
    }

    #[test]
    fn verify_duplicates_rejects_interior_single() {
        // One duplicate whose unique is not on a corner.
        let uniques = vec![Intersection::new(0, 0.25, 0, 0.5)];
        let duplicates = vec![Intersection::new(0, 0.25, 0, 0.5)];
        assert!(verify_duplicates(&duplicates, &uniques).is_err());
    }

    #[test]
    fn verify_duplicates_rejects_count_two() {
        let uniques = vec![Intersection::new(1, 0.0, 2, 0.0)];
        let duplicates = vec![
            Intersection::new(1, 0.0, 2, 0.0),
            Intersection::new(1, 0.0, 2, 0.0),
        ];
        assert!(verify_duplicates(&duplicates, &uniques).is_err());
    }

    #[test]
    fn verify_duplicates_rejects_non_unique() {
        let uniques = vec![
            Intersection::new(0, 0.5, 0, 0.5),
            Intersection::new(0, 0.5, 0, 0.5),
        ];
        assert!(verify_duplicates(&[], &uniques).is_err());
    }

    #[test]
    fn disjoint_surfaces_yield_empty_result() {
        let surface1 = unit_triangle();
        let surface2 = Surface::new(
            vec![
                Point2::new(10.0, 10.0),
                Point2::new(12.0, 10.0),
                Point2::new(10.0, 12.0),
            ],
            1,
        )
        .unwrap();
        let result = geometric_intersect(&surface1, &surface2, true).unwrap();
        assert_eq!(result.curved_polygons.unwrap(), Vec::<Vec<EdgeInfo>>::new());
        assert!(result.contained.is_none());
        assert!(result.edge_nodes.is_empty());
    }

    #[test]
    fn identical_surfaces_produce_containment() {
        let surface1 = unit_triangle();
        let surface2 = unit_triangle();
        let result = geometric_intersect(&surface1, &surface2, true).unwrap();
        assert!(result.curved_polygons.is_none());
        assert_eq!(result.contained, Some(Containment::First));
    }

    #[test]
    fn overlapping_triangles_produce_one_polygon() {
        let surface1 = unit_triangle();
        let surface2 = Surface::new(
            vec![
                Point2::new(1.0, -1.0),
                Point2::new(4.0, -1.0),
                Point2::new(1.0, 2.0),
            ],
            1,
        )
        .unwrap();
        let result = geometric_intersect(&surface1, &surface2, true).unwrap();
        let polygons = result.curved_polygons.unwrap();
        assert_eq!(polygons.len(), 1);
        let polygon = &polygons[0];
        assert_eq!(polygon.len(), 3);
        // The overlap is the triangle (1, 0), (2, 0), (1, 1), bounded by
        // the second surface's left edge and parts of the first surface's
        // bottom edge and hypotenuse.
        assert_eq!(polygon[0].index, 5);
        assert_relative_eq!(polygon[0].start, 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(polygon[0].end, 2.0 / 3.0, epsilon = 1e-12);
        assert_eq!(polygon[1].index, 0);
        assert_relative_eq!(polygon[1].start, 0.5, epsilon = 1e-12);
        assert_relative_eq!(polygon[1].end, 1.0, epsilon = 1e-12);
        assert_eq!(polygon[2].index, 1);
        assert_relative_eq!(polygon[2].start, 0.0, epsilon = 1e-12);
        assert_relative_eq!(polygon[2].end, 0.5, epsilon = 1e-12);
        assert_eq!(result.edge_nodes.len(), 6);
    }

    #[test]
    fn strategies_agree_on_crossing_triangles() {
        let surface1 = unit_triangle();
        let surface2 = Surface::new(
            vec![
                Point2::new(1.0, -1.0),
                Point2::new(4.0, -1.0),
                Point2::new(1.0, 2.0),
            ],
            1,
        )
        .unwrap();
        let geometric = geometric_intersect(&surface1, &surface2, true).unwrap();
        let algebraic = algebraic_intersect(&surface1, &surface2, true).unwrap();
        let polygons_geo = geometric.curved_polygons.unwrap();
        let polygons_alg = algebraic.curved_polygons.unwrap();
        assert_eq!(polygons_geo.len(), polygons_alg.len());
        for (poly_geo, poly_alg) in polygons_geo.iter().zip(&polygons_alg) {
            assert_eq!(poly_geo.len(), poly_alg.len());
            for (arc_geo, arc_alg) in poly_geo.iter().zip(poly_alg) {
                assert_eq!(arc_geo.index, arc_alg.index);
                assert_relative_eq!(arc_geo.start, arc_alg.start, epsilon = 1e-8);
                assert_relative_eq!(arc_geo.end, arc_alg.end, epsilon = 1e-8);
            }
        }
    }
}
