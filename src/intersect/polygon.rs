//! Assembly of classified edge crossings into curved polygons.
//!
//! Accepted crossings are chained by walking along whichever surface's
//! boundary continues into the intersection region, hopping between edges
//! at surface corners, until the walk returns to its starting crossing.

use std::collections::BTreeSet;

use crate::error::{IntersectionError, Result};
use crate::geometry::Surface;
use crate::locate;

use super::{Intersection, IntersectionClassification};

/// Cap on the number of arcs in one curved polygon. Two Bézier triangles
/// cannot bound an intersection region with more sides than this.
const MAX_EDGES: usize = 10;

/// One arc of a curved polygon: the parameter interval `[start, end]` of a
/// boundary edge. Indices `0..3` refer to the first surface's edges,
/// `3..6` to the second's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeInfo {
    pub index: usize,
    pub start: f64,
    pub end: f64,
}

/// Which surface lies entirely inside the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// The first surface is contained in the second.
    First,
    /// The second surface is contained in the first.
    Second,
}

/// A stop on the boundary walk: either one of the accepted crossings, or a
/// synthetic corner node created when a walk runs off the end of an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
enum WalkNode {
    Existing(usize),
    CornerFirst { index: usize, s: f64 },
    CornerSecond { index: usize, t: f64 },
}

fn node_classification(
    node: WalkNode,
    intersections: &[Intersection],
) -> Result<IntersectionClassification> {
    match node {
        WalkNode::Existing(position) => intersections[position]
            .interior_curve
            .ok_or_else(|| IntersectionError::InconsistentPath.into()),
        WalkNode::CornerFirst { .. } => Ok(IntersectionClassification::First),
        WalkNode::CornerSecond { .. } => Ok(IntersectionClassification::Second),
    }
}

fn node_first(node: WalkNode, intersections: &[Intersection]) -> Option<(usize, f64)> {
    match node {
        WalkNode::Existing(position) => {
            let intersection = &intersections[position];
            Some((intersection.index_first, intersection.s))
        }
        WalkNode::CornerFirst { index, s } => Some((index, s)),
        WalkNode::CornerSecond { .. } => None,
    }
}

fn node_second(node: WalkNode, intersections: &[Intersection]) -> Option<(usize, f64)> {
    match node {
        WalkNode::Existing(position) => {
            let intersection = &intersections[position];
            Some((intersection.index_second, intersection.t))
        }
        WalkNode::CornerSecond { index, t } => Some((index, t)),
        WalkNode::CornerFirst { .. } => None,
    }
}

/// Moves a node sitting at the end of an edge (parameter `1.0`) onto the
/// start of the next edge, reusing an accepted crossing already there if
/// one exists.
fn to_front(
    node: WalkNode,
    intersections: &[Intersection],
    unused: &mut BTreeSet<usize>,
) -> WalkNode {
    let moved = match node {
        WalkNode::CornerFirst { index, s } if s == 1.0 => {
            let front = (index + 1) % 3;
            intersections
                .iter()
                .position(|other| other.s == 0.0 && other.index_first == front)
                .map_or(WalkNode::CornerFirst { index: front, s: 0.0 }, WalkNode::Existing)
        }
        WalkNode::CornerSecond { index, t } if t == 1.0 => {
            let front = (index + 1) % 3;
            intersections
                .iter()
                .position(|other| other.t == 0.0 && other.index_second == front)
                .map_or(WalkNode::CornerSecond { index: front, t: 0.0 }, WalkNode::Existing)
        }
        other => other,
    };
    if let WalkNode::Existing(position) = moved {
        unused.remove(&position);
    }
    moved
}

fn get_next_first(index_first: usize, s: f64, intersections: &[Intersection]) -> WalkNode {
    let mut along_edge: Option<usize> = None;
    for (position, other) in intersections.iter().enumerate() {
        if other.index_first == index_first && other.s > s {
            let closer = match along_edge {
                None => true,
                Some(best) => other.s < intersections[best].s,
            };
            if closer {
                along_edge = Some(position);
            }
        }
    }
    along_edge.map_or(
        WalkNode::CornerFirst {
            index: index_first,
            s: 1.0,
        },
        WalkNode::Existing,
    )
}

fn get_next_second(index_second: usize, t: f64, intersections: &[Intersection]) -> WalkNode {
    let mut along_edge: Option<usize> = None;
    for (position, other) in intersections.iter().enumerate() {
        if other.index_second == index_second && other.t > t {
            let closer = match along_edge {
                None => true,
                Some(best) => other.t < intersections[best].t,
            };
            if closer {
                along_edge = Some(position);
            }
        }
    }
    along_edge.map_or(
        WalkNode::CornerSecond {
            index: index_second,
            t: 1.0,
        },
        WalkNode::Existing,
    )
}

/// The next stop after `node` along the edge its classification says to
/// follow: the nearest crossing further down the edge, or the edge's end.
fn get_next(
    node: WalkNode,
    intersections: &[Intersection],
    unused: &mut BTreeSet<usize>,
) -> Result<WalkNode> {
    let next = match node_classification(node, intersections)? {
        IntersectionClassification::First => {
            let (index, s) =
                node_first(node, intersections).ok_or(IntersectionError::InconsistentPath)?;
            get_next_first(index, s, intersections)
        }
        IntersectionClassification::Second => {
            let (index, t) =
                node_second(node, intersections).ok_or(IntersectionError::InconsistentPath)?;
            get_next_second(index, t, intersections)
        }
        _ => return Err(IntersectionError::InconsistentPath.into()),
    };
    if let WalkNode::Existing(position) = next {
        unused.remove(&position);
    }
    Ok(next)
}

/// Converts one walked segment into the arc it covers, indexed over the
/// six boundary edges.
fn ends_to_curve(
    start_node: WalkNode,
    end_node: WalkNode,
    intersections: &[Intersection],
) -> Result<EdgeInfo> {
    match node_classification(start_node, intersections)? {
        IntersectionClassification::First => {
            let (start_index, start) =
                node_first(start_node, intersections).ok_or(IntersectionError::InconsistentPath)?;
            let (end_index, end) =
                node_first(end_node, intersections).ok_or(IntersectionError::InconsistentPath)?;
            if start_index != end_index {
                return Err(IntersectionError::InconsistentPath.into());
            }
            Ok(EdgeInfo {
                index: start_index,
                start,
                end,
            })
        }
        IntersectionClassification::Second => {
            let (start_index, start) = node_second(start_node, intersections)
                .ok_or(IntersectionError::InconsistentPath)?;
            let (end_index, end) =
                node_second(end_node, intersections).ok_or(IntersectionError::InconsistentPath)?;
            if start_index != end_index {
                return Err(IntersectionError::InconsistentPath.into());
            }
            Ok(EdgeInfo {
                index: start_index + 3,
                start,
                end,
            })
        }
        _ => Err(IntersectionError::InconsistentPath.into()),
    }
}

/// Whether a single polygon is the entire boundary of one surface (edge
/// offset 0 for the first surface, 3 for the second), in any rotation.
fn is_whole_surface(polygon: &[EdgeInfo], offset: usize) -> bool {
    polygon.len() == 3
        && polygon.iter().all(|arc| arc.start == 0.0 && arc.end == 1.0)
        && (0..3).any(|rotation| {
            polygon
                .iter()
                .enumerate()
                .all(|(position, arc)| arc.index == offset + (rotation + position) % 3)
        })
}

/// Chains accepted crossings into closed curved polygons.
///
/// A polygon that turns out to be the whole boundary of one surface is
/// reported as containment of that surface instead.
fn basic_interior_combine(
    intersections: &[Intersection],
) -> Result<(Option<Vec<Vec<EdgeInfo>>>, Option<Containment>)> {
    let mut unused: BTreeSet<usize> = (0..intersections.len()).collect();
    let mut polygons: Vec<Vec<EdgeInfo>> = Vec::new();
    while let Some(&position) = unused.iter().next_back() {
        unused.remove(&position);
        let start = WalkNode::Existing(position);
        let mut edge_ends: Vec<(WalkNode, WalkNode)> = Vec::new();
        let mut current = start;
        loop {
            let next = get_next(current, intersections, &mut unused)?;
            edge_ends.push((current, next));
            current = to_front(next, intersections, &mut unused);
            if current == start {
                break;
            }
            if edge_ends.len() > MAX_EDGES {
                return Err(IntersectionError::PolygonTooManyEdges(MAX_EDGES).into());
            }
        }
        let polygon = edge_ends
            .iter()
            .map(|&(seg_start, seg_end)| ends_to_curve(seg_start, seg_end, intersections))
            .collect::<Result<Vec<EdgeInfo>>>()?;
        polygons.push(polygon);
    }
    if polygons.len() == 1 {
        if is_whole_surface(&polygons[0], 0) {
            return Ok((None, Some(Containment::First)));
        }
        if is_whole_surface(&polygons[0], 3) {
            return Ok((None, Some(Containment::Second)));
        }
    }
    Ok((Some(polygons), None))
}

/// Decides the outcome when every crossing was set aside: pure tangencies
/// and ignored corners bound no region, one-sided tangencies and full
/// coincidence mean containment.
fn tangent_only_intersections(
    all_types: &BTreeSet<IntersectionClassification>,
) -> Result<(Option<Vec<Vec<EdgeInfo>>>, Option<Containment>)> {
    let harmless = all_types.iter().all(|class| {
        matches!(
            class,
            IntersectionClassification::Opposed | IntersectionClassification::IgnoredCorner
        )
    });
    if harmless {
        return Ok((Some(Vec::new()), None));
    }
    if all_types.len() > 1 {
        return Err(
            IntersectionError::UnexpectedClassification(format!("{all_types:?}")).into(),
        );
    }
    match all_types.iter().next() {
        Some(IntersectionClassification::TangentFirst) => {
            Ok((None, Some(Containment::First)))
        }
        Some(IntersectionClassification::TangentSecond) => {
            Ok((None, Some(Containment::Second)))
        }
        // Every edge pair either coincides or misses; the surfaces are the
        // same region.
        Some(IntersectionClassification::Coincident) => Ok((None, Some(Containment::First))),
        _ => Err(IntersectionError::UnexpectedClassification(format!("{all_types:?}")).into()),
    }
}

/// Decides the outcome when the boundaries never meet: locate a corner of
/// each surface in the other to distinguish strict containment from
/// disjoint interiors.
fn no_intersections(
    surface1: &Surface,
    surface2: &Surface,
) -> (Option<Vec<Vec<EdgeInfo>>>, Option<Containment>) {
    let corner1 = surface1.nodes()[0];
    if locate::locate_point(surface2, corner1.x, corner1.y).is_some() {
        return (None, Some(Containment::First));
    }
    let corner2 = surface2.nodes()[0];
    if locate::locate_point(surface1, corner2.x, corner2.y).is_some() {
        return (None, Some(Containment::Second));
    }
    (Some(Vec::new()), None)
}

/// Turns the classified crossings of a surface pair into the final
/// polygon-or-containment answer.
///
/// # Errors
///
/// Fails when the walk visits an inconsistent chain of crossings, exceeds
/// the polygon size cap, or the tangent-only classification set is one no
/// valid surface pair produces.
pub fn combine_intersections(
    intersections: &[Intersection],
    surface1: &Surface,
    surface2: &Surface,
    all_types: &BTreeSet<IntersectionClassification>,
) -> Result<(Option<Vec<Vec<EdgeInfo>>>, Option<Containment>)> {
    if !intersections.is_empty() {
        basic_interior_combine(intersections)
    } else if !all_types.is_empty() {
        tangent_only_intersections(all_types)
    } else {
        Ok(no_intersections(surface1, surface2))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use approx::assert_relative_eq;

    fn classified(
        index_first: usize,
        s: f64,
        index_second: usize,
        t: f64,
        interior: IntersectionClassification,
    ) -> Intersection {
        let mut intersection = Intersection::new(index_first, s, index_second, t);
        intersection.interior_curve = Some(interior);
        intersection
    }

    #[test]
    fn combine_two_crossings_into_triangle() {
        // The two crossings of overlapping right triangles; the region is
        // bounded by one arc of the second surface and two of the first.
        let intersections = vec![
            classified(0, 0.5, 2, 2.0 / 3.0, IntersectionClassification::First),
            classified(1, 0.5, 2, 1.0 / 3.0, IntersectionClassification::Second),
        ];
        let (polygons, contained) = basic_interior_combine(&intersections).unwrap();
        assert!(contained.is_none());
        let polygons = polygons.unwrap();
        assert_eq!(polygons.len(), 1);
        let polygon = &polygons[0];
        assert_eq!(polygon.len(), 3);
        assert_eq!(polygon[0].index, 5);
        assert_relative_eq!(polygon[0].start, 1.0 / 3.0);
        assert_relative_eq!(polygon[0].end, 2.0 / 3.0);
        assert_eq!(polygon[1].index, 0);
        assert_eq!((polygon[1].start, polygon[1].end), (0.5, 1.0));
        assert_eq!(polygon[2].index, 1);
        assert_eq!((polygon[2].start, polygon[2].end), (0.0, 0.5));
    }

    #[test]
    fn combine_whole_boundary_is_containment() {
        // Corner crossings covering the first surface's entire boundary.
        let intersections = vec![
            classified(0, 0.0, 0, 0.25, IntersectionClassification::First),
            classified(1, 0.0, 1, 0.25, IntersectionClassification::First),
            classified(2, 0.0, 2, 0.25, IntersectionClassification::First),
        ];
        let (polygons, contained) = basic_interior_combine(&intersections).unwrap();
        assert!(polygons.is_none());
        assert_eq!(contained, Some(Containment::First));
    }

    #[test]
    fn tangent_only_outcomes() {
        let mut all_types = BTreeSet::new();
        all_types.insert(IntersectionClassification::Opposed);
        all_types.insert(IntersectionClassification::IgnoredCorner);
        let (polygons, contained) = tangent_only_intersections(&all_types).unwrap();
        assert_eq!(polygons.unwrap(), Vec::<Vec<EdgeInfo>>::new());
        assert!(contained.is_none());

        let mut all_types = BTreeSet::new();
        all_types.insert(IntersectionClassification::TangentSecond);
        let (polygons, contained) = tangent_only_intersections(&all_types).unwrap();
        assert!(polygons.is_none());
        assert_eq!(contained, Some(Containment::Second));

        let mut all_types = BTreeSet::new();
        all_types.insert(IntersectionClassification::TangentFirst);
        all_types.insert(IntersectionClassification::Coincident);
        assert!(tangent_only_intersections(&all_types).is_err());
    }

    #[test]
    fn no_intersections_locates_nested_corner() {
        let inner = Surface::new(
            vec![
                Point2::new(0.5, 0.5),
                Point2::new(1.0, 0.5),
                Point2::new(0.5, 1.0),
            ],
            1,
        )
        .unwrap();
        let outer = Surface::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(4.0, 0.0),
                Point2::new(0.0, 4.0),
            ],
            1,
        )
        .unwrap();
        let (polygons, contained) = no_intersections(&inner, &outer);
        assert!(polygons.is_none());
        assert_eq!(contained, Some(Containment::First));
        let (polygons, contained) = no_intersections(&outer, &inner);
        assert!(polygons.is_none());
        assert_eq!(contained, Some(Containment::Second));
    }

    #[test]
    fn no_intersections_disjoint_interiors() {
        let surface1 = Surface::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
            ],
            1,
        )
        .unwrap();
        let surface2 = Surface::new(
            vec![
                Point2::new(5.0, 0.0),
                Point2::new(6.0, 0.0),
                Point2::new(5.0, 1.0),
            ],
            1,
        )
        .unwrap();
        let (polygons, contained) = no_intersections(&surface1, &surface2);
        assert_eq!(polygons.unwrap(), Vec::<Vec<EdgeInfo>>::new());
        assert!(contained.is_none());
    }
}
