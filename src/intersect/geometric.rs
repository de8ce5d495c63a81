//! Subdivision-based curve-curve intersection.
//!
//! Candidate pairs of subcurves are recursively split and pruned by
//! bounding box until both members are within linearization tolerance of
//! their chords; a chord-chord crossing then seeds a two-variable Newton
//! iteration on the original curves.

use crate::error::{GeometryError, Result};
use crate::geometry::curve;
use crate::locate::newton_refine_solve;
use crate::math::bbox::{bbox_intersect, BoxIntersection};
use crate::math::{cross_product, vector_close, wiggle_interval, Point2, Vector4};

use super::{exact_coincident_parameters, CurveIntersector};

/// Rounds of pairwise subdivision before the search is declared stuck.
const MAX_SUBDIVISIONS: usize = 20;

/// Candidate-pair cap; blowing past it means the curves run along each
/// other and subdivision cannot separate them.
const MAX_CANDIDATES: usize = 64;

/// Largest linearization error at which a subcurve is replaced by its
/// chord: `2^-26`.
const LINEARIZATION_THRESHOLD: f64 = f64::EPSILON * 67_108_864.0;

/// Slack allowed on chord parameters before a seed is discarded: `2^-16`.
const SEED_PAD: f64 = 1.525_878_906_25e-5;

/// Absolute tolerance under which two refined parameter pairs are the same
/// root: `2^-36`.
const DEDUPE_EPS: f64 = f64::EPSILON * 65_536.0;

/// Curve-curve intersection by recursive subdivision.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeometricIntersector;

/// A piece of one of the input curves, tracking the parameter interval it
/// came from and its distance from its own chord.
#[derive(Debug, Clone)]
struct Subcurve {
    start: f64,
    end: f64,
    nodes: Vec<Point2>,
    error: f64,
}

impl Subcurve {
    fn new(start: f64, end: f64, nodes: Vec<Point2>) -> Self {
        let error = curve::linearization_error(&nodes);
        Self {
            start,
            end,
            nodes,
            error,
        }
    }

    fn subdivide(&self) -> (Self, Self) {
        let mid = 0.5 * (self.start + self.end);
        let (left, right) = curve::subdivide(&self.nodes);
        (
            Self::new(self.start, mid, left),
            Self::new(mid, self.end, right),
        )
    }
}

/// Parameters of the crossing of two segments, or `None` when they are
/// parallel.
fn segment_intersection(
    start0: &Point2,
    end0: &Point2,
    start1: &Point2,
    end1: &Point2,
) -> Option<(f64, f64)> {
    let delta0 = end0 - start0;
    let delta1 = end1 - start1;
    let denom = cross_product(&delta0, &delta1);
    if denom == 0.0 {
        return None;
    }
    let start_delta = start1 - start0;
    let s = cross_product(&start_delta, &delta1) / denom;
    let t = cross_product(&start_delta, &delta0) / denom;
    Some((s, t))
}

/// Polishes `(s, t)` so that `B1(s) = B2(t)` via Newton iteration on the
/// residual `B1(s) - B2(t)`.
pub(super) fn newton_polish(nodes1: &[Point2], nodes2: &[Point2], s: f64, t: f64) -> (f64, f64) {
    let mut s = s;
    let mut t = t;
    for _ in 0..10 {
        let point1 = curve::evaluate(nodes1, s);
        let point2 = curve::evaluate(nodes2, t);
        let tangent1 = curve::evaluate_hodograph(nodes1, s);
        let tangent2 = curve::evaluate_hodograph(nodes2, t);
        let jac_both = Vector4::new(tangent1.x, tangent1.y, -tangent2.x, -tangent2.y);
        let (delta_s, delta_t) =
            newton_refine_solve(&jac_both, point2.x, point1.x, point2.y, point1.y);
        if !delta_s.is_finite() || !delta_t.is_finite() {
            break;
        }
        s += delta_s;
        t += delta_t;
        if delta_s.abs() < 1e-14 && delta_t.abs() < 1e-14 {
            break;
        }
    }
    (s, t)
}

/// Seeds Newton from the chord crossing of two linearized subcurves and
/// snaps the refined parameters to the unit interval.
fn from_linearized(
    first: &Subcurve,
    second: &Subcurve,
    nodes1: &[Point2],
    nodes2: &[Point2],
) -> Option<(f64, f64)> {
    let first_end = first.nodes.last()?;
    let second_end = second.nodes.last()?;
    let (chord_s, chord_t) =
        segment_intersection(&first.nodes[0], first_end, &second.nodes[0], second_end)?;
    if !(-SEED_PAD..=1.0 + SEED_PAD).contains(&chord_s)
        || !(-SEED_PAD..=1.0 + SEED_PAD).contains(&chord_t)
    {
        return None;
    }
    let seed_s = (1.0 - chord_s) * first.start + chord_s * first.end;
    let seed_t = (1.0 - chord_t) * second.start + chord_t * second.end;
    let (refined_s, refined_t) = newton_polish(nodes1, nodes2, seed_s, seed_t);
    let s = wiggle_interval(refined_s)?;
    let t = wiggle_interval(refined_t)?;
    Some((s, t))
}

/// Sorts by `s` and merges parameter pairs that refined to the same root.
pub(super) fn prune_duplicates(mut params: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    params.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    params.dedup_by(|a, b| (a.0 - b.0).abs() < DEDUPE_EPS && (a.1 - b.1).abs() < DEDUPE_EPS);
    params
}

/// Overlap parameters for curves that trace the same locus, found by
/// locating each curve's endpoints on the other. `None` when the curves do
/// not actually coincide along a segment.
pub(super) fn coincident_overlap(nodes1: &[Point2], nodes2: &[Point2]) -> Option<Vec<(f64, f64)>> {
    let mut params: Vec<(f64, f64)> = Vec::new();
    for s_end in [0.0, 1.0] {
        let point = curve::evaluate(nodes1, s_end);
        if let Some(t) = curve::locate_point(nodes2, &point).and_then(wiggle_interval) {
            params.push((s_end, t));
        }
    }
    for t_end in [0.0, 1.0] {
        let point = curve::evaluate(nodes2, t_end);
        if let Some(s) = curve::locate_point(nodes1, &point).and_then(wiggle_interval) {
            if params.iter().all(|&(seen_s, _)| (seen_s - s).abs() > DEDUPE_EPS) {
                params.push((s, t_end));
            }
        }
    }
    params.sort_by(|a, b| a.0.total_cmp(&b.0));
    let (&(s_lo, t_lo), &(s_hi, t_hi)) = (params.first()?, params.last()?);
    if s_hi - s_lo <= DEDUPE_EPS {
        return None;
    }
    // The endpoints only bound a shared segment if the interiors agree
    // too.
    let mid1 = curve::evaluate(nodes1, 0.5 * (s_lo + s_hi));
    let mid2 = curve::evaluate(nodes2, 0.5 * (t_lo + t_hi));
    if !vector_close(&mid1.coords, &mid2.coords, 1e-9) {
        return None;
    }
    Some(vec![(s_lo, t_lo), (s_hi, t_hi)])
}

/// Both curves are segments; one chord computation settles the pair.
fn linear_intersections(nodes1: &[Point2], nodes2: &[Point2]) -> Vec<(f64, f64)> {
    match segment_intersection(&nodes1[0], &nodes1[1], &nodes2[0], &nodes2[1]) {
        Some((s, t)) => match (wiggle_interval(s), wiggle_interval(t)) {
            (Some(s), Some(t)) => vec![(s, t)],
            _ => Vec::new(),
        },
        // Parallel segments only matter when they are collinear and
        // overlap.
        None => coincident_overlap(nodes1, nodes2).unwrap_or_default(),
    }
}

impl CurveIntersector for GeometricIntersector {
    fn all_intersections(&self, nodes1: &[Point2], nodes2: &[Point2]) -> Result<Vec<(f64, f64)>> {
        if let Some(params) = exact_coincident_parameters(nodes1, nodes2) {
            return Ok(params);
        }
        if bbox_intersect(nodes1, nodes2) == BoxIntersection::Disjoint {
            return Ok(Vec::new());
        }
        if nodes1.len() == 2 && nodes2.len() == 2 {
            return Ok(linear_intersections(nodes1, nodes2));
        }
        let mut candidates = vec![(
            Subcurve::new(0.0, 1.0, nodes1.to_vec()),
            Subcurve::new(0.0, 1.0, nodes2.to_vec()),
        )];
        let mut intersections: Vec<(f64, f64)> = Vec::new();
        for _ in 0..=MAX_SUBDIVISIONS {
            let mut next_candidates = Vec::new();
            for (first, second) in &candidates {
                if first.error < LINEARIZATION_THRESHOLD && second.error < LINEARIZATION_THRESHOLD
                {
                    if let Some(params) = from_linearized(first, second, nodes1, nodes2) {
                        intersections.push(params);
                    }
                } else if bbox_intersect(&first.nodes, &second.nodes)
                    != BoxIntersection::Disjoint
                {
                    let (first_left, first_right) = first.subdivide();
                    let (second_left, second_right) = second.subdivide();
                    next_candidates.push((first_left.clone(), second_left.clone()));
                    next_candidates.push((first_left, second_right.clone()));
                    next_candidates.push((first_right.clone(), second_left));
                    next_candidates.push((first_right, second_right));
                }
            }
            candidates = next_candidates;
            if candidates.is_empty() {
                return Ok(prune_duplicates(intersections));
            }
            if candidates.len() > MAX_CANDIDATES {
                return coincident_overlap(nodes1, nodes2).ok_or_else(|| {
                    GeometryError::Degenerate(
                        "too many candidate pairs; curves stay within tolerance of each other"
                            .into(),
                    )
                    .into()
                });
            }
        }
        Err(GeometryError::Degenerate(
            "curve intersection did not converge".into(),
        )
        .into())
    }
}
