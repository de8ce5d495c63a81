//! Locating the parameter pre-image of a point on a Bézier triangle:
//! a 2×2 closed-form solve, a single-step Newton refiner, and a
//! subdivision-based point locator built on top of them.

use crate::geometry::surface::{evaluate_barycentric, jacobian_both, subdivide_nodes};
use crate::geometry::Surface;
use crate::math::bbox;
use crate::math::{vector_close, Point2, Vector4};

/// Number of subdivision passes performed by [`locate_point`]; with the
/// initial pass this halves the parameter width 21 times, leaving candidate
/// sub-surfaces near machine epsilon in size.
pub const MAX_LOCATE_SUBDIVISIONS: usize = 20;

/// Convergence tolerance used by [`locate_point`]: `2^-47`.
pub const LOCATE_EPS: f64 = f64::EPSILON * 32.0;

/// Solves the 2×2 system `[A C; B D] [ds; dt] = [E; F]` arising from a
/// first-order Taylor expansion of the surface map.
///
/// `jac_both` holds the column-major flattened Jacobian `(A, B, C, D)`;
/// `E = x_val - surf_x` and `F = y_val - surf_y` are the residuals.
///
/// A singular Jacobian is not guarded against: a zero determinant produces
/// non-finite deltas which propagate to the caller.
#[must_use]
pub fn newton_refine_solve(
    jac_both: &Vector4,
    x_val: f64,
    surf_x: f64,
    y_val: f64,
    surf_y: f64,
) -> (f64, f64) {
    let (a_val, b_val, c_val, d_val) = (jac_both.x, jac_both.y, jac_both.z, jac_both.w);
    let e_val = x_val - surf_x;
    let f_val = y_val - surf_y;
    let denom = a_val * d_val - b_val * c_val;
    let delta_s = (d_val * e_val - c_val * f_val) / denom;
    let delta_t = (a_val * f_val - b_val * e_val) / denom;
    (delta_s, delta_t)
}

/// Performs exactly one Newton step refining `(s, t)` toward the pre-image
/// of `(x_val, y_val)` on the surface given by `nodes` and `degree`.
///
/// When the surface value at `(s, t)` already equals the target exactly,
/// the pair is returned unchanged without touching the Jacobian. Callers
/// decide whether and how often to iterate.
#[must_use]
pub fn newton_refine(
    nodes: &[Point2],
    degree: usize,
    x_val: f64,
    y_val: f64,
    s: f64,
    t: f64,
) -> (f64, f64) {
    let lambda1 = 1.0 - s - t;
    let surf = evaluate_barycentric(nodes, degree, lambda1, s, t);
    if surf.x == x_val && surf.y == y_val {
        // No refinement is needed.
        return (s, t);
    }
    let jac_nodes = jacobian_both(nodes, degree);
    // The Jacobian net is one degree lower.
    let jac_both = evaluate_barycentric(&jac_nodes, degree - 1, lambda1, s, t);
    let (delta_s, delta_t) = newton_refine_solve(&jac_both, x_val, surf.x, y_val, surf.y);
    (s + delta_s, t + delta_t)
}

/// A sub-surface that may contain the point being located.
///
/// The centroid is stored triple-scaled so that division by three is
/// deferred until the final averaging; the sign of `width` alone records
/// whether the sub-triangle is inverted at this recursion level.
struct LocateCandidate {
    centroid_x: f64,
    centroid_y: f64,
    width: f64,
    nodes: Vec<Point2>,
}

fn update_candidates(
    candidate: LocateCandidate,
    next_candidates: &mut Vec<LocateCandidate>,
    point: &Point2,
    degree: usize,
) {
    if !bbox::contains_point(&candidate.nodes, point) {
        return;
    }
    let [nodes_a, nodes_b, nodes_c, nodes_d] = subdivide_nodes(&candidate.nodes, degree);
    let LocateCandidate {
        centroid_x,
        centroid_y,
        width,
        ..
    } = candidate;
    let half_width = 0.5 * width;
    next_candidates.push(LocateCandidate {
        centroid_x: centroid_x - half_width,
        centroid_y: centroid_y - half_width,
        width: half_width,
        nodes: nodes_a,
    });
    next_candidates.push(LocateCandidate {
        centroid_x,
        centroid_y,
        width: -half_width,
        nodes: nodes_b,
    });
    next_candidates.push(LocateCandidate {
        centroid_x: centroid_x + width,
        centroid_y: centroid_y - half_width,
        width: half_width,
        nodes: nodes_c,
    });
    next_candidates.push(LocateCandidate {
        centroid_x: centroid_x - half_width,
        centroid_y: centroid_y + width,
        width: half_width,
        nodes: nodes_d,
    });
}

/// Mean of the (still triple-scaled) candidate centroids.
fn mean_centroid(candidates: &[LocateCandidate]) -> (f64, f64) {
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    for candidate in candidates {
        sum_x += candidate.centroid_x;
        sum_y += candidate.centroid_y;
    }
    let denom = 3.0 * to_f64(candidates.len());
    (sum_x / denom, sum_y / denom)
}

/// Locates the parameter pair mapping to `(x_val, y_val)` on `surface`.
///
/// Recursively subdivides the surface, discarding sub-surfaces whose
/// bounding box does not contain the point. After 21 rounds the surviving
/// sub-surfaces are small enough that one or two Newton steps from their
/// mean centroid converge; returns `None` when no candidate survives, the
/// expected outcome for a point not on the surface.
#[must_use]
pub fn locate_point(surface: &Surface, x_val: f64, y_val: f64) -> Option<(f64, f64)> {
    let nodes = surface.nodes();
    let degree = surface.degree();
    let point = Point2::new(x_val, y_val);
    let mut candidates = vec![LocateCandidate {
        centroid_x: 1.0,
        centroid_y: 1.0,
        width: 1.0,
        nodes: nodes.to_vec(),
    }];
    for _ in 0..=MAX_LOCATE_SUBDIVISIONS {
        let mut next_candidates = Vec::new();
        for candidate in candidates {
            update_candidates(candidate, &mut next_candidates, &point, degree);
        }
        candidates = next_candidates;
        if candidates.is_empty() {
            return None;
        }
    }

    let (s_approx, t_approx) = mean_centroid(&candidates);
    let (s, t) = newton_refine(nodes, degree, x_val, y_val, s_approx, t_approx);

    let actual = surface.evaluate_cartesian(s, t);
    if vector_close(&actual.coords, &point.coords, LOCATE_EPS) {
        Some((s, t))
    } else {
        Some(newton_refine(nodes, degree, x_val, y_val, s, t))
    }
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(value: usize) -> f64 {
    value as f64
}
