//! Operations on 1-D Bézier curves, represented as slices of control
//! points. Surface boundary edges are handled through these helpers.

use crate::math::{cross_product, Point2, Vector2};

/// Evaluates a Bézier curve at parameter `s` via de Casteljau reduction.
#[must_use]
pub fn evaluate(nodes: &[Point2], s: f64) -> Point2 {
    let r = 1.0 - s;
    let mut work: Vec<Vector2> = nodes.iter().map(|p| p.coords).collect();
    while work.len() > 1 {
        for i in 0..work.len() - 1 {
            work[i] = r * work[i] + s * work[i + 1];
        }
        work.pop();
    }
    Point2::from(work[0])
}

fn hodograph_nodes(nodes: &[Point2]) -> Vec<Point2> {
    let degree = to_f64(nodes.len() - 1);
    nodes
        .windows(2)
        .map(|pair| Point2::from(degree * (pair[1] - pair[0])))
        .collect()
}

/// Evaluates the hodograph (first derivative) of a Bézier curve at `s`.
#[must_use]
pub fn evaluate_hodograph(nodes: &[Point2], s: f64) -> Vector2 {
    evaluate(&hodograph_nodes(nodes), s).coords
}

/// Signed curvature `cross(B', B'') / |B'|^3` at parameter `s`.
///
/// Linear curves have zero curvature everywhere.
#[must_use]
pub fn curvature(nodes: &[Point2], tangent: &Vector2, s: f64) -> f64 {
    if nodes.len() < 3 {
        return 0.0;
    }
    let second_deriv = evaluate_hodograph(&hodograph_nodes(nodes), s);
    cross_product(tangent, &second_deriv) / tangent.norm().powi(3)
}

/// Finds the parameter whose image is `point`, or `None` when the point is
/// not on the curve.
///
/// Seeds a Newton projection (stationary point of the squared distance)
/// from the best of a coarse parameter sweep; the result is not clamped to
/// the unit interval, so callers interested in the curve segment should
/// snap it with [`crate::math::wiggle_interval`].
#[must_use]
pub fn locate_point(nodes: &[Point2], point: &Point2) -> Option<f64> {
    let mut best = 0.0;
    let mut best_dist = f64::INFINITY;
    for k in 0..=16 {
        let candidate = f64::from(k) / 16.0;
        let dist = (evaluate(nodes, candidate) - point).norm();
        if dist < best_dist {
            best_dist = dist;
            best = candidate;
        }
    }
    let deriv_nodes = hodograph_nodes(nodes);
    let mut s = best;
    for _ in 0..12 {
        let diff = evaluate(nodes, s) - point;
        let first = evaluate(&deriv_nodes, s).coords;
        let second = if nodes.len() < 3 {
            crate::math::Vector2::zeros()
        } else {
            evaluate_hodograph(&deriv_nodes, s)
        };
        let denom = first.norm_squared() + diff.dot(&second);
        if denom == 0.0 {
            break;
        }
        let step = diff.dot(&first) / denom;
        s -= step;
        if step.abs() < 1e-15 {
            break;
        }
    }
    let scale = nodes
        .iter()
        .map(|p| p.coords.norm())
        .fold(1.0_f64, f64::max);
    if (evaluate(nodes, s) - point).norm() <= 1e-9 * scale {
        Some(s)
    } else {
        None
    }
}

/// Splits a curve at `s = 1/2`, returning the control nets of the left and
/// right halves (same degree).
#[must_use]
pub fn subdivide(nodes: &[Point2]) -> (Vec<Point2>, Vec<Point2>) {
    let mut work: Vec<Vector2> = nodes.iter().map(|p| p.coords).collect();
    let mut left = Vec::with_capacity(nodes.len());
    let mut right = vec![Point2::origin(); nodes.len()];
    let mut remaining = work.len();
    while remaining > 0 {
        left.push(Point2::from(work[0]));
        right[remaining - 1] = Point2::from(work[remaining - 1]);
        for i in 0..remaining - 1 {
            work[i] = 0.5 * (work[i] + work[i + 1]);
        }
        remaining -= 1;
    }
    (left, right)
}

/// Upper bound on the distance between a curve and the chord through its
/// endpoints: `n (n - 1) / 8` times the largest second difference of the
/// control net.
#[must_use]
pub fn linearization_error(nodes: &[Point2]) -> f64 {
    let num_nodes = nodes.len();
    if num_nodes < 3 {
        return 0.0;
    }
    let degree = to_f64(num_nodes - 1);
    let worst = nodes
        .windows(3)
        .map(|w| ((w[2] - w[1]) - (w[1] - w[0])).norm())
        .fold(0.0_f64, f64::max);
    0.125 * degree * (degree - 1.0) * worst
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(value: usize) -> f64 {
    value as f64
}
