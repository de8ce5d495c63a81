//! Bézier triangles: polynomial maps from the unit-triangle parameter
//! domain `{(s, t): s >= 0, t >= 0, s + t <= 1}` into the plane.
//!
//! Control nets are stored in lexicographic `(j, i)` order, i.e. row `j`
//! (the `t` direction) holds points `(0, j), (1, j), ..., (n - j, j)`:
//!
//! ```text
//! (0,2)
//! (0,1) (1,1)
//! (0,0) (1,0) (2,0)
//! ```

use nalgebra::SVector;

use crate::error::{GeometryError, Result};
use crate::math::{Point2, Vector2, Vector4};

/// A Bézier triangle of arbitrary degree in the plane.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    nodes: Vec<Point2>,
    degree: usize,
}

impl Surface {
    /// Creates a surface from its control net.
    ///
    /// # Errors
    ///
    /// Returns an error if `degree` is zero or the node count is not
    /// `(degree + 1)(degree + 2) / 2`.
    pub fn new(nodes: Vec<Point2>, degree: usize) -> Result<Self> {
        if degree == 0 {
            return Err(GeometryError::InvalidDegree(degree).into());
        }
        let expected = lattice_size(degree);
        if nodes.len() != expected {
            return Err(GeometryError::InvalidNodeCount {
                degree,
                expected,
                actual: nodes.len(),
            }
            .into());
        }
        Ok(Self { nodes, degree })
    }

    /// The control net, in lexicographic `(j, i)` order.
    #[must_use]
    pub fn nodes(&self) -> &[Point2] {
        &self.nodes
    }

    /// The polynomial degree.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Evaluates the surface at barycentric weights `(λ1, λ2, λ3)`.
    #[must_use]
    pub fn evaluate_barycentric(&self, lambda1: f64, lambda2: f64, lambda3: f64) -> Point2 {
        let point = evaluate_barycentric(&self.nodes, self.degree, lambda1, lambda2, lambda3);
        Point2::from(point)
    }

    /// Evaluates the surface at `(s, t)`, i.e. weights `(1 - s - t, s, t)`.
    #[must_use]
    pub fn evaluate_cartesian(&self, s: f64, t: f64) -> Point2 {
        self.evaluate_barycentric(1.0 - s - t, s, t)
    }

    /// The control nets of the three boundary edges, counterclockwise.
    #[must_use]
    pub fn edges(&self) -> [Vec<Point2>; 3] {
        compute_edge_nodes(&self.nodes, self.degree)
    }

    /// Subdivides into four congruent sub-surfaces.
    #[must_use]
    pub fn subdivide(&self) -> [Self; 4] {
        subdivide_nodes(&self.nodes, self.degree).map(|nodes| Self {
            nodes,
            degree: self.degree,
        })
    }
}

/// Number of control points of a degree-`d` triangle: `(d + 1)(d + 2) / 2`.
#[must_use]
pub fn lattice_size(degree: usize) -> usize {
    (degree + 1) * (degree + 2) / 2
}

/// Index of lattice position `(i, j)` within a degree-`degree` net.
#[must_use]
pub fn lattice_index(i: usize, j: usize, degree: usize) -> usize {
    // Rows 0..j hold (degree + 1), (degree), ... points respectively.
    j * (degree + 1) - (j * j - j) / 2 + i
}

fn de_casteljau_step<const D: usize>(
    work: &mut Vec<SVector<f64, D>>,
    degree: usize,
    lambda1: f64,
    lambda2: f64,
    lambda3: f64,
) {
    for j in 0..degree {
        for i in 0..degree - j {
            work[lattice_index(i, j, degree - 1)] = lambda1 * work[lattice_index(i, j, degree)]
                + lambda2 * work[lattice_index(i + 1, j, degree)]
                + lambda3 * work[lattice_index(i, j + 1, degree)];
        }
    }
    work.truncate(lattice_size(degree - 1));
}

/// Evaluates a triangular control net of `D`-vectors at barycentric
/// weights via repeated de Casteljau reduction.
#[must_use]
pub fn evaluate_barycentric<const D: usize>(
    nodes: &[impl AsVector<D>],
    degree: usize,
    lambda1: f64,
    lambda2: f64,
    lambda3: f64,
) -> SVector<f64, D> {
    let mut work: Vec<SVector<f64, D>> = nodes.iter().map(AsVector::as_vector).collect();
    for d in (1..=degree).rev() {
        de_casteljau_step(&mut work, d, lambda1, lambda2, lambda3);
    }
    work[0]
}

/// Adapter so evaluation works over both point and interleaved-Jacobian
/// control nets.
pub trait AsVector<const D: usize> {
    fn as_vector(&self) -> SVector<f64, D>;
}

impl AsVector<2> for Point2 {
    fn as_vector(&self) -> Vector2 {
        self.coords
    }
}

impl AsVector<4> for Vector4 {
    fn as_vector(&self) -> Vector4 {
        *self
    }
}

/// Control net of the interleaved Jacobian `(∂x/∂s, ∂y/∂s, ∂x/∂t, ∂y/∂t)`.
///
/// The result is one degree lower than the input; evaluating it at a
/// parameter point yields the flattened column-major 2×2 Jacobian there.
#[must_use]
pub fn jacobian_both(nodes: &[Point2], degree: usize) -> Vec<Vector4> {
    let scale = to_f64(degree);
    let mut result = Vec::with_capacity(lattice_size(degree - 1));
    for j in 0..degree {
        for i in 0..degree - j {
            let base = nodes[lattice_index(i, j, degree)];
            let ds = scale * (nodes[lattice_index(i + 1, j, degree)] - base);
            let dt = scale * (nodes[lattice_index(i, j + 1, degree)] - base);
            result.push(Vector4::new(ds.x, ds.y, dt.x, dt.y));
        }
    }
    result
}

/// Blossom (polar form) of the control net, evaluated by running one de
/// Casteljau step per argument triple.
fn blossom(nodes: &[Point2], degree: usize, args: &[(f64, f64, f64)]) -> Point2 {
    let mut work: Vec<Vector2> = nodes.iter().map(|p| p.coords).collect();
    for (step, &(lambda1, lambda2, lambda3)) in args.iter().enumerate() {
        de_casteljau_step(&mut work, degree - step, lambda1, lambda2, lambda3);
    }
    Point2::from(work[0])
}

fn sub_surface(nodes: &[Point2], degree: usize, vertices: [(f64, f64); 3]) -> Vec<Point2> {
    let weights: Vec<(f64, f64, f64)> = vertices
        .iter()
        .map(|&(s, t)| (1.0 - s - t, s, t))
        .collect();
    let mut result = Vec::with_capacity(lattice_size(degree));
    let mut args = Vec::with_capacity(degree);
    for j in 0..=degree {
        for i in 0..=degree - j {
            args.clear();
            args.resize(degree - i - j, weights[0]);
            args.resize(degree - j, weights[1]);
            args.resize(degree, weights[2]);
            result.push(blossom(nodes, degree, &args));
        }
    }
    result
}

/// Subdivides a control net into the four congruent children A (lower
/// left), B (center, orientation-flipped), C (right), D (top).
#[must_use]
pub fn subdivide_nodes(nodes: &[Point2], degree: usize) -> [Vec<Point2>; 4] {
    [
        sub_surface(nodes, degree, [(0.0, 0.0), (0.5, 0.0), (0.0, 0.5)]),
        sub_surface(nodes, degree, [(0.5, 0.5), (0.0, 0.5), (0.5, 0.0)]),
        sub_surface(nodes, degree, [(0.5, 0.0), (1.0, 0.0), (0.5, 0.5)]),
        sub_surface(nodes, degree, [(0.0, 0.5), (0.5, 0.5), (0.0, 1.0)]),
    ]
}

/// Extracts the three boundary-edge control nets, ordered counterclockwise:
/// the `t = 0` edge, the hypotenuse `s + t = 1`, then the `s = 0` edge.
#[must_use]
pub fn compute_edge_nodes(nodes: &[Point2], degree: usize) -> [Vec<Point2>; 3] {
    let mut bottom = Vec::with_capacity(degree + 1);
    let mut hypotenuse = Vec::with_capacity(degree + 1);
    let mut left = Vec::with_capacity(degree + 1);
    for k in 0..=degree {
        bottom.push(nodes[lattice_index(k, 0, degree)]);
        hypotenuse.push(nodes[lattice_index(degree - k, k, degree)]);
        left.push(nodes[lattice_index(0, degree - k, degree)]);
    }
    [bottom, hypotenuse, left]
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(value: usize) -> f64 {
    value as f64
}
