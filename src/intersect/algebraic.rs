//! Resultant-based curve-curve intersection.
//!
//! The second curve is implicitized through a Sylvester resultant: for a
//! fixed `s`, the resultant of `x2(t) - B1_x(s)` and `y2(t) - B1_y(s)` in
//! `t` vanishes exactly when `B1(s)` lies on the second curve's algebraic
//! locus. Sampling that function of `s` and fitting a polynomial turns the
//! intersection problem into companion-matrix root finding; `t` values are
//! then recovered by projecting the located points back onto the second
//! curve.

use nalgebra::DMatrix;

use crate::error::Result;
use crate::geometry::curve;
use crate::math::polynomial;
use crate::math::{wiggle_interval, Point2};

use super::geometric::{coincident_overlap, newton_polish, prune_duplicates};
use super::{exact_coincident_parameters, CurveIntersector};

/// Largest imaginary part a companion-matrix eigenvalue may carry and
/// still count as a real root.
const IMAGINARY_EPS: f64 = 1e-8;

/// Relative size under which a trailing power-basis coefficient does not
/// raise the effective degree.
const COEFF_EPS: f64 = 1e-12;

/// Curve-curve intersection by implicitization.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlgebraicIntersector;

/// One component of the second curve in the power basis, trimmed to its
/// effective degree. The constant term still has the moving `B1`
/// coordinate subtracted per sample, which cannot change the degree.
#[derive(Debug)]
struct ShiftedPolynomial {
    coeffs: Vec<f64>,
}

impl ShiftedPolynomial {
    fn new(power_coeffs: &[f64], scale: f64) -> Self {
        let mut effective = power_coeffs.len().max(1);
        while effective > 1 && power_coeffs[effective - 1].abs() <= COEFF_EPS * scale {
            effective -= 1;
        }
        Self {
            coeffs: power_coeffs[..effective].to_vec(),
        }
    }

    fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    fn shifted(&self, offset: f64) -> Vec<f64> {
        let mut coeffs = self.coeffs.clone();
        coeffs[0] -= offset;
        coeffs
    }
}

/// Resultant of two univariate polynomials via the Sylvester determinant.
///
/// Degenerate degrees fall back to the usual conventions: a constant
/// against a degree-`n` polynomial contributes its `n`-th power, and a
/// zero polynomial forces the resultant to zero.
fn resultant(p: &[f64], q: &[f64]) -> f64 {
    let m = p.len() - 1;
    let n = q.len() - 1;
    if m == 0 && n == 0 {
        return 1.0;
    }
    if m == 0 {
        return p[0].powi(i32::try_from(n).unwrap_or(i32::MAX));
    }
    if n == 0 {
        return q[0].powi(i32::try_from(m).unwrap_or(i32::MAX));
    }
    let size = m + n;
    // Row `i < n` holds the coefficients of `p` shifted by `i`; the
    // remaining `m` rows hold `q` likewise, both highest-degree first.
    let sylvester = DMatrix::from_fn(size, size, |row, column| {
        if row < n {
            let position = m + row;
            if column >= row && position >= column {
                p[position - column]
            } else {
                0.0
            }
        } else {
            let shift = row - n;
            let position = n + shift;
            if column >= shift && position >= column {
                q[position - column]
            } else {
                0.0
            }
        }
    });
    sylvester.determinant()
}

impl CurveIntersector for AlgebraicIntersector {
    fn all_intersections(&self, nodes1: &[Point2], nodes2: &[Point2]) -> Result<Vec<(f64, f64)>> {
        if let Some(params) = exact_coincident_parameters(nodes1, nodes2) {
            return Ok(params);
        }
        let x2_power = polynomial::bernstein_to_power(
            &nodes2.iter().map(|p| p.x).collect::<Vec<f64>>(),
        );
        let y2_power = polynomial::bernstein_to_power(
            &nodes2.iter().map(|p| p.y).collect::<Vec<f64>>(),
        );
        let scale = x2_power
            .iter()
            .chain(&y2_power)
            .fold(1.0_f64, |acc, c| acc.max(c.abs()));
        let poly_x = ShiftedPolynomial::new(&x2_power, scale);
        let poly_y = ShiftedPolynomial::new(&y2_power, scale);

        let degree1 = nodes1.len() - 1;
        let num_samples = (poly_x.degree() + poly_y.degree()) * degree1 + 1;
        let num_samples = num_samples.max(2);
        let mut sample_points = Vec::with_capacity(num_samples);
        let mut sample_values = Vec::with_capacity(num_samples);
        for index in 0..num_samples {
            let s = to_f64(index) / to_f64(num_samples - 1);
            let point = curve::evaluate(nodes1, s);
            sample_points.push(s);
            sample_values.push(resultant(&poly_x.shifted(point.x), &poly_y.shifted(point.y)));
        }

        let magnitude = sample_values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let resultant_scale = scale
            .powi(i32::try_from(poly_x.degree() + poly_y.degree()).unwrap_or(i32::MAX))
            .max(1.0);
        if magnitude <= 1e-10 * resultant_scale {
            // The first curve lies on the second's algebraic locus; the
            // segments themselves may still be disjoint.
            return Ok(coincident_overlap(nodes1, nodes2).unwrap_or_default());
        }

        let coeffs = polynomial::fit_from_samples(&sample_points, &sample_values)?;
        let mut params: Vec<(f64, f64)> = Vec::new();
        for root in polynomial::roots(&coeffs) {
            if root.im.abs() > IMAGINARY_EPS || !(-0.125..=1.125).contains(&root.re) {
                continue;
            }
            let point = curve::evaluate(nodes1, root.re);
            let Some(t_guess) = curve::locate_point(nodes2, &point) else {
                continue;
            };
            let (refined_s, refined_t) = newton_polish(nodes1, nodes2, root.re, t_guess);
            if let (Some(s), Some(t)) = (wiggle_interval(refined_s), wiggle_interval(refined_t)) {
                params.push((s, t));
            }
        }
        Ok(prune_duplicates(params))
    }
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(value: usize) -> f64 {
    value as f64
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn intersect(nodes1: &[Point2], nodes2: &[Point2]) -> Vec<(f64, f64)> {
        AlgebraicIntersector
            .all_intersections(nodes1, nodes2)
            .unwrap()
    }

    #[test]
    fn resultant_of_lines() {
        // t - 0.5 and t - 0.5 share a root, t - 0.5 and t - 0.75 do not.
        assert_relative_eq!(resultant(&[-0.5, 1.0], &[-0.5, 1.0]), 0.0);
        assert!(resultant(&[-0.5, 1.0], &[-0.75, 1.0]).abs() > 0.1);
    }

    #[test]
    fn resultant_quadratic_shared_root() {
        // (t - 0.25)(t - 0.75) against t - 0.25.
        let quadratic = [0.1875, -1.0, 1.0];
        assert_relative_eq!(resultant(&quadratic, &[-0.25, 1.0]), 0.0, epsilon = 1e-15);
        assert!(resultant(&quadratic, &[-0.5, 1.0]).abs() > 1e-3);
    }

    #[test]
    fn segments_crossing_at_midpoint() {
        let nodes1 = [Point2::new(0.0, 0.0), Point2::new(2.0, 2.0)];
        let nodes2 = [Point2::new(0.0, 2.0), Point2::new(2.0, 0.0)];
        let params = intersect(&nodes1, &nodes2);
        assert_eq!(params.len(), 1);
        assert_relative_eq!(params[0].0, 0.5, epsilon = 1e-10);
        assert_relative_eq!(params[0].1, 0.5, epsilon = 1e-10);
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        let nodes1 = [Point2::new(0.0, 0.0), Point2::new(2.0, 0.0)];
        let nodes2 = [Point2::new(0.0, 1.0), Point2::new(2.0, 1.0)];
        assert!(intersect(&nodes1, &nodes2).is_empty());
    }

    #[test]
    fn vertical_segment_against_horizontal() {
        // The x component of the second curve is constant, dropping the
        // Sylvester computation to the constant-polynomial convention.
        let nodes1 = [Point2::new(0.0, 0.0), Point2::new(2.0, 0.0)];
        let nodes2 = [Point2::new(1.0, 2.0), Point2::new(1.0, -1.0)];
        let params = intersect(&nodes1, &nodes2);
        assert_eq!(params.len(), 1);
        assert_relative_eq!(params[0].0, 0.5, epsilon = 1e-10);
        assert_relative_eq!(params[0].1, 2.0 / 3.0, epsilon = 1e-10);
    }

    #[test]
    fn quadratics_crossing_twice() {
        let nodes1 = [
            Point2::new(0.0, 0.0),
            Point2::new(0.5, 1.0),
            Point2::new(1.0, 0.0),
        ];
        let nodes2 = [
            Point2::new(0.0, 0.75),
            Point2::new(0.5, -0.25),
            Point2::new(1.0, 0.75),
        ];
        let params = intersect(&nodes1, &nodes2);
        assert_eq!(params.len(), 2);
        assert_relative_eq!(params[0].0, 0.25, epsilon = 1e-8);
        assert_relative_eq!(params[0].1, 0.25, epsilon = 1e-8);
        assert_relative_eq!(params[1].0, 0.75, epsilon = 1e-8);
        assert_relative_eq!(params[1].1, 0.75, epsilon = 1e-8);
    }

    #[test]
    fn collinear_overlapping_segments() {
        let nodes1 = [Point2::new(0.0, 0.0), Point2::new(2.0, 0.0)];
        let nodes2 = [Point2::new(1.0, 0.0), Point2::new(3.0, 0.0)];
        let params = intersect(&nodes1, &nodes2);
        assert_eq!(params.len(), 2);
        assert_relative_eq!(params[0].0, 0.5, epsilon = 1e-9);
        assert_relative_eq!(params[1].0, 1.0, epsilon = 1e-9);
    }
}
