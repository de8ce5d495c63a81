//! Power-basis polynomial helpers backing the algebraic intersection
//! strategy: Bernstein conversion, interpolation, and companion-matrix
//! root finding.

use nalgebra::{Complex, DMatrix, DVector};

use crate::error::{GeometryError, Result};

/// Binomial coefficient `C(n, k)` as a float.
#[must_use]
pub fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut result = 1.0;
    for i in 0..k {
        result = result * to_f64(n - i) / to_f64(i + 1);
    }
    result
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(value: usize) -> f64 {
    value as f64
}

/// Converts Bernstein coefficients on `[0, 1]` to ascending power-basis
/// coefficients.
///
/// `sum_i b_i C(n,i) x^i (1-x)^(n-i)` expands to
/// `sum_k x^k sum_(i<=k) b_i C(n,i) C(n-i,k-i) (-1)^(k-i)`.
#[must_use]
pub fn bernstein_to_power(coeffs: &[f64]) -> Vec<f64> {
    let n = coeffs.len().saturating_sub(1);
    let mut result = vec![0.0; coeffs.len()];
    for (k, slot) in result.iter_mut().enumerate() {
        let mut total = 0.0;
        for (i, &b_i) in coeffs.iter().take(k + 1).enumerate() {
            let sign = if (k - i) % 2 == 0 { 1.0 } else { -1.0 };
            total += b_i * binomial(n, i) * binomial(n - i, k - i) * sign;
        }
        *slot = total;
    }
    result
}

/// Evaluates an ascending-coefficient polynomial via Horner's scheme.
#[must_use]
pub fn evaluate(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Fits the unique polynomial of degree `xs.len() - 1` through the given
/// samples by solving the Vandermonde system.
///
/// # Errors
///
/// Returns an error if the sample abscissae are not distinct.
pub fn fit_from_samples(xs: &[f64], ys: &[f64]) -> Result<Vec<f64>> {
    let n = xs.len();
    let vandermonde = DMatrix::from_fn(n, n, |i, j| xs[i].powi(i32::try_from(j).unwrap_or(0)));
    let rhs = DVector::from_column_slice(ys);
    let solved = vandermonde.lu().solve(&rhs).ok_or_else(|| {
        GeometryError::Degenerate("singular Vandermonde system in polynomial fit".into())
    })?;
    Ok(solved.iter().copied().collect())
}

/// Finds all complex roots of an ascending-coefficient polynomial as the
/// eigenvalues of its companion matrix.
///
/// Leading coefficients that are negligible relative to the largest
/// coefficient are trimmed first, so the effective degree may be lower than
/// `coeffs.len() - 1`. A (near-)zero polynomial yields no roots.
#[must_use]
pub fn roots(coeffs: &[f64]) -> Vec<Complex<f64>> {
    let scale = coeffs.iter().fold(0.0_f64, |acc, c| acc.max(c.abs()));
    if scale == 0.0 {
        return Vec::new();
    }
    let mut effective = coeffs.len();
    while effective > 0 && coeffs[effective - 1].abs() <= 1e-12 * scale {
        effective -= 1;
    }
    if effective <= 1 {
        return Vec::new();
    }
    let degree = effective - 1;
    let lead = coeffs[degree];
    let companion = DMatrix::from_fn(degree, degree, |i, j| {
        if j + 1 == degree {
            -coeffs[i] / lead
        } else if i == j + 1 {
            1.0
        } else {
            0.0
        }
    });
    companion.complex_eigenvalues().iter().copied().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn binomial_values() {
        assert_eq!(binomial(4, 0), 1.0);
        assert_eq!(binomial(4, 2), 6.0);
        assert_eq!(binomial(5, 3), 10.0);
        assert_eq!(binomial(3, 5), 0.0);
    }

    #[test]
    fn bernstein_quadratic() {
        // b(x) = 0 * (1-x)^2 + 1 * 2x(1-x) + 0 * x^2 = 2x - 2x^2.
        let power = bernstein_to_power(&[0.0, 1.0, 0.0]);
        assert_eq!(power, vec![0.0, 2.0, -2.0]);
    }

    #[test]
    fn evaluate_horner() {
        // 1 + 2x + 3x^2 at x = 2 is 17.
        assert_eq!(evaluate(&[1.0, 2.0, 3.0], 2.0), 17.0);
    }

    #[test]
    fn fit_recovers_quadratic() {
        let xs = [0.0, 0.5, 1.0];
        let ys: Vec<_> = xs.iter().map(|&x| 1.0 - 4.0 * x + 4.0 * x * x).collect();
        let coeffs = fit_from_samples(&xs, &ys).unwrap();
        assert_relative_eq!(coeffs[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(coeffs[1], -4.0, epsilon = 1e-12);
        assert_relative_eq!(coeffs[2], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn roots_of_quadratic() {
        // 4x^2 - 4x + 0.75 has roots 0.25 and 0.75.
        let mut found: Vec<_> = roots(&[0.75, -4.0, 4.0])
            .into_iter()
            .map(|z| z.re)
            .collect();
        found.sort_by(f64::total_cmp);
        assert_eq!(found.len(), 2);
        assert_relative_eq!(found[0], 0.25, epsilon = 1e-12);
        assert_relative_eq!(found[1], 0.75, epsilon = 1e-12);
    }

    #[test]
    fn roots_of_constant_is_empty() {
        assert!(roots(&[3.0]).is_empty());
        assert!(roots(&[0.0, 0.0, 0.0]).is_empty());
    }
}
