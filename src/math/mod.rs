pub mod bbox;
pub mod polynomial;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Interleaved Jacobian entries `(∂x/∂s, ∂y/∂s, ∂x/∂t, ∂y/∂t)`.
pub type Vector4 = nalgebra::Vector4<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Relative wiggle allowed when snapping a parameter into `[0, 1]`.
pub const WIGGLE: f64 = f64::EPSILON * 256.0; // 2^-44

/// Snaps `value` into the unit interval, allowing [`WIGGLE`] of slop at
/// either end.
///
/// Values within the wiggle of an endpoint collapse to exactly `0.0` or
/// `1.0`; this exactness is what downstream corner and edge-end detection
/// relies on. Returns `None` when the value is genuinely outside `[0, 1]`.
#[must_use]
pub fn wiggle_interval(value: f64) -> Option<f64> {
    if -WIGGLE < value && value < WIGGLE {
        Some(0.0)
    } else if WIGGLE <= value && value <= 1.0 - WIGGLE {
        Some(value)
    } else if 1.0 - WIGGLE < value && value < 1.0 + WIGGLE {
        Some(1.0)
    } else {
        None
    }
}

/// Relative vector comparison: `|v1 - v2| <= eps * |v2|`, falling back to an
/// absolute comparison when `v2` is the zero vector.
#[must_use]
pub fn vector_close(vec1: &Vector2, vec2: &Vector2, eps: f64) -> bool {
    let size2 = vec2.norm();
    if size2 == 0.0 {
        vec1.norm() <= eps
    } else {
        (vec1 - vec2).norm() <= eps * size2
    }
}

/// 2D cross product (the `z`-component of the 3D cross product).
#[must_use]
pub fn cross_product(vec1: &Vector2, vec2: &Vector2) -> f64 {
    vec1.x * vec2.y - vec1.y * vec2.x
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn wiggle_snaps_endpoints() {
        assert_eq!(wiggle_interval(2.0_f64.powi(-50)), Some(0.0));
        assert_eq!(wiggle_interval(-(2.0_f64.powi(-50))), Some(0.0));
        assert_eq!(wiggle_interval(1.0 + 2.0_f64.powi(-50)), Some(1.0));
        assert_eq!(wiggle_interval(0.5), Some(0.5));
        assert!(wiggle_interval(1.5).is_none());
        assert!(wiggle_interval(-0.25).is_none());
    }

    #[test]
    fn wiggle_constant_value() {
        assert_eq!(WIGGLE, 2.0_f64.powi(-44));
    }

    #[test]
    fn vector_close_relative() {
        let v1 = Vector2::new(1.0, 1.0);
        let v2 = Vector2::new(1.0, 1.0 + 1e-12);
        assert!(vector_close(&v1, &v2, 1e-10));
        assert!(!vector_close(&v1, &Vector2::new(1.0, 2.0), 1e-10));
    }

    #[test]
    fn cross_product_sign() {
        let v1 = Vector2::new(1.0, 0.0);
        let v2 = Vector2::new(0.0, 1.0);
        assert_eq!(cross_product(&v1, &v2), 1.0);
        assert_eq!(cross_product(&v2, &v1), -1.0);
    }
}
