use thiserror::Error;

/// Top-level error type for the Beztri intersection kernel.
#[derive(Debug, Error)]
pub enum BeztriError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Intersection(#[from] IntersectionError),
}

/// Errors related to geometric primitives and their evaluation.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degree {degree} requires {expected} control points, got {actual}")]
    InvalidNodeCount {
        degree: usize,
        expected: usize,
        actual: usize,
    },

    #[error("surface degree must be at least 1, got {0}")]
    InvalidDegree(usize),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Consistency violations detected while intersecting two surfaces.
///
/// These are raised immediately at the point of detection; the kernel never
/// attempts to repair an inconsistent intersection set.
#[derive(Debug, Error)]
pub enum IntersectionError {
    #[error(
        "non-unique intersection: edges ({index_first}, {index_second}) \
         at (s, t) = ({s}, {t})"
    )]
    NonUnique {
        index_first: usize,
        s: f64,
        index_second: usize,
        t: f64,
    },

    #[error(
        "duplicate not among uniques: edges ({index_first}, {index_second}) \
         at (s, t) = ({s}, {t}), {matches} matches"
    )]
    DuplicateNotMatched {
        index_first: usize,
        s: f64,
        index_second: usize,
        t: f64,
        matches: usize,
    },

    #[error("duplicate count of 1 should be a single corner: (s, t) = ({s}, {t})")]
    SingleCornerExpected { s: f64, t: f64 },

    #[error("duplicate count of 3 should be a double corner: (s, t) = ({s}, {t})")]
    DoubleCornerExpected { s: f64, t: f64 },

    #[error("unexpected duplicate count: {0}")]
    UnexpectedDuplicateCount(usize),

    #[error("unexpected tangent-only classification set: {0}")]
    UnexpectedClassification(String),

    #[error("curved polygon exceeded {0} edges during assembly")]
    PolygonTooManyEdges(usize),

    #[error("path of intersection points is not consistent")]
    InconsistentPath,
}

/// Convenience type alias for results using [`BeztriError`].
pub type Result<T> = std::result::Result<T, BeztriError>;
