use super::Point2;

/// Axis-aligned bounding box of a control net.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

/// Coarse classification of how two bounding boxes relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxIntersection {
    /// The boxes share interior area.
    Intersection,
    /// The boxes touch along an edge or at a corner but share no interior.
    Tangent,
    /// The boxes are strictly separated.
    Disjoint,
}

impl BoundingBox {
    /// Computes the bounding box of a set of control points.
    ///
    /// # Panics
    ///
    /// Never panics for non-empty input; an empty slice yields an inverted
    /// (infinite) box that contains nothing.
    #[must_use]
    pub fn from_nodes(nodes: &[Point2]) -> Self {
        let mut result = Self {
            left: f64::INFINITY,
            right: f64::NEG_INFINITY,
            bottom: f64::INFINITY,
            top: f64::NEG_INFINITY,
        };
        for node in nodes {
            result.left = result.left.min(node.x);
            result.right = result.right.max(node.x);
            result.bottom = result.bottom.min(node.y);
            result.top = result.top.max(node.y);
        }
        result
    }

    /// Tests whether a point lies inside the box (boundary included).
    #[must_use]
    pub fn contains(&self, point: &Point2) -> bool {
        self.left <= point.x
            && point.x <= self.right
            && self.bottom <= point.y
            && point.y <= self.top
    }

    /// Classifies the overlap between two boxes.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> BoxIntersection {
        let left = self.left.max(other.left);
        let right = self.right.min(other.right);
        if right < left {
            return BoxIntersection::Disjoint;
        }
        let bottom = self.bottom.max(other.bottom);
        let top = self.top.min(other.top);
        if top < bottom {
            return BoxIntersection::Disjoint;
        }
        if left < right && bottom < top {
            BoxIntersection::Intersection
        } else {
            BoxIntersection::Tangent
        }
    }
}

/// Tests whether the bounding box of `nodes` contains `point`.
///
/// This is the containment test used while pruning candidate sub-surfaces
/// during point location: it may keep a candidate whose surface does not
/// actually contain the point, but never discards one that does.
#[must_use]
pub fn contains_point(nodes: &[Point2], point: &Point2) -> bool {
    BoundingBox::from_nodes(nodes).contains(point)
}

/// Classifies the overlap of the bounding boxes of two control nets.
#[must_use]
pub fn bbox_intersect(nodes1: &[Point2], nodes2: &[Point2]) -> BoxIntersection {
    BoundingBox::from_nodes(nodes1).intersect(&BoundingBox::from_nodes(nodes2))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn from_nodes_extents() {
        let bbox = BoundingBox::from_nodes(&unit_square());
        assert_eq!(bbox.left, 0.0);
        assert_eq!(bbox.right, 1.0);
        assert_eq!(bbox.bottom, 0.0);
        assert_eq!(bbox.top, 1.0);
    }

    #[test]
    fn contains_boundary_and_interior() {
        let bbox = BoundingBox::from_nodes(&unit_square());
        assert!(bbox.contains(&Point2::new(0.5, 0.5)));
        assert!(bbox.contains(&Point2::new(0.0, 1.0)));
        assert!(!bbox.contains(&Point2::new(1.5, 0.5)));
    }

    #[test]
    fn intersect_overlapping() {
        let shifted: Vec<_> = unit_square()
            .iter()
            .map(|p| Point2::new(p.x + 0.5, p.y + 0.5))
            .collect();
        assert_eq!(
            bbox_intersect(&unit_square(), &shifted),
            BoxIntersection::Intersection
        );
    }

    #[test]
    fn intersect_tangent() {
        let shifted: Vec<_> = unit_square()
            .iter()
            .map(|p| Point2::new(p.x + 1.0, p.y))
            .collect();
        assert_eq!(
            bbox_intersect(&unit_square(), &shifted),
            BoxIntersection::Tangent
        );
    }

    #[test]
    fn intersect_disjoint() {
        let shifted: Vec<_> = unit_square()
            .iter()
            .map(|p| Point2::new(p.x + 3.0, p.y - 2.0))
            .collect();
        assert_eq!(
            bbox_intersect(&unit_square(), &shifted),
            BoxIntersection::Disjoint
        );
    }
}
