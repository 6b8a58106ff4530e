//! Transform and bounding-box types.

use nalgebra::RealField;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 2D axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AABB2D<S> {
    /// Minimum x coordinate.
    pub min_x: S,
    /// Minimum y coordinate.
    pub min_y: S,
    /// Maximum x coordinate.
    pub max_x: S,
    /// Maximum y coordinate.
    pub max_y: S,
}

impl<S: RealField + Copy> AABB2D<S> {
    /// Creates a new bounding box from corner coordinates.
    pub fn new(min_x: S, min_y: S, max_x: S, max_y: S) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Computes the bounding box of a point set.
    ///
    /// Returns `None` for an empty set.
    pub fn from_points(points: &[(S, S)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self::new(first.0, first.1, first.0, first.1);
        for &(x, y) in rest {
            aabb.min_x = aabb.min_x.min(x);
            aabb.min_y = aabb.min_y.min(y);
            aabb.max_x = aabb.max_x.max(x);
            aabb.max_y = aabb.max_y.max(y);
        }
        Some(aabb)
    }

    /// Returns the width of the box.
    pub fn width(&self) -> S {
        self.max_x - self.min_x
    }

    /// Returns the height of the box.
    pub fn height(&self) -> S {
        self.max_y - self.min_y
    }

    /// Returns the center of the box.
    pub fn center(&self) -> (S, S) {
        let two = S::one() + S::one();
        (
            (self.min_x + self.max_x) / two,
            (self.min_y + self.max_y) / two,
        )
    }

    /// Checks whether a point lies inside the box (inclusive).
    pub fn contains_point(&self, x: S, y: S) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_dimensions() {
        let aabb = AABB2D::new(-1.0, 2.0, 3.0, 10.0);
        assert_eq!(aabb.width(), 4.0);
        assert_eq!(aabb.height(), 8.0);
        assert_eq!(aabb.center(), (1.0, 6.0));
    }

    #[test]
    fn test_aabb_from_points() {
        let aabb = AABB2D::from_points(&[(0.0, 1.0), (5.0, -2.0), (3.0, 4.0)]).unwrap();
        assert_eq!(aabb.min_x, 0.0);
        assert_eq!(aabb.min_y, -2.0);
        assert_eq!(aabb.max_x, 5.0);
        assert_eq!(aabb.max_y, 4.0);

        let empty: Option<AABB2D<f64>> = AABB2D::from_points(&[]);
        assert!(empty.is_none());
    }

    #[test]
    fn test_aabb_contains_point() {
        let aabb = AABB2D::new(0.0, 0.0, 10.0, 10.0);
        assert!(aabb.contains_point(5.0, 5.0));
        assert!(aabb.contains_point(0.0, 10.0));
        assert!(!aabb.contains_point(-0.1, 5.0));
    }
}
