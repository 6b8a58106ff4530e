//! The geometry-kernel trait consumed by the relaxation engine.
//!
//! The engine never does its own intersection or containment arithmetic;
//! everything it needs from a curve is behind [`ClosedCurve`], so the
//! concrete backend (the `geo`-based implementation in `siteplan-layout`)
//! can be swapped without touching the algorithm.

use crate::transform::AABB2D;
use crate::Result;
use nalgebra::RealField;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Classification of a point against a closed region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Containment {
    /// Strictly inside the region.
    Inside,
    /// Strictly outside the region.
    Outside,
    /// On the region's bounding curve.
    Boundary,
}

/// A closed 2D curve with a periodic parameter domain.
///
/// The domain is `[0, domain_max())`; parameters wrap at the end, so
/// callers doing parameter arithmetic must reduce modulo the domain
/// length themselves (the engine's wraparound-midpoint logic relies on
/// this).
pub trait ClosedCurve: Clone + Send + Sync {
    /// The coordinate type (f32 or f64).
    type Scalar: RealField + Copy;

    /// Returns the length of the parameter domain.
    fn domain_max(&self) -> Self::Scalar;

    /// Evaluates the curve at parameter `t` (reduced modulo the domain).
    fn point_at(&self, t: Self::Scalar) -> (Self::Scalar, Self::Scalar);

    /// Samples `count` evenly spaced points along the closed curve.
    ///
    /// The duplicate closing point is excluded: sample `i` sits at
    /// parameter `i * domain_max / count`.
    fn sample_points(&self, count: usize) -> Vec<(Self::Scalar, Self::Scalar)>;

    /// Classifies a point against the region bounded by this curve.
    fn classify_point(&self, point: (Self::Scalar, Self::Scalar)) -> Containment;

    /// Computes the crossings between this curve and `other`.
    ///
    /// Each entry is `(t_self, t_other)`; the list is ordered by `t_self`
    /// and crossings closer than `tolerance` are merged.
    fn intersection_parameters(
        &self,
        other: &Self,
        tolerance: Self::Scalar,
    ) -> Vec<(Self::Scalar, Self::Scalar)>;

    /// Returns the parameter and point on this curve closest to `point`.
    fn closest_point(
        &self,
        point: (Self::Scalar, Self::Scalar),
    ) -> (Self::Scalar, (Self::Scalar, Self::Scalar));

    /// Returns a copy of this curve translated by `offset`.
    ///
    /// Fails on a non-finite offset; the original curve is untouched.
    fn translated(&self, offset: (Self::Scalar, Self::Scalar)) -> Result<Self>;

    /// Returns the axis-aligned bounding box of the curve.
    fn aabb_2d(&self) -> AABB2D<Self::Scalar>;

    /// Returns `(center, radius)` when this curve is a full circle.
    ///
    /// Passes that assume circular input (the spacing correction) use this
    /// to fail fast instead of working with a bogus center.
    fn as_circle(&self) -> Option<((Self::Scalar, Self::Scalar), Self::Scalar)>;
}
