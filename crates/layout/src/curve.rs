//! Piecewise closed curves backed by the `geo` crate.
//!
//! A [`Curve`] is a closed chain of [`Piece`]s (straight segments and
//! circular arcs) with an arc-length parameter domain. Evaluation is exact
//! per piece; containment, intersection, and closest-point queries run
//! against a cached dense flattening via `geo`'s robust primitives rather
//! than hand-rolled intersection arithmetic.

use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::coordinate_position::{CoordPos, CoordinatePosition};
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{coord, Coord, Line, LineString, Polygon};
use siteplan_core::{ClosedCurve, Containment, Error, Result, AABB2D};
use std::f64::consts::TAU;

/// Maximum angular step, in radians, when flattening an arc into the
/// cached ring used for containment and intersection queries.
const ARC_FLATTEN_STEP: f64 = 0.05;

/// Endpoint tolerance used when chaining pieces into a closed loop.
pub const JOIN_TOLERANCE: f64 = 1e-6;

/// One piece of a closed curve.
#[derive(Debug, Clone)]
pub enum Piece {
    /// Straight segment.
    Line {
        /// Segment start.
        start: Coord<f64>,
        /// Segment end.
        end: Coord<f64>,
    },
    /// Circular arc with a signed sweep (counterclockwise positive).
    Arc {
        /// Arc center.
        center: Coord<f64>,
        /// Arc radius.
        radius: f64,
        /// Angle of the arc start, in radians.
        start_angle: f64,
        /// Signed sweep from the start angle, in radians.
        sweep: f64,
    },
}

impl Piece {
    /// Creates a straight segment.
    pub fn line(start: (f64, f64), end: (f64, f64)) -> Self {
        Self::Line {
            start: coord! { x: start.0, y: start.1 },
            end: coord! { x: end.0, y: end.1 },
        }
    }

    /// Creates a circular arc from a center, radius, start angle and
    /// signed sweep.
    pub fn arc(center: (f64, f64), radius: f64, start_angle: f64, sweep: f64) -> Self {
        Self::Arc {
            center: coord! { x: center.0, y: center.1 },
            radius,
            start_angle,
            sweep,
        }
    }

    /// Creates the arc running from `start` through `mid` to `end`.
    ///
    /// Fails when the three points are collinear (no finite circumcircle).
    pub fn arc_through(start: (f64, f64), mid: (f64, f64), end: (f64, f64)) -> Result<Self> {
        let (x1, y1) = start;
        let (x2, y2) = mid;
        let (x3, y3) = end;

        let d = 2.0 * (x1 * (y2 - y3) + x2 * (y3 - y1) + x3 * (y1 - y2));
        if d.abs() < 1e-12 {
            return Err(Error::CurveJoin(
                "three-point arc through collinear points".into(),
            ));
        }
        let s1 = x1 * x1 + y1 * y1;
        let s2 = x2 * x2 + y2 * y2;
        let s3 = x3 * x3 + y3 * y3;
        let cx = (s1 * (y2 - y3) + s2 * (y3 - y1) + s3 * (y1 - y2)) / d;
        let cy = (s1 * (x3 - x2) + s2 * (x1 - x3) + s3 * (x2 - x1)) / d;
        let radius = ((x1 - cx).powi(2) + (y1 - cy).powi(2)).sqrt();

        let start_angle = (y1 - cy).atan2(x1 - cx);
        let mid_angle = (y2 - cy).atan2(x2 - cx);
        let end_angle = (y3 - cy).atan2(x3 - cx);

        // Pick the sweep direction that passes through the mid point.
        let ccw_sweep = (end_angle - start_angle).rem_euclid(TAU);
        let mid_offset = (mid_angle - start_angle).rem_euclid(TAU);
        let sweep = if mid_offset <= ccw_sweep {
            ccw_sweep
        } else {
            ccw_sweep - TAU
        };

        Ok(Self::Arc {
            center: coord! { x: cx, y: cy },
            radius,
            start_angle,
            sweep,
        })
    }

    /// Returns the arc length of this piece.
    pub fn length(&self) -> f64 {
        match self {
            Self::Line { start, end } => {
                let (dx, dy) = (end.x - start.x, end.y - start.y);
                (dx * dx + dy * dy).sqrt()
            }
            Self::Arc { radius, sweep, .. } => sweep.abs() * radius,
        }
    }

    fn start_point(&self) -> Coord<f64> {
        self.point_at_fraction(0.0)
    }

    fn end_point(&self) -> Coord<f64> {
        self.point_at_fraction(1.0)
    }

    fn point_at_fraction(&self, u: f64) -> Coord<f64> {
        match self {
            Self::Line { start, end } => coord! {
                x: start.x + u * (end.x - start.x),
                y: start.y + u * (end.y - start.y),
            },
            Self::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => {
                let angle = start_angle + u * sweep;
                coord! {
                    x: center.x + radius * angle.cos(),
                    y: center.y + radius * angle.sin(),
                }
            }
        }
    }

    fn reversed(&self) -> Self {
        match *self {
            Self::Line { start, end } => Self::Line {
                start: end,
                end: start,
            },
            Self::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => Self::Arc {
                center,
                radius,
                start_angle: start_angle + sweep,
                sweep: -sweep,
            },
        }
    }

    fn translated_by(&self, offset: Coord<f64>) -> Self {
        match *self {
            Self::Line { start, end } => Self::Line {
                start: start + offset,
                end: end + offset,
            },
            Self::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => Self::Arc {
                center: center + offset,
                radius,
                start_angle,
                sweep,
            },
        }
    }
}

/// A closed piecewise curve with an arc-length parameter domain.
#[derive(Debug, Clone)]
pub struct Curve {
    /// Ordered pieces; each starts where the previous one ends.
    pieces: Vec<Piece>,

    /// Parameter at the start of each piece.
    offsets: Vec<f64>,

    /// Total arc length (= domain length).
    total: f64,

    /// Dense flattening of the curve, open (the closing point is implied).
    ring: Vec<Coord<f64>>,

    /// Parameter at each ring vertex.
    ring_params: Vec<f64>,

    /// Region bounded by the ring, for containment classification.
    region: Polygon<f64>,
}

impl Curve {
    /// Creates a full circle.
    pub fn circle(center: (f64, f64), radius: f64) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(Error::InvalidDimension(format!(
                "circle radius must be positive and finite, got {radius}"
            )));
        }
        Self::from_pieces(vec![Piece::arc(center, radius, 0.0, TAU)])
    }

    /// Joins unordered pieces into a single closed curve.
    ///
    /// Pieces are chained greedily, flipping direction where needed, the
    /// way a CAD kernel's curve join works. Fails when any piece cannot be
    /// attached or the chain does not close onto its start.
    pub fn join(pieces: Vec<Piece>, tolerance: f64) -> Result<Self> {
        let mut remaining = pieces;
        if remaining.is_empty() {
            return Err(Error::CurveJoin("no pieces to join".into()));
        }

        let mut chain = vec![remaining.remove(0)];
        while !remaining.is_empty() {
            let tail = chain[chain.len() - 1].end_point();
            let hit = remaining.iter().position(|piece| {
                coords_close(piece.start_point(), tail, tolerance)
                    || coords_close(piece.end_point(), tail, tolerance)
            });
            match hit {
                Some(idx) => {
                    let mut piece = remaining.remove(idx);
                    if !coords_close(piece.start_point(), tail, tolerance) {
                        piece = piece.reversed();
                    }
                    chain.push(piece);
                }
                None => {
                    return Err(Error::CurveJoin(format!(
                        "{} piece(s) could not be attached to the chain",
                        remaining.len()
                    )))
                }
            }
        }

        if !coords_close(
            chain[chain.len() - 1].end_point(),
            chain[0].start_point(),
            tolerance,
        ) {
            return Err(Error::CurveJoin("chain does not close".into()));
        }
        Self::from_pieces(chain)
    }

    /// Creates a curve from an ordered, closed chain of pieces.
    pub fn from_pieces(pieces: Vec<Piece>) -> Result<Self> {
        if pieces.is_empty() {
            return Err(Error::CurveJoin("no pieces".into()));
        }
        for window in pieces.windows(2) {
            if !coords_close(window[0].end_point(), window[1].start_point(), JOIN_TOLERANCE) {
                return Err(Error::CurveJoin("pieces are not contiguous".into()));
            }
        }
        if !coords_close(
            pieces[pieces.len() - 1].end_point(),
            pieces[0].start_point(),
            JOIN_TOLERANCE,
        ) {
            return Err(Error::CurveJoin("chain does not close".into()));
        }

        let mut offsets = Vec::with_capacity(pieces.len());
        let mut total = 0.0;
        for piece in &pieces {
            offsets.push(total);
            total += piece.length();
        }
        if total <= 0.0 {
            return Err(Error::CurveJoin("curve has zero length".into()));
        }

        let mut ring = Vec::new();
        let mut ring_params = Vec::new();
        for (piece, &offset) in pieces.iter().zip(&offsets) {
            let steps = match piece {
                Piece::Line { .. } => 1,
                Piece::Arc { sweep, .. } => {
                    ((sweep.abs() / ARC_FLATTEN_STEP).ceil() as usize).max(2)
                }
            };
            let length = piece.length();
            for k in 0..steps {
                let u = k as f64 / steps as f64;
                ring.push(piece.point_at_fraction(u));
                ring_params.push(offset + u * length);
            }
        }

        let mut shell = ring.clone();
        shell.push(ring[0]);
        let region = Polygon::new(LineString::from(shell), vec![]);

        Ok(Self {
            pieces,
            offsets,
            total,
            ring,
            ring_params,
            region,
        })
    }

    /// Returns the ordered pieces of this curve.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Returns the ring segment `i` as `(start, end, t_start, t_end)`.
    fn ring_segment(&self, i: usize) -> (Coord<f64>, Coord<f64>, f64, f64) {
        let a = self.ring[i];
        let ta = self.ring_params[i];
        if i + 1 < self.ring.len() {
            (a, self.ring[i + 1], ta, self.ring_params[i + 1])
        } else {
            (a, self.ring[0], ta, self.total)
        }
    }
}

impl ClosedCurve for Curve {
    type Scalar = f64;

    fn domain_max(&self) -> f64 {
        self.total
    }

    fn point_at(&self, t: f64) -> (f64, f64) {
        let t = t.rem_euclid(self.total);
        let idx = self.offsets.partition_point(|&o| o <= t).saturating_sub(1);
        let end = if idx + 1 < self.offsets.len() {
            self.offsets[idx + 1]
        } else {
            self.total
        };
        let length = end - self.offsets[idx];
        let u = if length > 0.0 {
            (t - self.offsets[idx]) / length
        } else {
            0.0
        };
        let p = self.pieces[idx].point_at_fraction(u);
        (p.x, p.y)
    }

    fn sample_points(&self, count: usize) -> Vec<(f64, f64)> {
        (0..count)
            .map(|i| self.point_at(self.total * i as f64 / count as f64))
            .collect()
    }

    fn classify_point(&self, point: (f64, f64)) -> Containment {
        match self
            .region
            .coordinate_position(&coord! { x: point.0, y: point.1 })
        {
            CoordPos::Inside => Containment::Inside,
            CoordPos::Outside => Containment::Outside,
            CoordPos::OnBoundary => Containment::Boundary,
        }
    }

    fn intersection_parameters(&self, other: &Self, tolerance: f64) -> Vec<(f64, f64)> {
        let mut hits: Vec<(f64, f64, Coord<f64>)> = Vec::new();
        for i in 0..self.ring.len() {
            let (a0, a1, ta0, ta1) = self.ring_segment(i);
            let la = Line::new(a0, a1);
            for j in 0..other.ring.len() {
                let (b0, b1, tb0, tb1) = other.ring_segment(j);
                let lb = Line::new(b0, b1);
                let point = match line_intersection(la, lb) {
                    Some(LineIntersection::SinglePoint { intersection, .. }) => intersection,
                    Some(LineIntersection::Collinear { intersection }) => coord! {
                        x: (intersection.start.x + intersection.end.x) / 2.0,
                        y: (intersection.start.y + intersection.end.y) / 2.0,
                    },
                    None => continue,
                };
                let ta = ta0 + fraction_along(a0, a1, point) * (ta1 - ta0);
                let tb = tb0 + fraction_along(b0, b1, point) * (tb1 - tb0);
                hits.push((ta, tb, point));
            }
        }

        hits.sort_by(|x, y| x.0.total_cmp(&y.0));
        let mut kept: Vec<(f64, f64, Coord<f64>)> = Vec::new();
        for hit in hits {
            let duplicate = kept.iter().any(|k| {
                let (dx, dy) = (k.2.x - hit.2.x, k.2.y - hit.2.y);
                (dx * dx + dy * dy).sqrt() <= tolerance
            });
            if !duplicate {
                kept.push(hit);
            }
        }
        kept.into_iter().map(|(ta, tb, _)| (ta, tb)).collect()
    }

    fn closest_point(&self, point: (f64, f64)) -> (f64, (f64, f64)) {
        let p = coord! { x: point.0, y: point.1 };
        let mut best = (0.0, self.ring[0], f64::INFINITY);
        for i in 0..self.ring.len() {
            let (a, b, ta, tb) = self.ring_segment(i);
            let (dx, dy) = (b.x - a.x, b.y - a.y);
            let len2 = dx * dx + dy * dy;
            let u = if len2 > 0.0 {
                (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let candidate = coord! { x: a.x + u * dx, y: a.y + u * dy };
            let (ex, ey) = (p.x - candidate.x, p.y - candidate.y);
            let dist2 = ex * ex + ey * ey;
            if dist2 < best.2 {
                best = (ta + u * (tb - ta), candidate, dist2);
            }
        }
        (best.0, (best.1.x, best.1.y))
    }

    fn translated(&self, offset: (f64, f64)) -> Result<Self> {
        if !(offset.0.is_finite() && offset.1.is_finite()) {
            return Err(Error::TranslationFailed(format!(
                "non-finite offset ({}, {})",
                offset.0, offset.1
            )));
        }
        let delta = coord! { x: offset.0, y: offset.1 };
        Self::from_pieces(
            self.pieces
                .iter()
                .map(|piece| piece.translated_by(delta))
                .collect(),
        )
    }

    fn aabb_2d(&self) -> AABB2D<f64> {
        match self.region.bounding_rect() {
            Some(rect) => AABB2D::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y),
            None => AABB2D::new(0.0, 0.0, 0.0, 0.0),
        }
    }

    fn as_circle(&self) -> Option<((f64, f64), f64)> {
        match self.pieces.as_slice() {
            [Piece::Arc {
                center,
                radius,
                sweep,
                ..
            }] if (sweep.abs() - TAU).abs() < 1e-9 => Some(((center.x, center.y), *radius)),
            _ => None,
        }
    }
}

fn coords_close(a: Coord<f64>, b: Coord<f64>, tolerance: f64) -> bool {
    let (dx, dy) = (a.x - b.x, a.y - b.y);
    (dx * dx + dy * dy).sqrt() <= tolerance
}

/// Fraction of `p` along segment `a -> b`, measured on the dominant axis.
fn fraction_along(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let u = if dx.abs() >= dy.abs() {
        if dx == 0.0 {
            0.0
        } else {
            (p.x - a.x) / dx
        }
    } else {
        (p.y - a.y) / dy
    };
    u.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_circle_domain_and_evaluation() {
        let circle = Curve::circle((2.0, 3.0), 10.0).unwrap();
        assert_relative_eq!(circle.domain_max(), TAU * 10.0, epsilon = 1e-9);

        let start = circle.point_at(0.0);
        assert_relative_eq!(start.0, 12.0, epsilon = 1e-9);
        assert_relative_eq!(start.1, 3.0, epsilon = 1e-9);

        let quarter = circle.point_at(circle.domain_max() / 4.0);
        assert_relative_eq!(quarter.0, 2.0, epsilon = 1e-9);
        assert_relative_eq!(quarter.1, 13.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_circle_radius() {
        assert!(Curve::circle((0.0, 0.0), 0.0).is_err());
        assert!(Curve::circle((0.0, 0.0), -3.0).is_err());
        assert!(Curve::circle((0.0, 0.0), f64::NAN).is_err());
    }

    #[test]
    fn test_sample_points_excludes_duplicate_endpoint() {
        let circle = Curve::circle((0.0, 0.0), 5.0).unwrap();
        let samples = circle.sample_points(9);
        assert_eq!(samples.len(), 9);
        // First sample sits at parameter zero, no closing duplicate.
        assert_relative_eq!(samples[0].0, 5.0, epsilon = 1e-9);
        let last = samples[8];
        assert!((last.0 - 5.0).abs() > 0.1 || (last.1).abs() > 0.1);
    }

    #[test]
    fn test_classification() {
        let circle = Curve::circle((0.0, 0.0), 10.0).unwrap();
        assert_eq!(circle.classify_point((0.0, 0.0)), Containment::Inside);
        assert_eq!(circle.classify_point((30.0, 0.0)), Containment::Outside);
        // A ring vertex lies exactly on the region boundary.
        let on = circle.point_at(0.0);
        assert_eq!(circle.classify_point(on), Containment::Boundary);
    }

    #[test]
    fn test_circle_circle_intersections() {
        let a = Curve::circle((0.0, 0.0), 10.0).unwrap();
        let b = Curve::circle((12.0, 0.0), 10.0).unwrap();
        let crossings = a.intersection_parameters(&b, 1e-4);
        assert_eq!(crossings.len(), 2);
        assert!(crossings[0].0 <= crossings[1].0);
        for &(ta, _) in &crossings {
            let p = a.point_at(ta);
            // True intersections are (6, +-8).
            assert_relative_eq!(p.0, 6.0, epsilon = 0.05);
            assert_relative_eq!(p.1.abs(), 8.0, epsilon = 0.05);
        }
    }

    #[test]
    fn test_disjoint_curves_have_no_intersections() {
        let a = Curve::circle((0.0, 0.0), 10.0).unwrap();
        let b = Curve::circle((50.0, 0.0), 10.0).unwrap();
        assert!(a.intersection_parameters(&b, 1e-4).is_empty());
    }

    #[test]
    fn test_closest_point() {
        let circle = Curve::circle((0.0, 0.0), 10.0).unwrap();
        let (t, p) = circle.closest_point((20.0, 0.0));
        assert_relative_eq!(p.0, 10.0, epsilon = 0.02);
        assert_relative_eq!(p.1, 0.0, epsilon = 0.02);
        let wrapped = t.min(circle.domain_max() - t);
        assert!(wrapped < 0.5, "parameter {t} should sit near the seam");
    }

    #[test]
    fn test_join_flips_and_closes() {
        let pieces = vec![
            Piece::line((0.0, 0.0), (1.0, 0.0)),
            Piece::line((0.0, 1.0), (1.0, 0.0)), // needs flipping
            Piece::line((0.0, 1.0), (0.0, 0.0)),
        ];
        let curve = Curve::join(pieces, JOIN_TOLERANCE).unwrap();
        assert_relative_eq!(curve.domain_max(), 2.0 + 2.0_f64.sqrt(), epsilon = 1e-9);
        assert_eq!(curve.classify_point((0.25, 0.25)), Containment::Inside);
    }

    #[test]
    fn test_join_rejects_disconnected_pieces() {
        let pieces = vec![
            Piece::line((0.0, 0.0), (1.0, 0.0)),
            Piece::line((5.0, 5.0), (6.0, 5.0)),
        ];
        let err = Curve::join(pieces, JOIN_TOLERANCE).unwrap_err();
        assert!(matches!(err, Error::CurveJoin(_)));
    }

    #[test]
    fn test_join_rejects_open_chain() {
        let pieces = vec![
            Piece::line((0.0, 0.0), (1.0, 0.0)),
            Piece::line((1.0, 0.0), (1.0, 1.0)),
        ];
        let err = Curve::join(pieces, JOIN_TOLERANCE).unwrap_err();
        assert!(matches!(err, Error::CurveJoin(_)));
    }

    #[test]
    fn test_arc_through_picks_the_short_side() {
        let arc = Piece::arc_through((-1.0, 0.0), (0.0, 1.0), (1.0, 0.0)).unwrap();
        match arc {
            Piece::Arc {
                center,
                radius,
                sweep,
                ..
            } => {
                assert_relative_eq!(center.x, 0.0, epsilon = 1e-9);
                assert_relative_eq!(center.y, 0.0, epsilon = 1e-9);
                assert_relative_eq!(radius, 1.0, epsilon = 1e-9);
                assert_relative_eq!(sweep.abs(), PI, epsilon = 1e-9);
            }
            Piece::Line { .. } => panic!("expected an arc"),
        }
    }

    #[test]
    fn test_arc_through_rejects_collinear_points() {
        let err = Piece::arc_through((0.0, 0.0), (1.0, 0.0), (2.0, 0.0)).unwrap_err();
        assert!(matches!(err, Error::CurveJoin(_)));
    }

    #[test]
    fn test_translated_rejects_non_finite_offset() {
        let circle = Curve::circle((0.0, 0.0), 10.0).unwrap();
        let err = circle.translated((f64::NAN, 0.0)).unwrap_err();
        assert!(matches!(err, Error::TranslationFailed(_)));
    }

    #[test]
    fn test_translated_moves_every_query() {
        let circle = Curve::circle((0.0, 0.0), 10.0).unwrap();
        let moved = circle.translated((5.0, -3.0)).unwrap();
        let ((cx, cy), r) = moved.as_circle().unwrap();
        assert_relative_eq!(cx, 5.0, epsilon = 1e-9);
        assert_relative_eq!(cy, -3.0, epsilon = 1e-9);
        assert_relative_eq!(r, 10.0, epsilon = 1e-9);
        assert_eq!(moved.classify_point((5.0, -3.0)), Containment::Inside);
    }

    #[test]
    fn test_as_circle_is_none_for_polygons() {
        let triangle = Curve::join(
            vec![
                Piece::line((0.0, 0.0), (4.0, 0.0)),
                Piece::line((4.0, 0.0), (0.0, 3.0)),
                Piece::line((0.0, 3.0), (0.0, 0.0)),
            ],
            JOIN_TOLERANCE,
        )
        .unwrap();
        assert!(triangle.as_circle().is_none());
    }

    #[test]
    fn test_aabb() {
        let circle = Curve::circle((1.0, 2.0), 10.0).unwrap();
        let aabb = circle.aabb_2d();
        assert_relative_eq!(aabb.min_x, -9.0, epsilon = 0.05);
        assert_relative_eq!(aabb.max_y, 12.0, epsilon = 0.05);
        let center = aabb.center();
        assert_relative_eq!(center.0, 1.0, epsilon = 0.05);
        assert_relative_eq!(center.1, 2.0, epsilon = 0.05);
    }
}
