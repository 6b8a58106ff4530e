//! Buildings and their derived regulatory regions.
//!
//! A [`Building`] owns an anchor point, a footprint radius and a height,
//! and derives three closed curves from them: the footprint circle, the
//! spacing buffer circle, and the shadow-exclusion outline. The three
//! curves are rebuilt together on every translation, so they can never
//! disagree with the anchor.

use crate::curve::{Curve, Piece, JOIN_TOLERANCE};
use siteplan_core::{ClosedCurve, Error, Result};
use std::f64::consts::{PI, TAU};

/// Default regulatory spacing distance between buildings, in site units.
pub const DEFAULT_BUFFER_DISTANCE: f64 = 13.0;

// Solar constants behind the shadow-exclusion outline. Elevations set the
// shadow lengths; the azimuth half-angle sets the offset direction of the
// morning/evening shadow circles and the slope of the straight edges; the
// transition bearing sets the arc endpoints next to the apex cap.
/// Sun elevation at 11:00 and 13:00 (25°14′), in degrees.
const MORNING_SUN_ELEVATION_DEG: f64 = 25.0 + 14.0 / 60.0;
/// Sun elevation at solar noon (26°36′), in degrees.
const NOON_SUN_ELEVATION_DEG: f64 = 26.0 + 36.0 / 60.0;
/// Solar azimuth half-angle (15°12′), in degrees.
const SOLAR_AZIMUTH_DEG: f64 = 15.0 + 12.0 / 60.0;
/// Bearing of the arc transition points near the apex (9°40′), in degrees.
const APEX_TRANSITION_DEG: f64 = 9.0 + 40.0 / 60.0;

/// A circular building with its derived regulatory curves.
#[derive(Debug, Clone)]
pub struct Building {
    /// Nominal placement point.
    anchor: (f64, f64),

    /// Footprint radius.
    radius: f64,

    /// Building height (drives the shadow lengths).
    height: f64,

    /// Regulatory spacing distance.
    buffer_distance: f64,

    /// Footprint circle at the anchor.
    footprint: Curve,

    /// Spacing buffer circle (`radius + buffer_distance`).
    buffer_region: Curve,

    /// Shadow-exclusion outline.
    shadow_region: Curve,
}

impl Building {
    /// Creates a building with the default buffer distance.
    pub fn new(anchor: (f64, f64), radius: f64, height: f64) -> Result<Self> {
        Self::with_buffer(anchor, radius, height, DEFAULT_BUFFER_DISTANCE)
    }

    /// Creates a building with an explicit buffer distance.
    ///
    /// All three curves are constructed here; a degenerate radius/height
    /// combination surfaces as a construction error, never as a silently
    /// broken curve.
    pub fn with_buffer(
        anchor: (f64, f64),
        radius: f64,
        height: f64,
        buffer_distance: f64,
    ) -> Result<Self> {
        validate_dimension("radius", radius)?;
        validate_dimension("height", height)?;
        validate_dimension("buffer distance", buffer_distance)?;
        if !(anchor.0.is_finite() && anchor.1.is_finite()) {
            return Err(Error::InvalidDimension(format!(
                "anchor must be finite, got ({}, {})",
                anchor.0, anchor.1
            )));
        }

        let shadow_region = shadow_region(anchor, radius, height)?;
        let buffer_region = Curve::circle(anchor, radius + buffer_distance)?;
        let footprint = Curve::circle(anchor, radius)?;

        Ok(Self {
            anchor,
            radius,
            height,
            buffer_distance,
            footprint,
            buffer_region,
            shadow_region,
        })
    }

    /// Returns the anchor point.
    pub fn anchor(&self) -> (f64, f64) {
        self.anchor
    }

    /// Returns the footprint radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the building height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns the regulatory spacing distance.
    pub fn buffer_distance(&self) -> f64 {
        self.buffer_distance
    }

    /// Returns the footprint circle.
    pub fn footprint(&self) -> &Curve {
        &self.footprint
    }

    /// Returns the spacing buffer circle.
    pub fn buffer_region(&self) -> &Curve {
        &self.buffer_region
    }

    /// Returns the shadow-exclusion outline.
    pub fn shadow_region(&self) -> &Curve {
        &self.shadow_region
    }

    /// Moves the building by `offset`.
    ///
    /// The three curves are translated into temporaries and committed
    /// together with the anchor; on any failure the building keeps its
    /// previous state.
    pub fn translate(&mut self, offset: (f64, f64)) -> Result<()> {
        let footprint = self.footprint.translated(offset)?;
        let buffer_region = self.buffer_region.translated(offset)?;
        let shadow_region = self.shadow_region.translated(offset)?;

        self.anchor = (self.anchor.0 + offset.0, self.anchor.1 + offset.1);
        self.footprint = footprint;
        self.buffer_region = buffer_region;
        self.shadow_region = shadow_region;
        Ok(())
    }
}

fn validate_dimension(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidDimension(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

/// Builds the shadow-exclusion outline for a building at `anchor`.
///
/// Two circles of the footprint radius are offset northward from the
/// anchor by the morning/evening shadow length along ±azimuth. Six
/// boundary points off the three circles, plus the noon-shadow apex, are
/// connected by two straight edges and four arcs and joined into one
/// closed curve. A join failure means the height/radius combination is
/// degenerate and is reported to the caller.
fn shadow_region(anchor: (f64, f64), radius: f64, height: f64) -> Result<Curve> {
    let shadow = height / MORNING_SUN_ELEVATION_DEG.to_radians().tan();
    let shadow_mid = height / NOON_SUN_ELEVATION_DEG.to_radians().tan();
    let azimuth = SOLAR_AZIMUTH_DEG.to_radians();
    let transition = APEX_TRANSITION_DEG.to_radians();

    let (x, y) = anchor;
    let west_center = (x - shadow * azimuth.sin(), y + shadow * azimuth.cos());
    let east_center = (x + shadow * azimuth.sin(), y + shadow * azimuth.cos());
    let apex = (x, y + shadow_mid + radius);

    let on = |center: (f64, f64), angle: f64| {
        (
            center.0 + radius * angle.cos(),
            center.1 + radius * angle.sin(),
        )
    };
    let a = on(anchor, PI + azimuth);
    let f = on(anchor, TAU - azimuth);
    let b = on(west_center, PI + azimuth);
    let c = on(west_center, PI / 2.0 - transition);
    let d = on(east_center, PI / 2.0 + transition);
    let e = on(east_center, -azimuth);

    let pieces = vec![
        // West edge of the shadow.
        Piece::line(a, b),
        // West and top of the west offset circle.
        Piece::arc(
            west_center,
            radius,
            PI + azimuth,
            (PI / 2.0 - transition) - (PI + azimuth),
        ),
        // Cap over the noon-shadow apex.
        Piece::arc_through(c, apex, d)?,
        // East and top of the east offset circle (reversed at join).
        Piece::arc(
            east_center,
            radius,
            -azimuth,
            (PI / 2.0 + transition) + azimuth,
        ),
        // East edge of the shadow.
        Piece::line(e, f),
        // Bottom of the footprint (reversed at join).
        Piece::arc(anchor, radius, PI + azimuth, PI - 2.0 * azimuth),
    ];

    Curve::join(pieces, JOIN_TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use siteplan_core::Containment;

    #[test]
    fn test_rejects_degenerate_dimensions() {
        assert!(Building::new((0.0, 0.0), 0.0, 30.0).is_err());
        assert!(Building::new((0.0, 0.0), -5.0, 30.0).is_err());
        assert!(Building::new((0.0, 0.0), 10.0, 0.0).is_err());
        assert!(Building::new((0.0, 0.0), 10.0, -1.0).is_err());
        assert!(Building::with_buffer((0.0, 0.0), 10.0, 30.0, 0.0).is_err());
        assert!(Building::new((f64::NAN, 0.0), 10.0, 30.0).is_err());
    }

    #[test]
    fn test_default_buffer_distance() {
        let building = Building::new((0.0, 0.0), 10.0, 30.0).unwrap();
        assert_relative_eq!(building.buffer_distance(), 13.0);
        let ((cx, cy), r) = building.buffer_region().as_circle().unwrap();
        assert_relative_eq!(cx, 0.0);
        assert_relative_eq!(cy, 0.0);
        assert_relative_eq!(r, 23.0);
    }

    #[test]
    fn test_footprint_matches_anchor_and_radius() {
        let building = Building::new((4.0, -2.0), 7.5, 20.0).unwrap();
        let ((cx, cy), r) = building.footprint().as_circle().unwrap();
        assert_relative_eq!(cx, 4.0);
        assert_relative_eq!(cy, -2.0);
        assert_relative_eq!(r, 7.5);
    }

    #[test]
    fn test_shadow_region_is_one_closed_curve() {
        let building = Building::new((0.0, 0.0), 10.0, 30.0).unwrap();
        let shadow = building.shadow_region();
        // Joined outline, not a circle.
        assert!(shadow.as_circle().is_none());
        assert!(shadow.domain_max() > 0.0);

        // Covers the building's own footprint and the apex region.
        assert_eq!(shadow.classify_point((0.0, 0.0)), Containment::Inside);
        assert_eq!(shadow.classify_point((0.0, 69.0)), Containment::Inside);
        // Clear of ground well south and well north of the outline.
        assert_eq!(shadow.classify_point((0.0, -30.0)), Containment::Outside);
        assert_eq!(shadow.classify_point((0.0, 90.0)), Containment::Outside);
    }

    #[test]
    fn test_shadow_region_scales_with_height() {
        let low = Building::new((0.0, 0.0), 10.0, 10.0).unwrap();
        let high = Building::new((0.0, 0.0), 10.0, 60.0).unwrap();
        let probe = (0.0, 50.0);
        assert_eq!(
            low.shadow_region().classify_point(probe),
            Containment::Outside
        );
        assert_eq!(
            high.shadow_region().classify_point(probe),
            Containment::Inside
        );
    }

    #[test]
    fn test_translate_round_trip_restores_anchor() {
        let mut building = Building::new((1.0, 2.0), 10.0, 30.0).unwrap();
        building.translate((3.5, -2.25)).unwrap();
        assert_relative_eq!(building.anchor().0, 4.5, epsilon = 1e-12);
        building.translate((-3.5, 2.25)).unwrap();
        assert_relative_eq!(building.anchor().0, 1.0, epsilon = 1e-12);
        assert_relative_eq!(building.anchor().1, 2.0, epsilon = 1e-12);

        let ((cx, cy), _) = building.footprint().as_circle().unwrap();
        assert_relative_eq!(cx, 1.0, epsilon = 1e-12);
        assert_relative_eq!(cy, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_translate_keeps_curves_consistent() {
        let mut building = Building::new((0.0, 0.0), 10.0, 30.0).unwrap();
        building.translate((100.0, 50.0)).unwrap();

        let ((fx, fy), _) = building.footprint().as_circle().unwrap();
        let ((bx, by), _) = building.buffer_region().as_circle().unwrap();
        assert_relative_eq!(fx, 100.0, epsilon = 1e-9);
        assert_relative_eq!(fy, 50.0, epsilon = 1e-9);
        assert_relative_eq!(bx, 100.0, epsilon = 1e-9);
        assert_relative_eq!(by, 50.0, epsilon = 1e-9);
        assert_eq!(
            building.shadow_region().classify_point((100.0, 50.0)),
            Containment::Inside
        );
    }

    #[test]
    fn test_translate_is_atomic_on_failure() {
        let mut building = Building::new((1.0, 2.0), 10.0, 30.0).unwrap();
        let err = building.translate((f64::INFINITY, 0.0)).unwrap_err();
        assert!(matches!(err, Error::TranslationFailed(_)));

        // Nothing moved.
        assert_relative_eq!(building.anchor().0, 1.0);
        let ((cx, _), _) = building.footprint().as_circle().unwrap();
        assert_relative_eq!(cx, 1.0);
    }
}
