//! The constraint-relaxation engine.
//!
//! [`Relaxer::relax`] runs a bounded fixed-point loop over a list of
//! [`Building`]s: while any of the three violation predicates fires
//! (shadow overlap, boundary escape, spacing deficit), it applies one
//! boundary-correction pass, one spacing-correction pass and one
//! shadow-resolution pass, then re-checks. The passes deliberately do not
//! re-check each other within a cycle; the outer loop catches violations
//! a later pass reintroduces. Once the cycle count reaches the iteration
//! budget, the loop keeps running but evicts the last building each
//! further cycle, so a non-converging run winds the working set down
//! instead of spinning forever.

use crate::building::Building;
use crate::curve::Curve;
use rand::Rng;
use siteplan_core::{ClosedCurve, Containment, Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tuning parameters of the relaxation loop.
///
/// The push split and sampling precisions are empirically chosen domain
/// constants, kept named and overridable rather than buried as literals.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RelaxConfig {
    /// Cycles before the eviction valve opens.
    pub iteration_budget: u32,

    /// Samples per curve for state classification.
    pub sample_precision: usize,

    /// Samples per footprint for the boundary-correction pass.
    pub boundary_precision: usize,

    /// Share of the resolution vector applied to the shadowed building.
    pub receiver_push: f64,

    /// Share applied (negated) to the shadow-casting building.
    pub caster_push: f64,

    /// Merge distance for curve-curve intersection points.
    pub intersection_tolerance: f64,
}

impl Default for RelaxConfig {
    fn default() -> Self {
        Self {
            iteration_budget: 100,
            sample_precision: 9,
            boundary_precision: 24,
            receiver_push: 0.6,
            caster_push: 0.4,
            intersection_tolerance: 1e-4,
        }
    }
}

impl RelaxConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the iteration budget.
    pub fn with_iteration_budget(mut self, budget: u32) -> Self {
        self.iteration_budget = budget;
        self
    }

    /// Sets the classification sampling precision.
    pub fn with_sample_precision(mut self, precision: usize) -> Self {
        self.sample_precision = precision;
        self
    }

    /// Sets the boundary-correction sampling precision.
    pub fn with_boundary_precision(mut self, precision: usize) -> Self {
        self.boundary_precision = precision;
        self
    }

    /// Sets the receiver/caster push split.
    pub fn with_push_split(mut self, receiver: f64, caster: f64) -> Self {
        self.receiver_push = receiver;
        self.caster_push = caster;
        self
    }
}

/// Classification of one closed curve against another's region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CurveState {
    /// Every sample lies inside the region.
    Inside,
    /// At least half of the samples lie inside.
    IntersectionMajority,
    /// Some samples lie inside, fewer than half.
    Intersection,
    /// No sample lies inside.
    Outside,
}

/// Classifies `curve` against the region bounded by `region`.
///
/// Samples `curve` at `precision` evenly spaced parameters and counts the
/// samples strictly inside `region`. Points on the region boundary count
/// as not inside.
pub fn curve_state<C: ClosedCurve<Scalar = f64>>(
    curve: &C,
    region: &C,
    precision: usize,
) -> CurveState {
    let inside = curve
        .sample_points(precision)
        .into_iter()
        .filter(|&p| region.classify_point(p) == Containment::Inside)
        .count();

    if inside == precision {
        CurveState::Inside
    } else if inside as f64 >= precision as f64 / 2.0 {
        CurveState::IntersectionMajority
    } else if inside == 0 {
        CurveState::Outside
    } else {
        CurveState::Intersection
    }
}

/// The relaxation engine.
pub struct Relaxer {
    config: RelaxConfig,
}

impl Relaxer {
    /// Creates a relaxer with the given configuration.
    pub fn new(config: RelaxConfig) -> Self {
        Self { config }
    }

    /// Creates a relaxer with default configuration.
    pub fn default_config() -> Self {
        Self::new(RelaxConfig::default())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RelaxConfig {
        &self.config
    }

    /// Runs the relaxation loop and returns the final building list.
    ///
    /// Non-convergence is not an error: the loop exits as soon as no
    /// predicate fires, which may only happen after the eviction valve
    /// has shrunk the working list. A building that cannot fit inside the
    /// boundary at all churns through boundary corrections until the
    /// valve drains it. Geometry errors raised mid-loop (a buffer region
    /// that is not a circle, a non-finite translation) propagate and
    /// abort the run.
    pub fn relax<R: Rng + ?Sized>(
        &self,
        mut buildings: Vec<Building>,
        boundary: &Curve,
        rng: &mut R,
    ) -> Result<Vec<Building>> {
        let mut cycles: u32 = 0;
        loop {
            let shadow = self.shadow_violation(&buildings);
            let escape = self.boundary_violation(&buildings, boundary);
            let spacing = self.spacing_violation(&buildings)?;
            if !(shadow || escape || spacing) {
                break;
            }
            log::debug!(
                "relaxation cycle {cycles}: shadow={shadow} boundary={escape} spacing={spacing}"
            );

            self.correct_boundary(&mut buildings, boundary)?;
            self.correct_spacing(&mut buildings)?;
            self.resolve_shadow_conflicts(&mut buildings, rng)?;

            if cycles >= self.config.iteration_budget {
                if let Some(evicted) = buildings.pop() {
                    log::warn!(
                        "iteration budget {} exhausted, evicting building at {:?}",
                        self.config.iteration_budget,
                        evicted.anchor()
                    );
                }
            }
            cycles = cycles.saturating_add(1);
        }
        Ok(buildings)
    }

    /// True when any footprint overlaps or sits inside another building's
    /// shadow region.
    pub fn shadow_violation(&self, buildings: &[Building]) -> bool {
        for (i, caster) in buildings.iter().enumerate() {
            for (j, receiver) in buildings.iter().enumerate() {
                if i == j {
                    continue;
                }
                let state = curve_state(
                    receiver.footprint(),
                    caster.shadow_region(),
                    self.config.sample_precision,
                );
                if state == CurveState::Inside {
                    return true;
                }
                let crossings = caster.shadow_region().intersection_parameters(
                    receiver.footprint(),
                    self.config.intersection_tolerance,
                );
                if crossings.len() > 1 {
                    return true;
                }
            }
        }
        false
    }

    /// True when any footprint is not fully inside the boundary.
    ///
    /// Partial and full escape both count.
    pub fn boundary_violation(&self, buildings: &[Building], boundary: &Curve) -> bool {
        buildings.iter().any(|building| {
            curve_state(building.footprint(), boundary, self.config.sample_precision)
                != CurveState::Inside
        })
    }

    /// True when any pair's centers sit closer than the mean of their
    /// buffer distances.
    ///
    /// Fails when a buffer region does not resolve to a circle.
    pub fn spacing_violation(&self, buildings: &[Building]) -> Result<bool> {
        for (i, a) in buildings.iter().enumerate() {
            for (j, b) in buildings.iter().enumerate() {
                if i == j {
                    continue;
                }
                let ca = circle_center(a.buffer_region())?;
                let cb = circle_center(b.buffer_region())?;
                let distance = ((ca.0 - cb.0).powi(2) + (ca.1 - cb.1).powi(2)).sqrt();
                if distance < (a.buffer_distance() + b.buffer_distance()) / 2.0 {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Pulls every escaping footprint back toward the boundary.
    ///
    /// For each building, footprint samples outside the boundary are
    /// scanned and the LAST offending sample determines the displacement:
    /// the vector from that sample to its closest point on the boundary.
    /// An intentional simplification, not an average over all samples.
    fn correct_boundary(&self, buildings: &mut [Building], boundary: &Curve) -> Result<()> {
        for building in buildings.iter_mut() {
            let mut offset = (0.0, 0.0);
            for sample in building
                .footprint()
                .sample_points(self.config.boundary_precision)
            {
                if boundary.classify_point(sample) == Containment::Outside {
                    let (_, nearest) = boundary.closest_point(sample);
                    offset = (nearest.0 - sample.0, nearest.1 - sample.1);
                }
            }
            if offset != (0.0, 0.0) {
                building.translate(offset)?;
            }
        }
        Ok(())
    }

    /// Separates every violating pair symmetrically.
    ///
    /// Each building moves by half the gap-closing vector, in opposite
    /// directions along the center line, so one pass lands the pair
    /// exactly at the required separation. Coincident centers are left to
    /// the shadow escape move, which breaks the tie on a later cycle.
    fn correct_spacing(&self, buildings: &mut [Building]) -> Result<()> {
        for i in 0..buildings.len() {
            for j in 0..buildings.len() {
                if i == j {
                    continue;
                }
                let ca = circle_center(buildings[i].buffer_region())?;
                let cb = circle_center(buildings[j].buffer_region())?;
                let direction = (ca.0 - cb.0, ca.1 - cb.1);
                let distance = (direction.0.powi(2) + direction.1.powi(2)).sqrt();
                let required =
                    (buildings[i].buffer_distance() + buildings[j].buffer_distance()) / 2.0;
                if distance >= required || distance < f64::EPSILON {
                    continue;
                }
                let gap = required - distance;
                let step = (
                    0.5 * gap * direction.0 / distance,
                    0.5 * gap * direction.1 / distance,
                );
                buildings[i].translate(step)?;
                buildings[j].translate((-step.0, -step.1))?;
            }
        }
        Ok(())
    }

    /// Resolves shadow/footprint interpenetration pair by pair.
    ///
    /// A fully shadowed footprint first gets a randomized escape
    /// displacement; a crossing pair is then displaced along the vector
    /// between the two representative mid-points of the crossing spans,
    /// split asymmetrically so the shadowed building moves more than the
    /// caster.
    fn resolve_shadow_conflicts<R: Rng + ?Sized>(
        &self,
        buildings: &mut [Building],
        rng: &mut R,
    ) -> Result<()> {
        let precision = self.config.sample_precision;
        for i in 0..buildings.len() {
            for j in 0..buildings.len() {
                if i == j {
                    continue;
                }

                if curve_state(
                    buildings[j].footprint(),
                    buildings[i].shadow_region(),
                    precision,
                ) == CurveState::Inside
                {
                    let offset = escape_offset(buildings[j].radius(), rng);
                    buildings[j].translate(offset)?;
                }

                let (t_shadow, t_footprint) = {
                    let shadow = buildings[i].shadow_region();
                    let footprint = buildings[j].footprint();
                    let crossings = shadow
                        .intersection_parameters(footprint, self.config.intersection_tolerance);
                    if crossings.len() < 2 {
                        continue;
                    }

                    let t_shadow =
                        wraparound_mid(crossings[0].0, crossings[1].0, shadow.domain_max());

                    let (b0, b1) = (crossings[0].1, crossings[1].1);
                    let max = footprint.domain_max();
                    let wrapped = b1 - b0 >= 0.5 * max;
                    let mid = wraparound_mid(b0, b1, max);
                    // Majority-contained samples mean the outward direction
                    // is the complement: reflect the (non-wrapped) mid to
                    // the opposite side of the domain.
                    let state = curve_state(footprint, shadow, precision);
                    let t_footprint = if !wrapped && state == CurveState::IntersectionMajority {
                        (0.5 * max - mid).abs()
                    } else {
                        mid
                    };
                    (t_shadow, t_footprint)
                };

                let xa = buildings[i].shadow_region().point_at(t_shadow);
                let xb = buildings[j].footprint().point_at(t_footprint);
                let push = (xa.0 - xb.0, xa.1 - xb.1);
                buildings[j].translate((
                    self.config.receiver_push * push.0,
                    self.config.receiver_push * push.1,
                ))?;
                buildings[i].translate((
                    -self.config.caster_push * push.0,
                    -self.config.caster_push * push.1,
                ))?;
            }
        }
        Ok(())
    }
}

/// Representative parameter between two crossings on a closed curve.
///
/// The arithmetic mean when the two parameters sit within half the domain
/// of each other; otherwise the mean across the domain seam, reduced
/// modulo the domain length.
fn wraparound_mid(t0: f64, t1: f64, max: f64) -> f64 {
    if t1 - t0 < 0.5 * max {
        0.5 * (t0 + t1)
    } else {
        let gap = max + t0 - t1;
        (t1 + 0.5 * gap) % max
    }
}

/// Randomized escape displacement for a fully shadowed building: per-axis
/// magnitude in `[radius, 2·radius)`, per-axis sign random.
fn escape_offset<R: Rng + ?Sized>(radius: f64, rng: &mut R) -> (f64, f64) {
    let mut component = || {
        let magnitude = (1.0 + rng.gen::<f64>()) * radius;
        if rng.gen::<bool>() {
            magnitude
        } else {
            -magnitude
        }
    };
    let x = component();
    let y = component();
    (x, y)
}

fn circle_center(curve: &Curve) -> Result<(f64, f64)> {
    curve
        .as_circle()
        .map(|(center, _)| center)
        .ok_or_else(|| Error::NotACircle("buffer region has no resolvable center".into()))
}
