//! # Siteplan Layout
//!
//! Constraint-relaxation placement of circular building footprints.
//!
//! Buildings are placed on a site and iteratively perturbed until three
//! regulatory constraints hold at once:
//!
//! - no footprint sits inside another building's shadow-exclusion region,
//! - every pair keeps the mean of their buffer distances between centers,
//! - every footprint lies fully inside the site boundary.
//!
//! The engine finds *a* feasible layout, not the best one, and treats
//! non-convergence as a defined terminal state: past the iteration budget
//! it sheds the last building each cycle instead of spinning forever.
//!
//! ## Quick Start
//!
//! ```rust
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use siteplan_layout::{Building, Curve, RelaxConfig, Relaxer};
//!
//! // One building well inside a circular site: already a fixed point.
//! let building = Building::new((0.0, 0.0), 10.0, 30.0)?;
//! let boundary = Curve::circle((0.0, 0.0), 200.0)?;
//!
//! let relaxer = Relaxer::new(RelaxConfig::default().with_iteration_budget(5));
//! let mut rng = StdRng::seed_from_u64(42);
//! let placed = relaxer.relax(vec![building], &boundary, &mut rng)?;
//!
//! assert_eq!(placed.len(), 1);
//! assert_eq!(placed[0].anchor(), (0.0, 0.0));
//! # Ok::<(), siteplan_layout::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod building;
pub mod curve;
pub mod relax;

// Re-exports
pub use building::{Building, DEFAULT_BUFFER_DISTANCE};
pub use curve::{Curve, Piece, JOIN_TOLERANCE};
pub use relax::{curve_state, CurveState, RelaxConfig, Relaxer};
pub use siteplan_core::{ClosedCurve, Containment, Error, Result, AABB2D};
