//! # Siteplan Core
//!
//! Core traits and abstractions for the siteplan constraint-relaxation
//! layout engine.
//!
//! This crate defines the seam between the relaxation algorithm and the
//! underlying 2D geometry backend:
//!
//! - **Geometry kernel**: [`ClosedCurve`], the small set of curve queries
//!   the engine needs (evaluation, sampling, containment classification,
//!   intersection parameters, closest point, translation).
//! - **Classification**: [`Containment`], the three-way point-vs-region
//!   result.
//! - **Transform types**: [`AABB2D`].
//! - **Errors**: [`Error`], [`Result`].
//!
//! Concrete curve types and the relaxation engine itself live in the
//! `siteplan-layout` crate.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod error;
pub mod geometry;
pub mod transform;

// Re-exports
pub use error::{Error, Result};
pub use geometry::{ClosedCurve, Containment};
pub use transform::AABB2D;
