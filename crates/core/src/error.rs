//! Error types for siteplan operations.

use thiserror::Error;

/// Errors raised by curve construction and the relaxation engine.
#[derive(Error, Debug)]
pub enum Error {
    /// A radius, height or buffer distance is non-positive or non-finite.
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    /// The site boundary cannot be used as a containment region.
    #[error("invalid boundary: {0}")]
    InvalidBoundary(String),

    /// A set of pieces could not be chained into one closed curve.
    #[error("curve join failed: {0}")]
    CurveJoin(String),

    /// A curve expected to be a full circle is not one.
    #[error("curve is not a circle: {0}")]
    NotACircle(String),

    /// A translation could not be applied.
    #[error("translation failed: {0}")]
    TranslationFailed(String),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
