//! # Cubic spline reference lines
//!
//! A reference line is an interpolating cubic spline through a set of points on the XY plane. The
//! spline is parametrised by the cumulative chord length between its points, which is taken as
//! the arc length of the line.
//!
//! Each coordinate is fitted independently on each segment between two neighbouring points as
//!
//! ```text
//! p(s) = a + b t + c t^2 + d t^3,    t = s - s_i
//! ```
//!
//! with the second derivatives at the points found by solving a tridiagonal system. Without end
//! tangents the spline is natural (zero second derivative at both ends), otherwise it is clamped
//! to the given tangents.
//!
//! Projection of an arbitrary point onto the line is done by a coarse scan over the segments
//! followed by a Newton refinement of the foot point. Points lying beyond either end of the line
//! are projected onto the extension of the line along its end tangent, so their longitudinal
//! coordinate falls outside `[0, length]`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod coefficients;
mod spline;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::types::CartesianVector2D;

// Internal
pub use coefficients::SegmentCoefficients;
pub use spline::CubicSpline;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tangents the spline is clamped to at its first and last points.
///
/// The tangents don't have to be normalised, only their direction is used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndTangents {
    pub first: CartesianVector2D,
    pub last: CartesianVector2D,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while building a spline.
#[derive(Debug, thiserror::Error)]
pub enum SplineError {
    #[error("A spline needs at least 2 points, found {0}")]
    TooFewPoints(usize),

    #[error("Point {0} is coincident with the previous point")]
    CoincidentPoints(usize),

    #[error("Point {0} is not finite")]
    NonFinitePoint(usize),

    #[error("The end tangents must be finite and non-zero, found {0:?}")]
    InvalidEndTangents(EndTangents),
}
