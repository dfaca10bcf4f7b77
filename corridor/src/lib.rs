//! # Corridor library.
//!
//! Models the drivable corridor around a reference path, and chains of such corridors covering a
//! longer route. Corridors answer width and offset queries by arc length, and resolve Cartesian
//! points into Frenet coordinates, handing a point over to the neighbouring corridor when it falls
//! beyond a seam.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Boundary polylines - lateral offsets keyed by arc length
pub mod boundary;

/// Corridor - a reference line with a left and right boundary
pub mod corridor;

/// Cubic spline reference lines - arc length parametrised curves with nearest point projection
pub mod cubic_spline;

/// Library parameters
pub mod params;

/// Corridor paths - traversal orders through the road graph
pub mod path;

/// Corridor sequences - chains of corridors addressed by a global arc length
pub mod sequence;

/// Common geometric types
pub mod types;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use boundary::*;
pub use corridor::*;
pub use cubic_spline::{CubicSpline, EndTangents, SplineError};
pub use params::*;
pub use path::*;
pub use sequence::*;
pub use types::*;
