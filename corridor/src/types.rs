//! # Types
//!
//! Geometric types shared between the reference line, corridors and sequences.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// Identifier of a corridor.
pub type CorridorId = u64;

/// A point on the XY plane.
pub type CartesianPoint2D = Vector2<f64>;

/// A direction on the XY plane.
pub type CartesianVector2D = Vector2<f64>;

/// The signed distances to the (left, right) boundaries of a corridor.
///
/// Left distances are positive, right distances negative.
pub type BoundaryDistances = (f64, f64);

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A position in Frenet coordinates relative to a reference line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrenetPosition {
    /// Longitudinal coordinate, the arc length along the reference line.
    pub l: f64,

    /// Lateral coordinate, positive to the left of the reference line.
    pub d: f64,
}

/// The local frame of a reference line at a given arc length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrenetFrame2D {
    /// The point on the reference line where the frame sits
    pub origin: CartesianPoint2D,

    /// Unit tangent in the direction of travel
    pub tangent: CartesianVector2D,

    /// Unit normal, pointing to the left of the direction of travel
    pub normal: CartesianVector2D,

    /// Signed curvature of the reference line, positive when turning left
    pub curvature: f64,
}

/// The result of projecting a Cartesian point onto a reference line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrenetPositionWithFrame {
    pub position: FrenetPosition,
    pub frame: FrenetFrame2D,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl FrenetPosition {
    pub fn new(l: f64, d: f64) -> Self {
        Self { l, d }
    }
}

impl FrenetFrame2D {
    /// Convert a lateral offset at this frame back into a Cartesian point.
    pub fn lateral_point(&self, d: f64) -> CartesianPoint2D {
        self.origin + d * self.normal
    }
}
