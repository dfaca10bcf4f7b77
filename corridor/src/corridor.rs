//! # Corridor
//!
//! A corridor couples a reference line with a left and a right boundary. The boundaries are stored
//! as signed lateral offsets from the reference line, positive to the left, so the left boundary
//! normally holds positive offsets and the right boundary negative ones.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use std::fmt;

use crate::{
    boundary::{BoundaryError, BoundaryPolyline},
    cubic_spline::CubicSpline,
    types::*,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The drivable region around a reference line.
#[derive(Debug, Clone, Serialize)]
pub struct Corridor {
    id: CorridorId,

    /// The line the boundaries are measured from
    reference_line: CubicSpline,

    left_boundary: BoundaryPolyline,

    right_boundary: BoundaryPolyline,
}

/// Cartesian polylines sampled along a corridor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CartesianPolylines {
    pub reference_line: Vec<CartesianPoint2D>,
    pub left_boundary: Vec<CartesianPoint2D>,
    pub right_boundary: Vec<CartesianPoint2D>,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CorridorError {
    #[error("Could not build the left boundary: {0}")]
    LeftBoundaryError(BoundaryError),

    #[error("Could not build the right boundary: {0}")]
    RightBoundaryError(BoundaryError),

    #[error("The sampling step must be positive and finite, found {0}")]
    InvalidStep(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Corridor {
    /// Create a new corridor from an existing reference line and boundaries.
    ///
    /// The boundaries are expected to cover the same arc length range as the reference line.
    pub fn new(
        id: CorridorId,
        reference_line: CubicSpline,
        left_boundary: BoundaryPolyline,
        right_boundary: BoundaryPolyline,
    ) -> Self {
        Self {
            id,
            reference_line,
            left_boundary,
            right_boundary,
        }
    }

    /// Create a corridor whose boundaries are at constant distances from the reference line.
    ///
    /// Both distances are given as magnitudes, the right one is stored negated.
    pub fn with_constant_distances(
        id: CorridorId,
        reference_line: CubicSpline,
        distance_left_boundary: f64,
        distance_right_boundary: f64,
    ) -> Result<Self, CorridorError> {
        let arc_lengths = reference_line.arc_lengths().to_vec();

        let left_boundary =
            BoundaryPolyline::constant(arc_lengths.iter().copied(), distance_left_boundary)
                .map_err(CorridorError::LeftBoundaryError)?;
        let right_boundary =
            BoundaryPolyline::constant(arc_lengths.into_iter(), -distance_right_boundary)
                .map_err(CorridorError::RightBoundaryError)?;

        Ok(Self::new(id, reference_line, left_boundary, right_boundary))
    }

    /// Create a corridor from explicit boundary points, which are projected onto the reference
    /// line.
    pub fn with_boundary_points(
        id: CorridorId,
        reference_line: CubicSpline,
        left_boundary_pts: &[CartesianPoint2D],
        right_boundary_pts: &[CartesianPoint2D],
    ) -> Result<Self, CorridorError> {
        let left_boundary = reference_line
            .to_frenet_polyline(left_boundary_pts)
            .map_err(CorridorError::LeftBoundaryError)?;
        let right_boundary = reference_line
            .to_frenet_polyline(right_boundary_pts)
            .map_err(CorridorError::RightBoundaryError)?;

        Ok(Self::new(id, reference_line, left_boundary, right_boundary))
    }

    pub fn id(&self) -> CorridorId {
        self.id
    }

    pub fn reference_line(&self) -> &CubicSpline {
        &self.reference_line
    }

    pub fn left_boundary(&self) -> &BoundaryPolyline {
        &self.left_boundary
    }

    pub fn right_boundary(&self) -> &BoundaryPolyline {
        &self.right_boundary
    }

    /// The signed (left, right) boundary offsets at the given arc length.
    pub fn signed_distances_at(&self, arc_length: f64) -> BoundaryDistances {
        (
            self.left_boundary.deviation_at(arc_length),
            self.right_boundary.deviation_at(arc_length),
        )
    }

    /// Total width of the corridor at the given arc length.
    pub fn width_at(&self, arc_length: f64) -> f64 {
        self.left_boundary.deviation_at(arc_length)
            + self.right_boundary.deviation_at(arc_length).abs()
    }

    /// Lateral offset of the corridor's centre from the reference line.
    pub fn center_offset(&self, arc_length: f64) -> f64 {
        let (left, right) = self.signed_distances_at(arc_length);
        (left + right) * 0.5
    }

    pub fn curvature_at(&self, arc_length: f64) -> f64 {
        self.reference_line.curvature_at(arc_length)
    }

    pub fn position_at(&self, arc_length: f64) -> CartesianPoint2D {
        self.reference_line.position_at(arc_length)
    }

    pub fn normal_at(&self, arc_length: f64) -> CartesianVector2D {
        self.reference_line.normal_at(arc_length)
    }

    pub fn length_reference_line(&self) -> f64 {
        self.reference_line.total_length()
    }

    /// The local frame at the projection of `position` onto the reference line.
    pub fn frenet_frame(&self, position: &CartesianPoint2D) -> FrenetFrame2D {
        self.reference_line.frenet_frame(position)
    }

    /// Project `position` onto the reference line, optionally searching only near
    /// `arc_length_hint`.
    pub fn frenet_position_with_frame(
        &self,
        position: &CartesianPoint2D,
        arc_length_hint: Option<f64>,
    ) -> FrenetPositionWithFrame {
        self.reference_line
            .frenet_position_with_frame(position, arc_length_hint)
    }

    /// Sample the reference line and both boundaries every `delta_l` metres of arc length.
    ///
    /// The output vectors are cleared first. The end of the reference line is always sampled,
    /// even when the length is not a multiple of `delta_l`.
    pub fn fill_cartesian_polylines(
        &self,
        delta_l: f64,
        reference_line: &mut Vec<CartesianPoint2D>,
        left_boundary: &mut Vec<CartesianPoint2D>,
        right_boundary: &mut Vec<CartesianPoint2D>,
    ) -> Result<(), CorridorError> {
        if !(delta_l.is_finite() && delta_l > 0.0) {
            return Err(CorridorError::InvalidStep(delta_l));
        }

        reference_line.clear();
        left_boundary.clear();
        right_boundary.clear();

        let max_length = self.length_reference_line();

        let mut push_sample = |query_l: f64| {
            let position = self.reference_line.position_at(query_l);
            let normal = self.reference_line.normal_at(query_l);
            let (d_left, d_right) = self.signed_distances_at(query_l);

            reference_line.push(position);
            left_boundary.push(position + d_left * normal);
            right_boundary.push(position + d_right * normal);
        };

        // Step by index rather than accumulating, so the samples don't drift
        let mut last_l = 0.0;
        let mut i = 0usize;
        loop {
            let query_l = i as f64 * delta_l;
            if query_l > max_length {
                break;
            }
            push_sample(query_l);
            last_l = query_l;
            i += 1;
        }

        if last_l < max_length {
            push_sample(max_length);
        }

        Ok(())
    }

    /// Owning version of [`Corridor::fill_cartesian_polylines`].
    pub fn cartesian_polylines(&self, delta_l: f64) -> Result<CartesianPolylines, CorridorError> {
        let mut polylines = CartesianPolylines::default();
        self.fill_cartesian_polylines(
            delta_l,
            &mut polylines.reference_line,
            &mut polylines.left_boundary,
            &mut polylines.right_boundary,
        )?;
        Ok(polylines)
    }
}

impl fmt::Display for Corridor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Corridor {}", self.id)?;
        writeln!(f, "{}", self.reference_line)?;
        writeln!(f, "{}", self.left_boundary)?;
        writeln!(f, "{}", self.right_boundary)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{cubic_spline::EndTangents, params::ProjectionParams};
    use approx::assert_relative_eq;
    use nalgebra::Vector2;

    fn straight_line(length: f64) -> CubicSpline {
        CubicSpline::new(
            &[Vector2::new(0.0, 0.0), Vector2::new(length, 0.0)],
            None,
            ProjectionParams::default(),
        )
        .unwrap()
    }

    fn curved_line() -> CubicSpline {
        CubicSpline::new(
            &[
                Vector2::new(0.0, 0.0),
                Vector2::new(4.0, 1.0),
                Vector2::new(8.0, 3.0),
                Vector2::new(10.0, 6.0),
            ],
            Some(EndTangents {
                first: Vector2::new(1.0, 0.0),
                last: Vector2::new(0.0, 1.0),
            }),
            ProjectionParams::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_constant_corridor() {
        let corridor = Corridor::with_constant_distances(1, curved_line(), 1.75, 1.75).unwrap();
        let length = corridor.length_reference_line();

        assert_eq!(corridor.id(), 1);
        assert_eq!(corridor.left_boundary().len(), 4);

        for i in 0..=20 {
            let s = length * i as f64 / 20.0;
            assert_relative_eq!(corridor.width_at(s), 3.5, epsilon = 1e-12);
            assert_relative_eq!(corridor.center_offset(s), 0.0, epsilon = 1e-12);
            assert_eq!(corridor.signed_distances_at(s), (1.75, -1.75));
        }
    }

    #[test]
    fn test_asymmetric_constant_corridor() {
        let corridor = Corridor::with_constant_distances(2, straight_line(10.0), 2.0, 1.0).unwrap();

        assert_eq!(corridor.signed_distances_at(3.0), (2.0, -1.0));
        assert_relative_eq!(corridor.width_at(3.0), 3.0);
        assert_relative_eq!(corridor.center_offset(3.0), 0.5);
    }

    #[test]
    fn test_projected_corridor() {
        let corridor = Corridor::with_boundary_points(
            3,
            straight_line(10.0),
            &[
                Vector2::new(0.0, 2.0),
                Vector2::new(5.0, 3.0),
                Vector2::new(10.0, 2.0),
            ],
            &[Vector2::new(0.0, -1.0), Vector2::new(10.0, -1.0)],
        )
        .unwrap();

        assert_relative_eq!(corridor.signed_distances_at(2.5).0, 2.5, epsilon = 1e-9);
        assert_relative_eq!(corridor.width_at(5.0), 4.0, epsilon = 1e-9);
        assert_relative_eq!(corridor.center_offset(5.0), 1.0, epsilon = 1e-9);

        // The width and centre are consistent with the signed distances everywhere, including
        // slightly outside the reference line
        for i in -2..=22 {
            let s = i as f64 * 0.5;
            let (left, right) = corridor.signed_distances_at(s);
            assert_relative_eq!(corridor.width_at(s), left + right.abs(), epsilon = 1e-12);
            assert_relative_eq!(corridor.center_offset(s), (left + right) / 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_projected_corridor_errors() {
        let res = Corridor::with_boundary_points(
            4,
            straight_line(10.0),
            &[],
            &[Vector2::new(0.0, -1.0), Vector2::new(10.0, -1.0)],
        );
        assert!(matches!(
            res,
            Err(CorridorError::LeftBoundaryError(BoundaryError::EmptySequence))
        ));

        let res = Corridor::with_boundary_points(
            4,
            straight_line(10.0),
            &[Vector2::new(0.0, 1.0), Vector2::new(10.0, 1.0)],
            &[Vector2::new(10.0, -1.0), Vector2::new(0.0, -1.0)],
        );
        assert!(matches!(
            res,
            Err(CorridorError::RightBoundaryError(BoundaryError::NonIncreasing(1)))
        ));
    }

    #[test]
    fn test_fill_includes_end_point() {
        let corridor = Corridor::with_constant_distances(5, straight_line(7.0), 1.0, 1.5).unwrap();
        let polylines = corridor.cartesian_polylines(2.0).unwrap();

        let xs: Vec<f64> = polylines.reference_line.iter().map(|p| p.x).collect();
        assert_eq!(xs.len(), 5);
        for (x, expected) in xs.iter().zip([0.0, 2.0, 4.0, 6.0, 7.0].iter()) {
            assert_relative_eq!(*x, *expected, epsilon = 1e-12);
        }

        assert_eq!(polylines.left_boundary.len(), 5);
        assert_eq!(polylines.right_boundary.len(), 5);
        for i in 0..5 {
            assert_relative_eq!(
                polylines.left_boundary[i],
                Vector2::new(xs[i], 1.0),
                epsilon = 1e-12
            );
            assert_relative_eq!(
                polylines.right_boundary[i],
                Vector2::new(xs[i], -1.5),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_fill_exact_multiple() {
        let corridor = Corridor::with_constant_distances(6, straight_line(6.0), 1.0, 1.0).unwrap();

        let mut reference = vec![Vector2::new(99.0, 99.0)];
        let mut left = Vec::new();
        let mut right = Vec::new();
        corridor
            .fill_cartesian_polylines(2.0, &mut reference, &mut left, &mut right)
            .unwrap();

        // Previous contents are cleared, and the end isn't duplicated
        assert_eq!(reference.len(), 4);
        assert_eq!(left.len(), 4);
        assert_eq!(right.len(), 4);
        assert_relative_eq!(reference[3], Vector2::new(6.0, 0.0), epsilon = 1e-12);

        assert!(matches!(
            corridor.fill_cartesian_polylines(0.0, &mut reference, &mut left, &mut right),
            Err(CorridorError::InvalidStep(_))
        ));
        assert!(matches!(
            corridor.cartesian_polylines(std::f64::NAN),
            Err(CorridorError::InvalidStep(_))
        ));
    }

    #[test]
    fn test_boundaries_on_opposite_sides() {
        let corridor = Corridor::with_constant_distances(7, curved_line(), 2.0, 1.0).unwrap();
        let polylines = corridor.cartesian_polylines(0.5).unwrap();

        for i in 0..polylines.reference_line.len() {
            let reference = polylines.reference_line[i];
            let to_left = polylines.left_boundary[i] - reference;
            let to_right = polylines.right_boundary[i] - reference;

            assert_relative_eq!(to_left.norm(), 2.0, epsilon = 1e-9);
            assert_relative_eq!(to_right.norm(), 1.0, epsilon = 1e-9);
            assert!(to_left.dot(&to_right) < 0.0);
        }
    }

    #[test]
    fn test_frenet_queries() {
        let corridor = Corridor::with_constant_distances(8, straight_line(10.0), 1.0, 1.0).unwrap();
        let point = Vector2::new(3.0, 0.5);

        let res = corridor.frenet_position_with_frame(&point, None);
        assert_relative_eq!(res.position.l, 3.0, epsilon = 1e-9);
        assert_relative_eq!(res.position.d, 0.5, epsilon = 1e-9);

        let hinted = corridor.frenet_position_with_frame(&point, Some(4.0));
        assert_relative_eq!(hinted.position.l, 3.0, epsilon = 1e-9);

        let frame = corridor.frenet_frame(&point);
        assert_relative_eq!(frame.origin, Vector2::new(3.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(frame.lateral_point(0.5), point, epsilon = 1e-9);
        assert_relative_eq!(corridor.curvature_at(3.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_display_and_serialise() {
        let corridor = Corridor::with_constant_distances(9, straight_line(10.0), 1.0, 1.0).unwrap();

        let text = format!("{}", corridor);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Corridor 9");
        assert!(lines[1].starts_with("CubicSpline"));
        assert!(lines.iter().filter(|l| l.starts_with("BoundaryPolyline")).count() == 2);

        let json = serde_json::to_value(&corridor).unwrap();
        assert_eq!(json["id"], 9);
        assert_eq!(json["right_boundary"]["samples"][1]["d"], -1.0);
    }
}
