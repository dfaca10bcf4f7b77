//! Cubic spline queries and nearest point projection

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use nalgebra::Vector2;
use serde::Serialize;
use std::fmt;

use super::{coefficients, EndTangents, SegmentCoefficients, SplineError};
use crate::{
    boundary::{BoundaryError, BoundaryPolyline},
    params::ProjectionParams,
    types::*,
};
use util::maths::{clamp, cross_2d};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An arc length parametrised cubic spline on the XY plane.
#[derive(Debug, Clone, Serialize)]
pub struct CubicSpline {
    /// The points the spline passes through
    points: Vec<CartesianPoint2D>,

    /// The arc length at each point, starting at zero
    arc_lengths: Vec<f64>,

    /// Coefficients of the segment between each pair of points
    segments: Vec<SegmentCoefficients>,

    /// Parameters for the nearest point projection
    params: ProjectionParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CubicSpline {
    /// Fit a new spline through the given points.
    ///
    /// If `end_tangents` is `None` a natural spline is fitted.
    pub fn new(
        points: &[CartesianPoint2D],
        end_tangents: Option<EndTangents>,
        params: ProjectionParams,
    ) -> Result<Self, SplineError> {
        if points.len() < 2 {
            return Err(SplineError::TooFewPoints(points.len()));
        }

        if let Some(i) = points.iter().position(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(SplineError::NonFinitePoint(i));
        }

        if let Some(t) = end_tangents {
            let valid = |v: &CartesianVector2D| {
                v.x.is_finite() && v.y.is_finite() && v.norm() > std::f64::EPSILON
            };
            if !(valid(&t.first) && valid(&t.last)) {
                return Err(SplineError::InvalidEndTangents(t));
            }
        }

        // Cumulative chord length at each point
        let mut arc_lengths = Vec::with_capacity(points.len());
        arc_lengths.push(0f64);
        for i in 1..points.len() {
            let chord = (points[i] - points[i - 1]).norm();
            if chord <= std::f64::EPSILON {
                return Err(SplineError::CoincidentPoints(i));
            }
            arc_lengths.push(arc_lengths[i - 1] + chord);
        }

        let segments = coefficients::fit(points, &arc_lengths, end_tangents.as_ref());

        Ok(Self {
            points: points.to_vec(),
            arc_lengths,
            segments,
            params,
        })
    }

    /// Number of points the spline was fitted through.
    pub fn size(&self) -> usize {
        self.points.len()
    }

    /// The points the spline was fitted through.
    pub fn points(&self) -> &[CartesianPoint2D] {
        &self.points
    }

    /// The arc length at the point with the given index, or `None` if there is no such point.
    pub fn arc_length_at_index(&self, index: usize) -> Option<f64> {
        self.arc_lengths.get(index).copied()
    }

    /// The arc lengths of all points.
    pub fn arc_lengths(&self) -> &[f64] {
        &self.arc_lengths
    }

    pub fn total_length(&self) -> f64 {
        self.arc_lengths[self.arc_lengths.len() - 1]
    }

    pub fn params(&self) -> &ProjectionParams {
        &self.params
    }

    /// Position on the line at the given arc length.
    ///
    /// Outside `[0, length]` the line is continued along its end tangents.
    pub fn position_at(&self, arc_length: f64) -> CartesianPoint2D {
        let length = self.total_length();

        if arc_length < 0.0 {
            self.points[0] + arc_length * self.tangent_at(0.0)
        } else if arc_length > length {
            self.points[self.points.len() - 1] + (arc_length - length) * self.tangent_at(length)
        } else {
            let (seg, t) = self.locate(arc_length);
            self.segments[seg].position(t)
        }
    }

    /// Unit tangent at the given arc length, clamped to the line.
    pub fn tangent_at(&self, arc_length: f64) -> CartesianVector2D {
        let (seg, t) = self.locate(arc_length);
        let deriv = self.segments[seg].first_derivative(t);

        if deriv.norm() > std::f64::EPSILON {
            deriv.normalize()
        } else {
            // Degenerate derivative, fall back to the segment chord
            (self.points[seg + 1] - self.points[seg]).normalize()
        }
    }

    /// Unit normal at the given arc length, pointing to the left of the direction of travel.
    pub fn normal_at(&self, arc_length: f64) -> CartesianVector2D {
        let tangent = self.tangent_at(arc_length);
        Vector2::new(-tangent.y, tangent.x)
    }

    /// Signed curvature at the given arc length, positive when the line turns left.
    pub fn curvature_at(&self, arc_length: f64) -> f64 {
        let (seg, t) = self.locate(arc_length);
        let d1 = self.segments[seg].first_derivative(t);
        let d2 = self.segments[seg].second_derivative(t);

        let speed = d1.norm();
        if speed <= std::f64::EPSILON {
            return 0.0;
        }

        cross_2d(&[d1.x, d1.y], &[d2.x, d2.y]) / speed.powi(3)
    }

    /// Frame at the given arc length, clamped to the line.
    pub fn frame_at(&self, arc_length: f64) -> FrenetFrame2D {
        FrenetFrame2D {
            origin: self.position_at(self.clamp_to_line(arc_length)),
            tangent: self.tangent_at(arc_length),
            normal: self.normal_at(arc_length),
            curvature: self.curvature_at(arc_length),
        }
    }

    /// The local frame at the nearest point of the line to `point`.
    pub fn frenet_frame(&self, point: &CartesianPoint2D) -> FrenetFrame2D {
        self.frenet_position_with_frame(point, None).frame
    }

    /// Project `point` onto the line.
    ///
    /// With a `hint` only the part of the line within the hint window of the hint is searched,
    /// which resolves the projection to the local branch of a line that doubles back on itself.
    pub fn frenet_position_with_frame(
        &self,
        point: &CartesianPoint2D,
        hint: Option<f64>,
    ) -> FrenetPositionWithFrame {
        let length = self.total_length();

        let (search_min, search_max) = match hint {
            Some(h) if h.is_finite() => (
                self.clamp_to_line(h - self.params.hint_window_m),
                self.clamp_to_line(h + self.params.hint_window_m),
            ),
            _ => (0.0, length),
        };

        let coarse = self.coarse_scan(point, search_min, search_max);
        let foot = self.refine(point, coarse);

        self.frenet_at_foot(point, foot)
    }

    /// Project a sequence of Cartesian points onto the line, giving a boundary polyline in the
    /// order of the points.
    pub fn to_frenet_polyline(
        &self,
        points: &[CartesianPoint2D],
    ) -> Result<BoundaryPolyline, BoundaryError> {
        BoundaryPolyline::new(
            points
                .iter()
                .map(|p| self.frenet_position_with_frame(p, None).position)
                .collect(),
        )
    }

    /// Find the segment index and local parameter of an arc length, clamped to the line.
    fn locate(&self, arc_length: f64) -> (usize, f64) {
        let s = self.clamp_to_line(arc_length);

        let seg = self
            .arc_lengths
            .partition_point(|&knot| knot <= s)
            .saturating_sub(1)
            .min(self.segments.len() - 1);

        (seg, s - self.arc_lengths[seg])
    }

    fn clamp_to_line(&self, arc_length: f64) -> f64 {
        if arc_length.is_nan() {
            return 0.0;
        }
        clamp(&arc_length, &0.0, &self.total_length())
    }

    /// Sample the segments overlapping `[s_min, s_max]` and return the arc length of the closest
    /// sample. Ties keep the earliest sample.
    fn coarse_scan(&self, point: &CartesianPoint2D, s_min: f64, s_max: f64) -> f64 {
        let samples = self.params.coarse_samples_per_segment.max(1);

        let mut best_s = s_min;
        let mut best_dist_sq = (self.position_at(s_min) - point).norm_squared();

        for (i, seg) in self.segments.iter().enumerate() {
            let (seg_start, seg_end) = (self.arc_lengths[i], self.arc_lengths[i + 1]);
            if seg_end < s_min || seg_start > s_max {
                continue;
            }

            for j in 0..=samples {
                let s = seg_start + (seg_end - seg_start) * j as f64 / samples as f64;
                if s < s_min || s > s_max {
                    continue;
                }

                let dist_sq = (seg.position(s - seg_start) - point).norm_squared();
                if dist_sq < best_dist_sq {
                    best_dist_sq = dist_sq;
                    best_s = s;
                }
            }
        }

        best_s
    }

    /// Newton refinement of `(p(s) - q) . p'(s) = 0` starting from `s_0`.
    ///
    /// The refined foot is only kept if it is at least as close as the starting one.
    fn refine(&self, point: &CartesianPoint2D, s_0: f64) -> f64 {
        let mut s = s_0;
        let mut converged = false;

        for _ in 0..self.params.max_newton_iters {
            let (seg, t) = self.locate(s);
            let coeffs = &self.segments[seg];

            let diff = coeffs.position(t) - point;
            let d1 = coeffs.first_derivative(t);
            let d2 = coeffs.second_derivative(t);

            let grad = diff.dot(&d1);
            let hess = d1.dot(&d1) + diff.dot(&d2);

            // Not locally convex, the coarse sample is as good as it gets
            if hess <= std::f64::EPSILON {
                converged = true;
                break;
            }

            let next = self.clamp_to_line(s - grad / hess);
            let step = (next - s).abs();
            s = next;

            if step < self.params.newton_tol_m {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                "Projection of ({:.3}, {:.3}) did not converge within {} iterations",
                point.x, point.y, self.params.max_newton_iters
            );
        }

        let dist_sq = |s: f64| (self.position_at(s) - point).norm_squared();
        if dist_sq(s) <= dist_sq(s_0) {
            s
        } else {
            s_0
        }
    }

    /// Build the Frenet position of `point` from its foot arc length on the line, extrapolating
    /// along the end tangents when the point lies beyond either end.
    fn frenet_at_foot(&self, point: &CartesianPoint2D, foot: f64) -> FrenetPositionWithFrame {
        let length = self.total_length();
        let end_tol = self.params.newton_tol_m.max(std::f64::EPSILON);

        let mut frame = self.frame_at(foot);
        let mut l = foot;

        if foot <= end_tol || foot >= length - end_tol {
            let end = if foot <= end_tol { 0.0 } else { length };
            let end_frame = self.frame_at(end);
            let along = (point - end_frame.origin).dot(&end_frame.tangent);

            if (end == 0.0 && along < 0.0) || (end == length && along > 0.0) {
                frame = end_frame;
                frame.origin += along * end_frame.tangent;
                l = end + along;
            }
        }

        FrenetPositionWithFrame {
            position: FrenetPosition::new(l, (point - frame.origin).dot(&frame.normal)),
            frame,
        }
    }
}

impl fmt::Display for CubicSpline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CubicSpline ({} points, length {:.3} m):",
            self.size(),
            self.total_length()
        )?;
        for (p, s) in self.points.iter().zip(self.arc_lengths.iter()) {
            write!(f, "\n    s = {:8.3}: ({:.3}, {:.3})", s, p.x, p.y)?;
        }
        Ok(())
    }
}
