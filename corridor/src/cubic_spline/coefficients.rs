//! Cubic spline segment coefficients

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Serialize;

use super::EndTangents;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The coefficients of one segment, `p(t) = a + b t + c t^2 + d t^3`, where `t` is the arc length
/// from the start of the segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SegmentCoefficients {
    pub a: Vector2<f64>,
    pub b: Vector2<f64>,
    pub c: Vector2<f64>,
    pub d: Vector2<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SegmentCoefficients {
    pub fn position(&self, t: f64) -> Vector2<f64> {
        self.a + t * (self.b + t * (self.c + t * self.d))
    }

    pub fn first_derivative(&self, t: f64) -> Vector2<f64> {
        self.b + t * (2.0 * self.c + 3.0 * t * self.d)
    }

    pub fn second_derivative(&self, t: f64) -> Vector2<f64> {
        2.0 * self.c + 6.0 * t * self.d
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Fit the segment coefficients through `points`, knotted at `arc_lengths`.
///
/// The caller guarantees there are at least two points, that both slices have the same length,
/// and that `arc_lengths` is strictly increasing.
pub(crate) fn fit(
    points: &[Vector2<f64>],
    arc_lengths: &[f64],
    end_tangents: Option<&EndTangents>,
) -> Vec<SegmentCoefficients> {
    let n = points.len();

    // Segment lengths and slopes
    let h: Vec<f64> = arc_lengths.windows(2).map(|s| s[1] - s[0]).collect();
    let slopes: Vec<Vector2<f64>> = points
        .windows(2)
        .zip(h.iter())
        .map(|(p, h)| (p[1] - p[0]) / *h)
        .collect();

    // Build the tridiagonal system for the second derivatives
    let mut lower = vec![0f64; n];
    let mut diag = vec![1f64; n];
    let mut upper = vec![0f64; n];
    let mut rhs = vec![Vector2::zeros(); n];

    for i in 1..(n - 1) {
        lower[i] = h[i - 1];
        diag[i] = 2.0 * (h[i - 1] + h[i]);
        upper[i] = h[i];
        rhs[i] = 6.0 * (slopes[i] - slopes[i - 1]);
    }

    // Natural ends keep the default identity rows with zero right hand side, clamped ends
    // constrain the first derivative instead.
    if let Some(tangents) = end_tangents {
        let first = tangents.first.normalize();
        let last = tangents.last.normalize();

        diag[0] = 2.0 * h[0];
        upper[0] = h[0];
        rhs[0] = 6.0 * (slopes[0] - first);

        lower[n - 1] = h[n - 2];
        diag[n - 1] = 2.0 * h[n - 2];
        rhs[n - 1] = 6.0 * (last - slopes[n - 2]);
    }

    let m = solve_tridiagonal(&lower, &diag, &upper, &rhs);

    (0..(n - 1))
        .map(|i| SegmentCoefficients {
            a: points[i],
            b: slopes[i] - h[i] * (2.0 * m[i] + m[i + 1]) / 6.0,
            c: m[i] / 2.0,
            d: (m[i + 1] - m[i]) / (6.0 * h[i]),
        })
        .collect()
}

/// Solve a diagonally dominant tridiagonal system with the Thomas algorithm.
fn solve_tridiagonal(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    rhs: &[Vector2<f64>],
) -> Vec<Vector2<f64>> {
    let n = diag.len();

    let mut c_prime = vec![0f64; n];
    let mut r_prime = vec![Vector2::zeros(); n];

    c_prime[0] = upper[0] / diag[0];
    r_prime[0] = rhs[0] / diag[0];

    // Forward sweep
    for i in 1..n {
        let m = diag[i] - lower[i] * c_prime[i - 1];
        c_prime[i] = upper[i] / m;
        r_prime[i] = (rhs[i] - lower[i] * r_prime[i - 1]) / m;
    }

    // Back substitution
    let mut x = r_prime;
    for i in (0..(n - 1)).rev() {
        let next = x[i + 1];
        x[i] -= c_prime[i] * next;
    }

    x
}
