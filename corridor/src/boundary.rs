//! # Boundary polylines
//!
//! A boundary polyline is the set of lateral offsets of one corridor boundary, keyed by the arc
//! length along the corridor's reference line. Offsets between samples are linearly interpolated,
//! offsets outside the sampled range take the value of the nearest edge sample.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use std::fmt;

use crate::types::FrenetPosition;
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Lateral offsets of a boundary, keyed by strictly increasing arc length.
///
/// Each sample is stored as a [`FrenetPosition`], with `l` the arc length and `d` the offset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryPolyline {
    samples: Vec<FrenetPosition>,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    #[error("Attempted to create a boundary from an empty sequence")]
    EmptySequence,

    #[error("Sample {0} is not finite")]
    NonFiniteSample(usize),

    #[error("The arc length of sample {0} does not increase on the previous sample")]
    NonIncreasing(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BoundaryPolyline {
    /// Create a new boundary from the given samples.
    ///
    /// The samples must be non-empty and strictly increasing in arc length. They are not sorted.
    pub fn new(samples: Vec<FrenetPosition>) -> Result<Self, BoundaryError> {
        if samples.is_empty() {
            return Err(BoundaryError::EmptySequence);
        }

        for (i, sample) in samples.iter().enumerate() {
            if !(sample.l.is_finite() && sample.d.is_finite()) {
                return Err(BoundaryError::NonFiniteSample(i));
            }
            if i > 0 && sample.l <= samples[i - 1].l {
                return Err(BoundaryError::NonIncreasing(i));
            }
        }

        Ok(Self { samples })
    }

    /// Create a boundary with the same offset at each of the given arc lengths.
    pub fn constant<I>(arc_lengths: I, offset: f64) -> Result<Self, BoundaryError>
    where
        I: IntoIterator<Item = f64>,
    {
        Self::new(
            arc_lengths
                .into_iter()
                .map(|l| FrenetPosition::new(l, offset))
                .collect(),
        )
    }

    /// The lateral offset of the boundary at the given arc length.
    pub fn deviation_at(&self, arc_length: f64) -> f64 {
        let first = &self.samples[0];
        let last = &self.samples[self.samples.len() - 1];

        if arc_length.is_nan() || arc_length <= first.l {
            return first.d;
        }
        if arc_length >= last.l {
            return last.d;
        }

        // Index of the first sample beyond the arc length, which is at least 1 here
        let upper = self.samples.partition_point(|s| s.l <= arc_length);
        let (s_0, s_1) = (&self.samples[upper - 1], &self.samples[upper]);

        lin_map((s_0.l, s_1.l), (s_0.d, s_1.d), arc_length)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[FrenetPosition] {
        &self.samples
    }
}

impl fmt::Display for BoundaryPolyline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundaryPolyline ({} samples):", self.samples.len())?;
        for sample in self.samples.iter() {
            write!(f, " ({:.3}, {:.3})", sample.l, sample.d)?;
        }
        Ok(())
    }
}
