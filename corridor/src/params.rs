//! Corridor library parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::path::Path;

use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the corridor library
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Params {
    /// Nearest point projection parameters
    pub projection: ProjectionParams,
}

/// Parameters controlling the nearest point projection onto a reference line.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    /// Number of samples taken along each spline segment during the coarse
    /// scan.
    pub coarse_samples_per_segment: usize,

    /// Maximum number of Newton iterations used to refine a projection
    pub max_newton_iters: usize,

    /// Convergence threshold on the arc length step of the refinement
    pub newton_tol_m: f64,

    /// Half-width of the arc length window searched around a hint
    pub hint_window_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Load the parameters from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, params::LoadError> {
        params::load(path)
    }
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            coarse_samples_per_segment: 8,
            max_newton_iters: 20,
            newton_tol_m: 1e-9,
            hint_window_m: 5.0,
        }
    }
}
