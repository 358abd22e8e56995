//! Tunable constants for sampling, solving and intersection.

use crate::plot::Domain;
use serde::{Deserialize, Serialize};

/// Upper bound on equations plotted together.
pub const MAX_EQUATIONS: usize = 3;

/// Slope of the steep surrogate standing in for a vertical line.
pub const VERTICAL_SLOPE: f64 = 1_000_000.0;

/// Two intersection points closer than this on both axes are one point.
pub const DEDUP_TOLERANCE: f64 = 0.01;

/// Cap on `Domain::sample_count` to keep pairwise intersection cheap.
pub const MAX_SAMPLE_COUNT: usize = 10_000;

/// Smallest abscissa spacing that survives rounding points to 2 decimals.
pub const MIN_SAMPLE_STEP: f64 = 0.01;

/// Upper bound on how far `SolverSettings::covering` multiplies the scan.
const MAX_SCAN_GROWTH: usize = 10;

/// Numeric root search used for equations that do not isolate `y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Range scanned for a sign change, top down
    pub y_min: f64,
    pub y_max: f64,
    pub scan_steps: usize,
    /// Bisection iterations once a bracket is found
    pub max_iterations: usize,
    /// Relative residual accepted by the affine solve
    pub tolerance: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            y_min: -10.0,
            y_max: 10.0,
            scan_steps: 400,
            max_iterations: 60,
            tolerance: 1e-9,
        }
    }
}

impl SolverSettings {
    /// Widen the scanned y range to include `[min, max]`, keeping the scan
    /// resolution up to a bounded number of extra steps.
    pub fn covering(&self, min: f64, max: f64) -> Self {
        let y_min = self.y_min.min(min);
        let y_max = self.y_max.max(max);
        let width = self.y_max - self.y_min;
        if (y_min == self.y_min && y_max == self.y_max) || width <= 0.0 {
            return Self {
                y_min,
                y_max,
                ..self.clone()
            };
        }

        let wanted = (self.scan_steps as f64 * (y_max - y_min) / width).ceil() as usize;
        Self {
            y_min,
            y_max,
            scan_steps: wanted.min(self.scan_steps.saturating_mul(MAX_SCAN_GROWTH)),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    pub domain: Domain,
    pub dedup_tolerance: f64,
    pub vertical_slope: f64,
    pub max_equations: usize,
    pub solver: SolverSettings,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            domain: Domain::default(),
            dedup_tolerance: DEDUP_TOLERANCE,
            vertical_slope: VERTICAL_SLOPE,
            max_equations: MAX_EQUATIONS,
            solver: SolverSettings::default(),
        }
    }
}

impl PlotSettings {
    /// Parse settings from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// These settings with the implicit solver also scanning `[min, max]` in y,
    /// so curves stay visible when the plotted range grows.
    pub fn covering(&self, min: f64, max: f64) -> Self {
        Self {
            solver: self.solver.covering(min, max),
            ..self.clone()
        }
    }
}
