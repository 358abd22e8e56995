//! Curve data model: points, curves, domains and intersections.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{MAX_SAMPLE_COUNT, MIN_SAMPLE_STEP};

/// Round to 2 decimal places, the precision points are reported with.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn rounded(self) -> Self {
        Self::new(round2(self.x), round2(self.y))
    }

    /// Equal within `tolerance` on each axis independently.
    pub fn near(&self, other: &Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() < tolerance && (self.y - other.y).abs() < tolerance
    }
}

/// Identifier of an equation slot. Stable while the slot's text changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurveId(pub Uuid);

impl CurveId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Derive an id from a seed, e.g. for fixtures that need stable ids.
    pub fn new_deterministic(seed: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()))
    }
}

impl Default for CurveId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A sampled equation. Rebuilt in full whenever its text or domain changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub id: CurveId,
    pub source_text: String,
    /// Ordered by strictly increasing x; empty when `failed`
    pub points: Vec<Point>,
    pub failed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Set when the curve is a steep surrogate for the line `x = vertical_at`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_at: Option<f64>,
}

impl Curve {
    pub fn failed(id: CurveId, source_text: &str, reason: &str) -> Self {
        Self {
            id,
            source_text: source_text.to_string(),
            points: Vec::new(),
            failed: true,
            failure_reason: Some(reason.to_string()),
            vertical_at: None,
        }
    }

    /// A curve needs at least one segment to take part in intersection tests.
    pub fn can_intersect(&self) -> bool {
        !self.failed && self.points.len() >= 2
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Domain bounds must be finite")]
    NonFinite,
    #[error("Domain minimum {min} must be below maximum {max}")]
    EmptyRange { min: f64, max: f64 },
    #[error("Sample count {0} must be between 2 and {}", MAX_SAMPLE_COUNT)]
    SampleCount(usize),
    #[error("Sample spacing {0} is below {}", MIN_SAMPLE_STEP)]
    StepTooSmall(f64),
}

/// The abscissa range a curve is sampled over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDomain")]
pub struct Domain {
    min: f64,
    max: f64,
    sample_count: usize,
}

#[derive(Deserialize)]
struct RawDomain {
    min: f64,
    max: f64,
    sample_count: usize,
}

impl TryFrom<RawDomain> for Domain {
    type Error = DomainError;

    fn try_from(raw: RawDomain) -> Result<Self, Self::Error> {
        Domain::new(raw.min, raw.max, raw.sample_count)
    }
}

impl Domain {
    pub fn new(min: f64, max: f64, sample_count: usize) -> Result<Self, DomainError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(DomainError::NonFinite);
        }
        if min >= max {
            return Err(DomainError::EmptyRange { min, max });
        }
        if !(2..=MAX_SAMPLE_COUNT).contains(&sample_count) {
            return Err(DomainError::SampleCount(sample_count));
        }
        // Points carry 2 decimals, finer spacing would repeat abscissas
        let step = (max - min) / sample_count as f64;
        if step < MIN_SAMPLE_STEP {
            return Err(DomainError::StepTooSmall(step));
        }
        Ok(Self {
            min,
            max,
            sample_count,
        })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// The `sample_count + 1` evenly spaced abscissas, both ends included.
    pub fn abscissas(&self) -> Vec<f64> {
        super::sampler::generate_x_values(self.min, self.max, self.sample_count)
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self {
            min: -10.0,
            max: 10.0,
            sample_count: 200,
        }
    }
}

/// An intersection between two curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntersectionPoint {
    #[serde(flatten)]
    pub point: Point,
    pub curves: (CurveId, CurveId),
}
