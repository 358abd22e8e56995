//! Sampled curves and their intersections.

pub mod types;
pub mod sampler;
pub mod intersection;
pub mod scene;
pub mod samples;

pub use types::{round2, Curve, CurveId, Domain, DomainError, IntersectionPoint, Point};
pub use sampler::{
    evaluate_equation, evaluate_equation_with, generate_x_values, plot_equation, sample, sample_points,
    EquationResult,
};
pub use intersection::{find_intersections, intersect, intersect_all, intersect_with_tolerance, segment_intersection};
pub use scene::{plot_equations, EquationSet, EquationSlot, Plot, SceneError};
pub use samples::{SampleEquation, SAMPLE_EQUATIONS};
