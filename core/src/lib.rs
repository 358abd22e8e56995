pub mod config;
pub mod expression;
pub mod equation;
pub mod plot;

pub use config::PlotSettings;
pub use equation::{normalize, EquationError, NormalizedExpr};
pub use expression::CompiledFn;
pub use plot::{evaluate_equation, find_intersections, generate_x_values, Curve, Domain, Point};

pub fn version() -> &'static str {
    "0.1.0"
}
