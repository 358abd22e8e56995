//! Equation text to compiled curve function.
//!
//! Normalization turns user text into an expression of `x`; compilation
//! validates it. Both failures abort the whole curve and carry a fixed
//! user-facing message.

pub mod normalizer;

pub use normalizer::{normalize, normalize_with, Form, NormalizedExpr, ParseError};

use crate::config::{PlotSettings, SolverSettings};
use crate::expression::{CompileError, CompiledFn};
use thiserror::Error;

pub const PARSE_HINT: &str = r#"Cannot parse equation. Try using format like "2x + 1" or "x = 3""#;
pub const INVALID_SYNTAX: &str = "Invalid equation. Please check your syntax.";
pub const NO_REAL_VALUES: &str = "Equation has no real values in the plotted range.";

/// Whole-equation failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EquationError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl EquationError {
    /// Message shown next to the equation input
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Parse(_) => PARSE_HINT,
            Self::Compile(_) => INVALID_SYNTAX,
        }
    }
}

/// Compile a normalized expression with the default solver.
pub fn compile(expr: &NormalizedExpr) -> Result<CompiledFn, CompileError> {
    compile_with(expr, &SolverSettings::default())
}

pub fn compile_with(expr: &NormalizedExpr, solver: &SolverSettings) -> Result<CompiledFn, CompileError> {
    match expr.form {
        Form::Explicit | Form::Vertical { .. } => CompiledFn::explicit(&expr.text),
        Form::Implicit => CompiledFn::implicit(&expr.text, solver.clone()),
    }
}

/// Normalize and compile raw equation text.
pub fn parse_equation(raw: &str, settings: &PlotSettings) -> Result<(NormalizedExpr, CompiledFn), EquationError> {
    let normalized = normalize_with(raw, settings.vertical_slope)?;
    let compiled = compile_with(&normalized, &settings.solver)?;
    Ok((normalized, compiled))
}
