//! Arithmetic expressions over `x` (and `y` for implicit equations).
//!
//! - Recursive-descent parser with implicit multiplication
//! - Compilation into a function of `x` with symbol validation
//! - Per-point evaluation that reports non-real results as errors

pub mod parser;
pub mod evaluator;

#[cfg(test)]
mod tests;

pub use parser::{parse_expression, Expr, SyntaxError};
pub use evaluator::{evaluate_constant, CompileError, CompiledFn, EvalContext, EvalError};
