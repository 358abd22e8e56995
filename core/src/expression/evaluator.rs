//! Expression compiler and evaluator.
//!
//! A compiled function is a validated AST bound to the free variable `x`.
//! Implicit functions additionally bind `y` and are solved for `y` at each
//! abscissa with a numeric root search.

use super::parser::{parse_expression, BinaryOperator, Expr, SyntaxError, UnaryOperator};
use crate::config::SolverSettings;
use thiserror::Error;

/// Compilation error: the text is not an evaluable expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// A name that is neither a free variable of this form nor a constant
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
}

/// Per-point evaluation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("Division by zero")]
    DivisionByZero,
    /// Invalid function argument (e.g., sqrt of negative)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// NaN or infinite result
    #[error("Result is not a real number")]
    NonReal,
    #[error("Unknown function: {0}")]
    UnknownFunction(String),
    #[error("Unbound variable: {0}")]
    UnboundVariable(String),
    #[error("No real solution for y at x = {0}")]
    NoRealSolution(f64),
    #[error("Parse error: {0}")]
    Syntax(String),
}

/// Values bound to the free variables during one evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvalContext {
    x: Option<f64>,
    y: Option<f64>,
}

impl EvalContext {
    pub fn at(x: f64) -> Self {
        Self { x: Some(x), y: None }
    }

    pub fn at_xy(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }

    /// Evaluate an expression tree against the bound variables
    pub fn eval_expr(&self, expr: &Expr) -> Result<f64, EvalError> {
        match expr {
            Expr::Number(n) => Ok(*n),

            Expr::Var(name) => {
                let bound = match name.as_str() {
                    "x" => self.x,
                    "y" => self.y,
                    _ => None,
                };
                bound.ok_or_else(|| EvalError::UnboundVariable(name.clone()))
            }

            Expr::Constant(name) => match name.as_str() {
                "pi" => Ok(std::f64::consts::PI),
                "e" => Ok(std::f64::consts::E),
                _ => Err(EvalError::InvalidArgument(format!("Unknown constant: {}", name))),
            },

            Expr::BinaryOp { op, left, right } => {
                let l = self.eval_expr(left)?;
                let r = self.eval_expr(right)?;

                match op {
                    BinaryOperator::Add => Ok(l + r),
                    BinaryOperator::Sub => Ok(l - r),
                    BinaryOperator::Mul => Ok(l * r),
                    BinaryOperator::Div => {
                        if r.abs() < 1e-15 {
                            Err(EvalError::DivisionByZero)
                        } else {
                            Ok(l / r)
                        }
                    }
                    BinaryOperator::Pow => Ok(l.powf(r)),
                }
            }

            Expr::UnaryOp { op, operand } => {
                let val = self.eval_expr(operand)?;
                match op {
                    UnaryOperator::Neg => Ok(-val),
                }
            }

            Expr::FnCall { name, arg } => {
                let val = self.eval_expr(arg)?;
                apply_function(name, val)
            }
        }
    }
}

fn apply_function(name: &str, val: f64) -> Result<f64, EvalError> {
    match name {
        "sin" => Ok(val.sin()),
        "cos" => Ok(val.cos()),
        "tan" => Ok(val.tan()),
        "asin" => {
            if !(-1.0..=1.0).contains(&val) {
                Err(EvalError::InvalidArgument("asin argument must be in [-1, 1]".to_string()))
            } else {
                Ok(val.asin())
            }
        }
        "acos" => {
            if !(-1.0..=1.0).contains(&val) {
                Err(EvalError::InvalidArgument("acos argument must be in [-1, 1]".to_string()))
            } else {
                Ok(val.acos())
            }
        }
        "atan" => Ok(val.atan()),
        "sinh" => Ok(val.sinh()),
        "cosh" => Ok(val.cosh()),
        "tanh" => Ok(val.tanh()),
        "sqrt" => {
            if val < 0.0 {
                Err(EvalError::InvalidArgument("sqrt of negative number".to_string()))
            } else {
                Ok(val.sqrt())
            }
        }
        "cbrt" => Ok(val.cbrt()),
        "abs" => Ok(val.abs()),
        "ln" | "log" | "log10" | "log2" => {
            if val <= 0.0 {
                return Err(EvalError::InvalidArgument(format!(
                    "{} of non-positive number",
                    name
                )));
            }
            Ok(match name {
                "log10" => val.log10(),
                "log2" => val.log2(),
                _ => val.ln(),
            })
        }
        "exp" => Ok(val.exp()),
        "floor" => Ok(val.floor()),
        "ceil" => Ok(val.ceil()),
        "round" => Ok(val.round()),
        "sign" => Ok(if val == 0.0 { 0.0 } else { val.signum() }),
        _ => Err(EvalError::UnknownFunction(name.to_string())),
    }
}

fn finite(value: f64) -> Result<f64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonReal)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Kind {
    /// y = f(x)
    Explicit,
    /// f(x, y) = 0, solved for y per abscissa
    Implicit(SolverSettings),
}

/// A compiled curve function of `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFn {
    expr: Expr,
    kind: Kind,
}

impl CompiledFn {
    /// Compile `text` as `y = text`, with `x` the only free variable.
    pub fn explicit(text: &str) -> Result<Self, CompileError> {
        let expr = parse_expression(text)?;
        check_symbols(&expr, &["x"])?;
        Ok(Self {
            expr,
            kind: Kind::Explicit,
        })
    }

    /// Compile `text` as `text = 0` over `x` and `y`.
    pub fn implicit(text: &str, solver: SolverSettings) -> Result<Self, CompileError> {
        let expr = parse_expression(text)?;
        check_symbols(&expr, &["x", "y"])?;
        Ok(Self {
            expr,
            kind: Kind::Implicit(solver),
        })
    }

    pub fn is_implicit(&self) -> bool {
        matches!(self.kind, Kind::Implicit(_))
    }

    /// Evaluate the curve at `x`. Non-real results are errors for this point only.
    pub fn eval(&self, x: f64) -> Result<f64, EvalError> {
        match &self.kind {
            Kind::Explicit => finite(EvalContext::at(x).eval_expr(&self.expr)?),
            Kind::Implicit(solver) => solve_for_y(&self.expr, x, solver),
        }
    }
}

fn check_symbols(expr: &Expr, allowed: &[&str]) -> Result<(), CompileError> {
    let mut unknown = None;
    expr.for_each_var(&mut |name| {
        if unknown.is_none() && !allowed.contains(&name) {
            unknown = Some(name.to_string());
        }
    });
    match unknown {
        Some(name) => Err(CompileError::UnknownSymbol(name)),
        None => Ok(()),
    }
}

/// Evaluate a closed expression with no free variables.
pub fn evaluate_constant(input: &str) -> Result<f64, EvalError> {
    let expr = parse_expression(input).map_err(|e| EvalError::Syntax(e.message))?;
    finite(EvalContext::default().eval_expr(&expr)?)
}

/// Solve `expr(x, y) = 0` for `y`.
///
/// Equations affine in `y` are solved exactly from probes. Everything
/// else falls back to a top-down bracketing scan, so the uppermost real
/// branch wins when several roots exist. An expression that does not
/// depend on `y` at this abscissa has no isolated root.
fn solve_for_y(expr: &Expr, x: f64, solver: &SolverSettings) -> Result<f64, EvalError> {
    let g = |y: f64| -> Result<f64, EvalError> { finite(EvalContext::at_xy(x, y).eval_expr(expr)?) };

    if ignores_y(&g, solver.tolerance) {
        return Err(EvalError::NoRealSolution(x));
    }
    if let Some(y) = affine_root(&g, solver.tolerance) {
        return Ok(y);
    }
    bracketed_root(&g, solver).ok_or(EvalError::NoRealSolution(x))
}

/// Values of `y` at which `g` is probed before any root search.
const PROBES: [f64; 4] = [-1.0, 0.0, 1.0, 2.0];

/// `g` takes the same value at every probe, e.g. `y - (y)`.
fn ignores_y(g: &impl Fn(f64) -> Result<f64, EvalError>, tolerance: f64) -> bool {
    let Ok(first) = g(PROBES[0]) else {
        return false;
    };
    let scale = first.abs().max(1.0);
    PROBES[1..]
        .iter()
        .all(|&y| matches!(g(y), Ok(v) if (v - first).abs() <= tolerance * scale))
}

fn affine_root(g: &impl Fn(f64) -> Result<f64, EvalError>, tolerance: f64) -> Option<f64> {
    let g0 = g(0.0).ok()?;
    let g1 = g(1.0).ok()?;
    let slope = g1 - g0;
    if slope.abs() < f64::EPSILON {
        return None;
    }
    let scale = g0.abs().max(g1.abs()).max(1.0);

    // A curve that merely crosses the line through the first two probes is not affine
    for y in [PROBES[0], PROBES[3]] {
        let predicted = g0 + slope * y;
        let actual = g(y).ok()?;
        if (actual - predicted).abs() > tolerance * scale.max(predicted.abs()) {
            return None;
        }
    }

    let y = -g0 / slope;
    let residual = g(y).ok()?;
    (y.is_finite() && residual.abs() <= tolerance * scale).then_some(y)
}

fn bracketed_root(g: &impl Fn(f64) -> Result<f64, EvalError>, solver: &SolverSettings) -> Option<f64> {
    let steps = solver.scan_steps.max(1);
    let step = (solver.y_max - solver.y_min) / steps as f64;
    let mut prev: Option<(f64, f64)> = None;

    for i in 0..=steps {
        let y = solver.y_max - i as f64 * step;
        let Ok(value) = g(y) else {
            prev = None;
            continue;
        };
        if value == 0.0 {
            return Some(y);
        }
        if let Some((prev_y, prev_value)) = prev {
            if prev_value.signum() != value.signum() {
                if let Some(root) = bisect(g, (y, value), (prev_y, prev_value), solver.max_iterations) {
                    return Some(root);
                }
            }
        }
        prev = Some((y, value));
    }
    None
}

/// Bisect a sign-changing bracket. A bracket around a pole converges to
/// ever larger residuals and is rejected.
fn bisect(
    g: &impl Fn(f64) -> Result<f64, EvalError>,
    (mut lo, mut lo_value): (f64, f64),
    (mut hi, hi_value): (f64, f64),
    iterations: usize,
) -> Option<f64> {
    let bound = lo_value.abs().max(hi_value.abs());
    for _ in 0..iterations {
        let mid = 0.5 * (lo + hi);
        let mid_value = g(mid).ok()?;
        if mid_value == 0.0 {
            return Some(mid);
        }
        if mid_value.signum() == lo_value.signum() {
            lo = mid;
            lo_value = mid_value;
        } else {
            hi = mid;
        }
    }
    let root = 0.5 * (lo + hi);
    let residual = g(root).ok()?;
    (residual.abs() <= bound).then_some(root)
}
