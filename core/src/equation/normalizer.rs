//! Rewrites free-form equation text into an expression of `x`.
//!
//! Rules, first match wins:
//! 1. `y = f(x)` keeps `f(x)`.
//! 2. `x = c` becomes a steep surrogate `K * (x - c)`.
//! 3. `f(x) = y` keeps `f(x)`.
//! 4. An equation without `y` on either side becomes `K * (left - (right))`.
//! 5. Any other equation becomes the implicit form `left - (right) = 0`.
//! 6. Text without `=` is taken as `f(x)`.
//!
//! The surrogate is numerically near-vertical, not a true vertical line.

use crate::expression::{evaluate_constant, CompiledFn, EvalError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Empty equation")]
    Empty,
    #[error("Equation has an empty side")]
    EmptySide,
    #[error("Equation contains more than one '='")]
    MultipleEquals,
    #[error("'{text}' is not a constant: {source}")]
    NonConstant {
        text: String,
        #[source]
        source: EvalError,
    },
}

/// How the normalized text relates to the curve `y = f(x)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Form {
    /// The text is `f(x)`
    Explicit,
    /// The text is a steep surrogate for a vertical line, at `at` when known
    Vertical { at: Option<f64> },
    /// The text is `g(x, y)`, to be solved for `g = 0`
    Implicit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedExpr {
    pub text: String,
    pub form: Form,
}

impl NormalizedExpr {
    fn explicit_or_implicit(text: &str) -> Self {
        if text.contains('y') {
            Self {
                text: format!("y - ({})", text),
                form: Form::Implicit,
            }
        } else {
            Self {
                text: text.to_string(),
                form: Form::Explicit,
            }
        }
    }
}

/// Normalize with the default surrogate slope.
pub fn normalize(raw: &str) -> Result<NormalizedExpr, ParseError> {
    normalize_with(raw, crate::config::VERTICAL_SLOPE)
}

pub fn normalize_with(raw: &str, vertical_slope: f64) -> Result<NormalizedExpr, ParseError> {
    let cleaned = raw.trim().to_lowercase();
    if cleaned.is_empty() {
        return Err(ParseError::Empty);
    }

    if let Some(rest) = cleaned.strip_prefix("y =").or_else(|| cleaned.strip_prefix("y=")) {
        let rest = rest.trim();
        if rest.is_empty() {
            return Err(ParseError::EmptySide);
        }
        if rest.contains('=') {
            return Err(ParseError::MultipleEquals);
        }
        return Ok(NormalizedExpr::explicit_or_implicit(rest));
    }

    let Some((left, right)) = cleaned.split_once('=') else {
        return Ok(NormalizedExpr::explicit_or_implicit(&cleaned));
    };
    if right.contains('=') {
        return Err(ParseError::MultipleEquals);
    }

    let (left, right) = (left.trim(), right.trim());
    if left.is_empty() || right.is_empty() {
        return Err(ParseError::EmptySide);
    }

    if left == "x" {
        let value = evaluate_constant(right).map_err(|source| ParseError::NonConstant {
            text: right.to_string(),
            source,
        })?;
        return Ok(NormalizedExpr {
            text: format!("{} * (x - ({}))", vertical_slope, value),
            form: Form::Vertical { at: Some(value) },
        });
    }

    if right == "y" {
        return Ok(NormalizedExpr::explicit_or_implicit(left));
    }

    let difference = format!("{} - ({})", left, right);

    if !left.contains('y') && !right.contains('y') {
        return Ok(NormalizedExpr {
            text: format!("{} * ({})", vertical_slope, difference),
            form: Form::Vertical {
                at: affine_zero(&difference),
            },
        });
    }

    Ok(NormalizedExpr {
        text: difference,
        form: Form::Implicit,
    })
}

/// Where an expression affine in `x` crosses zero, e.g. `2x - (6)` at 3.
fn affine_zero(text: &str) -> Option<f64> {
    let f = CompiledFn::explicit(text).ok()?;
    let f0 = f.eval(0.0).ok()?;
    let f1 = f.eval(1.0).ok()?;
    let slope = f1 - f0;
    if slope == 0.0 {
        return None;
    }
    let at = -f0 / slope;
    let residual = f.eval(at).ok()?;
    (residual.abs() <= 1e-9 * f0.abs().max(f1.abs()).max(1.0)).then_some(at)
}

#[cfg(test)]
mod normalizer_tests {
    use super::*;

    fn explicit(text: &str) -> NormalizedExpr {
        NormalizedExpr {
            text: text.to_string(),
            form: Form::Explicit,
        }
    }

    #[test]
    fn test_y_prefix_is_stripped() {
        assert_eq!(normalize("y = 2x + 3").unwrap(), explicit("2x + 3"));
        assert_eq!(normalize("y=2x+3").unwrap(), explicit("2x+3"));
    }

    #[test]
    fn test_case_and_edges_are_ignored() {
        assert_eq!(normalize("  Y = SIN(X)  ").unwrap(), explicit("sin(x)"));
    }

    #[test]
    fn test_y_on_the_right() {
        assert_eq!(normalize("2x + 3 = y").unwrap(), explicit("2x + 3"));
    }

    #[test]
    fn test_plain_expression() {
        assert_eq!(normalize("x^2").unwrap(), explicit("x^2"));
    }

    #[test]
    fn test_vertical_line() {
        let n = normalize("x = 5").unwrap();
        assert_eq!(n.text, "1000000 * (x - (5))");
        assert_eq!(n.form, Form::Vertical { at: Some(5.0) });
    }

    #[test]
    fn test_vertical_line_with_constant_expression() {
        let n = normalize("x = 10 / 4").unwrap();
        assert_eq!(n.form, Form::Vertical { at: Some(2.5) });
    }

    #[test]
    fn test_vertical_line_non_constant() {
        let err = normalize("x = y + 1").unwrap_err();
        assert!(matches!(err, ParseError::NonConstant { .. }));
        assert!(matches!(normalize("x = abc"), Err(ParseError::NonConstant { .. })));
    }

    #[test]
    fn test_equation_without_y_is_vertical_family() {
        let n = normalize("2x = 6").unwrap();
        assert_eq!(n.text, "1000000 * (2x - (6))");
        match n.form {
            Form::Vertical { at: Some(at) } => assert!((at - 3.0).abs() < 1e-12),
            other => panic!("Expected located vertical form, got {:?}", other),
        }
    }

    #[test]
    fn test_non_affine_vertical_family_has_no_position() {
        let n = normalize("x^2 = 4").unwrap();
        assert_eq!(n.form, Form::Vertical { at: None });
    }

    #[test]
    fn test_general_equation_is_implicit() {
        let n = normalize("x + y = 4").unwrap();
        assert_eq!(n.text, "x + y - (4)");
        assert_eq!(n.form, Form::Implicit);
    }

    #[test]
    fn test_y_in_explicit_side_becomes_implicit() {
        let n = normalize("y = 2y + 1").unwrap();
        assert_eq!(n.text, "y - (2y + 1)");
        assert_eq!(n.form, Form::Implicit);
    }

    #[test]
    fn test_errors() {
        assert_eq!(normalize("   "), Err(ParseError::Empty));
        assert_eq!(normalize("y ="), Err(ParseError::EmptySide));
        assert_eq!(normalize("= 4"), Err(ParseError::EmptySide));
        assert_eq!(normalize("x = 1 = 2"), Err(ParseError::MultipleEquals));
        assert_eq!(normalize("y = x = 2"), Err(ParseError::MultipleEquals));
    }
}
