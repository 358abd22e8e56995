//! Curve sampling over a domain partition.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{Curve, CurveId, Domain, Point};
use crate::config::PlotSettings;
use crate::equation::{self, Form, NO_REAL_VALUES};
use crate::expression::CompiledFn;

/// `steps + 1` evenly spaced values from `min` to `max` inclusive.
pub fn generate_x_values(min: f64, max: f64, steps: usize) -> Vec<f64> {
    if steps == 0 {
        return vec![min];
    }
    let step = (max - min) / steps as f64;
    (0..=steps).map(|i| min + i as f64 * step).collect()
}

/// Evaluate `func` at each abscissa, skipping points that fail.
/// Surviving points are rounded to 2 decimals.
pub fn sample_points(func: &CompiledFn, x_values: &[f64]) -> Vec<Point> {
    x_values
        .iter()
        .filter_map(|&x| func.eval(x).ok().map(|y| Point::new(x, y).rounded()))
        .collect()
}

/// Sample a compiled function over `domain`.
pub fn sample(id: CurveId, source_text: &str, func: &CompiledFn, domain: &Domain) -> Curve {
    let points = sample_points(func, &domain.abscissas());
    let failed = points.is_empty();
    if failed {
        debug!("Every abscissa failed for '{}'", source_text);
    }
    Curve {
        id,
        source_text: source_text.to_string(),
        points,
        failed,
        failure_reason: failed.then(|| NO_REAL_VALUES.to_string()),
        vertical_at: None,
    }
}

/// Normalize, compile and sample one equation. Parse and compile failures
/// take priority over per-point failures. Implicit equations are solved over
/// at least the domain's span in y.
pub fn plot_equation(id: CurveId, text: &str, domain: &Domain, settings: &PlotSettings) -> Curve {
    let settings = settings.covering(domain.min(), domain.max());
    match equation::parse_equation(text, &settings) {
        Ok((normalized, func)) => {
            let mut curve = sample(id, text, &func, domain);
            if let Form::Vertical { at } = normalized.form {
                curve.vertical_at = at;
            }
            curve
        }
        Err(e) => {
            debug!("Equation '{}' rejected: {}", text, e);
            Curve::failed(id, text, e.user_message())
        }
    }
}

/// Points of one equation over caller-supplied abscissas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquationResult {
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Evaluate equation text over `x_values` with default settings.
pub fn evaluate_equation(text: &str, x_values: &[f64]) -> EquationResult {
    evaluate_equation_with(text, x_values, &PlotSettings::default())
}

pub fn evaluate_equation_with(text: &str, x_values: &[f64], settings: &PlotSettings) -> EquationResult {
    let (min, max) = x_values
        .iter()
        .filter(|x| x.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
    let settings = if min <= max {
        settings.covering(min, max)
    } else {
        settings.clone()
    };

    let func = match equation::parse_equation(text, &settings) {
        Ok((_, func)) => func,
        Err(e) => {
            debug!("Equation '{}' rejected: {}", text, e);
            return EquationResult {
                points: Vec::new(),
                error: Some(e.user_message().to_string()),
            };
        }
    };

    let points = sample_points(&func, x_values);
    // A partial curve is a success; only a curve with no real point at all is reported
    let error = (points.is_empty() && !x_values.is_empty()).then(|| NO_REAL_VALUES.to_string());
    EquationResult { points, error }
}
