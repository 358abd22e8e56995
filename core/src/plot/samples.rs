//! Example equations offered to new users.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleEquation {
    pub equation: &'static str,
    pub name: &'static str,
}

pub const SAMPLE_EQUATIONS: &[SampleEquation] = &[
    SampleEquation { equation: "2*x + 3", name: "Linear (y = 2x + 3)" },
    SampleEquation { equation: "x^2", name: "Quadratic (y = x²)" },
    SampleEquation { equation: "sin(x)", name: "Sine (y = sin(x))" },
    SampleEquation { equation: "x^3 - 2*x", name: "Cubic (y = x³ - 2x)" },
    SampleEquation { equation: "sqrt(abs(x))", name: "Square Root (y = √|x|)" },
    SampleEquation { equation: "x = 5", name: "Vertical Line (x = 5)" },
    SampleEquation { equation: "y = 3", name: "Horizontal Line (y = 3)" },
    SampleEquation { equation: "x + y = 4", name: "Line (x + y = 4)" },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotSettings;
    use crate::plot::{plot_equation, CurveId, Domain};

    #[test]
    fn test_every_sample_plots() {
        for sample in SAMPLE_EQUATIONS {
            let curve = plot_equation(CurveId::new(), sample.equation, &Domain::default(), &PlotSettings::default());
            assert!(!curve.failed, "{} failed: {:?}", sample.name, curve.failure_reason);
            assert_eq!(curve.points.len(), 201, "{} has gaps", sample.name);
        }
    }
}
