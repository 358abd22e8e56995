//! Integration tests for the expression system.

use super::*;
use crate::config::SolverSettings;

#[test]
fn test_caret_and_double_star_agree() {
    let a = CompiledFn::explicit("x^3 - 2x").unwrap();
    let b = CompiledFn::explicit("x**3 - 2*x").unwrap();
    for x in [-2.0, -0.5, 0.0, 1.5, 3.0] {
        assert_eq!(a.eval(x), b.eval(x));
    }
}

#[test]
fn test_implicit_products_match_explicit_ones() {
    let pairs = [
        ("2x + 3", "2 * x + 3"),
        ("3(x + 1)", "3 * (x + 1)"),
        ("x(x - 1)", "x * (x - 1)"),
        ("2pi x", "2 * pi * x"),
        ("(x + 1)(x - 1)", "(x + 1) * (x - 1)"),
        ("2sin(x)", "2 * sin(x)"),
    ];
    for (implicit, explicit) in pairs {
        let a = CompiledFn::explicit(implicit).unwrap();
        let b = CompiledFn::explicit(explicit).unwrap();
        for x in [-1.5, 0.0, 2.0] {
            assert_eq!(a.eval(x), b.eval(x), "{} vs {} at {}", implicit, explicit, x);
        }
    }
}

#[test]
fn test_negative_operands_after_operators() {
    let f = CompiledFn::explicit("2 * -x + x / -2").unwrap();
    assert!((f.eval(2.0).unwrap() + 5.0).abs() < 1e-12);
    let f = CompiledFn::explicit("2^-1").unwrap();
    assert!((f.eval(0.0).unwrap() - 0.5).abs() < 1e-12);
}

#[test]
fn test_per_point_failures_are_independent() {
    let f = CompiledFn::explicit("ln(x)").unwrap();
    assert!(f.eval(-1.0).is_err());
    assert!(f.eval(0.0).is_err());
    assert!(f.eval(1.0).is_ok());
    // Same input, same answer
    assert_eq!(f.eval(2.5), f.eval(2.5));
}

#[test]
fn test_implicit_respects_solver_range() {
    let narrow = SolverSettings {
        y_min: -1.0,
        y_max: 1.0,
        ..SolverSettings::default()
    };
    // Roots at y = ±3 fall outside the scanned range
    let f = CompiledFn::implicit("y^2 - 9", narrow).unwrap();
    assert!(matches!(f.eval(0.0), Err(EvalError::NoRealSolution(_))));

    let f = CompiledFn::implicit("y^2 - 9", SolverSettings::default()).unwrap();
    assert!((f.eval(0.0).unwrap() - 3.0).abs() < 1e-6);
}

#[test]
fn test_implicit_rejects_other_symbols() {
    let result = CompiledFn::implicit("x + z", SolverSettings::default());
    assert_eq!(result, Err(CompileError::UnknownSymbol("z".to_string())));
}

#[test]
fn test_syntax_error_reports_position() {
    match CompiledFn::explicit("x + # 2") {
        Err(CompileError::Syntax(e)) => assert_eq!(e.position, 4),
        other => panic!("Expected syntax error, got {:?}", other),
    }
}
