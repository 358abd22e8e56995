use graph_core::config::{PlotSettings, DEDUP_TOLERANCE};
use graph_core::plot::{evaluate_equation, generate_x_values, intersect, plot_equation, CurveId, Domain};
use proptest::prelude::*;

proptest! {
    #[test]
    fn x_values_partition_the_range(min in -100.0f64..100.0, width in 0.1f64..50.0, steps in 1usize..500) {
        let max = min + width;
        let xs = generate_x_values(min, max, steps);
        prop_assert_eq!(xs.len(), steps + 1);
        prop_assert_eq!(xs[0], min);
        prop_assert!((xs[steps] - max).abs() < 1e-9 * max.abs().max(1.0));
        prop_assert!(xs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn sampled_abscissas_strictly_increase(
        min in -1000.0f64..1000.0,
        width in 0.02f64..2000.0,
        count in 2usize..3000,
    ) {
        let Ok(domain) = Domain::new(min, min + width, count) else {
            return Ok(());
        };
        let settings = PlotSettings::default();
        for text in ["x", "sin(x) + x / 3", "x + y = 4"] {
            let curve = plot_equation(CurveId::new(), text, &domain, &settings);
            prop_assert!(!curve.failed);
            prop_assert_eq!(curve.points.len(), count + 1);
            prop_assert!(curve.points.windows(2).all(|w| w[0].x < w[1].x), "{} over {:?}", text, domain);
        }
    }

    #[test]
    fn sampling_is_idempotent(a in -5i32..5, b in -5i32..5, c in -5i32..5) {
        let text = format!("{}x^2 + {}x + {}", a, b, c);
        let xs = generate_x_values(-10.0, 10.0, 200);
        prop_assert_eq!(evaluate_equation(&text, &xs), evaluate_equation(&text, &xs));
    }

    #[test]
    fn intersections_are_unique(a in -3i32..3, b in -5i32..5, m in -4i32..4, k in -5i32..5) {
        let settings = PlotSettings::default();
        let domain = Domain::default();
        let parabola = plot_equation(CurveId::new(), &format!("{}x^2 + {}", a, b), &domain, &settings);
        let line = plot_equation(CurveId::new(), &format!("{}x + {}", m, k), &domain, &settings);
        let hits = intersect(&parabola, &line);
        // Two distinct roots of a quadratic at most
        prop_assert!(hits.len() <= 2 || a == 0);
        for (i, p) in hits.iter().enumerate() {
            for q in &hits[i + 1..] {
                prop_assert!(!p.point.near(&q.point, DEDUP_TOLERANCE));
            }
        }
    }
}
