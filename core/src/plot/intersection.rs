//! Intersections between sampled curves.
//!
//! Every segment of one curve is tested against every segment of the other,
//! O(N·M) per pair. Fine for a handful of curves with a few hundred points.

use super::types::{round2, Curve, IntersectionPoint, Point};
use crate::config::DEDUP_TOLERANCE;

/// Intersection point of segments `p1-p2` and `p3-p4`, if any.
///
/// Uses parametric line representation: P = P1 + t*(P2-P1), t in [0,1].
/// Endpoint touches count. Parallel and collinear segments never intersect.
pub fn segment_intersection(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
    let d1x = p2.x - p1.x;
    let d1y = p2.y - p1.y;
    let d2x = p4.x - p3.x;
    let d2y = p4.y - p3.y;

    // Cross product of direction vectors (2D determinant)
    let cross = d1x * d2y - d1y * d2x;
    if cross == 0.0 {
        return None;
    }

    // Vector from segment 1 start to segment 2 start
    let dx = p3.x - p1.x;
    let dy = p3.y - p1.y;

    let t = (dx * d2y - dy * d2x) / cross;
    let s = (dx * d1y - dy * d1x) / cross;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&s) {
        Some(Point::new(p1.x + t * d1x, p1.y + t * d1y))
    } else {
        None
    }
}

/// Intersections of two curves with the default dedup tolerance.
pub fn intersect(a: &Curve, b: &Curve) -> Vec<IntersectionPoint> {
    intersect_with_tolerance(a, b, DEDUP_TOLERANCE)
}

/// Intersections of two curves, rounded to 2 decimals. A candidate within
/// `tolerance` of an accepted point on both axes is dropped.
pub fn intersect_with_tolerance(a: &Curve, b: &Curve, tolerance: f64) -> Vec<IntersectionPoint> {
    if !a.can_intersect() || !b.can_intersect() {
        return Vec::new();
    }

    let mut found: Vec<Point> = Vec::new();
    for seg_a in a.points.windows(2) {
        for seg_b in b.points.windows(2) {
            let Some(hit) = segment_intersection(seg_a[0], seg_a[1], seg_b[0], seg_b[1]) else {
                continue;
            };
            let hit = Point::new(round2(hit.x), round2(hit.y));
            if !found.iter().any(|p| p.near(&hit, tolerance)) {
                found.push(hit);
            }
        }
    }

    found
        .into_iter()
        .map(|point| IntersectionPoint {
            point,
            curves: (a.id, b.id),
        })
        .collect()
}

/// Intersection coordinates only.
pub fn find_intersections(a: &Curve, b: &Curve) -> Vec<Point> {
    intersect(a, b).into_iter().map(|ip| ip.point).collect()
}

/// Intersections over every unordered pair of curves, concatenated in pair
/// order. Points are not deduplicated across pairs.
pub fn intersect_all(curves: &[Curve], tolerance: f64) -> Vec<IntersectionPoint> {
    let mut all = Vec::new();
    for (i, a) in curves.iter().enumerate() {
        for b in &curves[i + 1..] {
            all.extend(intersect_with_tolerance(a, b, tolerance));
        }
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::CurveId;

    fn curve(seed: &str, points: &[(f64, f64)]) -> Curve {
        Curve {
            id: CurveId::new_deterministic(seed),
            source_text: seed.to_string(),
            points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            failed: false,
            failure_reason: None,
            vertical_at: None,
        }
    }

    #[test]
    fn test_segment_intersection_basic() {
        // X from (0,0)-(10,10) and (0,10)-(10,0)
        let p = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        )
        .unwrap();
        assert!((p.x - 5.0).abs() < 1e-6);
        assert!((p.y - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_segment_parallel() {
        let p = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 5.0),
            Point::new(10.0, 5.0),
        );
        assert!(p.is_none());
    }

    #[test]
    fn test_segment_collinear_overlap_is_not_reported() {
        let p = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(1.0, 1.0),
            Point::new(3.0, 3.0),
        );
        assert!(p.is_none());
    }

    #[test]
    fn test_segment_outside() {
        // Lines would intersect if extended, but not within segments
        let p = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(10.0, -5.0),
        );
        assert!(p.is_none());
    }

    #[test]
    fn test_segment_endpoint_touch_counts() {
        let p = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
        );
        assert_eq!(p, Some(Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_shared_vertex_reported_once() {
        // Both curves pass through (1, 1); four segment pairs touch there
        let a = curve("a", &[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        let b = curve("b", &[(0.0, 2.0), (1.0, 1.0), (2.0, 0.0)]);
        let hits = intersect(&a, &b);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].point, Point::new(1.0, 1.0));
        assert_eq!(hits[0].curves, (a.id, b.id));
    }

    #[test]
    fn test_result_is_rounded() {
        let a = curve("a", &[(0.0, 0.0), (3.0, 1.0)]);
        let b = curve("b", &[(0.0, 1.0), (3.0, 0.0)]);
        assert_eq!(find_intersections(&a, &b), vec![Point::new(1.5, 0.5)]);

        let c = curve("c", &[(0.0, 0.0), (1.0, 3.0)]);
        let d = curve("d", &[(0.0, 1.0), (1.0, 0.0)]);
        assert_eq!(find_intersections(&c, &d), vec![Point::new(0.25, 0.75)]);
    }

    #[test]
    fn test_failed_or_short_curves_are_skipped() {
        let good = curve("good", &[(0.0, 0.0), (2.0, 2.0)]);
        let single = curve("single", &[(1.0, 1.0)]);
        let failed = Curve::failed(CurveId::new(), "???", "Invalid equation.");
        assert!(intersect(&good, &single).is_empty());
        assert!(intersect(&failed, &good).is_empty());
    }

    #[test]
    fn test_intersect_all_is_pairwise() {
        let a = curve("a", &[(0.0, 0.0), (2.0, 2.0)]);
        let b = curve("b", &[(0.0, 2.0), (2.0, 0.0)]);
        let c = curve("c", &[(0.0, 1.0), (2.0, 1.0)]);
        let all = intersect_all(&[a.clone(), b.clone(), c.clone()], DEDUP_TOLERANCE);
        // All three cross at (1, 1); each pair reports it
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|ip| ip.point == Point::new(1.0, 1.0)));
        assert_eq!(all[0].curves, (a.id, b.id));
        assert_eq!(all[1].curves, (a.id, c.id));
        assert_eq!(all[2].curves, (b.id, c.id));
    }
}
