//! 几何分析与复杂度评分的性质测试

use approx::assert_relative_eq;
use proptest::prelude::*;
use sheetquote_analysis::{Complexity, CuttingComplexityScorer, GeometryAnalyzer, SegmentKind};
use sheetquote_core::entity::Entity;
use sheetquote_core::geometry::{Arc, Circle, Geometry, Polyline, PolylineVertex};
use sheetquote_core::math::Point2;
use std::f64::consts::PI;

fn rectangle(x: f64, y: f64, w: f64, h: f64, clockwise: bool) -> Entity {
    let mut points = vec![
        Point2::new(x, y),
        Point2::new(x + w, y),
        Point2::new(x + w, y + h),
        Point2::new(x, y + h),
    ];
    if clockwise {
        points.reverse();
    }
    Entity::new(Geometry::Polyline(Polyline::from_points(points, true)))
}

fn hole(x: f64, y: f64, diameter: f64) -> Entity {
    Entity::new(Geometry::Circle(Circle::new(Point2::new(x, y), diameter / 2.0)))
}

proptest! {
    #[test]
    fn rectangle_area_and_perimeter_independent_of_winding(
        w in 0.01f64..500.0,
        h in 0.01f64..500.0,
        x in -100.0f64..100.0,
        y in -100.0f64..100.0,
        clockwise in any::<bool>(),
    ) {
        let analysis = GeometryAnalyzer::default().analyze(&[rectangle(x, y, w, h, clockwise)]);
        prop_assert!((analysis.area - w * h).abs() <= 1e-9 * (1.0 + w * h + (x.abs() + y.abs()) * (w + h)));
        prop_assert!((analysis.perimeter - 2.0 * (w + h)).abs() <= 1e-9 * (1.0 + w + h));
    }

    #[test]
    fn circle_contributes_exactly_one_hole(d in 0.001f64..50.0, x in -50.0f64..50.0, y in -50.0f64..50.0) {
        let analysis = GeometryAnalyzer::default().analyze(&[hole(x, y, d)]);
        prop_assert_eq!(analysis.holes.len(), 1);
        prop_assert!((analysis.holes[0].diameter - d).abs() < 1e-12);
        prop_assert!((analysis.cut_length - PI * d).abs() < 1e-9 * (1.0 + d));
    }

    #[test]
    fn analysis_is_idempotent(
        w in 0.1f64..100.0,
        h in 0.1f64..100.0,
        holes in prop::collection::vec((0.0f64..1.0, 0.0f64..1.0, 0.01f64..0.5), 0..12),
    ) {
        let mut entities = vec![rectangle(0.0, 0.0, w, h, false)];
        entities.extend(holes.iter().map(|&(fx, fy, d)| hole(fx * w, fy * h, d)));

        let analyzer = GeometryAnalyzer::default();
        let first = analyzer.analyze(&entities);
        let second = analyzer.analyze(&entities);
        prop_assert_eq!(first.area.to_bits(), second.area.to_bits());
        prop_assert_eq!(first.cut_length.to_bits(), second.cut_length.to_bits());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn arc_radius_decides_tight_corner(radius in 0.001f64..5.0) {
        let arc = Entity::new(Geometry::Arc(Arc::new(Point2::origin(), radius, 0.0, PI)));
        let analysis = CuttingComplexityScorer::default().score(&[arc], &Default::default());
        let expected = if radius < 0.25 { SegmentKind::TightCorner } else { SegmentKind::Curved };
        prop_assert_eq!(analysis.segments[0].kind, expected);
    }
}

#[test]
fn closure_tolerance_boundary() {
    let polyline = |gap: f64| {
        Entity::new(Geometry::Polyline(Polyline::new(
            vec![
                PolylineVertex::new(Point2::new(0.0, 0.0)),
                PolylineVertex::new(Point2::new(5.0, 0.0)),
                PolylineVertex::new(Point2::new(5.0, 5.0)),
                PolylineVertex::new(Point2::new(0.0, 5.0)),
                PolylineVertex::new(Point2::new(gap, 0.0)),
            ],
            false,
        )))
    };

    let closed = GeometryAnalyzer::default().analyze(&[polyline(0.0009)]);
    assert!(closed.area > 24.9);

    let open = GeometryAnalyzer::default().analyze(&[polyline(0.0011)]);
    assert_eq!(open.area, 0.0);
}

#[test]
fn hole_count_monotonicity() {
    let plate = rectangle(0.0, 0.0, 40.0, 40.0, false);
    let with_holes = |n: usize| {
        let mut entities = vec![plate.clone()];
        entities.extend((0..n).map(|i| hole(4.0 + i as f64 * 3.0, 20.0, 0.5)));
        GeometryAnalyzer::default().analyze(&entities)
    };

    let five = with_holes(5);
    let six = with_holes(6);
    assert!(six.complexity_score >= five.complexity_score);
    assert_eq!(six.complexity_score, five.complexity_score + 1);

    let eleven = with_holes(11);
    assert_eq!(eleven.complexity_score, 2);
    assert_eq!(eleven.complexity, Complexity::Moderate);
}

#[test]
fn analysis_serializes_camel_case() {
    let analysis = GeometryAnalyzer::default().analyze(&[rectangle(0.0, 0.0, 2.0, 3.0, false)]);
    let json = serde_json::to_value(&analysis).unwrap();
    assert!(json.get("cutLength").is_some());
    assert!(json.get("bendLines").is_some());
    assert_eq!(json["confidence"], "high");
    assert_eq!(json["complexity"], "simple");
    assert_relative_eq!(json["area"].as_f64().unwrap(), 6.0, epsilon = 1e-12);
}
