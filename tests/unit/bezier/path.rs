use super::*;

fn spec(seed: u64) -> LoopSpec {
    LoopSpec {
        bounding_size: 500.0,
        point_count: 29,
        min_separation: 200.0,
        height_range: (1.0, 16.0),
        seed,
    }
}

#[test]
fn generated_loop_is_closed_and_anchored() {
    let lp = generate_loop(&spec(42)).unwrap();
    let pts = lp.points();
    assert_eq!(pts.len(), 33);
    assert_eq!(pts.first(), pts.last());
    assert_eq!(&pts[..3], &ANCHORS);
}

#[test]
fn procedural_points_respect_min_separation_from_predecessor() {
    for seed in [0u64, 1, 7, 1234, u64::MAX] {
        let s = spec(seed);
        let lp = generate_loop(&s).unwrap();
        let pts = lp.points();
        // anchors and the closing point are fixed; procedural points sit in between
        for i in ANCHORS.len()..pts.len() - 1 {
            let d = pts[i].distance(pts[i - 1]);
            assert!(d >= s.min_separation, "seed {seed} point {i}: {d}");
        }
    }
}

#[test]
fn procedural_points_stay_inside_footprint() {
    let s = spec(99);
    let lp = generate_loop(&s).unwrap();
    let half = s.bounding_size / 2.0;
    for p in &lp.points()[ANCHORS.len()..lp.len() - 1] {
        assert!(p.x >= -half && p.x < half, "{p}");
        assert!(p.z >= -half && p.z < half, "{p}");
        assert!(p.y >= 1.0 && p.y <= 16.0, "{p}");
    }
}

#[test]
fn same_seed_same_loop() {
    assert_eq!(generate_loop(&spec(5)).unwrap(), generate_loop(&spec(5)).unwrap());
    assert_ne!(generate_loop(&spec(5)).unwrap(), generate_loop(&spec(6)).unwrap());
}

#[test]
fn zero_procedural_points_closes_the_anchors() {
    let mut s = spec(1);
    s.point_count = 0;
    let lp = generate_loop(&s).unwrap();
    assert_eq!(lp.points(), &[ANCHORS[0], ANCHORS[1], ANCHORS[2], ANCHORS[0]]);

    let curve = BezierCurve::new();
    let path = lp.smooth(&curve, 99).unwrap();
    assert_eq!(path.len(), 99);
    assert_eq!(path[0], Vec3::new(-100.0, 100.0, -100.0));
    assert_eq!(path[98], path[0]);
}

#[test]
fn oversized_loop_is_a_domain_error() {
    let mut s = spec(1);
    s.point_count = 30;
    assert!(matches!(generate_loop(&s), Err(FlightError::Domain(_))));
}

#[test]
fn unreachable_separation_is_rejected_up_front() {
    let mut s = spec(1);
    s.bounding_size = 100.0;
    s.min_separation = 200.0;
    assert!(matches!(
        generate_loop(&s),
        Err(FlightError::InvalidArgument(_))
    ));
}

#[test]
fn separation_beyond_half_diagonal_is_rejected() {
    // Reachable only from an off-center predecessor; the center anchor comes first.
    let mut s = spec(1);
    s.bounding_size = 100.0;
    s.min_separation = 120.0;
    assert!(matches!(
        generate_loop(&s),
        Err(FlightError::InvalidArgument(_))
    ));

    s.min_separation = 60.0;
    let lp = generate_loop(&s).unwrap();
    assert_eq!(lp.len(), ANCHORS.len() + s.point_count + 1);
}

#[test]
fn subnormal_bounding_size_is_rejected() {
    let mut s = spec(1);
    s.bounding_size = 1e-45;
    s.min_separation = 0.0;
    assert!(matches!(
        generate_loop(&s),
        Err(FlightError::InvalidArgument(_))
    ));
}

#[test]
fn full_loop_smooths_into_closed_trajectory() {
    let lp = generate_loop(&spec(3)).unwrap();
    let curve = BezierCurve::new();
    let path = lp.smooth(&curve, curve.factorial_max() * 50).unwrap();
    assert_eq!(path.len(), 1650);
    assert_eq!(path[0], *path.last().unwrap());
    assert!(path.iter().all(|p| p.is_finite()));
}

#[test]
fn closed_rejects_empty_input() {
    assert!(ControlPointLoop::closed(Vec::new()).is_err());
}
