use super::*;

fn dir(c: &OrbitCamera) -> Vec3 {
    (c.pivot() - c.eye()).normalize()
}

#[test]
fn default_eye_sits_radius_away_from_pivot() {
    let c = OrbitCamera::default();
    assert!((c.eye().distance(c.pivot()) - DEFAULT_RADIUS).abs() < 1e-4);
    assert_eq!(c.up(), Vec3::Y);
}

#[test]
fn zoom_scales_radius_multiplicatively() {
    let mut c = OrbitCamera::default();
    c.zoom(0.5);
    assert!((c.radius() - 15.0).abs() < 1e-5);
    c.zoom(-0.2);
    assert!((c.radius() - 12.0).abs() < 1e-5);
}

#[test]
fn zoom_below_minimum_resets_radius_and_keeps_direction() {
    let mut c = OrbitCamera::new(1.0, 0.7, 1.1, Vec3::new(3.0, -2.0, 5.0));
    let before_dir = dir(&c);
    let before_eye = c.eye();
    let before_pivot = c.pivot();

    c.zoom(-0.95);

    assert_eq!(c.radius(), DEFAULT_RADIUS);
    assert!((dir(&c) - before_dir).length() < 1e-4);
    assert!(c.eye().distance(before_eye) < 1e-3);
    // pivot was pushed forward along the old view direction
    let moved = c.pivot() - before_pivot;
    assert!(moved.dot(before_dir) > 0.0);
}

#[test]
fn turn_keeps_phi_inside_open_interval() {
    let mut c = OrbitCamera::default();
    for _ in 0..10_000 {
        c.turn(0.37, 0.11);
        assert!(c.phi() > 0.0 && c.phi() < TWO_PI, "{}", c.phi());
    }
    for _ in 0..10_000 {
        c.turn(-0.53, -0.07);
        assert!(c.phi() > 0.0 && c.phi() < TWO_PI, "{}", c.phi());
    }
}

#[test]
fn turn_wraps_at_both_poles() {
    let mut c = OrbitCamera::new(10.0, 0.0, 0.05, Vec3::ZERO);
    c.turn(0.1, 0.0);
    assert!((c.phi() - (TWO_PI - PHI_POLE_MARGIN)).abs() < 1e-6);

    let mut c = OrbitCamera::new(10.0, 0.0, TWO_PI - 0.15, Vec3::ZERO);
    c.turn(-0.1, 0.0);
    assert_eq!(c.phi(), PHI_WRAP_LOW);
}

#[test]
fn up_flips_past_pi() {
    let mut c = OrbitCamera::new(10.0, 0.0, PI - 0.01, Vec3::ZERO);
    assert_eq!(c.up(), Vec3::Y);
    c.turn(-0.02, 0.0);
    assert_eq!(c.up(), Vec3::NEG_Y);
}

#[test]
fn pan_moves_pivot_in_view_plane() {
    let mut c = OrbitCamera::default();
    let forward = dir(&c);
    let before = c.pivot();
    c.pan(0.01, -0.02);
    let moved = c.pivot() - before;
    assert!(moved.length() > 0.0);
    assert!(moved.dot(forward).abs() < 1e-4);
    // pan keeps the orbit shape
    assert!((c.eye().distance(c.pivot()) - c.radius()).abs() < 1e-4);
}

#[test]
fn eye_is_always_derived() {
    let mut c = OrbitCamera::default();
    c.turn(0.3, 0.9);
    c.pan(0.2, 0.1);
    c.zoom(0.25);
    let (st, ct) = c.theta().sin_cos();
    let (sp, cp) = c.phi().sin_cos();
    let expect = Vec3::new(ct * sp, cp, st * sp) * c.radius() + c.pivot();
    assert!((c.eye() - expect).length() < 1e-5);
}
