use super::*;

#[test]
fn fnv_hash_is_independent_of_write_splits() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"gridflight");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"grid");
    b.write_bytes(b"flight");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn mix_seed_depends_on_every_word() {
    let base = mix_seed(&[7, 3, 0]);
    assert_eq!(base, mix_seed(&[7, 3, 0]));
    assert_ne!(base, mix_seed(&[7, 3, 1]));
    assert_ne!(base, mix_seed(&[7, 4, 0]));
    assert_ne!(base, mix_seed(&[8, 3, 0]));
}

#[test]
fn signed_angle_follows_reference_orientation() {
    let a = Vec3::Y;
    let b = Vec3::Z;
    let quarter = std::f32::consts::FRAC_PI_2;
    // Y x Z = +X
    assert!((signed_angle(a, b, Vec3::X) - quarter).abs() < 1e-6);
    assert!((signed_angle(a, b, -Vec3::X) + quarter).abs() < 1e-6);
}

#[test]
fn signed_angle_of_degenerate_vectors_is_zero() {
    assert_eq!(signed_angle(Vec3::ZERO, Vec3::X, Vec3::X), 0.0);
    assert_eq!(signed_angle(Vec3::Y, Vec3::ZERO, Vec3::X), 0.0);
}

#[test]
fn signed_angle_of_parallel_vectors_is_finite() {
    let v = Vec3::new(1.0, 2.0, 3.0);
    let angle = signed_angle(v, v * 3.0, Vec3::X);
    assert!(angle.is_finite());
    assert!(angle.abs() < 1e-3);
}

#[test]
fn wrap_index_handles_negative_values() {
    assert_eq!(wrap_index(-1, 10), 9);
    assert_eq!(wrap_index(-10, 10), 0);
    assert_eq!(wrap_index(23, 10), 3);
}
