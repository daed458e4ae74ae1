use super::*;

fn ring(n: usize) -> Vec<Vec3> {
    (0..n)
        .map(|i| {
            let a = i as f32 / n as f32 * std::f32::consts::TAU;
            Vec3::new(a.cos() * 100.0, 5.0, a.sin() * 100.0)
        })
        .collect()
}

fn follower(n: usize) -> PathFollower {
    PathFollower::new(ring(n), FollowTiming::default()).unwrap()
}

#[test]
fn index_advances_at_the_playback_rate() {
    let f = follower(1000);
    assert_eq!(f.index_at(0.0), 0);
    assert_eq!(f.index_at(1.0), 40);
    assert_eq!(f.index_at(1.024), 40);
    assert_eq!(f.index_at(1.03), 41);
}

#[test]
fn index_wraps_modulo_sample_count() {
    let f = follower(100);
    assert_eq!(f.index_at(2.5), 0);
    assert_eq!(f.index_at(2.5625), 2);
}

#[test]
fn negative_time_stays_in_range() {
    let f = follower(100);
    assert_eq!(f.index_at(-0.1), 96);
    let pose = f.pose_at(0.0);
    assert_eq!(pose.previous, f.trajectory()[96]);
}

#[test]
fn pose_samples_eye_target_and_marker() {
    let f = follower(1000);
    let pose = f.pose_at(2.0);
    assert_eq!(pose.index, 80);
    assert_eq!(pose.eye, f.trajectory()[80]);
    assert_eq!(pose.marker, f.trajectory()[120]);
    assert_eq!(pose.target, f.trajectory()[100]);
    assert_eq!(pose.previous, f.trajectory()[76]);
}

#[test]
fn target_stays_ahead_across_the_seam() {
    let f = follower(100);
    // eye near the end, marker wrapped to the start
    let pose = f.pose_at(2.4);
    assert_eq!(pose.index, 96);
    assert_eq!(pose.marker, f.trajectory()[36]);
    assert_eq!(pose.target, f.trajectory()[16]);
    // the look direction stays within a quarter turn of the path direction
    let along = f.trajectory()[97] - f.trajectory()[96];
    assert!((pose.target - pose.eye).dot(along) > 0.0);
}

#[test]
fn banking_is_level_on_a_straight_path() {
    let up = banked_up(Vec3::new(10.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0), Vec3::ZERO);
    assert!((up - Vec3::Y).length() < 1e-3);
}

#[test]
fn banking_rolls_on_a_curve_and_stays_unit_length() {
    let f = follower(400);
    for step in 0..40 {
        let pose = f.pose_at(step as f64 * 0.25);
        assert!(pose.up.is_finite());
        assert!((pose.up.length() - 1.0).abs() < 1e-4);
        assert!(pose.up.y >= 0.0);
    }
}

#[test]
fn degenerate_trajectory_segments_do_not_produce_nan() {
    let f = PathFollower::new(vec![Vec3::ONE; 10], FollowTiming::default()).unwrap();
    let pose = f.pose_at(0.3);
    assert_eq!(pose.up, Vec3::Y);
}

#[test]
fn follower_rejects_short_trajectories() {
    assert!(PathFollower::new(vec![Vec3::ZERO], FollowTiming::default()).is_err());
}
