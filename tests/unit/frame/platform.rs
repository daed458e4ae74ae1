use super::*;

#[test]
fn clock_steps_by_frame_period_then_requests_close() {
    let mut clock = FixedStepClock::new(4.0, 1.0, 3).unwrap();
    let times: Vec<f64> = (0..3).map(|_| clock.tick()).map(|i| i.time).collect();
    assert_eq!(times, vec![1.0, 1.25, 1.5]);

    let last = clock.tick();
    assert!(last.close_requested);
    assert_eq!(clock.emitted(), 3);
    assert!(clock.tick().close_requested);
}

#[test]
fn clock_inputs_carry_no_pointer_activity() {
    let mut clock = FixedStepClock::new(30.0, 0.0, 1).unwrap();
    let input = clock.tick();
    assert!(!input.close_requested);
    assert_eq!(input.pointer, PointerState::default());
}

#[test]
fn zero_fps_is_rejected() {
    assert!(matches!(
        FixedStepClock::new(0.0, 0.0, 1),
        Err(FlightError::InvalidArgument(_))
    ));
}
