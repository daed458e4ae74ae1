use super::*;
use crate::foundation::error::FlightError;

#[derive(Default)]
struct MockBackend {
    calls: Vec<String>,
    fail_on: Option<&'static str>,
}

impl MockBackend {
    fn record(&mut self, call: String) -> FlightResult<()> {
        let fail = self.fail_on.is_some_and(|f| call.starts_with(f));
        self.calls.push(call);
        if fail {
            return Err(FlightError::frame("injected"));
        }
        Ok(())
    }
}

impl PassBackend for MockBackend {
    fn ensure_surface(&mut self, _id: SurfaceId, _desc: &SurfaceDesc) -> FlightResult<()> {
        self.record("ensure_surface".into())
    }

    fn begin_frame(&mut self, _frame: &FrameState<'_>) -> FlightResult<()> {
        self.record("begin_frame".into())
    }

    fn exec_geometry(&mut self, _pass: &GeometryPass, _frame: &FrameState<'_>) -> FlightResult<()> {
        self.record("exec_geometry".into())
    }

    fn exec_lighting(&mut self, _pass: &LightingPass, _frame: &FrameState<'_>) -> FlightResult<()> {
        self.record("exec_lighting".into())
    }

    fn exec_fx(&mut self, pass: &FxPass, _frame: &FrameState<'_>) -> FlightResult<()> {
        self.record(format!("exec_fx:{}", pass.stage.label()))
    }

    fn readback_rgba8(&mut self, _surface: SurfaceId, desc: &SurfaceDesc) -> FlightResult<FrameRgba> {
        self.record("readback_rgba8".into())?;
        Ok(FrameRgba {
            width: desc.width,
            height: desc.height,
            data: vec![0; (desc.width * desc.height * 4) as usize],
        })
    }

    fn end_frame(&mut self) -> FlightResult<()> {
        self.record("end_frame".into())
    }
}

fn frame_state(params: &SceneParams) -> FrameState<'_> {
    FrameState {
        frame_index: 0,
        time: 0.0,
        resolution: Resolution::new(4, 3).unwrap(),
        view: Mat4::IDENTITY,
        projection: Mat4::IDENTITY,
        inverse_projection: Mat4::IDENTITY,
        eye: Vec3::ZERO,
        marker: Vec3::ZERO,
        params,
    }
}

#[test]
fn execute_plan_calls_in_expected_order() {
    let params = SceneParams::default();
    let frame = frame_state(&params);
    let mut targets = RenderTargetSet::new(frame.resolution);
    let plan = FramePlan::standard(&targets, false).unwrap();

    let mut backend = MockBackend::default();
    let out = execute_plan(&mut backend, &plan, &mut targets, &frame).unwrap();
    assert_eq!(out.width, 4);
    assert_eq!(out.height, 3);

    let surfaces = targets.surfaces().len();
    assert!(backend.calls[..surfaces].iter().all(|c| c == "ensure_surface"));
    assert_eq!(
        &backend.calls[surfaces..],
        [
            "begin_frame",
            "exec_geometry",
            "exec_lighting",
            "exec_fx:blur_vertical",
            "exec_fx:blur_horizontal",
            "exec_fx:coc",
            "exec_fx:dof",
            "exec_fx:gamma",
            "exec_fx:glitch",
            "readback_rgba8",
            "end_frame",
        ]
    );
    assert_eq!(targets.color0(), Some(targets.final_surface()));
}

#[test]
fn failing_pass_still_closes_the_frame() {
    let params = SceneParams::default();
    let frame = frame_state(&params);
    let mut targets = RenderTargetSet::new(frame.resolution);
    let plan = FramePlan::standard(&targets, false).unwrap();

    let mut backend = MockBackend {
        fail_on: Some("exec_fx:coc"),
        ..MockBackend::default()
    };
    let err = execute_plan(&mut backend, &plan, &mut targets, &frame).unwrap_err();
    assert!(!err.is_fatal());
    assert_eq!(backend.calls.last().map(String::as_str), Some("end_frame"));
    assert!(!backend.calls.iter().any(|c| c == "readback_rgba8"));
    assert!(!backend.calls.iter().any(|c| c == "exec_fx:dof"));
}
