use crate::{
    camera::controls::PointerState,
    foundation::{
        core::{FrameRgba, Resolution},
        error::{FlightError, FlightResult},
    },
};

/// Per-frame snapshot taken from the platform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Seconds since the session started.
    pub time: f64,
    /// Pointer buttons, position and modifier.
    pub pointer: PointerState,
    /// The user asked to close; checked once per frame boundary.
    pub close_requested: bool,
}

/// Windowing collaborator driving the frame loop.
pub trait Platform {
    /// Output resolution, fixed for the session.
    fn resolution(&self) -> Resolution;

    /// Input for the next frame.
    fn poll(&mut self) -> FrameInput;

    /// Show a finished frame.
    fn present(&mut self, frame: FrameRgba) -> FlightResult<()>;
}

/// Deterministic clock advancing by `1 / fps` per poll, requesting close after `frame_limit` frames.
#[derive(Clone, Copy, Debug)]
pub struct FixedStepClock {
    fps: f64,
    start: f64,
    frame_limit: u64,
    emitted: u64,
}

impl FixedStepClock {
    /// Clock starting at `start` seconds.
    pub fn new(fps: f64, start: f64, frame_limit: u64) -> FlightResult<Self> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(FlightError::invalid_argument(format!(
                "fps must be > 0, got {fps}"
            )));
        }
        Ok(Self {
            fps,
            start,
            frame_limit,
            emitted: 0,
        })
    }

    /// Frames handed out so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Next input: no pointer activity, time stepped from the frame count.
    pub fn tick(&mut self) -> FrameInput {
        if self.emitted >= self.frame_limit {
            return FrameInput {
                time: self.time_of(self.emitted),
                close_requested: true,
                ..FrameInput::default()
            };
        }
        let time = self.time_of(self.emitted);
        self.emitted += 1;
        FrameInput {
            time,
            ..FrameInput::default()
        }
    }

    fn time_of(&self, frame: u64) -> f64 {
        self.start + frame as f64 / self.fps
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/platform.rs"]
mod tests;
