use glam::Vec2;

use crate::camera::orbit::OrbitCamera;

/// Pan speed per pixel of drag.
pub const MOUSE_PAN_SPEED: f32 = 0.001;
/// Zoom factor applied per frame while dragging.
pub const MOUSE_ZOOM_SPEED: f32 = 0.05;
/// Turn speed in radians per pixel of drag.
pub const MOUSE_TURN_SPEED: f32 = 0.005;

/// Pointer snapshot for one frame, as reported by the platform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    /// Cursor position in window pixels.
    pub position: Vec2,
    /// Left button held (turn).
    pub left: bool,
    /// Right button held (zoom).
    pub right: bool,
    /// Middle button held (pan).
    pub middle: bool,
    /// Camera modifier key held. Drags only move the camera while it is down.
    pub modifier: bool,
}

/// Maps pointer drags to [`OrbitCamera`] operations.
///
/// Deltas are measured against a lock position that follows the cursor every frame, so each frame
/// applies only the motion since the previous one.
#[derive(Clone, Copy, Debug, Default)]
pub struct MouseControls {
    lock: Vec2,
}

impl MouseControls {
    /// Apply one frame of pointer input to `camera`.
    pub fn apply(&mut self, pointer: &PointerState, camera: &mut OrbitCamera) {
        let any_button = pointer.left || pointer.right || pointer.middle;
        if !pointer.modifier {
            if any_button {
                self.lock = pointer.position;
            }
            return;
        }

        let diff = (pointer.position - self.lock).trunc();
        if pointer.right {
            let zoom_dir = if diff.x > 0.0 {
                -1.0
            } else if diff.x < 0.0 {
                1.0
            } else {
                0.0
            };
            camera.zoom(zoom_dir * MOUSE_ZOOM_SPEED);
        } else if pointer.left {
            camera.turn(diff.y * MOUSE_TURN_SPEED, diff.x * MOUSE_TURN_SPEED);
        } else if pointer.middle {
            camera.pan(diff.x * MOUSE_PAN_SPEED, diff.y * MOUSE_PAN_SPEED);
        }
        self.lock = pointer.position;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/camera/controls.rs"]
mod tests;
