use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Mat4, Vec3};

/// Radius below which a zoom resets the camera instead of passing through the pivot.
pub const MIN_RADIUS: f32 = 0.1;
/// Radius used on construction and after a zoom reset.
pub const DEFAULT_RADIUS: f32 = 10.0;

const TWO_PI: f32 = 2.0 * PI;
/// Distance kept from the `2π` pole when wrapping phi.
const PHI_POLE_MARGIN: f32 = 0.1;
/// Value phi wraps to when it crosses the upper pole.
const PHI_WRAP_LOW: f32 = 0.00001;

/// Spherical-coordinate camera orbiting a pivot point.
///
/// Only `radius`, `theta`, `phi` and `pivot` are stored; eye and up are derived on demand, so
/// they can never drift out of sync with the canonical parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    radius: f32,
    theta: f32,
    phi: f32,
    pivot: Vec3,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            theta: FRAC_PI_2,
            phi: FRAC_PI_2,
            pivot: Vec3::ZERO,
        }
    }
}

impl OrbitCamera {
    /// Camera with explicit spherical parameters. `radius` must be positive.
    pub fn new(radius: f32, theta: f32, phi: f32, pivot: Vec3) -> Self {
        Self {
            radius: if radius > 0.0 { radius } else { DEFAULT_RADIUS },
            theta,
            phi,
            pivot,
        }
    }

    /// Distance from the pivot.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Azimuth.
    pub fn theta(&self) -> f32 {
        self.theta
    }

    /// Polar angle, kept inside `(0, 2π)`.
    pub fn phi(&self) -> f32 {
        self.phi
    }

    /// Point the camera orbits and looks at.
    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    /// Eye position derived from the spherical parameters.
    pub fn eye(&self) -> Vec3 {
        let (st, ct) = self.theta.sin_cos();
        let (sp, cp) = self.phi.sin_cos();
        Vec3::new(ct * sp, cp, st * sp) * self.radius + self.pivot
    }

    /// World up, flipped once phi passes π so orbiting over the top stays upright.
    pub fn up(&self) -> Vec3 {
        if self.phi < PI { Vec3::Y } else { Vec3::NEG_Y }
    }

    /// Right-handed world-to-view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.pivot, self.up())
    }

    /// Scale the radius by `1 + factor`.
    ///
    /// Falling under [`MIN_RADIUS`] resets the radius to [`DEFAULT_RADIUS`] and pushes the pivot
    /// forward along the view direction, so the eye stays put and the camera never inverts.
    pub fn zoom(&mut self, factor: f32) {
        let eye = self.eye();
        self.radius += factor * self.radius;
        if self.radius < MIN_RADIUS {
            self.radius = DEFAULT_RADIUS;
            let forward = (self.pivot - eye).try_normalize().unwrap_or(Vec3::NEG_Z);
            self.pivot = eye + forward * self.radius;
        }
    }

    /// Rotate by `delta_phi` (subtracted) and `delta_theta` (added).
    ///
    /// Phi wraps just inside `(0, 2π)`: crossing the top lands near 0, crossing 0 lands at
    /// `2π - 0.1`.
    pub fn turn(&mut self, delta_phi: f32, delta_theta: f32) {
        self.theta += delta_theta;
        self.phi -= delta_phi;
        if self.phi >= TWO_PI - PHI_POLE_MARGIN {
            self.phi = PHI_WRAP_LOW;
        } else if self.phi <= 0.0 {
            self.phi = TWO_PI - PHI_POLE_MARGIN;
        }
    }

    /// Slide the pivot in the view plane. Offsets are scaled by `2 * radius`.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let (side, up) = self.view_basis();
        let scale = self.radius * 2.0;
        self.pivot += up * (dy * scale);
        self.pivot -= side * (dx * scale);
    }

    /// `(side, up)` of the current view, rebuilt from the forward vector.
    fn view_basis(&self) -> (Vec3, Vec3) {
        let world_up = self.up();
        let forward = (self.pivot - self.eye()).try_normalize().unwrap_or(Vec3::NEG_Z);
        let side = forward.cross(world_up).try_normalize().unwrap_or(Vec3::X);
        let up = side.cross(forward).normalize_or_zero();
        (side, up)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/camera/orbit.rs"]
mod tests;
