use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::{
    render::{
        passes::FrameState,
        plan::{FxPass, FxStage, Viewport},
    },
    scene::params::DirectionalLight,
};

/// Byte size of one packed [`DirectionalLight`] record.
pub const LIGHT_RECORD_SIZE: usize = 32;

/// Serializes uniform records with std140-style alignment, little-endian.
///
/// Scalars align to 4, `vec2` to 8, `vec3`/`vec4`/`mat4` to 16. A `vec3` occupies 12 bytes, so a
/// following scalar packs into its fourth lane.
#[derive(Clone, Debug, Default)]
pub struct UniformWriter {
    bytes: Vec<u8>,
}

impl UniformWriter {
    /// Empty record.
    pub fn new() -> Self {
        Self::default()
    }

    fn align(&mut self, to: usize) {
        let rem = self.bytes.len() % to;
        if rem != 0 {
            self.bytes.resize(self.bytes.len() + (to - rem), 0);
        }
    }

    /// Append an `f32`.
    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.align(4);
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Append an `i32`.
    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.align(4);
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Append a `u32`.
    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.align(4);
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Append a `vec2<f32>`.
    pub fn vec2(&mut self, v: Vec2) -> &mut Self {
        self.align(8);
        for c in v.to_array() {
            self.bytes.extend_from_slice(&c.to_le_bytes());
        }
        self
    }

    /// Append a `vec2<i32>`.
    pub fn ivec2(&mut self, v: [i32; 2]) -> &mut Self {
        self.align(8);
        for c in v {
            self.bytes.extend_from_slice(&c.to_le_bytes());
        }
        self
    }

    /// Append a `vec3<f32>` (12 bytes at a 16-byte boundary).
    pub fn vec3(&mut self, v: Vec3) -> &mut Self {
        self.align(16);
        for c in v.to_array() {
            self.bytes.extend_from_slice(&c.to_le_bytes());
        }
        self
    }

    /// Append a `vec4<f32>`.
    pub fn vec4(&mut self, v: Vec4) -> &mut Self {
        self.align(16);
        for c in v.to_array() {
            self.bytes.extend_from_slice(&c.to_le_bytes());
        }
        self
    }

    /// Append a column-major `mat4x4<f32>`.
    pub fn mat4(&mut self, m: Mat4) -> &mut Self {
        self.align(16);
        for c in m.to_cols_array() {
            self.bytes.extend_from_slice(&c.to_le_bytes());
        }
        self
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Pad to a multiple of 16 and return the record.
    pub fn finish(mut self) -> Vec<u8> {
        self.align(16);
        if self.bytes.is_empty() {
            self.bytes.resize(16, 0);
        }
        self.bytes
    }
}

/// Destination of a [`ScopedUpload`].
pub trait UploadTarget {
    /// Copy `bytes` into GPU-visible memory at `offset`.
    fn commit(&mut self, offset: u64, bytes: &[u8]);
}

impl UploadTarget for Vec<u8> {
    fn commit(&mut self, offset: u64, bytes: &[u8]) {
        let start = offset as usize;
        let end = start + bytes.len();
        if self.len() < end {
            self.resize(end, 0);
        }
        self[start..end].copy_from_slice(bytes);
    }
}

/// Write access to a uniform region that is committed when the guard drops.
///
/// Every exit path, including `?` and panics unwinding through the caller, releases the region
/// with whatever was written.
pub struct ScopedUpload<'a, T: UploadTarget + ?Sized> {
    target: &'a mut T,
    offset: u64,
    writer: UniformWriter,
}

impl<'a, T: UploadTarget + ?Sized> ScopedUpload<'a, T> {
    /// Start writing the region at `offset`.
    pub fn new(target: &'a mut T, offset: u64) -> Self {
        Self {
            target,
            offset,
            writer: UniformWriter::new(),
        }
    }

    /// Record being written.
    pub fn writer(&mut self) -> &mut UniformWriter {
        &mut self.writer
    }
}

impl<T: UploadTarget + ?Sized> Drop for ScopedUpload<'_, T> {
    fn drop(&mut self) {
        let bytes = std::mem::take(&mut self.writer).finish();
        self.target.commit(self.offset, &bytes);
    }
}

/// Packed light record: `direction` @0, pad, `color` @16, `intensity` @28.
pub fn write_light(w: &mut UniformWriter, light: &DirectionalLight) {
    w.vec3(light.direction).vec3(light.color).f32(light.intensity);
}

/// Cube grid record.
///
/// `mvp` @0, `mv` @64, `camera` @128, `grid_size` @140, `color_near` @144, `brightness` @156,
/// `color_far` @160, `attenuation` @172, `light_dir` @176, `time` @188.
pub fn write_grid(w: &mut UniformWriter, frame: &FrameState<'_>) {
    let p = frame.params;
    let light_dir = p
        .lights
        .first()
        .map(|l| l.direction)
        .unwrap_or(Vec3::NEG_Y);
    w.mat4(frame.view_projection())
        .mat4(frame.view)
        .vec3(frame.eye)
        .u32(p.grid_size)
        .vec3(p.color_near)
        .f32(p.brightness)
        .vec3(p.color_far)
        .f32(p.attenuation)
        .vec3(light_dir)
        .f32(frame.time);
}

/// Marker sphere record: `mvp` @0, `mv` @64, `position` @128, `color` @144.
pub fn write_marker(w: &mut UniformWriter, frame: &FrameState<'_>) {
    w.mat4(frame.view_projection())
        .mat4(frame.view)
        .vec3(frame.marker)
        .vec3(frame.params.sphere_color);
}

/// Effect record header: `x, y, w, h` of the drawn rectangle in output pixels.
pub fn write_viewport(w: &mut UniformWriter, vp: Viewport) {
    w.vec4(Vec4::new(
        vp.x as f32,
        vp.y as f32,
        vp.width as f32,
        vp.height as f32,
    ));
}

/// Effect record: viewport header @0, then stage fields from @16.
pub fn write_fx(w: &mut UniformWriter, pass: &FxPass, frame: &FrameState<'_>) {
    write_viewport(
        w,
        pass.viewport.unwrap_or_else(|| Viewport::full(frame.resolution)),
    );

    let p = frame.params;
    match pass.stage {
        FxStage::Blur(direction) => {
            w.ivec2(direction.step()).i32(p.blur_samples);
        }
        FxStage::CircleOfConfusion | FxStage::BlitDepth => {
            w.mat4(frame.inverse_projection)
                .vec3(Vec3::new(p.focus.focus, p.focus.near, p.focus.far));
        }
        FxStage::Gamma => {
            w.f32(p.gamma);
        }
        FxStage::Glitch => {
            w.f32(frame.time);
        }
        FxStage::DepthOfField | FxStage::Blit => {}
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/uniforms.rs"]
mod tests;
