//! CPU mirrors of the per-pixel effect math in the WGSL post-process shaders.
//!
//! The shaders and these functions implement the same formulas; tests exercise them here.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::{render::plan::BlurDirection, scene::params::FocusPlanes};

/// Horizontal bands the glitch splits the screen into.
pub const GLITCH_BANDS: f32 = 24.0;
/// Glitch pattern changes per second.
pub const GLITCH_RATE: f32 = 8.0;
/// Band noise below this value leaves the band in place.
pub const GLITCH_THRESHOLD: f32 = 0.85;
/// Largest row displacement, as a fraction of the width.
pub const GLITCH_MAX_SHIFT: f32 = 0.04;

/// One separable box-blur pass over tightly packed RGBA8 with clamp-to-edge sampling.
///
/// `out = (c[0] + Σ_{i=1}^{samples-1} (c[+i] + c[-i])) / (2 * samples - 1)`. `samples <= 1`
/// copies the input.
pub fn box_blur_rgba8(
    src: &[u8],
    width: u32,
    height: u32,
    direction: BlurDirection,
    samples: i32,
) -> Vec<u8> {
    if samples <= 1 || width == 0 || height == 0 {
        return src.to_vec();
    }
    let [dx, dy] = direction.step();
    let (w, h) = (width as i64, height as i64);
    let texel = |x: i64, y: i64| {
        let x = x.clamp(0, w - 1);
        let y = y.clamp(0, h - 1);
        let i = ((y * w + x) * 4) as usize;
        Vec4::new(
            src[i] as f32,
            src[i + 1] as f32,
            src[i + 2] as f32,
            src[i + 3] as f32,
        )
    };

    let taps = (2 * samples - 1) as f32;
    let mut out = Vec::with_capacity(src.len());
    for y in 0..h {
        for x in 0..w {
            let mut acc = texel(x, y);
            for i in 1..samples as i64 {
                acc += texel(x + dx as i64 * i, y + dy as i64 * i);
                acc += texel(x - dx as i64 * i, y - dy as i64 * i);
            }
            let c = (acc / taps).round().clamp(Vec4::ZERO, Vec4::splat(255.0));
            out.extend_from_slice(&[c.x as u8, c.y as u8, c.z as u8, c.w as u8]);
        }
    }
    out
}

/// Positive view-space distance of a depth-buffer sample.
///
/// `ndc` is the pixel center in normalized device coordinates, `depth` the stored `[0, 1]` depth.
pub fn view_depth(depth: f32, ndc: Vec2, inverse_projection: Mat4) -> f32 {
    let p = inverse_projection * Vec4::new(ndc.x, ndc.y, depth, 1.0);
    -p.z / p.w
}

/// Blur weight in `[0, 1]`: 0 on the focus plane, ramping to 1 over `near` in front of it and
/// over `far` behind it.
pub fn circle_of_confusion(view_depth: f32, focus: FocusPlanes) -> f32 {
    let d = (view_depth - focus.focus).abs();
    let ramp = if view_depth < focus.focus {
        focus.near
    } else {
        focus.far
    };
    if ramp <= 0.0 {
        return if d > 0.0 { 1.0 } else { 0.0 };
    }
    (d / ramp).clamp(0.0, 1.0)
}

/// Blend sharp and blurred color by `coc`.
pub fn depth_of_field(sharp: Vec4, blurred: Vec4, coc: f32) -> Vec4 {
    sharp.lerp(blurred, coc.clamp(0.0, 1.0))
}

/// `color^(1/gamma)`, per channel.
pub fn gamma_correct(color: Vec3, gamma: f32) -> Vec3 {
    color.max(Vec3::ZERO).powf(1.0 / gamma)
}

/// Horizontal displacement (fraction of the width) of the row at normalized height `v`.
///
/// A function of time and row only: the screen is cut into [`GLITCH_BANDS`] bands, each band
/// draws a noise value per tick and shifts when it crosses [`GLITCH_THRESHOLD`].
pub fn glitch_shift(v: f32, time: f32) -> f32 {
    let band = (v.clamp(0.0, 1.0) * GLITCH_BANDS).floor();
    let tick = (time * GLITCH_RATE).floor();
    let n = hash11(band + tick * GLITCH_BANDS);
    if n < GLITCH_THRESHOLD {
        return 0.0;
    }
    let strength = (n - GLITCH_THRESHOLD) / (1.0 - GLITCH_THRESHOLD);
    let sign = if hash11(band * 7.0 + tick) < 0.5 { -1.0 } else { 1.0 };
    sign * strength * GLITCH_MAX_SHIFT
}

fn hash11(x: f32) -> f32 {
    ((x * 12.9898).sin() * 43_758.547).rem_euclid(1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/render/fx.rs"]
mod tests;
