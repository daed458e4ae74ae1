use crate::foundation::error::{FlightError, FlightResult};

pub use glam::{Mat4, Vec2, Vec3, Vec4};

/// Output surface dimensions in pixels. Fixed for the lifetime of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Create a validated, non-empty resolution.
    pub fn new(width: u32, height: u32) -> FlightResult<Self> {
        if width == 0 || height == 0 {
            return Err(FlightError::validation(format!(
                "resolution must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Width over height.
    pub fn aspect(self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Number of pixels covered.
    pub fn pixel_count(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }
}

/// A presented frame as RGBA8 pixels (straight alpha, row-major, tightly packed).
#[derive(Clone, Debug)]
pub struct FrameRgba {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes.
    pub data: Vec<u8>,
}

impl FrameRgba {
    /// A frame filled with one color.
    pub fn solid(res: Resolution, rgba: [u8; 4]) -> Self {
        Self {
            width: res.width,
            height: res.height,
            data: rgba.repeat(res.pixel_count()),
        }
    }

    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}
