use crate::foundation::{
    core::Resolution,
    error::{FlightError, FlightResult},
};

/// Number of interchangeable post-process surfaces.
pub const FX_POOL_SIZE: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Identifier for a surface declared in a [`RenderTargetSet`].
pub struct SurfaceId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Supported pixel formats for render surfaces.
pub enum PixelFormat {
    /// 8-bit RGBA color.
    Rgba8,
    /// 32-bit float RGBA, used for G-buffer normals.
    Rgba32Float,
    /// 24-bit depth.
    Depth24,
}

impl PixelFormat {
    /// Whether the surface can be bound as a color attachment.
    pub fn is_color(self) -> bool {
        !matches!(self, Self::Depth24)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Surface declaration: dimensions, pixel format and a debug label.
pub struct SurfaceDesc {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format.
    pub format: PixelFormat,
    /// Label used for GPU objects and logs.
    pub label: &'static str,
}

/// The three G-buffer attachments written by the geometry pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GBuffer {
    /// Unlit albedo, RGBA8.
    pub color: SurfaceId,
    /// World-space normals, RGBA32F.
    pub normal: SurfaceId,
    /// Depth.
    pub depth: SurfaceId,
}

/// Every surface the pipeline renders into, allocated once at startup.
///
/// Holds the G-buffer, a pool of [`FX_POOL_SIZE`] ping-pong surfaces and the final surface. Post
/// passes share a single effect framebuffer whose color-0 slot is rebound to a different backing
/// surface per stage; [`RenderTargetSet::rebind_color0`] records that binding.
#[derive(Clone, Debug)]
pub struct RenderTargetSet {
    resolution: Resolution,
    surfaces: Vec<SurfaceDesc>,
    gbuffer: GBuffer,
    fx: [SurfaceId; FX_POOL_SIZE],
    final_surface: SurfaceId,
    fx_color0: Option<SurfaceId>,
}

impl RenderTargetSet {
    /// Declare all surfaces for `resolution`.
    pub fn new(resolution: Resolution) -> Self {
        let mut surfaces = Vec::with_capacity(3 + FX_POOL_SIZE + 1);
        let mut declare = |format, label| {
            surfaces.push(SurfaceDesc {
                width: resolution.width,
                height: resolution.height,
                format,
                label,
            });
            SurfaceId((surfaces.len() - 1) as u32)
        };

        let gbuffer = GBuffer {
            color: declare(PixelFormat::Rgba8, "gbuffer_color"),
            normal: declare(PixelFormat::Rgba32Float, "gbuffer_normal"),
            depth: declare(PixelFormat::Depth24, "gbuffer_depth"),
        };
        let fx = [
            declare(PixelFormat::Rgba8, "fx0"),
            declare(PixelFormat::Rgba8, "fx1"),
            declare(PixelFormat::Rgba8, "fx2"),
            declare(PixelFormat::Rgba8, "fx3"),
        ];
        let final_surface = declare(PixelFormat::Rgba8, "final");

        Self {
            resolution,
            surfaces,
            gbuffer,
            fx,
            final_surface,
            fx_color0: None,
        }
    }

    /// Output resolution shared by every surface.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// All surface declarations, indexed by [`SurfaceId`].
    pub fn surfaces(&self) -> &[SurfaceDesc] {
        &self.surfaces
    }

    /// `(id, desc)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (SurfaceId, &SurfaceDesc)> {
        self.surfaces
            .iter()
            .enumerate()
            .map(|(i, d)| (SurfaceId(i as u32), d))
    }

    /// Declaration of `id`.
    pub fn desc(&self, id: SurfaceId) -> FlightResult<&SurfaceDesc> {
        self.surfaces.get(id.0 as usize).ok_or_else(|| {
            FlightError::validation(format!("surface {id:?} is not declared"))
        })
    }

    /// G-buffer attachments.
    pub fn gbuffer(&self) -> GBuffer {
        self.gbuffer
    }

    /// Ping-pong surface `index` of the effect pool.
    pub fn fx(&self, index: usize) -> FlightResult<SurfaceId> {
        self.fx.get(index).copied().ok_or_else(|| {
            FlightError::invalid_argument(format!(
                "fx surface {index} out of range (pool has {FX_POOL_SIZE})"
            ))
        })
    }

    /// Whole effect pool.
    pub fn fx_pool(&self) -> [SurfaceId; FX_POOL_SIZE] {
        self.fx
    }

    /// Surface presented at the end of the frame.
    pub fn final_surface(&self) -> SurfaceId {
        self.final_surface
    }

    /// Surface currently bound to the effect framebuffer's color-0 slot.
    pub fn color0(&self) -> Option<SurfaceId> {
        self.fx_color0
    }

    /// Point the effect framebuffer's color-0 slot at `id`.
    ///
    /// Only RGBA8 effect pool surfaces and the final surface may be bound. No allocation happens.
    pub fn rebind_color0(&mut self, id: SurfaceId) -> FlightResult<()> {
        if !self.accepts_color0(id) {
            return Err(FlightError::validation(format!(
                "surface {id:?} cannot be bound as the effect color attachment"
            )));
        }
        self.fx_color0 = Some(id);
        Ok(())
    }

    /// Whether `id` may be bound to the effect framebuffer's color-0 slot.
    pub fn accepts_color0(&self, id: SurfaceId) -> bool {
        id == self.final_surface || self.fx.contains(&id)
    }

    /// Whether `id` belongs to the G-buffer.
    pub fn is_gbuffer(&self, id: SurfaceId) -> bool {
        id == self.gbuffer.color || id == self.gbuffer.normal || id == self.gbuffer.depth
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/targets.rs"]
mod tests;
