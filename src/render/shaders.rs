use std::{borrow::Cow, collections::HashMap};

use crate::{
    foundation::error::{FlightError, FlightResult},
    render::plan::FxStage,
};

const FULLSCREEN_PRELUDE: &str = include_str!("shaders/fullscreen.wgsl");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Named shader program, one per distinct draw in the frame.
pub enum ShaderKind {
    /// Instanced cube grid into the G-buffer.
    CubeGrid,
    /// Lookahead marker sphere into the G-buffer.
    Marker,
    /// One directional light, additive.
    DirectionalLight,
    /// Unlit G-buffer color, additive.
    AlbedoAdd,
    /// One separable blur direction.
    Blur,
    /// Circle of confusion from depth.
    CircleOfConfusion,
    /// Depth-of-field composite.
    DepthOfField,
    /// Gamma correction.
    Gamma,
    /// Screen glitch.
    Glitch,
    /// Plain copy.
    Blit,
    /// Linearized depth copy.
    BlitDepth,
}

/// How a program's color output combines with the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blending {
    /// Overwrite.
    Replace,
    /// `dst + src`.
    Additive,
}

/// Texture access type of a program input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureSample {
    /// `texture_2d<f32>`, read with `textureLoad`.
    Color,
    /// `texture_depth_2d`.
    Depth,
}

impl ShaderKind {
    /// Every program the pipeline creates at startup.
    pub const ALL: [Self; 11] = [
        Self::CubeGrid,
        Self::Marker,
        Self::DirectionalLight,
        Self::AlbedoAdd,
        Self::Blur,
        Self::CircleOfConfusion,
        Self::DepthOfField,
        Self::Gamma,
        Self::Glitch,
        Self::Blit,
        Self::BlitDepth,
    ];

    /// Stable name, used as the GPU label and in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Self::CubeGrid => "cube_grid",
            Self::Marker => "marker",
            Self::DirectionalLight => "directional_light",
            Self::AlbedoAdd => "albedo_add",
            Self::Blur => "blur",
            Self::CircleOfConfusion => "coc",
            Self::DepthOfField => "dof",
            Self::Gamma => "gamma",
            Self::Glitch => "glitch",
            Self::Blit => "blit",
            Self::BlitDepth => "blit_depth",
        }
    }

    /// Program for a post-process stage.
    pub fn for_stage(stage: FxStage) -> Self {
        match stage {
            FxStage::Blur(_) => Self::Blur,
            FxStage::CircleOfConfusion => Self::CircleOfConfusion,
            FxStage::DepthOfField => Self::DepthOfField,
            FxStage::Gamma => Self::Gamma,
            FxStage::Glitch => Self::Glitch,
            FxStage::Blit => Self::Blit,
            FxStage::BlitDepth => Self::BlitDepth,
        }
    }

    /// Whether the program draws meshes into the G-buffer (as opposed to a full-screen triangle).
    pub fn writes_gbuffer(self) -> bool {
        matches!(self, Self::CubeGrid | Self::Marker)
    }

    /// Output blending.
    pub fn blending(self) -> Blending {
        match self {
            Self::DirectionalLight | Self::AlbedoAdd => Blending::Additive,
            _ => Blending::Replace,
        }
    }

    /// Texture inputs by binding name, in declaration order.
    pub fn textures(self) -> &'static [(&'static str, TextureSample)] {
        use TextureSample::{Color, Depth};
        match self {
            Self::CubeGrid | Self::Marker => &[],
            Self::DirectionalLight => &[("color", Color), ("normal", Color), ("depth", Depth)],
            Self::AlbedoAdd | Self::Blur | Self::Gamma | Self::Glitch | Self::Blit => {
                &[("texture", Color)]
            }
            Self::CircleOfConfusion | Self::BlitDepth => &[("depth", Depth)],
            Self::DepthOfField => &[("color", Color), ("coc", Color), ("blur", Color)],
        }
    }

    /// Vertex entry point.
    pub fn vertex_entry(self) -> &'static str {
        if self.writes_gbuffer() { "vs" } else { "vs_fullscreen" }
    }
}

/// Supplies WGSL source per program.
pub trait ShaderLibrary {
    /// Complete WGSL module for `kind`.
    fn source(&self, kind: ShaderKind) -> FlightResult<Cow<'static, str>>;
}

/// WGSL compiled into the binary.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedShaders;

impl EmbeddedShaders {
    fn body(kind: ShaderKind) -> &'static str {
        match kind {
            ShaderKind::CubeGrid => include_str!("shaders/cube_grid.wgsl"),
            ShaderKind::Marker => include_str!("shaders/marker.wgsl"),
            ShaderKind::DirectionalLight => include_str!("shaders/directional_light.wgsl"),
            ShaderKind::AlbedoAdd | ShaderKind::Blit => include_str!("shaders/blit.wgsl"),
            ShaderKind::Blur => include_str!("shaders/blur.wgsl"),
            ShaderKind::CircleOfConfusion => include_str!("shaders/coc.wgsl"),
            ShaderKind::DepthOfField => include_str!("shaders/dof.wgsl"),
            ShaderKind::Gamma => include_str!("shaders/gamma.wgsl"),
            ShaderKind::Glitch => include_str!("shaders/glitch.wgsl"),
            ShaderKind::BlitDepth => include_str!("shaders/blit_depth.wgsl"),
        }
    }
}

impl ShaderLibrary for EmbeddedShaders {
    fn source(&self, kind: ShaderKind) -> FlightResult<Cow<'static, str>> {
        let body = Self::body(kind);
        if kind.writes_gbuffer() {
            Ok(Cow::Borrowed(body))
        } else {
            Ok(Cow::Owned(format!("{FULLSCREEN_PRELUDE}\n{body}")))
        }
    }
}

/// Resolve each texture input of `kind` to its `@binding` slot in `source`.
///
/// Inputs are declared as `@group(1) @binding(N) var t_<name>: ...;`. A missing declaration is a
/// [`FlightError::ResourceCreation`] naming the program.
pub fn resolve_texture_slots(
    kind: ShaderKind,
    source: &str,
) -> FlightResult<HashMap<&'static str, u32>> {
    let mut slots = HashMap::with_capacity(kind.textures().len());
    for &(name, _) in kind.textures() {
        let needle = format!("var t_{name}:");
        let line = source
            .lines()
            .find(|l| l.contains(&needle) && l.contains("@group(1)"))
            .ok_or_else(|| {
                FlightError::resource(kind.label(), format!("no texture binding for '{name}'"))
            })?;
        let slot = parse_binding(line).ok_or_else(|| {
            FlightError::resource(
                kind.label(),
                format!("malformed binding declaration for '{name}': {}", line.trim()),
            )
        })?;
        if slots.values().any(|&s| s == slot) {
            return Err(FlightError::resource(
                kind.label(),
                format!("binding {slot} is declared twice"),
            ));
        }
        slots.insert(name, slot);
    }
    Ok(slots)
}

fn parse_binding(line: &str) -> Option<u32> {
    let rest = &line[line.find("@binding(")? + "@binding(".len()..];
    rest[..rest.find(')')?].trim().parse().ok()
}

#[cfg(test)]
#[path = "../../tests/unit/render/shaders.rs"]
mod tests;
