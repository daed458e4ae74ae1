pub(crate) mod fx;
#[cfg(feature = "gpu")]
pub(crate) mod gpu;
pub(crate) mod passes;
pub(crate) mod plan;
pub(crate) mod shaders;
pub(crate) mod targets;
pub(crate) mod uniforms;
