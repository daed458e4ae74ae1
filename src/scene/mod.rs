pub(crate) mod mesh;
pub(crate) mod params;
