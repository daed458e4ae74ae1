pub(crate) mod bernstein;
pub(crate) mod curve;
pub(crate) mod path;
