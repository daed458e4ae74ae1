pub(crate) mod autopilot;
pub(crate) mod controls;
pub(crate) mod orbit;
