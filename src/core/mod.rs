//! Core detection building blocks: the spatial filter and ratio statistic
//! (`processing`), pluggable anomaly detectors (`anomaly`), label assignment
//! (`classify`) and parameters. These are internal primitives consumed by the
//! high-level `api` module.
pub mod anomaly;
pub mod classify;
pub mod params;
pub mod processing;
