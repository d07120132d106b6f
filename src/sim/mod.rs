//! Simulation-side state: tweakable parameters and camera math.

/// View/projection and animated orbit math.
pub mod camera;
/// Tweakable parameters, TOML presets, dispatch sizing.
pub mod params;
