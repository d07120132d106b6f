//! Simulation parameters with TOML preset support.
//!
//! Everything the control panel tweaks lives here: attractor coefficients,
//! color gradient endpoints, energy cap, output scaling, eye position, and
//! the compute dispatch size. Parameters serialize to/from TOML so a
//! favorite configuration can be stored as a preset file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SwirlError;

/// Compute invocations per work group (`local_size_x * local_size_y`).
pub const INVOCATIONS_PER_GROUP: u32 = 16 * 16;

/// Tweakable simulation state. All fields use `#[serde(default)]` so
/// partial TOML presets (e.g. only overriding the attractors) work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimParams {
    /// Attractor map coefficients (a, b, c, d).
    pub attractors: [f32; 4],
    /// Gradient color for low-energy pixels.
    pub cold_color: [f32; 3],
    /// Gradient color for high-energy pixels.
    pub hot_color: [f32; 3],
    /// Per-particle energy cap used to normalize accumulation.
    pub e_max: f32,
    /// Display brightness multiplier.
    pub output_scalar: f32,
    /// Camera eye position.
    pub eye: [f32; 3],
    /// Drive the eye along the animated orbit each frame.
    pub animate_eye: bool,
    /// Keep the animated eye at a constant distance from the origin.
    pub normalize_eye_distance: bool,
    /// Compute dispatch size in work groups per axis.
    pub dispatch_size: [u32; 3],
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            attractors: [-1.4, 1.6, 1.0, 0.7],
            cold_color: [0.25, 0.25, 1.0],
            hot_color: [1.0, 0.25, 0.25],
            e_max: 1000.0,
            output_scalar: 5.0,
            eye: [1.5, 5.0, 5.0],
            animate_eye: false,
            normalize_eye_distance: false,
            dispatch_size: [64, 32, 16],
        }
    }
}

impl SimParams {
    /// Total simulated particles: one per compute invocation across the
    /// whole dispatch grid.
    pub fn particle_count(&self) -> usize {
        let [x, y, z] = self.dispatch_size;
        INVOCATIONS_PER_GROUP as usize * (x as usize * y as usize * z as usize)
    }

    /// Load parameters from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// `Io` when the file cannot be read, `ParamsParse` on malformed TOML.
    pub fn load(path: &Path) -> Result<Self, SwirlError> {
        let content = std::fs::read_to_string(path).map_err(SwirlError::Io)?;
        toml::from_str(&content)
            .map_err(|e| SwirlError::ParamsParse(e.to_string()))
    }

    /// Save parameters to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// `ParamsParse` when serialization fails, `Io` when the file cannot
    /// be written.
    pub fn save(&self, path: &Path) -> Result<(), SwirlError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SwirlError::ParamsParse(e.to_string()))?;
        std::fs::write(path, content).map_err(SwirlError::Io)
    }
}

/// Built-in attractor coefficient presets, hand-picked for interesting
/// orbits.
pub fn attractor_presets() -> [[f32; 4]; 4] {
    [
        [-1.4, 1.6, 1.0, 0.7],
        [-1.7, 1.7, 0.6, 1.2],
        [-1.7, 1.3, 0.1, 1.3],
        [-1.8, -2.0, -0.5, -0.9],
    ]
}
