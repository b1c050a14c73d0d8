//! Expected cardinalities of the model input fields.

use serde::{Deserialize, Serialize};

/// Channel and level counts for the surface and upper-air fields.
///
/// The reference dataset uses 4 surface channels (mean sea level
/// pressure, 10 m u/v wind, 2 m temperature), 5 upper-air channels
/// (geopotential, specific humidity, temperature, u/v wind) and 13
/// pressure levels, but these are dataset properties, so they live in
/// configuration rather than in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Leading channel count of the surface field `[C, H, W]`.
    pub surface_channels: usize,
    /// Leading channel count of the upper-air field `[C, L, H, W]`.
    pub upper_channels: usize,
    /// Pressure level count `L` of the upper-air field.
    pub pressure_levels: usize,
}

impl Default for FieldSpec {
    fn default() -> Self {
        Self {
            surface_channels: 4,
            upper_channels: 5,
            pressure_levels: 13,
        }
    }
}
