//! Windowing configurations for the map tiling passes.

use serde::{Deserialize, Serialize};

use crate::error::{TilesError, TilesResult};

/// Prefix of every windowing-configuration directory name.
///
/// The inventory builder excludes directories containing this token,
/// so layer directories must never contain it.
pub const CONFIG_LABEL_TOKEN: &str = "config";

/// Default window sizes (lat, lon) applied to every field.
pub const DEFAULT_WINDOW_SIZES: [(usize, usize); 2] = [(24, 48), (48, 96)];

/// One tiling pass: a chunk size over the last two axes plus an
/// optional half-window circular shift applied before partitioning.
///
/// Each config owns a disjoint output subtree named by its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub chunk_lat: usize,
    pub chunk_lon: usize,
    pub shifted: bool,
    pub label: String,
}

impl WindowConfig {
    /// Config for a surface-field pass, label `config_{lat}x{lon}`
    /// with a `_shifted` suffix for the shifted grid.
    pub fn surface(chunk_lat: usize, chunk_lon: usize, shifted: bool) -> Self {
        let mut label = format!("{CONFIG_LABEL_TOKEN}_{chunk_lat}x{chunk_lon}");
        if shifted {
            label.push_str("_shifted");
        }
        Self {
            chunk_lat,
            chunk_lon,
            shifted,
            label,
        }
    }

    /// Config for one pressure level of the upper-air field, label
    /// `config_{lat}x{lon}_upper_{level}` (+ `_shifted`).
    pub fn upper(chunk_lat: usize, chunk_lon: usize, level: usize, shifted: bool) -> Self {
        let mut label = format!("{CONFIG_LABEL_TOKEN}_{chunk_lat}x{chunk_lon}_upper_{level}");
        if shifted {
            label.push_str("_shifted");
        }
        Self {
            chunk_lat,
            chunk_lon,
            shifted,
            label,
        }
    }

    /// Reject non-positive chunk sizes and labels that would escape
    /// the inventory exclusion rule.
    pub fn validate(&self) -> TilesResult<()> {
        if self.chunk_lat == 0 || self.chunk_lon == 0 {
            return Err(TilesError::InvalidConfiguration(format!(
                "chunk size must be positive, got {}x{}",
                self.chunk_lat, self.chunk_lon
            )));
        }
        if !self.label.contains(CONFIG_LABEL_TOKEN) {
            return Err(TilesError::InvalidConfiguration(format!(
                "window label '{}' must contain '{CONFIG_LABEL_TOKEN}'",
                self.label
            )));
        }
        Ok(())
    }
}

/// Aligned + shifted pass for each window size, for the surface field.
pub fn surface_configs(window_sizes: &[(usize, usize)]) -> Vec<WindowConfig> {
    let mut configs = Vec::with_capacity(window_sizes.len() * 2);
    for &(lat, lon) in window_sizes {
        configs.push(WindowConfig::surface(lat, lon, false));
    }
    for &(lat, lon) in window_sizes {
        configs.push(WindowConfig::surface(lat, lon, true));
    }
    configs
}

/// Aligned + shifted pass for each window size, for one pressure level
/// of the upper-air field.
pub fn upper_configs(window_sizes: &[(usize, usize)], level: usize) -> Vec<WindowConfig> {
    let mut configs = Vec::with_capacity(window_sizes.len() * 2);
    for &(lat, lon) in window_sizes {
        configs.push(WindowConfig::upper(lat, lon, level, false));
    }
    for &(lat, lon) in window_sizes {
        configs.push(WindowConfig::upper(lat, lon, level, true));
    }
    configs
}
