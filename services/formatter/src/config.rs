//! Formatter configuration.
//!
//! All run state lives in one explicit value passed into the pipeline;
//! there is no process-wide mutable configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use tiles_common::window::DEFAULT_WINDOW_SIZES;
use tiles_common::{FieldSpec, TilesError, TilesResult, ATTENTION_LAYER_NAMES};

/// Top-level formatter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatterConfig {
    /// Root of the downloaded input arrays
    /// (`{input_root}/{date}/{time}/input_surface.npy`, ...).
    pub input_root: PathBuf,

    /// Root of the inferred attention arrays
    /// (`{output_root}/{date}/{time}/{layer_name_safe}.npy`).
    pub output_root: PathBuf,

    /// Root of the binary tile store.
    pub store_root: PathBuf,

    /// Window sizes (lat, lon); each gets an aligned and a shifted pass.
    pub window_sizes: Vec<(usize, usize)>,

    /// Expected channel/level cardinalities of the input fields.
    pub field_spec: FieldSpec,

    /// Attention-layer indices to process.
    pub layers: Vec<usize>,

    /// Worker threads across (date, time) units. 1 means sequential.
    pub jobs: usize,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            input_root: PathBuf::from("input_data"),
            output_root: PathBuf::from("output_data"),
            store_root: PathBuf::from("bin"),
            window_sizes: DEFAULT_WINDOW_SIZES.to_vec(),
            field_spec: FieldSpec::default(),
            layers: (0..ATTENTION_LAYER_NAMES.len()).collect(),
            jobs: 1,
        }
    }
}

impl FormatterConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> TilesResult<()> {
        if self.window_sizes.is_empty() {
            return Err(TilesError::InvalidConfiguration(
                "at least one window size is required".to_string(),
            ));
        }
        for &(lat, lon) in &self.window_sizes {
            if lat == 0 || lon == 0 {
                return Err(TilesError::InvalidConfiguration(format!(
                    "window size must be positive, got {lat}x{lon}"
                )));
            }
        }
        if self.jobs == 0 {
            return Err(TilesError::InvalidConfiguration(
                "jobs must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}
