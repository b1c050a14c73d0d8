//! Per-(date, time) tiling pipeline.
//!
//! Each unit owns its own store subtree exclusively: clear, then map
//! tiles, then attention tiles, with nothing else touching that
//! subtree. Units share no mutable state, so distinct units may run on
//! a rayon pool; the inventory is rebuilt only after all units join.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{error, info, warn};

use tiler::{
    build_inventory, load_attention_tensor, load_grid_field, tile_attention, tile_map,
    write_inventory, GridField, TileStore,
};
use tiles_common::{
    layer_name, safe_layer_name, surface_configs, upper_configs, TilesError, TilesResult, TimeSlot,
    ATTENTION_LAYER_NAMES,
};

use crate::config::FormatterConfig;

/// Result of one (date, time) unit.
#[derive(Debug)]
pub struct UnitOutcome {
    pub slot: TimeSlot,
    pub fatal: Option<TilesError>,
    pub skipped_layers: Vec<String>,
}

/// Aggregate result of a pipeline run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub units_processed: usize,
    pub units_failed: usize,
    pub layers_skipped: usize,
}

impl RunSummary {
    /// True when every unit completed and no layer was skipped.
    pub fn is_clean(&self) -> bool {
        self.units_failed == 0 && self.layers_skipped == 0
    }
}

/// The tiling pipeline for a set of (date, time) units.
pub struct Pipeline {
    config: FormatterConfig,
    store: TileStore,
}

impl Pipeline {
    pub fn new(config: FormatterConfig) -> Self {
        let store = TileStore::new(config.store_root.clone());
        Self { config, store }
    }

    pub fn store(&self) -> &TileStore {
        &self.store
    }

    /// Process every unit, then rebuild and persist the inventory.
    pub fn run(&self, slots: &[TimeSlot]) -> Result<RunSummary> {
        fs::create_dir_all(self.store.root()).with_context(|| {
            format!("creating store root {}", self.store.root().display())
        })?;

        let outcomes: Vec<UnitOutcome> = if self.config.jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.jobs)
                .build()
                .context("building worker pool")?;
            pool.install(|| slots.par_iter().map(|slot| self.process_slot(slot)).collect())
        } else {
            slots.iter().map(|slot| self.process_slot(slot)).collect()
        };

        let mut summary = RunSummary {
            units_processed: outcomes.len(),
            ..RunSummary::default()
        };
        for outcome in &outcomes {
            if outcome.fatal.is_some() {
                summary.units_failed += 1;
            }
            summary.layers_skipped += outcome.skipped_layers.len();
        }

        // All workers have joined; the store is quiescent.
        let inventory = build_inventory(self.store.root())?;
        let path = write_inventory(&self.store, &inventory)?;
        info!(path = %path.display(), dates = inventory.len(), "inventory rebuilt");

        Ok(summary)
    }

    /// Run one unit, converting fatal errors into an outcome rather
    /// than aborting sibling units.
    fn process_slot(&self, slot: &TimeSlot) -> UnitOutcome {
        info!(slot = %slot, "processing unit");
        match self.tile_unit(slot) {
            Ok(skipped_layers) => UnitOutcome {
                slot: slot.clone(),
                fatal: None,
                skipped_layers,
            },
            Err(e) => {
                error!(slot = %slot, error = %e, "unit failed");
                UnitOutcome {
                    slot: slot.clone(),
                    fatal: Some(e),
                    skipped_layers: Vec::new(),
                }
            }
        }
    }

    /// Clear-before-write, then map tiling, then attention tiling.
    /// Returns the names of skipped attention layers.
    fn tile_unit(&self, slot: &TimeSlot) -> TilesResult<Vec<String>> {
        self.store.clear_slot(slot)?;

        let surface = load_grid_field(&self.input_path(slot, "input_surface"))?;
        self.check_surface(&surface)?;
        tile_map(
            &self.store,
            slot,
            &surface,
            "input_surface",
            &surface_configs(&self.config.window_sizes),
        )?;

        let upper = load_grid_field(&self.input_path(slot, "input_upper"))?;
        let levels = self.check_upper(&upper)?;
        for level in 0..levels {
            let level_field = upper.level(level)?;
            tile_map(
                &self.store,
                slot,
                &level_field,
                "input_upper",
                &upper_configs(&self.config.window_sizes, level),
            )?;
        }

        self.tile_attention_layers(slot)
    }

    fn tile_attention_layers(&self, slot: &TimeSlot) -> TilesResult<Vec<String>> {
        let total_layers = ATTENTION_LAYER_NAMES.len();
        let mut skipped = Vec::new();
        for &index in &self.config.layers {
            let Some(name) = layer_name(index) else {
                warn!(index, total_layers, "requested layer index out of range, skipping");
                skipped.push(format!("layer index {index}"));
                continue;
            };
            let path = self.attention_path(slot, name);
            let result = load_attention_tensor(&path).and_then(|tensor| {
                tile_attention(&self.store, slot, &tensor, name, index, total_layers)
            });
            match result {
                Ok(()) => {}
                Err(e) if e.is_layer_skippable() => {
                    warn!(layer = name, error = %e, "skipping attention layer");
                    skipped.push(name.to_string());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(skipped)
    }

    fn input_path(&self, slot: &TimeSlot, field_label: &str) -> PathBuf {
        self.config
            .input_root
            .join(slot.date_dir())
            .join(slot.time_dir())
            .join(format!("{field_label}.npy"))
    }

    fn attention_path(&self, slot: &TimeSlot, layer: &str) -> PathBuf {
        self.config
            .output_root
            .join(slot.date_dir())
            .join(slot.time_dir())
            .join(format!("{}.npy", safe_layer_name(layer)))
    }

    fn check_surface(&self, field: &GridField) -> TilesResult<()> {
        let channels = self.config.field_spec.surface_channels;
        if field.ndim() != 3 || field.shape()[0] != channels {
            return Err(TilesError::shape_mismatch(
                format!("surface field [{channels}, H, W]"),
                format!("{:?}", field.shape()),
            ));
        }
        Ok(())
    }

    /// Validate the upper-air field and return its level count.
    fn check_upper(&self, field: &GridField) -> TilesResult<usize> {
        let channels = self.config.field_spec.upper_channels;
        if field.ndim() != 4 || field.shape()[0] != channels {
            return Err(TilesError::shape_mismatch(
                format!("upper-air field [{channels}, L, H, W]"),
                format!("{:?}", field.shape()),
            ));
        }
        let levels = field.shape()[1];
        if levels != self.config.field_spec.pressure_levels {
            warn!(
                levels,
                expected = self.config.field_spec.pressure_levels,
                "upper-air level count differs from configuration"
            );
        }
        Ok(levels)
    }
}
