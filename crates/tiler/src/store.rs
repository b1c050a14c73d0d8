//! On-disk tile tree: `root/date/time/{config_or_layer}/{map|attention}/*.bin`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::{ArrayBase, Data, Dimension};
use tracing::debug;

use tiles_common::{TilesError, TilesResult, TimeSlot};

/// Name of the inventory file at the store root.
pub const INVENTORY_FILENAME: &str = "available_data.json";

/// Path layout and raw-tile writing for one store root.
///
/// Ownership is write-once per (date, time): [`TileStore::clear_slot`]
/// removes the whole slot subtree before a run repopulates it, so no
/// stale tiles from a previous run or shape survive.
#[derive(Debug, Clone)]
pub struct TileStore {
    root: PathBuf,
}

impl TileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory owned by one (date, time) unit.
    pub fn slot_dir(&self, slot: &TimeSlot) -> PathBuf {
        self.root.join(slot.date_dir()).join(slot.time_dir())
    }

    /// `{slot}/{config_label}/map`
    pub fn map_dir(&self, slot: &TimeSlot, config_label: &str) -> PathBuf {
        self.slot_dir(slot).join(config_label).join("map")
    }

    /// `{slot}/{layer_name_safe}/attention`
    pub fn attention_dir(&self, slot: &TimeSlot, layer_name_safe: &str) -> PathBuf {
        self.slot_dir(slot).join(layer_name_safe).join("attention")
    }

    /// `{root}/available_data.json`
    pub fn inventory_path(&self) -> PathBuf {
        self.root.join(INVENTORY_FILENAME)
    }

    /// Remove and recreate a slot's subtree.
    ///
    /// Must happen-before any tile write for that slot; together with
    /// the writes it forms the per-slot critical section, and it is
    /// what makes re-runs idempotent.
    pub fn clear_slot(&self, slot: &TimeSlot) -> TilesResult<()> {
        let dir = self.slot_dir(slot);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| TilesError::io(&dir, e))?;
            debug!(dir = %dir.display(), "cleared slot directory");
        }
        fs::create_dir_all(&dir).map_err(|e| TilesError::io(&dir, e))?;
        Ok(())
    }

    /// Write one tile as raw native-endian f32, row-major, no header.
    ///
    /// The consumer reconstructs the shape from the window config and
    /// channel count; this headerless format is the interface contract
    /// with the visualization client.
    pub fn write_tile<S, D>(
        &self,
        dir: &Path,
        filename: &str,
        data: &ArrayBase<S, D>,
    ) -> TilesResult<()>
    where
        S: Data<Elem = f32>,
        D: Dimension,
    {
        fs::create_dir_all(dir).map_err(|e| TilesError::io(dir, e))?;
        let path = dir.join(filename);
        let file = File::create(&path).map_err(|e| TilesError::io(&path, e))?;
        let mut writer = BufWriter::new(file);
        if let Some(slice) = data.as_slice() {
            let mut bytes = Vec::with_capacity(slice.len() * 4);
            for value in slice {
                bytes.extend_from_slice(&value.to_ne_bytes());
            }
            writer
                .write_all(&bytes)
                .map_err(|e| TilesError::io(&path, e))?;
        } else {
            // Non-contiguous view: iterate in logical (row-major) order.
            for value in data.iter() {
                writer
                    .write_all(&value.to_ne_bytes())
                    .map_err(|e| TilesError::io(&path, e))?;
            }
        }
        writer.flush().map_err(|e| TilesError::io(&path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ndarray::Array2;

    fn slot() -> TimeSlot {
        TimeSlot::new(NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(), "00:00").unwrap()
    }

    #[test]
    fn test_paths() {
        let store = TileStore::new("/data/bin");
        let slot = slot();
        assert_eq!(
            store.map_dir(&slot, "config_24x48"),
            PathBuf::from("/data/bin/2018-01-01/00:00/config_24x48/map")
        );
        assert_eq!(
            store.attention_dir(&slot, "_b1_Add_output_0"),
            PathBuf::from("/data/bin/2018-01-01/00:00/_b1_Add_output_0/attention")
        );
        assert_eq!(
            store.inventory_path(),
            PathBuf::from("/data/bin/available_data.json")
        );
    }

    #[test]
    fn test_write_tile_raw_bytes() {
        let temp = tempfile::tempdir().unwrap();
        let store = TileStore::new(temp.path());
        let data = Array2::from_shape_vec((2, 3), vec![0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let dir = store.map_dir(&slot(), "config_2x3");
        store.write_tile(&dir, "input_surface_0_0.bin", &data).unwrap();

        let bytes = fs::read(dir.join("input_surface_0_0.bin")).unwrap();
        assert_eq!(bytes.len(), 2 * 3 * 4);
        let third = f32::from_ne_bytes(bytes[8..12].try_into().unwrap());
        assert_eq!(third, 2.0);
    }

    #[test]
    fn test_clear_slot_removes_stale_files() {
        let temp = tempfile::tempdir().unwrap();
        let store = TileStore::new(temp.path());
        let slot = slot();
        let stale_dir = store.map_dir(&slot, "config_99x99");
        fs::create_dir_all(&stale_dir).unwrap();
        fs::write(stale_dir.join("stale.bin"), b"old").unwrap();

        store.clear_slot(&slot).unwrap();
        assert!(store.slot_dir(&slot).is_dir());
        assert!(!stale_dir.exists());
    }
}
