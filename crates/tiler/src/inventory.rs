//! Inventory of tiled layers, derived by re-scanning the store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::store::TileStore;
use tiles_common::window::CONFIG_LABEL_TOKEN;
use tiles_common::{TilesError, TilesResult};

/// `date -> time -> attention layer names`, sorted at every level for
/// deterministic JSON output.
pub type Inventory = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Directory entries of `dir` whose names are valid UTF-8, as
/// `(name, path)` pairs. Non-directories are skipped by the caller.
fn named_entries(dir: &Path) -> TilesResult<Vec<(String, PathBuf)>> {
    let mut entries = Vec::new();
    let read = fs::read_dir(dir).map_err(|e| TilesError::io(dir, e))?;
    for entry in read {
        let entry = entry.map_err(|e| TilesError::io(dir, e))?;
        if let Ok(name) = entry.file_name().into_string() {
            entries.push((name, entry.path()));
        }
    }
    Ok(entries)
}

/// Scan the store and build the inventory from scratch.
///
/// Exactly two directory levels (date, time) are walked below the
/// root, then one entry level. An entry qualifies if it is a directory
/// whose name does not contain the windowing-config token; date/time
/// directories with no qualifying entries still appear with an empty
/// list, so the consumer can tell "processed, no layers" from "never
/// processed". A full rebuild on every call makes the inventory
/// self-healing against partial previous runs.
pub fn build_inventory(store_root: &Path) -> TilesResult<Inventory> {
    let mut inventory = Inventory::new();
    if !store_root.is_dir() {
        return Ok(inventory);
    }

    for (date, date_path) in named_entries(store_root)? {
        if !date_path.is_dir() {
            continue;
        }
        let times = inventory.entry(date).or_default();
        for (time, time_path) in named_entries(&date_path)? {
            if !time_path.is_dir() {
                continue;
            }
            let mut layers: Vec<String> = named_entries(&time_path)?
                .into_iter()
                .filter(|(name, path)| path.is_dir() && !name.contains(CONFIG_LABEL_TOKEN))
                .map(|(name, _)| name)
                .collect();
            layers.sort();
            times.insert(time, layers);
        }
    }
    Ok(inventory)
}

/// Persist the inventory as pretty-printed JSON at the store root.
pub fn write_inventory(store: &TileStore, inventory: &Inventory) -> TilesResult<PathBuf> {
    let path = store.inventory_path();
    let json = serde_json::to_string_pretty(inventory)?;
    fs::write(&path, json).map_err(|e| TilesError::io(&path, e))?;
    debug!(path = %path.display(), dates = inventory.len(), "wrote inventory");
    Ok(path)
}
