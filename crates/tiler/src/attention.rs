//! Attention tiling driver: per-window/per-head slicing of a layer's
//! attention tensor.

use tracing::debug;

use crate::field::AttentionTensor;
use crate::store::TileStore;
use tiles_common::{head_count, safe_layer_name, TilesError, TilesResult, TimeSlot};

/// Split one layer's attention tensor into `(query, key)` tiles.
///
/// The tensor is split strictly along its existing
/// `(window_lon, window_lat_or_pressure, head)` axes; there is no
/// spatial re-chunking. The head count comes from the layer's position
/// in the network, not from the tensor shape. Tiles land at
/// `{layer_name_safe}/attention/attention_{lon}_{latpl}_{head}.bin`.
pub fn tile_attention(
    store: &TileStore,
    slot: &TimeSlot,
    tensor: &AttentionTensor,
    layer_name: &str,
    layer_index: usize,
    total_layers: usize,
) -> TilesResult<()> {
    let heads = head_count(layer_index, total_layers)?;
    if tensor.heads() < heads {
        return Err(TilesError::shape_mismatch(
            format!("attention tensor with at least {heads} heads"),
            format!("{} heads in layer {layer_name}", tensor.heads()),
        ));
    }

    let layer_name_safe = safe_layer_name(layer_name);
    let dir = store.attention_dir(slot, &layer_name_safe);
    let mut tiles_written = 0usize;
    for win_lon in 0..tensor.window_lon() {
        for win_lat_pl in 0..tensor.window_lat_pl() {
            for head in 0..heads {
                let slice = tensor.slice(win_lon, win_lat_pl, head);
                let filename = format!("attention_{win_lon}_{win_lat_pl}_{head}.bin");
                store.write_tile(&dir, &filename, &slice)?;
                tiles_written += 1;
            }
        }
    }
    debug!(
        layer = layer_name_safe,
        heads, tiles = tiles_written, "wrote attention tiles"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use test_utils::gradient_array;

    fn slot() -> TimeSlot {
        TimeSlot::new(NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(), "00:00").unwrap()
    }

    fn tensor(heads: usize) -> AttentionTensor {
        AttentionTensor::new(gradient_array(&[2, 3, heads, 4, 4])).unwrap()
    }

    #[test]
    fn test_outer_layer_emits_six_heads() {
        let temp = tempfile::tempdir().unwrap();
        let store = TileStore::new(temp.path());
        // Tensor carries 12 heads but layer 0 is an outer layer: only
        // the first 6 are tiled.
        tile_attention(&store, &slot(), &tensor(12), "/b1/Add_output_0", 0, 16).unwrap();

        let dir = store.attention_dir(&slot(), "_b1_Add_output_0");
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 2 * 3 * 6);
        assert!(dir.join("attention_1_2_5.bin").is_file());
        assert!(!dir.join("attention_0_0_6.bin").exists());
    }

    #[test]
    fn test_inner_layer_emits_twelve_heads() {
        let temp = tempfile::tempdir().unwrap();
        let store = TileStore::new(temp.path());
        tile_attention(&store, &slot(), &tensor(12), "/b1/Add_7_output_0", 2, 16).unwrap();

        let dir = store.attention_dir(&slot(), "_b1_Add_7_output_0");
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 2 * 3 * 12);
    }

    #[test]
    fn test_out_of_range_layer_fails() {
        let temp = tempfile::tempdir().unwrap();
        let store = TileStore::new(temp.path());
        let err =
            tile_attention(&store, &slot(), &tensor(12), "/b1/Add_output_0", 16, 16).unwrap_err();
        assert!(matches!(err, TilesError::LayerIndexOutOfRange { .. }));
        // No partial output.
        assert!(!store.slot_dir(&slot()).join("_b1_Add_output_0").exists());
    }

    #[test]
    fn test_truncated_head_axis_fails() {
        let temp = tempfile::tempdir().unwrap();
        let store = TileStore::new(temp.path());
        // Inner layer needs 12 heads; a 6-head tensor is a mismatch.
        let err =
            tile_attention(&store, &slot(), &tensor(6), "/b1/Add_7_output_0", 2, 16).unwrap_err();
        assert!(matches!(err, TilesError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_tile_bytes_are_query_key_slice() {
        let temp = tempfile::tempdir().unwrap();
        let store = TileStore::new(temp.path());
        let tensor = tensor(6);
        tile_attention(&store, &slot(), &tensor, "/b1/Add_output_0", 0, 16).unwrap();

        let dir = store.attention_dir(&slot(), "_b1_Add_output_0");
        let bytes = fs::read(dir.join("attention_1_2_3.bin")).unwrap();
        assert_eq!(bytes.len(), 4 * 4 * 4);
        let expected = tensor.slice(1, 2, 3);
        let first = f32::from_ne_bytes(bytes[0..4].try_into().unwrap());
        assert_eq!(first, expected[[0, 0]]);
    }
}
