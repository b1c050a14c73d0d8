//! Attention-layer table and the position-based head-count rule.

use crate::error::{TilesError, TilesResult};

/// ONNX output names of the attention layers, in network order.
///
/// One tensor per entry is produced by the inference collaborator for
/// each (date, time).
pub const ATTENTION_LAYER_NAMES: [&str; 16] = [
    "/b1/Add_output_0",
    "/b1/Add_3_output_0",
    "/b1/Add_7_output_0",
    "/b1/Add_10_output_0",
    "/b1/Add_14_output_0",
    "/b1/Add_17_output_0",
    "/b1/Add_21_output_0",
    "/b1/Add_24_output_0",
    "/b1/Add_28_output_0",
    "/b1/Add_31_output_0",
    "/b1/Add_35_output_0",
    "/b1/Add_38_output_0",
    "/b1/Add_42_output_0",
    "/b1/Add_45_output_0",
    "/b1/Add_49_output_0",
    "/b1/Add_52_output_0",
];

/// Heads in the outermost (first two / last two) attention layers.
pub const OUTER_LAYER_HEADS: usize = 6;

/// Heads in the inner attention layers.
pub const INNER_LAYER_HEADS: usize = 12;

/// Look up a layer name by index in canonical network order.
pub fn layer_name(index: usize) -> Option<&'static str> {
    ATTENTION_LAYER_NAMES.get(index).copied()
}

/// Filesystem-safe form of a layer name: path separators become
/// underscores so the name is a valid single-level directory.
pub fn safe_layer_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// Head count for a layer, determined by its position in the network.
///
/// The first two and last two layers run 6 heads, all others 12. This
/// is a property of the model architecture and deliberately not read
/// from the tensor shape, which upstream extraction may already have
/// truncated.
pub fn head_count(layer_index: usize, total_layers: usize) -> TilesResult<usize> {
    if layer_index >= total_layers {
        return Err(TilesError::LayerIndexOutOfRange {
            index: layer_index,
            total: total_layers,
        });
    }
    if layer_index < 2 || layer_index >= total_layers - 2 {
        Ok(OUTER_LAYER_HEADS)
    } else {
        Ok(INNER_LAYER_HEADS)
    }
}
