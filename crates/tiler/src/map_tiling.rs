//! Map tiling driver: one field, many window configurations.

use tracing::debug;

use crate::field::GridField;
use crate::partition::partition;
use crate::shift::shift;
use crate::store::TileStore;
use tiles_common::{TilesResult, TimeSlot, WindowConfig};

/// Tile `field` under each window configuration and write the tiles
/// into the store.
///
/// Per config: optionally apply the half-window shift, partition, then
/// write every tile to
/// `{config.label}/map/{field_label}_{origin_lat}_{origin_lon}.bin`.
/// Shifted configs address tiles by their origin on the post-shift
/// grid. Upper-air fields are handled by calling this once per
/// pressure level with level-tagged config labels.
pub fn tile_map(
    store: &TileStore,
    slot: &TimeSlot,
    field: &GridField,
    field_label: &str,
    configs: &[WindowConfig],
) -> TilesResult<()> {
    for config in configs {
        config.validate()?;

        let shifted_field;
        let source = if config.shifted {
            shifted_field = shift(field, config.chunk_lat, config.chunk_lon);
            &shifted_field
        } else {
            field
        };

        let dir = store.map_dir(slot, &config.label);
        let mut tiles_written = 0usize;
        for tile in partition(source, config.chunk_lat, config.chunk_lon)? {
            store.write_tile(&dir, &tile.map_filename(field_label), &tile.data)?;
            tiles_written += 1;
        }
        debug!(
            config = %config.label,
            field = field_label,
            tiles = tiles_written,
            "wrote map tiles"
        );
    }
    Ok(())
}
