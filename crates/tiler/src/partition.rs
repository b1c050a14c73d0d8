//! Rectangular partitioning of a field's last two axes.

use ndarray::{ArrayD, Slice};

use crate::field::GridField;
use tiles_common::{TilesError, TilesResult};

/// One rectangular spatial slice of a field.
///
/// `data` keeps all leading (channel) axes of the source; the spatial
/// slice is clamped at the bottom/right edge, so boundary tiles may be
/// smaller than the nominal chunk size.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub origin_lat: usize,
    pub origin_lon: usize,
    pub data: ArrayD<f32>,
}

impl Tile {
    /// Latitude extent of this tile.
    pub fn height(&self) -> usize {
        self.data.shape()[self.data.ndim() - 2]
    }

    /// Longitude extent of this tile.
    pub fn width(&self) -> usize {
        self.data.shape()[self.data.ndim() - 1]
    }

    /// Tile file name under a config's `map/` directory.
    pub fn map_filename(&self, field_label: &str) -> String {
        format!("{}_{}_{}.bin", field_label, self.origin_lat, self.origin_lon)
    }
}

/// Number of tiles along one axis: `ceil(extent / chunk)`.
pub fn tile_count(extent: usize, chunk: usize) -> usize {
    (extent + chunk - 1) / chunk
}

/// Enumerate the tiles of `field` under a `chunk_lat` x `chunk_lon`
/// window, latitude outer, longitude inner.
///
/// The union of the emitted tiles covers the spatial extent exactly,
/// with no overlap, padding, or dropped edge.
pub fn partition(
    field: &GridField,
    chunk_lat: usize,
    chunk_lon: usize,
) -> TilesResult<TilePartition<'_>> {
    if chunk_lat == 0 || chunk_lon == 0 {
        return Err(TilesError::InvalidConfiguration(format!(
            "chunk size must be positive, got {chunk_lat}x{chunk_lon}"
        )));
    }
    if field.ndim() < 2 {
        return Err(TilesError::InvalidConfiguration(format!(
            "field must have at least 2 spatial axes, got shape {:?}",
            field.shape()
        )));
    }
    Ok(TilePartition {
        field,
        chunk_lat,
        chunk_lon,
        next_lat: 0,
        next_lon: 0,
    })
}

/// Lazy tile iterator returned by [`partition`].
///
/// Deterministic given the same field and chunk sizes; re-running
/// regenerates identical tiles.
#[derive(Debug)]
pub struct TilePartition<'a> {
    field: &'a GridField,
    chunk_lat: usize,
    chunk_lon: usize,
    next_lat: usize,
    next_lon: usize,
}

impl Iterator for TilePartition<'_> {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        let height = self.field.height();
        let width = self.field.width();
        if self.next_lat >= height || width == 0 {
            return None;
        }

        let origin_lat = self.next_lat;
        let origin_lon = self.next_lon;
        let lat_end = (origin_lat + self.chunk_lat).min(height);
        let lon_end = (origin_lon + self.chunk_lon).min(width);

        let ndim = self.field.ndim();
        let data = self
            .field
            .data()
            .slice_each_axis(|ax| {
                if ax.axis.index() == ndim - 2 {
                    Slice::from(origin_lat..lat_end)
                } else if ax.axis.index() == ndim - 1 {
                    Slice::from(origin_lon..lon_end)
                } else {
                    Slice::from(..)
                }
            })
            .to_owned();

        self.next_lon += self.chunk_lon;
        if self.next_lon >= width {
            self.next_lon = 0;
            self.next_lat += self.chunk_lat;
        }

        Some(Tile {
            origin_lat,
            origin_lon,
            data,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let height = self.field.height();
        let width = self.field.width();
        if self.next_lat >= height || width == 0 {
            return (0, Some(0));
        }
        let rows_left = tile_count(height - self.next_lat, self.chunk_lat);
        let cols = tile_count(width, self.chunk_lon);
        let done_in_row = self.next_lon / self.chunk_lon;
        let remaining = rows_left * cols - done_in_row;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TilePartition<'_> {}
