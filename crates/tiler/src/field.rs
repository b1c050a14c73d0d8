//! Array types for gridded fields and attention tensors.

use ndarray::{Array2, ArrayD, Axis, Ix5};

use tiles_common::{TilesError, TilesResult};

/// An N-D field whose last two axes are latitude and longitude.
///
/// Leading axes (channels, and for upper-air fields a pressure-level
/// axis) are carried through tiling untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct GridField {
    data: ArrayD<f32>,
}

impl GridField {
    pub fn new(data: ArrayD<f32>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &ArrayD<f32> {
        &self.data
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Latitude extent (second-to-last axis).
    ///
    /// Requires at least two axes; callers validate via `partition`.
    pub fn height(&self) -> usize {
        self.data.shape()[self.data.ndim() - 2]
    }

    /// Longitude extent (last axis).
    pub fn width(&self) -> usize {
        self.data.shape()[self.data.ndim() - 1]
    }

    /// Extract one pressure level of a 4-D upper-air field
    /// `[C, L, H, W]` as an independent 3-D field `[C, H, W]`.
    pub fn level(&self, level: usize) -> TilesResult<GridField> {
        if self.data.ndim() != 4 {
            return Err(TilesError::shape_mismatch(
                "4-D upper-air field [C, L, H, W]",
                format!("{}-D array {:?}", self.data.ndim(), self.data.shape()),
            ));
        }
        let levels = self.data.shape()[1];
        if level >= levels {
            return Err(TilesError::InvalidConfiguration(format!(
                "pressure level {level} out of range (field has {levels} levels)"
            )));
        }
        Ok(GridField::new(
            self.data.index_axis(Axis(1), level).to_owned(),
        ))
    }
}

/// A per-layer attention tensor
/// `[window_lon, window_lat_or_pressure, head, query, key]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttentionTensor {
    data: ndarray::Array5<f32>,
}

impl AttentionTensor {
    /// Wrap a dynamic array, requiring exactly five axes.
    pub fn new(data: ArrayD<f32>) -> TilesResult<Self> {
        let shape = data.shape().to_vec();
        let data = data.into_dimensionality::<Ix5>().map_err(|_| {
            TilesError::shape_mismatch(
                "5-D attention tensor [win_lon, win_lat_pl, head, query, key]",
                format!("{}-D array {:?}", shape.len(), shape),
            )
        })?;
        Ok(Self { data })
    }

    /// Longitude-window count (axis 0).
    pub fn window_lon(&self) -> usize {
        self.data.shape()[0]
    }

    /// Latitude/pressure-window count (axis 1).
    pub fn window_lat_pl(&self) -> usize {
        self.data.shape()[1]
    }

    /// Head count actually present in the tensor (axis 2).
    ///
    /// Only used to validate against the position-based rule, never to
    /// decide how many heads to emit.
    pub fn heads(&self) -> usize {
        self.data.shape()[2]
    }

    /// The `(query, key)` slice for one window/head address.
    pub fn slice(&self, win_lon: usize, win_lat_pl: usize, head: usize) -> Array2<f32> {
        self.data
            .index_axis(Axis(0), win_lon)
            .index_axis(Axis(0), win_lat_pl)
            .index_axis(Axis(0), head)
            .to_owned()
    }
}
