//! Loading `.npy` input arrays produced by the download/inference
//! collaborators.

use std::fs;
use std::path::Path;

use ndarray::{ArrayD, IxDyn};
use npyz::NpyFile;

use crate::field::{AttentionTensor, GridField};
use tiles_common::{TilesError, TilesResult};

/// Read a `.npy` file into a dynamic f32 array.
///
/// Accepts float32 and float64 payloads (float64 is narrowed), since
/// NumPy saves default to float64 when the producer forgets an
/// explicit `astype`. Fortran-order files are rejected: every producer
/// in the pipeline writes C order, and the raw tile format depends on
/// row-major layout.
pub fn load_array(path: &Path) -> TilesResult<ArrayD<f32>> {
    if !path.is_file() {
        return Err(TilesError::MissingInput(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|e| TilesError::io(path, e))?;
    let npy = NpyFile::new(&bytes[..]).map_err(|e| TilesError::io(path, e))?;

    let shape: Vec<usize> = npy.shape().iter().map(|&d| d as usize).collect();
    if npy.order() != npyz::Order::C {
        return Err(TilesError::shape_mismatch(
            "C-order array",
            format!("Fortran-order array in {}", path.display()),
        ));
    }

    let dtype = match npy.dtype() {
        npyz::DType::Plain(ts) => ts.to_string(),
        other => {
            return Err(TilesError::shape_mismatch(
                "plain float array",
                format!("dtype {other:?} in {}", path.display()),
            ))
        }
    };
    let data: Vec<f32> = if dtype.ends_with("f4") {
        npy.into_vec::<f32>().map_err(|e| TilesError::io(path, e))?
    } else if dtype.ends_with("f8") {
        npy.into_vec::<f64>()
            .map_err(|e| TilesError::io(path, e))?
            .into_iter()
            .map(|v| v as f32)
            .collect()
    } else {
        return Err(TilesError::shape_mismatch(
            "float32 or float64 array",
            format!("dtype {dtype} in {}", path.display()),
        ));
    };

    ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|e| {
        TilesError::shape_mismatch(format!("array of shape {shape:?}"), e.to_string())
    })
}

/// Load a surface or upper-air field.
pub fn load_grid_field(path: &Path) -> TilesResult<GridField> {
    Ok(GridField::new(load_array(path)?))
}

/// Load a 5-D attention tensor.
pub fn load_attention_tensor(path: &Path) -> TilesResult<AttentionTensor> {
    AttentionTensor::new(load_array(path)?)
}
