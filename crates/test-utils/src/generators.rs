//! Synthetic array generators and `.npy` fixture writers.

use std::path::Path;

use ndarray::{ArrayD, IxDyn};
use npyz::WriterBuilder;

/// An array whose value at each position is its row-major flat index.
///
/// Makes slicing/shifting tests self-describing: the value tells you
/// exactly which source element landed where.
pub fn gradient_array(shape: &[usize]) -> ArrayD<f32> {
    let len: usize = shape.iter().product();
    let values: Vec<f32> = (0..len).map(|i| i as f32).collect();
    ArrayD::from_shape_vec(IxDyn(shape), values).expect("shape/len mismatch in generator")
}

/// Write a C-order float32 `.npy` file.
pub fn write_npy_f32(path: &Path, shape: &[u64], values: &[f32]) {
    let mut bytes = Vec::new();
    {
        let mut writer = npyz::WriteOptions::new()
            .default_dtype()
            .shape(shape)
            .writer(&mut bytes)
            .begin_nd()
            .expect("begin .npy write");
        writer
            .extend(values.iter().copied())
            .expect("write .npy values");
        writer.finish().expect("finish .npy write");
    }
    std::fs::write(path, bytes).expect("write .npy file");
}

/// Write a C-order float64 `.npy` file (for dtype-narrowing tests).
pub fn write_npy_f64(path: &Path, shape: &[u64], values: &[f64]) {
    let mut bytes = Vec::new();
    {
        let mut writer = npyz::WriteOptions::new()
            .default_dtype()
            .shape(shape)
            .writer(&mut bytes)
            .begin_nd()
            .expect("begin .npy write");
        writer
            .extend(values.iter().copied())
            .expect("write .npy values");
        writer.finish().expect("finish .npy write");
    }
    std::fs::write(path, bytes).expect("write .npy file");
}

/// Write a gradient-valued float32 `.npy` file and return its values.
pub fn write_gradient_npy(path: &Path, shape: &[u64]) -> Vec<f32> {
    let len: usize = shape.iter().map(|&d| d as usize).product();
    let values: Vec<f32> = (0..len).map(|i| i as f32).collect();
    write_npy_f32(path, shape, &values);
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_array_values() {
        let array = gradient_array(&[2, 3]);
        assert_eq!(array[[0, 0]], 0.0);
        assert_eq!(array[[1, 2]], 5.0);
    }
}
