//! Half-window circular shift, producing the overlapping "shifted"
//! tiling grid.

use ndarray::{ArrayD, Axis, Slice};

use crate::field::GridField;

/// Circularly roll `data` along `axis` so that element `i` of the
/// result comes from element `(i - amount) mod len` of the input.
fn roll_axis(data: &ArrayD<f32>, axis: Axis, amount: usize) -> ArrayD<f32> {
    let len = data.len_of(axis);
    if len == 0 {
        return data.clone();
    }
    let amount = amount % len;
    if amount == 0 {
        return data.clone();
    }
    let split = (len - amount) as isize;
    let mut out = data.clone();
    out.slice_axis_mut(axis, Slice::from(amount as isize..))
        .assign(&data.slice_axis(axis, Slice::from(..split)));
    out.slice_axis_mut(axis, Slice::from(..amount as isize))
        .assign(&data.slice_axis(axis, Slice::from(split..)));
    out
}

/// Shift a field by half a window in each spatial axis (wrap-around).
///
/// The shift targets the last two axes, which are latitude and
/// longitude for every layout in this pipeline. Shift amounts use
/// integer division, so odd chunk sizes shift by one less than half.
/// Tiling the shifted field yields a grid whose tile boundaries fall
/// at the midpoints of the unshifted grid's tiles.
pub fn shift(field: &GridField, chunk_lat: usize, chunk_lon: usize) -> GridField {
    let ndim = field.ndim();
    debug_assert!(ndim >= 2, "shift requires two spatial axes");
    let rolled = roll_axis(field.data(), Axis(ndim - 2), chunk_lat / 2);
    let rolled = roll_axis(&rolled, Axis(ndim - 1), chunk_lon / 2);
    GridField::new(rolled)
}
