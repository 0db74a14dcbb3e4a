//! Broadcast shape computation.
//!
//! Generalizes pairwise NumPy-style broadcasting to arbitrarily many
//! simultaneous operands: shapes are right-aligned, missing leading
//! dimensions count as 1, and a dimension of 1 stretches to match any
//! other size.

use crate::{EngineError, Result};

/// Combine `M` input shapes into one broadcast shape.
///
/// The output rank is the maximum input rank. For each output position the
/// contributing dimension of a shorter shape is an implicit 1. Two sizes
/// are compatible when they are equal or one of them is 1.
///
/// No inputs yield an empty shape; a single input is returned as-is (the
/// output never aliases an input). On failure the result carries no
/// partial shape; callers must discard the call entirely.
///
/// # Errors
/// Returns [`EngineError::Shape`] when any position holds two differing
/// sizes, neither of which is 1.
///
/// # Example
/// ```
/// use strided_dispatch::broadcast_shapes;
///
/// let out = broadcast_shapes(&[&[8, 1, 6, 1], &[7, 1, 5]]).unwrap();
/// assert_eq!(out, vec![8, 7, 6, 5]);
/// ```
pub fn broadcast_shapes(shapes: &[&[usize]]) -> Result<Vec<usize>> {
    let rank = shapes.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut out = vec![1usize; rank];

    // right alignment: walk output positions from the last to the first
    for i in (0..rank).rev() {
        let mut dim = 1usize;
        for shape in shapes {
            // contributing dimension, implicit 1 for shorter shapes
            let j = (shape.len() + i) as isize - rank as isize;
            let d = if j >= 0 { shape[j as usize] } else { 1 };

            if dim == 1 {
                dim = d;
            } else if d != 1 && d != dim {
                return Err(EngineError::Shape {
                    shapes: shapes.iter().map(|s| s.to_vec()).collect(),
                });
            }
        }
        out[i] = dim;
    }
    Ok(out)
}
