//! Strided execution core.
//!
//! Loop drivers that apply a callback over logically corresponding
//! elements of strided views, one driver per arity (`nullary` through
//! `quinary`, matching the native kernel family of the original layer),
//! plus a masked unary variant.
//!
//! Setup happens once per call: each view's start index already accounts
//! for a negative stride, so the hot loop adds `+stride` unconditionally
//! every iteration. A stride of exactly 0 receives no adjustment and
//! repeats the same slot (degenerate length-1 broadcast). Element `i` is
//! always processed strictly before `i+1`; kernels relying on
//! left-to-right accumulation depend on this.
//!
//! Operand lengths must agree; each driver verifies that once per call
//! and returns a shape error on disagreement. No per-element bounds
//! checking happens here: view constructors validated
//! `start_index + i*stride` for every `i < len`, and per-element checks
//! would dominate the cost of trivial kernels.

use crate::view::{StridedView, StridedViewMut};
use crate::{EngineError, Result};

/// One O(1) check per call: every input length must equal the output
/// length. The unchecked loads below are only sound under this.
fn check_lengths(input_lens: &[usize], n: usize) -> Result<()> {
    if input_lens.iter().any(|&l| l != n) {
        let mut shapes: Vec<Vec<usize>> = input_lens.iter().map(|&l| vec![l]).collect();
        shapes.push(vec![n]);
        return Err(EngineError::Shape { shapes });
    }
    Ok(())
}

/// Fill `z` from a callback taking no inputs.
pub fn nullary<Z, F>(z: &mut StridedViewMut<'_, Z>, mut f: F)
where
    Z: Copy,
    F: FnMut() -> Z,
{
    let n = z.len();
    if n == 0 {
        return;
    }
    let sz = z.stride();
    let mut pz = z.start_index() as isize;
    for _ in 0..n {
        // Safety: pz walks start_index + i*stride, validated at construction
        unsafe { z.store_at(pz as usize, f()) };
        pz += sz;
    }
}

/// Apply `f` element-wise from `x` into `z`.
///
/// # Errors
/// [`EngineError::Shape`] if `x.len() != z.len()`.
pub fn unary<X, Z, F>(x: &StridedView<'_, X>, z: &mut StridedViewMut<'_, Z>, mut f: F) -> Result<()>
where
    X: Copy,
    Z: Copy,
    F: FnMut(X) -> Z,
{
    let n = z.len();
    check_lengths(&[x.len()], n)?;
    if n == 0 {
        return Ok(());
    }
    let (sx, sz) = (x.stride(), z.stride());
    let mut px = x.start_index() as isize;
    let mut pz = z.start_index() as isize;
    for _ in 0..n {
        // Safety: positions walk start_index + i*stride, validated at construction
        let out = f(unsafe { x.load_at(px as usize) });
        unsafe { z.store_at(pz as usize, out) };
        px += sx;
        pz += sz;
    }
    Ok(())
}

/// Apply `f` element-wise from `x` and `y` into `z`.
///
/// # Errors
/// [`EngineError::Shape`] on any operand length disagreement.
pub fn binary<X, Y, Z, F>(
    x: &StridedView<'_, X>,
    y: &StridedView<'_, Y>,
    z: &mut StridedViewMut<'_, Z>,
    mut f: F,
) -> Result<()>
where
    X: Copy,
    Y: Copy,
    Z: Copy,
    F: FnMut(X, Y) -> Z,
{
    let n = z.len();
    check_lengths(&[x.len(), y.len()], n)?;
    if n == 0 {
        return Ok(());
    }
    let (sx, sy, sz) = (x.stride(), y.stride(), z.stride());
    let mut px = x.start_index() as isize;
    let mut py = y.start_index() as isize;
    let mut pz = z.start_index() as isize;
    for _ in 0..n {
        // Safety: positions walk start_index + i*stride, validated at construction
        let out = f(unsafe { x.load_at(px as usize) }, unsafe {
            y.load_at(py as usize)
        });
        unsafe { z.store_at(pz as usize, out) };
        px += sx;
        py += sy;
        pz += sz;
    }
    Ok(())
}

/// Apply `f` element-wise from three inputs into `z`.
///
/// # Errors
/// [`EngineError::Shape`] on any operand length disagreement.
pub fn ternary<X1, X2, X3, Z, F>(
    x1: &StridedView<'_, X1>,
    x2: &StridedView<'_, X2>,
    x3: &StridedView<'_, X3>,
    z: &mut StridedViewMut<'_, Z>,
    mut f: F,
) -> Result<()>
where
    X1: Copy,
    X2: Copy,
    X3: Copy,
    Z: Copy,
    F: FnMut(X1, X2, X3) -> Z,
{
    let n = z.len();
    check_lengths(&[x1.len(), x2.len(), x3.len()], n)?;
    if n == 0 {
        return Ok(());
    }
    let (s1, s2, s3, sz) = (x1.stride(), x2.stride(), x3.stride(), z.stride());
    let mut p1 = x1.start_index() as isize;
    let mut p2 = x2.start_index() as isize;
    let mut p3 = x3.start_index() as isize;
    let mut pz = z.start_index() as isize;
    for _ in 0..n {
        // Safety: positions walk start_index + i*stride, validated at construction
        let out = unsafe {
            f(
                x1.load_at(p1 as usize),
                x2.load_at(p2 as usize),
                x3.load_at(p3 as usize),
            )
        };
        unsafe { z.store_at(pz as usize, out) };
        p1 += s1;
        p2 += s2;
        p3 += s3;
        pz += sz;
    }
    Ok(())
}

/// Apply `f` element-wise from four inputs into `z`.
///
/// # Errors
/// [`EngineError::Shape`] on any operand length disagreement.
#[allow(clippy::too_many_arguments)]
pub fn quaternary<X1, X2, X3, X4, Z, F>(
    x1: &StridedView<'_, X1>,
    x2: &StridedView<'_, X2>,
    x3: &StridedView<'_, X3>,
    x4: &StridedView<'_, X4>,
    z: &mut StridedViewMut<'_, Z>,
    mut f: F,
) -> Result<()>
where
    X1: Copy,
    X2: Copy,
    X3: Copy,
    X4: Copy,
    Z: Copy,
    F: FnMut(X1, X2, X3, X4) -> Z,
{
    let n = z.len();
    check_lengths(&[x1.len(), x2.len(), x3.len(), x4.len()], n)?;
    if n == 0 {
        return Ok(());
    }
    let (s1, s2, s3, s4, sz) = (
        x1.stride(),
        x2.stride(),
        x3.stride(),
        x4.stride(),
        z.stride(),
    );
    let mut p1 = x1.start_index() as isize;
    let mut p2 = x2.start_index() as isize;
    let mut p3 = x3.start_index() as isize;
    let mut p4 = x4.start_index() as isize;
    let mut pz = z.start_index() as isize;
    for _ in 0..n {
        // Safety: positions walk start_index + i*stride, validated at construction
        let out = unsafe {
            f(
                x1.load_at(p1 as usize),
                x2.load_at(p2 as usize),
                x3.load_at(p3 as usize),
                x4.load_at(p4 as usize),
            )
        };
        unsafe { z.store_at(pz as usize, out) };
        p1 += s1;
        p2 += s2;
        p3 += s3;
        p4 += s4;
        pz += sz;
    }
    Ok(())
}

/// Apply `f` element-wise from five inputs into `z`.
///
/// # Errors
/// [`EngineError::Shape`] on any operand length disagreement.
#[allow(clippy::too_many_arguments)]
pub fn quinary<X1, X2, X3, X4, X5, Z, F>(
    x1: &StridedView<'_, X1>,
    x2: &StridedView<'_, X2>,
    x3: &StridedView<'_, X3>,
    x4: &StridedView<'_, X4>,
    x5: &StridedView<'_, X5>,
    z: &mut StridedViewMut<'_, Z>,
    mut f: F,
) -> Result<()>
where
    X1: Copy,
    X2: Copy,
    X3: Copy,
    X4: Copy,
    X5: Copy,
    Z: Copy,
    F: FnMut(X1, X2, X3, X4, X5) -> Z,
{
    let n = z.len();
    check_lengths(&[x1.len(), x2.len(), x3.len(), x4.len(), x5.len()], n)?;
    if n == 0 {
        return Ok(());
    }
    let (s1, s2, s3, s4, s5, sz) = (
        x1.stride(),
        x2.stride(),
        x3.stride(),
        x4.stride(),
        x5.stride(),
        z.stride(),
    );
    let mut p1 = x1.start_index() as isize;
    let mut p2 = x2.start_index() as isize;
    let mut p3 = x3.start_index() as isize;
    let mut p4 = x4.start_index() as isize;
    let mut p5 = x5.start_index() as isize;
    let mut pz = z.start_index() as isize;
    for _ in 0..n {
        // Safety: positions walk start_index + i*stride, validated at construction
        let out = unsafe {
            f(
                x1.load_at(p1 as usize),
                x2.load_at(p2 as usize),
                x3.load_at(p3 as usize),
                x4.load_at(p4 as usize),
                x5.load_at(p5 as usize),
            )
        };
        unsafe { z.store_at(pz as usize, out) };
        p1 += s1;
        p2 += s2;
        p3 += s3;
        p4 += s4;
        p5 += s5;
        pz += sz;
    }
    Ok(())
}

/// Apply `f` element-wise from `x` into `z`, skipping elements whose mask
/// value is truthy (nonzero). Skipped positions leave `z` untouched; all
/// positions still advance by their stride.
///
/// # Errors
/// [`EngineError::Shape`] on any operand length disagreement.
pub fn unary_masked<X, Z, F>(
    x: &StridedView<'_, X>,
    mask: &StridedView<'_, u8>,
    z: &mut StridedViewMut<'_, Z>,
    mut f: F,
) -> Result<()>
where
    X: Copy,
    Z: Copy,
    F: FnMut(X) -> Z,
{
    let n = z.len();
    check_lengths(&[x.len(), mask.len()], n)?;
    if n == 0 {
        return Ok(());
    }
    let (sx, sm, sz) = (x.stride(), mask.stride(), z.stride());
    let mut px = x.start_index() as isize;
    let mut pm = mask.start_index() as isize;
    let mut pz = z.start_index() as isize;
    for _ in 0..n {
        // Safety: positions walk start_index + i*stride, validated at construction
        unsafe {
            if mask.load_at(pm as usize) == 0 {
                let out = f(x.load_at(px as usize));
                z.store_at(pz as usize, out);
            }
        }
        px += sx;
        pm += sm;
        pz += sz;
    }
    Ok(())
}
