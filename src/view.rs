//! One-dimensional strided views over borrowed buffers.
//!
//! A [`StridedView`] describes a logical sequence of `len` elements
//! addressed with a fixed element stride, possibly reversed (negative
//! stride) or degenerate (zero stride repeats one slot). Views never own
//! memory and are immutable for the duration of one call.
//!
//! The constructor performs the engine's one bounds check: every address
//! the view can produce lies inside the borrowed buffer. Downstream hot
//! loops rely on that invariant instead of checking per element.

use crate::dtype::{DataType, Element};
use crate::{EngineError, Result};

/// Validate that `offset + i*stride` stays inside `data_len` for every
/// logical index `i < len`.
///
/// For a negative stride the base `offset` addresses the start of the
/// spanned region and logical index 0 lives at `offset + (len-1)*|stride|`,
/// so the extremes are `offset` and `offset + (len-1)*|stride|` for every
/// stride sign.
fn check_bounds(data_len: usize, offset: usize, stride: isize, len: usize) -> Result<()> {
    if len == 0 {
        return Ok(());
    }
    // checked arithmetic: a wrapped product must not admit a view that
    // the unchecked hot loops would then walk out of bounds
    let max = (len - 1)
        .checked_mul(stride.unsigned_abs())
        .and_then(|span| offset.checked_add(span));
    match max {
        Some(max) if max < data_len => Ok(()),
        _ => Err(EngineError::Bounds {
            argument: 0,
            min: offset,
            max: max.unwrap_or(usize::MAX),
            len: data_len,
        }),
    }
}

/// Derived start index: the buffer position of logical element 0.
#[inline]
fn start_index(offset: usize, stride: isize, len: usize) -> usize {
    if stride < 0 && len > 0 {
        offset + (len - 1) * stride.unsigned_abs()
    } else {
        offset
    }
}

/// An immutable 1-D strided view.
#[derive(Debug, Clone, Copy)]
pub struct StridedView<'a, T> {
    data: &'a [T],
    offset: usize,
    stride: isize,
    len: usize,
}

impl<'a, T> StridedView<'a, T> {
    /// Create a new view over `data`.
    ///
    /// `offset` addresses the start of the spanned region; for a negative
    /// `stride` the logical sequence begins at the region's far end.
    ///
    /// # Errors
    /// Returns [`EngineError::Bounds`] if the view would reach outside
    /// `data`.
    pub fn new(data: &'a [T], offset: usize, stride: isize, len: usize) -> Result<Self> {
        check_bounds(data.len(), offset, stride, len)?;
        Ok(Self {
            data,
            offset,
            stride,
            len,
        })
    }

    /// View covering all of `data` contiguously (offset 0, stride 1).
    #[inline]
    pub fn from_slice(data: &'a [T]) -> Self {
        Self {
            offset: 0,
            stride: 1,
            len: data.len(),
            data,
        }
    }

    /// Number of logical elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the view has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element stride.
    #[inline]
    pub fn stride(&self) -> isize {
        self.stride
    }

    /// Base offset into the buffer (start of the spanned region).
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The underlying buffer.
    #[inline]
    pub fn data(&self) -> &'a [T] {
        self.data
    }

    /// Buffer position of logical element `i`.
    #[inline]
    pub fn index_of(&self, i: usize) -> usize {
        debug_assert!(i < self.len);
        (start_index(self.offset, self.stride, self.len) as isize + i as isize * self.stride)
            as usize
    }

    /// Buffer position of logical element 0.
    #[inline]
    pub fn start_index(&self) -> usize {
        start_index(self.offset, self.stride, self.len)
    }

    /// Re-span the same buffer with a different stride and length,
    /// revalidating bounds. Used for stride-0 broadcasting.
    pub fn restride(&self, stride: isize, len: usize) -> Result<Self> {
        Self::new(self.data, self.offset, stride, len)
    }
}

impl<'a, T: Copy> StridedView<'a, T> {
    /// Logical element `i`.
    ///
    /// # Panics
    /// Panics if `i >= len`.
    #[inline]
    pub fn get(&self, i: usize) -> T {
        assert!(i < self.len, "index out of bounds");
        self.data[self.index_of(i)]
    }

    /// Logical element `i` without the index assertion.
    ///
    /// # Safety
    /// `i` must be less than `len`. The buffer access itself is within
    /// bounds for any such `i` by the constructor invariant.
    #[inline]
    pub unsafe fn get_unchecked(&self, i: usize) -> T {
        let idx =
            (start_index(self.offset, self.stride, self.len) as isize + i as isize * self.stride)
                as usize;
        *self.data.get_unchecked(idx)
    }

    /// Iterate the logical sequence in order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    /// Load by raw buffer position. Hot-loop primitive: positions are
    /// maintained additively from [`StridedView::start_index`].
    ///
    /// # Safety
    /// `idx` must be a position this view can produce, which the
    /// constructor bounds check guarantees for `start_index + i*stride`
    /// with `i < len`.
    #[inline]
    pub(crate) unsafe fn load_at(&self, idx: usize) -> T {
        *self.data.get_unchecked(idx)
    }
}

impl<'a, T: Element> StridedView<'a, T> {
    /// Runtime tag of the element type.
    #[inline]
    pub fn dtype(&self) -> DataType {
        T::DTYPE
    }

    /// Element stride scaled to bytes.
    #[inline]
    pub fn stride_bytes(&self) -> isize {
        self.stride * T::DTYPE.size() as isize
    }
}

/// A mutable 1-D strided view.
#[derive(Debug)]
pub struct StridedViewMut<'a, T> {
    data: &'a mut [T],
    offset: usize,
    stride: isize,
    len: usize,
}

impl<'a, T> StridedViewMut<'a, T> {
    /// Create a new mutable view over `data`.
    ///
    /// # Errors
    /// Returns [`EngineError::Bounds`] if the view would reach outside
    /// `data`.
    pub fn new(data: &'a mut [T], offset: usize, stride: isize, len: usize) -> Result<Self> {
        check_bounds(data.len(), offset, stride, len)?;
        Ok(Self {
            data,
            offset,
            stride,
            len,
        })
    }

    /// View covering all of `data` contiguously (offset 0, stride 1).
    #[inline]
    pub fn from_slice(data: &'a mut [T]) -> Self {
        Self {
            offset: 0,
            stride: 1,
            len: data.len(),
            data,
        }
    }

    /// Number of logical elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the view has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element stride.
    #[inline]
    pub fn stride(&self) -> isize {
        self.stride
    }

    /// Base offset into the buffer (start of the spanned region).
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Buffer position of logical element `i`.
    #[inline]
    pub fn index_of(&self, i: usize) -> usize {
        debug_assert!(i < self.len);
        (start_index(self.offset, self.stride, self.len) as isize + i as isize * self.stride)
            as usize
    }

    /// Buffer position of logical element 0.
    #[inline]
    pub fn start_index(&self) -> usize {
        start_index(self.offset, self.stride, self.len)
    }

    /// Reborrow as an immutable view.
    #[inline]
    pub fn as_view(&self) -> StridedView<'_, T> {
        StridedView {
            data: self.data,
            offset: self.offset,
            stride: self.stride,
            len: self.len,
        }
    }
}

impl<'a, T: Copy> StridedViewMut<'a, T> {
    /// Logical element `i`.
    ///
    /// # Panics
    /// Panics if `i >= len`.
    #[inline]
    pub fn get(&self, i: usize) -> T {
        assert!(i < self.len, "index out of bounds");
        self.data[self.index_of(i)]
    }

    /// Store `value` at logical element `i`.
    ///
    /// # Panics
    /// Panics if `i >= len`.
    #[inline]
    pub fn set(&mut self, i: usize, value: T) {
        assert!(i < self.len, "index out of bounds");
        let idx = self.index_of(i);
        self.data[idx] = value;
    }

    /// Store `value` at logical element `i` without the index assertion.
    ///
    /// # Safety
    /// `i` must be less than `len`. The buffer access itself is within
    /// bounds for any such `i` by the constructor invariant.
    #[inline]
    pub unsafe fn set_unchecked(&mut self, i: usize, value: T) {
        let idx =
            (start_index(self.offset, self.stride, self.len) as isize + i as isize * self.stride)
                as usize;
        *self.data.get_unchecked_mut(idx) = value;
    }

    /// Store by raw buffer position. Hot-loop primitive: positions are
    /// maintained additively from [`StridedViewMut::start_index`].
    ///
    /// # Safety
    /// `idx` must be a position this view can produce, which the
    /// constructor bounds check guarantees for `start_index + i*stride`
    /// with `i < len`.
    #[inline]
    pub(crate) unsafe fn store_at(&mut self, idx: usize, value: T) {
        *self.data.get_unchecked_mut(idx) = value;
    }
}

impl<'a, T: Element> StridedViewMut<'a, T> {
    /// Runtime tag of the element type.
    #[inline]
    pub fn dtype(&self) -> DataType {
        T::DTYPE
    }

    /// Element stride scaled to bytes.
    #[inline]
    pub fn stride_bytes(&self) -> isize {
        self.stride * T::DTYPE.size() as isize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_view() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        let v = StridedView::new(&data, 0, 1, 4).unwrap();
        assert_eq!(v.len(), 4);
        assert_eq!(v.get(0), 1.0);
        assert_eq!(v.get(3), 4.0);
        assert_eq!(v.iter().collect::<Vec<_>>(), data);
    }

    #[test]
    fn test_strided_view() {
        let data = vec![1, 2, 3, 4, 5, 6];
        // every other element starting at 1
        let v = StridedView::new(&data, 1, 2, 3).unwrap();
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![2, 4, 6]);
    }

    #[test]
    fn test_negative_stride_reverses() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let v = StridedView::new(&data, 0, -1, 5).unwrap();
        assert_eq!(v.start_index(), 4);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![5.0, 4.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_zero_stride_repeats() {
        let data = vec![7.0, 8.0];
        let v = StridedView::new(&data, 1, 0, 4).unwrap();
        assert_eq!(v.start_index(), 1);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![8.0; 4]);
    }

    #[test]
    fn test_bounds_rejected() {
        let data = vec![0u8; 4];
        assert!(StridedView::new(&data, 0, 1, 5).is_err());
        assert!(StridedView::new(&data, 2, 2, 2).is_err());
        assert!(StridedView::new(&data, 4, 1, 1).is_err());
        // negative stride spans offset..offset+(len-1)*|s|
        assert!(StridedView::new(&data, 1, -2, 3).is_err());
        assert!(StridedView::new(&data, 0, -1, 4).is_ok());
    }

    #[test]
    fn test_overflowing_extent_rejected() {
        let data = vec![0u8; 4];
        // (len-1) * |stride| wraps; must reject, not accept via wrapping
        assert!(StridedView::new(&data, 0, 2, usize::MAX / 2 + 2).is_err());
        assert!(StridedView::new(&data, usize::MAX, 1, 1).is_err());
        assert!(StridedView::new(&data, 1, isize::MIN, 2).is_err());
    }

    #[test]
    fn test_empty_view_always_valid() {
        let data: Vec<f64> = vec![];
        let v = StridedView::new(&data, 0, 1, 0).unwrap();
        assert!(v.is_empty());
        assert_eq!(v.iter().count(), 0);
    }

    #[test]
    fn test_mutable_set_with_stride() {
        let mut data = vec![0i32; 6];
        let mut v = StridedViewMut::new(&mut data, 0, 2, 3).unwrap();
        v.set(0, 10);
        v.set(1, 20);
        v.set(2, 30);
        assert_eq!(data, vec![10, 0, 20, 0, 30, 0]);
    }

    #[test]
    fn test_restride() {
        let data = vec![5.0];
        let v = StridedView::new(&data, 0, 1, 1).unwrap();
        let b = v.restride(0, 10).unwrap();
        assert_eq!(b.len(), 10);
        assert_eq!(b.get(9), 5.0);
        assert!(v.restride(1, 2).is_err());
    }

    #[test]
    fn test_stride_bytes() {
        let data = vec![0.0f64; 4];
        let v = StridedView::new(&data, 0, 2, 2).unwrap();
        assert_eq!(v.stride_bytes(), 16);
    }
}
