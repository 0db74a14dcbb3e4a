//! Tagged operand unions for runtime-typed dispatch.
//!
//! [`AnyView`] and [`AnyViewMut`] carry one typed strided view per dtype
//! variant. They replace the opaque-pointer-plus-type-array pattern of the
//! original native layer: the tag travels with the view, and kernels
//! recover typed views through [`Element`] without unchecked casts.

use crate::dtype::{DataType, Element};
use crate::view::{StridedView, StridedViewMut};
use crate::Result;
use num_complex::{Complex32, Complex64};

macro_rules! operand_unions {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// An immutable strided operand of runtime-tagged element type.
        #[derive(Debug, Clone, Copy)]
        pub enum AnyView<'a> {
            $($variant(StridedView<'a, $ty>),)*
        }

        /// A mutable strided operand of runtime-tagged element type.
        #[derive(Debug)]
        pub enum AnyViewMut<'a> {
            $($variant(StridedViewMut<'a, $ty>),)*
        }

        impl<'a> AnyView<'a> {
            /// Runtime dtype tag.
            #[inline]
            pub fn dtype(&self) -> DataType {
                match self {
                    $(AnyView::$variant(_) => DataType::$variant,)*
                }
            }

            /// Number of logical elements.
            #[inline]
            pub fn len(&self) -> usize {
                match self {
                    $(AnyView::$variant(v) => v.len(),)*
                }
            }

            /// Returns `true` if the operand has no elements.
            #[inline]
            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// Element stride.
            #[inline]
            pub fn stride(&self) -> isize {
                match self {
                    $(AnyView::$variant(v) => v.stride(),)*
                }
            }

            /// Re-span the same buffer with a different stride and length,
            /// revalidating bounds.
            pub fn restride(&self, stride: isize, len: usize) -> Result<AnyView<'a>> {
                Ok(match self {
                    $(AnyView::$variant(v) => AnyView::$variant(v.restride(stride, len)?),)*
                })
            }
        }

        impl<'a> AnyViewMut<'a> {
            /// Runtime dtype tag.
            #[inline]
            pub fn dtype(&self) -> DataType {
                match self {
                    $(AnyViewMut::$variant(_) => DataType::$variant,)*
                }
            }

            /// Number of logical elements.
            #[inline]
            pub fn len(&self) -> usize {
                match self {
                    $(AnyViewMut::$variant(v) => v.len(),)*
                }
            }

            /// Returns `true` if the operand has no elements.
            #[inline]
            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// Element stride.
            #[inline]
            pub fn stride(&self) -> isize {
                match self {
                    $(AnyViewMut::$variant(v) => v.stride(),)*
                }
            }
        }
    };
}

operand_unions! {
    Bool(bool),
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
    Complex64(Complex32),
    Complex128(Complex64),
}

impl<'a, T: Element> From<StridedView<'a, T>> for AnyView<'a> {
    #[inline]
    fn from(view: StridedView<'a, T>) -> Self {
        T::pack(view)
    }
}

impl<'a, T: Element> From<StridedViewMut<'a, T>> for AnyViewMut<'a> {
    #[inline]
    fn from(view: StridedViewMut<'a, T>) -> Self {
        T::pack_mut(view)
    }
}

impl<'a> AnyView<'a> {
    /// Wrap a contiguous slice as a stride-1 operand.
    pub fn from_slice<T: Element>(data: &'a [T]) -> Self {
        T::pack(StridedView::from_slice(data))
    }

    /// Extract a typed view, if the tag matches `T`.
    #[inline]
    pub fn downcast<T: Element>(&self) -> Option<StridedView<'a, T>> {
        T::unpack(self)
    }
}

impl<'a> AnyViewMut<'a> {
    /// Wrap a contiguous mutable slice as a stride-1 operand.
    pub fn from_slice<T: Element>(data: &'a mut [T]) -> Self {
        T::pack_mut(StridedViewMut::from_slice(data))
    }

    /// Extract a typed mutable view, if the tag matches `T`.
    #[inline]
    pub fn downcast_mut<'v, T: Element>(&'v mut self) -> Option<&'v mut StridedViewMut<'a, T>> {
        T::unpack_mut(self)
    }
}
