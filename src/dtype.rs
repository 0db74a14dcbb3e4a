//! Data type tags and kind classification.
//!
//! Every strided operand carries a [`DataType`] tag identifying its element
//! representation. Tags are grouped into a coarser [`Kind`] used for
//! same-kind casting decisions, and each tag knows its element size and the
//! single-character code used in kernel signature suffixes
//! (`dd_d` = two float64 inputs, one float64 output).

use crate::operand::{AnyView, AnyViewMut};
use crate::view::{StridedView, StridedViewMut};
use num_complex::{Complex32, Complex64};
use std::fmt;

/// Tag identifying an array element's binary representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    Bool,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float32,
    Float64,
    /// Single-precision complex (two `f32` components).
    Complex64,
    /// Double-precision complex (two `f64` components).
    Complex128,
}

/// Coarse classification of a [`DataType`], used for same-kind casting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    SignedInt,
    UnsignedInt,
    Float,
    Complex,
}

impl DataType {
    /// All data types, in tag order.
    pub const ALL: [DataType; 13] = [
        DataType::Bool,
        DataType::Int8,
        DataType::Uint8,
        DataType::Int16,
        DataType::Uint16,
        DataType::Int32,
        DataType::Uint32,
        DataType::Int64,
        DataType::Uint64,
        DataType::Float32,
        DataType::Float64,
        DataType::Complex64,
        DataType::Complex128,
    ];

    /// Kind classification. Total and pure.
    #[inline]
    pub fn kind(self) -> Kind {
        match self {
            DataType::Bool => Kind::Bool,
            DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => Kind::SignedInt,
            DataType::Uint8 | DataType::Uint16 | DataType::Uint32 | DataType::Uint64 => {
                Kind::UnsignedInt
            }
            DataType::Float32 | DataType::Float64 => Kind::Float,
            DataType::Complex64 | DataType::Complex128 => Kind::Complex,
        }
    }

    /// Element size in bytes.
    #[inline]
    pub fn size(self) -> usize {
        match self {
            DataType::Bool | DataType::Int8 | DataType::Uint8 => 1,
            DataType::Int16 | DataType::Uint16 => 2,
            DataType::Int32 | DataType::Uint32 | DataType::Float32 => 4,
            DataType::Int64 | DataType::Uint64 | DataType::Float64 | DataType::Complex64 => 8,
            DataType::Complex128 => 16,
        }
    }

    /// Single-character code used in kernel signature suffixes.
    #[inline]
    pub fn char_code(self) -> char {
        match self {
            DataType::Bool => 'x',
            DataType::Int8 => 'b',
            DataType::Uint8 => 'B',
            DataType::Int16 => 'h',
            DataType::Uint16 => 'H',
            DataType::Int32 => 'i',
            DataType::Uint32 => 'I',
            DataType::Int64 => 'l',
            DataType::Uint64 => 'L',
            DataType::Float32 => 'f',
            DataType::Float64 => 'd',
            DataType::Complex64 => 'c',
            DataType::Complex128 => 'z',
        }
    }

    /// Lowercase name (`"float64"`, `"uint8"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            DataType::Bool => "bool",
            DataType::Int8 => "int8",
            DataType::Uint8 => "uint8",
            DataType::Int16 => "int16",
            DataType::Uint16 => "uint16",
            DataType::Int32 => "int32",
            DataType::Uint32 => "uint32",
            DataType::Int64 => "int64",
            DataType::Uint64 => "uint64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Complex64 => "complex64",
            DataType::Complex128 => "complex128",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A Rust scalar type usable as a strided array element.
///
/// Connects the compile-time element type of a [`StridedView`] to its
/// runtime [`DataType`] tag and handles packing into / unpacking from the
/// tagged operand unions. Implementations are provided for every tag in
/// [`DataType::ALL`]; the trait is not meant to be implemented outside
/// this crate.
pub trait Element: Copy + 'static {
    /// The runtime tag corresponding to `Self`.
    const DTYPE: DataType;

    /// Wrap a typed view into the tagged union.
    fn pack(view: StridedView<'_, Self>) -> AnyView<'_>;

    /// Wrap a typed mutable view into the tagged union.
    fn pack_mut(view: StridedViewMut<'_, Self>) -> AnyViewMut<'_>;

    /// Extract a typed view from the tagged union, if the tag matches.
    fn unpack<'a>(any: &AnyView<'a>) -> Option<StridedView<'a, Self>>;

    /// Extract a typed mutable view from the tagged union, if the tag
    /// matches.
    fn unpack_mut<'v, 'a>(any: &'v mut AnyViewMut<'a>)
        -> Option<&'v mut StridedViewMut<'a, Self>>;
}

macro_rules! impl_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DataType = DataType::$variant;

                #[inline]
                fn pack(view: StridedView<'_, Self>) -> AnyView<'_> {
                    AnyView::$variant(view)
                }

                #[inline]
                fn pack_mut(view: StridedViewMut<'_, Self>) -> AnyViewMut<'_> {
                    AnyViewMut::$variant(view)
                }

                #[inline]
                fn unpack<'a>(any: &AnyView<'a>) -> Option<StridedView<'a, Self>> {
                    match any {
                        AnyView::$variant(v) => Some(*v),
                        _ => None,
                    }
                }

                #[inline]
                fn unpack_mut<'v, 'a>(
                    any: &'v mut AnyViewMut<'a>,
                ) -> Option<&'v mut StridedViewMut<'a, Self>> {
                    match any {
                        AnyViewMut::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_element! {
    bool => Bool,
    i8 => Int8,
    u8 => Uint8,
    i16 => Int16,
    u16 => Uint16,
    i32 => Int32,
    u32 => Uint32,
    i64 => Int64,
    u64 => Uint64,
    f32 => Float32,
    f64 => Float64,
    Complex32 => Complex64,
    Complex64 => Complex128,
}
