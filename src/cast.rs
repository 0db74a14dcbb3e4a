//! Casting policies and implicit-conversion rules.
//!
//! A [`CastingPolicy`] names a strictness level governing which implicit
//! dtype conversions the dispatcher may perform. The predicates here are
//! total over the closed dtype/policy domain and have no error path.

use crate::dtype::DataType;

/// Strictness level for implicit dtype conversions.
///
/// Evaluated per call; carries no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastingPolicy {
    /// No casting whatsoever.
    No,
    /// Only byte-order equivalent casts (identical representation here).
    Equiv,
    /// Only value-preserving casts.
    Safe,
    /// Safe casts plus casts within the same kind.
    SameKind,
    /// Any cast.
    Unsafe,
}

impl CastingPolicy {
    /// All policies, from strictest to most permissive.
    pub const ALL: [CastingPolicy; 5] = [
        CastingPolicy::No,
        CastingPolicy::Equiv,
        CastingPolicy::Safe,
        CastingPolicy::SameKind,
        CastingPolicy::Unsafe,
    ];
}

/// Value-preserving promotion targets for each dtype.
///
/// A cast is safe iff every value of the source type is exactly
/// representable in the target. Integer-to-float entries account for
/// mantissa width: int32 does not safely cast to float32, int64 and
/// uint64 promote to float64 by convention.
fn safe_targets(from: DataType) -> &'static [DataType] {
    use DataType::*;
    match from {
        Bool => &[
            Int8, Uint8, Int16, Uint16, Int32, Uint32, Int64, Uint64, Float32, Float64, Complex64,
            Complex128,
        ],
        Int8 => &[Int16, Int32, Int64, Float32, Float64, Complex64, Complex128],
        Uint8 => &[
            Int16, Uint16, Int32, Uint32, Int64, Uint64, Float32, Float64, Complex64, Complex128,
        ],
        Int16 => &[Int32, Int64, Float32, Float64, Complex64, Complex128],
        Uint16 => &[Int32, Uint32, Int64, Uint64, Float32, Float64, Complex64, Complex128],
        Int32 => &[Int64, Float64, Complex128],
        Uint32 => &[Int64, Uint64, Float64, Complex128],
        Int64 => &[Float64, Complex128],
        Uint64 => &[Float64, Complex128],
        Float32 => &[Float64, Complex64, Complex128],
        Float64 => &[Complex128],
        Complex64 => &[Complex128],
        Complex128 => &[],
    }
}

/// Returns `true` iff every value of `from` is exactly representable in
/// `to`.
#[inline]
pub fn is_safe_cast(from: DataType, to: DataType) -> bool {
    from == to || safe_targets(from).contains(&to)
}

/// Returns `true` iff the cast is safe or stays within one [`Kind`].
///
/// [`Kind`]: crate::dtype::Kind
#[inline]
pub fn is_same_kind_cast(from: DataType, to: DataType) -> bool {
    is_safe_cast(from, to) || from.kind() == to.kind()
}

/// Decides whether an implicit conversion from `from` to `to` is legal
/// under `policy`.
#[inline]
pub fn is_allowed_cast(from: DataType, to: DataType, policy: CastingPolicy) -> bool {
    match policy {
        CastingPolicy::Unsafe => true,
        CastingPolicy::No | CastingPolicy::Equiv => from == to,
        CastingPolicy::Safe => is_safe_cast(from, to),
        CastingPolicy::SameKind => is_same_kind_cast(from, to),
    }
}
