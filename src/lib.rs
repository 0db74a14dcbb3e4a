//! Dtype dispatch and broadcast execution engine for strided numerical
//! kernels.
//!
//! This crate is the machinery that sits between a catalog of
//! type-specialized element-wise kernels and the code that calls them
//! with runtime-typed arrays:
//!
//! - [`DataType`] / [`Kind`]: runtime element-type tags and their coarse
//!   classification
//! - [`CastingPolicy`] with [`is_safe_cast`], [`is_same_kind_cast`],
//!   [`is_allowed_cast`]: implicit-conversion legality
//! - [`FunctionObject`]: the per-operation kernel table, dispatched by
//!   dtype tuple with declaration order as tie-break priority
//! - [`broadcast_shapes`]: N-ary right-aligned broadcast shape
//!   computation
//! - [`exec`]: loop drivers running a kernel over 1-D strided views with
//!   positive, zero, or negative strides, without copying
//! - [`apply`]: the boundary adapter driving one call end to end
//!
//! # Example
//!
//! ```
//! use strided_dispatch::{
//!     apply, AnyView, AnyViewMut, CastingPolicy, DataType, FunctionObject, KernelArgs,
//!     KernelEntry, Result, exec,
//! };
//!
//! fn abs_f64(args: &mut KernelArgs<'_, '_>) -> Result<()> {
//!     let x = args.input::<f64>(0)?;
//!     let z = args.output::<f64>(0)?;
//!     exec::unary(&x, z, f64::abs)
//! }
//!
//! let table = FunctionObject::new(
//!     "abs",
//!     1,
//!     1,
//!     vec![KernelEntry::new(
//!         &[DataType::Float64, DataType::Float64][..],
//!         abs_f64,
//!     )],
//! )?;
//!
//! let x = vec![-1.0, 2.0, -3.0];
//! let mut out = vec![0.0; 3];
//! apply(
//!     &table,
//!     CastingPolicy::No,
//!     &[AnyView::from_slice(&x)],
//!     &mut [AnyViewMut::from_slice(&mut out)],
//! )?;
//! assert_eq!(out, vec![1.0, 2.0, 3.0]);
//! # Ok::<(), strided_dispatch::EngineError>(())
//! ```
//!
//! # Concurrency
//!
//! Every call is fully synchronous and single-threaded: no suspension
//! points, no I/O, no locking. A [`FunctionObject`] is read-only after
//! construction and safe for unsynchronized concurrent reads, so
//! independent calls may run on separate threads as long as their
//! arrays are not mutated concurrently.

mod adapter;
pub mod broadcast;
pub mod cast;
pub mod dispatch;
pub mod dtype;
pub mod exec;
pub mod operand;
pub mod view;

// ============================================================================
// Adapter entry point
// ============================================================================
pub use adapter::apply;

// ============================================================================
// Types and casting
// ============================================================================
pub use cast::{is_allowed_cast, is_safe_cast, is_same_kind_cast, CastingPolicy};
pub use dtype::{DataType, Element, Kind};

// ============================================================================
// Dispatch table
// ============================================================================
pub use dispatch::{FunctionObject, KernelArgs, KernelEntry, KernelFn, KernelSignature};

// ============================================================================
// Shapes and views
// ============================================================================
pub use broadcast::broadcast_shapes;
pub use operand::{AnyView, AnyViewMut};
pub use view::{StridedView, StridedViewMut};

// ============================================================================
// Error types
// ============================================================================

/// Errors surfaced by the dispatch and execution engine.
///
/// All errors are synchronous, deterministic, and fail-fast: no retries,
/// no partial results. Messages identify the operation name and/or the
/// offending argument position.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed kernel table detected at registration time.
    #[error("{op}: kernel {index} has a signature of length {actual}, expected {expected}")]
    Configuration {
        op: String,
        index: usize,
        actual: usize,
        expected: usize,
    },

    /// No kernel matches the requested dtype combination.
    #[error("{op}: no kernel registered for data types {types}")]
    Dispatch {
        op: String,
        types: KernelSignature,
    },

    /// Shapes are not mutually broadcast compatible.
    #[error("shapes are not broadcast compatible: {shapes:?}")]
    Shape { shapes: Vec<Vec<usize>> },

    /// Computed access range exceeds the buffer length.
    #[error("argument {argument}: access range [{min}, {max}] exceeds buffer of length {len}")]
    Bounds {
        argument: usize,
        min: usize,
        max: usize,
        len: usize,
    },

    /// A kernel requested a typed view whose tag does not match the
    /// operand.
    #[error("argument {argument}: expected {expected}, found {actual}")]
    OperandType {
        argument: usize,
        expected: DataType,
        actual: DataType,
    },

    /// Operand counts do not match the registered `nin`/`nout` split.
    #[error(
        "{op}: expected {expected_inputs} inputs and {expected_outputs} outputs, \
         found {actual_inputs} inputs and {actual_outputs} outputs"
    )]
    Arity {
        op: String,
        expected_inputs: usize,
        expected_outputs: usize,
        actual_inputs: usize,
        actual_outputs: usize,
    },

    /// A kernel requested an operand index beyond the provided lists.
    #[error("argument {argument}: no such operand ({count} provided)")]
    OperandIndex { argument: usize, count: usize },
}

impl EngineError {
    /// Re-tag the offending argument position, for callers that validate
    /// operands positionally.
    pub fn at_argument(self, argument: usize) -> Self {
        match self {
            EngineError::Bounds { min, max, len, .. } => EngineError::Bounds {
                argument,
                min,
                max,
                len,
            },
            EngineError::OperandType {
                expected, actual, ..
            } => EngineError::OperandType {
                argument,
                expected,
                actual,
            },
            other => other,
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
