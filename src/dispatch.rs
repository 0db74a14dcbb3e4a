//! Kernel registration and dtype-tuple dispatch.
//!
//! A [`FunctionObject`] is the registered kernel table for one named
//! operation: an ordered list of [`KernelEntry`] values, each pairing a
//! [`KernelSignature`] (the dtype tuple `nin` inputs + `nout` outputs)
//! with an invocation function. The table is built once and read-only
//! afterward, so unsynchronized concurrent reads are safe.
//!
//! Ordering is significant: it is the dispatch tie-break priority. Both
//! the exact-match scan and the casting-aware resolution walk the table
//! in declaration order and return the first hit, so the most common or
//! most specific dtype combinations should be registered first.

use crate::cast::{is_allowed_cast, CastingPolicy};
use crate::dtype::{DataType, Element};
use crate::operand::{AnyView, AnyViewMut};
use crate::view::{StridedView, StridedViewMut};
use crate::{EngineError, Result};
use smallvec::SmallVec;
use std::fmt;

/// An immutable, ordered dtype tuple of length `nin + nout`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelSignature(SmallVec<[DataType; 8]>);

impl KernelSignature {
    /// Build a signature from a dtype sequence.
    pub fn new(types: &[DataType]) -> Self {
        Self(SmallVec::from_slice(types))
    }

    /// The dtype tuple.
    #[inline]
    pub fn types(&self) -> &[DataType] {
        &self.0
    }

    /// Tuple length (`narrays`).
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for an empty tuple.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compact char-code form (`"dd_d"` for two float64 inputs and one
    /// float64 output).
    pub fn char_codes(&self, nin: usize) -> String {
        let mut s = String::with_capacity(self.0.len() + 1);
        for (i, t) in self.0.iter().enumerate() {
            if i == nin && i != 0 {
                s.push('_');
            }
            s.push(t.char_code());
        }
        s
    }
}

impl fmt::Display for KernelSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, t) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{t}")?;
        }
        write!(f, ")")
    }
}

impl From<&[DataType]> for KernelSignature {
    fn from(types: &[DataType]) -> Self {
        Self::new(types)
    }
}

/// Operand views handed to a kernel invocation.
///
/// Inputs and outputs arrive as tagged unions; kernels recover typed
/// views with [`KernelArgs::input`] and [`KernelArgs::output`]. A tag
/// mismatch is a typed error, not an unchecked cast.
pub struct KernelArgs<'call, 'data> {
    inputs: &'call [AnyView<'data>],
    outputs: &'call mut [AnyViewMut<'data>],
}

impl<'call, 'data> KernelArgs<'call, 'data> {
    /// Assemble the operand lists for one invocation.
    pub fn new(
        inputs: &'call [AnyView<'data>],
        outputs: &'call mut [AnyViewMut<'data>],
    ) -> Self {
        Self { inputs, outputs }
    }

    /// Number of input operands.
    #[inline]
    pub fn nin(&self) -> usize {
        self.inputs.len()
    }

    /// Number of output operands.
    #[inline]
    pub fn nout(&self) -> usize {
        self.outputs.len()
    }

    /// Typed view of input `idx`.
    ///
    /// # Errors
    /// [`EngineError::OperandIndex`] if `idx` is out of range,
    /// [`EngineError::OperandType`] if the operand's tag is not `T`.
    pub fn input<T: Element>(&self, idx: usize) -> Result<StridedView<'data, T>> {
        let any = self.inputs.get(idx).ok_or(EngineError::OperandIndex {
            argument: idx,
            count: self.inputs.len(),
        })?;
        any.downcast::<T>().ok_or(EngineError::OperandType {
            argument: idx,
            expected: T::DTYPE,
            actual: any.dtype(),
        })
    }

    /// Typed mutable view of output `idx`. Argument positions in errors
    /// count inputs first, so output `idx` reports as `nin + idx`.
    ///
    /// # Errors
    /// [`EngineError::OperandIndex`] if `idx` is out of range,
    /// [`EngineError::OperandType`] if the operand's tag is not `T`.
    pub fn output<T: Element>(&mut self, idx: usize) -> Result<&mut StridedViewMut<'data, T>> {
        let nin = self.inputs.len();
        let count = self.outputs.len();
        let any = self
            .outputs
            .get_mut(idx)
            .ok_or(EngineError::OperandIndex {
                argument: nin + idx,
                count: nin + count,
            })?;
        let actual = any.dtype();
        any.downcast_mut::<T>().ok_or(EngineError::OperandType {
            argument: nin + idx,
            expected: T::DTYPE,
            actual,
        })
    }

    /// Untyped input operand `idx`.
    #[inline]
    pub fn raw_input(&self, idx: usize) -> &AnyView<'data> {
        &self.inputs[idx]
    }
}

/// Kernel invocation function: recovers typed views from the operand
/// lists and runs a loop driver from [`crate::exec`].
pub type KernelFn = fn(&mut KernelArgs<'_, '_>) -> Result<()>;

/// One registered kernel: a dtype signature plus its invocation function.
#[derive(Clone)]
pub struct KernelEntry {
    signature: KernelSignature,
    invoke: KernelFn,
}

impl KernelEntry {
    /// Pair a signature with an invocation function.
    pub fn new(signature: impl Into<KernelSignature>, invoke: KernelFn) -> Self {
        Self {
            signature: signature.into(),
            invoke,
        }
    }

    /// The kernel's dtype signature.
    #[inline]
    pub fn signature(&self) -> &KernelSignature {
        &self.signature
    }

    /// Run the kernel over the given operands.
    #[inline]
    pub fn invoke(&self, args: &mut KernelArgs<'_, '_>) -> Result<()> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for KernelEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelEntry")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// The registered dispatch table for one named operation.
///
/// Built once at registration time, read-only afterward; lives for the
/// process/module lifetime and is safe for unsynchronized concurrent
/// reads.
#[derive(Debug)]
pub struct FunctionObject {
    name: String,
    nin: usize,
    nout: usize,
    kernels: Vec<KernelEntry>,
}

impl FunctionObject {
    /// Register a kernel table.
    ///
    /// # Errors
    /// [`EngineError::Configuration`] if any kernel's signature length
    /// differs from `nin + nout`.
    pub fn new(
        name: impl Into<String>,
        nin: usize,
        nout: usize,
        kernels: Vec<KernelEntry>,
    ) -> Result<Self> {
        let name = name.into();
        let narrays = nin + nout;
        for (index, entry) in kernels.iter().enumerate() {
            if entry.signature.len() != narrays {
                return Err(EngineError::Configuration {
                    op: name,
                    index,
                    actual: entry.signature.len(),
                    expected: narrays,
                });
            }
        }
        Ok(Self {
            name,
            nin,
            nout,
            kernels,
        })
    }

    /// Operation name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of input arrays.
    #[inline]
    pub fn nin(&self) -> usize {
        self.nin
    }

    /// Number of output arrays.
    #[inline]
    pub fn nout(&self) -> usize {
        self.nout
    }

    /// Total operand count (`nin + nout`).
    #[inline]
    pub fn narrays(&self) -> usize {
        self.nin + self.nout
    }

    /// The registered kernels, in declaration order.
    #[inline]
    pub fn kernels(&self) -> &[KernelEntry] {
        &self.kernels
    }

    /// First-exact-match lookup: index of the first kernel whose
    /// signature equals `requested` element-wise, or `None`.
    ///
    /// This is first-exact-match, not best-match; callers wanting
    /// implicit-cast resolution use [`FunctionObject::resolve_index_of`].
    pub fn dispatch_index_of(&self, requested: &[DataType]) -> Option<usize> {
        self.kernels
            .iter()
            .position(|k| k.signature.types() == requested)
    }

    /// Exact-match lookup returning the kernel, or a typed dispatch
    /// error naming the operation and the unsupported combination.
    pub fn dispatch(&self, requested: &[DataType]) -> Result<&KernelEntry> {
        match self.dispatch_index_of(requested) {
            Some(idx) => Ok(&self.kernels[idx]),
            None => Err(EngineError::Dispatch {
                op: self.name.clone(),
                types: KernelSignature::new(requested),
            }),
        }
    }

    /// Casting-aware lookup: index of the first kernel (in declaration
    /// order) reachable from `requested` under `policy`.
    ///
    /// Each requested input must be castable to the kernel's input
    /// dtype, and each kernel output must be castable to the requested
    /// output dtype. Under [`CastingPolicy::No`] this degenerates to
    /// exact match. The declaration-order tie-break is identical to
    /// [`FunctionObject::dispatch_index_of`].
    pub fn resolve_index_of(
        &self,
        requested: &[DataType],
        policy: CastingPolicy,
    ) -> Option<usize> {
        if requested.len() != self.narrays() {
            return None;
        }
        self.kernels.iter().position(|k| {
            let sig = k.signature.types();
            let inputs_ok = (0..self.nin).all(|i| is_allowed_cast(requested[i], sig[i], policy));
            let outputs_ok = (self.nin..self.narrays())
                .all(|i| is_allowed_cast(sig[i], requested[i], policy));
            inputs_ok && outputs_ok
        })
    }
}
