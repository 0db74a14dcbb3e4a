//! Boundary adapter: the per-call contract between a host and the engine.
//!
//! [`apply`] drives one call end to end: arity check, dtype-tuple
//! dispatch under a casting policy, length broadcasting with stride-0
//! re-spanning, then kernel invocation. Errors are synchronous and
//! fail-fast; no data is touched before dispatch and shape checks pass.
//!
//! Bounds were already validated when the operand views were constructed
//! (and are re-validated when a view is re-spanned here); the execution
//! core itself never checks them.

use crate::broadcast::broadcast_shapes;
use crate::cast::CastingPolicy;
use crate::dispatch::{FunctionObject, KernelArgs, KernelEntry};
use crate::dtype::DataType;
use crate::operand::{AnyView, AnyViewMut};
use crate::{EngineError, Result};

/// Select a kernel for the requested dtype tuple: exact match first,
/// then casting-aware resolution in declaration order.
fn select_kernel<'f>(
    fobj: &'f FunctionObject,
    requested: &[DataType],
    policy: CastingPolicy,
) -> Result<&'f KernelEntry> {
    if let Some(idx) = fobj.dispatch_index_of(requested) {
        return Ok(&fobj.kernels()[idx]);
    }
    match fobj.resolve_index_of(requested, policy) {
        Some(idx) => Ok(&fobj.kernels()[idx]),
        None => fobj.dispatch(requested),
    }
}

/// Apply a registered operation to strided operands.
///
/// Steps, in order:
/// 1. check operand counts against the table's `nin`/`nout`;
/// 2. build the requested dtype tuple and select a kernel (exact match,
///    then implicit-cast resolution under `policy`);
/// 3. broadcast input lengths; length-1 inputs are re-spanned as
///    stride-0 views over the broadcast length;
/// 4. require every output length to equal the broadcast length;
/// 5. invoke the kernel.
///
/// # Errors
/// [`EngineError::Arity`] on operand count mismatch,
/// [`EngineError::Dispatch`] when no kernel is reachable,
/// [`EngineError::Shape`] on incompatible lengths, plus whatever the
/// kernel itself returns.
///
/// # Example
/// ```
/// use strided_dispatch::{
///     apply, AnyView, AnyViewMut, CastingPolicy, DataType, FunctionObject, KernelArgs,
///     KernelEntry, Result, exec,
/// };
///
/// fn add_f64(args: &mut KernelArgs<'_, '_>) -> Result<()> {
///     let x = args.input::<f64>(0)?;
///     let y = args.input::<f64>(1)?;
///     let z = args.output::<f64>(0)?;
///     exec::binary(&x, &y, z, |a, b| a + b)
/// }
///
/// let table = FunctionObject::new(
///     "add",
///     2,
///     1,
///     vec![KernelEntry::new(
///         &[DataType::Float64, DataType::Float64, DataType::Float64][..],
///         add_f64,
///     )],
/// )?;
///
/// let x = vec![1.0, 2.0, 3.0];
/// let y = vec![10.0];
/// let mut out = vec![0.0; 3];
/// apply(
///     &table,
///     CastingPolicy::Safe,
///     &[AnyView::from_slice(&x), AnyView::from_slice(&y)],
///     &mut [AnyViewMut::from_slice(&mut out)],
/// )?;
/// assert_eq!(out, vec![11.0, 12.0, 13.0]);
/// # Ok::<(), strided_dispatch::EngineError>(())
/// ```
pub fn apply<'a>(
    fobj: &FunctionObject,
    policy: CastingPolicy,
    inputs: &[AnyView<'a>],
    outputs: &mut [AnyViewMut<'a>],
) -> Result<()> {
    if inputs.len() != fobj.nin() || outputs.len() != fobj.nout() {
        return Err(EngineError::Arity {
            op: fobj.name().to_string(),
            expected_inputs: fobj.nin(),
            expected_outputs: fobj.nout(),
            actual_inputs: inputs.len(),
            actual_outputs: outputs.len(),
        });
    }

    let mut requested: Vec<DataType> = Vec::with_capacity(fobj.narrays());
    requested.extend(inputs.iter().map(|v| v.dtype()));
    requested.extend(outputs.iter().map(|v| v.dtype()));
    let entry = select_kernel(fobj, &requested, policy)?;

    let shapes: Vec<[usize; 1]> = inputs.iter().map(|v| [v.len()]).collect();
    let shape_refs: Vec<&[usize]> = shapes.iter().map(|s| &s[..]).collect();
    let unified = broadcast_shapes(&shape_refs)?;
    // with no inputs (nullary), the first output defines the length
    let n = match unified.first() {
        Some(&n) => n,
        None => outputs.first().map(|o| o.len()).unwrap_or(0),
    };

    for out in outputs.iter() {
        if out.len() != n {
            let mut all = shapes.iter().map(|s| s.to_vec()).collect::<Vec<_>>();
            all.push(vec![out.len()]);
            return Err(EngineError::Shape { shapes: all });
        }
    }

    let adjusted: Vec<AnyView<'a>> = inputs
        .iter()
        .enumerate()
        .map(|(i, v)| {
            if v.len() == n {
                Ok(*v)
            } else {
                // broadcast: a length-1 input repeats via stride 0
                v.restride(0, n).map_err(|e| e.at_argument(i))
            }
        })
        .collect::<Result<_>>()?;

    let mut args = KernelArgs::new(&adjusted, outputs);
    entry.invoke(&mut args)
}
