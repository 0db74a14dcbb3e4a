//! End-to-end tests: registration, dispatch, broadcasting, execution.

use num_traits::Signed;
use strided_dispatch::DataType::{Float32, Float64, Int32};
use strided_dispatch::{
    apply, broadcast_shapes, exec, AnyView, AnyViewMut, CastingPolicy, EngineError,
    FunctionObject, KernelArgs, KernelEntry, Result, StridedView, StridedViewMut,
};

fn add_f64(args: &mut KernelArgs<'_, '_>) -> Result<()> {
    let x = args.input::<f64>(0)?;
    let y = args.input::<f64>(1)?;
    let z = args.output::<f64>(0)?;
    exec::binary(&x, &y, z, |a, b| a + b)
}

fn add_f32(args: &mut KernelArgs<'_, '_>) -> Result<()> {
    let x = args.input::<f32>(0)?;
    let y = args.input::<f32>(1)?;
    let z = args.output::<f32>(0)?;
    exec::binary(&x, &y, z, |a, b| a + b)
}

fn abs_generic<T: strided_dispatch::Element + Signed>(
    args: &mut KernelArgs<'_, '_>,
) -> Result<()> {
    let x = args.input::<T>(0)?;
    let z = args.output::<T>(0)?;
    exec::unary(&x, z, |v| v.abs())
}

fn add_table() -> FunctionObject {
    FunctionObject::new(
        "add",
        2,
        1,
        vec![
            KernelEntry::new(&[Float64, Float64, Float64][..], add_f64),
            KernelEntry::new(&[Float32, Float32, Float32][..], add_f32),
        ],
    )
    .unwrap()
}

#[test]
fn add_dispatches_by_dtype() {
    let table = add_table();

    let x = vec![1.0f64, 2.0, 3.0];
    let y = vec![10.0f64, 20.0, 30.0];
    let mut out = vec![0.0f64; 3];
    apply(
        &table,
        CastingPolicy::No,
        &[AnyView::from_slice(&x), AnyView::from_slice(&y)],
        &mut [AnyViewMut::from_slice(&mut out)],
    )
    .unwrap();
    assert_eq!(out, vec![11.0, 22.0, 33.0]);

    let x = vec![1.0f32, 2.0];
    let y = vec![0.5f32, 0.5];
    let mut out = vec![0.0f32; 2];
    apply(
        &table,
        CastingPolicy::No,
        &[AnyView::from_slice(&x), AnyView::from_slice(&y)],
        &mut [AnyViewMut::from_slice(&mut out)],
    )
    .unwrap();
    assert_eq!(out, vec![1.5, 2.5]);
}

#[test]
fn unsupported_dtype_is_a_dispatch_error() {
    let table = add_table();
    let x = vec![1i32, 2];
    let y = vec![3i32, 4];
    let mut out = vec![0i32; 2];
    let err = apply(
        &table,
        CastingPolicy::No,
        &[AnyView::from_slice(&x), AnyView::from_slice(&y)],
        &mut [AnyViewMut::from_slice(&mut out)],
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::Dispatch { .. }));
    let msg = err.to_string();
    assert!(msg.contains("add"), "{msg}");
    assert!(msg.contains("int32"), "{msg}");
}

#[test]
fn safe_policy_reaches_wider_kernel() {
    let table = add_table();
    // int32 inputs safe-cast to float64; float64 output is requested
    let x = vec![1i32, 2, 3];
    let y = vec![10i32, 20, 30];
    let mut out = vec![0.0f64; 3];
    let err = apply(
        &table,
        CastingPolicy::No,
        &[AnyView::from_slice(&x), AnyView::from_slice(&y)],
        &mut [AnyViewMut::from_slice(&mut out)],
    );
    assert!(err.is_err());

    // the resolved kernel still sees int32 operands, so a kernel
    // registered only for float64 views reports an operand mismatch
    // rather than silently converting. Resolution picks the row; value
    // conversion is the caller's concern.
    let err = apply(
        &table,
        CastingPolicy::Safe,
        &[AnyView::from_slice(&x), AnyView::from_slice(&y)],
        &mut [AnyViewMut::from_slice(&mut out)],
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::OperandType { argument: 0, .. }));
}

#[test]
fn scalar_input_broadcasts_with_stride_zero() {
    let table = add_table();
    let x = vec![1.0f64, 2.0, 3.0, 4.0];
    let y = vec![100.0f64];
    let mut out = vec![0.0f64; 4];
    apply(
        &table,
        CastingPolicy::No,
        &[AnyView::from_slice(&x), AnyView::from_slice(&y)],
        &mut [AnyViewMut::from_slice(&mut out)],
    )
    .unwrap();
    assert_eq!(out, vec![101.0, 102.0, 103.0, 104.0]);
}

#[test]
fn incompatible_lengths_are_a_shape_error() {
    let table = add_table();
    let x = vec![1.0f64, 2.0, 3.0];
    let y = vec![1.0f64, 2.0];
    let mut out = vec![0.0f64; 3];
    let err = apply(
        &table,
        CastingPolicy::No,
        &[AnyView::from_slice(&x), AnyView::from_slice(&y)],
        &mut [AnyViewMut::from_slice(&mut out)],
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::Shape { .. }));
}

#[test]
fn output_length_must_match_broadcast_length() {
    let table = add_table();
    let x = vec![1.0f64, 2.0, 3.0];
    let y = vec![1.0f64, 2.0, 3.0];
    let mut out = vec![0.0f64; 2];
    let err = apply(
        &table,
        CastingPolicy::No,
        &[AnyView::from_slice(&x), AnyView::from_slice(&y)],
        &mut [AnyViewMut::from_slice(&mut out)],
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::Shape { .. }));
}

#[test]
fn wrong_operand_count_is_an_arity_error() {
    let table = add_table();
    let x = vec![1.0f64];
    let mut out = vec![0.0f64; 1];
    let err = apply(
        &table,
        CastingPolicy::No,
        &[AnyView::from_slice(&x)],
        &mut [AnyViewMut::from_slice(&mut out)],
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::Arity { .. }));
}

#[test]
fn arity_error_identifies_the_offending_side() {
    // 3 inputs + 0 outputs against nin=2, nout=1: the totals agree, so
    // the message must report per-side counts
    let table = add_table();
    let x = vec![1.0f64];
    let err = apply(
        &table,
        CastingPolicy::No,
        &[
            AnyView::from_slice(&x),
            AnyView::from_slice(&x),
            AnyView::from_slice(&x),
        ],
        &mut [],
    )
    .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("2 inputs"), "{msg}");
    assert!(msg.contains("3 inputs"), "{msg}");
    assert!(msg.contains("0 outputs"), "{msg}");
}

#[test]
fn strided_operands_run_without_copying() {
    let table = add_table();
    let x_buf: Vec<f64> = (0..8).map(f64::from).collect();
    let y_buf = vec![1.0f64; 4];
    let mut out_buf = vec![0.0f64; 4];

    // every other element of x, reversed
    let x = StridedView::new(&x_buf, 0, -2, 4).unwrap();
    let y = StridedView::new(&y_buf, 0, 1, 4).unwrap();
    let z = StridedViewMut::new(&mut out_buf, 0, 1, 4).unwrap();

    apply(
        &table,
        CastingPolicy::No,
        &[x.into(), y.into()],
        &mut [z.into()],
    )
    .unwrap();
    // x logical sequence: 6, 4, 2, 0
    assert_eq!(out_buf, vec![7.0, 5.0, 3.0, 1.0]);
}

#[test]
fn generic_kernel_via_element_trait() {
    let table = FunctionObject::new(
        "abs",
        1,
        1,
        vec![
            KernelEntry::new(&[Float64, Float64][..], abs_generic::<f64>),
            KernelEntry::new(&[Int32, Int32][..], abs_generic::<i32>),
        ],
    )
    .unwrap();

    let x = vec![-3i32, 4, -5];
    let mut out = vec![0i32; 3];
    apply(
        &table,
        CastingPolicy::No,
        &[AnyView::from_slice(&x)],
        &mut [AnyViewMut::from_slice(&mut out)],
    )
    .unwrap();
    assert_eq!(out, vec![3, 4, 5]);
}

#[test]
fn empty_operands_touch_nothing() {
    let table = add_table();
    let x: Vec<f64> = vec![];
    let y: Vec<f64> = vec![];
    let mut out: Vec<f64> = vec![];
    apply(
        &table,
        CastingPolicy::No,
        &[AnyView::from_slice(&x), AnyView::from_slice(&y)],
        &mut [AnyViewMut::from_slice(&mut out)],
    )
    .unwrap();
}

#[test]
fn broadcast_shapes_matches_adapter_semantics() {
    // the adapter works on 1-D lengths, but the broadcaster itself is
    // rank-general
    assert_eq!(
        broadcast_shapes(&[&[8, 1, 6, 1], &[7, 1, 5]]).unwrap(),
        vec![8, 7, 6, 5]
    );
    assert_eq!(broadcast_shapes(&[&[4], &[1], &[4]]).unwrap(), vec![4]);
}

#[test]
fn bounds_are_checked_before_execution() {
    let buf = vec![0.0f64; 4];
    // 5 elements with stride 1 reaches index 4, one past the end
    assert!(matches!(
        StridedView::new(&buf, 0, 1, 5),
        Err(EngineError::Bounds { .. })
    ));
    // stride 2 from offset 1 reaches index 5
    assert!(matches!(
        StridedView::new(&buf, 1, 2, 3),
        Err(EngineError::Bounds { .. })
    ));
}
