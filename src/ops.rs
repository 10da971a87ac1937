//! Parallel CPU kernels for the physics formulas.
//!
//! # CPU Kernels
//!
//! Each formula has a forward kernel and a gradient kernel working on the
//! flat row-major buffer of a `[batch, features]` tensor. Rows are
//! independent, so both directions split the batch across threads with
//! [`rayon`](https://docs.rs/rayon); kernel gradients are parallel sums over
//! rows.
//!
//! ## Implemented Ops
//!
//! - `stress_intensity_range`: `F * x[:,1] * sqrt(pi * x[:,0])`
//! - `paris_law`: `C * x^m`, elementwise
//! - `sn_curve`: `10^-(a * x[:,1] + b)`
//!
//! ## Preconditions
//!
//! These functions **panic** on malformed shapes. The layers in
//! [`crate::layers`] check rank and column count first and report a
//! [`crate::LayerError`] instead, so the panics only fire on direct misuse.

use core::f64::consts::{LN_10, PI};

use rayon::prelude::*;

use crate::tensors::{Ten64, Tensor};

fn rows_and_cols(input: &Ten64, min_cols: usize) -> (usize, usize) {
    assert_eq!(input.rank(), 2, "expected a rank 2 input, got shape {:?}", input.shape);
    let (rows, cols) = (input.shape[0], input.shape[1]);
    assert!(cols >= min_cols, "expected at least {min_cols} columns, got {cols}");
    (rows, cols)
}

fn check_grad(grad_output: &Ten64, rows: usize, cols: usize) {
    assert_eq!(
        grad_output.shape,
        vec![rows, cols],
        "gradient shape does not match the forward output"
    );
}

/// `out[i] = F * x[i,1] * sqrt(pi * x[i,0])`, shape `[batch, 1]`.
///
/// # Panics
/// Panics unless `input` is rank 2 with at least two columns.
#[must_use]
pub fn stress_intensity_range(input: &Ten64, f: f64) -> Ten64 {
    let (rows, cols) = rows_and_cols(input, 2);
    let out = input
        .data
        .par_chunks(cols)
        .map(|row| f * row[1] * (PI * row[0]).sqrt())
        .collect();
    Tensor::new(vec![rows, 1], out)
}

/// Gradients of [`stress_intensity_range`] given `dL/dout`.
///
/// Returns `(dL/dinput, dL/dF)`; columns past the second get zero gradient.
///
/// # Panics
/// Panics on malformed input or a `grad_output` not shaped `[batch, 1]`.
#[must_use]
pub fn stress_intensity_range_grad(input: &Ten64, f: f64, grad_output: &Ten64) -> (Ten64, Ten64) {
    let (rows, cols) = rows_and_cols(input, 2);
    check_grad(grad_output, rows, 1);

    let mut d_input = vec![0.0; input.data.len()];
    d_input
        .par_chunks_mut(cols)
        .zip(input.data.par_chunks(cols))
        .zip(grad_output.data.par_iter())
        .for_each(|((d_row, row), &g)| {
            let root = (PI * row[0]).sqrt();
            // d/da sqrt(pi a) = pi / (2 sqrt(pi a))
            d_row[0] = g * f * row[1] * PI / (2.0 * root);
            d_row[1] = g * f * root;
        });

    let d_f: f64 = input
        .data
        .par_chunks(cols)
        .zip(grad_output.data.par_iter())
        .map(|(row, &g)| g * row[1] * (PI * row[0]).sqrt())
        .sum();

    (
        Tensor::new(input.shape.clone(), d_input),
        Tensor::new(vec![1], vec![d_f]),
    )
}

/// `out = C * x^m` elementwise, same shape as `input`.
///
/// Non-positive `x` with fractional or negative `m` yields NaN or infinity;
/// callers keep inputs in the positive crack-growth domain.
///
/// # Panics
/// Panics unless `input` is rank 2.
#[must_use]
pub fn paris_law(input: &Ten64, c: f64, m: f64) -> Ten64 {
    rows_and_cols(input, 0);
    let out = input.data.par_iter().map(|&x| c * x.powf(m)).collect();
    Tensor::new(input.shape.clone(), out)
}

/// Gradients of [`paris_law`] given `dL/dout`.
///
/// Returns `(dL/dinput, [dL/dC, dL/dm])`.
///
/// # Panics
/// Panics on malformed input or a `grad_output` of a different shape.
#[must_use]
pub fn paris_law_grad(input: &Ten64, c: f64, m: f64, grad_output: &Ten64) -> (Ten64, Ten64) {
    let (rows, cols) = rows_and_cols(input, 0);
    check_grad(grad_output, rows, cols);

    let d_input = input
        .data
        .par_iter()
        .zip(grad_output.data.par_iter())
        .map(|(&x, &g)| g * c * m * x.powf(m - 1.0))
        .collect();

    let (d_c, d_m) = input
        .data
        .par_iter()
        .zip(grad_output.data.par_iter())
        .map(|(&x, &g)| {
            let x_m = x.powf(m);
            (g * x_m, g * c * x_m * x.ln())
        })
        .reduce(|| (0.0, 0.0), |a, b| (a.0 + b.0, a.1 + b.1));

    (
        Tensor::new(input.shape.clone(), d_input),
        Tensor::new(vec![2], vec![d_c, d_m]),
    )
}

/// `out[i] = 1 / 10^(a * x[i,1] + b)`, shape `[batch, 1]`.
///
/// Column 0 is part of the accepted layout but does not enter the formula.
///
/// # Panics
/// Panics unless `input` is rank 2 with at least two columns.
#[must_use]
pub fn sn_curve(input: &Ten64, a: f64, b: f64) -> Ten64 {
    let (rows, cols) = rows_and_cols(input, 2);
    let out = input
        .data
        .par_chunks(cols)
        .map(|row| 10f64.powf(-(a * row[1] + b)))
        .collect();
    Tensor::new(vec![rows, 1], out)
}

/// Gradients of [`sn_curve`] given `dL/dout`.
///
/// Returns `(dL/dinput, [dL/da, dL/db])`.
///
/// # Panics
/// Panics on malformed input or a `grad_output` not shaped `[batch, 1]`.
#[must_use]
pub fn sn_curve_grad(input: &Ten64, a: f64, b: f64, grad_output: &Ten64) -> (Ten64, Ten64) {
    let (rows, cols) = rows_and_cols(input, 2);
    check_grad(grad_output, rows, 1);

    // dL/dz where z = a * s + b and y = 10^-z
    let d_z = |row: &[f64], g: f64| -LN_10 * 10f64.powf(-(a * row[1] + b)) * g;

    let mut d_input = vec![0.0; input.data.len()];
    d_input
        .par_chunks_mut(cols)
        .zip(input.data.par_chunks(cols))
        .zip(grad_output.data.par_iter())
        .for_each(|((d_row, row), &g)| {
            d_row[1] = d_z(row, g) * a;
        });

    let (d_a, d_b) = input
        .data
        .par_chunks(cols)
        .zip(grad_output.data.par_iter())
        .map(|(row, &g)| {
            let dz = d_z(row, g);
            (dz * row[1], dz)
        })
        .reduce(|| (0.0, 0.0), |x, y| (x.0 + y.0, x.1 + y.1));

    (
        Tensor::new(input.shape.clone(), d_input),
        Tensor::new(vec![2], vec![d_a, d_b]),
    )
}
