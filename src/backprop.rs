//! Differentiable physics operations.
//!
//! # Backpropagation Primitives
//!
//! Each operation follows the same pattern:
//! 1. **Inputs** are references to `WithGrad<Ten64>`: the batch and the kernel.
//! 2. **Forward Pass** computes the output `Ten64`.
//! 3. **Backward Pass** returns a closure owning copies of what it needs.
//!    Given `dL/d(out)` it returns `(dL/d(input), dL/d(kernel))`.
//! 4. **Gradient Application** is left to the caller, typically
//!    [`crate::kernel::Kernel::accumulate_grad`].
//!
//! The closures implement `Fn`, so they can be invoked more than once.
//!
//! ## Usage Guidelines
//!
//! - Operations **panic** on shape mismatches; the layer types validate shapes
//!   and return errors instead.
//! - The kernel tensor must hold `[F]`, `[C, m]` or `[a, b]` respectively.

use crate::ops;
use crate::tensors::{Ten64, WithGrad};

/// Backward closure: `dL/d(out) -> (dL/d(input), dL/d(kernel))`.
pub type BackFn<'a> = dyn Fn(&Ten64) -> (Ten64, Ten64) + Send + Sync + 'a;

/// Stress intensity range `F * x[:,1] * sqrt(pi * x[:,0])`.
///
/// # Returns
/// - `out`: `[batch, 1]` tensor.
/// - `back`: closure mapping `dL/d(out)` to `(dL/d(input), dL/dF)`.
///
/// # Example
/// ```rust
/// use pinn_layers::{tensor, tensors::WithGrad};
///
/// let input = WithGrad::new(tensor!([[1.0, 2.0]]));
/// let kernel = WithGrad::new(tensor!([1.0]));
/// let (out, back) = pinn_layers::backprop::stress_intensity_range(&input, &kernel);
/// let (d_input, d_kernel) = back(&tensor!([[1.0]]));
/// assert!((out.data[0] - 2.0 * std::f64::consts::PI.sqrt()).abs() < 1e-12);
/// assert_eq!(d_input.shape, vec![1, 2]);
/// assert_eq!(d_kernel.shape, vec![1]);
/// ```
pub fn stress_intensity_range(
    input: &WithGrad<Ten64>,
    kernel: &WithGrad<Ten64>,
) -> (Ten64, Box<BackFn<'static>>) {
    let f = kernel.value.data[0];
    let out = ops::stress_intensity_range(&input.value, f);

    let x = input.value.clone();
    let back = move |grad_output: &Ten64| ops::stress_intensity_range_grad(&x, f, grad_output);

    (out, Box::new(back))
}

/// Paris law `C * x^m`, elementwise.
///
/// # Returns
/// - `out`: tensor shaped like the input.
/// - `back`: closure mapping `dL/d(out)` to `(dL/d(input), [dL/dC, dL/dm])`.
pub fn paris_law(
    input: &WithGrad<Ten64>,
    kernel: &WithGrad<Ten64>,
) -> (Ten64, Box<BackFn<'static>>) {
    let (c, m) = (kernel.value.data[0], kernel.value.data[1]);
    let out = ops::paris_law(&input.value, c, m);

    let x = input.value.clone();
    let back = move |grad_output: &Ten64| ops::paris_law_grad(&x, c, m, grad_output);

    (out, Box::new(back))
}

/// Linearized S-N curve `1 / 10^(a * x[:,1] + b)`.
///
/// # Returns
/// - `out`: `[batch, 1]` tensor.
/// - `back`: closure mapping `dL/d(out)` to `(dL/d(input), [dL/da, dL/db])`.
pub fn sn_curve(
    input: &WithGrad<Ten64>,
    kernel: &WithGrad<Ten64>,
) -> (Ten64, Box<BackFn<'static>>) {
    let (a, b) = (kernel.value.data[0], kernel.value.data[1]);
    let out = ops::sn_curve(&input.value, a, b);

    let x = input.value.clone();
    let back = move |grad_output: &Ten64| ops::sn_curve_grad(&x, a, b, grad_output);

    (out, Box::new(back))
}
