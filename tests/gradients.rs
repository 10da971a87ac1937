//! Backward closures checked against central finite differences.

use pinn_layers::constraints::Constraint;
use pinn_layers::layers::{Layer, ParisLaw, SNCurve, StressIntensityRange};
use pinn_layers::{KernelConfig, Shape, Ten64, Tensor, WithGrad, tensor};

const H: f64 = 1e-6;

/// Sum of outputs, so `dL/dout` is all ones.
fn loss(layer: &dyn Layer, input: &Ten64) -> f64 {
    layer.call(input).unwrap().data.iter().sum()
}

fn ones_like(t: &Ten64) -> Ten64 {
    Tensor::new(t.shape.clone(), vec![1.0; t.data.len()])
}

fn assert_grad_close(analytic: f64, numeric: f64) {
    let tol = 1e-5 * numeric.abs().max(1.0);
    assert!(
        (analytic - numeric).abs() <= tol,
        "analytic {analytic} vs numeric {numeric}"
    );
}

fn check_kernel_grad(layer: &mut dyn Layer, input: &Ten64) {
    let (out, back) = layer.forward(&WithGrad::new(input.clone())).unwrap();
    let (_, d_kernel) = back(&ones_like(&out));
    assert_eq!(d_kernel.shape, layer.kernel().weights().value.shape);

    let base = layer.kernel().values().to_vec();
    for i in 0..base.len() {
        let mut plus = base.clone();
        plus[i] += H;
        layer.kernel_mut().set_values("test", &plus).unwrap();
        let l_plus = loss(layer, input);

        let mut minus = base.clone();
        minus[i] -= H;
        layer.kernel_mut().set_values("test", &minus).unwrap();
        let l_minus = loss(layer, input);

        assert_grad_close(d_kernel.data[i], (l_plus - l_minus) / (2.0 * H));
        assert!(d_kernel.data[i] != 0.0, "kernel gradient {i} vanished");
    }
    layer.kernel_mut().set_values("test", &base).unwrap();
}

fn check_input_grad(layer: &dyn Layer, input: &Ten64, active_columns: &[usize]) {
    let (out, back) = layer.forward(&WithGrad::new(input.clone())).unwrap();
    let (d_input, _) = back(&ones_like(&out));
    assert_eq!(d_input.shape, input.shape);

    let cols = input.shape[1];
    for idx in 0..input.data.len() {
        let mut plus = input.clone();
        plus.data[idx] += H;
        let mut minus = input.clone();
        minus.data[idx] -= H;
        let numeric = (loss(layer, &plus) - loss(layer, &minus)) / (2.0 * H);
        assert_grad_close(d_input.data[idx], numeric);
        if !active_columns.contains(&(idx % cols)) {
            assert_eq!(d_input.data[idx], 0.0);
        }
    }
}

#[test]
fn stress_intensity_range_gradients() {
    let mut layer = StressIntensityRange::default()
        .build_with_kernel(&Shape::batched(3), &[1.3])
        .unwrap();
    let input = tensor!([[0.5, 2.0, 7.0], [1.5, 0.8, -1.0]]);
    check_kernel_grad(&mut layer, &input);
    check_input_grad(&layer, &input, &[0, 1]);
}

#[test]
fn paris_law_gradients() {
    let mut layer = ParisLaw::default()
        .build_with_kernel(&Shape::batched(1), &[0.7, 2.4])
        .unwrap();
    let input = tensor!([[1.5], [2.0], [0.6]]);
    check_kernel_grad(&mut layer, &input);
    check_input_grad(&layer, &input, &[0]);
}

#[test]
fn sn_curve_gradients() {
    let mut layer = SNCurve::default()
        .build_with_kernel(&Shape::batched(2), &[-0.3, 1.2])
        .unwrap();
    let input = tensor!([[4.0, 1.1], [9.0, 0.4]]);
    check_kernel_grad(&mut layer, &input);
    check_input_grad(&layer, &input, &[1]);
}

#[test]
fn randomly_initialized_kernels_get_gradients() {
    let layer = SNCurve::default().build(&Shape::batched(2)).unwrap();
    let input = tensor!([[0.0, 0.5], [0.0, 1.5]]);
    let (out, back) = layer.forward(&WithGrad::new(input)).unwrap();
    let (_, d_kernel) = back(&ones_like(&out));
    assert!(d_kernel.data.iter().all(|g| g.is_finite() && *g != 0.0));
}

#[test]
fn backward_closure_is_reusable() {
    let layer = ParisLaw::default()
        .build_with_kernel(&Shape::batched(1), &[2.0, 3.0])
        .unwrap();
    let (out, back) = layer.forward(&WithGrad::new(tensor!([[2.0]]))).unwrap();
    let first = back(&ones_like(&out));
    let second = back(&ones_like(&out));
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
    // dC = x^m, dm = C x^m ln x
    assert!((first.1.data[0] - 8.0).abs() < 1e-12);
    assert!((first.1.data[1] - 16.0 * 2f64.ln()).abs() < 1e-12);
}

fn sgd(w: &mut WithGrad<Ten64>, lr: f64) {
    for (w_i, g_i) in w.value.data.iter_mut().zip(&w.grad.data) {
        *w_i -= lr * *g_i;
    }
    w.grad.data.fill(0.0);
}

#[test]
fn host_update_accumulates_then_constrains() {
    let mut layer = StressIntensityRange::new(
        KernelConfig::default().with_constraint(Constraint::NonNeg),
    )
    .build_with_kernel(&Shape::batched(2), &[0.5])
    .unwrap();

    let input = tensor!([[1.0, 2.0]]);
    let (out, back) = layer.forward(&WithGrad::new(input)).unwrap();
    let (_, d_kernel) = back(&ones_like(&out));
    layer.kernel_mut().accumulate_grad(&d_kernel).unwrap();
    layer.kernel_mut().accumulate_grad(&d_kernel).unwrap();
    assert!((layer.kernel().grad()[0] - 2.0 * d_kernel.data[0]).abs() < 1e-12);

    // a large step drives F negative, the constraint clamps it back to zero
    layer.apply_update(10.0, sgd);
    assert_eq!(layer.geometry_factor(), 0.0);
    assert_eq!(layer.kernel().grad(), &[0.0]);
}

#[test]
fn mismatched_kernel_gradient_is_rejected() {
    let mut layer = SNCurve::default().build(&Shape::batched(2)).unwrap();
    let err = layer
        .kernel_mut()
        .accumulate_grad(&tensor!([1.0]))
        .unwrap_err();
    assert!(err.is_shape());
    layer.zero_grad();
    assert_eq!(layer.kernel().grad(), &[0.0, 0.0]);
}
