//! Property-based tests for the layer formulas and shape contract.

use std::f64::consts::PI;

use pinn_layers::layers::{Layer, ParisLaw, SNCurve, StressIntensityRange};
use pinn_layers::{KernelConfig, Shape, Tensor};
use proptest::prelude::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

/// `rows x cols` batches with positive entries.
fn batch(cols: usize) -> impl Strategy<Value = Tensor<f64>> {
    (1usize..16).prop_flat_map(move |rows| {
        prop::collection::vec(0.01f64..10.0, rows * cols)
            .prop_map(move |data| Tensor::new(vec![rows, cols], data))
    })
}

proptest! {
    #[test]
    fn stress_intensity_range_matches_formula(
        input in batch(2),
        f in -5.0f64..5.0,
    ) {
        let layer = StressIntensityRange::new(KernelConfig::default())
            .build_with_kernel(&Shape::batched(2), &[f])
            .unwrap();
        let out = layer.call(&input).unwrap();
        prop_assert_eq!(&out.shape, &vec![input.shape[0], 1]);
        for i in 0..input.shape[0] {
            let expected = f * input.get2(i, 1) * (PI * input.get2(i, 0)).sqrt();
            prop_assert!(close(out.data[i], expected));
        }
    }

    #[test]
    fn paris_law_matches_formula(
        input in batch(1),
        c in 1e-3f64..10.0,
        m in -4.0f64..4.0,
    ) {
        let layer = ParisLaw::new(KernelConfig::default())
            .build_with_kernel(&Shape::batched(1), &[c, m])
            .unwrap();
        let out = layer.call(&input).unwrap();
        prop_assert_eq!(&out.shape, &vec![input.shape[0], 1]);
        for (y, x) in out.data.iter().zip(&input.data) {
            prop_assert!(close(*y, c * x.powf(m)));
        }
    }

    #[test]
    fn sn_curve_matches_formula(
        input in batch(2),
        a in -2.0f64..2.0,
        b in -5.0f64..5.0,
    ) {
        let layer = SNCurve::new(KernelConfig::default())
            .build_with_kernel(&Shape::batched(2), &[a, b])
            .unwrap();
        let out = layer.call(&input).unwrap();
        prop_assert_eq!(&out.shape, &vec![input.shape[0], 1]);
        for i in 0..input.shape[0] {
            let expected = 1.0 / 10f64.powf(a * input.get2(i, 1) + b);
            prop_assert!(close(out.data[i], expected));
        }
    }

    #[test]
    fn output_shape_is_batch_by_one(
        batch_size in 0usize..64,
        features in 2usize..6,
    ) {
        let layer = SNCurve::default().build(&Shape::batched(features)).unwrap();
        let input = Tensor::new(vec![batch_size, features], vec![1.0; batch_size * features]);
        let out = layer.call(&input).unwrap();
        prop_assert_eq!(out.shape, vec![batch_size, 1]);
        prop_assert_eq!(
            layer.compute_output_shape(&Shape::from((batch_size, features))).unwrap(),
            Shape::from((batch_size, 1))
        );
    }

    #[test]
    fn wrong_rank_is_always_rejected(
        dims in prop::collection::vec(1usize..4, 0..5).prop_filter("rank 2 is valid", |d| d.len() != 2),
    ) {
        let len = dims.iter().product();
        let input = Tensor::new(dims, vec![1.0; len]);
        let layer = StressIntensityRange::default().build(&Shape::batched(2)).unwrap();
        prop_assert!(layer.call(&input).unwrap_err().is_shape());
    }
}
