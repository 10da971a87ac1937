use pinn_layers::constraints::Constraint;
use pinn_layers::initializers::Initializer;
use pinn_layers::layers::{Layer, ParisLaw, SNCurve, StressIntensityRange};
use pinn_layers::regularizers::Regularizer;
use pinn_layers::{KernelConfig, Shape};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn glorot_uniform_stays_within_limit() {
    let mut rng = StdRng::seed_from_u64(7);
    // kernel of length 2: limit = sqrt(6 / (2 + 2))
    let limit = 1.5f64.sqrt();
    for _ in 0..200 {
        let values = Initializer::GlorotUniform.sample(2, &mut rng).unwrap();
        assert!(values.iter().all(|v| v.abs() <= limit));
    }
}

#[test]
fn truncated_normals_stay_within_two_stddev() {
    let mut rng = StdRng::seed_from_u64(11);
    let values = Initializer::TruncatedNormal { mean: 1.0, stddev: 0.1 }
        .sample(500, &mut rng)
        .unwrap();
    assert!(values.iter().all(|v| (v - 1.0).abs() <= 0.2));

    let stddev = 1.0 / 0.879_625_661_034_239_8;
    let values = Initializer::GlorotNormal.sample(1, &mut rng).unwrap();
    assert!(values[0].abs() <= 2.0 * stddev);
}

#[test]
fn deterministic_initializers() {
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(Initializer::Zeros.sample(2, &mut rng).unwrap(), vec![0.0, 0.0]);
    assert_eq!(Initializer::Ones.sample(1, &mut rng).unwrap(), vec![1.0]);
    assert_eq!(Initializer::Constant(3.5).sample(2, &mut rng).unwrap(), vec![3.5, 3.5]);
}

#[test]
fn invalid_initializers_are_configuration_errors() {
    let mut rng = StdRng::seed_from_u64(0);
    let bad = [
        Initializer::RandomUniform { min: 1.0, max: 1.0 },
        Initializer::RandomNormal { mean: 0.0, stddev: 0.0 },
        Initializer::TruncatedNormal { mean: f64::NAN, stddev: 1.0 },
        Initializer::Constant(f64::INFINITY),
    ];
    for init in bad {
        assert!(init.sample(2, &mut rng).unwrap_err().is_configuration());
    }

    let layer = ParisLaw::new(
        KernelConfig::default().with_initializer(Initializer::RandomUniform { min: 2.0, max: -2.0 }),
    );
    assert!(layer.build(&Shape::batched(1)).unwrap_err().is_configuration());
}

#[test]
fn seeded_builds_are_reproducible() {
    let config = SNCurve::default();
    let a = config
        .build_with_rng(&Shape::batched(2), &mut StdRng::seed_from_u64(42))
        .unwrap();
    let b = config
        .build_with_rng(&Shape::batched(2), &mut StdRng::seed_from_u64(42))
        .unwrap();
    assert_eq!(a.kernel().values(), b.kernel().values());
}

#[test]
fn constant_initializer_sets_kernel() {
    let layer = StressIntensityRange::new(
        KernelConfig::default().with_initializer(Initializer::Constant(1.12)),
    )
    .build(&Shape::batched(2))
    .unwrap();
    assert_eq!(layer.geometry_factor(), 1.12);
}

#[test]
fn identifiers_parse() {
    assert_eq!("glorot_uniform".parse::<Initializer>().unwrap(), Initializer::GlorotUniform);
    assert_eq!("he_normal".parse::<Initializer>().unwrap(), Initializer::HeNormal);
    assert_eq!("zeros".parse::<Initializer>().unwrap(), Initializer::Zeros);
    assert!("glorot".parse::<Initializer>().unwrap_err().is_configuration());

    assert_eq!("l2".parse::<Regularizer>().unwrap(), Regularizer::L2(0.01));
    assert!("l3".parse::<Regularizer>().is_err());

    assert_eq!("non_neg".parse::<Constraint>().unwrap(), Constraint::NonNeg);
    assert_eq!(
        "max_norm".parse::<Constraint>().unwrap(),
        Constraint::MaxNorm { max_value: 2.0 }
    );
    assert!("clip".parse::<Constraint>().is_err());
}

#[test]
fn regularizer_penalty_and_gradient() {
    let w = [0.5, -2.0];
    let l1l2 = Regularizer::L1L2 { l1: 0.1, l2: 0.2 };
    // 0.1 * 2.5 + 0.2 * 4.25
    assert!((l1l2.penalty(&w) - 1.1).abs() < 1e-12);
    let g = l1l2.gradient(&w);
    assert!((g[0] - (0.1 + 0.2)).abs() < 1e-12);
    assert!((g[1] - (-0.1 - 0.8)).abs() < 1e-12);
    assert_eq!(Regularizer::L1(1.0).gradient(&[0.0]), vec![0.0]);
    assert!(Regularizer::L2(-1.0).validate().unwrap_err().is_configuration());
}

#[test]
fn layer_regularization_loss() {
    let layer = ParisLaw::new(KernelConfig::default().with_regularizer(Regularizer::L2(0.5)))
        .build_with_kernel(&Shape::batched(1), &[2.0, 3.0])
        .unwrap();
    assert!((layer.regularization_loss() - 6.5).abs() < 1e-12);
    assert_eq!(layer.kernel().regularization_grad().data, vec![2.0, 3.0]);

    let plain = ParisLaw::default()
        .build_with_kernel(&Shape::batched(1), &[2.0, 3.0])
        .unwrap();
    assert_eq!(plain.regularization_loss(), 0.0);
}

fn norm(w: &[f64]) -> f64 {
    w.iter().map(|x| x * x).sum::<f64>().sqrt()
}

#[test]
fn constraints_project() {
    let mut w = [3.0, -4.0];
    Constraint::NonNeg.apply(&mut w);
    assert_eq!(w, [3.0, 0.0]);

    let mut w = [3.0, 4.0];
    Constraint::MaxNorm { max_value: 1.0 }.apply(&mut w);
    assert!((norm(&w) - 1.0).abs() < 1e-6);

    let mut w = [0.3, 0.4];
    Constraint::MaxNorm { max_value: 1.0 }.apply(&mut w);
    assert!((norm(&w) - 0.5).abs() < 1e-6);

    let mut w = [3.0, 4.0];
    Constraint::UnitNorm.apply(&mut w);
    assert!((norm(&w) - 1.0).abs() < 1e-6);

    let mut w = [0.03, 0.04];
    Constraint::MinMaxNorm { min_value: 1.0, max_value: 2.0, rate: 1.0 }.apply(&mut w);
    assert!((norm(&w) - 1.0).abs() < 1e-4);

    let mut w = [-5.0, 0.5, 5.0];
    Constraint::Between { min: -1.0, max: 1.0 }.apply(&mut w);
    assert_eq!(w, [-1.0, 0.5, 1.0]);

    assert!(Constraint::Between { min: 1.0, max: -1.0 }.validate().is_err());
    assert!(Constraint::MinMaxNorm { min_value: 0.0, max_value: 1.0, rate: 2.0 }.validate().is_err());
}
