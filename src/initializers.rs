//! Kernel initialization strategies.
//!
//! Every layer kernel in this crate is a rank-1 vector of length `n`, so the
//! fan computation collapses to `fan_in = fan_out = n`. The variance-scaling
//! family (Glorot, He, LeCun) is expressed once through [`Initializer::sample`]
//! with the appropriate variance scale.

use core::str::FromStr;

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{LayerError, Result};

/// Correction that turns the stddev of a normal truncated at two standard
/// deviations back into the requested variance.
const TRUNCATION_STDDEV_SCALE: f64 = 0.879_625_661_034_239_8;

/// How a kernel is filled when a layer is built.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Initializer {
    /// Uniform in `[-limit, limit]`, `limit = sqrt(6 / (fan_in + fan_out))`.
    #[default]
    GlorotUniform,
    /// Truncated normal, stddev `sqrt(2 / (fan_in + fan_out))`.
    GlorotNormal,
    /// Uniform in `[-limit, limit]`, `limit = sqrt(6 / fan_in)`.
    HeUniform,
    /// Truncated normal, stddev `sqrt(2 / fan_in)`.
    HeNormal,
    /// Uniform in `[-limit, limit]`, `limit = sqrt(3 / fan_in)`.
    LecunUniform,
    /// Truncated normal, stddev `sqrt(1 / fan_in)`.
    LecunNormal,
    /// Uniform in `[min, max)`.
    RandomUniform {
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (exclusive).
        max: f64,
    },
    /// Untruncated normal.
    RandomNormal {
        /// Mean of the distribution.
        mean: f64,
        /// Standard deviation, must be positive.
        stddev: f64,
    },
    /// Normal resampled until it falls within two standard deviations.
    TruncatedNormal {
        /// Mean of the distribution.
        mean: f64,
        /// Standard deviation, must be positive.
        stddev: f64,
    },
    /// Every entry set to the same value.
    Constant(f64),
    /// Every entry set to `0.0`.
    Zeros,
    /// Every entry set to `1.0`.
    Ones,
}

impl Initializer {
    /// Checks the strategy parameters.
    ///
    /// # Errors
    /// Returns [`LayerError::Configuration`] for empty uniform ranges,
    /// non-positive standard deviations or non-finite constants.
    pub fn validate(&self) -> Result<()> {
        let reject = |msg: String| -> Result<()> { Err(LayerError::configuration("Initializer", msg)) };
        match *self {
            Self::RandomUniform { min, max } if !(min.is_finite() && max.is_finite() && min < max) => {
                reject(format!("uniform range [{min}, {max}) is empty or not finite"))
            }
            Self::RandomNormal { mean, stddev } | Self::TruncatedNormal { mean, stddev }
                if !(mean.is_finite() && stddev.is_finite() && stddev > 0.0) =>
            {
                reject(format!("normal(mean={mean}, stddev={stddev}) is not a valid distribution"))
            }
            Self::Constant(v) if !v.is_finite() => reject(format!("constant {v} is not finite")),
            _ => Ok(()),
        }
    }

    /// Draws `len` kernel entries.
    ///
    /// # Errors
    /// Returns [`LayerError::Configuration`] if the strategy is invalid.
    pub fn sample<R: Rng>(&self, len: usize, rng: &mut R) -> Result<Vec<f64>> {
        self.validate()?;
        // rank-1 kernel: fan_in == fan_out == len, so Glorot and LeCun coincide
        let fan = len.max(1) as f64;

        let values = match *self {
            Self::GlorotUniform | Self::LecunUniform => uniform(variance_limit(1.0, fan), len, rng),
            Self::HeUniform => uniform(variance_limit(2.0, fan), len, rng),
            Self::GlorotNormal | Self::LecunNormal => {
                truncated(0.0, variance_stddev(1.0, fan), len, rng)?
            }
            Self::HeNormal => truncated(0.0, variance_stddev(2.0, fan), len, rng)?,
            Self::RandomUniform { min, max } => (0..len).map(|_| rng.random_range(min..max)).collect(),
            Self::RandomNormal { mean, stddev } => {
                let normal = normal(mean, stddev)?;
                (0..len).map(|_| normal.sample(rng)).collect()
            }
            Self::TruncatedNormal { mean, stddev } => truncated(mean, stddev, len, rng)?,
            Self::Constant(v) => vec![v; len],
            Self::Zeros => vec![0.0; len],
            Self::Ones => vec![1.0; len],
        };
        Ok(values)
    }
}

fn variance_limit(scale: f64, fan: f64) -> f64 {
    (3.0 * scale / fan).sqrt()
}

fn variance_stddev(scale: f64, fan: f64) -> f64 {
    (scale / fan).sqrt() / TRUNCATION_STDDEV_SCALE
}

fn uniform<R: Rng>(limit: f64, len: usize, rng: &mut R) -> Vec<f64> {
    (0..len).map(|_| rng.random_range(-limit..=limit)).collect()
}

fn normal(mean: f64, stddev: f64) -> Result<Normal<f64>> {
    Normal::new(mean, stddev).map_err(|e| LayerError::configuration("Initializer", e.to_string()))
}

fn truncated<R: Rng>(mean: f64, stddev: f64, len: usize, rng: &mut R) -> Result<Vec<f64>> {
    let normal = normal(mean, stddev)?;
    let bound = 2.0 * stddev;
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        let x = normal.sample(rng);
        if (x - mean).abs() <= bound {
            out.push(x);
        }
    }
    Ok(out)
}

impl FromStr for Initializer {
    type Err = LayerError;

    /// Parses the identifiers used by Keras-style layer configs.
    /// Parametrized strategies get the host defaults.
    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "glorot_uniform" | "xavier_uniform" => Self::GlorotUniform,
            "glorot_normal" | "xavier_normal" => Self::GlorotNormal,
            "he_uniform" => Self::HeUniform,
            "he_normal" => Self::HeNormal,
            "lecun_uniform" => Self::LecunUniform,
            "lecun_normal" => Self::LecunNormal,
            "random_uniform" | "uniform" => Self::RandomUniform { min: -0.05, max: 0.05 },
            "random_normal" | "normal" => Self::RandomNormal { mean: 0.0, stddev: 0.05 },
            "truncated_normal" => Self::TruncatedNormal { mean: 0.0, stddev: 0.05 },
            "zeros" | "zero" => Self::Zeros,
            "ones" | "one" => Self::Ones,
            other => {
                return Err(LayerError::configuration(
                    "Initializer",
                    format!("unknown initializer `{other}`"),
                ));
            }
        })
    }
}
