//! Projections applied to a kernel after every parameter update.
//!
//! Norm based constraints treat the whole rank-1 kernel as one vector.

use core::str::FromStr;

use crate::error::{LayerError, Result};

/// Guards the norm divisions.
pub const EPSILON: f64 = 1e-7;

/// Projection keeping a kernel inside a feasible set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// Negative entries are set to zero.
    NonNeg,
    /// Rescales so the L2 norm is at most `max_value`.
    MaxNorm {
        /// Largest allowed norm.
        max_value: f64,
    },
    /// Rescales to unit L2 norm.
    UnitNorm,
    /// Pulls the L2 norm into `[min_value, max_value]` at the given `rate`.
    MinMaxNorm {
        /// Smallest allowed norm.
        min_value: f64,
        /// Largest allowed norm.
        max_value: f64,
        /// `1.0` enforces strictly, smaller values move part of the way.
        rate: f64,
    },
    /// Clips every entry into `[min, max]`.
    Between {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
}

impl Constraint {
    /// Checks the projection parameters.
    ///
    /// # Errors
    /// Returns [`LayerError::Configuration`] for negative norms, inverted
    /// bounds or a rate outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        let ok = match *self {
            Self::NonNeg | Self::UnitNorm => true,
            Self::MaxNorm { max_value } => max_value.is_finite() && max_value >= 0.0,
            Self::MinMaxNorm {
                min_value,
                max_value,
                rate,
            } => {
                min_value.is_finite()
                    && max_value.is_finite()
                    && (0.0..=max_value).contains(&min_value)
                    && (0.0..=1.0).contains(&rate)
            }
            Self::Between { min, max } => !min.is_nan() && !max.is_nan() && min <= max,
        };
        if ok {
            Ok(())
        } else {
            Err(LayerError::configuration(
                "Constraint",
                format!("invalid parameters for {self:?}"),
            ))
        }
    }

    /// Projects `weights` in place.
    pub fn apply(&self, weights: &mut [f64]) {
        match *self {
            Self::NonNeg => {
                for w in weights.iter_mut() {
                    if *w < 0.0 {
                        *w = 0.0;
                    }
                }
            }
            Self::MaxNorm { max_value } => {
                let norm = l2_norm(weights);
                rescale(weights, norm, norm.clamp(0.0, max_value));
            }
            Self::UnitNorm => {
                let norm = l2_norm(weights);
                rescale(weights, norm, 1.0);
            }
            Self::MinMaxNorm {
                min_value,
                max_value,
                rate,
            } => {
                let norm = l2_norm(weights);
                let desired = rate * norm.clamp(min_value, max_value) + (1.0 - rate) * norm;
                rescale(weights, norm, desired);
            }
            Self::Between { min, max } => {
                for w in weights.iter_mut() {
                    *w = w.clamp(min, max);
                }
            }
        }
    }
}

fn l2_norm(weights: &[f64]) -> f64 {
    weights.iter().map(|w| w * w).sum::<f64>().sqrt()
}

fn rescale(weights: &mut [f64], norm: f64, desired: f64) {
    let factor = desired / (EPSILON + norm);
    for w in weights.iter_mut() {
        *w *= factor;
    }
}

impl FromStr for Constraint {
    type Err = LayerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "non_neg" | "nonneg" => Ok(Self::NonNeg),
            "max_norm" | "maxnorm" => Ok(Self::MaxNorm { max_value: 2.0 }),
            "unit_norm" | "unitnorm" => Ok(Self::UnitNorm),
            "min_max_norm" => Ok(Self::MinMaxNorm {
                min_value: 0.0,
                max_value: 1.0,
                rate: 1.0,
            }),
            other => Err(LayerError::configuration(
                "Constraint",
                format!("unknown constraint `{other}`"),
            )),
        }
    }
}
