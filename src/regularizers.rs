//! Kernel penalties added to the training loss by the host.

use core::str::FromStr;

use crate::error::{LayerError, Result};

/// Default factor used when a regularizer is named without parameters.
pub const DEFAULT_FACTOR: f64 = 0.01;

/// Weight penalty attached to a kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Regularizer {
    /// `l1 * sum(|w|)`.
    L1(f64),
    /// `l2 * sum(w^2)`.
    L2(f64),
    /// Both penalties combined.
    L1L2 {
        /// L1 factor.
        l1: f64,
        /// L2 factor.
        l2: f64,
    },
}

impl Regularizer {
    fn factors(&self) -> (f64, f64) {
        match *self {
            Self::L1(l1) => (l1, 0.0),
            Self::L2(l2) => (0.0, l2),
            Self::L1L2 { l1, l2 } => (l1, l2),
        }
    }

    /// Rejects negative or non-finite factors.
    ///
    /// # Errors
    /// Returns [`LayerError::Configuration`] on an invalid factor.
    pub fn validate(&self) -> Result<()> {
        let (l1, l2) = self.factors();
        if !(l1.is_finite() && l2.is_finite()) || l1 < 0.0 || l2 < 0.0 {
            return Err(LayerError::configuration(
                "Regularizer",
                format!("factors must be finite and non-negative, got l1={l1}, l2={l2}"),
            ));
        }
        Ok(())
    }

    /// Penalty contributed by `weights`.
    #[must_use]
    pub fn penalty(&self, weights: &[f64]) -> f64 {
        let (l1, l2) = self.factors();
        weights.iter().map(|w| l1 * w.abs() + l2 * w * w).sum()
    }

    /// Gradient of [`Regularizer::penalty`] with respect to each weight.
    ///
    /// The L1 subgradient at zero is taken as zero.
    #[must_use]
    pub fn gradient(&self, weights: &[f64]) -> Vec<f64> {
        let (l1, l2) = self.factors();
        weights
            .iter()
            .map(|&w| {
                let sign = if w > 0.0 {
                    1.0
                } else if w < 0.0 {
                    -1.0
                } else {
                    0.0
                };
                l1 * sign + 2.0 * l2 * w
            })
            .collect()
    }
}

impl FromStr for Regularizer {
    type Err = LayerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "l1" => Ok(Self::L1(DEFAULT_FACTOR)),
            "l2" => Ok(Self::L2(DEFAULT_FACTOR)),
            "l1_l2" => Ok(Self::L1L2 {
                l1: DEFAULT_FACTOR,
                l2: DEFAULT_FACTOR,
            }),
            other => Err(LayerError::configuration(
                "Regularizer",
                format!("unknown regularizer `{other}`"),
            )),
        }
    }
}
