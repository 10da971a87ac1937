//! Learnable parameter vectors.
//!
//! A [`Kernel`] is the rank-1 tensor of physics constants a layer owns, kept
//! next to its accumulated gradient together with the penalty and projection
//! chosen in its [`KernelConfig`].
//!
//! Values handed in by callers (rather than drawn from an initializer) go
//! through `briny`'s trust boundary before they are stored.

use briny::prelude::{TrustedData, Validate, ValidationError};
use rand::Rng;

use crate::constraints::Constraint;
use crate::error::{LayerError, Result};
use crate::initializers::Initializer;
use crate::regularizers::Regularizer;
use crate::tensors::{Ten64, Tensor, WithGrad};

/// How a layer creates, penalizes and projects its kernel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KernelConfig {
    /// Strategy used at build time. Defaults to Glorot uniform.
    pub initializer: Initializer,
    /// Optional loss penalty.
    pub regularizer: Option<Regularizer>,
    /// Optional projection applied after updates.
    pub constraint: Option<Constraint>,
}

impl KernelConfig {
    /// Replaces the initializer.
    #[must_use]
    pub fn with_initializer(mut self, initializer: Initializer) -> Self {
        self.initializer = initializer;
        self
    }

    /// Sets the regularizer.
    #[must_use]
    pub fn with_regularizer(mut self, regularizer: Regularizer) -> Self {
        self.regularizer = Some(regularizer);
        self
    }

    /// Sets the constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// Validates every configured strategy.
    ///
    /// # Errors
    /// Returns the first [`LayerError::Configuration`] found.
    pub fn validate(&self) -> Result<()> {
        self.initializer.validate()?;
        if let Some(regularizer) = &self.regularizer {
            regularizer.validate()?;
        }
        if let Some(constraint) = &self.constraint {
            constraint.validate()?;
        }
        Ok(())
    }
}

/// Caller supplied kernel values, not yet trusted.
struct RawKernel {
    values: Vec<f64>,
    expected: usize,
}

impl Validate for RawKernel {
    fn validate(&self) -> core::result::Result<(), ValidationError> {
        if self.values.len() != self.expected || !self.values.iter().all(|v| v.is_finite()) {
            return Err(ValidationError);
        }
        Ok(())
    }
}

fn trusted_values(layer: &'static str, values: &[f64], expected: usize) -> Result<Vec<f64>> {
    let raw = RawKernel {
        values: values.to_vec(),
        expected,
    };
    let trusted = TrustedData::new(raw).map_err(|_| {
        LayerError::configuration(
            layer,
            format!("expected {expected} finite kernel values, got {values:?}"),
        )
    })?;
    Ok(trusted.into_inner().values)
}

/// A layer's learnable parameter vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: WithGrad<Ten64>,
    regularizer: Option<Regularizer>,
    constraint: Option<Constraint>,
}

impl Kernel {
    /// Draws `len` values from the configured initializer.
    ///
    /// # Errors
    /// Returns [`LayerError::Configuration`] if the config is invalid.
    pub fn initialize<R: Rng>(
        layer: &'static str,
        len: usize,
        config: &KernelConfig,
        rng: &mut R,
    ) -> Result<Self> {
        config.validate()?;
        let values = config.initializer.sample(len, rng)?;
        // sampled values are finite by construction but share the same gate
        let values = trusted_values(layer, &values, len)?;
        Ok(Self::from_trusted(values, config))
    }

    /// Uses explicit values instead of an initializer.
    ///
    /// # Errors
    /// Returns [`LayerError::Configuration`] if the config is invalid, the
    /// length differs from `len`, or a value is not finite.
    pub fn from_values(
        layer: &'static str,
        len: usize,
        values: &[f64],
        config: &KernelConfig,
    ) -> Result<Self> {
        config.validate()?;
        let values = trusted_values(layer, values, len)?;
        Ok(Self::from_trusted(values, config))
    }

    fn from_trusted(values: Vec<f64>, config: &KernelConfig) -> Self {
        let len = values.len();
        Self {
            weights: WithGrad::new(Tensor::new(vec![len], values)),
            regularizer: config.regularizer,
            constraint: config.constraint,
        }
    }

    /// Number of scalar parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.value.data.len()
    }

    /// Whether the kernel holds no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.value.data.is_empty()
    }

    /// Current parameter values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.weights.value.data
    }

    /// Parameter `i`.
    ///
    /// # Panics
    /// Panics if `i` is out of bounds.
    #[must_use]
    pub fn get(&self, i: usize) -> f64 {
        self.weights.value.data[i]
    }

    /// Accumulated gradient.
    #[must_use]
    pub fn grad(&self) -> &[f64] {
        &self.weights.grad.data
    }

    /// Parameter tensor paired with its gradient.
    #[must_use]
    pub fn weights(&self) -> &WithGrad<Ten64> {
        &self.weights
    }

    /// Mutable access for host optimizers.
    pub fn weights_mut(&mut self) -> &mut WithGrad<Ten64> {
        &mut self.weights
    }

    /// Moves the parameter tensor out.
    #[must_use]
    pub fn into_weights(self) -> WithGrad<Ten64> {
        self.weights
    }

    /// Overwrites the parameters, keeping the gradient.
    ///
    /// # Errors
    /// Returns [`LayerError::Configuration`] on a length mismatch or a
    /// non-finite value; the kernel is left untouched.
    pub fn set_values(&mut self, layer: &'static str, values: &[f64]) -> Result<()> {
        let values = trusted_values(layer, values, self.len())?;
        self.weights.value.data = values;
        Ok(())
    }

    /// Adds `grad` (as returned by a backward closure) to the stored gradient.
    ///
    /// # Errors
    /// Returns [`LayerError::Shape`] if `grad` does not match the kernel shape.
    pub fn accumulate_grad(&mut self, grad: &Ten64) -> Result<()> {
        if grad.shape != self.weights.grad.shape {
            return Err(LayerError::shape(
                "Kernel",
                format!(
                    "gradient shape {:?} does not match kernel shape {:?}",
                    grad.shape, self.weights.grad.shape
                ),
            ));
        }
        for (acc, g) in self.weights.grad.data.iter_mut().zip(&grad.data) {
            *acc += g;
        }
        Ok(())
    }

    /// Resets the stored gradient to zero.
    pub fn zero_grad(&mut self) {
        self.weights.grad.data.fill(0.0);
    }

    /// Penalty of the configured regularizer, `0.0` when there is none.
    #[must_use]
    pub fn regularization_loss(&self) -> f64 {
        self.regularizer
            .map_or(0.0, |r| r.penalty(self.values()))
    }

    /// Gradient of [`Kernel::regularization_loss`] as a kernel-shaped tensor.
    #[must_use]
    pub fn regularization_grad(&self) -> Ten64 {
        let data = match self.regularizer {
            Some(r) => r.gradient(self.values()),
            None => vec![0.0; self.len()],
        };
        Tensor::new(self.weights.value.shape.clone(), data)
    }

    /// Projects the parameters with the configured constraint, if any.
    pub fn apply_constraint(&mut self) {
        if let Some(constraint) = self.constraint {
            constraint.apply(&mut self.weights.value.data);
        }
    }

    /// The configured regularizer.
    #[must_use]
    pub fn regularizer(&self) -> Option<Regularizer> {
        self.regularizer
    }

    /// The configured constraint.
    #[must_use]
    pub fn constraint(&self) -> Option<Constraint> {
        self.constraint
    }
}
