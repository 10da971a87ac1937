//! Paris law layer.
//!
//! Implements `out = C * input^m` elementwise, where `C` and `m` are the Paris
//! law constants stored as kernel `[C, m]`. The input is the stress intensity
//! range and the output the crack growth rate.
//!
//! The input must be a single column so the elementwise result keeps the
//! `(batch, 1)` output shape. Inputs are expected to be positive: a zero or
//! negative base with a fractional or negative exponent produces NaN or
//! infinity, which is not checked.

use rand::Rng;

use super::{Columns, Layer, LayerOptions, check_build_shape, check_call_input};
use crate::backprop::{self, BackFn};
use crate::error::Result;
use crate::kernel::{Kernel, KernelConfig};
use crate::ops;
use crate::shape::Shape;
use crate::tensors::{Ten64, WithGrad};

const KIND: &str = "ParisLaw";
const KERNEL_LEN: usize = 2;
const COLUMNS: Columns = Columns::Exactly(1);

/// Configuration of a [`ParisLawLayer`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParisLaw {
    kernel: KernelConfig,
    options: LayerOptions,
}

impl ParisLaw {
    /// Creates a configuration with the given kernel strategies.
    #[must_use]
    pub fn new(kernel: KernelConfig) -> Self {
        Self {
            kernel,
            options: LayerOptions::default(),
        }
    }

    /// Replaces the generic layer options.
    #[must_use]
    pub fn with_options(mut self, options: LayerOptions) -> Self {
        self.options = options;
        self
    }

    /// The kernel strategies.
    #[must_use]
    pub fn kernel_config(&self) -> &KernelConfig {
        &self.kernel
    }

    /// The generic layer options.
    #[must_use]
    pub fn options(&self) -> &LayerOptions {
        &self.options
    }

    /// Builds with the thread-local RNG.
    ///
    /// # Errors
    /// Returns [`crate::LayerError::Configuration`] if the feature dimension
    /// is unknown or not one, or the kernel config is invalid.
    pub fn build(&self, input_shape: &Shape) -> Result<ParisLawLayer> {
        self.build_with_rng(input_shape, &mut rand::rng())
    }

    /// Builds drawing the kernel from `rng`.
    ///
    /// # Errors
    /// Same as [`ParisLaw::build`].
    pub fn build_with_rng<R: Rng>(
        &self,
        input_shape: &Shape,
        rng: &mut R,
    ) -> Result<ParisLawLayer> {
        let features = check_build_shape(KIND, input_shape, COLUMNS)?;
        let kernel = Kernel::initialize(KIND, KERNEL_LEN, &self.kernel, rng)?;
        Ok(self.finish(features, kernel))
    }

    /// Builds with an explicit `[C, m]`.
    ///
    /// # Errors
    /// Same as [`ParisLaw::build`], plus a configuration error if
    /// `values` is not exactly two finite numbers.
    pub fn build_with_kernel(
        &self,
        input_shape: &Shape,
        values: &[f64],
    ) -> Result<ParisLawLayer> {
        let features = check_build_shape(KIND, input_shape, COLUMNS)?;
        let kernel = Kernel::from_values(KIND, KERNEL_LEN, values, &self.kernel)?;
        Ok(self.finish(features, kernel))
    }

    /// Builds from the input shape hint in the options.
    ///
    /// # Errors
    /// Returns [`crate::LayerError::Configuration`] if there is no hint, or as
    /// [`ParisLaw::build`].
    pub fn build_from_hint(&self) -> Result<ParisLawLayer> {
        let shape = self.options.hint(KIND)?;
        self.build(shape)
    }

    fn finish(&self, features: usize, kernel: Kernel) -> ParisLawLayer {
        let name = self.options.resolved_name("paris_law");
        tracing::debug!(
            "built {} `{}` for {} features, C = {}, m = {}",
            KIND,
            name,
            features,
            kernel.get(0),
            kernel.get(1)
        );
        ParisLawLayer {
            name,
            features,
            kernel,
        }
    }
}

/// A built Paris law layer with kernel `[C, m]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParisLawLayer {
    name: String,
    features: usize,
    kernel: Kernel,
}

impl ParisLawLayer {
    /// The coefficient `C`.
    #[must_use]
    pub fn coefficient(&self) -> f64 {
        self.kernel.get(0)
    }

    /// The exponent `m`.
    #[must_use]
    pub fn exponent(&self) -> f64 {
        self.kernel.get(1)
    }

    /// Moves the weights out of the layer by value.
    #[must_use]
    pub fn into_weights(self) -> WithGrad<Ten64> {
        self.kernel.into_weights()
    }
}

impl Layer for ParisLawLayer {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn input_features(&self) -> usize {
        self.features
    }

    fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    fn kernel_mut(&mut self) -> &mut Kernel {
        &mut self.kernel
    }

    fn call(&self, input: &Ten64) -> Result<Ten64> {
        check_call_input(KIND, input, COLUMNS)?;
        tracing::trace!("{} `{}` on batch of {}", KIND, self.name, input.shape[0]);
        Ok(ops::paris_law(input, self.coefficient(), self.exponent()))
    }

    fn forward(&self, input: &WithGrad<Ten64>) -> Result<(Ten64, Box<BackFn<'static>>)> {
        check_call_input(KIND, &input.value, COLUMNS)?;
        Ok(backprop::paris_law(input, self.kernel.weights()))
    }
}
