//! Linearized S-N curve layer.
//!
//! Implements `out = 1 / 10^(a * input[:,1] + b)` where `a` and `b` are the
//! slope and intercept of the S-N curve in log10-log10 space, stored as
//! kernel `[a, b]`. The output is the damage increment.
//!
//! An S-N curve `N = C1 * S^C2` becomes `log10(N) = log10(C1) + C2 * log10(S)`,
//! so `a = C2`, `b = log10(C1)` and column 1 carries `log10(S)` (stress, load
//! or temperature depending on the application). `a * input[:,1] + b` is then
//! the number of cycles to failure in log10 space.
//!
//! Column 0 is accepted but does not enter the formula.

use rand::Rng;

use super::{Columns, Layer, LayerOptions, check_build_shape, check_call_input};
use crate::backprop::{self, BackFn};
use crate::error::Result;
use crate::kernel::{Kernel, KernelConfig};
use crate::ops;
use crate::shape::Shape;
use crate::tensors::{Ten64, WithGrad};

const KIND: &str = "SNCurve";
const KERNEL_LEN: usize = 2;
const COLUMNS: Columns = Columns::AtLeast(2);

/// Configuration of a [`SNCurveLayer`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SNCurve {
    kernel: KernelConfig,
    options: LayerOptions,
}

impl SNCurve {
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

    /// Kernel strategies.
    #[must_use]
    pub fn kernel_config(&self) -> &KernelConfig {
        &self.kernel
    }

    /// Generic options.
    #[must_use]
    pub fn options(&self) -> &LayerOptions {
        &self.options
    }

    /// Builds with the thread-local RNG.
    ///
    /// # Errors
    /// Returns [`crate::LayerError::Configuration`] if the feature dimension
    /// is unknown or below two, or the kernel config is invalid.
    pub fn build(&self, input_shape: &Shape) -> Result<SNCurveLayer> {
        self.build_with_rng(input_shape, &mut rand::rng())
    }

    /// Builds drawing the kernel from `rng`.
    ///
    /// # Errors
    /// Same as [`SNCurve::build`].
    pub fn build_with_rng<R: Rng>(
        &self,
        input_shape: &Shape,
        rng: &mut R,
    ) -> Result<SNCurveLayer> {
        let features = check_build_shape(KIND, input_shape, COLUMNS)?;
        let kernel = Kernel::initialize(KIND, KERNEL_LEN, &self.kernel, rng)?;
        Ok(self.finish(features, kernel))
    }

    /// Builds with an explicit `[a, b]`.
    ///
    /// # Errors
    /// Same as [`SNCurve::build`], plus a configuration error if
    /// `values` is not exactly two finite numbers.
    pub fn build_with_kernel(
        &self,
        input_shape: &Shape,
        values: &[f64],
    ) -> Result<SNCurveLayer> {
        let features = check_build_shape(KIND, input_shape, COLUMNS)?;
        let kernel = Kernel::from_values(KIND, KERNEL_LEN, values, &self.kernel)?;
        Ok(self.finish(features, kernel))
    }

    /// Builds from the input shape hint in the options.
    ///
    /// # Errors
    /// As [`SNCurve::build`], or when no hint was set.
    pub fn build_from_hint(&self) -> Result<SNCurveLayer> {
        let shape = self.options.hint(KIND)?;
        self.build(shape)
    }

    fn finish(&self, features: usize, kernel: Kernel) -> SNCurveLayer {
        let name = self.options.resolved_name("sn_curve");
        tracing::debug!(
            "built {} `{}` for {} features, a = {}, b = {}",
            KIND,
            name,
            features,
            kernel.get(0),
            kernel.get(1)
        );
        SNCurveLayer {
            name,
            features,
            kernel,
        }
    }
}

/// A built S-N curve layer with kernel `[a, b]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SNCurveLayer {
    name: String,
    features: usize,
    kernel: Kernel,
}

impl SNCurveLayer {
    /// Slope `a` in log10-log10 space.
    #[must_use]
    pub fn slope(&self) -> f64 {
        self.kernel.get(0)
    }

    /// Intercept `b` in log10-log10 space.
    #[must_use]
    pub fn intercept(&self) -> f64 {
        self.kernel.get(1)
    }

    /// Moves the weights out of the layer by value.
    #[must_use]
    pub fn into_weights(self) -> WithGrad<Ten64> {
        self.kernel.into_weights()
    }
}

impl Layer for SNCurveLayer {
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
        Ok(ops::sn_curve(input, self.slope(), self.intercept()))
    }

    fn forward(&self, input: &WithGrad<Ten64>) -> Result<(Ten64, Box<BackFn<'static>>)> {
        check_call_input(KIND, &input.value, COLUMNS)?;
        Ok(backprop::sn_curve(input, self.kernel.weights()))
    }
}
