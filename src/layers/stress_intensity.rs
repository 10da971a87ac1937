//! Stress intensity range layer.
//!
//! Implements `out = F * input[:,1] * sqrt(pi * input[:,0])` where:
//! - `F` is a dimensionless function of geometry and the relative crack
//!   length, learned as the single kernel entry,
//! - `input[:,0]` is the crack length, and
//! - `input[:,1]` is the nominal stress range.

use rand::Rng;

use super::{Columns, Layer, LayerOptions, check_build_shape, check_call_input};
use crate::backprop::{self, BackFn};
use crate::error::Result;
use crate::kernel::{Kernel, KernelConfig};
use crate::ops;
use crate::shape::Shape;
use crate::tensors::{Ten64, WithGrad};

const KIND: &str = "StressIntensityRange";
const KERNEL_LEN: usize = 1;
const COLUMNS: Columns = Columns::AtLeast(2);

/// Configuration of a [`StressIntensityRangeLayer`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StressIntensityRange {
    kernel: KernelConfig,
    options: LayerOptions,
}

impl StressIntensityRange {
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
    /// is unknown or below two, or the kernel config is invalid.
    pub fn build(&self, input_shape: &Shape) -> Result<StressIntensityRangeLayer> {
        self.build_with_rng(input_shape, &mut rand::rng())
    }

    /// Builds drawing the kernel from `rng`.
    ///
    /// # Errors
    /// Same as [`StressIntensityRange::build`].
    pub fn build_with_rng<R: Rng>(
        &self,
        input_shape: &Shape,
        rng: &mut R,
    ) -> Result<StressIntensityRangeLayer> {
        let features = check_build_shape(KIND, input_shape, COLUMNS)?;
        let kernel = Kernel::initialize(KIND, KERNEL_LEN, &self.kernel, rng)?;
        Ok(self.finish(features, kernel))
    }

    /// Builds with an explicit `[F]`.
    ///
    /// # Errors
    /// Same as [`StressIntensityRange::build`], plus a configuration error if
    /// `values` is not exactly one finite number.
    pub fn build_with_kernel(
        &self,
        input_shape: &Shape,
        values: &[f64],
    ) -> Result<StressIntensityRangeLayer> {
        let features = check_build_shape(KIND, input_shape, COLUMNS)?;
        let kernel = Kernel::from_values(KIND, KERNEL_LEN, values, &self.kernel)?;
        Ok(self.finish(features, kernel))
    }

    /// Builds from the input shape hint in the options.
    ///
    /// # Errors
    /// Returns [`crate::LayerError::Configuration`] if there is no hint, or as
    /// [`StressIntensityRange::build`].
    pub fn build_from_hint(&self) -> Result<StressIntensityRangeLayer> {
        let shape = self.options.hint(KIND)?;
        self.build(shape)
    }

    fn finish(&self, features: usize, kernel: Kernel) -> StressIntensityRangeLayer {
        let name = self.options.resolved_name("stress_intensity_range");
        tracing::debug!("built {} `{}` for {} features, F = {}", KIND, name, features, kernel.get(0));
        StressIntensityRangeLayer {
            name,
            features,
            kernel,
        }
    }
}

/// A built stress intensity range layer with kernel `[F]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StressIntensityRangeLayer {
    name: String,
    features: usize,
    kernel: Kernel,
}

impl StressIntensityRangeLayer {
    /// The geometry factor `F`.
    #[must_use]
    pub fn geometry_factor(&self) -> f64 {
        self.kernel.get(0)
    }

    /// Moves the weights out of the layer by value.
    #[must_use]
    pub fn into_weights(self) -> WithGrad<Ten64> {
        self.kernel.into_weights()
    }
}

impl Layer for StressIntensityRangeLayer {
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
        Ok(ops::stress_intensity_range(input, self.geometry_factor()))
    }

    fn forward(&self, input: &WithGrad<Ten64>) -> Result<(Ten64, Box<BackFn<'static>>)> {
        check_call_input(KIND, &input.value, COLUMNS)?;
        Ok(backprop::stress_intensity_range(input, self.kernel.weights()))
    }
}
