//! Physics layers and the contract they share.
//!
//! Every layer comes in two types:
//!
//! - a **configuration** ([`StressIntensityRange`], [`ParisLaw`], [`SNCurve`])
//!   holding the kernel strategies and generic options, and
//! - a **built layer** ([`StressIntensityRangeLayer`], [`ParisLawLayer`],
//!   [`SNCurveLayer`]) produced once the input shape is known, owning its
//!   kernel and implementing [`Layer`].
//!
//! Building validates the trailing (feature) dimension and allocates the
//! kernel. A failed build leaves the configuration untouched so it can be
//! built again with a corrected shape. Built layers never go back to the
//! unbuilt state; calling them is a pure function of the input and the
//! current kernel values.
//!
//! # Example
//!
//! ```rust
//! use pinn_layers::layers::{Layer, ParisLaw};
//! use pinn_layers::{tensor, KernelConfig, Shape};
//!
//! let layer = ParisLaw::new(KernelConfig::default())
//!     .build_with_kernel(&Shape::batched(1), &[2.0, 3.0])
//!     .unwrap();
//! let out = layer.call(&tensor!([[2.0]])).unwrap();
//! assert!((out.data[0] - 16.0).abs() < 1e-12);
//! ```

mod paris_law;
mod sn_curve;
mod stress_intensity;

pub use paris_law::{ParisLaw, ParisLawLayer};
pub use sn_curve::{SNCurve, SNCurveLayer};
pub use stress_intensity::{StressIntensityRange, StressIntensityRangeLayer};

use crate::backprop::BackFn;
use crate::error::{LayerError, Result};
use crate::kernel::Kernel;
use crate::shape::Shape;
use crate::tensors::{Ten64, WithGrad};

/// Generic options every layer accepts besides its kernel strategies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerOptions {
    /// Layer name. Defaults to the snake-case layer kind.
    pub name: Option<String>,
    /// Static input shape hint, consumed by `build_from_hint`.
    pub input_shape: Option<Shape>,
}

impl LayerOptions {
    /// Sets the layer name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the input shape hint.
    #[must_use]
    pub fn with_input_shape(mut self, shape: Shape) -> Self {
        self.input_shape = Some(shape);
        self
    }

    /// Shorthand for an input shape hint of `(None, dim)`.
    #[must_use]
    pub fn input_dim(self, dim: usize) -> Self {
        self.with_input_shape(Shape::batched(dim))
    }

    pub(crate) fn resolved_name(&self, default: &str) -> String {
        self.name.clone().unwrap_or_else(|| default.to_owned())
    }

    pub(crate) fn hint(&self, layer: &'static str) -> Result<&Shape> {
        self.input_shape.as_ref().ok_or_else(|| {
            LayerError::configuration(layer, "no input shape hint was given; call `build` with a shape")
        })
    }
}

/// Column layout a layer requires from its `[batch, features]` input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Columns {
    AtLeast(usize),
    Exactly(usize),
}

impl Columns {
    fn accepts(self, cols: usize) -> bool {
        match self {
            Self::AtLeast(n) => cols >= n,
            Self::Exactly(n) => cols == n,
        }
    }

    fn describe(self) -> String {
        match self {
            Self::AtLeast(n) => format!("at least {n}"),
            Self::Exactly(n) => format!("exactly {n}"),
        }
    }
}

/// Build-time validation: the feature dimension must be known and acceptable.
pub(crate) fn check_build_shape(layer: &'static str, shape: &Shape, columns: Columns) -> Result<usize> {
    let Some(features) = shape.last() else {
        return Err(LayerError::configuration(
            layer,
            format!("the last dimension of the inputs should be defined, found `None` in {shape}"),
        ));
    };
    if !columns.accepts(features) {
        return Err(LayerError::configuration(
            layer,
            format!("expects {} input columns, input shape is {shape}", columns.describe()),
        ));
    }
    Ok(features)
}

/// Call-time validation, done before any computation.
pub(crate) fn check_call_input(layer: &'static str, input: &Ten64, columns: Columns) -> Result<()> {
    if input.rank() != 2 {
        return Err(LayerError::shape(
            layer,
            format!("only takes \"rank 2\" inputs, got rank {} ({:?})", input.rank(), input.shape),
        ));
    }
    let cols = input.shape[1];
    if !columns.accepts(cols) {
        return Err(LayerError::shape(
            layer,
            format!("expects {} input columns, got {cols}", columns.describe()),
        ));
    }
    Ok(())
}

/// Behaviour shared by every built layer.
pub trait Layer {
    /// Layer kind, e.g. `"StressIntensityRange"`.
    fn kind(&self) -> &'static str;

    /// Instance name.
    fn name(&self) -> &str;

    /// Feature dimension observed at build time.
    fn input_features(&self) -> usize;

    /// The learnable parameters.
    fn kernel(&self) -> &Kernel;

    /// Mutable access to the learnable parameters.
    fn kernel_mut(&mut self) -> &mut Kernel;

    /// Evaluates the formula on a `[batch, features]` input.
    ///
    /// # Errors
    /// Returns [`LayerError::Shape`] if `input` is not rank 2 or lacks the
    /// columns the formula reads.
    fn call(&self, input: &Ten64) -> Result<Ten64>;

    /// Evaluates the formula and returns the backward closure
    /// `dL/d(out) -> (dL/d(input), dL/d(kernel))`.
    ///
    /// # Errors
    /// Same as [`Layer::call`].
    fn forward(&self, input: &WithGrad<Ten64>) -> Result<(Ten64, Box<BackFn<'static>>)>;

    /// Infers the output shape without running the computation.
    ///
    /// # Errors
    /// Returns [`LayerError::Shape`] unless `input_shape` is rank 2.
    fn compute_output_shape(&self, input_shape: &Shape) -> Result<Shape> {
        if input_shape.rank() != 2 {
            return Err(LayerError::shape(
                self.kind(),
                format!("only takes \"rank 2\" inputs, got {input_shape}"),
            ));
        }
        Ok(input_shape.output())
    }

    /// Immutably obtains a reference to the weights.
    fn weights(&self) -> &WithGrad<Ten64> {
        self.kernel().weights()
    }

    /// Mutably obtains a reference to the weights.
    fn weights_mut(&mut self) -> &mut WithGrad<Ten64> {
        self.kernel_mut().weights_mut()
    }

    /// Zeroes the gradients of the weights.
    fn zero_grad(&mut self) {
        self.kernel_mut().zero_grad();
    }

    /// Applies a host optimizer step, then the kernel constraint.
    fn apply_update(&mut self, lr: f64, optim: fn(&mut WithGrad<Ten64>, f64)) {
        optim(self.weights_mut(), lr);
        self.kernel_mut().apply_constraint();
    }

    /// Penalty of the kernel regularizer, `0.0` without one.
    fn regularization_loss(&self) -> f64 {
        self.kernel().regularization_loss()
    }
}
