//! pinn_layers: physics-informed differentiable layers.
//!
//! Closed-form fatigue and fracture mechanics equations exposed as trainable
//! layers, each carrying one or two learnable physical constants.
//!
//! # Layers
//!
//! - [`layers::StressIntensityRange`]: `F * x[:,1] * sqrt(pi * x[:,0])`,
//!   kernel `[F]`.
//! - [`layers::ParisLaw`]: `C * x^m` elementwise, kernel `[C, m]`.
//! - [`layers::SNCurve`]: `1 / 10^(a * x[:,1] + b)`, kernel `[a, b]`.
//!
//! Inputs are `[batch, features]` tensors; every layer outputs `[batch, 1]`.
//!
//! # Modules
//!
//! - [`tensors`] — Tensor and gradient containers.
//! - [`shape`] — Static shapes with unknown dimensions.
//! - [`layers`] — The layer configurations, built layers and the [`Layer`] trait.
//! - [`backprop`] — The formulas as differentiable operations with backward closures.
//! - [`ops`] — Parallel CPU kernels behind both.
//! - [`kernel`], [`initializers`], [`regularizers`], [`constraints`] — Parameter handling.
//!
//! Training loops, optimizers and checkpointing belong to the host framework.
//! Layers expose their weights and backward closures so a host can drive them.
//!
//! # Example
//!
//! ```rust
//! use pinn_layers::layers::{Layer, StressIntensityRange};
//! use pinn_layers::{tensor, KernelConfig, Shape};
//!
//! let layer = StressIntensityRange::new(KernelConfig::default())
//!     .build_with_kernel(&Shape::batched(2), &[1.0])
//!     .unwrap();
//! let out = layer.call(&tensor!([[1.0, 2.0]])).unwrap();
//! assert_eq!(out.shape, vec![1, 1]);
//! assert!((out.data[0] - 3.5449).abs() < 1e-4);
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_precision_loss,
    clippy::many_single_char_names,
    clippy::similar_names
)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod backprop;
pub mod constraints;
pub mod error;
pub mod initializers;
pub mod kernel;
pub mod layers;
pub mod ops;
pub mod regularizers;
pub mod shape;
pub mod tensors;

pub use error::{LayerError, Result};
pub use kernel::{Kernel, KernelConfig};
pub use layers::{Layer, LayerOptions};
pub use shape::Shape;
pub use tensors::{Ten64, Tensor, WithGrad};
