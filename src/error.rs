//! Error types shared by every layer.
//!
//! Both kinds are precondition violations: the caller fixes its input or its
//! configuration and tries again. Nothing is retried internally.

use thiserror::Error;

/// Failure raised while building or calling a layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayerError {
    /// The layer could not be configured or built (unknown feature dimension,
    /// invalid initializer/regularizer/constraint, bad explicit kernel).
    #[error("Configuration error in `{layer}`: {message}")]
    Configuration {
        /// Layer (or component) that rejected the configuration.
        layer: &'static str,
        /// Human readable reason.
        message: String,
    },

    /// A tensor had the wrong rank or too few columns.
    #[error("Shape error in `{layer}`: {message}")]
    Shape {
        /// Layer (or component) that rejected the tensor.
        layer: &'static str,
        /// Human readable reason.
        message: String,
    },
}

impl LayerError {
    pub(crate) fn configuration(layer: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            layer,
            message: message.into(),
        }
    }

    pub(crate) fn shape(layer: &'static str, message: impl Into<String>) -> Self {
        Self::Shape {
            layer,
            message: message.into(),
        }
    }

    /// Whether this is a [`LayerError::Configuration`].
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Whether this is a [`LayerError::Shape`].
    #[must_use]
    pub fn is_shape(&self) -> bool {
        matches!(self, Self::Shape { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, LayerError>;
