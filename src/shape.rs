//! Static shape descriptors.
//!
//! A [`Shape`] is what a layer sees before any data flows through it: some
//! dimensions are known, others (typically the batch) are not. Layers use it
//! to allocate parameters at build time and to infer their output shape
//! without running the computation.

use core::fmt;

use crate::tensors::Tensor;

/// A shape whose dimensions may be unspecified (`None`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape(Vec<Option<usize>>);

impl Shape {
    /// Creates a shape from explicit, possibly unknown, dimensions.
    #[must_use]
    pub fn new(dims: Vec<Option<usize>>) -> Self {
        Self(dims)
    }

    /// `(None, features)`: a batch of rows with a known feature count.
    #[must_use]
    pub fn batched(features: usize) -> Self {
        Self(vec![None, Some(features)])
    }

    /// `(None, None)`: rank 2 but nothing else known.
    #[must_use]
    pub fn unknown_features() -> Self {
        Self(vec![None, None])
    }

    /// Number of dimensions.
    #[inline]
    #[must_use]
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// The dimensions, outermost first.
    #[inline]
    #[must_use]
    pub fn dims(&self) -> &[Option<usize>] {
        &self.0
    }

    /// Trailing (feature) dimension. `None` when unknown or when the shape is
    /// rank 0.
    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied().flatten()
    }

    /// Leading (batch) dimension, `None` when unknown.
    #[must_use]
    pub fn batch(&self) -> Option<usize> {
        self.0.first().copied().flatten()
    }

    /// Whether every dimension is known.
    #[must_use]
    pub fn is_fully_defined(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    /// The `(batch, 1)` shape every layer in this crate produces.
    #[must_use]
    pub fn output(&self) -> Self {
        Self(vec![self.batch(), Some(1)])
    }
}

impl From<(usize, usize)> for Shape {
    fn from((batch, features): (usize, usize)) -> Self {
        Self(vec![Some(batch), Some(features)])
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self(dims.iter().copied().map(Some).collect())
    }
}

impl<T> From<&Tensor<T>> for Shape {
    fn from(tensor: &Tensor<T>) -> Self {
        Self::from(tensor.shape.as_slice())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, dim) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match dim {
                Some(d) => write!(f, "{d}")?,
                None => write!(f, "None")?,
            }
        }
        // a one-element tuple keeps its trailing comma
        if self.0.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}
