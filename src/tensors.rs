//! Core tensor data structures.
//!
//! # Tensor Plumbing
//!
//! The layers in this crate only need a thin tensor type: a shape and a flat
//! row-major buffer. Everything heavier (graphs, devices, broadcasting) is
//! left to whatever framework drives the layers.
//!
//! It supports:
//! - Construction of N-dimensional tensors with checked or panicking shape validation
//! - Column extraction and 2-D indexing for batch × feature inputs
//! - `WithGrad` wrappers pairing a parameter with its accumulated gradient
//! - The `tensor!` macro for literal tensors
//!
//! ## Example
//!
//! ```rust
//! use pinn_layers::tensors::Tensor;
//! let t = Tensor::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]);
//! assert_eq!(t.shape, vec![2, 2]);
//! assert_eq!(t.column(1), vec![2.0, 4.0]);
//! ```

use crate::error::{LayerError, Result};

/// Represents an N-dimensional tensor with a shape and flat row-major data.
///
/// - `shape` defines the structure, e.g., `[batch, features]`.
/// - `data` holds the flattened content in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T> {
    /// Dimension sizes, outermost first.
    pub shape: Vec<usize>,
    /// Flattened row-major elements.
    pub data: Vec<T>,
}

/// A 64-bit float tensor, the element type every layer computes in.
pub type Ten64 = Tensor<f64>;

impl<T> Tensor<T> {
    /// Creates a new tensor with the given shape and flat data.
    ///
    /// # Panics
    /// Panics if the number of elements in `data` does not match the shape product.
    pub fn new(shape: impl Into<Vec<usize>>, data: Vec<T>) -> Self {
        let shape = shape.into();
        assert_eq!(
            shape.iter().product::<usize>(),
            data.len(),
            "shape {:?} is incompatible with {} data elements",
            shape,
            data.len()
        );
        Self { shape, data }
    }

    /// Creates a new tensor, reporting a shape error instead of panicking.
    ///
    /// # Errors
    /// Returns [`LayerError::Shape`] if `data` does not fill `shape` exactly.
    pub fn try_new(shape: impl Into<Vec<usize>>, data: Vec<T>) -> Result<Self> {
        let shape = shape.into();
        let expected = shape.iter().product::<usize>();
        if expected != data.len() {
            return Err(LayerError::shape(
                "Tensor",
                format!("shape {shape:?} is incompatible with {} data elements", data.len()),
            ));
        }
        Ok(Self { shape, data })
    }

    /// Number of dimensions.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T: Copy> Tensor<T> {
    /// Returns element `(row, col)` of a rank-2 tensor.
    ///
    /// # Panics
    /// Panics if the tensor is not rank 2 or the index is out of bounds.
    #[must_use]
    pub fn get2(&self, row: usize, col: usize) -> T {
        assert_eq!(self.rank(), 2, "get2 requires a rank 2 tensor");
        let cols = self.shape[1];
        assert!(col < cols, "column {col} out of bounds for {cols} columns");
        self.data[row * cols + col]
    }

    /// Copies column `col` of a rank-2 tensor into a vector.
    ///
    /// # Panics
    /// Panics if the tensor is not rank 2 or `col` is out of bounds.
    #[must_use]
    pub fn column(&self, col: usize) -> Vec<T> {
        assert_eq!(self.rank(), 2, "column requires a rank 2 tensor");
        let cols = self.shape[1];
        assert!(col < cols, "column {col} out of bounds for {cols} columns");
        self.data.iter().skip(col).step_by(cols).copied().collect()
    }
}

impl<T: Default + Clone> Tensor<T> {
    /// Creates a tensor of the given shape filled with `T::default()`.
    pub fn zeros(shape: impl Into<Vec<usize>>) -> Self {
        let shape = shape.into();
        let len = shape.iter().product();
        Self {
            shape,
            data: vec![T::default(); len],
        }
    }
}

/// A container for tracking gradients of values (used in autograd).
///
/// Typically used as `WithGrad<Ten64>` for layer kernels.
#[derive(Debug, Clone, PartialEq)]
pub struct WithGrad<T> {
    /// Current value.
    pub value: T,
    /// Accumulated gradient, same shape as `value`.
    pub grad: T,
}

impl<T: Default + Clone> WithGrad<Tensor<T>> {
    /// Pairs a tensor with a zeroed gradient of the same shape.
    pub fn new(value: Tensor<T>) -> Self {
        let grad = Tensor::zeros(value.shape.clone());
        Self { value, grad }
    }
}

impl<T: Default + Clone> From<Tensor<T>> for WithGrad<Tensor<T>> {
    fn from(value: Tensor<T>) -> Self {
        Self::new(value)
    }
}

/// Defines a tensor from nested literal arrays.
///
/// Supports arbitrary dimensionality as long as sublists are uniform in shape.
///
/// # Example
/// ```
/// use pinn_layers::tensor;
/// let t = tensor!([[1.0, 2.0], [3.0, 4.0]]);
/// assert_eq!(t.shape, vec![2, 2]);
/// ```
#[macro_export]
macro_rules! tensor {
    ($lit:literal) => {
        $crate::tensors::Tensor::new(Vec::<usize>::new(), vec![$lit])
    };

    ([ $( $inner:tt ),+ $(,)? ]) => {{
        let children = vec![ $( $crate::tensor!($inner) ),+ ];
        let first_shape = &children[0].shape;
        assert!(children.iter().all(|c| c.shape == *first_shape),
            "ragged tensor literal (rows have mismatched shapes)");
        let mut shape = vec![children.len()];
        shape.extend_from_slice(first_shape);
        let mut data = Vec::with_capacity(children.len() * children[0].data.len());
        for c in children { data.extend(c.data); }
        $crate::tensors::Tensor::new(shape, data)
    }};
}
