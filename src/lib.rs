//! # GP-Kernels
//!
//! Covariance kernels for Gaussian process models.
//!
//! This crate provides the standard kernel catalogue (RBF, the Matern
//! family, arc-cosine, periodic, dot-product and coregionalization kernels)
//! together with an expression algebra for combining them and explicit
//! feature maps for kernels that admit one.
//!
//! ## Features
//!
//! - ✅ **Kernel Catalogue** - RBF, Matern 1/2, 3/2, 5/2, Exponential,
//!   Cosine, Periodic, Linear, Polynomial, ArcCosine, Coregion, Constant,
//!   Bias, White
//! - ✅ **Kernel Composition** - `+` and `*` build flattened sum/product
//!   trees with named, addressable children
//! - ✅ **Active Dimensions** - every kernel slices its own input columns,
//!   so kernels over different features combine freely
//! - ✅ **ARD Parameters** - scalar or per-dimension lengthscales and
//!   variances with broadcast semantics
//! - ✅ **Feature Maps** - exact expansions for Linear and Constant, random
//!   Fourier expansions for the shift-invariant family
//!
//! ## Kernel Evaluation
//!
//! Primitive kernels expose gram-matrix entry points directly:
//!
//! ```rust
//! use gp_kernels::{PrimitiveKernel, Rbf};
//!
//! let kernel = Rbf::new(2).unwrap().with_lengthscales(0.7).unwrap();
//! let x = vec![vec![0.0, 0.0], vec![1.0, -1.0]];
//! let gram = kernel.k(&x).unwrap();
//! assert_eq!(gram.len(), 2);
//! ```
//!
//! ## Composition
//!
//! Kernels combine with operators into a [`Kernel`] tree; children of a
//! combination get unique names derived from their types:
//!
//! ```rust
//! use gp_kernels::{Linear, Matern32, Rbf};
//!
//! let kernel = Rbf::new(1).unwrap() + Linear::new(1).unwrap() * Matern32::new(1).unwrap();
//! assert_eq!(kernel.child_names(), &["rbf", "prod"]);
//! ```

pub mod error;
mod features;
pub mod gradient;
pub mod kernel;
pub mod kernels;
pub mod param;
pub mod slicing;

pub use error::{KernelError, Result};
pub use gradient::input_gradient;
pub use kernel::{Combination, CombinationOp, Kernel, PrimitiveKernel};
pub use kernels::{
    ArcCosine, Bias, Constant, Coregion, Cosine, Exponential, Linear, Matern12, Matern32,
    Matern52, Periodic, Polynomial, Rbf, White, IMPLEMENTED_ORDERS,
};
pub use param::{Param, ParamValue};
pub use slicing::ActiveDims;
