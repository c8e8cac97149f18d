//! The primitive kernel catalogue.
//!
//! Every type here implements [`crate::kernel::PrimitiveKernel`] and is wired
//! into the expression algebra, so instances combine directly with `+` and
//! `*` into a [`crate::kernel::Kernel`] tree.

mod arccosine;
mod constant;
mod coregion;
mod linear;
mod periodic;
mod stationary;

pub use arccosine::{ArcCosine, IMPLEMENTED_ORDERS};
pub use constant::{Bias, Constant, White};
pub use coregion::Coregion;
pub use linear::{Linear, Polynomial};
pub use periodic::Periodic;
pub use stationary::{Cosine, Exponential, Matern12, Matern32, Matern52, Rbf};

use crate::kernel::impl_kernel_ops;

impl_kernel_ops!(
    ArcCosine, Bias, Constant, Coregion, Cosine, Exponential, Linear, Matern12, Matern32,
    Matern52, Periodic, Polynomial, Rbf, White,
);
