//! Input-independent kernels: Constant, Bias and White noise.

use std::any::Any;

use crate::error::{KernelError, Result};
use crate::kernel::PrimitiveKernel;
use crate::param::Param;
use crate::slicing::ActiveDims;

macro_rules! flat_kernel {
    ($(#[$meta:meta])* $name:ident, $base:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            input_dim: usize,
            variance: Param,
            active_dims: ActiveDims,
            name: Option<String>,
        }

        impl $name {
            pub fn new(input_dim: usize) -> Result<Self> {
                if input_dim == 0 {
                    return Err(KernelError::invalid_parameter(
                        "input_dim",
                        0,
                        "must be at least 1",
                    ));
                }
                Ok(Self {
                    input_dim,
                    variance: Param::positive("variance", 1.0, false, 1)?,
                    active_dims: ActiveDims::All,
                    name: None,
                })
            }

            pub fn with_variance(mut self, v: f64) -> Result<Self> {
                self.variance.assign(v)?;
                Ok(self)
            }

            pub fn with_active_dims(mut self, dims: impl Into<ActiveDims>) -> Self {
                self.active_dims = dims.into();
                self
            }

            pub fn with_name(mut self, name: impl Into<String>) -> Self {
                self.name = Some(name.into());
                self
            }

            pub fn variance(&self) -> &Param {
                &self.variance
            }

            pub fn set_variance(&mut self, v: f64) -> Result<()> {
                self.variance.assign(v)
            }
        }

        impl PrimitiveKernel for $name {
            fn base_name(&self) -> &'static str {
                $base
            }

            fn label(&self) -> &str {
                self.name.as_deref().unwrap_or($base)
            }

            fn input_dim(&self) -> usize {
                self.input_dim
            }

            fn active_dims(&self) -> &ActiveDims {
                &self.active_dims
            }

            fn eval(&self, _x: &[f64], _y: &[f64]) -> Result<f64> {
                Ok(self.variance.scalar_value())
            }

            /// One column of `sqrt(variance)` reproduces the constant gram
            /// matrix exactly.
            fn feature_map(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
                let xs = self.slice_input(x)?;
                let col = self.variance.scalar_value().sqrt();
                Ok(xs.iter().map(|_| vec![col]).collect())
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }
    };
}

flat_kernel!(
    /// Constant kernel: `K(x, y) = variance` everywhere.
    Constant,
    "constant"
);

flat_kernel!(
    /// Bias kernel, a constant offset term for additive models.
    /// Identical covariance to [`Constant`] under its own name.
    Bias,
    "bias"
);

/// White noise kernel.
///
/// The one-argument gram matrix is `variance * I`; the cross-covariance
/// between two input sets is all zeros, even where rows coincide. The
/// asymmetry is deliberate: noise is independent across function draws.
#[derive(Debug, Clone)]
pub struct White {
    input_dim: usize,
    variance: Param,
    active_dims: ActiveDims,
    name: Option<String>,
}

impl White {
    pub fn new(input_dim: usize) -> Result<Self> {
        if input_dim == 0 {
            return Err(KernelError::invalid_parameter(
                "input_dim",
                0,
                "must be at least 1",
            ));
        }
        Ok(Self {
            input_dim,
            variance: Param::positive("variance", 1.0, false, 1)?,
            active_dims: ActiveDims::All,
            name: None,
        })
    }

    pub fn with_variance(mut self, v: f64) -> Result<Self> {
        self.variance.assign(v)?;
        Ok(self)
    }

    pub fn with_active_dims(mut self, dims: impl Into<ActiveDims>) -> Self {
        self.active_dims = dims.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn variance(&self) -> &Param {
        &self.variance
    }

    pub fn set_variance(&mut self, v: f64) -> Result<()> {
        self.variance.assign(v)
    }
}

impl PrimitiveKernel for White {
    fn base_name(&self) -> &'static str {
        "white"
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("white")
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn active_dims(&self) -> &ActiveDims {
        &self.active_dims
    }

    /// Cross-covariance entry: always zero, noise does not correlate
    /// across evaluation sets.
    fn eval(&self, _x: &[f64], _y: &[f64]) -> Result<f64> {
        Ok(0.0)
    }

    fn eval_diag(&self, _x: &[f64]) -> Result<f64> {
        Ok(self.variance.scalar_value())
    }

    /// `variance * I`, keyed on row index rather than row value.
    fn k(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let xs = self.slice_input(x)?;
        let n = xs.len();
        let v = self.variance.scalar_value();
        let mut gram = vec![vec![0.0; n]; n];
        for (i, row) in gram.iter_mut().enumerate() {
            row[i] = v;
        }
        Ok(gram)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
