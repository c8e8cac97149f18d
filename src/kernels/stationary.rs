//! Stationary kernels: functions of the scaled distance between inputs.
//!
//! All kernels here share a `variance` (signal scale) and `lengthscales`
//! parameter, the latter scalar (isotropic) or per-dimension (ARD). The
//! shift-invariant members other than Cosine admit a random Fourier feature
//! approximation whose basis is drawn once from a stored seed.

use std::any::Any;

use crate::error::{KernelError, Result};
use crate::features::{FourierBasis, Spectral};
use crate::kernel::PrimitiveKernel;
use crate::param::{Param, ParamValue};
use crate::slicing::ActiveDims;

/// Default random feature count when none is configured.
const DEFAULT_NUM_FEATURES: usize = 100;
/// Default basis seed; override with `with_seed` for independent draws.
const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Rbf,
    Exponential,
    Matern12,
    Matern32,
    Matern52,
    Cosine,
}

impl Shape {
    /// Correlation as a function of the scaled squared distance `r2`.
    fn value(self, r2: f64) -> f64 {
        let r = r2.sqrt();
        match self {
            Shape::Rbf => (-0.5 * r2).exp(),
            Shape::Exponential => (-0.5 * r).exp(),
            Shape::Matern12 => (-r).exp(),
            Shape::Matern32 => {
                let s = 3.0_f64.sqrt() * r;
                (1.0 + s) * (-s).exp()
            }
            Shape::Matern52 => {
                let s = 5.0_f64.sqrt() * r;
                (1.0 + s + 5.0 * r2 / 3.0) * (-s).exp()
            }
            Shape::Cosine => r.cos(),
        }
    }

    /// Spectral density and lengthscale factor for Fourier approximation.
    ///
    /// The factor rewrites the kernel as a unit-form member of the same
    /// family: Exponential is Matern-1/2 at twice the lengthscale.
    fn spectral(self) -> Option<(Spectral, f64)> {
        match self {
            Shape::Rbf => Some((Spectral::Gaussian, 1.0)),
            Shape::Exponential => Some((Spectral::StudentT { df: 1.0 }, 2.0)),
            Shape::Matern12 => Some((Spectral::StudentT { df: 1.0 }, 1.0)),
            Shape::Matern32 => Some((Spectral::StudentT { df: 3.0 }, 1.0)),
            Shape::Matern52 => Some((Spectral::StudentT { df: 5.0 }, 1.0)),
            Shape::Cosine => None,
        }
    }
}

#[derive(Debug, Clone)]
struct StationaryCore {
    input_dim: usize,
    shape: Shape,
    variance: Param,
    lengthscales: Param,
    active_dims: ActiveDims,
    name: Option<String>,
    num_features: usize,
    seed: u64,
    basis: Option<FourierBasis>,
}

impl StationaryCore {
    fn new(input_dim: usize, shape: Shape) -> Result<Self> {
        if input_dim == 0 {
            return Err(KernelError::invalid_parameter(
                "input_dim",
                0,
                "must be at least 1",
            ));
        }
        let mut core = Self {
            input_dim,
            shape,
            variance: Param::positive("variance", 1.0, false, 1)?,
            lengthscales: Param::positive("lengthscales", 1.0, false, input_dim)?,
            active_dims: ActiveDims::All,
            name: None,
            num_features: DEFAULT_NUM_FEATURES,
            seed: DEFAULT_SEED,
            basis: None,
        };
        core.redraw_basis();
        Ok(core)
    }

    fn label<'a>(&'a self, base: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(base)
    }

    fn set_variance(&mut self, v: f64) -> Result<()> {
        self.variance.assign(v)
    }

    fn set_lengthscales(&mut self, v: impl Into<ParamValue>) -> Result<()> {
        let ard = !self.lengthscales.is_scalar();
        self.lengthscales = Param::positive("lengthscales", v, ard, self.input_dim)?;
        Ok(())
    }

    fn enable_ard(&mut self) -> Result<()> {
        if self.lengthscales.is_scalar() {
            self.lengthscales = Param::positive(
                "lengthscales",
                self.lengthscales.scalar_value(),
                true,
                self.input_dim,
            )?;
        }
        Ok(())
    }

    fn set_num_features(&mut self, m: usize) {
        self.num_features = m;
        self.redraw_basis();
    }

    fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.redraw_basis();
    }

    fn redraw_basis(&mut self) {
        self.basis = self.shape.spectral().map(|(spectral, _)| {
            FourierBasis::draw(spectral, self.num_features, self.input_dim, self.seed)
        });
    }

    /// Scaled squared distance between two sliced rows.
    fn scaled_square_dist(&self, x: &[f64], y: &[f64]) -> f64 {
        x.iter()
            .zip(y.iter())
            .enumerate()
            .map(|(d, (xi, yi))| {
                let diff = (xi - yi) / self.lengthscales.value_at(d);
                diff * diff
            })
            .sum()
    }

    fn eval(&self, x: &[f64], y: &[f64]) -> Result<f64> {
        let r2 = self.scaled_square_dist(x, y);
        Ok(self.variance.scalar_value() * self.shape.value(r2))
    }

    fn compile(&mut self) -> Result<()> {
        if self.basis.is_none() {
            self.redraw_basis();
        }
        Ok(())
    }

    fn feature_map_sliced(&self, xs: &[Vec<f64>], label: &str) -> Result<Vec<Vec<f64>>> {
        let (_, ls_factor) = self.shape.spectral().ok_or_else(|| {
            KernelError::NotImplemented {
                kernel: label.to_string(),
            }
        })?;
        let basis = self.basis.as_ref().ok_or_else(|| {
            KernelError::ComputationError(format!(
                "kernel '{}' was cleared; call compile() before feature_map",
                label
            ))
        })?;
        Ok(xs
            .iter()
            .map(|x| {
                basis.transform_row(x, &self.lengthscales, ls_factor, self.variance.scalar_value())
            })
            .collect())
    }
}

macro_rules! stationary_kernel {
    ($(#[$meta:meta])* $name:ident, $base:literal, $shape:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            core: StationaryCore,
        }

        impl $name {
            /// Create the kernel over `input_dim` active columns with unit
            /// variance and lengthscale.
            pub fn new(input_dim: usize) -> Result<Self> {
                Ok(Self {
                    core: StationaryCore::new(input_dim, $shape)?,
                })
            }

            pub fn with_variance(mut self, v: f64) -> Result<Self> {
                self.core.set_variance(v)?;
                Ok(self)
            }

            /// Set the lengthscales: a vector switches the kernel to ARD,
            /// a scalar keeps (or broadcasts over) the current shape.
            pub fn with_lengthscales(mut self, v: impl Into<ParamValue>) -> Result<Self> {
                self.core.set_lengthscales(v)?;
                Ok(self)
            }

            /// Enable ARD, broadcasting a scalar lengthscale per dimension.
            pub fn with_ard(mut self) -> Result<Self> {
                self.core.enable_ard()?;
                Ok(self)
            }

            pub fn with_active_dims(mut self, dims: impl Into<ActiveDims>) -> Self {
                self.core.active_dims = dims.into();
                self
            }

            pub fn with_name(mut self, name: impl Into<String>) -> Self {
                self.core.name = Some(name.into());
                self
            }

            /// Width of the random feature approximation.
            pub fn with_num_features(mut self, m: usize) -> Self {
                self.core.set_num_features(m);
                self
            }

            /// Seed of the random feature basis.
            pub fn with_seed(mut self, seed: u64) -> Self {
                self.core.set_seed(seed);
                self
            }

            pub fn variance(&self) -> &Param {
                &self.core.variance
            }

            pub fn lengthscales(&self) -> &Param {
                &self.core.lengthscales
            }

            pub fn set_variance(&mut self, v: f64) -> Result<()> {
                self.core.set_variance(v)
            }

            pub fn set_lengthscales(&mut self, v: impl Into<ParamValue>) -> Result<()> {
                self.core.set_lengthscales(v)
            }
        }

        impl PrimitiveKernel for $name {
            fn base_name(&self) -> &'static str {
                $base
            }

            fn label(&self) -> &str {
                self.core.label($base)
            }

            fn input_dim(&self) -> usize {
                self.core.input_dim
            }

            fn active_dims(&self) -> &ActiveDims {
                &self.core.active_dims
            }

            fn eval(&self, x: &[f64], y: &[f64]) -> Result<f64> {
                self.core.eval(x, y)
            }

            fn eval_diag(&self, _x: &[f64]) -> Result<f64> {
                Ok(self.core.variance.scalar_value())
            }

            fn feature_map(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
                let xs = self.slice_input(x)?;
                self.core.feature_map_sliced(&xs, self.label())
            }

            fn compile(&mut self) -> Result<()> {
                self.core.compile()
            }

            fn clear(&mut self) {
                self.core.basis = None;
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

stationary_kernel!(
    /// Squared-exponential kernel:
    /// `K(x, y) = variance * exp(-||x - y||^2 / (2 * lengthscale^2))`.
    Rbf,
    "rbf",
    Shape::Rbf
);

stationary_kernel!(
    /// Exponential kernel: `K = variance * exp(-r / 2)` in scaled distance.
    Exponential,
    "exponential",
    Shape::Exponential
);

stationary_kernel!(
    /// Matern kernel with nu = 1/2: `K = variance * exp(-r)`.
    Matern12,
    "matern12",
    Shape::Matern12
);

stationary_kernel!(
    /// Matern kernel with nu = 3/2:
    /// `K = variance * (1 + sqrt(3) r) exp(-sqrt(3) r)`.
    Matern32,
    "matern32",
    Shape::Matern32
);

stationary_kernel!(
    /// Matern kernel with nu = 5/2:
    /// `K = variance * (1 + sqrt(5) r + 5 r^2 / 3) exp(-sqrt(5) r)`.
    Matern52,
    "matern52",
    Shape::Matern52
);

stationary_kernel!(
    /// Cosine kernel: `K = variance * cos(r)`. No feature map.
    Cosine,
    "cosine",
    Shape::Cosine
);
