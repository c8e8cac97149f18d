//! Random Fourier feature bases for stationary kernel approximation.
//!
//! For a shift-invariant kernel, Bochner's theorem gives a spectral density
//! over frequencies; sampling `m` frequencies and projecting through
//! `z(x) = sqrt(2 sigma^2 / m) * cos(W x + b)` yields features whose inner
//! product converges to the kernel value as `m` grows (Rahimi & Recht, 2007).
//!
//! The basis is drawn once from a stored seed and reused for every call, so
//! repeated `feature_map` evaluations are consistent. Frequencies are stored
//! at unit lengthscale and rescaled by the kernel's current lengthscales at
//! transform time, which keeps parameter mutation visible without redrawing.

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{ChiSquared, Distribution, StandardNormal, Uniform};

use crate::param::Param;

/// Spectral density family of a stationary kernel, at unit lengthscale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Spectral {
    /// Standard normal frequencies (RBF).
    Gaussian,
    /// Student-t frequencies with `df` degrees of freedom (Matern nu = df/2;
    /// df = 1 is the Cauchy density of the exponential-family kernels).
    StudentT { df: f64 },
}

/// A fixed random Fourier basis: `m` frequency rows over `dim` columns plus
/// uniform phase offsets in `[0, 2*pi)`.
#[derive(Debug, Clone)]
pub(crate) struct FourierBasis {
    frequencies: Vec<Vec<f64>>,
    offsets: Vec<f64>,
}

impl FourierBasis {
    /// Draw a basis of `num_features` frequencies for `dim` input columns.
    pub(crate) fn draw(spectral: Spectral, num_features: usize, dim: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let offset_dist = Uniform::new(0.0, 2.0 * std::f64::consts::PI);

        let mut frequencies = Vec::with_capacity(num_features);
        for _ in 0..num_features {
            // One chi-squared draw per frequency row: the multivariate
            // Student-t mixes a single scale into all coordinates.
            let row_scale = match spectral {
                Spectral::Gaussian => 1.0,
                Spectral::StudentT { df } => {
                    let u: f64 = ChiSquared::new(df)
                        .expect("df is a fixed positive constant")
                        .sample(&mut rng);
                    (df / u).sqrt()
                }
            };
            let row: Vec<f64> = (0..dim)
                .map(|_| {
                    let z: f64 = StandardNormal.sample(&mut rng);
                    z * row_scale
                })
                .collect();
            frequencies.push(row);
        }
        let offsets: Vec<f64> = (0..num_features)
            .map(|_| offset_dist.sample(&mut rng))
            .collect();

        debug!(
            "drew Fourier basis: {} features x {} dims, spectral {:?}, seed {}",
            num_features, dim, spectral, seed
        );
        Self {
            frequencies,
            offsets,
        }
    }

    /// Map one (already sliced) input row into the feature space.
    ///
    /// `lengthscale_factor` absorbs shape rescalings such as the Exponential
    /// kernel's effective doubling of its lengthscale.
    pub(crate) fn transform_row(
        &self,
        x: &[f64],
        lengthscales: &Param,
        lengthscale_factor: f64,
        variance: f64,
    ) -> Vec<f64> {
        let m = self.frequencies.len();
        let scale = (2.0 * variance / m as f64).sqrt();
        self.frequencies
            .iter()
            .zip(self.offsets.iter())
            .map(|(freq, &offset)| {
                let proj: f64 = freq
                    .iter()
                    .enumerate()
                    .zip(x.iter())
                    .map(|((d, w), xd)| {
                        w * xd / (lengthscale_factor * lengthscales.value_at(d))
                    })
                    .sum();
                scale * (proj + offset).cos()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_lengthscale() -> Param {
        Param::positive("lengthscales", 1.0, false, 1).unwrap()
    }

    #[test]
    fn test_basis_is_deterministic_for_a_seed() {
        let a = FourierBasis::draw(Spectral::Gaussian, 16, 2, 7);
        let b = FourierBasis::draw(Spectral::Gaussian, 16, 2, 7);
        assert_eq!(a.frequencies, b.frequencies);
        assert_eq!(a.offsets, b.offsets);
    }

    #[test]
    fn test_output_width_matches_feature_count() {
        let basis = FourierBasis::draw(Spectral::Gaussian, 32, 3, 0);
        let z = basis.transform_row(
            &[0.1, 0.2, 0.3],
            &Param::positive("lengthscales", 1.0, true, 3).unwrap(),
            1.0,
            1.0,
        );
        assert_eq!(z.len(), 32);
    }

    #[test]
    fn test_self_inner_product_approximates_variance() {
        // z(x) . z(x) should concentrate around sigma^2 = k(x, x).
        let basis = FourierBasis::draw(Spectral::Gaussian, 4000, 1, 3);
        let ls = unit_lengthscale();
        let z = basis.transform_row(&[1.3], &ls, 1.0, 2.0);
        let dot: f64 = z.iter().map(|v| v * v).sum();
        assert!((dot - 2.0).abs() < 0.2, "got {}", dot);
    }

    #[test]
    fn test_gaussian_basis_approximates_rbf() {
        let basis = FourierBasis::draw(Spectral::Gaussian, 8000, 1, 11);
        let ls = unit_lengthscale();
        let zx = basis.transform_row(&[0.0], &ls, 1.0, 1.0);
        let zy = basis.transform_row(&[1.0], &ls, 1.0, 1.0);
        let dot: f64 = zx.iter().zip(zy.iter()).map(|(a, b)| a * b).sum();
        let expected = (-0.5_f64).exp();
        assert!((dot - expected).abs() < 0.1, "got {} want {}", dot, expected);
    }

    #[test]
    fn test_student_t_basis_approximates_matern12() {
        let basis = FourierBasis::draw(Spectral::StudentT { df: 1.0 }, 20000, 1, 5);
        let ls = unit_lengthscale();
        let zx = basis.transform_row(&[0.0], &ls, 1.0, 1.0);
        let zy = basis.transform_row(&[0.5], &ls, 1.0, 1.0);
        let dot: f64 = zx.iter().zip(zy.iter()).map(|(a, b)| a * b).sum();
        let expected = (-0.5_f64).exp();
        assert!((dot - expected).abs() < 0.1, "got {} want {}", dot, expected);
    }
}
