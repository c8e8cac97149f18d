//! Numerical input gradients of kernel matrices.

use crate::error::Result;
use crate::kernel::Kernel;

const STEP: f64 = 1e-6;

/// Gradient of `sum(K(x))` with respect to every entry of `x`, by central
/// finite differences. The result has the shape of `x`.
///
/// Useful as a smoke test that a kernel is differentiable where it should
/// be; kernels that clamp intermediate values (arc-cosine at coincident
/// rows) stay finite here.
pub fn input_gradient(kernel: &Kernel, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let mut perturbed = x.to_vec();
    let mut grad: Vec<Vec<f64>> = x.iter().map(|row| vec![0.0; row.len()]).collect();
    for i in 0..x.len() {
        for d in 0..x[i].len() {
            let original = perturbed[i][d];
            perturbed[i][d] = original + STEP;
            let plus = gram_sum(kernel, &perturbed)?;
            perturbed[i][d] = original - STEP;
            let minus = gram_sum(kernel, &perturbed)?;
            perturbed[i][d] = original;
            grad[i][d] = (plus - minus) / (2.0 * STEP);
        }
    }
    Ok(grad)
}

fn gram_sum(kernel: &Kernel, x: &[Vec<f64>]) -> Result<f64> {
    Ok(kernel
        .k(x)?
        .iter()
        .map(|row| row.iter().sum::<f64>())
        .sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::{ArcCosine, Rbf};
    use approx::assert_relative_eq;

    #[test]
    fn test_rbf_gradient_matches_analytic_1d() {
        let kernel: Kernel = Rbf::new(1).unwrap().into();
        let x = vec![vec![0.0], vec![0.8]];
        let grad = input_gradient(&kernel, &x).unwrap();
        // d/dx0 of 2*exp(-(x0-x1)^2/2) at x0-x1 = -0.8.
        let diff = -0.8_f64;
        let analytic = -2.0 * diff * (-0.5 * diff * diff).exp();
        assert_relative_eq!(grad[0][0], analytic, max_relative = 1e-4);
        assert_relative_eq!(grad[1][0], -analytic, max_relative = 1e-4);
    }

    #[test]
    fn test_arccosine_gradient_finite_at_coincident_rows() {
        for order in crate::kernels::IMPLEMENTED_ORDERS {
            let kernel: Kernel = ArcCosine::new(2, order).unwrap().into();
            let x = vec![vec![0.3, -0.5], vec![0.3, -0.5]];
            let grad = input_gradient(&kernel, &x).unwrap();
            for row in grad {
                for g in row {
                    assert!(g.is_finite());
                }
            }
        }
    }
}
