// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Independent-sphere microstructure: non-overlapping spherical scatterers
//! with no inter-sphere structure (dilute/Poisson limit).

use ndarray::ArrayD;

use super::{Microstructure, MicrostructureError};

/// Independent, randomly placed spheres of a single `radius` (metres).
pub struct IndependentSphere {
    pub radius: f64,
    pub frac_volume: f64,
}

/// Normalized sphere form factor `3(sin(x) - x cos(x)) / x^3`, `f(0) = 1`,
/// regularized near `x = 0` with its Taylor series to avoid cancellation
/// error.
fn sphere_form_factor(x: f64) -> f64 {
    if x.abs() < 1e-4 {
        1.0 - x * x / 10.0
    } else {
        3.0 * (x.sin() - x * x.cos()) / x.powi(3)
    }
}

impl Microstructure for IndependentSphere {
    fn name(&self) -> &'static str {
        "independent_sphere"
    }

    fn ft_autocorrelation_function(&self, k: &ArrayD<f64>) -> Result<ArrayD<f64>, MicrostructureError> {
        if self.radius <= 0.0 {
            return Err(MicrostructureError::Undefined {
                model: self.name(),
                reason: format!("radius must be positive, got {}", self.radius),
            });
        }
        let phi = self.frac_volume;
        let volume = 4.0 / 3.0 * std::f64::consts::PI * self.radius.powi(3);
        let prefactor = 3.0 * phi * (1.0 - phi) * volume;
        Ok(k.mapv(|k_val| {
            let f = sphere_form_factor(k_val * self.radius);
            prefactor * f * f
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn form_factor_is_continuous_at_zero() {
        let left = sphere_form_factor(1e-5);
        let right = sphere_form_factor(1e-3);
        assert_relative_eq!(left, 1.0, epsilon = 1e-6);
        assert_relative_eq!(right, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn vanishes_for_zero_or_full_volume_fraction() {
        let k = array![1e5_f64].into_dyn();
        let dilute = IndependentSphere {
            radius: 2e-4,
            frac_volume: 0.0,
        };
        let dense = IndependentSphere {
            radius: 2e-4,
            frac_volume: 1.0,
        };
        assert_relative_eq!(
            dilute.ft_autocorrelation_function(&k).unwrap()[[0]],
            0.0,
            epsilon = 1e-30
        );
        assert_relative_eq!(
            dense.ft_autocorrelation_function(&k).unwrap()[[0]],
            0.0,
            epsilon = 1e-30
        );
    }
}
