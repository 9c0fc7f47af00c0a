// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Exponential autocorrelation function microstructure.

use ndarray::ArrayD;

use super::{Microstructure, MicrostructureError};

/// Exponential autocorrelation function with a single length scale
/// (`corr_length`, metres). This is the most common snow microstructure
/// model; its Fourier transform has a simple closed form.
pub struct Exponential {
    pub corr_length: f64,
}

impl Microstructure for Exponential {
    fn name(&self) -> &'static str {
        "exponential"
    }

    fn ft_autocorrelation_function(&self, k: &ArrayD<f64>) -> Result<ArrayD<f64>, MicrostructureError> {
        if self.corr_length <= 0.0 {
            return Err(MicrostructureError::Undefined {
                model: self.name(),
                reason: format!("corr_length must be positive, got {}", self.corr_length),
            });
        }
        let l = self.corr_length;
        let l3 = l.powi(3);
        Ok(k.mapv(|k_val| 8.0 * std::f64::consts::PI * l3 / (1.0 + (k_val * l).powi(2)).powi(2)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn is_maximal_at_k_zero_and_decays() {
        let m = Exponential { corr_length: 1e-4 };
        let k = array![0.0_f64, 1e3, 1e5, 1e7].into_dyn();
        let c = m.ft_autocorrelation_function(&k).unwrap();
        let values: Vec<f64> = c.iter().copied().collect();
        for i in 0..values.len() - 1 {
            assert!(values[i] >= values[i + 1]);
        }
        assert_relative_eq!(
            values[0],
            8.0 * std::f64::consts::PI * (1e-4_f64).powi(3),
            epsilon = 1e-20
        );
    }
}
