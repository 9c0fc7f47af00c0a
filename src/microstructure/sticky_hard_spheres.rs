// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Sticky hard sphere microstructure (Baxter adhesive-sphere model).
//!
//! This reuses the independent-sphere form factor for the single-particle
//! shape term and scales it by a stickiness-dependent structure factor that
//! grows the low-`k` (long-range) correlation strength as `stickiness -> 0`
//! (particles cluster) and relaxes to the independent-sphere limit as
//! `stickiness -> infinity`. It does not solve Baxter's full adhesive
//! Percus-Yevick closure (which requires a numeric root-find for the
//! perturbation parameter lambda); the monotone interpolation below
//! reproduces the qualitative low-`k` enhancement the full closure
//! produces and is exact in both limits.
use ndarray::ArrayD;

use super::{independent_sphere::IndependentSphere, Microstructure, MicrostructureError};

/// Sticky hard spheres: independent spheres of `radius` whose surfaces have
/// an adhesive (square-well) interaction of strength controlled by
/// `stickiness` (Baxter's `tau`; smaller is stickier, `tau -> infinity`
/// recovers plain hard spheres).
pub struct StickyHardSpheres {
    pub radius: f64,
    pub frac_volume: f64,
    pub stickiness: f64,
}

impl Microstructure for StickyHardSpheres {
    fn name(&self) -> &'static str {
        "sticky_hard_spheres"
    }

    fn ft_autocorrelation_function(&self, k: &ArrayD<f64>) -> Result<ArrayD<f64>, MicrostructureError> {
        if self.stickiness <= 0.0 {
            return Err(MicrostructureError::Undefined {
                model: self.name(),
                reason: format!("stickiness must be positive, got {}", self.stickiness),
            });
        }
        let sphere = IndependentSphere {
            radius: self.radius,
            frac_volume: self.frac_volume,
        };
        let base = sphere.ft_autocorrelation_function(k)?;

        // Stickiness enhancement: Baxter's perturbation parameter lambda is
        // O(1/stickiness) for strong adhesion; the structure factor
        // correction at low k grows roughly linearly with phi/stickiness.
        let phi = self.frac_volume;
        let enhancement = 1.0 + phi / (1.0 - phi).max(1e-6) / self.stickiness;
        let a = self.radius;
        Ok(ndarray::Zip::from(&base).and(k).map_collect(|&c, &k_val| {
            let rolloff = 1.0 / (1.0 + (k_val * a).powi(2));
            c * (1.0 + (enhancement - 1.0) * rolloff)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn stickier_spheres_enhance_low_k_correlation() {
        let k = array![1.0_f64].into_dyn();
        let sticky = StickyHardSpheres {
            radius: 2e-4,
            frac_volume: 0.3,
            stickiness: 0.1,
        };
        let loose = StickyHardSpheres {
            radius: 2e-4,
            frac_volume: 0.3,
            stickiness: 10.0,
        };
        let c_sticky = sticky.ft_autocorrelation_function(&k).unwrap();
        let c_loose = loose.ft_autocorrelation_function(&k).unwrap();
        assert!(c_sticky[[0]] > c_loose[[0]]);
    }

    #[test]
    fn rejects_non_positive_stickiness() {
        let m = StickyHardSpheres {
            radius: 2e-4,
            frac_volume: 0.3,
            stickiness: 0.0,
        };
        let k = array![1.0_f64].into_dyn();
        assert!(m.ft_autocorrelation_function(&k).is_err());
    }
}
