// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rough-soil substrate (Wegmüller & Mätzler 1999), passive mode only.
//!
//! Grounded on `original_source/smrt/substrate/soil_wegmuller.py`
//! (`adjust`): starts from the flat Fresnel reflectivity then attenuates
//! it by the surface roughness.

use ndarray::Array2;
use num_complex::Complex64;

use crate::constants::C_SPEED;

use super::fresnel::power_reflectivity;
use super::{diagonal_from_streams, Interface, InterfaceError, InterfaceQuery};

/// Rough soil surface. `eps_soil` is the soil's own permittivity (the
/// medium below this boundary); since this is a substrate there is nothing
/// further below *it*, so `eps_soil` is carried on the struct rather than
/// read from [`InterfaceQuery::eps_below`].
pub struct SoilWegmuller {
    eps_soil: Complex64,
    /// RMS height of the surface roughness, metres.
    roughness_rms_m: f64,
    temperature_k: f64,
}

impl SoilWegmuller {
    pub fn new(eps_soil: Complex64, roughness_rms_m: f64, temperature_k: f64) -> SoilWegmuller {
        SoilWegmuller {
            eps_soil,
            roughness_rms_m,
            temperature_k,
        }
    }

    fn reject_active(&self, query: &InterfaceQuery) -> Result<(), InterfaceError> {
        if query.npol == 3 {
            return Err(InterfaceError::UnsupportedMode {
                interface: "soil_wegmuller",
                mode: "active",
            });
        }
        Ok(())
    }

    fn h_reflectivity(&self, mu: f64, frequency_hz: f64, eps_above: Complex64) -> f64 {
        let (_, r_h_flat) = power_reflectivity(mu, eps_above, self.eps_soil);
        let k0 = 2.0 * std::f64::consts::PI * frequency_hz / C_SPEED;
        let exponent = (0.1 * mu.abs()).sqrt();
        let ksigma = k0 * self.roughness_rms_m * eps_above.norm().sqrt();
        r_h_flat * (-ksigma.powf(exponent)).exp()
    }
}

impl Interface for SoilWegmuller {
    fn name(&self) -> &'static str {
        "soil_wegmuller"
    }

    fn is_substrate(&self) -> bool {
        true
    }

    fn substrate_temperature_k(&self) -> Option<f64> {
        Some(self.temperature_k)
    }

    fn reflection(&self, _m: usize, query: &InterfaceQuery) -> Result<Array2<f64>, InterfaceError> {
        self.reject_active(query)?;
        let cos_60 = (60.0_f64).to_radians().cos();
        Ok(diagonal_from_streams(query.grid, query.npol, |pol, mu| {
            let r_h = self.h_reflectivity(mu, query.frequency_hz, query.eps_above);
            if pol == 1 {
                r_h
            } else {
                let mu_abs = mu.abs();
                if mu_abs >= cos_60 {
                    r_h * mu_abs.powf(0.655)
                } else {
                    let theta_deg = mu_abs.acos().to_degrees();
                    r_h * (0.635 - 0.0014 * (theta_deg - 60.0))
                }
            }
        }))
    }

    fn transmission(&self, _m: usize, query: &InterfaceQuery) -> Result<Array2<f64>, InterfaceError> {
        self.reject_active(query)?;
        let n = query.npol * query.grid.total_streams();
        Ok(Array2::zeros((n, n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::{StreamGrid, StreamScheme};

    #[test]
    fn rejects_active_mode() {
        let grid = StreamGrid::new(8, 0.6, StreamScheme::Gauss, 3, 3).unwrap();
        let soil = SoilWegmuller::new(Complex64::new(6.0, 1.0), 0.01, 270.0);
        let query = InterfaceQuery {
            grid: &grid,
            frequency_hz: 10e9,
            eps_above: Complex64::new(1.0, 0.0),
            eps_below: None,
            npol: 3,
            coherent_only: false,
        };
        assert!(matches!(soil.reflection(0, &query), Err(InterfaceError::UnsupportedMode { .. })));
    }

    #[test]
    fn reflectivity_is_bounded() {
        let grid = StreamGrid::new(8, 0.6, StreamScheme::Gauss, 2, 0).unwrap();
        let soil = SoilWegmuller::new(Complex64::new(6.0, 1.0), 0.01, 270.0);
        let query = InterfaceQuery {
            grid: &grid,
            frequency_hz: 10e9,
            eps_above: Complex64::new(1.0, 0.0),
            eps_below: None,
            npol: 2,
            coherent_only: false,
        };
        let r = soil.reflection(0, &query).unwrap();
        for i in 0..r.nrows() {
            assert!(r[[i, i]] >= 0.0 && r[[i, i]] <= 1.0);
        }
    }
}
