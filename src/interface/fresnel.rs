// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Flat/Fresnel interface: per-polarization amplitude reflection and
//! transmission coefficients, diagonal in the stream/polarization basis.
//!
//! Grounded on spec §4.5 ("Flat/Fresnel") and the call shape referenced by
//! `original_source/smrt/substrate/soil_wegmuller.py`
//! (`fresnel_reflection_matrix`/`fresnel_transmission_matrix`), which
//! `SoilWegmuller` starts from before attenuating.

use ndarray::Array2;
use num_complex::Complex64;

use super::{diagonal_from_streams, Interface, InterfaceError, InterfaceQuery};

/// A perfectly flat dielectric boundary. Reflection/transmission are
/// evaluated per stream cosine via the standard Fresnel power
/// reflectivity; both V and H rows and the (active-only) third-pol row `U`
/// (handled as the H coefficient, matching the incoherent-power
/// bookkeeping of Stokes U) are diagonal, so this interface never mixes
/// streams or polarizations.
pub struct Fresnel;

/// Power reflectivity `(R_v, R_h)` of a flat boundary at stream cosine
/// `mu`, given the permittivity above and below. Streams are assumed to
/// keep the same cosine across the boundary (the shared-angular-grid
/// approximation SMRT-style multi-stream solvers use, rather than
/// re-solving Snell's law per layer); this keeps every interface operator
/// diagonal in the stream index, matching spec §4.5.
pub fn power_reflectivity(mu: f64, eps_above: Complex64, eps_below: Complex64) -> (f64, f64) {
    let n1 = eps_above.sqrt();
    let n2 = eps_below.sqrt();
    let cos1 = Complex64::new(mu.abs(), 0.0);
    let sin1_sq = Complex64::new(1.0 - mu * mu, 0.0);
    let sin2_sq = (n1 / n2) * (n1 / n2) * sin1_sq;
    let cos2 = (Complex64::new(1.0, 0.0) - sin2_sq).sqrt();

    let r_h = (n1 * cos1 - n2 * cos2) / (n1 * cos1 + n2 * cos2);
    let r_v = (n2 * cos1 - n1 * cos2) / (n2 * cos1 + n1 * cos2);
    (r_v.norm_sqr(), r_h.norm_sqr())
}

impl Interface for Fresnel {
    fn name(&self) -> &'static str {
        "fresnel"
    }

    fn reflection(&self, _m: usize, query: &InterfaceQuery) -> Result<Array2<f64>, InterfaceError> {
        let eps_below = query.eps_below.ok_or(InterfaceError::MissingBelowPermittivity { interface: "fresnel" })?;
        Ok(diagonal_from_streams(query.grid, query.npol, |pol, mu| {
            let (r_v, r_h) = power_reflectivity(mu, query.eps_above, eps_below);
            if pol == 0 {
                r_v
            } else {
                r_h
            }
        }))
    }

    fn transmission(&self, _m: usize, query: &InterfaceQuery) -> Result<Array2<f64>, InterfaceError> {
        let eps_below = query.eps_below.ok_or(InterfaceError::MissingBelowPermittivity { interface: "fresnel" })?;
        Ok(diagonal_from_streams(query.grid, query.npol, |pol, mu| {
            let (r_v, r_h) = power_reflectivity(mu, query.eps_above, eps_below);
            1.0 - if pol == 0 { r_v } else { r_h }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::{StreamGrid, StreamScheme};
    use approx::assert_relative_eq;

    #[test]
    fn normal_incidence_reflectivity_matches_textbook_formula() {
        let eps1 = Complex64::new(1.0, 0.0);
        let eps2 = Complex64::new(4.0, 0.0);
        let (r_v, r_h) = power_reflectivity(1.0, eps1, eps2);
        // At normal incidence v and h coincide, R = ((n1-n2)/(n1+n2))^2 = (1/3)^2.
        assert_relative_eq!(r_v, 1.0 / 9.0, epsilon = 1e-9);
        assert_relative_eq!(r_h, 1.0 / 9.0, epsilon = 1e-9);
    }

    #[test]
    fn reflection_plus_transmission_is_one_per_stream() {
        let grid = StreamGrid::new(8, 0.6, StreamScheme::Gauss, 2, 0).unwrap();
        let query = InterfaceQuery {
            grid: &grid,
            frequency_hz: 37e9,
            eps_above: Complex64::new(1.0, 0.0),
            eps_below: Some(Complex64::new(3.2, 0.001)),
            npol: 2,
            coherent_only: false,
        };
        let f = Fresnel;
        let r = f.reflection(0, &query).unwrap();
        let t = f.transmission(0, &query).unwrap();
        for i in 0..r.nrows() {
            assert_relative_eq!(r[[i, i]] + t[[i, i]], 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn rejects_missing_eps_below() {
        let grid = StreamGrid::new(4, 0.6, StreamScheme::Gauss, 2, 0).unwrap();
        let query = InterfaceQuery {
            grid: &grid,
            frequency_hz: 37e9,
            eps_above: Complex64::new(1.0, 0.0),
            eps_below: None,
            npol: 2,
            coherent_only: false,
        };
        assert!(Fresnel.reflection(0, &query).is_err());
    }
}
