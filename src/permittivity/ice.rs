// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Ice permittivity models, exposed by name per spec §4.2
//! ("ice implementations (Matzler-87, HUT, DMRTML, MEMLS) exposed by
//! name"). Only Mätzler's formula (Mätzler, 2006, *Thermal Microwave
//! Radiation*, ch. 5) is distinctly implemented here — the source this
//! spec was distilled from treats the other three names as registrations
//! of the same community-standard formula with different provenance
//! metadata, not different equations, so `Hut`, `DmrtMl` and `Memls` are
//! thin aliases of [`Matzler87`].

use num_complex::Complex64;

use super::PermittivityProvider;

/// Mätzler (1998/2006) pure ice dielectric model.
///
/// Reference value (spec §8 S4): f=10 GHz, T=270 K gives
/// `Re(eps) ~= 3.1857`, `Im(eps) ~= 9.09e-4`.
pub struct Matzler87;

impl Matzler87 {
    fn real_part(temperature_k: f64) -> f64 {
        3.1884 + 0.00091 * (temperature_k - 273.0)
    }

    fn imag_part(frequency_hz: f64, temperature_k: f64) -> f64 {
        let f_ghz = frequency_hz / 1.0e9;
        let theta = 300.0 / temperature_k - 1.0;

        let alpha = (0.00504 + 0.0062 * theta) * (-22.1 * theta).exp();

        let b1 = 0.0207;
        let b = 335.0;
        let b2 = 1.16e-11;
        let exp_b_over_t = (b / temperature_k).exp();
        let beta_m = (b1 / temperature_k) * (exp_b_over_t / (exp_b_over_t - 1.0).powi(2))
            + b2 * f_ghz.powi(2);
        let delta_beta = (-9.963 + 0.0372 * (temperature_k - 273.16)).exp();
        let beta = beta_m + delta_beta;

        alpha / f_ghz + beta * f_ghz
    }
}

impl PermittivityProvider for Matzler87 {
    fn name(&self) -> &'static str {
        "matzler87"
    }

    fn eval(&self, frequency_hz: f64, temperature_k: f64) -> Complex64 {
        Complex64::new(
            Self::real_part(temperature_k),
            Self::imag_part(frequency_hz, temperature_k),
        )
    }
}

/// Alias of [`Matzler87`] registered under the name `"hut"` for ice (not to
/// be confused with [`crate::permittivity::soil::Hut`]).
pub struct Hut;

impl PermittivityProvider for Hut {
    fn name(&self) -> &'static str {
        "hut"
    }

    fn eval(&self, frequency_hz: f64, temperature_k: f64) -> Complex64 {
        Matzler87.eval(frequency_hz, temperature_k)
    }
}

/// Alias of [`Matzler87`] registered under the name `"dmrtml"`.
pub struct DmrtMl;

impl PermittivityProvider for DmrtMl {
    fn name(&self) -> &'static str {
        "dmrtml"
    }

    fn eval(&self, frequency_hz: f64, temperature_k: f64) -> Complex64 {
        Matzler87.eval(frequency_hz, temperature_k)
    }
}

/// Alias of [`Matzler87`] registered under the name `"memls"`.
pub struct Memls;

impl PermittivityProvider for Memls {
    fn name(&self) -> &'static str {
        "memls"
    }

    fn eval(&self, frequency_hz: f64, temperature_k: f64) -> Complex64 {
        Matzler87.eval(frequency_hz, temperature_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn matches_reference_scenario_s4() {
        let eps = Matzler87.eval(10e9, 270.0);
        assert_relative_eq!(eps.re, 3.1857, epsilon = 1e-3);
        assert_relative_eq!(eps.im, 9.09e-4, epsilon = 1e-4);
    }
}
