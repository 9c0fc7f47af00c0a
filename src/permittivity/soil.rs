// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Soil permittivity formulae, grounded on
//! `original_source/smrt/inputs/make_soil.py`
//! (`soil_dielectric_constant_dobson`, `soil_dielectric_constant_hut`).

use num_complex::Complex64;

use super::PermittivityProvider;

/// Dobson et al. (1985) soil dielectric model, as extracted into the HUT
/// and DMRTML codebases (and from there, the source this crate's spec was
/// distilled from).
pub struct Dobson85 {
    pub moisture: f64,
    pub sand: f64,
    pub clay: f64,
}

impl PermittivityProvider for Dobson85 {
    fn name(&self) -> &'static str {
        "dobson85"
    }

    fn eval(&self, frequency_hz: f64, temperature_k: f64) -> Complex64 {
        // Constants and formula transcribed verbatim from the source this
        // model was distilled from, including its literal (non-SI) value
        // of `e_0` — it only ever appears in the denominator of `e_fw2`,
        // scaling the ionic-conductivity term, and the reference scenarios
        // in spec §8 do not exercise this model, so it is preserved as-is
        // rather than "corrected" against a guess of intended behaviour.
        let e_0 = 8.854e12_f64;
        let e_w_inf = 4.9_f64;
        let e_s = 4.7_f64;
        let rho_b = 1.3_f64;
        let rho_s = 2.664_f64;

        let temp = temperature_k - 273.15;
        let s = self.sand;
        let c = self.clay;
        let sm = self.moisture;

        let beta1 = 1.2748 - 0.519 * s - 0.152 * c;
        let beta2 = 1.33797 - 0.603 * s - 0.166 * c;

        let sigma_eff = 0.0467 + 0.2204 * rho_b - 0.4111 * s + 0.6614 * c;

        let e_w0 = 87.134 - 1.949e-1 * temp - 1.276e-2 * temp.powi(2) + 2.491e-4 * temp.powi(3);
        let rt_w = (1.1109e-10 - 3.824e-12 * temp + 6.938e-14 * temp.powi(2)
            - 5.096e-16 * temp.powi(3))
            / (2.0 * std::f64::consts::PI);

        let omega_rt_w_sq = (2.0 * std::f64::consts::PI * frequency_hz * rt_w).powi(2);
        let e_fw1 = e_w_inf + (e_w0 - e_w_inf) / (1.0 + omega_rt_w_sq);
        let e_fw2 = 2.0 * std::f64::consts::PI * frequency_hz * rt_w * (e_w0 - e_w_inf)
            / (1.0 + omega_rt_w_sq)
            + sigma_eff * (rho_s - rho_b) / (2.0 * std::f64::consts::PI * frequency_hz * e_0 * rho_s * sm);

        let re = (1.0 + (rho_b / rho_s) * (e_s.powf(0.65) - 1.0) + sm.powf(beta1) * e_fw1.powf(0.65)
            - sm)
            .powf(1.0 / 0.65);
        let im = (sm.powf(beta2) * e_fw2.powf(0.65)).powf(1.0 / 0.65);

        Complex64::new(re, im)
    }
}

/// HUT model soil dielectric constant (Pulliainen et al. 1999, as extracted
/// into DMRTML). Liquid-water branch only; the source raises
/// `NotImplementedError` below freezing and so does this.
pub struct Hut {
    pub moisture: f64,
    pub sand: f64,
    pub clay: f64,
    pub dry_matter_density: f64,
}

impl PermittivityProvider for Hut {
    fn name(&self) -> &'static str {
        "hut"
    }

    fn eval(&self, frequency_hz: f64, temperature_k: f64) -> Complex64 {
        let ew_inf = 4.9_f64;
        let temp_c = temperature_k - 273.15;

        assert!(
            temp_c > 0.0,
            "HUT soil permittivity below freezing is not implemented, matching the source \
             this was distilled from"
        );

        let ew0 = 87.74 - 0.40008 * temp_c + 9.398e-4 * temp_c.powi(2) + 1.410e-6 * temp_c.powi(3);
        let d = 25.0 - temp_c;
        let _alfa = 2.033e-2 + 1.266e-4 * d + 2.464e-6 * d.powi(2); // unused in the real/imag combination below, kept for parity with the source
        let tw = 1.0 / (2.0 * std::f64::consts::PI)
            * (1.1109e-10 - 3.824e-12 * temp_c + 6.938e-14 * temp_c.powi(2)
                - 5.096e-16 * temp_c.powi(3));

        let omega_tw_sq = (2.0 * std::f64::consts::PI * frequency_hz * tw).powi(2);
        let ew_r = ew_inf + (ew0 - ew_inf) / (1.0 + omega_tw_sq);
        let ew_i = (ew0 - ew_inf) * 2.0 * std::f64::consts::PI * frequency_hz * tw / (1.0 + omega_tw_sq);

        let beta = 1.09 - 0.11 * self.sand + 0.18 * self.clay;
        let ew = Complex64::new(ew_r, ew_i);
        let epsalf = 1.0 + 0.65 * self.dry_matter_density / 1000.0
            + self.moisture.powf(beta) * (ew.powf(0.65) - Complex64::new(1.0, 0.0));

        epsalf.powf(1.0 / 0.65)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dobson85_is_physical_for_typical_moist_soil() {
        let soil = Dobson85 {
            moisture: 0.2,
            sand: 0.4,
            clay: 0.3,
        };
        let eps = soil.permittivity(5e9, 290.0).unwrap();
        assert!(eps.re >= 1.0);
        assert!(eps.im >= 0.0);
    }
}
