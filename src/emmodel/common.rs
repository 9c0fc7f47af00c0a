// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mixing-rule helpers shared by the IBA family of EM models, grounded on
//! the imports `iba.py` takes from `smrt.emmodel.commonfunc`
//! (`depolarization_factors`, `maxwell_garnett`, `polder_van_santen`).

use num_complex::Complex64;

use crate::constants::SPHERE_DEPOLARIZATION;

/// Depolarization factors `(A_x, A_y, A_z)` for the inclusion shape. Fixed
/// to spherical `(1/3, 1/3, 1/3)` per spec §4.4; a pluggable override for
/// non-spherical inclusions is not implemented.
pub fn depolarization_factors() -> (f64, f64, f64) {
    SPHERE_DEPOLARIZATION
}

/// Maxwell-Garnett effective-medium mixing rule for a background `e0` with
/// a volume fraction `frac_volume` of inclusions of permittivity `eps`,
/// given per-axis depolarization factors. Averages the (generally
/// anisotropic) per-axis effective permittivity over the three axes; for
/// the fixed spherical depolarization this crate uses, all three axes are
/// identical and the average is exact, not an approximation.
pub fn maxwell_garnett(
    frac_volume: f64,
    e0: Complex64,
    eps: Complex64,
    depol_xyz: (f64, f64, f64),
) -> Complex64 {
    let axes = [depol_xyz.0, depol_xyz.1, depol_xyz.2];
    let sum: Complex64 = axes
        .iter()
        .map(|&a| e0 + frac_volume * e0 * (eps - e0) / (e0 + (1.0 - frac_volume) * a * (eps - e0)))
        .sum();
    sum / 3.0
}

/// Polder-van Santen (1946) symmetric effective-medium mixing rule for a
/// two-phase random mixture with depolarization `1/3`, solved as the
/// physical (positive) root of the implicit self-consistency equation
///
/// ```text
/// phi (eps - x) / (eps + 2x) + (1 - phi) (e_b - x) / (e_b + 2x) = 0
/// ```
///
/// Only the real parts of `e_b`/`eps` are meaningful inputs here: IBA_MM
/// uses this only to replace `Re(eps_eff)`, reconstructing the imaginary
/// part separately (spec §4.4).
pub fn polder_van_santen(frac_volume: f64, e_background_real: f64, e_inclusion_real: f64) -> f64 {
    let phi = frac_volume;
    let e_b = e_background_real;
    let eps = e_inclusion_real;
    let b = phi * (2.0 * eps - e_b) + (1.0 - phi) * (2.0 * e_b - eps);
    (b + (b * b + 8.0 * eps * e_b).sqrt()) / 4.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pvs_matches_reference_scenario_s1() {
        // spec §8 S1: phi = 300/917 (density/ice density), ice eps_real at
        // AMSR-E 37V/265K via Matzler87 ~= 3.1811.
        let phi = 300.0 / 917.0;
        let x = polder_van_santen(phi, 1.0, 3.1811);
        assert_relative_eq!(x, 1.5244, epsilon = 1.5244 * 0.05);
    }

    #[test]
    fn pvs_reduces_to_endpoints() {
        assert_relative_eq!(polder_van_santen(0.0, 1.0, 3.2), 1.0, epsilon = 1e-9);
        assert_relative_eq!(polder_van_santen(1.0, 1.0, 3.2), 3.2, epsilon = 1e-9);
    }

    #[test]
    fn maxwell_garnett_reduces_to_background_at_zero_volume() {
        let e0 = Complex64::new(1.0, 0.0);
        let eps = Complex64::new(3.2, 0.001);
        let eff = maxwell_garnett(0.0, e0, eps, depolarization_factors());
        assert_relative_eq!(eff.re, 1.0, epsilon = 1e-9);
        assert_relative_eq!(eff.im, 0.0, epsilon = 1e-9);
    }
}
