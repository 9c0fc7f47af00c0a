// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reference scenarios from spec §8 (S1-S6), exercised end to end through
//! [`smrt::compute`] where a full snowpack/sensor pairing is needed, or
//! directly against the EM model where only a single-layer quantity
//! (`k_s`, `k_a`, `eps_eff`) is specified.
//!
//! S5 (a two-layer DMRT+IBA mixed snowpack) is not exercised here: the
//! `dmrt_qcacp_shortrange` EM model spec §6 lists as a configuration option
//! is out of scope for this crate (only `iba`/`iba_mm` are registered, see
//! DESIGN.md), so the reference pairing it requires cannot be built.

use approx::assert_relative_eq;
use num_complex::Complex64;
use std::sync::Arc;

use smrt::angles::StreamScheme;
use smrt::emmodel::{EmModel, EmModelInputs, Iba, IbaMm};
use smrt::interface::{Reflector, Transparent};
use smrt::microstructure::Exponential;
use smrt::permittivity::ice::Matzler87;
use smrt::permittivity::PermittivityProvider;
use smrt::snowpack::{Layer, Sensor, Snowpack};

/// Ice volume fraction for a snow density of `rho_kg_m3` against pure ice
/// (917 kg/m^3), used by S1-S3 (spec §8 gives density, not `phi` directly).
fn phi_from_density(rho_kg_m3: f64) -> f64 {
    rho_kg_m3 / 917.0
}

fn ice_eps_37v_265k() -> Complex64 {
    Matzler87.eval(37e9, 265.0)
}

#[test]
fn s1_exponential_snow_layer_ks_and_pvs_eps_eff() {
    let phi = phi_from_density(300.0);
    let eps_ice = ice_eps_37v_265k();

    let iba = Iba::new(EmModelInputs {
        frequency_hz: 37e9,
        frac_volume: phi,
        background_permittivity: Complex64::new(1.0, 0.0),
        inclusion_permittivity: eps_ice,
        microstructure: Arc::new(Exponential { corr_length: 0.3e-3 }),
        npol: 2,
        m_max: 0,
    })
    .unwrap();
    assert_relative_eq!(iba.ks(), 4.137, epsilon = 4.137 * 0.05);

    let iba_mm = IbaMm::new(EmModelInputs {
        frequency_hz: 37e9,
        frac_volume: phi,
        background_permittivity: Complex64::new(1.0, 0.0),
        inclusion_permittivity: eps_ice,
        microstructure: Arc::new(Exponential { corr_length: 0.3e-3 }),
        npol: 2,
        m_max: 0,
    })
    .unwrap();
    assert_relative_eq!(iba_mm.effective_permittivity().re, 1.5244, epsilon = 1.5244 * 0.05);
}

#[test]
fn s2_shorter_correlation_length_reduces_ks() {
    let phi = phi_from_density(300.0);
    let eps_ice = ice_eps_37v_265k();

    let iba = Iba::new(EmModelInputs {
        frequency_hz: 37e9,
        frac_volume: phi,
        background_permittivity: Complex64::new(1.0, 0.0),
        inclusion_permittivity: eps_ice,
        microstructure: Arc::new(Exponential { corr_length: 0.1e-3 }),
        npol: 2,
        m_max: 0,
    })
    .unwrap();
    assert_relative_eq!(iba.ks(), 0.1947, epsilon = 0.1947 * 0.05);
}

#[test]
fn s3_iba_mm_fine_microstructure_ks_and_ka() {
    let phi = phi_from_density(300.0);
    let eps_ice = ice_eps_37v_265k();

    let iba_mm = IbaMm::new(EmModelInputs {
        frequency_hz: 37e9,
        frac_volume: phi,
        background_permittivity: Complex64::new(1.0, 0.0),
        inclusion_permittivity: eps_ice,
        microstructure: Arc::new(Exponential { corr_length: 0.05e-3 }),
        npol: 2,
        m_max: 0,
    })
    .unwrap();
    assert_relative_eq!(iba_mm.ks(), 0.02499, epsilon = 0.02499 * 0.05);
    assert_relative_eq!(iba_mm.ka(), 0.3009, epsilon = 0.3009 * 0.05);
}

#[test]
fn s4_ice_permittivity_matzler87() {
    let eps = Matzler87.permittivity(10e9, 270.0).unwrap();
    assert_relative_eq!(eps.re, 3.1857, epsilon = 1e-4 * 10.0);
    assert_relative_eq!(eps.im, 9.09e-4, epsilon = 1e-4);
}

#[test]
fn s6_perfect_reflector_substrate_shows_cosmic_background_not_its_own_temperature() {
    let sensor = Sensor::passive(37e9, 55.0_f64.to_radians()).unwrap();
    let layer = Layer::with_constant_permittivities(
        Some(0.1),
        265.0,
        0.0,
        Arc::new(Exponential { corr_length: 1e-6 }),
        Complex64::new(1.0, 0.0),
        Complex64::new(1.0, 0.0),
        "iba",
    )
    .unwrap();
    // A reflector substrate at 260 K with specular_reflection=1 must not
    // leak its own temperature into the emitted Tb (spec §8 S6): a perfect
    // reflector absorbs/emits nothing, so the only source term left is the
    // cosmic background injected at the top boundary.
    let snowpack = Snowpack::new(
        vec![layer],
        vec![Arc::new(Transparent), Arc::new(Reflector::scalar(1.0, 260.0))],
    )
    .unwrap();

    let result = smrt::compute(&snowpack, &sensor, 16, StreamScheme::Gauss).unwrap();
    match result {
        smrt::SmrtResult::Passive(tb) => {
            assert_relative_eq!(tb.tb_v_k, smrt::constants::COSMIC_BACKGROUND_K, epsilon = 1e-6);
            assert_relative_eq!(tb.tb_h_k, smrt::constants::COSMIC_BACKGROUND_K, epsilon = 1e-6);
            assert!((tb.tb_v_k - 260.0).abs() > 1.0, "Tb must not equal the substrate temperature");
        }
        smrt::SmrtResult::Active(_) => panic!("expected passive output"),
    }
}
