// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Top-level data flow (spec §2): "sensor + snowpack -> per-layer (EM model
//! instance, interface operator) -> per-mode solve -> aggregated result".
//!
//! This is the only module that wires [`crate::snowpack`], [`crate::emmodel`],
//! [`crate::angles`] and [`crate::solver`] together; everything below it is
//! usable standalone (e.g. a caller who already has `EmModel` instances can
//! call [`crate::solver::solve`] directly).

use rayon::prelude::*;

use crate::angles::{StreamGrid, StreamScheme};
use crate::emmodel::{EmModel, EmModelInputs};
use crate::error::SmrtError;
use crate::registry;
use crate::result::SmrtResult;
use crate::snowpack::{Sensor, Snowpack};
use crate::solver;

/// Build one [`EmModel`] per layer and solve the full radiative transfer
/// problem for `(snowpack, sensor)`, returning the aggregated Tb/sigma0
/// result.
///
/// Per-layer EM builds are independent (spec §5 "may be fan-out parallel
/// with a worker pool") and are fanned out with `rayon`; the solve itself
/// stays sequential per the same section ("the solver itself is sequential
/// because it assembles a global coupled system") — the per-mode
/// parallelism happens inside [`crate::solver::solve`].
pub fn compute(snowpack: &Snowpack, sensor: &Sensor, n_streams: usize, scheme: StreamScheme) -> Result<SmrtResult, SmrtError> {
    let grid = StreamGrid::new(n_streams, sensor.mu_obs(), scheme, sensor.npol(), sensor.m_max())?;

    let em_models: Vec<Box<dyn EmModel>> = snowpack
        .layers()
        .par_iter()
        .map(|layer| build_em_model(layer, sensor))
        .collect::<Result<Vec<_>, SmrtError>>()?;

    let output = solver::solve(snowpack, sensor, &grid, &em_models)?;
    Ok(SmrtResult::from_solve(sensor, output))
}

fn build_em_model(layer: &crate::snowpack::Layer, sensor: &Sensor) -> Result<Box<dyn EmModel>, SmrtError> {
    let background_permittivity = layer
        .background_permittivity
        .permittivity(sensor.frequency_hz(), layer.temperature_k)?;
    let inclusion_permittivity = layer
        .inclusion_permittivity
        .permittivity(sensor.frequency_hz(), layer.temperature_k)?;

    let inputs = EmModelInputs {
        frequency_hz: sensor.frequency_hz(),
        frac_volume: layer.frac_volume,
        background_permittivity,
        inclusion_permittivity,
        microstructure: layer.microstructure.clone(),
        npol: sensor.npol(),
        m_max: sensor.m_max(),
    };
    registry::build_em_model(&layer.em_model, inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::{Reflector, Transparent};
    use crate::microstructure::Exponential;
    use crate::snowpack::Layer;
    use approx::assert_relative_eq;
    use num_complex::Complex64;
    use std::sync::Arc;

    #[test]
    fn s6_end_to_end_transparent_snowpack_shows_cosmic_background() {
        let sensor = Sensor::passive(37e9, 0.6435).unwrap();
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
        let snowpack = Snowpack::new(
            vec![layer],
            vec![Arc::new(Transparent), Arc::new(Reflector::scalar(1.0, 260.0))],
        )
        .unwrap();

        let result = compute(&snowpack, &sensor, 8, StreamScheme::Gauss).unwrap();
        match result {
            SmrtResult::Passive(tb) => {
                assert_relative_eq!(tb.tb_v_k, crate::constants::COSMIC_BACKGROUND_K, epsilon = 1e-6);
                assert_relative_eq!(tb.tb_h_k, crate::constants::COSMIC_BACKGROUND_K, epsilon = 1e-6);
            }
            SmrtResult::Active(_) => panic!("expected passive result"),
        }
    }

    #[test]
    fn rejects_unknown_em_model_name() {
        let sensor = Sensor::passive(37e9, 0.6435).unwrap();
        let layer = Layer::with_constant_permittivities(
            Some(0.1),
            265.0,
            0.3,
            Arc::new(Exponential { corr_length: 3e-4 }),
            Complex64::new(1.0, 0.0),
            Complex64::new(3.2, 0.001),
            "not_a_real_model",
        )
        .unwrap();
        let snowpack = Snowpack::new(
            vec![layer],
            vec![Arc::new(Transparent), Arc::new(Reflector::scalar(0.0, 260.0))],
        )
        .unwrap();

        assert!(compute(&snowpack, &sensor, 8, StreamScheme::Gauss).is_err());
    }
}
