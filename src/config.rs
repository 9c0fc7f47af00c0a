// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Configuration surface (spec §6): a YAML-deserializable description of a
//! single `(snowpack, sensor)` solve, read via `serde_yaml` (as the teacher
//! reads its run configs), covering exactly the recognized options spec §6
//! lists — EM model selection, solver selection (`dort` is the only one),
//! sensor geometry, quadrature, mode budget, and tolerances.
//!
//! Grounded on `original_source/smrt/inputs/make_soil.py`'s `make_soil`:
//! permittivity/microstructure are named models plus a flat extras map
//! (`moisture=0.2, sand=0.4, ...`), or a bare constant.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::angles::StreamScheme;
use crate::error::SmrtError;
use crate::registry::{self, Extras};
use crate::snowpack::{Layer, Sensor, Snowpack};

/// A named permittivity model plus its extra parameters, or a bare
/// constant real part (spec §4.2: "A scalar is accepted as a constant
/// provider").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermittivityConfig {
    Constant(f64),
    Named {
        model: String,
        #[serde(default)]
        extras: HashMap<String, f64>,
    },
}

/// A named microstructure model plus its extra parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicrostructureConfig {
    pub model: String,
    #[serde(default)]
    pub extras: HashMap<String, f64>,
}

/// One entry of spec §3's layer stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerConfig {
    /// `None` (or omitted) marks a semi-infinite layer.
    pub thickness_m: Option<f64>,
    pub temperature_k: f64,
    pub frac_volume: f64,
    pub microstructure: MicrostructureConfig,
    pub background_permittivity: PermittivityConfig,
    pub inclusion_permittivity: PermittivityConfig,
    /// EM model selection (spec §6), default `"iba"` when omitted.
    #[serde(default = "default_em_model")]
    pub em_model: String,
}

fn default_em_model() -> String {
    "iba".to_string()
}

/// A named interface model plus its extra parameters, used for the
/// substrate and (optionally) interior interfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceConfig {
    pub model: String,
    #[serde(default)]
    pub extras: HashMap<String, f64>,
}

/// Sensor block (spec §6): `{frequency, mode in {P,A}, theta_inc,
/// polarizations}`. `polarizations` is implied by `mode` (spec §3) so is
/// not a separate field here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    pub frequency_hz: f64,
    /// `"passive"` or `"active"`.
    pub mode: String,
    pub theta_inc_deg: f64,
    #[serde(default)]
    pub azimuth_deg: f64,
    /// Mode budget override (spec §6 "auto when unset: 0 passive, 3
    /// active").
    pub m_max: Option<usize>,
}

/// Quadrature block (spec §6): `{n_streams, stream_scheme}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadratureConfig {
    pub n_streams: usize,
    #[serde(default)]
    pub stream_scheme: Option<String>,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        QuadratureConfig {
            n_streams: 32,
            stream_scheme: None,
        }
    }
}

/// Tolerances block (spec §6): `{energy_tolerance=5%, radiance_floor=1e-6}`.
/// Not yet consumed by the solver (which hard-codes spec §4.6's tolerance
/// constants, see [`crate::constants`]); carried here so the configuration
/// surface is complete per spec §6 and future solver passes can read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TolerancesConfig {
    #[serde(default = "default_energy_tolerance")]
    pub energy_tolerance: f64,
    #[serde(default = "default_radiance_floor")]
    pub radiance_floor: f64,
}

fn default_energy_tolerance() -> f64 {
    crate::constants::DEFAULT_ENERGY_TOLERANCE
}

fn default_radiance_floor() -> f64 {
    crate::constants::DEFAULT_RADIANCE_FLOOR
}

impl Default for TolerancesConfig {
    fn default() -> Self {
        TolerancesConfig {
            energy_tolerance: default_energy_tolerance(),
            radiance_floor: default_radiance_floor(),
        }
    }
}

/// Full configuration for one solve: sensor, quadrature, tolerances, the
/// layer stack (top to bottom), and the substrate. Solver selection (spec
/// §6) is not a field since `dort` is the only registered solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub sensor: SensorConfig,
    #[serde(default)]
    pub quadrature: QuadratureConfig,
    #[serde(default)]
    pub tolerances: TolerancesConfig,
    pub layers: Vec<LayerConfig>,
    pub substrate: InterfaceConfig,
}

impl Config {
    /// Parse a YAML config from disk.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Config, SmrtError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    /// Resolve the sensor this config describes.
    pub fn build_sensor(&self) -> Result<Sensor, SmrtError> {
        let theta_inc_rad = self.sensor.theta_inc_deg.to_radians();
        let sensor = match self.sensor.mode.to_lowercase().as_str() {
            "passive" => Sensor::passive(self.sensor.frequency_hz, theta_inc_rad)?,
            "active" => Sensor::active(self.sensor.frequency_hz, theta_inc_rad, self.sensor.azimuth_deg.to_radians())?,
            other => return Err(SmrtError::InputValidation(format!("unknown sensor mode {other:?}, expected \"passive\" or \"active\""))),
        };
        match self.sensor.m_max {
            Some(m_max) => Ok(sensor.with_m_max(m_max)?),
            None => Ok(sensor),
        }
    }

    /// Resolve the [`StreamScheme`] this config requests.
    pub fn stream_scheme(&self) -> Result<StreamScheme, SmrtError> {
        match self.quadrature.stream_scheme.as_deref() {
            None | Some("gauss") => Ok(StreamScheme::Gauss),
            Some("compressed-gauss") => Ok(StreamScheme::CompressedGauss),
            Some(other) => Err(SmrtError::InputValidation(format!("unknown stream scheme {other:?}"))),
        }
    }

    /// Resolve the number of streams per hemisphere this config requests.
    pub fn n_streams(&self) -> usize {
        self.quadrature.n_streams
    }

    /// Build the [`Snowpack`] this config describes, resolving every
    /// named model against the [`crate::registry`].
    pub fn build_snowpack(&self) -> Result<Snowpack, SmrtError> {
        let mut builder = Snowpack::builder();
        for layer_cfg in &self.layers {
            builder = builder.add_layer(build_layer(layer_cfg)?);
        }
        let substrate = build_interface(&self.substrate)?;
        Ok(builder.with_substrate(substrate)?)
    }
}

fn extras_map(raw: &HashMap<String, f64>) -> Extras {
    // `Extras` keys are `&'static str` (spec §9 "closed, statically
    // populated table"); config values are matched against the fixed set
    // of parameter names the registry factories in `src/registry.rs`
    // recognize, rather than leaking arbitrary deserialized strings.
    const KNOWN: &[&str] = &[
        "moisture",
        "sand",
        "clay",
        "dry_matter_density",
        "corr_length",
        "radius",
        "stickiness",
        "specular_reflection",
        "temperature_k",
        "eps_soil_re",
        "eps_soil_im",
        "roughness_rms_m",
    ];
    let mut extras = Extras::new();
    for key in KNOWN {
        if let Some(&v) = raw.get(*key) {
            extras.insert(*key, v);
        }
    }
    extras
}

fn build_permittivity(cfg: &PermittivityConfig) -> Result<Arc<dyn crate::permittivity::PermittivityProvider>, SmrtError> {
    match cfg {
        PermittivityConfig::Constant(re) => Ok(Arc::new(crate::permittivity::Constant::from(*re))),
        PermittivityConfig::Named { model, extras } => Ok(registry::build_permittivity(model, &extras_map(extras))?),
    }
}

fn build_layer(cfg: &LayerConfig) -> Result<Layer, SmrtError> {
    let microstructure = registry::build_microstructure(&cfg.microstructure.model, cfg.frac_volume, &extras_map(&cfg.microstructure.extras))?;
    let background_permittivity = build_permittivity(&cfg.background_permittivity)?;
    let inclusion_permittivity = build_permittivity(&cfg.inclusion_permittivity)?;
    Ok(Layer::new(
        cfg.thickness_m,
        cfg.temperature_k,
        cfg.frac_volume,
        microstructure,
        background_permittivity,
        inclusion_permittivity,
        cfg.em_model.clone(),
    )?)
}

fn build_interface(cfg: &InterfaceConfig) -> Result<Arc<dyn crate::interface::Interface>, SmrtError> {
    Ok(registry::build_interface(&cfg.model, &extras_map(&cfg.extras))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
sensor:
  frequency_hz: 37.0e9
  mode: passive
  theta_inc_deg: 55.0
quadrature:
  n_streams: 16
layers:
  - thickness_m: 0.1
    temperature_k: 265.0
    frac_volume: 0.3272
    microstructure:
      model: exponential
      extras:
        corr_length: 3.0e-4
    background_permittivity: 1.0
    inclusion_permittivity:
      model: ice:matzler87
    em_model: iba
substrate:
  model: reflector
  extras:
    specular_reflection: 0.0
    temperature_k: 260.0
"#
    }

    #[test]
    fn parses_minimal_single_layer_config() {
        let cfg: Config = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(cfg.layers.len(), 1);
        assert_eq!(cfg.quadrature.n_streams, 16);
    }

    #[test]
    fn builds_sensor_snowpack_and_stream_scheme() {
        let cfg: Config = serde_yaml::from_str(sample_yaml()).unwrap();
        let sensor = cfg.build_sensor().unwrap();
        assert_eq!(sensor.npol(), 2);
        let snowpack = cfg.build_snowpack().unwrap();
        assert_eq!(snowpack.n_layers(), 1);
        assert!(cfg.stream_scheme().is_ok());
    }

    #[test]
    fn rejects_unknown_sensor_mode() {
        let mut cfg: Config = serde_yaml::from_str(sample_yaml()).unwrap();
        cfg.sensor.mode = "sideways".to_string();
        assert!(cfg.build_sensor().is_err());
    }
}
