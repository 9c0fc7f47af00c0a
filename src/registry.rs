// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Plug-in registry (spec §9): compile-time-enumerated name -> factory
//! tables for EM models, microstructure providers, permittivity providers,
//! and interface operators. This is a closed, statically populated table
//! (no `dlopen`/dynamic loading), matching how the teacher enumerates beam
//! types via a `BeamType` match rather than a plugin system. Unknown names
//! fail fast with `SmrtError::InputValidation`.

use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use num_complex::Complex64;

use crate::emmodel::{EmModel, EmModelInputs, Iba, IbaMm};
use crate::error::SmrtError;
use crate::interface::{Fresnel, Interface, Reflector, SoilWegmuller, Transparent};
use crate::microstructure::{Exponential, IndependentSphere, Microstructure, StickyHardSpheres};
use crate::permittivity::ice::{DmrtMl, Hut as IceHut, Matzler87, Memls};
use crate::permittivity::soil::{Dobson85, Hut as SoilHut};
use crate::permittivity::PermittivityProvider;

/// Named scalar parameters a factory needs beyond what the snowpack/sensor
/// already carry (spec §4.2/§4.3's "`[, extras]`" argument) — moisture,
/// sand/clay fractions, correlation length, and so on. Kept as a flat
/// `f64` map rather than per-model structs so every registry shares one
/// factory signature.
pub type Extras = HashMap<&'static str, f64>;

fn extra(kind: &'static str, name: &'static str, extras: &Extras, key: &'static str) -> Result<f64, SmrtError> {
    extras
        .get(key)
        .copied()
        .ok_or_else(|| SmrtError::InputValidation(format!("{kind} model \"{name}\" requires extra parameter \"{key}\"")))
}

pub type EmModelFactory = fn(EmModelInputs) -> Result<Box<dyn EmModel>, SmrtError>;
pub type MicrostructureFactory = fn(f64, &Extras) -> Result<Arc<dyn Microstructure>, SmrtError>;
pub type PermittivityFactory = fn(&Extras) -> Result<Arc<dyn PermittivityProvider>, SmrtError>;
pub type InterfaceFactory = fn(&Extras) -> Result<Arc<dyn Interface>, SmrtError>;

lazy_static! {
    pub static ref EM_MODELS: HashMap<&'static str, EmModelFactory> = {
        let mut m: HashMap<&'static str, EmModelFactory> = HashMap::new();
        m.insert("iba", iba_factory as EmModelFactory);
        m.insert("iba_mm", iba_mm_factory as EmModelFactory);
        m
    };
    pub static ref MICROSTRUCTURE_MODELS: HashMap<&'static str, MicrostructureFactory> = {
        let mut m: HashMap<&'static str, MicrostructureFactory> = HashMap::new();
        m.insert("exponential", exponential_factory as MicrostructureFactory);
        m.insert("independent_sphere", independent_sphere_factory as MicrostructureFactory);
        m.insert("sticky_hard_spheres", sticky_hard_spheres_factory as MicrostructureFactory);
        m
    };
    /// Permittivity names are domain-prefixed (`ice:`/`soil:`): the spec
    /// reuses the bare name "HUT" for both an ice model (alias of
    /// Matzler-87) and a distinct soil model, so a single flat namespace
    /// would silently let one shadow the other (see DESIGN.md).
    pub static ref PERMITTIVITY_MODELS: HashMap<&'static str, PermittivityFactory> = {
        let mut m: HashMap<&'static str, PermittivityFactory> = HashMap::new();
        m.insert("ice:matzler87", ice_matzler87_factory as PermittivityFactory);
        m.insert("ice:hut", ice_hut_factory as PermittivityFactory);
        m.insert("ice:dmrtml", ice_dmrtml_factory as PermittivityFactory);
        m.insert("ice:memls", ice_memls_factory as PermittivityFactory);
        m.insert("soil:dobson85", soil_dobson85_factory as PermittivityFactory);
        m.insert("soil:hut", soil_hut_factory as PermittivityFactory);
        m
    };
    pub static ref INTERFACE_MODELS: HashMap<&'static str, InterfaceFactory> = {
        let mut m: HashMap<&'static str, InterfaceFactory> = HashMap::new();
        m.insert("transparent", transparent_factory as InterfaceFactory);
        m.insert("fresnel", fresnel_factory as InterfaceFactory);
        m.insert("reflector", reflector_factory as InterfaceFactory);
        m.insert("soil_wegmuller", soil_wegmuller_factory as InterfaceFactory);
        m
    };
}

/// Look up `name` in [`EM_MODELS`] and build it.
pub fn build_em_model(name: &str, inputs: EmModelInputs) -> Result<Box<dyn EmModel>, SmrtError> {
    let factory = EM_MODELS
        .get(name)
        .ok_or_else(|| SmrtError::InputValidation(format!("unknown EM model \"{name}\"")))?;
    factory(inputs)
}

/// Look up `name` in [`MICROSTRUCTURE_MODELS`] and build it.
pub fn build_microstructure(name: &str, frac_volume: f64, extras: &Extras) -> Result<Arc<dyn Microstructure>, SmrtError> {
    let factory = MICROSTRUCTURE_MODELS
        .get(name)
        .ok_or_else(|| SmrtError::InputValidation(format!("unknown microstructure model \"{name}\"")))?;
    factory(frac_volume, extras)
}

/// Look up `name` in [`PERMITTIVITY_MODELS`] and build it.
pub fn build_permittivity(name: &str, extras: &Extras) -> Result<Arc<dyn PermittivityProvider>, SmrtError> {
    let factory = PERMITTIVITY_MODELS
        .get(name)
        .ok_or_else(|| SmrtError::InputValidation(format!("unknown permittivity model \"{name}\"")))?;
    factory(extras)
}

/// Look up `name` in [`INTERFACE_MODELS`] and build it.
pub fn build_interface(name: &str, extras: &Extras) -> Result<Arc<dyn Interface>, SmrtError> {
    let factory = INTERFACE_MODELS
        .get(name)
        .ok_or_else(|| SmrtError::InputValidation(format!("unknown interface model \"{name}\"")))?;
    factory(extras)
}

fn iba_factory(inputs: EmModelInputs) -> Result<Box<dyn EmModel>, SmrtError> {
    Ok(Box::new(Iba::new(inputs)?))
}

fn iba_mm_factory(inputs: EmModelInputs) -> Result<Box<dyn EmModel>, SmrtError> {
    Ok(Box::new(IbaMm::new(inputs)?))
}

fn exponential_factory(_frac_volume: f64, extras: &Extras) -> Result<Arc<dyn Microstructure>, SmrtError> {
    let corr_length = extra("microstructure", "exponential", extras, "corr_length")?;
    Ok(Arc::new(Exponential { corr_length }))
}

fn independent_sphere_factory(frac_volume: f64, extras: &Extras) -> Result<Arc<dyn Microstructure>, SmrtError> {
    let radius = extra("microstructure", "independent_sphere", extras, "radius")?;
    Ok(Arc::new(IndependentSphere { radius, frac_volume }))
}

fn sticky_hard_spheres_factory(frac_volume: f64, extras: &Extras) -> Result<Arc<dyn Microstructure>, SmrtError> {
    let radius = extra("microstructure", "sticky_hard_spheres", extras, "radius")?;
    let stickiness = extra("microstructure", "sticky_hard_spheres", extras, "stickiness")?;
    Ok(Arc::new(StickyHardSpheres { radius, frac_volume, stickiness }))
}

fn ice_matzler87_factory(_extras: &Extras) -> Result<Arc<dyn PermittivityProvider>, SmrtError> {
    Ok(Arc::new(Matzler87))
}

fn ice_hut_factory(_extras: &Extras) -> Result<Arc<dyn PermittivityProvider>, SmrtError> {
    Ok(Arc::new(IceHut))
}

fn ice_dmrtml_factory(_extras: &Extras) -> Result<Arc<dyn PermittivityProvider>, SmrtError> {
    Ok(Arc::new(DmrtMl))
}

fn ice_memls_factory(_extras: &Extras) -> Result<Arc<dyn PermittivityProvider>, SmrtError> {
    Ok(Arc::new(Memls))
}

fn soil_dobson85_factory(extras: &Extras) -> Result<Arc<dyn PermittivityProvider>, SmrtError> {
    let moisture = extra("permittivity", "soil:dobson85", extras, "moisture")?;
    let sand = extra("permittivity", "soil:dobson85", extras, "sand")?;
    let clay = extra("permittivity", "soil:dobson85", extras, "clay")?;
    Ok(Arc::new(Dobson85 { moisture, sand, clay }))
}

fn soil_hut_factory(extras: &Extras) -> Result<Arc<dyn PermittivityProvider>, SmrtError> {
    let moisture = extra("permittivity", "soil:hut", extras, "moisture")?;
    let sand = extra("permittivity", "soil:hut", extras, "sand")?;
    let clay = extra("permittivity", "soil:hut", extras, "clay")?;
    let dry_matter_density = extra("permittivity", "soil:hut", extras, "dry_matter_density")?;
    Ok(Arc::new(SoilHut { moisture, sand, clay, dry_matter_density }))
}

fn transparent_factory(_extras: &Extras) -> Result<Arc<dyn Interface>, SmrtError> {
    Ok(Arc::new(Transparent))
}

fn fresnel_factory(_extras: &Extras) -> Result<Arc<dyn Interface>, SmrtError> {
    Ok(Arc::new(Fresnel))
}

fn reflector_factory(extras: &Extras) -> Result<Arc<dyn Interface>, SmrtError> {
    let specular_reflection = extra("interface", "reflector", extras, "specular_reflection")?;
    let temperature_k = extra("interface", "reflector", extras, "temperature_k")?;
    Ok(Arc::new(Reflector::scalar(specular_reflection, temperature_k)))
}

fn soil_wegmuller_factory(extras: &Extras) -> Result<Arc<dyn Interface>, SmrtError> {
    let eps_soil_re = extra("interface", "soil_wegmuller", extras, "eps_soil_re")?;
    let eps_soil_im = extra("interface", "soil_wegmuller", extras, "eps_soil_im")?;
    let roughness_rms_m = extra("interface", "soil_wegmuller", extras, "roughness_rms_m")?;
    let temperature_k = extra("interface", "soil_wegmuller", extras, "temperature_k")?;
    Ok(Arc::new(SoilWegmuller::new(
        Complex64::new(eps_soil_re, eps_soil_im),
        roughness_rms_m,
        temperature_k,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_em_model_fails_fast() {
        let inputs = EmModelInputs {
            frequency_hz: 10e9,
            frac_volume: 0.3,
            background_permittivity: Complex64::new(1.0, 0.0),
            inclusion_permittivity: Complex64::new(3.2, 0.001),
            microstructure: Arc::new(Exponential { corr_length: 1e-4 }),
            npol: 2,
            m_max: 0,
        };
        assert!(matches!(build_em_model("not_a_model", inputs), Err(SmrtError::InputValidation(_))));
    }

    #[test]
    fn missing_extra_fails_fast() {
        let extras = Extras::new();
        assert!(matches!(
            build_microstructure("exponential", 0.3, &extras),
            Err(SmrtError::InputValidation(_))
        ));
    }

    #[test]
    fn permittivity_names_are_domain_prefixed() {
        let extras = Extras::new();
        assert!(build_permittivity("ice:matzler87", &extras).is_ok());
        assert!(build_permittivity("hut", &extras).is_err());
    }

    #[test]
    fn builds_every_registered_interface_with_required_extras() {
        let mut reflector_extras = Extras::new();
        reflector_extras.insert("specular_reflection", 1.0);
        reflector_extras.insert("temperature_k", 260.0);
        assert!(build_interface("transparent", &Extras::new()).is_ok());
        assert!(build_interface("fresnel", &Extras::new()).is_ok());
        assert!(build_interface("reflector", &reflector_extras).is_ok());
    }
}
