// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Data model for the medium being observed: [`Layer`] and [`Snowpack`]
//! (spec §3), plus the [`Sensor`] description.
//!
//! Snowpack/soil *input builders* (reading real snow-pit data, deriving
//! density profiles, ...) are named out-of-scope collaborators in spec §1;
//! [`Snowpack::builder`] is the thinnest possible in-crate constructor,
//! grounded on `original_source/smrt/inputs/make_soil.py`'s `make_soil`
//! helper shape, not a full scenario-authoring layer.

mod error;
pub mod sensor;

pub use error::SnowpackError;
pub use sensor::{Mode, Polarization, Sensor};

use std::sync::Arc;

use num_complex::Complex64;

use crate::interface::Interface;
use crate::microstructure::Microstructure;
use crate::permittivity::PermittivityProvider;

/// One horizontally homogeneous layer of the medium (spec §3).
pub struct Layer {
    /// Layer thickness in metres. `None` marks a semi-infinite layer (the
    /// sentinel spec §3 calls out); only one layer in a snowpack may be
    /// semi-infinite, and it does not contribute a finite optical depth.
    pub thickness_m: Option<f64>,
    pub temperature_k: f64,
    /// Inclusion volume fraction `phi in [0, 1]` (e.g. ice fraction in snow).
    pub frac_volume: f64,
    pub microstructure: Arc<dyn Microstructure>,
    pub background_permittivity: Arc<dyn PermittivityProvider>,
    pub inclusion_permittivity: Arc<dyn PermittivityProvider>,
    /// Registry name of the EM model to build for this layer (`"iba"`,
    /// `"iba_mm"`, ...); resolved against [`crate::registry::em_models`].
    pub em_model: String,
}

impl Layer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        thickness_m: Option<f64>,
        temperature_k: f64,
        frac_volume: f64,
        microstructure: Arc<dyn Microstructure>,
        background_permittivity: Arc<dyn PermittivityProvider>,
        inclusion_permittivity: Arc<dyn PermittivityProvider>,
        em_model: impl Into<String>,
    ) -> Result<Layer, SnowpackError> {
        if let Some(t) = thickness_m {
            if !(t > 0.0) {
                return Err(SnowpackError::InvalidThickness(t));
            }
        }
        if !(temperature_k > 0.0) {
            return Err(SnowpackError::InvalidTemperature(temperature_k));
        }
        if !(0.0..=1.0).contains(&frac_volume) {
            return Err(SnowpackError::InvalidFracVolume(frac_volume));
        }
        Ok(Layer {
            thickness_m,
            temperature_k,
            frac_volume,
            microstructure,
            background_permittivity,
            inclusion_permittivity,
            em_model: em_model.into(),
        })
    }

    /// Convenience constructor for a scalar (dielectric-constant) background
    /// and inclusion permittivity, matching `make_soil`'s "a scalar is
    /// accepted as a constant provider" ergonomics (spec §4.2).
    pub fn with_constant_permittivities(
        thickness_m: Option<f64>,
        temperature_k: f64,
        frac_volume: f64,
        microstructure: Arc<dyn Microstructure>,
        background_eps: Complex64,
        inclusion_eps: Complex64,
        em_model: impl Into<String>,
    ) -> Result<Layer, SnowpackError> {
        Layer::new(
            thickness_m,
            temperature_k,
            frac_volume,
            microstructure,
            Arc::new(crate::permittivity::Constant(background_eps)),
            Arc::new(crate::permittivity::Constant(inclusion_eps)),
            em_model,
        )
    }

    pub fn is_semi_infinite(&self) -> bool {
        self.thickness_m.is_none()
    }
}

/// An ordered stack of [`Layer`]s (top to bottom) plus the `n_layers + 1`
/// [`Interface`]s that bound them: the top boundary, each inter-layer
/// boundary, and finally the substrate.
pub struct Snowpack {
    layers: Vec<Layer>,
    interfaces: Vec<Arc<dyn Interface>>,
}

impl Snowpack {
    pub fn builder() -> SnowpackBuilder {
        SnowpackBuilder::default()
    }

    /// Construct directly from a fully specified layer/interface stack.
    /// Prefer [`Snowpack::builder`] unless the interior interfaces need to
    /// be something other than [`crate::interface::Transparent`].
    pub fn new(layers: Vec<Layer>, interfaces: Vec<Arc<dyn Interface>>) -> Result<Snowpack, SnowpackError> {
        if layers.is_empty() {
            return Err(SnowpackError::EmptySnowpack);
        }
        if interfaces.len() != layers.len() + 1 {
            return Err(SnowpackError::InterfaceCountMismatch {
                n_layers: layers.len(),
                n_interfaces: interfaces.len(),
            });
        }
        if !interfaces.last().expect("checked non-empty above").is_substrate() {
            return Err(SnowpackError::BottomInterfaceNotSubstrate);
        }
        Ok(Snowpack { layers, interfaces })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn interfaces(&self) -> &[Arc<dyn Interface>] {
        &self.interfaces
    }

    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn substrate(&self) -> &Arc<dyn Interface> {
        self.interfaces.last().expect("Snowpack::new guarantees a non-empty interface stack")
    }
}

/// Thin ergonomic builder: layers are added top to bottom with an implicit
/// [`crate::interface::Transparent`] interior boundary between each pair
/// (overridable via [`SnowpackBuilder::with_interface_above`]); the stack is
/// closed off with an explicit substrate.
#[derive(Default)]
pub struct SnowpackBuilder {
    layers: Vec<Layer>,
    interior_interfaces: Vec<Option<Arc<dyn Interface>>>,
    top_interface: Option<Arc<dyn Interface>>,
}

impl SnowpackBuilder {
    /// Add a layer beneath whatever has been added so far. The interface
    /// immediately above this layer defaults to [`crate::interface::Transparent`]
    /// unless overridden with [`SnowpackBuilder::with_interface_above`]
    /// called right after this.
    pub fn add_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self.interior_interfaces.push(None);
        self
    }

    /// Override the interface immediately above the most recently added
    /// layer (the top boundary if called before any `add_layer`).
    pub fn with_interface_above(mut self, interface: Arc<dyn Interface>) -> Self {
        match self.interior_interfaces.last_mut() {
            Some(slot) => *slot = Some(interface),
            None => self.top_interface = Some(interface),
        }
        self
    }

    /// Close the stack with a substrate interface (spec §3: the bottom
    /// interface is always a substrate).
    pub fn with_substrate(self, substrate: Arc<dyn Interface>) -> Result<Snowpack, SnowpackError> {
        let SnowpackBuilder {
            layers,
            mut interior_interfaces,
            top_interface,
        } = self;

        // `interior_interfaces[0]` (the slot `add_layer` pushes for the
        // first layer) and `top_interface` (set by `with_interface_above`
        // called *before* any `add_layer`) both describe the same boundary
        // — the top of the stack — so whichever was actually set wins here,
        // per `with_interface_above`'s documented "the top boundary if
        // called before any add_layer" behaviour.
        let top = if !interior_interfaces.is_empty() {
            interior_interfaces.remove(0)
        } else {
            None
        };

        let mut interfaces: Vec<Arc<dyn Interface>> = Vec::with_capacity(layers.len() + 1);
        interfaces.push(top.or(top_interface).unwrap_or_else(|| Arc::new(crate::interface::Transparent)));
        for slot in interior_interfaces {
            interfaces.push(slot.unwrap_or_else(|| Arc::new(crate::interface::Transparent)));
        }
        interfaces.push(substrate);

        Snowpack::new(layers, interfaces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::Reflector;
    use crate::microstructure::Exponential;

    fn layer(thickness_m: Option<f64>) -> Layer {
        Layer::with_constant_permittivities(
            thickness_m,
            265.0,
            0.3,
            Arc::new(Exponential { corr_length: 3e-4 }),
            Complex64::new(1.0, 0.0),
            Complex64::new(3.18, 0.001),
            "iba",
        )
        .unwrap()
    }

    #[test]
    fn builder_produces_n_plus_one_interfaces() {
        let snowpack = Snowpack::builder()
            .add_layer(layer(Some(0.1)))
            .add_layer(layer(None))
            .with_substrate(Arc::new(Reflector::scalar(0.0, 270.0)))
            .unwrap();
        assert_eq!(snowpack.n_layers(), 2);
        assert_eq!(snowpack.interfaces().len(), 3);
    }

    #[test]
    fn with_interface_above_right_after_first_layer_overrides_the_top_boundary() {
        use crate::interface::Fresnel;

        let snowpack = Snowpack::builder()
            .add_layer(layer(Some(0.1)))
            .with_interface_above(Arc::new(Fresnel))
            .add_layer(layer(None))
            .with_substrate(Arc::new(Reflector::scalar(0.0, 270.0)))
            .unwrap();
        assert_eq!(snowpack.interfaces()[0].name(), "fresnel");
        assert_eq!(snowpack.interfaces()[1].name(), "transparent");
    }

    #[test]
    fn rejects_empty_snowpack() {
        let err = Snowpack::new(vec![], vec![Arc::new(Reflector::scalar(0.0, 270.0))]);
        assert!(matches!(err, Err(SnowpackError::EmptySnowpack)));
    }

    #[test]
    fn rejects_non_substrate_bottom_interface() {
        let err = Snowpack::new(
            vec![layer(Some(0.1))],
            vec![Arc::new(crate::interface::Transparent), Arc::new(crate::interface::Transparent)],
        );
        assert!(matches!(err, Err(SnowpackError::BottomInterfaceNotSubstrate)));
    }

    #[test]
    fn rejects_negative_thickness() {
        assert!(matches!(
            Layer::with_constant_permittivities(
                Some(-1.0),
                265.0,
                0.3,
                Arc::new(Exponential { corr_length: 3e-4 }),
                Complex64::new(1.0, 0.0),
                Complex64::new(3.18, 0.001),
                "iba",
            ),
            Err(SnowpackError::InvalidThickness(_))
        ));
    }
}
