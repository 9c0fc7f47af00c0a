// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Interface operators: per-boundary reflection/transmission (and
//! optionally diffuse reflection) matrices, per Fourier mode (spec §4.5).

mod error;
pub mod fresnel;
pub mod reflector;
pub mod soil_wegmuller;
pub mod transparent;

pub use error::InterfaceError;
pub use fresnel::Fresnel;
pub use reflector::{DiffuseBackscatterPolicy, Reflector, ReflectionSpec};
pub use soil_wegmuller::SoilWegmuller;
pub use transparent::Transparent;

use ndarray::Array2;
use num_complex::Complex64;

use crate::angles::StreamGrid;

/// The per-call arguments every [`Interface`] method needs (spec §4.5's
/// `reflection(m, f, eps_above, mu, npol)` /
/// `transmission(m, f, eps_above, eps_below, mu, npol)` contract), bundled
/// into one struct since the argument list is identical across methods and
/// across every concrete interface.
///
/// `coherent_only` reproduces the original's `compute_coherent_only: bool`
/// flag (see SPEC_FULL.md "Transparent interface's compute_coherent_only
/// short-circuit"): when set, implementations may skip any diffuse/rough
/// component and report only the coherent (specular) part, which is all
/// some fast energy-conservation checks need.
pub struct InterfaceQuery<'a> {
    pub grid: &'a StreamGrid,
    pub frequency_hz: f64,
    pub eps_above: Complex64,
    /// `None` at the bottom-most (substrate) interface, which has nothing
    /// beneath it to transmit into.
    pub eps_below: Option<Complex64>,
    pub npol: usize,
    pub coherent_only: bool,
}

/// A boundary between two layers (or the top boundary, or the substrate).
///
/// Implementations must be linear in incoming radiance (spec §6): every
/// method returns a `(npol*N) x (npol*N)` matrix that acts on a stacked
/// polarization/stream radiance vector. Flat/specular interfaces return
/// diagonal matrices; rough interfaces may return dense ones.
pub trait Interface: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this interface is a substrate (bottom-of-stack, non-
    /// transmitting on its far side). [`crate::snowpack::Snowpack::new`]
    /// requires the last interface in the stack to return `true` here.
    fn is_substrate(&self) -> bool {
        false
    }

    /// Thermal-emission temperature of this boundary, if it is a substrate
    /// (spec §6 "Substrate contract"). `None` for non-substrate interfaces.
    fn substrate_temperature_k(&self) -> Option<f64> {
        None
    }

    /// Specular reflection matrix, diagonal for flat interfaces.
    fn reflection(&self, m: usize, query: &InterfaceQuery) -> Result<Array2<f64>, InterfaceError>;

    /// Coherent transmission matrix, diagonal for flat interfaces. Callers
    /// must not invoke this on a substrate interface (there is nothing
    /// beneath it); [`Transparent`]/[`Fresnel`] implementations used inside
    /// the stack return the coherent transmission, substrates return a zero
    /// matrix.
    fn transmission(&self, m: usize, query: &InterfaceQuery) -> Result<Array2<f64>, InterfaceError>;

    /// Diffuse (incoherent) reflection matrix, for rough or backscattering
    /// interfaces. `None` (equivalent to the zero matrix) for perfectly
    /// specular interfaces.
    fn diffuse_reflection(&self, _m: usize, _query: &InterfaceQuery) -> Result<Option<Array2<f64>>, InterfaceError> {
        Ok(None)
    }

    /// Absorption matrix, `A = I - R - T` per polarization/stream (energy
    /// conservation, spec §4.5 invariant `R + T + A = I`). The default
    /// implementation derives this from [`Interface::reflection`] and
    /// [`Interface::transmission`]; substrates should not need to override
    /// it since their `transmission` is already the zero matrix.
    fn absorption(&self, m: usize, query: &InterfaceQuery) -> Result<Array2<f64>, InterfaceError> {
        let r = self.reflection(m, query)?;
        let t = self.transmission(m, query)?;
        let diffuse = self.diffuse_reflection(m, query)?;
        let size = r.nrows();
        let mut a = Array2::eye(size) - &r - &t;
        if let Some(d) = diffuse {
            a -= &d;
        }
        Ok(a)
    }
}

/// Diagonal `(npol*N)x(npol*N)` matrix from one scalar-per-(polarization,
/// stream) reflection/transmission coefficient, shared by [`Fresnel`] and
/// [`Reflector`].
pub(crate) fn diagonal_from_streams<F>(grid: &StreamGrid, npol: usize, coeff: F) -> Array2<f64>
where
    F: Fn(usize, f64) -> f64,
{
    let n = grid.total_streams();
    let mut out = Array2::zeros((npol * n, npol * n));
    for (i, &mu) in grid.mu().iter().enumerate() {
        for pol in 0..npol {
            out[[npol * i + pol, npol * i + pol]] = coeff(pol, mu);
        }
    }
    out
}
