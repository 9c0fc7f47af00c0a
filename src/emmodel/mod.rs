// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Electromagnetic layer models (spec §4.4): given a layer's microstructure,
//! volume fraction, temperature, and the sensor frequency, produce
//! effective permittivity, absorption/scattering coefficients, and a
//! Fourier-decomposed phase matrix.

mod common;
mod error;
pub mod iba;

pub use common::{depolarization_factors, maxwell_garnett, polder_van_santen};
pub use error::EmModelError;
pub use iba::{EmModelInputs, Iba, IbaMm};

use ndarray::Array2;
use num_complex::Complex64;

use crate::angles::StreamGrid;

/// An electromagnetic scattering model built once per `(layer, sensor)`
/// pair (spec §3 "Lifecycle"). Phase matrices are lazily computed and
/// cached internally, keyed by `(mu, m_max, npol)`.
pub trait EmModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Effective relative permittivity of the layer.
    fn effective_permittivity(&self) -> Complex64;

    /// Absorption coefficient, m^-1 (`k_a >= 0`).
    fn ka(&self) -> f64;

    /// Scattering coefficient, m^-1 (`k_s >= 0`).
    fn ks(&self) -> f64;

    /// Extinction coefficient, `k_e = k_a + k_s`.
    fn ke(&self) -> f64 {
        self.ka() + self.ks()
    }

    /// Fourier-mode-`m` phase matrix on the given stream grid, shape
    /// `(npol*N) x (npol*N)`. Implementations cache this per `(mu, m_max,
    /// npol)` and rebuild only when the key changes (spec §3, §5).
    fn phase(&self, grid: &StreamGrid, m: usize, npol: usize) -> Result<Array2<f64>, EmModelError>;
}
