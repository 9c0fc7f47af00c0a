// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Microstructure providers: pure `k -> ĉ(k)` mappings returning the
//! Fourier transform of the medium's autocorrelation function (spec §4.3).

mod error;
pub mod exponential;
pub mod independent_sphere;
pub mod sticky_hard_spheres;

pub use error::MicrostructureError;
pub use exponential::Exponential;
pub use independent_sphere::IndependentSphere;
pub use sticky_hard_spheres::StickyHardSpheres;

use ndarray::ArrayD;

/// Shape-preserving, vectorized `k -> ĉ(k)` mapping. Outputs must be
/// non-negative and decay monotonically to 0 as `k -> infinity` (spec §6).
///
/// The input/output shape is erased to [`ArrayD`] (rather than generic over
/// `ndarray::Dimension`) so the trait stays object-safe: the EM model holds
/// providers as `Box<dyn Microstructure>` chosen at runtime by the plug-in
/// registry.
pub trait Microstructure: Send + Sync {
    /// Model name, used in error messages and the registry.
    fn name(&self) -> &'static str;

    /// Evaluate `ĉ(k)` elementwise over an arbitrary-shape array of
    /// wavenumber differences.
    fn ft_autocorrelation_function(&self, k: &ArrayD<f64>) -> Result<ArrayD<f64>, MicrostructureError>;
}
