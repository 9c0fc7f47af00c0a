// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Permittivity providers: pure `(frequency, temperature [, extras]) -> eps`
//! mappings (spec §4.2). Extra parameters (moisture, sand fraction, ...) are
//! captured at construction time so every provider implements the same
//! two-argument trait.

mod error;
pub mod ice;
pub mod soil;

pub use error::PermittivityError;

use num_complex::Complex64;

/// A pure, thread-safe mapping from `(frequency_hz, temperature_k)` to a
/// complex relative permittivity. Implementors must return
/// `Re(eps) >= 1, Im(eps) >= 0`; [`PermittivityProvider::check`] enforces
/// this uniformly so individual models don't each re-implement the guard.
pub trait PermittivityProvider: Send + Sync {
    /// Model name, used in error messages and the registry.
    fn name(&self) -> &'static str;

    /// Compute `eps` without the physical-range check (models implement
    /// this; callers should use [`PermittivityProvider::permittivity`]).
    fn eval(&self, frequency_hz: f64, temperature_k: f64) -> Complex64;

    /// Compute `eps`, checked against `Re(eps) >= 1, Im(eps) >= 0`.
    fn permittivity(
        &self,
        frequency_hz: f64,
        temperature_k: f64,
    ) -> Result<Complex64, PermittivityError> {
        let value = self.eval(frequency_hz, temperature_k);
        if value.re < 1.0 || value.im < 0.0 {
            return Err(PermittivityError::PhysicalValueOutOfRange {
                model: self.name(),
                frequency_hz,
                temperature_k,
                value,
            });
        }
        Ok(value)
    }
}

/// A scalar accepted as a constant provider (spec §4.2: "A scalar is
/// accepted as a constant provider").
pub struct Constant(pub Complex64);

impl PermittivityProvider for Constant {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn eval(&self, _frequency_hz: f64, _temperature_k: f64) -> Complex64 {
        self.0
    }
}

impl From<f64> for Constant {
    fn from(re: f64) -> Self {
        Constant(Complex64::new(re, 0.0))
    }
}

impl From<Complex64> for Constant {
    fn from(eps: Complex64) -> Self {
        Constant(eps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_provider_ignores_frequency_and_temperature() {
        let p = Constant::from(3.2);
        assert_eq!(p.eval(1e9, 250.0), p.eval(37e9, 300.0));
    }

    #[test]
    fn rejects_non_physical_value() {
        let p = Constant(Complex64::new(0.5, 0.0));
        assert!(p.permittivity(10e9, 270.0).is_err());
    }
}
