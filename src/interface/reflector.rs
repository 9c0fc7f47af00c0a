// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Prescribed reflector substrate: a user-specified specular reflectivity
//! (and optional diffuse backscattering coefficient), grounded on
//! `original_source/smrt/substrate/reflector_backscatter.py` (`Reflector`).

use std::sync::Arc;

use ndarray::Array2;

use super::{diagonal_from_streams, Interface, InterfaceError, InterfaceQuery};

/// Reproduces the original's scalar/dict/callable acceptance for
/// `specular_reflection` and `backscattering_coefficient` (SPEC_FULL.md
/// "Reflector's dict-vs-scalar-vs-fn polymorphism").
#[derive(Clone)]
pub enum ReflectionSpec {
    /// A single value for every polarization and incidence angle.
    Scalar(f64),
    /// Distinct specs for V and H (and, if present, reused for the
    /// active-mode `U` channel via the H spec).
    PerPolarization { v: Box<ReflectionSpec>, h: Box<ReflectionSpec> },
    /// An arbitrary function of incidence angle (radians).
    Function(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl ReflectionSpec {
    fn evaluate(&self, pol: usize, theta_rad: f64) -> f64 {
        match self {
            ReflectionSpec::Scalar(v) => *v,
            ReflectionSpec::PerPolarization { v, h } => {
                if pol == 0 {
                    v.evaluate(pol, theta_rad)
                } else {
                    h.evaluate(pol, theta_rad)
                }
            }
            ReflectionSpec::Function(f) => f(theta_rad),
        }
    }
}

impl From<f64> for ReflectionSpec {
    fn from(v: f64) -> Self {
        ReflectionSpec::Scalar(v)
    }
}

/// Open question (spec §9): the original divides the diffuse backscatter
/// coefficient by `mu` with a source comment acknowledging the choice is
/// unclear. Surfaced here as an explicit, documented policy rather than
/// silently hard-coded; `DivideByMu` (the original's behaviour) is the
/// only variant implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffuseBackscatterPolicy {
    #[default]
    DivideByMu,
}

/// A boundary with a prescribed (not physically derived) specular
/// reflectivity, optionally with an additional diffuse backscatter term.
/// Always a substrate (spec §4.5): nothing transmits through it.
pub struct Reflector {
    specular_reflection: ReflectionSpec,
    backscattering_coefficient: Option<ReflectionSpec>,
    diffuse_policy: DiffuseBackscatterPolicy,
    temperature_k: f64,
}

impl Reflector {
    pub fn new(
        specular_reflection: ReflectionSpec,
        backscattering_coefficient: Option<ReflectionSpec>,
        temperature_k: f64,
    ) -> Reflector {
        Reflector {
            specular_reflection,
            backscattering_coefficient,
            diffuse_policy: DiffuseBackscatterPolicy::default(),
            temperature_k,
        }
    }

    /// Convenience constructor for a single scalar reflectivity (spec §8
    /// S6: `specular_reflection=1`).
    pub fn scalar(specular_reflection: f64, temperature_k: f64) -> Reflector {
        Reflector::new(ReflectionSpec::Scalar(specular_reflection), None, temperature_k)
    }

    pub fn with_backscattering_coefficient(mut self, coefficient: ReflectionSpec) -> Self {
        self.backscattering_coefficient = Some(coefficient);
        self
    }
}

impl Interface for Reflector {
    fn name(&self) -> &'static str {
        "reflector"
    }

    fn is_substrate(&self) -> bool {
        true
    }

    fn substrate_temperature_k(&self) -> Option<f64> {
        Some(self.temperature_k)
    }

    fn reflection(&self, _m: usize, query: &InterfaceQuery) -> Result<Array2<f64>, InterfaceError> {
        Ok(diagonal_from_streams(query.grid, query.npol, |pol, mu| {
            self.specular_reflection.evaluate(pol, mu.abs().acos())
        }))
    }

    fn transmission(&self, _m: usize, query: &InterfaceQuery) -> Result<Array2<f64>, InterfaceError> {
        let n = query.npol * query.grid.total_streams();
        Ok(Array2::zeros((n, n)))
    }

    fn diffuse_reflection(&self, m: usize, query: &InterfaceQuery) -> Result<Option<Array2<f64>>, InterfaceError> {
        if m > 0 {
            return Ok(None);
        }
        let Some(coefficient) = &self.backscattering_coefficient else {
            return Ok(None);
        };
        // spec §4.5 / reflector_backscatter.py:75-76: the diffuse backscatter
        // term is hemispheric and only contributes to the azimuthally
        // averaged mode; m=0's sign is +1/2.
        let sign = 0.5;
        Ok(Some(diagonal_from_streams(query.grid, query.npol, |pol, mu| {
            let coef = coefficient.evaluate(pol, mu.abs().acos());
            match self.diffuse_policy {
                DiffuseBackscatterPolicy::DivideByMu => sign * coef / mu.abs(),
            }
        })))
    }

    /// Spec §4.5: "absorption is `1 - R`" — this is the literal source
    /// behaviour, which does not additionally subtract the diffuse
    /// backscatter term (see `DiffuseBackscatterPolicy` docs: the
    /// diffuse term's interaction with the energy budget is an open
    /// question in the source this was distilled from, not resolved here).
    fn absorption(&self, m: usize, query: &InterfaceQuery) -> Result<Array2<f64>, InterfaceError> {
        let r = self.reflection(m, query)?;
        let n = r.nrows();
        Ok(Array2::eye(n) - &r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::{StreamGrid, StreamScheme};

    fn query(grid: &StreamGrid, npol: usize) -> InterfaceQuery<'_> {
        InterfaceQuery {
            grid,
            frequency_hz: 37e9,
            eps_above: num_complex::Complex64::new(1.0, 0.0),
            eps_below: None,
            npol,
            coherent_only: false,
        }
    }

    #[test]
    fn perfect_reflector_absorbs_nothing() {
        let grid = StreamGrid::new(8, 0.6, StreamScheme::Gauss, 2, 0).unwrap();
        let r = Reflector::scalar(1.0, 260.0);
        let a = r.absorption(0, &query(&grid, 2)).unwrap();
        assert!(a.iter().all(|&v| v.abs() < 1e-12));
    }

    #[test]
    fn diffuse_term_vanishes_above_mode_zero() {
        let grid = StreamGrid::new(8, 0.6, StreamScheme::Gauss, 3, 3).unwrap();
        let r = Reflector::scalar(0.1, 260.0).with_backscattering_coefficient(ReflectionSpec::Scalar(0.02));
        let d0 = r.diffuse_reflection(0, &query(&grid, 3)).unwrap().unwrap();
        let d1 = r.diffuse_reflection(1, &query(&grid, 3)).unwrap();
        let d2 = r.diffuse_reflection(2, &query(&grid, 3)).unwrap();
        assert!(d0[[0, 0]].abs() > 0.0);
        assert!(d1.is_none());
        assert!(d2.is_none());
    }

    #[test]
    fn is_always_a_substrate() {
        assert!(Reflector::scalar(0.5, 260.0).is_substrate());
    }
}
