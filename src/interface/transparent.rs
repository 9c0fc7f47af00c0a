// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Transparent interface: no reflection, identity transmission.
//!
//! Grounded on `original_source/smrt/interface/transparent.py`: zero
//! `specular_reflection_matrix`, identity `coherent_transmission_matrix`.

use ndarray::Array2;

use super::{Interface, InterfaceError, InterfaceQuery};

/// A boundary that neither reflects nor attenuates: radiance passes
/// straight through. Used as the default interior interface between
/// layers when no rough/Fresnel boundary is specified.
pub struct Transparent;

impl Interface for Transparent {
    fn name(&self) -> &'static str {
        "transparent"
    }

    fn reflection(&self, _m: usize, query: &InterfaceQuery) -> Result<Array2<f64>, InterfaceError> {
        let n = query.npol * query.grid.total_streams();
        Ok(Array2::zeros((n, n)))
    }

    fn transmission(&self, _m: usize, query: &InterfaceQuery) -> Result<Array2<f64>, InterfaceError> {
        let n = query.npol * query.grid.total_streams();
        Ok(Array2::eye(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::{StreamGrid, StreamScheme};

    #[test]
    fn conserves_energy_exactly() {
        let grid = StreamGrid::new(8, 0.6, StreamScheme::Gauss, 2, 0).unwrap();
        let query = InterfaceQuery {
            grid: &grid,
            frequency_hz: 37e9,
            eps_above: num_complex::Complex64::new(1.0, 0.0),
            eps_below: Some(num_complex::Complex64::new(1.5, 0.01)),
            npol: 2,
            coherent_only: false,
        };
        let t = Transparent;
        let a = t.absorption(0, &query).unwrap();
        assert!(a.iter().all(|&v| v.abs() < 1e-12));
    }
}
