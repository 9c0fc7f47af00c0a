// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PermittivityError {
    /// `Re(eps) < 1` or `Im(eps) < 0` (spec §4.2).
    #[error("non-physical permittivity from '{model}' at f={frequency_hz} Hz, T={temperature_k} K: {value}")]
    PhysicalValueOutOfRange {
        model: &'static str,
        frequency_hz: f64,
        temperature_k: f64,
        value: num_complex::Complex64,
    },

    #[error("unknown permittivity model '{0}'")]
    UnknownModel(String),

    #[error("permittivity model '{model}' requires parameter '{parameter}'")]
    MissingParameter {
        model: &'static str,
        parameter: &'static str,
    },
}
