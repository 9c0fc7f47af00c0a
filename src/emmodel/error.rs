// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{microstructure::MicrostructureError, permittivity::PermittivityError};

/// Errors raised while constructing or evaluating an EM scattering model.
/// Stream-geometry validity (nadir view vs. active-mode order) is checked
/// at [`crate::angles::StreamGrid`] construction time, not here.
#[derive(Error, Debug)]
pub enum EmModelError {
    #[error("unknown EM model {0:?}")]
    UnknownModel(String),

    #[error("EM model {model} requires frac_volume in [0, 1], got {frac_volume}")]
    InvalidFractionalVolume { model: &'static str, frac_volume: f64 },

    #[error("EM model {model} could not integrate phase matrix: {reason}")]
    IntegrationFailed { model: &'static str, reason: String },

    #[error(transparent)]
    Microstructure(#[from] MicrostructureError),

    #[error(transparent)]
    Permittivity(#[from] PermittivityError),
}
