// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MicrostructureError {
    /// The Fourier transform of the autocorrelation function is not
    /// defined for this model (or a parameter makes it ill-posed), spec §4.3.
    #[error("Fourier transform of the correlation function is not defined for model '{model}': {reason}")]
    Undefined { model: &'static str, reason: String },

    #[error("unknown microstructure model '{0}'")]
    UnknownModel(String),
}
