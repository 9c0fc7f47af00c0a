// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all `smrt`-related errors. This should be the *only*
//! error enum that is publicly visible; everything else lives behind it.

use thiserror::Error;

use crate::{
    angles::AnglesError, emmodel::EmModelError, interface::InterfaceError,
    microstructure::MicrostructureError, permittivity::PermittivityError,
    snowpack::SnowpackError, solver::SolverError,
};

/// The *only* publicly visible error from `smrt`.
#[derive(Error, Debug)]
pub enum SmrtError {
    /// Bad input at construction time: negative thickness, `phi` outside
    /// `[0, 1]`, an unknown model name passed to the registry, a malformed
    /// config file, or an inconsistent sensor/snowpack pairing.
    #[error("invalid input: {0}")]
    InputValidation(String),

    /// A stream-grid construction error.
    #[error(transparent)]
    Angles(#[from] AnglesError),

    /// A permittivity-provider error (non-physical value, unknown model).
    #[error(transparent)]
    Permittivity(#[from] PermittivityError),

    /// A microstructure-provider error (undefined Fourier transform, unknown
    /// model).
    #[error(transparent)]
    Microstructure(#[from] MicrostructureError),

    /// An EM-model construction or evaluation error.
    #[error(transparent)]
    EmModel(#[from] EmModelError),

    /// An interface-operator error.
    #[error(transparent)]
    Interface(#[from] InterfaceError),

    /// A snowpack/layer construction error.
    #[error(transparent)]
    Snowpack(#[from] SnowpackError),

    /// A solver error (singular BVP, non-conservation/negative radiance
    /// beyond tolerance).
    #[error(transparent)]
    Solver(#[from] SolverError),

    /// Config file could not be parsed.
    #[error("could not parse config: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Generic I/O error (reading a config file, writing a result table).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
