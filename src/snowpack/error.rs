// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{emmodel::EmModelError, interface::InterfaceError, permittivity::PermittivityError};

/// Errors raised while constructing a [`super::Sensor`] or
/// [`super::Snowpack`], or while resolving per-layer EM/interface model
/// instances for a solve.
#[derive(Error, Debug)]
pub enum SnowpackError {
    #[error("layer thickness must be positive (or None for a semi-infinite layer), got {0}")]
    InvalidThickness(f64),

    #[error("layer temperature must be positive, got {0} K")]
    InvalidTemperature(f64),

    #[error("layer volume fraction phi must be in [0, 1], got {0}")]
    InvalidFracVolume(f64),

    #[error("a snowpack needs at least one layer")]
    EmptySnowpack,

    #[error("snowpack has {n_layers} layers but {n_interfaces} interfaces; expected {n_layers} + 1")]
    InterfaceCountMismatch { n_layers: usize, n_interfaces: usize },

    #[error("the bottom interface of a snowpack must be a substrate (non-transmitting on its far side)")]
    BottomInterfaceNotSubstrate,

    #[error("sensor incidence angle theta_inc must be in (0, pi/2), got {0} rad")]
    InvalidIncidenceAngle(f64),

    #[error("sensor frequency must be positive, got {0} Hz")]
    InvalidFrequency(f64),

    #[error("unknown EM model name {0:?}")]
    UnknownEmModel(String),

    #[error(transparent)]
    EmModel(#[from] EmModelError),

    #[error(transparent)]
    Interface(#[from] InterfaceError),

    #[error(transparent)]
    Permittivity(#[from] PermittivityError),
}
