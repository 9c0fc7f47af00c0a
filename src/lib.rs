// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Microwave radiative transfer through a layered, scattering medium (snow
//! over soil, as seen by a spaceborne or ground radiometer/scatterometer).
//!
//! The two subsystems that matter are the Improved Born Approximation EM
//! layer model ([`emmodel`]) and the DORT-style multi-stream solver
//! ([`solver`]); everything else here is the data model and plumbing that
//! connects them. See [`compute`] for the single entry point that ties a
//! [`snowpack::Snowpack`] and a [`snowpack::Sensor`] together into a result.

pub mod angles;
pub mod config;
pub mod constants;
pub(crate) mod error;
pub mod emmodel;
pub mod interface;
pub mod logging;
pub mod microstructure;
mod model;
pub mod permittivity;
pub mod registry;
pub mod result;
pub mod snowpack;
pub mod solver;

pub use error::SmrtError;
pub use model::compute;
pub use result::SmrtResult;
