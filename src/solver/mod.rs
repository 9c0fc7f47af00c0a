// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Multi-stream radiative transfer solver (spec §4.6): turns a built
//! [`crate::snowpack::Snowpack`] plus its per-layer [`crate::emmodel::EmModel`]s
//! into brightness temperatures or backscatter coefficients for a given
//! [`crate::snowpack::Sensor`].

mod dort;
mod error;

pub use dort::{solve, SolveOutput};
pub use error::SolverError;
