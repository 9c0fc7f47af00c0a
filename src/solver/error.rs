// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::emmodel::EmModelError;
use crate::interface::InterfaceError;

#[derive(Error, Debug)]
pub enum SolverError {
    /// The per-mode boundary-value linear system was singular (or
    /// numerically indistinguishable from singular) and could not be
    /// solved (spec §7 `SolverDegenerate`).
    #[error("mode {mode}: boundary-value system is degenerate (singular to within tolerance)")]
    Degenerate { mode: usize },

    /// Reconstructed radiance was negative beyond tolerance, or the
    /// interface/layer stack did not conserve energy beyond tolerance
    /// (spec §7 `NumericalInstability`; reported, never silently clamped).
    #[error("mode {mode}: numerical instability ({reason})")]
    NumericalInstability { mode: usize, reason: String },

    #[error(transparent)]
    EmModel(#[from] EmModelError),

    #[error(transparent)]
    Interface(#[from] InterfaceError),
}
