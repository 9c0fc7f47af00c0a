// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnglesError {
    /// A stream grid was requested with a viewing cosine of exactly 1
    /// (nadir) together with a configuration whose phase-matrix sign
    /// convention breaks down there: active sensors (`npol == 3`) needing
    /// Fourier modes `m >= 2`. See spec §4.4 and DESIGN.md for why this is
    /// rejected here rather than deep inside phase-matrix construction.
    #[error(
        "viewing cosine mu=1 is incompatible with npol={npol} and m_max={m_max}; the rotation-angle sign convention is undefined at nadir for active high-order modes"
    )]
    NadirViewWithHighOrderActiveModes { npol: usize, m_max: usize },

    #[error("n_streams must be at least 1, got {0}")]
    TooFewStreams(usize),

    #[error("viewing cosine mu_obs must be in (0, 1], got {0}")]
    ViewingCosineOutOfRange(f64),
}
