// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InterfaceError {
    /// An interface variant was asked to operate in a sensor mode it does
    /// not support, e.g. [`super::SoilWegmuller`] under an active sensor
    /// (spec §4.5, §7 `UnsupportedMode`).
    #[error("interface '{interface}' does not support {mode} mode")]
    UnsupportedMode { interface: &'static str, mode: &'static str },

    #[error("interface '{interface}' requires eps_below (transmission into a lower medium), got None")]
    MissingBelowPermittivity { interface: &'static str },

    #[error("interface '{interface}': {reason}")]
    InvalidConfiguration { interface: &'static str, reason: String },

    #[error("unknown interface model '{0}'")]
    UnknownModel(String),
}
