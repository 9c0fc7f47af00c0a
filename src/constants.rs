// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Physical and numerical constants shared across the crate.
//!
//! All constants *must* be double precision; the solver does every
//! calculation in `f64` before any downstream consumer is free to narrow it.

pub use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Speed of light in vacuum \[m s⁻¹\].
pub const C_SPEED: f64 = 2.99792458e8;

/// 0 °C in kelvin.
pub const FREEZING_POINT_K: f64 = 273.15;

/// Cosmic microwave background brightness temperature \[K\], used as the
/// downwelling sky temperature at the top boundary in passive mode.
pub const COSMIC_BACKGROUND_K: f64 = 2.7;

/// Depolarization factors for spherical inclusions (fixed; a pluggable
/// override for non-spherical inclusions is not implemented, see spec §4.4).
pub const SPHERE_DEPOLARIZATION: (f64, f64, f64) = (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0);

/// Number of Romberg samples used for the `ks` integral is `2^K + 1`.
pub const KS_ROMBERG_K: u32 = 6;

/// Degenerate-`sinTheta` threshold below which the rotation-angle
/// regularization in the phase-matrix construction kicks in.
pub const SIN_THETA_EPSILON: f64 = 1e-6;

/// Relative threshold (times the largest-magnitude eigenvalue) below which a
/// DORT eigenvalue is treated as numerically zero.
pub const EIGENVALUE_TIE_BREAK: f64 = 1e-12;

/// Default energy-conservation tolerance for interface/phase-matrix checks.
pub const DEFAULT_ENERGY_TOLERANCE: f64 = 0.05;

/// Default floor below which reconstructed radiance is considered a
/// numerical-instability violation rather than legitimate near-zero signal.
pub const DEFAULT_RADIANCE_FLOOR: f64 = 1e-6;

/// Default maximum azimuthal Fourier mode for active-mode solves.
pub const DEFAULT_ACTIVE_M_MAX: usize = 3;
