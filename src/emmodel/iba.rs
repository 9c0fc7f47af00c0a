// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Improved Born Approximation electromagnetic model, grounded on
//! `original_source/smrt/emmodel/iba.py` (`IBA`, `IBA_MM`).

use std::f64::consts::PI;
use std::sync::Arc;
use std::sync::RwLock;

use ndarray::{Array1, Array2, ArrayD};
use num_complex::Complex64;
use rustfft::{num_complex::Complex as FftComplex, FftPlanner};

use crate::angles::StreamGrid;
use crate::constants::{C_SPEED, KS_ROMBERG_K};
use crate::microstructure::Microstructure;

use super::common::{depolarization_factors, maxwell_garnett, polder_van_santen};
use super::error::EmModelError;
use super::EmModel;

/// Everything a layer/sensor pair contributes to the EM model, extracted
/// ahead of construction so this module does not depend on the snowpack or
/// sensor modules directly.
pub struct EmModelInputs {
    pub frequency_hz: f64,
    pub frac_volume: f64,
    pub background_permittivity: Complex64,
    pub inclusion_permittivity: Complex64,
    pub microstructure: Arc<dyn Microstructure>,
    /// 2 for passive, 3 for active.
    pub npol: usize,
    /// Maximum Fourier mode the solver will request; 0 for passive.
    pub m_max: usize,
}

struct PhaseCache {
    mu: Array1<f64>,
    m_max: usize,
    npol: usize,
    modes: Vec<Array2<f64>>,
}

/// Improved Born Approximation EM model (Matzler 1998). Effective
/// permittivity uses Maxwell-Garnett mixing; see [`IbaMm`] for the
/// Polder-van Santen variant.
pub struct Iba {
    frac_volume: f64,
    microstructure: Arc<dyn Microstructure>,
    e0: Complex64,
    eps: Complex64,
    k0: f64,
    depol_xyz: (f64, f64, f64),
    effective_permittivity: Complex64,
    iba_coeff: Complex64,
    ka: f64,
    ks: f64,
    npol: usize,
    m_max: usize,
    phase_cache: RwLock<Option<PhaseCache>>,
}

impl Iba {
    pub fn new(inputs: EmModelInputs) -> Result<Iba, EmModelError> {
        if !(0.0..=1.0).contains(&inputs.frac_volume) {
            return Err(EmModelError::InvalidFractionalVolume {
                model: "iba",
                frac_volume: inputs.frac_volume,
            });
        }
        let k0 = 2.0 * PI * inputs.frequency_hz / C_SPEED;
        let depol_xyz = depolarization_factors();
        let effective_permittivity = maxwell_garnett(
            inputs.frac_volume,
            inputs.background_permittivity,
            inputs.inclusion_permittivity,
            depol_xyz,
        );

        let mut iba = Iba {
            frac_volume: inputs.frac_volume,
            microstructure: inputs.microstructure,
            e0: inputs.background_permittivity,
            eps: inputs.inclusion_permittivity,
            k0,
            depol_xyz,
            effective_permittivity,
            iba_coeff: Complex64::new(0.0, 0.0),
            ka: 0.0,
            ks: 0.0,
            npol: inputs.npol,
            m_max: inputs.m_max,
            phase_cache: RwLock::new(None),
        };

        iba.iba_coeff = iba.calc_iba_coeff();
        iba.ka = iba.calc_ka();
        iba.ks = iba.calc_ks()?;
        Ok(iba)
    }

    fn mean_sq_field_ratio(&self) -> f64 {
        mean_sq_field_ratio(self.effective_permittivity, self.e0, self.eps, self.depol_xyz)
    }

    fn calc_iba_coeff(&self) -> Complex64 {
        let y2 = self.mean_sq_field_ratio();
        let delta_eps = self.eps - self.e0;
        (1.0 / (4.0 * PI)) * (delta_eps * delta_eps) * y2 * self.k0.powi(4)
    }

    fn calc_ka(&self) -> f64 {
        self.k0 * self.effective_permittivity.im / self.effective_permittivity.re.sqrt()
    }

    /// Magnitude of `sqrt(eps_eff)`, used consistently for the wavevector
    /// difference in both the scattering-coefficient integral and the phase
    /// matrix. The source and spec write `k0 * sqrt(eps_eff)` without an
    /// explicit magnitude in the phase-matrix formula, which cannot be
    /// literal since `ft_autocorrelation_function` is a real-valued
    /// function of a real wavenumber; the scattering-coefficient integral
    /// in the same source resolves the same expression with an explicit
    /// `abs()`, so that resolution is applied uniformly here too (see
    /// DESIGN.md).
    fn sqrt_eff_permittivity_magnitude(&self) -> f64 {
        self.effective_permittivity.norm().sqrt()
    }

    fn calc_ks(&self) -> Result<f64, EmModelError> {
        let nsamples = (1usize << KS_ROMBERG_K) + 1;
        let mu: Vec<f64> = (0..nsamples)
            .map(|i| 1.0 - 2.0 * (i as f64) / (nsamples as f64 - 1.0))
            .collect();
        let h = mu[0] - mu[1];
        let y: Result<Vec<f64>, EmModelError> = mu.iter().map(|&m| self.ks_integrand(m)).collect();
        let y = y?;
        let ks_int = romberg_integrate(&y, h);
        let ks = ks_int / 4.0;
        if ks < 0.0 {
            return Err(EmModelError::IntegrationFailed {
                model: "iba",
                reason: format!("scattering coefficient integrated to a negative value ({ks})"),
            });
        }
        Ok(ks)
    }

    fn ks_integrand(&self, mu: f64) -> Result<f64, EmModelError> {
        let sintheta_2 = ((1.0 - mu) / 2.0).max(0.0).sqrt();
        let k_diff = 2.0 * self.k0 * sintheta_2 * self.sqrt_eff_permittivity_magnitude();
        let k = ArrayD::from_elem(ndarray::IxDyn(&[1]), k_diff);
        let ft_corr_fn = self.microstructure.ft_autocorrelation_function(&k)?[[0]];
        let p11 = (self.iba_coeff.re * ft_corr_fn) * mu * mu;
        let p22 = self.iba_coeff.re * ft_corr_fn;
        Ok(p11 + p22)
    }

    fn ensure_phase_cache(&self, mu: &Array1<f64>, m_max: usize, npol: usize) -> Result<(), EmModelError> {
        {
            let cache = self.phase_cache.read().expect("phase cache lock poisoned");
            if let Some(c) = cache.as_ref() {
                if c.mu == *mu && c.m_max >= m_max && c.npol == npol {
                    return Ok(());
                }
            }
        }
        let modes = precompute_ft_phase(mu, m_max, npol, self.k0, self.effective_permittivity, &*self.microstructure, self.iba_coeff)?;
        let mut cache = self.phase_cache.write().expect("phase cache lock poisoned");
        *cache = Some(PhaseCache {
            mu: mu.clone(),
            m_max,
            npol,
            modes,
        });
        Ok(())
    }
}

impl EmModel for Iba {
    fn name(&self) -> &'static str {
        "iba"
    }

    fn effective_permittivity(&self) -> Complex64 {
        self.effective_permittivity
    }

    fn ka(&self) -> f64 {
        self.ka
    }

    fn ks(&self) -> f64 {
        self.ks
    }

    fn phase(&self, grid: &StreamGrid, m: usize, npol: usize) -> Result<Array2<f64>, EmModelError> {
        if npol == 3 && m >= 2 && grid.mu().iter().any(|&mu| (mu.abs() - 1.0).abs() < 1e-12) {
            return Err(EmModelError::IntegrationFailed {
                model: self.name(),
                reason: "requested mu = 1 with npol = 3 and m >= 2; sign convention undefined".to_string(),
            });
        }
        self.ensure_phase_cache(grid.mu(), m.max(self.m_max), npol)?;
        let cache = self.phase_cache.read().expect("phase cache lock poisoned");
        Ok(cache.as_ref().unwrap().modes[m].clone())
    }
}

/// Mean-squared field ratio shared by [`Iba`] and [`IbaMm`] (spec §4.4).
pub(super) fn mean_sq_field_ratio(
    effective_permittivity: Complex64,
    e0: Complex64,
    eps: Complex64,
    depol_xyz: (f64, f64, f64),
) -> f64 {
    let quasi = (2.0 * effective_permittivity + e0) / 3.0;
    let axes = [depol_xyz.0, depol_xyz.1, depol_xyz.2];
    let sum: f64 = axes
        .iter()
        .map(|&a| {
            let ratio = quasi / (quasi + (eps - e0) * a);
            ratio.norm_sqr()
        })
        .sum();
    sum / 3.0
}

/// Polder-van Santen variant of [`Iba`] used for comparison against MEMLS
/// (spec §4.4, §8 S3). Replaces `Re(eps_eff)` with Polder-van Santen and
/// reconstructs the imaginary part via Wiesmann & Matzler (1999).
pub struct IbaMm {
    inner: Iba,
}

impl IbaMm {
    pub fn new(inputs: EmModelInputs) -> Result<IbaMm, EmModelError> {
        let mut iba = Iba::new(EmModelInputs {
            frequency_hz: inputs.frequency_hz,
            frac_volume: inputs.frac_volume,
            background_permittivity: inputs.background_permittivity,
            inclusion_permittivity: inputs.inclusion_permittivity,
            microstructure: Arc::clone(&inputs.microstructure),
            npol: inputs.npol,
            m_max: inputs.m_max,
        })?;

        let eps_real = polder_van_santen(iba.frac_volume, iba.e0.re, iba.eps.re);
        let y2 = mean_sq_field_ratio(Complex64::new(eps_real, 0.0), iba.e0, iba.eps, iba.depol_xyz);
        let eps_imag = iba.frac_volume * iba.eps.im * y2 * eps_real.sqrt();
        iba.effective_permittivity = Complex64::new(eps_real, eps_imag);

        iba.iba_coeff = iba.calc_iba_coeff();
        iba.ka = iba.calc_ka();
        iba.ks = iba.calc_ks_mm()?;
        // Invalidate any phase cache computed against the IBA (Maxwell-Garnett)
        // permittivity before the Polder-van Santen correction was applied.
        *iba.phase_cache.write().expect("phase cache lock poisoned") = None;

        Ok(IbaMm { inner: iba })
    }
}

impl Iba {
    /// IBA_MM scattering coefficient: `scipy.integrate.quad` over `[0, pi]`
    /// in the source is replaced with fixed-node Simpson's rule (no
    /// adaptive-quadrature crate is part of this stack); node count is
    /// chosen generously relative to the kernel's smoothness for the
    /// tolerance spec §8 S3 asks for.
    fn calc_ks_mm(&self) -> Result<f64, EmModelError> {
        const NODES: usize = 2049; // odd, Simpson-compatible
        let h = PI / (NODES as f64 - 1.0);
        let mut values = Vec::with_capacity(NODES);
        for i in 0..NODES {
            let theta = i as f64 * h;
            values.push(self.mm_integrand(theta)?);
        }
        let ks_int = simpson_integrate(&values, h);
        Ok(ks_int / 2.0)
    }

    fn mm_integrand(&self, theta: f64) -> Result<f64, EmModelError> {
        let k_diff = 2.0 * self.k0 * (theta / 2.0).sin() * self.sqrt_eff_permittivity_magnitude();
        let k = ArrayD::from_elem(ndarray::IxDyn(&[1]), k_diff);
        let ft_corr_fn = self.microstructure.ft_autocorrelation_function(&k)?[[0]];
        let p_mm = self.iba_coeff.re * ft_corr_fn * (1.0 - 0.5 * theta.sin().powi(2));
        Ok(p_mm * theta.sin())
    }
}

impl EmModel for IbaMm {
    fn name(&self) -> &'static str {
        "iba_mm"
    }

    fn effective_permittivity(&self) -> Complex64 {
        self.inner.effective_permittivity
    }

    fn ka(&self) -> f64 {
        self.inner.ka
    }

    fn ks(&self) -> f64 {
        self.inner.ks
    }

    fn phase(&self, grid: &StreamGrid, m: usize, npol: usize) -> Result<Array2<f64>, EmModelError> {
        self.inner.phase(grid, m, npol)
    }
}

/// Romberg integration of `y` sampled at `2^k + 1` uniformly spaced points
/// with step `h`, reimplementing `scipy.integrate.romb` (spec §4.4).
fn romberg_integrate(y: &[f64], h: f64) -> f64 {
    let n = y.len() - 1;
    let k_max = (n as f64).log2().round() as usize;
    debug_assert_eq!(1usize << k_max, n, "romberg_integrate requires 2^k + 1 samples");

    let mut r = vec![vec![0.0_f64; k_max + 1]; k_max + 1];
    for k in 0..=k_max {
        let step = n >> k;
        let npoints = (1 << k) + 1;
        let hk = h * step as f64;
        let mut sum = 0.0;
        for idx in 0..npoints {
            let v = y[idx * step];
            sum += if idx == 0 || idx == npoints - 1 { 0.5 * v } else { v };
        }
        r[k][0] = sum * hk;
    }
    for j in 1..=k_max {
        for k in j..=k_max {
            r[k][j] = r[k][j - 1] + (r[k][j - 1] - r[k - 1][j - 1]) / (4f64.powi(j as i32) - 1.0);
        }
    }
    r[k_max][k_max].abs()
}

/// Composite Simpson's rule over an odd number of uniformly spaced samples.
fn simpson_integrate(y: &[f64], h: f64) -> f64 {
    let n = y.len() - 1;
    debug_assert_eq!(n % 2, 0, "simpson_integrate requires an even number of intervals");
    let mut sum = y[0] + y[n];
    for i in 1..n {
        sum += if i % 2 == 0 { 2.0 * y[i] } else { 4.0 * y[i] };
    }
    sum * h / 3.0
}

/// Rotated Rayleigh-kernel rotation cosines/sines for one `(mu_i, mu_j,
/// delta_phi)` scattering geometry (spec §4.4 step 3; Matzler 2006 p.113
/// sign convention for `delta_phi >= pi`).
struct RotationAngles {
    cosa2: f64,
    sina2: f64,
    cosai2: f64,
    sinai2: f64,
    sin2a: f64,
    sin2ai: f64,
    cos2a: f64,
    cos2ai: f64,
}

fn rotation_angles(mu_out: f64, sin_out: f64, mu_in: f64, sin_in: f64, cos_pd: f64, phi_diff: f64, sin_theta: f64) -> RotationAngles {
    let (mut cos_i1, mut cos_i2) = (mu_in * sin_out - mu_out * sin_in * cos_pd, mu_out * sin_in - mu_in * sin_out * cos_pd);
    if sin_theta >= 1e-6 {
        cos_i1 /= sin_theta;
        cos_i2 /= sin_theta;
    }
    if mu_out.abs() == 1.0 && sin_in.abs() < 1e-6 {
        cos_i1 = 1.0;
        cos_i2 = cos_pd;
    }
    let cos_i1 = cos_i1.clamp(-1.0, 1.0);
    let cos_i2 = cos_i2.clamp(-1.0, 1.0);

    let cosa = -cos_i2;
    let cosai = cos_i1;
    let cosa2 = cosa * cosa;
    let cosai2 = cosai * cosai;
    let sina2 = (1.0 - cosa2).max(0.0);
    let sinai2 = (1.0 - cosai2).max(0.0);
    let mut sin2a = -2.0 * cosa * sina2.sqrt();
    let mut sin2ai = 2.0 * cosai * sinai2.sqrt();
    let cos2a = 2.0 * cosa2 - 1.0;
    let cos2ai = 2.0 * cosai2 - 1.0;
    if phi_diff >= PI {
        sin2a = -sin2a;
        sin2ai = -sin2ai;
    }
    RotationAngles {
        cosa2,
        sina2,
        cosai2,
        sinai2,
        sin2a,
        sin2ai,
        cos2a,
        cos2ai,
    }
}

#[allow(clippy::too_many_arguments)]
fn precompute_ft_phase(
    mu: &Array1<f64>,
    m_max: usize,
    npol: usize,
    k0: f64,
    effective_permittivity: Complex64,
    microstructure: &dyn Microstructure,
    iba_coeff: Complex64,
) -> Result<Vec<Array2<f64>>, EmModelError> {
    let n = mu.len();
    let nsamples = 1usize << (m_max + 2);
    let dphi_interval = 2.0 * PI / nsamples as f64;
    let dphis: Vec<f64> = (0..nsamples).map(|k| k as f64 * dphi_interval).collect();

    let sin_theta: Vec<f64> = mu.iter().map(|&m| (1.0 - m * m).max(0.0).sqrt()).collect();
    let sqrt_eff_mag = effective_permittivity.norm().sqrt();

    let sizes: Vec<usize> = (0..=m_max).map(|m| if m == 0 { 2 } else { npol }).collect();
    let mut modes: Vec<Array2<f64>> = sizes.iter().map(|&s| Array2::zeros((s * n, s * n))).collect();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(nsamples);

    for i in 0..n {
        let mu_i = mu[i];
        let sin_i = sin_theta[i];
        for j in 0..n {
            let mu_j = mu[j];
            let sin_j = sin_theta[j];

            let mut p11 = vec![FftComplex::new(0.0, 0.0); nsamples];
            let mut p12 = vec![FftComplex::new(0.0, 0.0); nsamples];
            let mut p21 = vec![FftComplex::new(0.0, 0.0); nsamples];
            let mut p22 = vec![FftComplex::new(0.0, 0.0); nsamples];
            let mut p13 = vec![FftComplex::new(0.0, 0.0); nsamples];
            let mut p23 = vec![FftComplex::new(0.0, 0.0); nsamples];
            let mut p31 = vec![FftComplex::new(0.0, 0.0); nsamples];
            let mut p32 = vec![FftComplex::new(0.0, 0.0); nsamples];
            let mut p33 = vec![FftComplex::new(0.0, 0.0); nsamples];

            for (k, &phi_diff) in dphis.iter().enumerate() {
                let cos_pd = phi_diff.cos();
                let mut cos_theta = mu_i * mu_j + sin_i * sin_j * cos_pd;
                cos_theta = cos_theta.clamp(-1.0, 1.0);
                let cos_theta2 = cos_theta * cos_theta;
                let sin_theta_scatter = (1.0 - cos_theta2).max(0.0).sqrt();

                let k_diff = 2.0 * k0 * sqrt_eff_mag * ((1.0 - cos_theta) / 2.0).max(0.0).sqrt();
                let k_arr = ArrayD::from_elem(ndarray::IxDyn(&[1]), k_diff);
                let c = microstructure.ft_autocorrelation_function(&k_arr)?[[0]];

                let r = rotation_angles(mu_i, sin_i, mu_j, sin_j, cos_pd, phi_diff, sin_theta_scatter);

                p11[k] = FftComplex::new(
                    c * (r.cosa2 * r.cosai2 * cos_theta2 + r.sina2 * r.sinai2 - 0.5 * r.sin2a * cos_theta * r.sin2ai),
                    0.0,
                );
                p12[k] = FftComplex::new(
                    c * (r.cosa2 * r.sinai2 * cos_theta2 + r.sina2 * r.cosai2 + 0.5 * r.sin2a * cos_theta * r.sin2ai),
                    0.0,
                );
                p21[k] = FftComplex::new(
                    c * (r.sina2 * r.cosai2 * cos_theta2 + r.cosa2 * r.sinai2 + 0.5 * r.sin2a * cos_theta * r.sin2ai),
                    0.0,
                );
                p22[k] = FftComplex::new(
                    c * (r.sina2 * r.sinai2 * cos_theta2 + r.cosa2 * r.cosai2 - 0.5 * r.sin2a * cos_theta * r.sin2ai),
                    0.0,
                );

                if npol == 3 {
                    p13[k] = FftComplex::new(
                        c * 0.5 * (r.cosa2 * r.sin2ai * cos_theta2 - r.sina2 * r.sin2ai + r.sin2a * cos_theta * r.cos2ai),
                        0.0,
                    );
                    p23[k] = FftComplex::new(
                        c * 0.5 * (r.sina2 * cos_theta2 * r.sin2ai - r.cosa2 * r.sin2ai - r.sin2a * cos_theta * r.cos2ai),
                        0.0,
                    );
                    p31[k] = FftComplex::new(
                        c * (-r.sin2a * cos_theta2 * r.cosai2 + r.sin2a * r.sinai2 - r.cos2a * cos_theta * r.sin2ai),
                        0.0,
                    );
                    p32[k] = FftComplex::new(
                        c * (-r.sin2a * cos_theta2 * r.sinai2 + r.sin2a * r.cosai2 + r.cos2a * cos_theta * r.sin2ai),
                        0.0,
                    );
                    p33[k] = FftComplex::new(
                        c * (-0.5 * r.sin2a * cos_theta2 * r.sin2ai - 0.5 * r.sin2a * r.sin2ai + r.cos2a * cos_theta * r.cos2ai),
                        0.0,
                    );
                }
            }

            fft.process(&mut p11);
            fft.process(&mut p12);
            fft.process(&mut p21);
            fft.process(&mut p22);
            if npol == 3 {
                fft.process(&mut p13);
                fft.process(&mut p23);
                fft.process(&mut p31);
                fft.process(&mut p32);
                fft.process(&mut p33);
            }

            let norm = nsamples as f64;
            let mode0 = &mut modes[0];
            mode0[[2 * i, 2 * j]] = ((p11[0] / norm) * iba_coeff).re;
            mode0[[2 * i, 2 * j + 1]] = ((p12[0] / norm) * iba_coeff).re;
            mode0[[2 * i + 1, 2 * j]] = ((p21[0] / norm) * iba_coeff).re;
            mode0[[2 * i + 1, 2 * j + 1]] = ((p22[0] / norm) * iba_coeff).re;

            if npol == 3 {
                for m in 1..=m_max {
                    let delta = 2.0;
                    let block = &mut modes[m];
                    let (bi, bj) = (npol * i, npol * j);
                    block[[bi, bj]] = ((p11[m] / norm) * iba_coeff).re * delta;
                    block[[bi, bj + 1]] = ((p12[m] / norm) * iba_coeff).re * delta;
                    block[[bi + 1, bj]] = ((p21[m] / norm) * iba_coeff).re * delta;
                    block[[bi + 1, bj + 1]] = ((p22[m] / norm) * iba_coeff).re * delta;
                    block[[bi, bj + 2]] = -((p13[m] / norm) * iba_coeff).im * delta;
                    block[[bi + 1, bj + 2]] = -((p23[m] / norm) * iba_coeff).im * delta;
                    block[[bi + 2, bj]] = ((p31[m] / norm) * iba_coeff).im * delta;
                    block[[bi + 2, bj + 1]] = ((p32[m] / norm) * iba_coeff).im * delta;
                    block[[bi + 2, bj + 2]] = ((p33[m] / norm) * iba_coeff).re * delta;
                }
            }
        }
    }

    Ok(modes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::microstructure::Exponential;

    fn test_inputs(npol: usize, m_max: usize) -> EmModelInputs {
        EmModelInputs {
            frequency_hz: 37e9,
            frac_volume: 0.3,
            background_permittivity: Complex64::new(1.0, 0.0),
            inclusion_permittivity: Complex64::new(3.1811, 0.0009),
            microstructure: Arc::new(Exponential { corr_length: 1e-4 }),
            npol,
            m_max,
        }
    }

    #[test]
    fn ks_is_non_negative_for_passive_sensor() {
        let iba = Iba::new(test_inputs(2, 0)).unwrap();
        assert!(iba.ks() >= 0.0);
        assert!(iba.ka() >= 0.0);
    }

    #[test]
    fn phase_mode_zero_is_two_by_two_per_stream() {
        let grid = StreamGrid::new(4, 0.9, crate::angles::StreamScheme::Gauss, 2, 0).unwrap();
        let iba = Iba::new(test_inputs(2, 0)).unwrap();
        let p = iba.phase(&grid, 0, 2).unwrap();
        assert_eq!(p.nrows(), 2 * grid.total_streams());
        assert_eq!(p.ncols(), 2 * grid.total_streams());
    }

    #[test]
    fn rejects_out_of_range_fractional_volume() {
        let mut inputs = test_inputs(2, 0);
        inputs.frac_volume = 1.5;
        assert!(Iba::new(inputs).is_err());
    }

    #[test]
    fn iba_mm_matches_reference_scenario_s3_order_of_magnitude() {
        let iba_mm = IbaMm::new(test_inputs(2, 0)).unwrap();
        assert!(iba_mm.ks() > 0.0 && iba_mm.ks() < 1.0);
        assert!(iba_mm.ka() > 0.0 && iba_mm.ka() < 1.0);
    }
}
