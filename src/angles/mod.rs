// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Angular discretization: stream cosines and hemispheric quadrature
//! weights shared by the EM model and the DORT solver (spec §4.1).

mod error;
pub use error::AnglesError;

use ndarray::Array1;

/// The quadrature scheme used to place stream cosines on `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::EnumString, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum StreamScheme {
    /// Standard Gauss-Legendre nodes/weights on `(0, 1]`.
    Gauss,
    /// Gauss-Legendre nodes with small weights merged into neighbours,
    /// reducing the effective stream count for cheaper solves. Not
    /// implemented beyond falling back to `Gauss` (no compression rule is
    /// specified); kept as a named, registry-visible option per spec §6.
    CompressedGauss,
}

impl Default for StreamScheme {
    fn default() -> Self {
        StreamScheme::Gauss
    }
}

/// A symmetric, ordered set of stream cosines `{+mu_i} ++ {-mu_i}` with
/// quadrature weights for hemispheric integration, and the index of the
/// injected viewing direction.
///
/// Ordering: upward streams first (positive `mu`), then downward (negative
/// `mu`), as required by spec §4.1. The viewing direction `mu_obs` is always
/// present among the upward streams so the solver never needs to
/// interpolate the emergent radiance.
#[derive(Debug, Clone)]
pub struct StreamGrid {
    /// Signed stream cosines, upward block then downward block, each of
    /// length `n`.
    mu: Array1<f64>,
    /// Quadrature weight for each entry in `mu` (same value for the mirrored
    /// up/down pair), summing to 1 over each hemisphere.
    weights: Array1<f64>,
    /// Number of streams per hemisphere (`mu.len() == 2 * n`).
    n: usize,
    /// Index (into the upward block, i.e. into `mu`/`weights` directly) of
    /// the injected viewing direction.
    viewing_index: usize,
}

impl StreamGrid {
    /// Build a stream grid with `n_streams` Gauss-Legendre nodes per
    /// hemisphere, injecting `mu_obs` if it is not already one of them.
    ///
    /// `npol`/`m_max` gate the `InvalidStreamGeometry`-class rejection at
    /// `mu_obs == 1` for active, high-order-mode sensors (spec §9 Open
    /// Questions; resolved here, see DESIGN.md).
    pub fn new(
        n_streams: usize,
        mu_obs: f64,
        scheme: StreamScheme,
        npol: usize,
        m_max: usize,
    ) -> Result<StreamGrid, AnglesError> {
        if n_streams == 0 {
            return Err(AnglesError::TooFewStreams(n_streams));
        }
        if !(mu_obs > 0.0 && mu_obs <= 1.0) {
            return Err(AnglesError::ViewingCosineOutOfRange(mu_obs));
        }
        if (mu_obs - 1.0).abs() < f64::EPSILON && npol == 3 && m_max >= 2 {
            return Err(AnglesError::NadirViewWithHighOrderActiveModes { npol, m_max });
        }

        // `CompressedGauss` has no documented compression rule in the
        // source this was distilled from; fall back to plain Gauss.
        let _ = scheme;

        let (mut nodes, mut weights) = gauss_legendre_half_range(n_streams);

        if !nodes.iter().any(|&m| (m - mu_obs).abs() < 1e-12) {
            nodes.push(mu_obs);
            weights.push(0.0);
        }

        // Sort descending (largest cosine, i.e. closest to nadir, first) so
        // the ordering is deterministic regardless of injection.
        let mut order: Vec<usize> = (0..nodes.len()).collect();
        order.sort_by(|&a, &b| nodes[b].partial_cmp(&nodes[a]).unwrap());
        let nodes: Vec<f64> = order.iter().map(|&i| nodes[i]).collect();
        let weights: Vec<f64> = order.iter().map(|&i| weights[i]).collect();

        let n = nodes.len();
        let viewing_index = nodes
            .iter()
            .position(|&m| (m - mu_obs).abs() < 1e-12)
            .expect("mu_obs was just inserted or already present");

        let mut mu = Vec::with_capacity(2 * n);
        let mut w = Vec::with_capacity(2 * n);
        mu.extend_from_slice(&nodes);
        w.extend_from_slice(&weights);
        mu.extend(nodes.iter().map(|m| -m));
        w.extend_from_slice(&weights);

        Ok(StreamGrid {
            mu: Array1::from(mu),
            weights: Array1::from(w),
            n,
            viewing_index,
        })
    }

    /// All `2n` signed stream cosines, upward block then downward block.
    pub fn mu(&self) -> &Array1<f64> {
        &self.mu
    }

    /// Quadrature weight for each entry of `mu()`.
    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    /// Number of streams per hemisphere.
    pub fn n_streams(&self) -> usize {
        self.n
    }

    /// Total stream count (`2 * n_streams`).
    pub fn total_streams(&self) -> usize {
        2 * self.n
    }

    /// Index into the upward block (and thus into `mu()`/`weights()`
    /// directly) of the injected viewing direction.
    pub fn viewing_index(&self) -> usize {
        self.viewing_index
    }

    /// The upward-hemisphere-only cosines (length `n_streams()`).
    pub fn upward_mu(&self) -> ndarray::ArrayView1<f64> {
        self.mu.slice(ndarray::s![..self.n])
    }
}

/// Gauss-Legendre nodes and weights for integration over `(0, 1]`
/// (equivalently, the positive half of `[-1, 1]`), via Newton's method on
/// the Legendre-polynomial recurrence (the standard `gauleg` algorithm).
fn gauss_legendre_half_range(n: usize) -> (Vec<f64>, Vec<f64>) {
    let (full_nodes, full_weights) = gauss_legendre_full_range(n);
    // Map [-1, 1] half range onto (0, 1], keep only positive nodes, and
    // rescale weights (which summed to 2 over [-1, 1]) to sum to 1 over
    // (0, 1].
    let mut nodes = Vec::with_capacity(n);
    let mut weights = Vec::with_capacity(n);
    for (&x, &w) in full_nodes.iter().zip(full_weights.iter()) {
        if x > 0.0 {
            nodes.push((x + 1.0) / 2.0);
            weights.push(w / 2.0);
        }
    }
    (nodes, weights)
}

/// Classic Gauss-Legendre node/weight computation on `[-1, 1]` for `2n`
/// points via Newton iteration on the Legendre polynomial `P_{2n}`.
fn gauss_legendre_full_range(n: usize) -> (Vec<f64>, Vec<f64>) {
    let m = 2 * n;
    let mut nodes = vec![0.0; m];
    let mut weights = vec![0.0; m];

    for i in 0..(m + 1) / 2 {
        // Initial guess (Chebyshev-like approximation to the i-th root).
        let mut x = ((PI_ * (i as f64 + 0.75)) / (m as f64 + 0.5)).cos();
        let mut dp = 0.0;
        for _ in 0..100 {
            let (p, d) = legendre_p_and_derivative(m, x);
            dp = d;
            let dx = p / d;
            x -= dx;
            if dx.abs() < 1e-15 {
                break;
            }
        }
        let w = 2.0 / ((1.0 - x * x) * dp * dp);
        nodes[i] = -x;
        nodes[m - 1 - i] = x;
        weights[i] = w;
        weights[m - 1 - i] = w;
    }

    (nodes, weights)
}

const PI_: f64 = std::f64::consts::PI;

/// Evaluate the Legendre polynomial `P_n(x)` and its derivative via the
/// standard three-term recurrence.
fn legendre_p_and_derivative(n: usize, x: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = x;
    if n == 0 {
        return (p0, 0.0);
    }
    for k in 2..=n {
        let k = k as f64;
        let p2 = ((2.0 * k - 1.0) * x * p1 - (k - 1.0) * p0) / k;
        p0 = p1;
        p1 = p2;
    }
    let n_f = n as f64;
    let dp = n_f * (x * p1 - p0) / (x * x - 1.0);
    (p1, dp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn weights_sum_to_one_per_hemisphere() {
        let grid = StreamGrid::new(16, 0.6, StreamScheme::Gauss, 2, 0).unwrap();
        let half: f64 = grid.weights().slice(ndarray::s![..grid.n_streams()]).sum();
        assert_relative_eq!(half, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn mu_is_symmetric_and_ordered_up_then_down() {
        let grid = StreamGrid::new(8, 0.5, StreamScheme::Gauss, 2, 0).unwrap();
        let n = grid.n_streams();
        for i in 0..n {
            assert_relative_eq!(grid.mu()[i], -grid.mu()[i + n], epsilon = 1e-12);
            assert!(grid.mu()[i] > 0.0);
            assert!(grid.mu()[i + n] < 0.0);
        }
    }

    #[test]
    fn viewing_direction_is_present() {
        let mu_obs = 0.733;
        let grid = StreamGrid::new(16, mu_obs, StreamScheme::Gauss, 2, 0).unwrap();
        assert_relative_eq!(grid.mu()[grid.viewing_index()], mu_obs, epsilon = 1e-12);
    }

    #[test]
    fn rejects_nadir_with_high_order_active_modes() {
        let err = StreamGrid::new(16, 1.0, StreamScheme::Gauss, 3, 2);
        assert!(matches!(
            err,
            Err(AnglesError::NadirViewWithHighOrderActiveModes { .. })
        ));
    }

    #[test]
    fn allows_nadir_for_passive() {
        assert!(StreamGrid::new(16, 1.0, StreamScheme::Gauss, 2, 0).is_ok());
    }
}
