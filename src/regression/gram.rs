//! regression::gram — normal equations for time-domain kernel regression.
//!
//! Purpose
//! -------
//! Assemble the weighted Gram matrix `C` and cross-correlation vector `d` of
//! the least-squares problem
//!
//! ```text
//! r[t] ≈ Σ_i Σ_{τ ∈ trange} S[t+τ, i] · k[τ, i],
//! ```
//!
//! with rows excluded wherever the response is unobserved (NaN). In flat
//! coordinates `j = (τ, i)`:
//!
//! ```text
//! C[j1, j2] = Σ_t w[t] · S[t+τ1, i1] · S[t+τ2, i2],
//! d[j]      = Σ_t w[t] · r[t]  · S[t+τ,  i],
//! ```
//!
//! where `w[t] = 0` for NaN responses and `1` otherwise, and every sum runs
//! only over `t` whose shifted indices stay inside the recording.
//!
//! Key behaviors
//! -------------
//! - [`compute_normal_equations`] takes an explicit (possibly acausal)
//!   [`OffsetRange`]; [`compute_normal_equations_causal`] takes a kernel
//!   length `nt` and uses `-(nt-1)..=0`.
//! - Only the upper triangle `j1 ≤ j2` (channel `i1 ≤ i2`, all offset pairs)
//!   is accumulated; [`mirror_upper_triangle`] copies it into the lower
//!   triangle so `C` is exactly symmetric.
//! - With the `parallel` feature, upper-triangle cells are accumulated on the
//!   rayon pool. Each cell writes one disjoint entry, so no locking is needed.
//!
//! Invariants & assumptions
//! ------------------------
//! - Stimulus and response are aligned (`S.nrows() == r.len()`); this is
//!   checked, never coerced.
//! - Edge truncation matches `convolution::predict::predict_response`, so the
//!   normal equations are exactly those of the model the predictor evaluates.
//! - NaN responses never leak into `d`: they are zero-filled and weighted by 0.
//!
//! Conventions
//! -----------
//! - Flat index `j = channel · nt + position(τ)` (see
//!   `convolution::kernel::flat_index`).
//!
//! Performance
//! -----------
//! - O(nstim² · nt² · T) for `C`, O(nstim · nt · T) for `d`; the inner time
//!   sums are contiguous `Zip` folds over strided column views.
use crate::convolution::{
    errors::KernelResult,
    offsets::OffsetRange,
    predict::shifted,
    signals::{count_observed, observation_weights, zero_filled},
    validation::validate_signals,
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip, s};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// NormalEquations — assembled least-squares system `C k = d`.
///
/// Fields
/// ------
/// - `gram`: `Array2<f64>`
///   Exactly symmetric `L × L` Gram matrix, `L = nt · nstim`.
/// - `cross`: `Array1<f64>`
///   Length-`L` cross-correlation vector.
/// - `trange`: [`OffsetRange`]
///   Kernel support the system was assembled over.
/// - `nstim`: `usize`
///   Number of stimulus channels.
/// - `n_observed`: `usize`
///   Number of non-NaN response samples.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalEquations {
    pub gram: Array2<f64>,
    pub cross: Array1<f64>,
    pub trange: OffsetRange,
    pub nstim: usize,
    pub n_observed: usize,
}

impl NormalEquations {
    /// Number of kernel coefficients `L`.
    pub fn len(&self) -> usize {
        self.cross.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cross.is_empty()
    }
}

/// compute_normal_equations — assemble `(C, d)` over an explicit support.
///
/// Parameters
/// ----------
/// - `stimulus`: `ArrayView2<f64>`
///   `T × nstim`, finite.
/// - `response`: `ArrayView1<f64>`
///   Length `T`; NaN marks samples to exclude.
/// - `trange`: [`OffsetRange`]
///   Kernel support; may contain negative and positive offsets.
///
/// Returns
/// -------
/// `KernelResult<NormalEquations>`
///
/// Errors
/// ------
/// - `KernelError::TimeAxisMismatch` when `stimulus.nrows() != response.len()`.
/// - Stimulus/response validation errors (`EmptyStimulus`, `NoChannels`,
///   `NonFiniteStimulus`, `NonFiniteResponse`).
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_convkernel::convolution::{offsets::OffsetRange, signals::as_single_channel};
/// # use rust_convkernel::regression::gram::compute_normal_equations;
/// let s = array![1.0, 2.0, 3.0];
/// let r = array![2.0, f64::NAN, 6.0];
/// let ne = compute_normal_equations(
///     as_single_channel(s.view()), r.view(), OffsetRange::new(0, 0).unwrap(),
/// ).unwrap();
/// // Only t = 0 and t = 2 are observed: C = 1 + 9, d = 2 + 18.
/// assert_eq!(ne.gram[(0, 0)], 10.0);
/// assert_eq!(ne.cross[0], 20.0);
/// ```
pub fn compute_normal_equations(
    stimulus: ArrayView2<'_, f64>, response: ArrayView1<'_, f64>, trange: OffsetRange,
) -> KernelResult<NormalEquations> {
    validate_signals(stimulus, response)?;

    let weights = observation_weights(response);
    let filled = zero_filled(response);
    let design = ShiftedDesign { stimulus, trange };
    let nstim = stimulus.ncols();
    let l = trange.len() * nstim;

    let cells = upper_triangle_cells(l);
    let values = accumulate_gram_cells(&design, weights.view(), &cells);
    let mut gram = Array2::<f64>::zeros((l, l));
    for (&(j1, j2), value) in cells.iter().zip(values) {
        gram[(j1, j2)] = value;
    }
    mirror_upper_triangle(&mut gram);

    let weighted_response = &filled * &weights;
    let cross = Array1::from_shape_fn(l, |j| design.cross_cell(weighted_response.view(), j));

    let n_observed = count_observed(response);
    log::debug!(
        "assembled {l}x{l} normal equations over {trange} ({} of {} samples masked)",
        response.len() - n_observed,
        response.len()
    );
    Ok(NormalEquations { gram, cross, trange, nstim, n_observed })
}

/// compute_normal_equations_causal — assemble `(C, d)` for a causal kernel
/// of length `nt`, i.e. support `-(nt-1)..=0`.
///
/// Errors
/// ------
/// - `KernelError::ZeroKernelLength` when `nt == 0`, plus every error of
///   [`compute_normal_equations`].
pub fn compute_normal_equations_causal(
    stimulus: ArrayView2<'_, f64>, response: ArrayView1<'_, f64>, nt: usize,
) -> KernelResult<NormalEquations> {
    compute_normal_equations(stimulus, response, OffsetRange::causal(nt)?)
}

/// Copy the strict upper triangle of a square matrix into its lower
/// triangle, making it exactly symmetric.
pub fn mirror_upper_triangle(matrix: &mut Array2<f64>) {
    let n = matrix.nrows();
    for j1 in 0..n {
        for j2 in (j1 + 1)..n {
            matrix[(j2, j1)] = matrix[(j1, j2)];
        }
    }
}

// ---- Helper methods ----

/// Stimulus together with the kernel support, addressed by flat index.
struct ShiftedDesign<'a> {
    stimulus: ArrayView2<'a, f64>,
    trange: OffsetRange,
}

impl ShiftedDesign<'_> {
    /// `(τ, channel)` of flat index `j`.
    #[inline]
    fn coordinates(&self, j: usize) -> (isize, usize) {
        let nt = self.trange.len();
        (self.trange.offset_at(j % nt), j / nt)
    }

    /// Column `channel` of the stimulus restricted to `t + τ` for `t` in
    /// `window`. `window` must be non-empty and valid for `τ`.
    #[inline]
    fn shifted_column(
        &self, window: &std::ops::Range<usize>, tau: isize, channel: usize,
    ) -> ArrayView1<'_, f64> {
        self.stimulus.slice(s![shifted(window.start, tau)..shifted(window.end, tau), channel])
    }

    /// `C[j1, j2] = Σ_t w[t] S[t+τ1, i1] S[t+τ2, i2]` over the joint window.
    fn gram_cell(&self, weights: ArrayView1<'_, f64>, j1: usize, j2: usize) -> f64 {
        let (tau1, i1) = self.coordinates(j1);
        let (tau2, i2) = self.coordinates(j2);
        let window = OffsetRange::valid_times(&[tau1, tau2], self.stimulus.nrows());
        if window.is_empty() {
            return 0.0;
        }
        let a = self.shifted_column(&window, tau1, i1);
        let b = self.shifted_column(&window, tau2, i2);
        Zip::from(weights.slice(s![window.clone()]))
            .and(&a)
            .and(&b)
            .fold(0.0, |acc, &w, &x, &y| acc + w * x * y)
    }

    /// `d[j] = Σ_t (w[t] r[t]) S[t+τ, i]` over the window of `τ`.
    fn cross_cell(&self, weighted_response: ArrayView1<'_, f64>, j: usize) -> f64 {
        let (tau, i) = self.coordinates(j);
        let window = OffsetRange::valid_times(&[tau], self.stimulus.nrows());
        if window.is_empty() {
            return 0.0;
        }
        let column = self.shifted_column(&window, tau, i);
        weighted_response.slice(s![window.clone()]).dot(&column)
    }
}

/// Flat index pairs `(j1, j2)` with `j1 ≤ j2`, i.e. channel `i1 ≤ i2` and
/// every offset pair within equal channels' upper triangle.
fn upper_triangle_cells(l: usize) -> Vec<(usize, usize)> {
    let mut cells = Vec::with_capacity(l * (l + 1) / 2);
    for j1 in 0..l {
        for j2 in j1..l {
            cells.push((j1, j2));
        }
    }
    cells
}

#[cfg(feature = "parallel")]
fn accumulate_gram_cells(
    design: &ShiftedDesign<'_>, weights: ArrayView1<'_, f64>, cells: &[(usize, usize)],
) -> Vec<f64> {
    cells.par_iter().map(|&(j1, j2)| design.gram_cell(weights, j1, j2)).collect()
}

#[cfg(not(feature = "parallel"))]
fn accumulate_gram_cells(
    design: &ShiftedDesign<'_>, weights: ArrayView1<'_, f64>, cells: &[(usize, usize)],
) -> Vec<f64> {
    cells.iter().map(|&(j1, j2)| design.gram_cell(weights, j1, j2)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convolution::{errors::KernelError, kernel::flat_index};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Agreement of `(C, d)` with an explicit design matrix `X` built with
    //   edge truncation: `C = Xᵀ W X`, `d = Xᵀ W r`.
    // - Exact symmetry of `C`.
    // - NaN masking (no NaN leaks into `d`, masked rows drop out of `C`).
    // - Causal convenience wrapper and alignment validation.
    //
    // They intentionally DO NOT cover:
    // - Solving the system; see `regression::solve`.
    // -------------------------------------------------------------------------

    /// Explicit `T × L` design matrix with out-of-range stimulus omitted.
    fn design_matrix(stimulus: &Array2<f64>, trange: OffsetRange) -> Array2<f64> {
        let (n, nstim) = stimulus.dim();
        let nt = trange.len();
        let mut x = Array2::<f64>::zeros((n, nt * nstim));
        for t in 0..n {
            for (p, tau) in trange.iter().enumerate() {
                let src = t as isize + tau;
                if src < 0 || src >= n as isize {
                    continue;
                }
                for i in 0..nstim {
                    x[(t, flat_index(nt, p, i))] = stimulus[(src as usize, i)];
                }
            }
        }
        x
    }

    fn test_stimulus() -> Array2<f64> {
        Array2::from_shape_fn((12, 2), |(t, i)| ((t * 7 + i * 3) % 5) as f64 - 1.5 + 0.1 * t as f64)
    }

    #[test]
    // Purpose
    // -------
    // Verify `(C, d)` against the explicit weighted design-matrix products
    // on an acausal, two-channel support with masked samples.
    //
    // Given
    // -----
    // - A 12×2 stimulus, support -2:1, and a response with NaN at t = 3, 8.
    //
    // Expect
    // ------
    // - `C ≈ Xᵀ W X` and `d ≈ Xᵀ W r₀` (r₀ = zero-filled r) to 1e-12.
    fn compute_normal_equations_matches_weighted_design_products() {
        // Arrange
        let stimulus = test_stimulus();
        let trange = OffsetRange::new(-2, 1).unwrap();
        let mut response = Array1::from_shape_fn(12, |t| (t as f64).sin());
        response[3] = f64::NAN;
        response[8] = f64::NAN;

        let x = design_matrix(&stimulus, trange);
        let w = observation_weights(response.view());
        let r0 = zero_filled(response.view());
        let wx = &x * &w.view().insert_axis(ndarray::Axis(1));
        let expected_c = wx.t().dot(&x);
        let expected_d = x.t().dot(&(&r0 * &w));

        // Act
        let ne = compute_normal_equations(stimulus.view(), response.view(), trange).unwrap();

        // Assert
        assert_eq!(ne.len(), 8);
        assert_eq!(ne.n_observed, 10);
        for (a, b) in ne.gram.iter().zip(expected_c.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
        for (a, b) in ne.cross.iter().zip(expected_d.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure the Gram matrix is exactly (bitwise) symmetric.
    //
    // Given
    // -----
    // - A 12×2 stimulus and causal support of length 3.
    //
    // Expect
    // ------
    // - `C[j1, j2] == C[j2, j1]` for all pairs, with no tolerance.
    fn compute_normal_equations_gram_is_exactly_symmetric() {
        // Arrange
        let stimulus = test_stimulus();
        let response = Array1::from_shape_fn(12, |t| t as f64);

        // Act
        let ne = compute_normal_equations_causal(stimulus.view(), response.view(), 3).unwrap();

        // Assert
        assert_eq!(ne.gram, ne.gram.t());
        assert_eq!(ne.trange, OffsetRange::causal(3).unwrap());
    }

    #[test]
    // Purpose
    // -------
    // Check that an all-NaN response yields an all-zero system rather than
    // NaN entries.
    //
    // Given
    // -----
    // - A 12×2 stimulus and an all-NaN response.
    //
    // Expect
    // ------
    // - `C` and `d` are identically zero and finite; `n_observed = 0`.
    fn compute_normal_equations_all_nan_response_gives_zero_system() {
        let stimulus = test_stimulus();
        let response = Array1::from_elem(12, f64::NAN);
        let ne = compute_normal_equations_causal(stimulus.view(), response.view(), 2).unwrap();
        assert!(ne.gram.iter().all(|&v| v == 0.0));
        assert!(ne.cross.iter().all(|&v| v == 0.0));
        assert_eq!(ne.n_observed, 0);
    }

    #[test]
    // Purpose
    // -------
    // Ensure misaligned time axes are reported immediately.
    //
    // Given
    // -----
    // - A 12-sample stimulus and an 11-sample response.
    //
    // Expect
    // ------
    // - `TimeAxisMismatch { stimulus_len: 12, response_len: 11 }`.
    fn compute_normal_equations_rejects_misaligned_time_axes() {
        let stimulus = test_stimulus();
        let response = Array1::<f64>::zeros(11);
        assert_eq!(
            compute_normal_equations_causal(stimulus.view(), response.view(), 2),
            Err(KernelError::TimeAxisMismatch { stimulus_len: 12, response_len: 11 })
        );
    }

    #[test]
    fn mirror_upper_triangle_copies_strict_upper_part() {
        let mut m = array![[1.0, 2.0, 3.0], [0.0, 4.0, 5.0], [0.0, 0.0, 6.0]];
        mirror_upper_triangle(&mut m);
        assert_eq!(m, array![[1.0, 2.0, 3.0], [2.0, 4.0, 5.0], [3.0, 5.0, 6.0]]);
    }

    #[test]
    fn upper_triangle_cells_enumerates_each_pair_once() {
        let cells = upper_triangle_cells(3);
        assert_eq!(cells, vec![(0, 0), (0, 1), (0, 2), (1, 1), (1, 2), (2, 2)]);
    }
}
