//! inference::standard_errors — classical OLS standard errors for kernel
//! coefficients.
//!
//! Purpose
//! -------
//! Estimate per-coefficient standard errors of a fitted kernel from the
//! residual variance and the Gram matrix of the normal equations:
//!
//! ```text
//! r̂     = predict(S, k)
//! RSS   = Σ_{t: r[t] observed} (r[t] − r̂[t])²
//! σ²    = RSS / (N − L)
//! SE(k) = σ · sqrt(diag(C⁻¹))
//! ```
//!
//! with `N` the number of observed samples and `L = nt · nstim`.
//!
//! Key behaviors
//! -------------
//! - [`kernel_standard_errors`] returns the standard errors laid out as a
//!   [`Kernel`] over the same support and channels as the fit.
//! - [`residual_summary`] exposes `RSS`, `N` and `L` on their own.
//!
//! Invariants & assumptions
//! ------------------------
//! - `C` must be `L × L` for the supplied kernel.
//! - `L` counts every coefficient, pinned ones included. For constrained
//!   fits this overstates the residual degrees of freedom.
//! - `N ≤ L` is not an error: the variance estimate, and with it every
//!   standard error, comes out non-finite. A warning is logged. For `N < L`
//!   the Gram matrix is necessarily singular; the result is then all NaN.
//! - With `N > L`, `C` must be invertible. Unlike the solver, no truncation
//!   is applied here; an exactly singular `C` is reported as `SingularGram`.
//!
//! Conventions
//! -----------
//! - Only the diagonal of the coefficient covariance is reported.
//! - `ndarray` ↔ `nalgebra` conversion reuses `regression::pinv::to_dmatrix`.
use crate::{
    convolution::{
        errors::{KernelError, KernelResult},
        kernel::Kernel,
        predict::predict_response,
        signals::count_observed,
        validation::validate_signals,
    },
    regression::pinv::to_dmatrix,
};
use ndarray::{Array1, ArrayView1, ArrayView2, Zip};

/// ResidualSummary — residual sum of squares and sample counts of a fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualSummary {
    pub rss: f64,
    pub n_observed: usize,
    pub n_coefficients: usize,
}

impl ResidualSummary {
    /// `RSS / (N − L)`; non-finite or negative when `N ≤ L`.
    pub fn variance(&self) -> f64 {
        self.rss / (self.n_observed as f64 - self.n_coefficients as f64)
    }
}

/// residual_summary — RSS of `kernel` on `(stimulus, response)` over the
/// observed samples.
///
/// Errors
/// ------
/// - Signal validation errors and `KernelError::ChannelMismatch` from the
///   predictor.
pub fn residual_summary(
    stimulus: ArrayView2<'_, f64>, response: ArrayView1<'_, f64>, kernel: &Kernel,
) -> KernelResult<ResidualSummary> {
    validate_signals(stimulus, response)?;
    let predicted = predict_response(stimulus, kernel)?;
    let rss = Zip::from(&response).and(&predicted).fold(0.0, |acc, &r, &p| {
        if r.is_nan() { acc } else { acc + (r - p) * (r - p) }
    });
    Ok(ResidualSummary { rss, n_observed: count_observed(response), n_coefficients: kernel.len() })
}

/// kernel_standard_errors — `σ · sqrt(diag(C⁻¹))` laid out as a kernel.
///
/// Parameters
/// ----------
/// - `stimulus`: `ArrayView2<f64>`
///   `T × nstim` stimulus the kernel was fitted on.
/// - `response`: `ArrayView1<f64>`
///   Length-`T` response; NaN samples are excluded from `RSS` and `N`.
/// - `kernel`: `&Kernel`
///   Fitted kernel.
/// - `gram`: `ArrayView2<f64>`
///   `L × L` Gram matrix the kernel was solved from.
///
/// Returns
/// -------
/// `KernelResult<Kernel>`
///   Standard errors with the kernel's support and channel layout.
///
/// Errors
/// ------
/// - `KernelError::GramDimMismatch` when `gram` is not `L × L`.
/// - `KernelError::SingularGram` when `gram` cannot be inverted and
///   `N > L`. With `N ≤ L` a singular `gram` yields all-NaN errors instead.
/// - Signal validation and channel errors as in [`residual_summary`].
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_convkernel::convolution::{kernel::Kernel, offsets::OffsetRange};
/// # use rust_convkernel::inference::standard_errors::kernel_standard_errors;
/// // Sample mean as a one-coefficient kernel: SE = sqrt(σ² / N).
/// let s = array![[1.0], [1.0], [1.0], [1.0]];
/// let r = array![1.0, 3.0, 1.0, 3.0];
/// let k = Kernel::new(OffsetRange::new(0, 0).unwrap(), array![[2.0]]).unwrap();
/// let se = kernel_standard_errors(s.view(), r.view(), &k, array![[4.0]].view()).unwrap();
/// assert!((se.get(0, 0).unwrap() - (1.0f64 / 3.0).sqrt()).abs() < 1e-12);
/// ```
pub fn kernel_standard_errors(
    stimulus: ArrayView2<'_, f64>, response: ArrayView1<'_, f64>, kernel: &Kernel,
    gram: ArrayView2<'_, f64>,
) -> KernelResult<Kernel> {
    standard_errors_with_summary(stimulus, response, kernel, gram).map(|(se, _)| se)
}

/// Standard errors together with the residual summary they were built from.
pub(crate) fn standard_errors_with_summary(
    stimulus: ArrayView2<'_, f64>, response: ArrayView1<'_, f64>, kernel: &Kernel,
    gram: ArrayView2<'_, f64>,
) -> KernelResult<(Kernel, ResidualSummary)> {
    let l = kernel.len();
    if gram.dim() != (l, l) {
        return Err(KernelError::GramDimMismatch { expected: l, found: gram.dim() });
    }

    let summary = residual_summary(stimulus, response, kernel)?;
    if summary.n_observed <= l {
        log::warn!(
            "standard errors undefined: {} observed samples for {l} coefficients",
            summary.n_observed
        );
    }

    let inverse_diag = match inverse_diagonal(gram) {
        Ok(diag) => diag,
        Err(KernelError::SingularGram { .. }) if summary.n_observed <= l => {
            Array1::from_elem(l, f64::NAN)
        }
        Err(e) => return Err(e),
    };
    let sigma = summary.variance().sqrt();
    let se = inverse_diag.mapv(|v| sigma * v.sqrt());
    let se = Kernel::from_flat(kernel.trange(), kernel.nstim(), se.view())?;
    Ok((se, summary))
}

// ---- Helper methods ----

/// Diagonal of `C⁻¹` via a full `nalgebra` inverse.
fn inverse_diagonal(gram: ArrayView2<'_, f64>) -> KernelResult<Array1<f64>> {
    let dim = gram.nrows();
    let inverse = to_dmatrix(gram).try_inverse().ok_or(KernelError::SingularGram { dim })?;
    Ok(Array1::from_iter(inverse.diagonal().iter().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{convolution::offsets::OffsetRange, regression::gram::compute_normal_equations};
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Hand-computable standard errors (sample mean, independent
    //   regressors) including NaN-masked samples.
    // - Non-finite output when N ≤ L.
    // - Gram dimension and singularity errors.
    //
    // They intentionally DO NOT cover:
    // - Coverage of the error bars under noise; see the integration tests.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify the sample-mean case and that NaN samples are excluded from
    // both RSS and N.
    //
    // Given
    // -----
    // - S = ones(5), r = [1, 3, 1, 3, NaN], k = [2], C = [[4]].
    //
    // Expect
    // ------
    // - RSS = 4, N = 4, σ² = 4/3, SE = sqrt(4/3 · 1/4) = sqrt(1/3).
    fn kernel_standard_errors_matches_sample_mean_formula_with_masked_sample() {
        // Arrange
        let s = Array2::<f64>::ones((5, 1));
        let r = array![1.0, 3.0, 1.0, 3.0, f64::NAN];
        let k = Kernel::new(OffsetRange::new(0, 0).unwrap(), array![[2.0]]).unwrap();

        // Act
        let summary = residual_summary(s.view(), r.view(), &k).unwrap();
        let se = kernel_standard_errors(s.view(), r.view(), &k, array![[4.0]].view()).unwrap();

        // Assert
        assert_abs_diff_eq!(summary.rss, 4.0, epsilon = 1e-12);
        assert_eq!(summary.n_observed, 4);
        assert_eq!(summary.n_coefficients, 1);
        assert_abs_diff_eq!(summary.variance(), 4.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(se.get(0, 0).unwrap(), (1.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Check the layout of the returned standard errors for a diagonal
    // two-channel Gram matrix.
    //
    // Given
    // -----
    // - Two orthogonal channels, k = 0 so RSS = Σ r², C = diag(2, 8).
    //
    // Expect
    // ------
    // - SE[ch] = σ / sqrt(C[ch, ch]) in the kernel's channel order.
    fn kernel_standard_errors_follow_gram_diagonal_per_channel() {
        // Arrange
        let s = array![[1.0, 0.0], [1.0, 0.0], [0.0, 2.0], [0.0, 2.0]];
        let r = array![1.0, -1.0, 1.0, -1.0];
        let k = Kernel::zeros(OffsetRange::new(0, 0).unwrap(), 2).unwrap();
        let gram = s.t().dot(&s);

        // Act
        let se = kernel_standard_errors(s.view(), r.view(), &k, gram.view()).unwrap();

        // Assert
        let sigma = (4.0f64 / 2.0).sqrt();
        assert_abs_diff_eq!(se.get(0, 0).unwrap(), sigma / 2.0f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(se.get(0, 1).unwrap(), sigma / 8.0f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Ensure N ≤ L produces non-finite standard errors instead of an error.
    //
    // Given
    // -----
    // - One observed sample, one coefficient, perfect fit (RSS = 0).
    //
    // Expect
    // ------
    // - `Ok` with a non-finite standard error.
    fn kernel_standard_errors_are_non_finite_without_residual_dof() {
        let s = array![[1.0]];
        let r = array![2.0];
        let k = Kernel::new(OffsetRange::new(0, 0).unwrap(), array![[2.0]]).unwrap();
        let se = kernel_standard_errors(s.view(), r.view(), &k, array![[1.0]].view()).unwrap();
        assert!(!se.get(0, 0).unwrap().is_finite());
    }

    #[test]
    // Purpose
    // -------
    // Ensure fewer observations than coefficients yields non-finite
    // standard errors even though the assembled Gram matrix is singular.
    //
    // Given
    // -----
    // - 4×1 stimulus, r = [1, NaN, 2, NaN] (N = 2), causal support of
    //   length 3 (L = 3), C assembled from the data.
    //
    // Expect
    // ------
    // - `Ok` with every standard error non-finite.
    fn kernel_standard_errors_are_non_finite_with_fewer_samples_than_coefficients() {
        // Arrange
        let s = array![[1.0], [2.0], [-1.0], [0.5]];
        let r = array![1.0, f64::NAN, 2.0, f64::NAN];
        let trange = OffsetRange::causal(3).unwrap();
        let ne = compute_normal_equations(s.view(), r.view(), trange).unwrap();
        let k = Kernel::new(trange, array![[0.1], [0.2], [0.3]]).unwrap();

        // Act
        let se = kernel_standard_errors(s.view(), r.view(), &k, ne.gram.view()).unwrap();

        // Assert
        assert_eq!(se.len(), 3);
        assert!(se.values().iter().all(|v| !v.is_finite()));
    }

    #[test]
    fn kernel_standard_errors_rejects_wrong_gram_size() {
        let s = Array2::<f64>::ones((6, 1));
        let r = Array1::<f64>::ones(6);
        let k = Kernel::zeros(OffsetRange::causal(2).unwrap(), 1).unwrap();
        assert_eq!(
            kernel_standard_errors(s.view(), r.view(), &k, Array2::<f64>::eye(3).view()),
            Err(KernelError::GramDimMismatch { expected: 2, found: (3, 3) })
        );
    }

    #[test]
    // Purpose
    // -------
    // Ensure an exactly singular Gram matrix is reported rather than
    // producing infinities when there are residual degrees of freedom.
    //
    // Given
    // -----
    // - C = [[1, 1], [1, 1]] for a two-coefficient kernel, N = 6.
    //
    // Expect
    // ------
    // - `SingularGram { dim: 2 }`.
    fn kernel_standard_errors_reports_singular_gram() {
        let s = Array2::<f64>::ones((6, 1));
        let r = Array1::<f64>::ones(6);
        let k = Kernel::zeros(OffsetRange::causal(2).unwrap(), 1).unwrap();
        assert_eq!(
            kernel_standard_errors(s.view(), r.view(), &k, array![[1.0, 1.0], [1.0, 1.0]].view()),
            Err(KernelError::SingularGram { dim: 2 })
        );
    }
}
