//! inference::fit — one-shot kernel fit with uncertainty summaries.
//!
//! Purpose
//! -------
//! Run the full estimation pipeline once (assemble → constrained solve →
//! standard errors) and package the result together with the quantities a
//! caller needs to judge it: residual variance, sample and coefficient
//! counts, numerical rank, t-statistics, and Student-t confidence bounds.
//!
//! Key behaviors
//! -------------
//! - [`fit_kernel`] reuses the Gram matrix assembled for the solve when
//!   computing standard errors; nothing is assembled twice.
//! - [`KernelFit::confidence_bounds`] uses the `t_{N−L}` quantile from
//!   `statrs`, matching the degrees of freedom of the variance estimate.
//!
//! Invariants & assumptions
//! ------------------------
//! - Degrees of freedom are `N − L` with `L` the total coefficient count,
//!   consistent with `inference::standard_errors`.
//! - Bounds require `N > L` and `0 < level < 1`.
use crate::{
    convolution::{
        errors::{KernelError, KernelResult},
        kernel::Kernel,
        mask::ConstraintMask,
    },
    inference::standard_errors::standard_errors_with_summary,
    regression::{options::SolveOptions, solve::solve_for_kernel_constrained},
};
use ndarray::{ArrayView1, ArrayView2};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// KernelFit — fitted kernel with classical OLS uncertainty.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelFit {
    kernel: Kernel,
    standard_errors: Kernel,
    residual_variance: f64,
    n_observed: usize,
    n_coefficients: usize,
    n_free: usize,
    rank: usize,
}

impl KernelFit {
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn standard_errors(&self) -> &Kernel {
        &self.standard_errors
    }

    /// `σ² = RSS / (N − L)`.
    pub fn residual_variance(&self) -> f64 {
        self.residual_variance
    }

    /// Number of observed (non-NaN) response samples `N`.
    pub fn n_observed(&self) -> usize {
        self.n_observed
    }

    /// Total coefficient count `L`, pinned coefficients included.
    pub fn n_coefficients(&self) -> usize {
        self.n_coefficients
    }

    pub fn n_free(&self) -> usize {
        self.n_free
    }

    /// Rank retained by the truncated SVD of the solved system.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// `N − L`, or `None` when there are no residual degrees of freedom.
    pub fn degrees_of_freedom(&self) -> Option<usize> {
        self.n_observed.checked_sub(self.n_coefficients).filter(|&dof| dof > 0)
    }

    /// Coefficient-wise `k / SE(k)`.
    pub fn t_statistics(&self) -> Kernel {
        self.kernel.zip_map(&self.standard_errors, |k, se| k / se)
    }

    /// Two-sided Student-t confidence bounds `k ± q · SE(k)` with
    /// `q = t_{N−L}^{-1}((1 + level) / 2)`.
    ///
    /// Returns
    /// -------
    /// `KernelResult<(Kernel, Kernel)>`
    ///   `(lower, upper)` with the kernel's layout.
    ///
    /// Errors
    /// ------
    /// - `KernelError::InvalidConfidenceLevel` unless `0 < level < 1`.
    /// - `KernelError::InsufficientDegreesOfFreedom` when `N ≤ L`.
    /// - `KernelError::Distribution` if `statrs` rejects the parameters.
    pub fn confidence_bounds(&self, level: f64) -> KernelResult<(Kernel, Kernel)> {
        if !(level > 0.0 && level < 1.0) {
            return Err(KernelError::InvalidConfidenceLevel { level });
        }
        let dof = self.degrees_of_freedom().ok_or(KernelError::InsufficientDegreesOfFreedom {
            n_observed: self.n_observed,
            n_coefficients: self.n_coefficients,
        })?;
        let t = StudentsT::new(0.0, 1.0, dof as f64)
            .map_err(|e| KernelError::Distribution { text: e.to_string() })?;
        let q = t.inverse_cdf(0.5 + level / 2.0);

        let lower = self.kernel.zip_map(&self.standard_errors, |k, se| k - q * se);
        let upper = self.kernel.zip_map(&self.standard_errors, |k, se| k + q * se);
        Ok((lower, upper))
    }
}

/// fit_kernel — solve under `mask` and attach standard errors.
///
/// Parameters
/// ----------
/// - `stimulus`: `ArrayView2<f64>`
///   `T × nstim`, finite.
/// - `response`: `ArrayView1<f64>`
///   Length `T`; NaN samples are excluded.
/// - `mask`: `&ConstraintMask`
///   Support and pinned coefficients; use `ConstraintMask::all_free` for an
///   unconstrained fit.
/// - `opts`: `&SolveOptions`
///
/// Errors
/// ------
/// - Every error of `regression::solve::solve_for_kernel_constrained`.
/// - `KernelError::SingularGram` when the Gram matrix is exactly singular
///   and `N > L` (the kernel itself would still be solvable; standard errors
///   are not). With `N ≤ L` the standard errors are NaN instead.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::Array1;
/// # use rust_convkernel::convolution::{mask::ConstraintMask, offsets::OffsetRange};
/// # use rust_convkernel::convolution::signals::as_single_channel;
/// # use rust_convkernel::inference::fit::fit_kernel;
/// # use rust_convkernel::regression::options::SolveOptions;
/// let s = Array1::from_shape_fn(50, |t| (0.9 * t as f64).sin());
/// let r = Array1::from_shape_fn(50, |t| 2.0 * s[t] + 0.01 * (3.7 * t as f64).cos());
/// let mask = ConstraintMask::all_free(OffsetRange::new(0, 0).unwrap(), 1).unwrap();
/// let fit = fit_kernel(as_single_channel(s.view()), r.view(), &mask, &SolveOptions::default())
///     .unwrap();
/// let (lower, upper) = fit.confidence_bounds(0.95).unwrap();
/// assert!(lower.get(0, 0).unwrap() < 2.0 + 0.01 && upper.get(0, 0).unwrap() > 2.0 - 0.01);
/// assert_eq!(fit.degrees_of_freedom(), Some(49));
/// ```
pub fn fit_kernel(
    stimulus: ArrayView2<'_, f64>, response: ArrayView1<'_, f64>, mask: &ConstraintMask,
    opts: &SolveOptions,
) -> KernelResult<KernelFit> {
    let solution = solve_for_kernel_constrained(stimulus, response, mask, opts)?;
    let (standard_errors, summary) = standard_errors_with_summary(
        stimulus,
        response,
        &solution.kernel,
        solution.normal_equations.gram.view(),
    )?;

    Ok(KernelFit {
        residual_variance: summary.variance(),
        n_observed: summary.n_observed,
        n_coefficients: summary.n_coefficients,
        n_free: mask.n_free(),
        rank: solution.rank,
        kernel: solution.kernel,
        standard_errors,
    })
}
