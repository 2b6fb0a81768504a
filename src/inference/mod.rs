//! inference — uncertainty quantification for fitted kernels.
//!
//! Purpose
//! -------
//! Attach classical OLS uncertainty to kernels estimated by `regression`:
//! per-coefficient standard errors from the residual variance and the Gram
//! matrix, and a one-shot fit that adds t-statistics and Student-t
//! confidence bounds.
//!
//! Key behaviors
//! -------------
//! - [`kernel_standard_errors`] computes `σ · sqrt(diag(C⁻¹))` for any
//!   kernel/Gram pair.
//! - [`residual_summary`] exposes `RSS`, `N` and `L` separately.
//! - [`fit_kernel`] runs assemble → solve → standard errors and returns a
//!   [`KernelFit`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Residual degrees of freedom are `N − L` with `L` the total coefficient
//!   count, pinned coefficients included.
//! - `N ≤ L` yields non-finite standard errors (logged at warn level), not
//!   an error; confidence bounds refuse to run in that case.
//!
//! Testing notes
//! -------------
//! - Unit tests use hand-computable cases (sample mean, orthogonal
//!   channels); coverage of the error bars under Gaussian noise is checked
//!   by repeated seeded trials in the integration tests.

pub mod fit;
pub mod standard_errors;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::fit::{KernelFit, fit_kernel};
pub use self::standard_errors::{ResidualSummary, kernel_standard_errors, residual_summary};

// ---- Optional convenience prelude for downstream crates ------------------

pub mod prelude {
    pub use super::fit::{KernelFit, fit_kernel};
    pub use super::standard_errors::kernel_standard_errors;
}
