//! regression — normal equations and constrained least-squares solves.
//!
//! Purpose
//! -------
//! Turn a stimulus/response pair into the least-squares normal equations of
//! the convolution model and solve them, with optional pinned-zero
//! constraints, through a truncated SVD.
//!
//! Key behaviors
//! -------------
//! - [`compute_normal_equations`] assembles the masked Gram matrix `C` and
//!   cross-correlation `d` (`parallel` feature: cells on the rayon pool).
//! - [`solve_for_kernel`], [`solve_for_kernel_causal`] and
//!   [`solve_for_kernel_constrained`] return a [`KernelSolution`] carrying
//!   the kernel, the system it came from and the retained rank.
//! - [`solve_truncated_svd`] is the shared minimum-norm primitive.
//! - [`SolveOptions`] configures the relative singular-value cutoff.
//!
//! Testing notes
//! -------------
//! - `gram` is checked against explicit design-matrix products; `solve`
//!   checks exact recovery on noise-free data and the collinear/pinned
//!   cases; `pinv` checks truncation behavior directly.

pub mod gram;
pub mod options;
pub mod pinv;
pub mod solve;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::gram::{
    NormalEquations, compute_normal_equations, compute_normal_equations_causal,
};
pub use self::options::{DEFAULT_RTOL, SolveOptions};
pub use self::pinv::{TruncatedSvdSolution, solve_truncated_svd};
pub use self::solve::{
    KernelSolution, solve_for_kernel, solve_for_kernel_causal, solve_for_kernel_constrained,
    solve_normal_equations,
};

// ---- Optional convenience prelude for downstream crates ------------------

pub mod prelude {
    pub use super::gram::{NormalEquations, compute_normal_equations};
    pub use super::options::SolveOptions;
    pub use super::solve::{
        KernelSolution, solve_for_kernel, solve_for_kernel_causal, solve_for_kernel_constrained,
    };
}
