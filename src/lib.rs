//! rust_convkernel — least-squares estimation of convolution kernels.
//!
//! Purpose
//! -------
//! Estimate the linear filter (kernel) that maps one or more stimulus time
//! series to a response time series, under the model
//!
//! ```text
//! r[t] = Σ_i Σ_{τ ∈ trange} S[t+τ, i] · k[τ, i] + noise,
//! ```
//!
//! where the support `trange` may include negative (past) and positive
//! (future, acausal) offsets. Coefficients can be pinned to zero, missing
//! response samples are marked with NaN, and rank-deficient designs are
//! handled by truncated-SVD solves.
//!
//! Key behaviors
//! -------------
//! - `convolution`: offset ranges, kernels, constraint masks, the forward
//!   predictor, epoch splicing, and the crate error type.
//! - `regression`: masked normal equations (Gram matrix and
//!   cross-correlation), the truncated-SVD primitive, and the constrained
//!   kernel solver.
//! - `inference`: standard errors, t-statistics and confidence bounds.
//!
//! Invariants & assumptions
//! ------------------------
//! - Arrays are `ndarray` types; stimuli are `T × nstim` with rows indexing
//!   time, responses have length `T`.
//! - Every fallible operation returns `KernelResult<T>`; shape and alignment
//!   problems are reported, never coerced.
//! - The library never installs a logger; diagnostics go through the `log`
//!   facade at debug/warn level.
//!
//! Conventions
//! -----------
//! - Time indices are 0-based. Kernel coefficients are flattened with the
//!   offset index fastest, then the channel.
//!
//! Downstream usage
//! ----------------
//! - Typical flow: optionally `convolution::splice_epochs`, then
//!   `regression::solve_for_kernel` (or `inference::fit_kernel` for error
//!   bars), then `convolution::predict_response` for fitted values.
//! - The `parallel` feature accumulates Gram-matrix cells on the rayon pool.
//!
//! Testing notes
//! -------------
//! - Each module carries unit tests; `tests/` holds end-to-end recovery,
//!   masking, constraint and noise-coverage checks.
pub mod convolution;
pub mod inference;
pub mod regression;
