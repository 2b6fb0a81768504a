//! regression::options — solver configuration.
//!
//! Purpose
//! -------
//! Hold the knobs of the truncated-SVD solver in one validated value that
//! every solve entry point accepts.
//!
//! Conventions
//! -----------
//! - `rtol` is relative to the largest singular value of the system being
//!   solved: singular values `σ < rtol · σ_max` are discarded.
use crate::convolution::errors::{KernelError, KernelResult};

/// Default relative singular-value cutoff, `sqrt(f64::EPSILON)`.
pub const DEFAULT_RTOL: f64 = 1.490_116_119_384_765_6e-8;

/// SolveOptions — configuration for the truncated-SVD solve.
///
/// Parameters
/// ----------
/// - `rtol`: `f64`
///   Relative cutoff in `[0, 1]`. `0` keeps every strictly positive singular
///   value; `1` keeps only those equal to the largest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveOptions {
    pub rtol: f64,
}

impl SolveOptions {
    /// Validated constructor.
    ///
    /// Errors
    /// ------
    /// - `KernelError::InvalidRtol` when `rtol` is non-finite or outside
    ///   `[0, 1]`.
    pub fn new(rtol: f64) -> KernelResult<Self> {
        if !rtol.is_finite() {
            return Err(KernelError::InvalidRtol { value: rtol, reason: "must be finite" });
        }
        if !(0.0..=1.0).contains(&rtol) {
            return Err(KernelError::InvalidRtol { value: rtol, reason: "must lie in [0, 1]" });
        }
        Ok(SolveOptions { rtol })
    }
}

impl Default for SolveOptions {
    fn default() -> Self {
        SolveOptions { rtol: DEFAULT_RTOL }
    }
}
