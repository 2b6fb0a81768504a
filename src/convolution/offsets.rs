//! convolution::offsets — signed kernel support ranges.
//!
//! Purpose
//! -------
//! Represent the set of time offsets `τ` over which a kernel has support and
//! translate signed offsets into 0-based storage positions. This replaces
//! arrays with a non-standard base index: every kernel-shaped array in the
//! crate is an [`OffsetRange`] paired with ordinary 0-based storage.
//!
//! Key behaviors
//! -------------
//! - [`OffsetRange::new`] validates an inclusive range `first..=last`.
//! - [`OffsetRange::causal`] builds the causal support `-(nt-1)..=0` from a
//!   kernel length.
//! - [`OffsetRange::position`] / [`OffsetRange::offset_at`] map between
//!   offsets and storage rows.
//! - [`OffsetRange::valid_times`] returns the response times `t` for which a
//!   set of shifted indices `t + τ` all stay inside a series of length `T`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `first ≤ last`; the range is never empty.
//! - Negative `τ` reads past stimulus, positive `τ` reads future stimulus
//!   (acausal), `τ = 0` is instantaneous.
//!
//! Conventions
//! -----------
//! - Position of `τ` is `τ − first`, so storage row 0 always holds the most
//!   negative offset.
use crate::convolution::errors::{KernelError, KernelResult};
use std::ops::{Range, RangeInclusive};

/// OffsetRange — inclusive signed range of kernel offsets.
///
/// Fields
/// ------
/// - `first`: `isize`
///   Smallest offset in the support.
/// - `last`: `isize`
///   Largest offset in the support (`last ≥ first`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetRange {
    first: isize,
    last: isize,
}

impl OffsetRange {
    /// Construct a validated offset range `first..=last`.
    ///
    /// Errors
    /// ------
    /// - `KernelError::EmptyOffsetRange` when `first > last`.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use rust_convkernel::convolution::offsets::OffsetRange;
    /// let trange = OffsetRange::new(-2, 2).unwrap();
    /// assert_eq!(trange.len(), 5);
    /// assert_eq!(trange.position(0), Some(2));
    /// ```
    pub fn new(first: isize, last: isize) -> KernelResult<Self> {
        if first > last {
            return Err(KernelError::EmptyOffsetRange { first, last });
        }
        Ok(OffsetRange { first, last })
    }

    /// Causal support of length `nt`: offsets `-(nt-1)..=0`.
    ///
    /// Errors
    /// ------
    /// - `KernelError::ZeroKernelLength` when `nt == 0`.
    pub fn causal(nt: usize) -> KernelResult<Self> {
        if nt == 0 {
            return Err(KernelError::ZeroKernelLength);
        }
        Ok(OffsetRange { first: 1 - nt as isize, last: 0 })
    }

    pub fn first(&self) -> isize {
        self.first
    }

    pub fn last(&self) -> isize {
        self.last
    }

    /// Number of offsets in the support (`nt`).
    pub fn len(&self) -> usize {
        (self.last - self.first) as usize + 1
    }

    /// Always `false`; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, tau: isize) -> bool {
        tau >= self.first && tau <= self.last
    }

    /// Storage row of offset `tau`, or `None` outside the support.
    pub fn position(&self, tau: isize) -> Option<usize> {
        if self.contains(tau) { Some((tau - self.first) as usize) } else { None }
    }

    /// Offset stored at row `pos`. Callers guarantee `pos < len()`.
    pub fn offset_at(&self, pos: usize) -> isize {
        self.first + pos as isize
    }

    /// Iterate offsets from `first` to `last`.
    pub fn iter(&self) -> RangeInclusive<isize> {
        self.first..=self.last
    }

    /// Response times whose shifted indices `t + τ` stay inside `[0, n_times)`
    /// for every offset in `taus`.
    ///
    /// Returns an empty range when no such time exists. This is the edge
    /// truncation rule shared by the predictor and the assembler: samples
    /// beyond the recording are unobserved, never zero.
    pub fn valid_times(taus: &[isize], n_times: usize) -> Range<usize> {
        let n = n_times as isize;
        let lo = taus.iter().map(|&tau| -tau).fold(0, isize::max);
        let hi = taus.iter().map(|&tau| n - tau).fold(n, isize::min);
        if hi <= lo { 0..0 } else { lo as usize..hi as usize }
    }
}

impl std::fmt::Display for OffsetRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.first, self.last)
    }
}
