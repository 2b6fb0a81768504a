//! convolution::epochs — splice discontiguous recordings into one series.
//!
//! Purpose
//! -------
//! Concatenate several recording epochs (each a stimulus/response pair) into
//! a single stimulus/response array and mark as unobserved every response
//! sample whose kernel window would reach across an epoch boundary.
//!
//! Key behaviors
//! -------------
//! - [`Epoch::new`] validates one stimulus/response pair.
//! - [`splice_epochs`] stacks epochs in order and sets `r[t] = NaN` for every
//!   local time `t` of an epoch where some `t + τ, τ ∈ trange` falls outside
//!   that epoch.
//!
//! Invariants & assumptions
//! ------------------------
//! - All epochs share the same channel count.
//! - Masking depends only on the kernel support, never on the data, so the
//!   spliced series can be fed to the assembler or the solver over the same
//!   `trange` without any edge contamination between epochs.
//! - Responses that were already NaN stay NaN.
//!
//! Downstream usage
//! ----------------
//! - Build [`Epoch`] values from views of each recording, call
//!   [`splice_epochs`] with the support you intend to fit, then pass
//!   `spliced.stimulus.view()` / `spliced.response.view()` to
//!   `regression::solve` or `inference::fit`.
use crate::convolution::{
    errors::{KernelError, KernelResult},
    offsets::OffsetRange,
    validation::validate_signals,
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};

/// Epoch — one contiguous recording.
#[derive(Debug, Clone, Copy)]
pub struct Epoch<'a> {
    pub stimulus: ArrayView2<'a, f64>,
    pub response: ArrayView1<'a, f64>,
}

impl<'a> Epoch<'a> {
    /// Validate and wrap one stimulus/response pair.
    ///
    /// Errors
    /// ------
    /// - Any stimulus/response validation error (see
    ///   `convolution::validation::validate_signals`).
    pub fn new(
        stimulus: ArrayView2<'a, f64>, response: ArrayView1<'a, f64>,
    ) -> KernelResult<Self> {
        validate_signals(stimulus, response)?;
        Ok(Epoch { stimulus, response })
    }

    pub fn len(&self) -> usize {
        self.stimulus.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.stimulus.nrows() == 0
    }
}

/// SplicedSignals — concatenated epochs with boundary-contaminated samples
/// masked.
///
/// Fields
/// ------
/// - `stimulus`: `Array2<f64>`
///   Stacked stimuli, `Σ T_e × nstim`.
/// - `response`: `Array1<f64>`
///   Stacked responses with edge samples set to NaN.
/// - `epoch_starts`: `Vec<usize>`
///   Row at which each epoch begins in the spliced arrays.
/// - `n_masked`: `usize`
///   Number of samples this call newly marked as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct SplicedSignals {
    pub stimulus: Array2<f64>,
    pub response: Array1<f64>,
    pub epoch_starts: Vec<usize>,
    pub n_masked: usize,
}

/// splice_epochs — stack epochs and mask samples whose kernel window
/// crosses an epoch edge.
///
/// Errors
/// ------
/// - `KernelError::NoEpochs` for an empty slice.
/// - `KernelError::EpochChannelMismatch` when an epoch's channel count
///   differs from the first epoch's.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::{Array1, Array2};
/// # use rust_convkernel::convolution::epochs::{Epoch, splice_epochs};
/// # use rust_convkernel::convolution::offsets::OffsetRange;
/// let s = Array2::<f64>::ones((4, 1));
/// let r = Array1::<f64>::ones(4);
/// let epoch = Epoch::new(s.view(), r.view()).unwrap();
/// let spliced = splice_epochs(&[epoch, epoch], OffsetRange::causal(2).unwrap()).unwrap();
/// // The first sample of each epoch has no τ = -1 history.
/// assert!(spliced.response[0].is_nan() && spliced.response[4].is_nan());
/// assert_eq!(spliced.n_masked, 2);
/// ```
pub fn splice_epochs(epochs: &[Epoch<'_>], trange: OffsetRange) -> KernelResult<SplicedSignals> {
    let first = epochs.first().ok_or(KernelError::NoEpochs)?;
    let nstim = first.stimulus.ncols();
    for (epoch, e) in epochs.iter().enumerate() {
        if e.stimulus.ncols() != nstim {
            return Err(KernelError::EpochChannelMismatch {
                epoch,
                expected: nstim,
                found: e.stimulus.ncols(),
            });
        }
    }

    let total: usize = epochs.iter().map(Epoch::len).sum();
    let mut stimulus = Array2::<f64>::zeros((total, nstim));
    let mut response = Array1::<f64>::from_elem(total, f64::NAN);
    let mut epoch_starts = Vec::with_capacity(epochs.len());
    let mut n_masked = 0;
    let extremes = [trange.first(), trange.last()];

    let mut start = 0;
    for e in epochs {
        let len = e.len();
        epoch_starts.push(start);
        stimulus.slice_mut(s![start..start + len, ..]).assign(&e.stimulus);

        let usable = OffsetRange::valid_times(&extremes, len);
        for (t, &r) in e.response.iter().enumerate() {
            if usable.contains(&t) {
                response[start + t] = r;
            } else if !r.is_nan() {
                n_masked += 1;
            }
        }
        start += len;
    }

    log::debug!(
        "spliced {} epochs ({total} samples) over support {trange}; masked {n_masked} edge samples",
        epochs.len()
    );
    Ok(SplicedSignals { stimulus, response, epoch_starts, n_masked })
}
