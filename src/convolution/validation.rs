//! convolution::validation — shared input guards for stimulus and response.
//!
//! Purpose
//! -------
//! Centralize the shape and finiteness checks that every public entry point
//! performs before touching the data, so the predictor, the assembler, the
//! epoch splicer and the standard-error layer agree on what "well-formed"
//! means.
//!
//! Invariants & assumptions
//! ------------------------
//! - Stimulus: at least one time sample, at least one channel, all entries
//!   finite.
//! - Response: NaN is allowed (unobserved sample); ±∞ is not.
//! - Stimulus rows and response entries are aligned one-to-one; lengths must
//!   match exactly.
//!
//! Conventions
//! -----------
//! - The first offending element (row-major scan) is reported.
//! - Validation never allocates beyond error construction.
use crate::convolution::errors::{KernelError, KernelResult};
use ndarray::{ArrayView1, ArrayView2};

/// Validate a `T × nstim` stimulus.
///
/// Errors
/// ------
/// - `KernelError::EmptyStimulus` when `T == 0`.
/// - `KernelError::NoChannels` when `nstim == 0`.
/// - `KernelError::NonFiniteStimulus` for the first NaN/±∞ entry.
pub fn validate_stimulus(stimulus: ArrayView2<'_, f64>) -> KernelResult<()> {
    if stimulus.nrows() == 0 {
        return Err(KernelError::EmptyStimulus);
    }
    if stimulus.ncols() == 0 {
        return Err(KernelError::NoChannels);
    }
    for ((time, channel), &value) in stimulus.indexed_iter() {
        if !value.is_finite() {
            return Err(KernelError::NonFiniteStimulus { time, channel, value });
        }
    }
    Ok(())
}

/// Validate a response aligned with a stimulus of `n_times` samples.
///
/// Errors
/// ------
/// - `KernelError::TimeAxisMismatch` when lengths differ.
/// - `KernelError::NonFiniteResponse` for the first ±∞ entry.
pub fn validate_response(response: ArrayView1<'_, f64>, n_times: usize) -> KernelResult<()> {
    if response.len() != n_times {
        return Err(KernelError::TimeAxisMismatch {
            stimulus_len: n_times,
            response_len: response.len(),
        });
    }
    for (time, &value) in response.iter().enumerate() {
        if value.is_infinite() {
            return Err(KernelError::NonFiniteResponse { time, value });
        }
    }
    Ok(())
}

/// Validate a stimulus/response pair in one call.
pub fn validate_signals(
    stimulus: ArrayView2<'_, f64>, response: ArrayView1<'_, f64>,
) -> KernelResult<()> {
    validate_stimulus(stimulus)?;
    validate_response(response, stimulus.nrows())
}

/// Check that a kernel-shaped object has as many channels as the stimulus.
pub fn validate_channels(stimulus_nstim: usize, kernel_nstim: usize) -> KernelResult<()> {
    if stimulus_nstim != kernel_nstim {
        return Err(KernelError::ChannelMismatch { expected: stimulus_nstim, found: kernel_nstim });
    }
    Ok(())
}
