//! convolution::predict — forward convolution of stimuli with a kernel.
//!
//! Purpose
//! -------
//! Apply a (possibly acausal, multi-channel) kernel to a stimulus to produce
//! the predicted response
//!
//! ```text
//! r̂[t] = Σ_i Σ_{τ ∈ trange} S[t+τ, i] · k[τ, i],
//! ```
//!
//! used for simulation and for residuals in the standard-error layer.
//!
//! Invariants & assumptions
//! ------------------------
//! - Terms with `t+τ` outside `[0, T)` are omitted (edge truncation). Out of
//!   range stimulus is unobserved, not zero; this matches the time window the
//!   assembler sums over, so predictions and normal equations describe the
//!   same linear model.
//! - The kernel's channel count must equal the stimulus channel count.
//!
//! Performance
//! -----------
//! - O(T · nt · nstim); each (τ, i) term is applied as one strided
//!   `scaled_add` over its valid time window.
use crate::convolution::{
    errors::KernelResult,
    kernel::Kernel,
    offsets::OffsetRange,
    validation::{validate_channels, validate_stimulus},
};
use ndarray::{Array1, ArrayView2, s};

/// predict_response — convolve `stimulus` with `kernel`.
///
/// Parameters
/// ----------
/// - `stimulus`: `ArrayView2<f64>`
///   `T × nstim` stimulus, finite entries.
/// - `kernel`: `&Kernel`
///   Kernel with `nstim` channels over any offset range.
///
/// Returns
/// -------
/// `KernelResult<Array1<f64>>`
///   Length-`T` predicted response.
///
/// Errors
/// ------
/// - `KernelError::ChannelMismatch` when the kernel's channel count differs
///   from the stimulus'.
/// - Stimulus validation errors (`EmptyStimulus`, `NoChannels`,
///   `NonFiniteStimulus`).
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_convkernel::convolution::{kernel::Kernel, offsets::OffsetRange};
/// # use rust_convkernel::convolution::predict::predict_response;
/// # use rust_convkernel::convolution::signals::as_single_channel;
/// let s = array![1.0, 0.0, 0.0, 0.0];
/// // r̂[t] = 0.5·S[t−1]: a one-sample delay.
/// let k = Kernel::new(OffsetRange::new(-1, -1).unwrap(), array![[0.5]]).unwrap();
/// let r = predict_response(as_single_channel(s.view()), &k).unwrap();
/// assert_eq!(r, array![0.0, 0.5, 0.0, 0.0]);
/// ```
pub fn predict_response(
    stimulus: ArrayView2<'_, f64>, kernel: &Kernel,
) -> KernelResult<Array1<f64>> {
    validate_stimulus(stimulus)?;
    validate_channels(stimulus.ncols(), kernel.nstim())?;

    let n_times = stimulus.nrows();
    let trange = kernel.trange();
    let values = kernel.values();
    let mut predicted = Array1::<f64>::zeros(n_times);

    for (pos, tau) in trange.iter().enumerate() {
        let window = OffsetRange::valid_times(&[tau], n_times);
        if window.is_empty() {
            continue;
        }
        let src = shifted(window.start, tau)..shifted(window.end, tau);
        for channel in 0..stimulus.ncols() {
            let coeff = values[(pos, channel)];
            if coeff == 0.0 {
                continue;
            }
            let column = stimulus.slice(s![src.clone(), channel]);
            predicted.slice_mut(s![window.clone()]).scaled_add(coeff, &column);
        }
    }
    Ok(predicted)
}

/// `t + τ` for a `t` already known to lie in the valid window of `τ`.
#[inline]
pub(crate) fn shifted(t: usize, tau: isize) -> usize {
    (t as isize + tau) as usize
}
