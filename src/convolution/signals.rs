//! convolution::signals — small helpers on raw stimulus/response arrays.
//!
//! Purpose
//! -------
//! Hold the per-sample transformations shared by the assembler and the
//! standard-error layer: lifting a 1-D stimulus to one channel, building the
//! observation weights `w[t]`, and zero-filling unobserved responses so they
//! never propagate NaN into sums.
//!
//! Conventions
//! -----------
//! - `w[t] = 0` exactly when `r[t]` is NaN, else `1`.
//! - Zero-filled responses are only ever multiplied by `w[t]`-masked terms;
//!   the zero is a placeholder, not an observation.
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

/// View a 1-D series as a `T × 1` stimulus.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_convkernel::convolution::signals::as_single_channel;
/// let s = array![1.0, 2.0, 3.0];
/// assert_eq!(as_single_channel(s.view()).dim(), (3, 1));
/// ```
pub fn as_single_channel(series: ArrayView1<'_, f64>) -> ArrayView2<'_, f64> {
    series.insert_axis(Axis(1))
}

/// Observation weights: 0 for NaN responses, 1 otherwise.
pub fn observation_weights(response: ArrayView1<'_, f64>) -> Array1<f64> {
    response.mapv(|r| if r.is_nan() { 0.0 } else { 1.0 })
}

/// Copy of the response with NaN entries replaced by zero.
pub fn zero_filled(response: ArrayView1<'_, f64>) -> Array1<f64> {
    response.mapv(|r| if r.is_nan() { 0.0 } else { r })
}

/// Number of observed (non-NaN) response samples.
pub fn count_observed(response: ArrayView1<'_, f64>) -> usize {
    response.iter().filter(|r| !r.is_nan()).count()
}
