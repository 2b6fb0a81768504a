//! convolution::errors — unified error type for kernel estimation.
//!
//! Purpose
//! -------
//! Provide the single error enum and result alias shared by the whole
//! estimation stack: offset ranges, kernels and masks, stimulus/response
//! validation, normal-equation assembly, the truncated-SVD solver, and the
//! standard-error layer.
//!
//! Key behaviors
//! -------------
//! - Define [`KernelError`] and [`KernelResult`] as the canonical error and
//!   result types of the crate.
//! - Attach human-readable `Display` messages to each variant so that
//!   diagnostics are meaningful without additional context.
//!
//! Invariants & assumptions
//! ------------------------
//! - Shape and alignment problems are always reported as errors; nothing in
//!   the crate silently truncates or pads a caller's arrays.
//! - Numerical ill-conditioning is **not** an error. Rank-deficient systems
//!   are handled by singular-value truncation and never reach this enum.
//! - Variants carry only scalars or small tuples so they stay cheap to clone
//!   and compare in tests.
//!
//! Conventions
//! -----------
//! - Time indices are 0-based rows of the stimulus / entries of the response.
//! - Offsets `τ` are signed and reported exactly as the caller supplied them.
//! - Shapes are reported as `(rows, cols)`.
//!
//! Testing notes
//! -------------
//! - Unit tests check that `Display` messages embed their payloads.
//! - Every variant is produced by at least one validation test in the module
//!   that raises it.

pub type KernelResult<T> = Result<T, KernelError>;

/// KernelError — failure conditions for kernel estimation.
///
/// Variants
/// --------
/// Grouped by the layer that raises them: offset ranges, kernel/mask shape,
/// signal validation, epoch splicing, solver configuration, and inference.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelError {
    // ---- Offsets ----
    /// Offset range with `first > last`.
    EmptyOffsetRange { first: isize, last: isize },

    /// Causal kernel length must be at least 1.
    ZeroKernelLength,

    /// Offset does not belong to the kernel support.
    OffsetOutOfRange { tau: isize, first: isize, last: isize },

    /// Channel index beyond the kernel's channel count.
    ChannelOutOfRange { channel: usize, nstim: usize },

    // ---- Kernel / mask shape ----
    /// Kernel values do not match `(range length, nstim)`.
    KernelShapeMismatch { expected: (usize, usize), found: (usize, usize) },

    /// Constraint mask does not match the implied kernel shape.
    MaskShapeMismatch { expected: (usize, usize), found: (usize, usize) },

    /// Flat coefficient vector has the wrong length.
    FlatLengthMismatch { expected: usize, found: usize },

    /// Kernel channel count differs from the stimulus channel count.
    ChannelMismatch { expected: usize, found: usize },

    // ---- Signals ----
    /// Stimulus has no time samples.
    EmptyStimulus,

    /// Stimulus has no channels.
    NoChannels,

    /// Stimulus entry is NaN or ±∞.
    NonFiniteStimulus { time: usize, channel: usize, value: f64 },

    /// Response entry is ±∞ (NaN is allowed and means "unobserved").
    NonFiniteResponse { time: usize, value: f64 },

    /// Stimulus and response time axes are not aligned.
    TimeAxisMismatch { stimulus_len: usize, response_len: usize },

    // ---- Epochs ----
    /// No epochs were supplied for splicing.
    NoEpochs,

    /// An epoch's channel count differs from the first epoch's.
    EpochChannelMismatch { epoch: usize, expected: usize, found: usize },

    // ---- Solver ----
    /// Relative singular-value tolerance outside `[0, 1]` or non-finite.
    InvalidRtol { value: f64, reason: &'static str },

    /// Singular value decomposition did not return both factors.
    DecompositionFailed { dim: usize },

    // ---- Inference ----
    /// Gram matrix dimension does not match the kernel length.
    GramDimMismatch { expected: usize, found: (usize, usize) },

    /// Gram matrix is exactly singular and cannot be inverted.
    SingularGram { dim: usize },

    /// Confidence level must lie strictly between 0 and 1.
    InvalidConfidenceLevel { level: f64 },

    /// Student-t bounds need `N > L`.
    InsufficientDegreesOfFreedom { n_observed: usize, n_coefficients: usize },

    /// Wrapper for `statrs` distribution construction errors.
    Distribution { text: String },
}

impl std::error::Error for KernelError {}

impl std::fmt::Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Offsets ----
            KernelError::EmptyOffsetRange { first, last } => {
                write!(f, "Empty offset range {first}:{last}; first must not exceed last")
            }
            KernelError::ZeroKernelLength => {
                write!(f, "Kernel length must be at least 1")
            }
            KernelError::OffsetOutOfRange { tau, first, last } => {
                write!(f, "Offset {tau} lies outside the kernel support {first}:{last}")
            }
            KernelError::ChannelOutOfRange { channel, nstim } => {
                write!(f, "Channel {channel} out of range for {nstim} stimulus channels")
            }

            // ---- Kernel / mask shape ----
            KernelError::KernelShapeMismatch { expected, found } => {
                write!(f, "Kernel shape mismatch: expected {expected:?}, found {found:?}")
            }
            KernelError::MaskShapeMismatch { expected, found } => {
                write!(f, "Constraint mask shape mismatch: expected {expected:?}, found {found:?}")
            }
            KernelError::FlatLengthMismatch { expected, found } => {
                write!(f, "Flat coefficient length mismatch: expected {expected}, found {found}")
            }
            KernelError::ChannelMismatch { expected, found } => {
                write!(f, "Channel count mismatch: stimulus has {expected}, kernel has {found}")
            }

            // ---- Signals ----
            KernelError::EmptyStimulus => {
                write!(f, "Stimulus has no time samples")
            }
            KernelError::NoChannels => {
                write!(f, "Stimulus has no channels")
            }
            KernelError::NonFiniteStimulus { time, channel, value } => {
                write!(f, "Stimulus at time {time}, channel {channel} is non-finite: {value}")
            }
            KernelError::NonFiniteResponse { time, value } => {
                write!(f, "Response at time {time} is infinite: {value}; use NaN for missing data")
            }
            KernelError::TimeAxisMismatch { stimulus_len, response_len } => {
                write!(
                    f,
                    "Time axes not aligned: stimulus has {stimulus_len} samples, response has {response_len}"
                )
            }

            // ---- Epochs ----
            KernelError::NoEpochs => {
                write!(f, "At least one epoch is required")
            }
            KernelError::EpochChannelMismatch { epoch, expected, found } => {
                write!(f, "Epoch {epoch} has {found} channels, expected {expected}")
            }

            // ---- Solver ----
            KernelError::InvalidRtol { value, reason } => {
                write!(f, "Invalid relative tolerance {value}: {reason}")
            }
            KernelError::DecompositionFailed { dim } => {
                write!(f, "Singular value decomposition of a {dim}x{dim} system failed")
            }

            // ---- Inference ----
            KernelError::GramDimMismatch { expected, found } => {
                write!(
                    f,
                    "Gram matrix dimension mismatch: expected ({expected}, {expected}), found {found:?}"
                )
            }
            KernelError::SingularGram { dim } => {
                write!(f, "Gram matrix ({dim}x{dim}) is singular and cannot be inverted")
            }
            KernelError::InvalidConfidenceLevel { level } => {
                write!(f, "Invalid confidence level {level}: must satisfy 0 < level < 1")
            }
            KernelError::InsufficientDegreesOfFreedom { n_observed, n_coefficients } => {
                write!(
                    f,
                    "Insufficient degrees of freedom: {n_observed} observations for {n_coefficients} coefficients"
                )
            }
            KernelError::Distribution { text } => {
                write!(f, "Distribution error: {text}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - `Display` messages embedding their payloads for representative
    //   variants of each group.
    //
    // They intentionally DO NOT cover:
    // - The conditions that raise each variant; those live next to the
    //   validating code.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that offset and shape variants report the offending values.
    //
    // Given
    // -----
    // - An `EmptyOffsetRange` and a `MaskShapeMismatch`.
    //
    // Expect
    // ------
    // - The rendered messages contain the range bounds and both shapes.
    fn display_embeds_offset_and_shape_payloads() {
        // Arrange
        let range_err = KernelError::EmptyOffsetRange { first: 3, last: -1 };
        let mask_err = KernelError::MaskShapeMismatch { expected: (5, 2), found: (4, 2) };

        // Act
        let range_msg = range_err.to_string();
        let mask_msg = mask_err.to_string();

        // Assert
        assert!(range_msg.contains("3:-1"), "got {range_msg}");
        assert!(mask_msg.contains("(5, 2)") && mask_msg.contains("(4, 2)"), "got {mask_msg}");
    }

    #[test]
    // Purpose
    // -------
    // Verify that signal validation variants report location and value.
    //
    // Given
    // -----
    // - A `NonFiniteStimulus` at (7, 1) and a `TimeAxisMismatch`.
    //
    // Expect
    // ------
    // - Both messages mention the time index / lengths involved.
    fn display_embeds_signal_payloads() {
        // Arrange
        let stim_err = KernelError::NonFiniteStimulus { time: 7, channel: 1, value: f64::INFINITY };
        let align_err = KernelError::TimeAxisMismatch { stimulus_len: 10, response_len: 9 };

        // Act / Assert
        let stim_msg = stim_err.to_string();
        assert!(stim_msg.contains("time 7") && stim_msg.contains("channel 1"), "got {stim_msg}");
        let align_msg = align_err.to_string();
        assert!(align_msg.contains("10") && align_msg.contains('9'), "got {align_msg}");
    }
}
