//! convolution — data model and forward model for convolution kernels.
//!
//! Purpose
//! -------
//! Define the types every other module speaks in (offset ranges, kernels,
//! constraint masks, the crate error) together with the forward convolution
//! that maps a stimulus and a kernel to a predicted response.
//!
//! Key behaviors
//! -------------
//! - [`OffsetRange`] replaces offset-indexed arrays: kernels and masks are
//!   `(OffsetRange, values)` pairs with 0-based storage.
//! - [`Kernel`] and [`flat_index`] fix the flat `(τ, channel)` layout used by
//!   the Gram matrix, the cross-correlation vector and the solver.
//! - [`ConstraintMask`] marks coefficients pinned to zero.
//! - [`predict_response`] evaluates the convolution with edge truncation.
//! - [`splice_epochs`] joins discontiguous recordings and NaN-masks samples
//!   whose kernel window crosses an epoch boundary.
//!
//! Invariants & assumptions
//! ------------------------
//! - Stimulus arrays are `T × nstim` with rows indexing time; responses are
//!   length `T`. A 1-D stimulus is lifted with [`as_single_channel`].
//! - Stimulus entries are finite; NaN responses mean "unobserved".
//! - All shape and alignment failures are reported through [`KernelError`];
//!   nothing is coerced or truncated silently.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for its validation branches and
//!   hand-computable cases; cross-module consistency (predictor vs
//!   assembler) is covered by exact kernel recovery in `regression` and in
//!   the integration tests.

pub mod epochs;
pub mod errors;
pub mod kernel;
pub mod mask;
pub mod offsets;
pub mod predict;
pub mod signals;
pub mod validation;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::epochs::{Epoch, SplicedSignals, splice_epochs};
pub use self::errors::{KernelError, KernelResult};
pub use self::kernel::{Kernel, flat_index};
pub use self::mask::ConstraintMask;
pub use self::offsets::OffsetRange;
pub use self::predict::predict_response;
pub use self::signals::as_single_channel;

// ---- Optional convenience prelude for downstream crates ------------------

pub mod prelude {
    pub use super::epochs::{Epoch, splice_epochs};
    pub use super::errors::{KernelError, KernelResult};
    pub use super::kernel::Kernel;
    pub use super::mask::ConstraintMask;
    pub use super::offsets::OffsetRange;
    pub use super::predict::predict_response;
    pub use super::signals::as_single_channel;
}
