//! convolution::mask — equality constraints on kernel coefficients.
//!
//! Purpose
//! -------
//! Mark which kernel coefficients are free to vary and which are pinned to
//! exactly zero. The constrained solver turns every pinned coefficient into
//! one Lagrange-multiplier row of the bordered normal equations.
//!
//! Key behaviors
//! -------------
//! - [`ConstraintMask::new`] validates an explicit boolean layout.
//! - [`ConstraintMask::all_free`] gives the unconstrained problem.
//! - [`ConstraintMask::pin`] pins single coefficients by offset and channel.
//! - [`ConstraintMask::pinned_indices`] lists pinned coefficients in the
//!   crate's flat layout (see [`flat_index`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - The mask shares its [`OffsetRange`] and `nt × nstim` layout with the
//!   kernel it constrains; `true` means free, `false` means pinned to zero.
use crate::convolution::{
    errors::{KernelError, KernelResult},
    kernel::flat_index,
    offsets::OffsetRange,
};
use ndarray::{Array2, ArrayView2};

/// ConstraintMask — free/pinned flags over a kernel layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintMask {
    trange: OffsetRange,
    free: Array2<bool>,
}

impl ConstraintMask {
    /// Pair an offset range with an `nt × nstim` boolean layout.
    ///
    /// Errors
    /// ------
    /// - `KernelError::MaskShapeMismatch` when `free` does not have
    ///   `trange.len()` rows or has zero columns.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use ndarray::array;
    /// # use rust_convkernel::convolution::{mask::ConstraintMask, offsets::OffsetRange};
    /// let trange = OffsetRange::new(-2, -1).unwrap();
    /// let mask = ConstraintMask::new(trange, array![[true, false], [false, true]]).unwrap();
    /// assert_eq!(mask.n_pinned(), 2);
    /// assert_eq!(mask.pinned_indices(), vec![1, 2]);
    /// ```
    pub fn new(trange: OffsetRange, free: Array2<bool>) -> KernelResult<Self> {
        let nt = trange.len();
        if free.nrows() != nt || free.ncols() == 0 {
            return Err(KernelError::MaskShapeMismatch {
                expected: (nt, free.ncols().max(1)),
                found: free.dim(),
            });
        }
        Ok(ConstraintMask { trange, free })
    }

    /// Unconstrained mask: every coefficient free.
    pub fn all_free(trange: OffsetRange, nstim: usize) -> KernelResult<Self> {
        if nstim == 0 {
            return Err(KernelError::NoChannels);
        }
        Ok(ConstraintMask { trange, free: Array2::from_elem((trange.len(), nstim), true) })
    }

    /// Pin the coefficient at `(tau, channel)` to zero.
    ///
    /// Errors
    /// ------
    /// - `KernelError::OffsetOutOfRange` for `tau` outside the support.
    /// - `KernelError::ChannelOutOfRange` for `channel ≥ nstim`.
    pub fn pin(&mut self, tau: isize, channel: usize) -> KernelResult<()> {
        let pos = self.trange.position(tau).ok_or(KernelError::OffsetOutOfRange {
            tau,
            first: self.trange.first(),
            last: self.trange.last(),
        })?;
        let nstim = self.nstim();
        if channel >= nstim {
            return Err(KernelError::ChannelOutOfRange { channel, nstim });
        }
        self.free[(pos, channel)] = false;
        Ok(())
    }

    pub fn trange(&self) -> OffsetRange {
        self.trange
    }

    pub fn nstim(&self) -> usize {
        self.free.ncols()
    }

    pub fn free(&self) -> ArrayView2<'_, bool> {
        self.free.view()
    }

    /// Whether `(tau, channel)` is free; `None` outside the layout.
    pub fn is_free(&self, tau: isize, channel: usize) -> Option<bool> {
        let pos = self.trange.position(tau)?;
        self.free.get((pos, channel)).copied()
    }

    pub fn n_free(&self) -> usize {
        self.free.iter().filter(|&&f| f).count()
    }

    pub fn n_pinned(&self) -> usize {
        self.free.len() - self.n_free()
    }

    /// Flat indices of pinned coefficients, ascending.
    pub fn pinned_indices(&self) -> Vec<usize> {
        let nt = self.trange.len();
        let mut pinned: Vec<usize> = self
            .free
            .indexed_iter()
            .filter(|(_, f)| !**f)
            .map(|((p, i), _)| flat_index(nt, p, i))
            .collect();
        pinned.sort_unstable();
        pinned
    }
}
