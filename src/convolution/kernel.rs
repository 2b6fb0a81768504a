//! convolution::kernel — offset-indexed kernel coefficients.
//!
//! Purpose
//! -------
//! Store kernel coefficients `k[τ, i]` as an explicit `(OffsetRange, values)`
//! pair and define the flat index layout shared by the Gram matrix, the
//! cross-correlation vector, the solver output, and the standard errors.
//!
//! Key behaviors
//! -------------
//! - [`Kernel`] owns an `nt × nstim` array whose row `p` holds offset
//!   `trange.offset_at(p)`.
//! - [`flat_index`] maps `(position, channel)` to `channel · nt + position`
//!   (offset fastest). [`Kernel::flatten`] and [`Kernel::from_flat`] use it
//!   and are exact inverses.
//!
//! Invariants & assumptions
//! ------------------------
//! - `values.nrows() == trange.len()` and `values.ncols() ≥ 1`.
//! - The flat layout is the only layout used for `L = nt · nstim` vectors
//!   anywhere in the crate.
use crate::convolution::{
    errors::{KernelError, KernelResult},
    offsets::OffsetRange,
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Flat position of `(position, channel)` for a support of length `nt`.
#[inline]
pub fn flat_index(nt: usize, position: usize, channel: usize) -> usize {
    channel * nt + position
}

/// Kernel — coefficients indexed by signed offset and channel.
///
/// Fields
/// ------
/// - `trange`: [`OffsetRange`]
///   Support of the kernel.
/// - `values`: `Array2<f64>`
///   `nt × nstim` coefficients; row `p` is offset `trange.offset_at(p)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    trange: OffsetRange,
    values: Array2<f64>,
}

impl Kernel {
    /// Pair an offset range with a coefficient array.
    ///
    /// Errors
    /// ------
    /// - `KernelError::KernelShapeMismatch` when `values` does not have
    ///   `trange.len()` rows or has zero columns.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use ndarray::array;
    /// # use rust_convkernel::convolution::{kernel::Kernel, offsets::OffsetRange};
    /// let trange = OffsetRange::new(-1, 0).unwrap();
    /// let k = Kernel::new(trange, array![[0.25], [1.0]]).unwrap();
    /// assert_eq!(k.get(-1, 0), Some(0.25));
    /// assert_eq!(k.len(), 2);
    /// ```
    pub fn new(trange: OffsetRange, values: Array2<f64>) -> KernelResult<Self> {
        let nt = trange.len();
        if values.nrows() != nt || values.ncols() == 0 {
            return Err(KernelError::KernelShapeMismatch {
                expected: (nt, values.ncols().max(1)),
                found: values.dim(),
            });
        }
        Ok(Kernel { trange, values })
    }

    /// All-zero kernel over `trange` with `nstim` channels.
    pub fn zeros(trange: OffsetRange, nstim: usize) -> KernelResult<Self> {
        if nstim == 0 {
            return Err(KernelError::NoChannels);
        }
        Ok(Kernel { trange, values: Array2::zeros((trange.len(), nstim)) })
    }

    /// Rebuild a kernel from its flat representation.
    ///
    /// Errors
    /// ------
    /// - `KernelError::NoChannels` when `nstim == 0`.
    /// - `KernelError::FlatLengthMismatch` when `flat.len() != nt · nstim`.
    pub fn from_flat(
        trange: OffsetRange, nstim: usize, flat: ArrayView1<'_, f64>,
    ) -> KernelResult<Self> {
        if nstim == 0 {
            return Err(KernelError::NoChannels);
        }
        let nt = trange.len();
        if flat.len() != nt * nstim {
            return Err(KernelError::FlatLengthMismatch { expected: nt * nstim, found: flat.len() });
        }
        let values = Array2::from_shape_fn((nt, nstim), |(p, i)| flat[flat_index(nt, p, i)]);
        Ok(Kernel { trange, values })
    }

    pub fn trange(&self) -> OffsetRange {
        self.trange
    }

    pub fn nstim(&self) -> usize {
        self.values.ncols()
    }

    /// Total number of coefficients `L = nt · nstim`.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    /// Coefficient at offset `tau` and channel `channel`, if in range.
    pub fn get(&self, tau: isize, channel: usize) -> Option<f64> {
        let pos = self.trange.position(tau)?;
        self.values.get((pos, channel)).copied()
    }

    /// Flat coefficient vector in [`flat_index`] order.
    pub fn flatten(&self) -> Array1<f64> {
        let nt = self.trange.len();
        let mut flat = Array1::zeros(self.len());
        for ((p, i), &v) in self.values.indexed_iter() {
            flat[flat_index(nt, p, i)] = v;
        }
        flat
    }

    /// Element-wise combination with another kernel of the same layout.
    ///
    /// Used by the inference layer to form t-statistics and confidence
    /// bounds. Callers guarantee matching shapes.
    pub(crate) fn zip_map(&self, other: &Kernel, f: impl Fn(f64, f64) -> f64) -> Kernel {
        let mut values = self.values.clone();
        values.zip_mut_with(&other.values, |a, &b| *a = f(*a, b));
        Kernel { trange: self.trange, values }
    }
}
