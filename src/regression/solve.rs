//! regression::solve — least-squares kernel estimation with optional
//! equality constraints.
//!
//! Purpose
//! -------
//! Estimate the kernel `k` minimizing
//!
//! ```text
//! Σ_{t: r[t] observed} ( r[t] − Σ_i Σ_τ S[t+τ, i] k[τ, i] )²
//! ```
//!
//! subject to `k[τ, i] = 0` for every pinned coefficient of a
//! [`ConstraintMask`].
//!
//! Key behaviors
//! -------------
//! - The normal equations `C k = d` come from `regression::gram`.
//! - With `m` pinned coefficients the bordered (KKT) system
//!
//!   ```text
//!   [ C   Q ] [ k ]   [ d ]
//!   [ Qᵀ  0 ] [ λ ] = [ 0 ]
//!   ```
//!
//!   is solved, where column `q` of `Q` is the unit vector selecting the
//!   `q`-th pinned coefficient. With `m = 0` the system is just `C k = d`.
//! - Every solve goes through the truncated SVD of `regression::pinv`, so
//!   rank-deficient designs yield the minimum-norm kernel instead of failing.
//! - Pinned coefficients are written back as exact zeros.
//!
//! Invariants & assumptions
//! ------------------------
//! - The mask's support and channel count must equal the system's.
//! - Among all minimizers, the returned kernel has minimum Euclidean norm
//!   over the free coefficients (pinned ones are zero).
//!
//! Downstream usage
//! ----------------
//! - [`KernelSolution::normal_equations`] carries `C` forward to
//!   `inference::standard_errors`.
use crate::{
    convolution::{
        errors::{KernelError, KernelResult},
        kernel::Kernel,
        mask::ConstraintMask,
        offsets::OffsetRange,
    },
    regression::{
        gram::{NormalEquations, compute_normal_equations},
        options::SolveOptions,
        pinv::solve_truncated_svd,
    },
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};

/// KernelSolution — estimated kernel and the system it was solved from.
///
/// Fields
/// ------
/// - `kernel`: [`Kernel`]
///   Estimated coefficients; pinned entries are exactly zero.
/// - `normal_equations`: [`NormalEquations`]
///   The unbordered system `(C, d)`; `C` feeds the standard errors.
/// - `rank`: `usize`
///   Rank retained by the truncated SVD of the solved (possibly bordered)
///   system.
/// - `multipliers`: `Array1<f64>`
///   Lagrange multipliers `λ`, one per pinned coefficient in ascending flat
///   order; empty when unconstrained.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelSolution {
    pub kernel: Kernel,
    pub normal_equations: NormalEquations,
    pub rank: usize,
    pub multipliers: Array1<f64>,
}

impl KernelSolution {
    /// Whether the solved system lost rank to truncation.
    pub fn is_rank_deficient(&self) -> bool {
        self.rank < self.normal_equations.len() + self.multipliers.len()
    }
}

/// solve_for_kernel — unconstrained estimate over an explicit support.
///
/// Parameters
/// ----------
/// - `stimulus`: `ArrayView2<f64>`
///   `T × nstim`, finite.
/// - `response`: `ArrayView1<f64>`
///   Length `T`; NaN samples are excluded.
/// - `trange`: [`OffsetRange`]
///   Kernel support, possibly acausal.
/// - `opts`: `&SolveOptions`
///   Truncation tolerance.
///
/// Errors
/// ------
/// - Signal validation errors from the assembler.
/// - `KernelError::DecompositionFailed` if the SVD does not converge.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_convkernel::convolution::{offsets::OffsetRange, signals::as_single_channel};
/// # use rust_convkernel::regression::{options::SolveOptions, solve::solve_for_kernel};
/// let s = array![1.0, 0.0, 2.0, -1.0, 0.5, 3.0];
/// // r[t] = 2·S[t]
/// let r = s.mapv(|x| 2.0 * x);
/// let sol = solve_for_kernel(
///     as_single_channel(s.view()), r.view(), OffsetRange::new(0, 0).unwrap(),
///     &SolveOptions::default(),
/// ).unwrap();
/// assert!((sol.kernel.get(0, 0).unwrap() - 2.0).abs() < 1e-12);
/// ```
pub fn solve_for_kernel(
    stimulus: ArrayView2<'_, f64>, response: ArrayView1<'_, f64>, trange: OffsetRange,
    opts: &SolveOptions,
) -> KernelResult<KernelSolution> {
    let normal_equations = compute_normal_equations(stimulus, response, trange)?;
    let mask = ConstraintMask::all_free(trange, normal_equations.nstim)?;
    solve_normal_equations(normal_equations, &mask, opts)
}

/// solve_for_kernel_causal — unconstrained estimate of a causal kernel of
/// length `nt` (support `-(nt-1)..=0`).
pub fn solve_for_kernel_causal(
    stimulus: ArrayView2<'_, f64>, response: ArrayView1<'_, f64>, nt: usize, opts: &SolveOptions,
) -> KernelResult<KernelSolution> {
    solve_for_kernel(stimulus, response, OffsetRange::causal(nt)?, opts)
}

/// solve_for_kernel_constrained — estimate with pinned-zero coefficients.
///
/// The support is taken from the mask.
///
/// Errors
/// ------
/// - `KernelError::MaskShapeMismatch` when the mask's channel count differs
///   from the stimulus'.
/// - Every error of [`solve_for_kernel`].
pub fn solve_for_kernel_constrained(
    stimulus: ArrayView2<'_, f64>, response: ArrayView1<'_, f64>, mask: &ConstraintMask,
    opts: &SolveOptions,
) -> KernelResult<KernelSolution> {
    if mask.nstim() != stimulus.ncols() {
        return Err(KernelError::MaskShapeMismatch {
            expected: (mask.trange().len(), stimulus.ncols()),
            found: mask.free().dim(),
        });
    }
    let normal_equations = compute_normal_equations(stimulus, response, mask.trange())?;
    solve_normal_equations(normal_equations, mask, opts)
}

/// solve_normal_equations — solve an assembled system under a mask.
///
/// Parameters
/// ----------
/// - `normal_equations`: [`NormalEquations`]
///   Assembled `(C, d)`; moved into the returned solution.
/// - `mask`: `&ConstraintMask`
///   Free/pinned layout over the same support and channels.
/// - `opts`: `&SolveOptions`
///
/// Errors
/// ------
/// - `KernelError::MaskShapeMismatch` when the mask's support or channel
///   count differs from the system's.
/// - `KernelError::DecompositionFailed` if the SVD does not converge.
///
/// Notes
/// -----
/// - The bordered matrix is symmetric but indefinite; the truncated SVD is
///   applied to it as a whole, not to `C` alone.
pub fn solve_normal_equations(
    normal_equations: NormalEquations, mask: &ConstraintMask, opts: &SolveOptions,
) -> KernelResult<KernelSolution> {
    let trange = normal_equations.trange;
    let nstim = normal_equations.nstim;
    if mask.trange() != trange || mask.nstim() != nstim {
        return Err(KernelError::MaskShapeMismatch {
            expected: (trange.len(), nstim),
            found: mask.free().dim(),
        });
    }

    let l = normal_equations.len();
    let pinned = mask.pinned_indices();
    let m = pinned.len();

    let solved = if m == 0 {
        solve_truncated_svd(normal_equations.gram.view(), normal_equations.cross.view(), opts.rtol)?
    } else {
        let (a, b) = bordered_system(&normal_equations, &pinned);
        solve_truncated_svd(a.view(), b.view(), opts.rtol)?
    };

    let mut coefficients = solved.solution.slice(s![..l]).to_owned();
    for &j in &pinned {
        coefficients[j] = 0.0;
    }
    let multipliers = solved.solution.slice(s![l..]).to_owned();
    let kernel = Kernel::from_flat(trange, nstim, coefficients.view())?;

    log::debug!(
        "solved {l} kernel coefficients over {trange} ({m} pinned); rank {} of {}",
        solved.rank,
        l + m
    );
    Ok(KernelSolution { kernel, normal_equations, rank: solved.rank, multipliers })
}

// ---- Helper methods ----

/// `[[C, Q], [Qᵀ, 0]]` and `[d; 0]` for the given pinned flat indices.
fn bordered_system(
    normal_equations: &NormalEquations, pinned: &[usize],
) -> (Array2<f64>, Array1<f64>) {
    let l = normal_equations.len();
    let n = l + pinned.len();
    let mut a = Array2::<f64>::zeros((n, n));
    a.slice_mut(s![..l, ..l]).assign(&normal_equations.gram);
    for (q, &j) in pinned.iter().enumerate() {
        a[(j, l + q)] = 1.0;
        a[(l + q, j)] = 1.0;
    }
    let mut b = Array1::<f64>::zeros(n);
    b.slice_mut(s![..l]).assign(&normal_equations.cross);
    (a, b)
}
