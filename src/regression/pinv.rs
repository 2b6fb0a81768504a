//! regression::pinv — truncated-SVD least-squares solves.
//!
//! Purpose
//! -------
//! Solve `A x = b` in the minimum-norm least-squares sense through a
//! truncated singular value decomposition, so that rank-deficient and
//! ill-conditioned systems (collinear stimuli, bordered constraint systems)
//! still produce a well-defined answer.
//!
//! Key behaviors
//! -------------
//! - Decompose `A = U Σ Vᵀ` with `nalgebra`, keep singular values
//!   `σ_k > 0` with `σ_k ≥ rtol · σ_max`, and return
//!   `x = Σ_{kept} v_k (u_kᵀ b) / σ_k`.
//! - Report the retained rank and the sorted singular values so callers can
//!   log or inspect conditioning.
//!
//! Invariants & assumptions
//! ------------------------
//! - `b.len() == A.nrows()`; `A` need not be square or symmetric.
//! - With every singular value discarded (e.g. `A = 0`), the solution is the
//!   zero vector and the rank is 0.
//!
//! Conventions
//! -----------
//! - `ndarray` inputs are copied into a column-major `DMatrix` once
//!   ([`to_dmatrix`]); results are returned as `ndarray` again.
use crate::convolution::errors::{KernelError, KernelResult};
use nalgebra::DMatrix;
use ndarray::{Array1, ArrayView1, ArrayView2};

/// TruncatedSvdSolution — minimum-norm solution plus conditioning summary.
///
/// Fields
/// ------
/// - `solution`: `Array1<f64>`
///   Minimum-norm least-squares solution over the retained subspace.
/// - `rank`: `usize`
///   Number of singular values retained.
/// - `singular_values`: `Vec<f64>`
///   All singular values of `A`, in descending order.
/// - `threshold`: `f64`
///   Absolute cutoff `rtol · σ_max` that was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct TruncatedSvdSolution {
    pub solution: Array1<f64>,
    pub rank: usize,
    pub singular_values: Vec<f64>,
    pub threshold: f64,
}

/// solve_truncated_svd — minimum-norm least-squares solve of `A x = b`.
///
/// Parameters
/// ----------
/// - `a`: `ArrayView2<f64>`
///   `m × n` system matrix.
/// - `b`: `ArrayView1<f64>`
///   Length-`m` right-hand side.
/// - `rtol`: `f64`
///   Relative singular-value cutoff (see `regression::options::SolveOptions`).
///
/// Returns
/// -------
/// `KernelResult<TruncatedSvdSolution>`
///
/// Errors
/// ------
/// - `KernelError::FlatLengthMismatch` when `b.len() != a.nrows()`.
/// - `KernelError::DecompositionFailed` when the SVD does not converge.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_convkernel::regression::pinv::solve_truncated_svd;
/// // Rank-1 system: the minimum-norm solution splits the mass evenly.
/// let a = array![[1.0, 1.0], [1.0, 1.0]];
/// let b = array![2.0, 2.0];
/// let sol = solve_truncated_svd(a.view(), b.view(), 1e-8).unwrap();
/// assert_eq!(sol.rank, 1);
/// assert!((sol.solution[0] - 1.0).abs() < 1e-12);
/// assert!((sol.solution[1] - 1.0).abs() < 1e-12);
/// ```
pub fn solve_truncated_svd(
    a: ArrayView2<'_, f64>, b: ArrayView1<'_, f64>, rtol: f64,
) -> KernelResult<TruncatedSvdSolution> {
    let (m, n) = a.dim();
    if b.len() != m {
        return Err(KernelError::FlatLengthMismatch { expected: m, found: b.len() });
    }

    let dim = m.max(n);
    let svd = to_dmatrix(a)
        .try_svd(true, true, f64::EPSILON, 0)
        .ok_or(KernelError::DecompositionFailed { dim })?;
    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return Err(KernelError::DecompositionFailed { dim }),
    };
    let sigma = svd.singular_values;
    let sigma_max = sigma.iter().copied().fold(0.0, f64::max);
    let threshold = rtol * sigma_max;

    let mut solution = Array1::<f64>::zeros(n);
    let mut rank = 0;
    for (k, &s) in sigma.iter().enumerate() {
        if !(s > 0.0 && s >= threshold) {
            continue;
        }
        rank += 1;
        let coeff = (0..m).map(|i| u[(i, k)] * b[i]).sum::<f64>() / s;
        for j in 0..n {
            solution[j] += coeff * v_t[(k, j)];
        }
    }

    if rank < sigma.len() {
        log::debug!(
            "truncated SVD kept {rank} of {} singular values (σ_max = {sigma_max:.3e}, cutoff = {threshold:.3e})",
            sigma.len()
        );
    }

    let mut singular_values: Vec<f64> = sigma.iter().copied().collect();
    singular_values.sort_by(|x, y| y.total_cmp(x));
    Ok(TruncatedSvdSolution { solution, rank, singular_values, threshold })
}

// ---- Helper methods ----

/// Copy an `ndarray` matrix into a `nalgebra::DMatrix`, column by column to
/// match `DMatrix`'s column-major storage.
pub(crate) fn to_dmatrix(a: ArrayView2<'_, f64>) -> DMatrix<f64> {
    let (m, n) = a.dim();
    let mut out = DMatrix::<f64>::zeros(m, n);
    for j in 0..n {
        for i in 0..m {
            out[(i, j)] = a[(i, j)];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exact solves of well-conditioned systems.
    // - Minimum-norm answers for rank-deficient systems.
    // - The effect of `rtol` on small singular values.
    // - The all-zero and shape-mismatch edge cases.
    // -------------------------------------------------------------------------

    #[test]
    fn to_dmatrix_copies_rectangular_matrix() {
        let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let m = to_dmatrix(a.view());
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m[(1, 2)], 6.0);
        assert_eq!(m[(0, 1)], 2.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify an exact solve for a nonsingular, non-diagonal system.
    //
    // Given
    // -----
    // - A = [[4, 1], [1, 3]], x* = [1, -2], b = A x*.
    //
    // Expect
    // ------
    // - Full rank and x ≈ x* to 1e-12.
    fn solve_truncated_svd_recovers_exact_solution_when_nonsingular() {
        // Arrange
        let a = array![[4.0, 1.0], [1.0, 3.0]];
        let b = a.dot(&array![1.0, -2.0]);

        // Act
        let sol = solve_truncated_svd(a.view(), b.view(), 1e-8).unwrap();

        // Assert
        assert_eq!(sol.rank, 2);
        assert_abs_diff_eq!(sol.solution[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sol.solution[1], -2.0, epsilon = 1e-12);
        assert!(sol.singular_values[0] >= sol.singular_values[1]);
    }

    #[test]
    // Purpose
    // -------
    // Check that `rtol` discards directions with tiny singular values and
    // that `rtol = 0` keeps them.
    //
    // Given
    // -----
    // - A = diag(1, 1e-10), b = [1, 1].
    //
    // Expect
    // ------
    // - rtol = 1e-8: rank 1, x = [1, 0].
    // - rtol = 0:    rank 2, x = [1, 1e10].
    fn solve_truncated_svd_respects_relative_tolerance() {
        // Arrange
        let a = array![[1.0, 0.0], [0.0, 1e-10]];
        let b = array![1.0, 1.0];

        // Act
        let truncated = solve_truncated_svd(a.view(), b.view(), 1e-8).unwrap();
        let full = solve_truncated_svd(a.view(), b.view(), 0.0).unwrap();

        // Assert
        assert_eq!(truncated.rank, 1);
        assert_abs_diff_eq!(truncated.solution[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(truncated.solution[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(truncated.threshold, 1e-8, max_relative = 1e-12);

        assert_eq!(full.rank, 2);
        assert_relative_eq!(full.solution[1], 1e10, max_relative = 1e-8);
    }

    #[test]
    // Purpose
    // -------
    // Pin the inclusive cutoff: a singular value equal to `rtol · σ_max` is
    // kept, so `rtol = 1` retains the largest direction.
    //
    // Given
    // -----
    // - A = diag(2, 1), b = [2, 1], rtol = 1.
    //
    // Expect
    // ------
    // - rank 1, threshold = 2, x = [1, 0].
    fn solve_truncated_svd_keeps_singular_value_at_cutoff() {
        // Arrange
        let a = array![[2.0, 0.0], [0.0, 1.0]];
        let b = array![2.0, 1.0];

        // Act
        let sol = solve_truncated_svd(a.view(), b.view(), 1.0).unwrap();

        // Assert
        assert_eq!(sol.rank, 1);
        assert_relative_eq!(sol.threshold, 2.0, max_relative = 1e-12);
        assert_abs_diff_eq!(sol.solution[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sol.solution[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn solve_truncated_svd_zero_matrix_gives_zero_solution() {
        let a = ndarray::Array2::<f64>::zeros((3, 3));
        let b = array![1.0, 2.0, 3.0];
        let sol = solve_truncated_svd(a.view(), b.view(), 1e-8).unwrap();
        assert_eq!(sol.rank, 0);
        assert!(sol.solution.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn solve_truncated_svd_rejects_rhs_length_mismatch() {
        let a = array![[1.0, 0.0], [0.0, 1.0]];
        let b = array![1.0, 2.0, 3.0];
        assert_eq!(
            solve_truncated_svd(a.view(), b.view(), 1e-8),
            Err(KernelError::FlatLengthMismatch { expected: 2, found: 3 })
        );
    }
}
