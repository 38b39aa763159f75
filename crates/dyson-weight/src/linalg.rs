//! Dense complex inversion through faer's partially pivoted LU.

use faer::linalg::solvers::DenseSolveCore;
use faer::{Mat, MatRef};
use num_complex::Complex64;

/// Pivot step at which the factorization found no usable pivot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingularPivot(pub usize);

fn is_usable(z: Complex64) -> bool {
    let norm = z.norm();
    norm.is_finite() && norm > 0.0
}

/// Inverse of a square matrix, `PA = LU` with row pivoting.
///
/// The first zero or non-finite diagonal entry of `U` marks the matrix
/// singular. An inverse that still overflows is reported at step `n`.
///
/// # Panics
/// Panics if `a` is not square.
pub fn invert(a: MatRef<'_, Complex64>) -> Result<Mat<Complex64>, SingularPivot> {
    let n = a.nrows();
    assert_eq!(n, a.ncols(), "expected a square matrix, got {}x{}", n, a.ncols());

    let lu = a.partial_piv_lu();
    let u = lu.U();
    if let Some(step) = (0..n).find(|&k| !is_usable(u[(k, k)])) {
        return Err(SingularPivot(step));
    }

    let inverse = lu.inverse();
    let finite = (0..n).all(|c| {
        (0..n).all(|r| {
            let z = inverse[(r, c)];
            z.re.is_finite() && z.im.is_finite()
        })
    });
    if !finite {
        return Err(SingularPivot(n));
    }
    Ok(inverse)
}
