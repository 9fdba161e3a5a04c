//! Dense linear algebra for block-encoding dilations.
//!
//! Matrix square roots go through a single LAPACK eigendecomposition
//! (`ndarray-linalg`'s `eigh`), `√H = V √Λ V†`.

use ndarray::{Array1, Array2, s};
use ndarray_linalg::{Eigh, UPLO};
use num_complex::Complex64;

use crate::error::{SimError, SimResult};

/// Eigenvalues below `-CONTRACTION_TOLERANCE` mean `I - AA†` is not PSD.
const CONTRACTION_TOLERANCE: f64 = 1e-9;

/// Rebuild `V f(Λ) V†` from an eigendecomposition.
fn spectral_map<F>(values: &Array1<f64>, vectors: &Array2<Complex64>, f: F) -> Array2<Complex64>
where
    F: Fn(f64) -> f64,
{
    let weights = values.mapv(|lambda| Complex64::new(f(lambda), 0.0));
    (vectors * &weights).dot(&adjoint(vectors))
}

/// Principal square root of a positive semi-definite Hermitian matrix.
///
/// Fails when an eigenvalue is negative beyond rounding noise.
pub fn psd_sqrt(h: &Array2<Complex64>) -> SimResult<Array2<Complex64>> {
    let (values, vectors) = h.eigh(UPLO::Lower)?;
    // eigh returns eigenvalues in ascending order.
    if let Some(&min) = values.first() {
        if min < -CONTRACTION_TOLERANCE {
            return Err(SimError::InvalidDilation(format!(
                "matrix has negative eigenvalue {min:.3e}"
            )));
        }
    }
    Ok(spectral_map(&values, &vectors, |lambda| lambda.max(0.0).sqrt()))
}

/// Conjugate transpose.
pub fn adjoint(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|z| z.conj())
}

/// Unitary dilation of a contraction `A` onto `num_qubits` wires.
///
/// `A` is zero-padded to `d = 2^(num_qubits-1)` and embedded as
/// `[[A, √(I-AA†)], [√(I-A†A), -A†]]`, so the first wire selects the block.
pub fn dilation(a: &Array2<Complex64>, num_qubits: u32) -> SimResult<Array2<Complex64>> {
    let d = num_qubits
        .checked_sub(1)
        .and_then(|k| 1usize.checked_shl(k))
        .ok_or_else(|| SimError::InvalidDilation(format!("no room in {num_qubits} qubits")))?;
    if a.nrows() > d || a.ncols() > d {
        return Err(SimError::InvalidDilation(format!(
            "{}x{} matrix does not fit a {d}x{d} block",
            a.nrows(),
            a.ncols()
        )));
    }

    let mut padded = Array2::<Complex64>::zeros((d, d));
    padded
        .slice_mut(s![..a.nrows(), ..a.ncols()])
        .assign(a);
    let a_dg = adjoint(&padded);
    let identity = Array2::<Complex64>::eye(d);

    let top_right = psd_sqrt(&(&identity - &padded.dot(&a_dg)))?;
    let bottom_left = psd_sqrt(&(&identity - &a_dg.dot(&padded)))?;

    let mut u = Array2::<Complex64>::zeros((2 * d, 2 * d));
    u.slice_mut(s![..d, ..d]).assign(&padded);
    u.slice_mut(s![..d, d..]).assign(&top_right);
    u.slice_mut(s![d.., ..d]).assign(&bottom_left);
    u.slice_mut(s![d.., d..]).assign(&a_dg.mapv(|z| -z));
    Ok(u)
}
