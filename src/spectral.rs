use std::cmp::Ordering;

use nalgebra::{Complex, DMatrix, DVector, SymmetricEigen};

const HERMITIAN_RTOL: f64 = 1e-5;
const HERMITIAN_ATOL: f64 = 1e-8;

/// Element-wise comparison of the matrix against its conjugate transpose
/// under the usual floating-point tolerances. Non-square matrices are never
/// Hermitian.
pub fn is_hermitian(matrix: &DMatrix<Complex<f64>>) -> bool {
    if matrix.nrows() != matrix.ncols() {
        return false;
    }
    let adjoint = matrix.adjoint();
    matrix
        .iter()
        .zip(adjoint.iter())
        .all(|(a, b)| (a - b).norm() <= HERMITIAN_ATOL + HERMITIAN_RTOL * b.norm())
}

/// Eigendecomposition of a Hermitian matrix, sorted so that eigenvector k
/// corresponds to eigenvalue k and eigenvalues ascend.
#[derive(Debug, Clone)]
pub struct HermitianEigen {
    pub eigenvalues: Vec<f64>,
    pub eigenvectors: Vec<DVector<Complex<f64>>>,
}

impl HermitianEigen {
    pub fn decompose(matrix: &DMatrix<Complex<f64>>) -> Self {
        let eigen = SymmetricEigen::new(matrix.clone());
        let mut pairs: Vec<(f64, DVector<Complex<f64>>)> = eigen
            .eigenvalues
            .iter()
            .copied()
            .zip(
                eigen
                    .eigenvectors
                    .column_iter()
                    .map(|column| column.into_owned()),
            )
            .collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let mut eigenvalues = Vec::with_capacity(pairs.len());
        let mut eigenvectors = Vec::with_capacity(pairs.len());
        for (value, vector) in pairs {
            eigenvalues.push(value);
            eigenvectors.push(vector);
        }
        Self {
            eigenvalues,
            eigenvectors,
        }
    }

    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }

    /// Rebuilds `V * diag(eigenvalues) * V^H` from the stored pairs.
    pub fn reconstruct(&self) -> DMatrix<Complex<f64>> {
        let n = self.len();
        let mut accumulated = DMatrix::<Complex<f64>>::zeros(n, n);
        for (value, vector) in self.eigenvalues.iter().zip(&self.eigenvectors) {
            accumulated += vector * vector.adjoint() * Complex::new(*value, 0.0);
        }
        accumulated
    }
}
