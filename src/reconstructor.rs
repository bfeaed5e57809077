use log::debug;
use nalgebra::{Complex, DMatrix, DVector};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::ReconstructionError;
use crate::spectral::{self, HermitianEigen};

const MAX_ESTIMATOR_DRAWS: usize = 1000;

/// Eigenvector-method reconstructor for noisy pairwise phase measurements.
///
/// Consumes the Hermitian matrix `C[i][j] = exp(i * M[i][j])` built from a
/// relative phase advance matrix `M`, decomposes it once at construction,
/// and recovers per-monitor absolute phases from the leading eigenvector
/// projected component-wise onto the unit circle.
#[derive(Debug, Clone)]
pub struct PhaseReconstructor {
    c_matrix: DMatrix<Complex<f64>>,
    eigen: HermitianEigen,
    space_dimension: usize,
}

impl PhaseReconstructor {
    /// Validates Hermitian-ness and caches the eigendecomposition. The check
    /// is a hard precondition: nothing is constructed when it fails.
    pub fn new(
        measurements_hermitian_matrix: DMatrix<Complex<f64>>,
    ) -> Result<Self, ReconstructionError> {
        if measurements_hermitian_matrix.is_empty() {
            return Err(ReconstructionError::EmptyInput);
        }
        debug!("checking that the measurement matrix is Hermitian");
        if !spectral::is_hermitian(&measurements_hermitian_matrix) {
            return Err(ReconstructionError::NonHermitianInput);
        }
        let eigen = HermitianEigen::decompose(&measurements_hermitian_matrix);
        let space_dimension = measurements_hermitian_matrix.nrows();
        Ok(Self {
            c_matrix: measurements_hermitian_matrix,
            eigen,
            space_dimension,
        })
    }

    pub fn c_matrix(&self) -> &DMatrix<Complex<f64>> {
        &self.c_matrix
    }

    /// Real eigenvalues of the Hermitian matrix, ascending.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigen.eigenvalues
    }

    /// Eigenvectors indexed so that vector k matches eigenvalue k.
    pub fn eigenvectors(&self) -> &[DVector<Complex<f64>>] {
        &self.eigen.eigenvectors
    }

    pub fn space_dimension(&self) -> usize {
        self.space_dimension
    }

    /// Non-negative part of the smallest eigenvalue. Spectrum shift used by
    /// the reconstructor matrix; noise is assumed already embedded in the
    /// measurements rather than modelled as a separate operator norm.
    pub fn alpha(&self) -> f64 {
        self.eigen.eigenvalues.first().copied().unwrap_or(0.0).max(0.0)
    }

    fn leading_index(&self) -> usize {
        let mut leading = 0;
        for (index, value) in self.eigen.eigenvalues.iter().enumerate() {
            if value.abs() > self.eigen.eigenvalues[leading].abs() {
                leading = index;
            }
        }
        leading
    }

    /// Eigenvalue of largest absolute value. Exact ties resolve to the
    /// lowest index in the ascending order.
    pub fn leading_eigenvalue(&self) -> f64 {
        self.eigen.eigenvalues[self.leading_index()]
    }

    pub fn leading_eigenvector(&self) -> &DVector<Complex<f64>> {
        &self.eigen.eigenvectors[self.leading_index()]
    }

    /// `C + alpha * I`, the shifted matrix of the published method.
    pub fn reconstructor_matrix(&self) -> DMatrix<Complex<f64>> {
        let identity =
            DMatrix::<Complex<f64>>::identity(self.space_dimension, self.space_dimension);
        &self.c_matrix + identity * Complex::new(self.alpha(), 0.0)
    }

    /// Component-wise projection of an eigenvector onto the unit circle.
    ///
    /// When a component has modulus exactly zero the element-wise division is
    /// undefined, and the method falls back to projecting through a random
    /// complex vector with standard-normal real and imaginary parts: the
    /// normalized inner product is broadcast to the full length. The redraw
    /// is capped rather than unbounded; exhausting the cap is a
    /// `DegenerateEstimator` error.
    pub fn eigenvector_estimator(
        &self,
        eigenvector: &DVector<Complex<f64>>,
    ) -> Result<DVector<Complex<f64>>, ReconstructionError> {
        if eigenvector.len() != self.space_dimension {
            return Err(ReconstructionError::DimensionMismatch {
                expected: self.space_dimension,
                found: eigenvector.len(),
            });
        }

        if eigenvector.iter().all(|component| component.norm() > 0.0) {
            return Ok(eigenvector.map(|component| component / component.norm()));
        }

        debug!("zero-modulus component encountered, falling back to randomized projection");
        let mut rng = rand::thread_rng();
        for _ in 0..MAX_ESTIMATOR_DRAWS {
            let random: DVector<Complex<f64>> = DVector::from_iterator(
                self.space_dimension,
                (0..self.space_dimension)
                    .map(|_| Complex::new(rng.sample(StandardNormal), rng.sample(StandardNormal))),
            );
            let projection = random.dot(eigenvector);
            if projection.norm() > 0.0 {
                let unit = projection / projection.norm();
                return Ok(DVector::from_element(self.space_dimension, unit));
            }
        }
        Err(ReconstructionError::DegenerateEstimator {
            attempts: MAX_ESTIMATOR_DRAWS,
        })
    }

    /// Complex-domain reconstruction: the estimator of the leading
    /// eigenvector. Entries are unit-modulus; their arguments are the
    /// recovered phases up to the global gauge of the eigenvector method.
    pub fn reconstruct_complex_phases_evm(
        &self,
    ) -> Result<DVector<Complex<f64>>, ReconstructionError> {
        self.eigenvector_estimator(self.leading_eigenvector())
    }
}
