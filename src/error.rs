use thiserror::Error;

/// Failures surfaced by the phase reconstruction core.
#[derive(Debug, Error)]
pub enum ReconstructionError {
    #[error("measurement matrix must be Hermitian")]
    NonHermitianInput,
    #[error("measurement matrix must not be empty")]
    EmptyInput,
    #[error("vector has length {found}, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("degenerate eigenvector: no non-zero projection after {attempts} random draws")]
    DegenerateEstimator { attempts: usize },
}
