use anyhow::{anyhow, Result};
use nalgebra::{Complex, DMatrix};
use rand::Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    Radians,
    Degrees,
}

impl AngleUnit {
    pub fn to_radians(self, value: f64) -> f64 {
        match self {
            AngleUnit::Radians => value,
            AngleUnit::Degrees => value.to_radians(),
        }
    }

    pub fn from_radians(self, value: f64) -> f64 {
        match self {
            AngleUnit::Radians => value,
            AngleUnit::Degrees => value.to_degrees(),
        }
    }
}

/// Square matrix of pairwise relative phase advances, row-major.
///
/// Entry (i, j) holds the measured advance from monitor i to monitor j. The
/// measurement convention puts zeros on the diagonal and makes the matrix
/// anti-symmetric; noise on real data may violate anti-symmetry slightly, so
/// neither property is enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementMatrix {
    pub size: usize,
    pub data: Vec<f64>,
}

impl MeasurementMatrix {
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        if size == 0 {
            return Err(anyhow!("Measurement matrix must have at least one row"));
        }
        let mut data = Vec::with_capacity(size * size);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(anyhow!(
                    "Row {} has {} entries, expected {}",
                    index,
                    row.len(),
                    size
                ));
            }
            if let Some(value) = row.iter().find(|value| !value.is_finite()) {
                return Err(anyhow!("Row {} contains non-finite entry {}", index, value));
            }
            data.extend(row);
        }
        Ok(Self { size, data })
    }

    /// Deltas matrix of a known signal: entry (i, j) is `values[i] - values[j]`.
    pub fn from_phase_values(values: &[f64]) -> Self {
        let size = values.len();
        if size == 0 {
            return Self {
                size: 0,
                data: Vec::new(),
            };
        }
        let mut data = vec![0.0; size * size];
        data.par_chunks_mut(size).enumerate().for_each(|(i, row)| {
            for (j, slot) in row.iter_mut().enumerate() {
                *slot = values[i] - values[j];
            }
        });
        Self { size, data }
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.size + col]
    }

    pub fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_row_slice(self.size, self.size, &self.data)
    }

    pub fn add(&self, other: &MeasurementMatrix) -> Result<MeasurementMatrix> {
        if self.size != other.size {
            return Err(anyhow!(
                "Cannot add measurement matrices of orders {} and {}",
                self.size,
                other.size
            ));
        }
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a + b)
            .collect();
        Ok(MeasurementMatrix {
            size: self.size,
            data,
        })
    }
}

/// Zero-mean Gaussian noise matrix with exact anti-symmetry: the strict upper
/// triangle is drawn independently and mirrored with opposite sign.
pub fn antisymmetric_gaussian_noise<R: Rng>(
    size: usize,
    stdev: f64,
    rng: &mut R,
) -> MeasurementMatrix {
    let mut data = vec![0.0; size * size];
    for i in 0..size {
        for j in (i + 1)..size {
            let draw: f64 = rng.sample(StandardNormal);
            let value = stdev * draw;
            data[i * size + j] = value;
            data[j * size + i] = -value;
        }
    }
    MeasurementMatrix { size, data }
}

/// Element-wise `C[i][j] = exp(i * M[i][j])` with the measurements converted
/// to radians first. Anti-symmetric input with zero diagonal yields a
/// Hermitian matrix with unit diagonal.
pub fn hermitian_from_measurements(
    measurements: &MeasurementMatrix,
    unit: AngleUnit,
) -> DMatrix<Complex<f64>> {
    let size = measurements.size;
    if size == 0 {
        return DMatrix::zeros(0, 0);
    }
    let mut data = vec![Complex::new(0.0, 0.0); size * size];
    data.par_chunks_mut(size).enumerate().for_each(|(i, row)| {
        for (j, slot) in row.iter_mut().enumerate() {
            let angle = unit.to_radians(measurements.data[i * size + j]);
            *slot = Complex::from_polar(1.0, angle);
        }
    });
    DMatrix::from_row_slice(size, size, &data)
}
