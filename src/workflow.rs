use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, info};
use ndarray::Array1;

use crate::dataset::{MeasurementSet, ReconstructionReport};
use crate::measurement::{hermitian_from_measurements, AngleUnit};
use crate::phase::{align_to_reference, complex_to_phase_values};
use crate::reconstructor::PhaseReconstructor;

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Unit of the reported phases.
    pub output_unit: AngleUnit,
    /// Apply `abs()` to the converted phases, resolving the global sign
    /// ambiguity of the eigenvector method the way downstream consumers do.
    pub absolute: bool,
    /// Monitor whose phase is gauged to zero before conversion. `None`
    /// keeps the raw eigenvector gauge.
    pub reference_monitor: Option<usize>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            output_unit: AngleUnit::Degrees,
            absolute: true,
            reference_monitor: Some(0),
        }
    }
}

/// Single-shot reconstruction pipeline over one measurement set: build the
/// Hermitian matrix, decompose, project the leading eigenvector, convert to
/// phase values.
pub struct ReconstructionWorkflow {
    config: WorkflowConfig,
    set: MeasurementSet,
}

#[derive(Debug, Clone)]
pub struct ReconstructionStats {
    pub space_dimension: usize,
    pub alpha: f64,
    pub leading_eigenvalue: f64,
    pub spectral_radius: f64,
}

pub struct ReconstructionSummary {
    pub phases: Array1<f64>,
    pub stats: ReconstructionStats,
    pub decomposition_duration: Duration,
    pub total_duration: Duration,
}

impl ReconstructionWorkflow {
    pub fn new(config: WorkflowConfig, set: MeasurementSet) -> Self {
        Self { config, set }
    }

    pub fn measurement_set(&self) -> &MeasurementSet {
        &self.set
    }

    pub fn execute(&self) -> Result<ReconstructionSummary> {
        let total_start = Instant::now();
        debug!(
            "building Hermitian matrix from {} monitors",
            self.set.monitor_count()
        );
        let c_matrix = hermitian_from_measurements(&self.set.matrix, self.set.unit);

        let decomposition_start = Instant::now();
        let reconstructor =
            PhaseReconstructor::new(c_matrix).context("construct phase reconstructor")?;
        let decomposition_duration = decomposition_start.elapsed();

        let estimator = reconstructor
            .reconstruct_complex_phases_evm()
            .context("project leading eigenvector")?;
        let estimator = match self.config.reference_monitor {
            Some(reference) => align_to_reference(&estimator, reference)
                .context("align estimator to reference monitor")?,
            None => estimator,
        };

        let deg = self.config.output_unit == AngleUnit::Degrees;
        let mut phases = complex_to_phase_values(&estimator, deg);
        if self.config.absolute {
            phases.mapv_inplace(f64::abs);
        }

        let stats = ReconstructionStats {
            space_dimension: reconstructor.space_dimension(),
            alpha: reconstructor.alpha(),
            leading_eigenvalue: reconstructor.leading_eigenvalue(),
            spectral_radius: reconstructor.leading_eigenvalue().abs(),
        };
        let total_duration = total_start.elapsed();
        info!(
            "reconstructed {} phases (leading eigenvalue {:.3}, alpha {:.3}) in {:?}",
            stats.space_dimension, stats.leading_eigenvalue, stats.alpha, total_duration
        );

        Ok(ReconstructionSummary {
            phases,
            stats,
            decomposition_duration,
            total_duration,
        })
    }
}

impl ReconstructionSummary {
    pub fn to_report(&self, set: &MeasurementSet, unit: AngleUnit) -> ReconstructionReport {
        ReconstructionReport {
            monitors: set.monitors.clone(),
            unit,
            phases: self.phases.to_vec(),
            space_dimension: self.stats.space_dimension,
            alpha: self.stats.alpha,
            leading_eigenvalue: self.stats.leading_eigenvalue,
        }
    }
}
