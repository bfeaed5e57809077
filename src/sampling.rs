use anyhow::{anyhow, Result};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::dataset::MeasurementSet;
use crate::measurement::{antisymmetric_gaussian_noise, AngleUnit, MeasurementMatrix};

#[derive(Debug, Clone)]
pub struct SignalConfig {
    pub monitors: usize,
    pub low: f64,
    pub high: f64,
    pub noise_stdev: f64,
    pub unit: AngleUnit,
    pub seed: Option<u64>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        // 1 degree is above the worst pairwise noise observed on real
        // machines, so recovery under the default is the pessimistic case.
        Self {
            monitors: 250,
            low: 0.0,
            high: 80.0,
            noise_stdev: 1.0,
            unit: AngleUnit::Degrees,
            seed: None,
        }
    }
}

/// Ground-truth phases plus the noisy measurement matrix derived from them.
#[derive(Debug, Clone)]
pub struct SyntheticSignal {
    pub truth: Vec<f64>,
    pub measurements: MeasurementMatrix,
    pub unit: AngleUnit,
}

impl SyntheticSignal {
    /// Wraps the measurements as a labelled set ready for the workflow.
    pub fn to_measurement_set(&self) -> Result<MeasurementSet> {
        let monitors = (0..self.truth.len())
            .map(|index| format!("bpm.{index:04}"))
            .collect();
        MeasurementSet::new(monitors, self.unit, self.measurements.clone())
    }
}

/// Generates synthetic signals for self-tests and benchmarks: sorted uniform
/// ground-truth phases with the first monitor pinned to zero, their deltas
/// matrix, and anti-symmetric Gaussian noise on top.
pub struct SignalSampler;

impl SignalSampler {
    pub fn sample(config: &SignalConfig) -> Result<SyntheticSignal> {
        if config.monitors < 2 {
            return Err(anyhow!("Requested monitor count must be at least two"));
        }
        if config.high <= config.low {
            return Err(anyhow!(
                "Phase range [{}, {}] is empty",
                config.low,
                config.high
            ));
        }
        if config.noise_stdev < 0.0 {
            return Err(anyhow!("Noise standard deviation must be non-negative"));
        }

        let seed = config.seed.unwrap_or_else(random_seed);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

        let mut truth: Vec<f64> = (0..config.monitors)
            .map(|_| rng.gen_range(config.low..config.high))
            .collect();
        truth.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        truth[0] = 0.0;

        let mut measurements = MeasurementMatrix::from_phase_values(&truth);
        if config.noise_stdev > 0.0 {
            let noise =
                antisymmetric_gaussian_noise(config.monitors, config.noise_stdev, &mut rng);
            measurements = measurements.add(&noise)?;
        }

        Ok(SyntheticSignal {
            truth,
            measurements,
            unit: config.unit,
        })
    }
}

fn random_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampled_signal_is_sorted_and_anchored() {
        let signal = SignalSampler::sample(&SignalConfig {
            monitors: 32,
            seed: Some(11),
            ..SignalConfig::default()
        })
        .expect("sample signal");
        assert_eq!(signal.truth.len(), 32);
        assert_eq!(signal.truth[0], 0.0);
        for pair in signal.truth.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        assert_eq!(signal.measurements.size, 32);
    }

    #[test]
    fn sampling_is_deterministic_under_a_seed() {
        let config = SignalConfig {
            monitors: 12,
            seed: Some(99),
            ..SignalConfig::default()
        };
        let first = SignalSampler::sample(&config).expect("sample");
        let second = SignalSampler::sample(&config).expect("sample");
        assert_eq!(first.truth, second.truth);
        assert_eq!(first.measurements, second.measurements);
    }

    #[test]
    fn noiseless_config_reproduces_exact_deltas() {
        let signal = SignalSampler::sample(&SignalConfig {
            monitors: 8,
            noise_stdev: 0.0,
            seed: Some(3),
            ..SignalConfig::default()
        })
        .expect("sample");
        for i in 0..8 {
            for j in 0..8 {
                let expected = signal.truth[i] - signal.truth[j];
                assert!((signal.measurements.get(i, j) - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn rejects_degenerate_configs() {
        assert!(SignalSampler::sample(&SignalConfig {
            monitors: 1,
            ..SignalConfig::default()
        })
        .is_err());
        assert!(SignalSampler::sample(&SignalConfig {
            high: 0.0,
            ..SignalConfig::default()
        })
        .is_err());
        assert!(SignalSampler::sample(&SignalConfig {
            noise_stdev: -0.5,
            ..SignalConfig::default()
        })
        .is_err());
    }

    #[test]
    fn measurement_set_labels_every_monitor() {
        let signal = SignalSampler::sample(&SignalConfig {
            monitors: 5,
            seed: Some(4),
            ..SignalConfig::default()
        })
        .expect("sample");
        let set = signal.to_measurement_set().expect("measurement set");
        assert_eq!(set.monitor_count(), 5);
        assert_eq!(set.resolve_monitor("bpm.0003"), Some(3));
    }
}
