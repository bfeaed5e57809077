use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use npsync::phase::wrapped_phase_error;
use npsync::{
    AngleUnit, MeasurementLoader, ReconstructionWorkflow, ReportWriter, SignalConfig,
    SignalSampler, WorkflowConfig,
};

const DATASET_ROOT: &str = "datasets";
const MEASUREMENT_FILE: &str = "measurements.json";
const REPORT_FILE: &str = "reconstruction.json";

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

fn parse_args() -> Result<Vec<String>> {
    let mut args = env::args().skip(1);
    let dataset = args.next();
    if let Some(extra) = args.next() {
        anyhow::bail!("Unexpected extra argument: {extra}");
    }

    if let Some(dataset) = dataset {
        return Ok(vec![dataset]);
    }

    let root = Path::new(DATASET_ROOT);
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(root).context("list datasets directory")?;
    let mut datasets: Vec<String> = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();
            if path.is_dir() && path.join(MEASUREMENT_FILE).is_file() {
                Some(entry.file_name().to_string_lossy().into_owned())
            } else {
                None
            }
        })
        .collect();
    datasets.sort();
    Ok(datasets)
}

fn main() -> Result<()> {
    init_logging();
    let datasets = parse_args()?;

    if datasets.is_empty() {
        info!("No datasets found under {DATASET_ROOT}, running synthetic self-test");
        return run_synthetic();
    }

    for dataset in &datasets {
        info!("Dataset {}: reconstruction start", dataset);
        run_dataset(dataset)?;
    }
    Ok(())
}

fn run_dataset(dataset: &str) -> Result<()> {
    let dataset_root = Path::new(DATASET_ROOT).join(dataset);
    let measurement_path = dataset_root.join(MEASUREMENT_FILE);
    let set = MeasurementLoader::from_path(&measurement_path)?;
    info!(
        "Dataset {}: {} monitors, measurements in {:?}",
        dataset,
        set.monitor_count(),
        set.unit
    );

    let config = WorkflowConfig::default();
    let output_unit = config.output_unit;
    let workflow = ReconstructionWorkflow::new(config, set);
    let summary = workflow
        .execute()
        .with_context(|| format!("reconstruct dataset {dataset}"))?;
    info!(
        "Dataset {}: eigendecomposition {:?}, total {:?}",
        dataset, summary.decomposition_duration, summary.total_duration
    );

    let report = summary.to_report(workflow.measurement_set(), output_unit);
    let report_path = report_destination(&dataset_root);
    ReportWriter::write_to_path(&report, &report_path)
        .with_context(|| format!("write report for dataset {dataset}"))?;
    info!("Dataset {}: report written to {:?}", dataset, report_path);
    Ok(())
}

fn run_synthetic() -> Result<()> {
    let signal_config = SignalConfig::default();
    info!(
        "Sampling {} monitors with {:.2} degree noise",
        signal_config.monitors, signal_config.noise_stdev
    );
    let signal = SignalSampler::sample(&signal_config).context("sample synthetic signal")?;
    let set = signal.to_measurement_set()?;

    let workflow = ReconstructionWorkflow::new(WorkflowConfig::default(), set);
    let summary = workflow.execute().context("reconstruct synthetic signal")?;

    let deg = signal.unit == AngleUnit::Degrees;
    let worst = summary
        .phases
        .iter()
        .zip(signal.truth.iter())
        .map(|(phase, truth)| wrapped_phase_error(*phase, *truth, deg))
        .fold(0.0f64, f64::max);
    info!(
        "Synthetic self-test: {} monitors, worst phase error {:.4} degrees, eigendecomposition {:?}",
        summary.stats.space_dimension, worst, summary.decomposition_duration
    );
    Ok(())
}

fn report_destination(dataset_root: &Path) -> PathBuf {
    dataset_root.join(REPORT_FILE)
}
