use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use npsync::phase::wrapped_phase_error;
use npsync::{
    AngleUnit, DatasetLoader, MeasurementLoader, ReconstructionWorkflow, ReportWriter,
    SignalConfig, SignalSampler, WorkflowConfig,
};

fn temp_path(name: &str) -> PathBuf {
    let epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let mut path = std::env::temp_dir();
    path.push(format!("npsync_{}_{}.json", name, epoch));
    path
}

#[test]
fn smoke_runs_end_to_end() {
    let measurements = r#"
    {
        "monitors": ["bpm.r1", "bpm.r2", "bpm.r3", "bpm.r4"],
        "unit": "radians",
        "matrix": [
            [0.0, 1.0, 2.0, 3.0],
            [-1.0, 0.0, 1.0, 2.0],
            [-2.0, -1.0, 0.0, 1.0],
            [-3.0, -2.0, -1.0, 0.0]
        ]
    }
    "#;

    let measurement_path = temp_path("measurements");
    fs::write(&measurement_path, measurements).expect("write measurement set");

    let set = MeasurementLoader::from_path(&measurement_path).expect("load measurement set");
    assert_eq!(set.monitor_count(), 4);

    let workflow = ReconstructionWorkflow::new(WorkflowConfig::default(), set);
    let summary = workflow.execute().expect("workflow execution");

    assert_eq!(summary.phases.len(), 4);
    assert_eq!(summary.stats.space_dimension, 4);
    assert!(summary.stats.spectral_radius > 0.0);
    assert!(
        summary.total_duration >= Duration::from_millis(0),
        "total duration should be non-negative"
    );
    assert!(
        summary.decomposition_duration <= summary.total_duration,
        "decomposition is part of the total"
    );

    let report = summary.to_report(workflow.measurement_set(), AngleUnit::Degrees);
    let report_path = temp_path("report");
    ReportWriter::write_to_path(&report, &report_path).expect("write report");
    let json = fs::read_to_string(&report_path).expect("read report back");
    let parsed: npsync::ReconstructionReport = serde_json::from_str(&json).expect("parse report");
    assert_eq!(parsed.monitors, report.monitors);
    assert_eq!(parsed.phases.len(), 4);

    let _ = fs::remove_file(measurement_path);
    let _ = fs::remove_file(report_path);
}

#[test]
fn synthetic_signal_runs_through_workflow() {
    let signal = SignalSampler::sample(&SignalConfig {
        monitors: 64,
        noise_stdev: 0.5,
        seed: Some(42),
        ..SignalConfig::default()
    })
    .expect("sample signal");
    let set = signal.to_measurement_set().expect("measurement set");

    let workflow = ReconstructionWorkflow::new(WorkflowConfig::default(), set);
    let summary = workflow.execute().expect("workflow execution");

    assert_eq!(summary.phases.len(), 64);
    for (phase, truth) in summary.phases.iter().zip(signal.truth.iter()) {
        let error = wrapped_phase_error(*phase, *truth, true);
        assert!(
            error <= 2.0,
            "reconstructed {:.4} vs truth {:.4} (error {:.4})",
            phase,
            truth,
            error
        );
    }
}

#[test]
fn dataset_loader_resolves_relative_paths() {
    let measurements = r#"
    {
        "monitors": ["m1", "m2"],
        "unit": "degrees",
        "matrix": [
            [0.0, 20.0],
            [-20.0, 0.0]
        ]
    }
    "#;
    let epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let root = std::env::temp_dir().join(format!("npsync_datasets_{epoch}"));
    fs::create_dir_all(&root).expect("create dataset root");
    fs::write(root.join("measurements.json"), measurements).expect("write measurement set");

    let loader = DatasetLoader::new(&root);
    let set = loader.load("measurements.json").expect("load measurement set");
    assert_eq!(set.monitor_count(), 2);
    assert_eq!(set.unit, AngleUnit::Degrees);

    let _ = fs::remove_dir_all(root);
}

#[test]
fn workflow_surfaces_loader_failures() {
    let broken = r#"
    {
        "monitors": ["a", "b", "c"],
        "unit": "degrees",
        "matrix": [
            [0.0, 1.0],
            [-1.0, 0.0]
        ]
    }
    "#;
    let path = temp_path("broken");
    fs::write(&path, broken).expect("write broken set");
    assert!(MeasurementLoader::from_path(&path).is_err());
    let _ = fs::remove_file(path);
}
