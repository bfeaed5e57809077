use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::measurement::{AngleUnit, MeasurementMatrix};

const DEFAULT_ROOT: &str = "datasets";

/// On-disk JSON model of a measurement set. Unknown attributes are kept
/// alongside the recognised fields so files survive a load/write cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMeasurementSet {
    pub monitors: Vec<String>,
    pub unit: AngleUnit,
    pub matrix: Vec<Vec<f64>>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Validated in-memory measurement set: labelled monitors plus the pairwise
/// relative phase advance matrix between them.
#[derive(Debug, Clone)]
pub struct MeasurementSet {
    pub monitors: Vec<String>,
    pub monitor_lookup: IndexMap<String, usize>,
    pub unit: AngleUnit,
    pub matrix: MeasurementMatrix,
    pub extra: IndexMap<String, Value>,
}

impl MeasurementSet {
    pub fn new(monitors: Vec<String>, unit: AngleUnit, matrix: MeasurementMatrix) -> Result<Self> {
        if monitors.is_empty() {
            return Err(anyhow!("Measurement set must name at least one monitor"));
        }
        if matrix.size != monitors.len() {
            return Err(anyhow!(
                "Matrix order {} does not match monitor count {}",
                matrix.size,
                monitors.len()
            ));
        }
        let mut monitor_lookup = IndexMap::new();
        for (index, monitor) in monitors.iter().enumerate() {
            if monitor_lookup.insert(monitor.clone(), index).is_some() {
                return Err(anyhow!("Duplicate monitor label '{}'", monitor));
            }
        }
        Ok(Self {
            monitors,
            monitor_lookup,
            unit,
            matrix,
            extra: IndexMap::new(),
        })
    }

    pub fn monitor_count(&self) -> usize {
        self.monitors.len()
    }

    pub fn resolve_monitor(&self, label: &str) -> Option<usize> {
        self.monitor_lookup.get(label).copied()
    }
}

/// Turns JSON representations into validated measurement sets.
#[derive(Debug, Default)]
pub struct MeasurementLoader;

impl MeasurementLoader {
    pub fn from_json_str(json: &str) -> Result<MeasurementSet> {
        let raw: RawMeasurementSet = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<MeasurementSet> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Self::from_json_str(&buf)
    }

    pub fn from_path(path: &Path) -> Result<MeasurementSet> {
        let file =
            File::open(path).with_context(|| format!("open measurement file {:?}", path))?;
        Self::from_reader(file)
            .with_context(|| format!("parse measurement file {:?}", path))
    }

    fn from_raw(raw: RawMeasurementSet) -> Result<MeasurementSet> {
        if raw.matrix.len() != raw.monitors.len() {
            return Err(anyhow!(
                "Matrix has {} rows but {} monitors are named",
                raw.matrix.len(),
                raw.monitors.len()
            ));
        }
        let matrix = MeasurementMatrix::from_rows(raw.matrix)?;
        let mut set = MeasurementSet::new(raw.monitors, raw.unit, matrix)?;
        set.extra = raw.extra;
        Ok(set)
    }
}

/// Reconstruction result in exportable form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructionReport {
    pub monitors: Vec<String>,
    pub unit: AngleUnit,
    pub phases: Vec<f64>,
    pub space_dimension: usize,
    pub alpha: f64,
    pub leading_eigenvalue: f64,
}

/// Helper for exporting reconstruction reports as JSON files.
pub struct ReportWriter;

impl ReportWriter {
    pub fn to_json_string(report: &ReconstructionReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    pub fn write_to_path(report: &ReconstructionReport, path: &Path) -> Result<()> {
        let json = Self::to_json_string(report)?;
        let mut file =
            File::create(path).with_context(|| format!("create report file {:?}", path))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("write report file {:?}", path))?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DatasetLoader {
    root: PathBuf,
}

impl DatasetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn load(&self, relative: impl AsRef<Path>) -> Result<MeasurementSet> {
        let path = self.root.join(relative);
        MeasurementLoader::from_path(&path)
            .with_context(|| format!("load measurement set from {:?}", path))
    }
}
