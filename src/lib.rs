pub mod dataset;
pub mod error;
pub mod measurement;
pub mod phase;
pub mod reconstructor;
pub mod sampling;
pub mod spectral;
pub mod workflow;

pub use dataset::{
    DatasetLoader, MeasurementLoader, MeasurementSet, ReconstructionReport, ReportWriter,
};
pub use error::ReconstructionError;
pub use measurement::{AngleUnit, MeasurementMatrix};
pub use reconstructor::PhaseReconstructor;
pub use sampling::{SignalConfig, SignalSampler, SyntheticSignal};
pub use spectral::HermitianEigen;
pub use workflow::{
    ReconstructionStats, ReconstructionSummary, ReconstructionWorkflow, WorkflowConfig,
};
