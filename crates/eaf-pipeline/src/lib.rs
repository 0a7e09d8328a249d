//! Batch pipeline: simulate, log, visualize.
//!
//! Stages run in a fixed order and see the outcomes of earlier stages. A
//! failing stage is recorded in the report and later stages still run.

pub mod config;
pub mod error;
pub mod logger;
pub mod pipeline;
pub mod simulate;
pub mod stage;
pub mod visualize;

pub use config::{MaterialCharge, PipelineConfig};
pub use error::{PipelineError, PipelineResult, StageError};
pub use logger::{DataLoggerStage, LogEntry, LogOutput};
pub use pipeline::{Pipeline, PipelineMetadata, PipelineReport, StageRecord};
pub use simulate::{SimulationOutput, SimulationStage};
pub use stage::{Stage, StageContext, StageOutcome, StageOutput};
pub use visualize::{Series, SummaryStats, TimeSeries, VisualizationData, VisualizationStage, ZoneRender};

/// Stage names used by [`Pipeline::standard`].
pub const SIMULATION_STAGE: &str = "simulation";
pub const LOGGING_STAGE: &str = "logging";
pub const VISUALIZATION_STAGE: &str = "visualization";
