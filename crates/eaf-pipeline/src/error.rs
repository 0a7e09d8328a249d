//! Error types for the pipeline.

use thiserror::Error;

/// Failure of a single stage. Recorded in the report, never propagated.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("missing input: {what}")]
    MissingInput { what: &'static str },

    #[error("simulation produced no data")]
    NoData,

    #[error("simulation failed: {0}")]
    Simulation(#[from] eaf_sim::SimError),

    #[error("{0}")]
    Failed(String),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("duplicate stage name: {name}")]
    DuplicateStage { name: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
