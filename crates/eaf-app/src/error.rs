//! Error types for the eaf-app service layer.

use std::path::PathBuf;

/// Application error type wrapping the backend crates' errors for the
/// run manager, batch runner and CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read config file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file: {path}")]
    ConfigFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config validation failed: {0}")]
    Validation(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("A run is already active: {run_id}")]
    RunActive { run_id: eaf_core::RunId },

    #[error("Simulation error: {0}")]
    Simulation(#[from] eaf_sim::SimError),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Control loop is not running")]
    ControlLoopDown,

    #[error("Command queue is full")]
    CommandQueueFull,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for eaf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<eaf_pipeline::PipelineError> for AppError {
    fn from(err: eaf_pipeline::PipelineError) -> Self {
        AppError::Pipeline(err.to_string())
    }
}

impl From<eaf_results::ResultsError> for AppError {
    fn from(err: eaf_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}
