//! Batch execution: run the standard pipeline and persist its artifacts.

use std::path::Path;

use eaf_core::SharedTelemetry;
use eaf_pipeline::{Pipeline, PipelineReport};
use eaf_results::{ArtifactStore, SavedArtifacts, fingerprint};

use crate::config::SimulatorConfig;
use crate::error::AppResult;

/// What a batch run produced.
#[derive(Debug)]
pub struct BatchOutcome {
    pub report: PipelineReport,
    /// `None` when no output directory was given
    pub artifacts: Option<SavedArtifacts>,
}

/// Run simulation, logging and visualization for `config`.
///
/// Stage failures do not fail the batch; they are recorded in the report
/// and in the written summary.
pub fn run_batch(
    config: &SimulatorConfig,
    output_dir: Option<&Path>,
    telemetry: SharedTelemetry,
) -> AppResult<BatchOutcome> {
    config.validate()?;

    let pipeline = Pipeline::standard(config.pipeline_config(), telemetry);
    let report = pipeline.execute();
    tracing::info!(
        pipeline = pipeline.name(),
        succeeded = report.is_success(),
        elapsed_s = report.metadata.total_execution_time,
        "batch run finished"
    );

    let artifacts = match output_dir {
        Some(dir) => {
            let store = ArtifactStore::new(dir.to_path_buf())?;
            let saved = store.save_report(&report, Some(fingerprint(config)?))?;
            tracing::info!(dir = %dir.display(), "artifacts written");
            Some(saved)
        }
        None => None,
    };

    Ok(BatchOutcome { report, artifacts })
}
