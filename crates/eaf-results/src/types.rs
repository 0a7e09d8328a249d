//! Persisted summary types.

use eaf_pipeline::{PipelineReport, SummaryStats};
use eaf_sim::FinalState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub name: String,
    pub stages_executed: Vec<String>,
    pub total_execution_time: f64,
    /// RFC 3339 time the artifacts were written
    pub created_at: String,
    /// SHA-256 of the run configuration, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_fingerprint: Option<String>,
}

/// Contents of `results_summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsSummary {
    pub pipeline_metadata: RunMetadata,
    /// Absent when the simulation stage failed
    pub final_state: Option<FinalState>,
    /// Absent when the visualization stage failed
    pub summary_stats: Option<SummaryStats>,
    /// Stage name -> error message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stage_errors: Vec<(String, String)>,
}

impl ResultsSummary {
    pub fn from_report(report: &PipelineReport, config_fingerprint: Option<String>) -> Self {
        Self {
            pipeline_metadata: RunMetadata {
                name: report.metadata.name.clone(),
                stages_executed: report.metadata.stages_executed.clone(),
                total_execution_time: report.metadata.total_execution_time,
                created_at: chrono::Utc::now().to_rfc3339(),
                config_fingerprint,
            },
            final_state: report.simulation().map(|s| s.results.final_state.clone()),
            summary_stats: report.visualization().map(|v| v.summary_stats),
            stage_errors: report
                .failures()
                .map(|(stage, err)| (stage.to_string(), err.to_string()))
                .collect(),
        }
    }
}
