//! Ordered stage execution with degraded continuation.

use std::time::Instant;

use eaf_core::SharedTelemetry;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logger::{DataLoggerStage, LogOutput};
use crate::simulate::{SimulationOutput, SimulationStage};
use crate::stage::{Stage, StageContext, StageOutcome, StageOutput};
use crate::visualize::{VisualizationData, VisualizationStage};

const COMPONENT: &str = "pipeline";

#[derive(Debug, Clone)]
pub struct StageRecord {
    pub name: String,
    pub outcome: StageOutcome,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineMetadata {
    pub name: String,
    pub stages_executed: Vec<String>,
    /// Wall-clock seconds for the whole pipeline
    pub total_execution_time: f64,
}

/// Per-stage outcomes in execution order plus run metadata.
///
/// Serializes as `{ <stage>: output | {"error": msg}, ..., "pipeline_metadata": {...} }`.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub stages: Vec<StageRecord>,
    pub metadata: PipelineMetadata,
}

impl PipelineReport {
    pub fn outcome(&self, name: &str) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .find(|r| r.name == name)
            .map(|r| &r.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.stages
            .iter()
            .filter_map(|r| r.outcome.error().map(|e| (r.name.as_str(), e)))
    }

    pub fn is_success(&self) -> bool {
        self.stages.iter().all(|r| r.outcome.is_completed())
    }

    pub fn simulation(&self) -> Option<&SimulationOutput> {
        self.stages.iter().find_map(|r| match &r.outcome {
            StageOutcome::Completed(StageOutput::Simulation(sim)) => Some(sim.as_ref()),
            _ => None,
        })
    }

    pub fn log(&self) -> Option<&LogOutput> {
        self.stages.iter().find_map(|r| match &r.outcome {
            StageOutcome::Completed(StageOutput::Log(log)) => Some(log),
            _ => None,
        })
    }

    pub fn visualization(&self) -> Option<&VisualizationData> {
        self.stages.iter().find_map(|r| match &r.outcome {
            StageOutcome::Completed(StageOutput::Visualization(viz)) => Some(viz.as_ref()),
            _ => None,
        })
    }

    pub fn to_json(&self) -> PipelineResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Serialize for PipelineReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.stages.len() + 1))?;
        for record in &self.stages {
            map.serialize_entry(&record.name, &record.outcome)?;
        }
        map.serialize_entry("pipeline_metadata", &self.metadata)?;
        map.end()
    }
}

pub struct Pipeline {
    name: String,
    stages: Vec<Box<dyn Stage>>,
    telemetry: SharedTelemetry,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, telemetry: SharedTelemetry) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            telemetry,
        }
    }

    /// simulate -> log -> visualize
    pub fn standard(config: PipelineConfig, telemetry: SharedTelemetry) -> Self {
        let name = config.name.clone();
        let log_interval_s = config.log_interval_s;
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(SimulationStage::new(config, telemetry.clone())),
            Box::new(DataLoggerStage::new(telemetry.clone()).with_interval(log_interval_s)),
            Box::new(VisualizationStage::new(telemetry.clone())),
        ];
        Self {
            name,
            stages,
            telemetry,
        }
    }

    /// Append a stage. Stage names must be unique.
    pub fn with_stage(mut self, stage: Box<dyn Stage>) -> PipelineResult<Self> {
        if self.stages.iter().any(|s| s.name() == stage.name()) {
            return Err(PipelineError::DuplicateStage {
                name: stage.name().to_string(),
            });
        }
        self.stages.push(stage);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in order. Stage failures are recorded, not returned.
    pub fn execute(&self) -> PipelineReport {
        let started = Instant::now();
        let mut records: Vec<StageRecord> = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let name = stage.name().to_string();
            let span = tracing::info_span!("stage", stage = %name);
            let _enter = span.enter();

            let outcome = match stage.execute(&StageContext::new(&records)) {
                Ok(output) => StageOutcome::Completed(output),
                Err(err) => {
                    self.telemetry
                        .error(COMPONENT, &format!("Stage '{name}' failed: {err}"));
                    StageOutcome::Failed {
                        error: err.to_string(),
                    }
                }
            };
            records.push(StageRecord { name, outcome });
        }

        let metadata = PipelineMetadata {
            name: self.name.clone(),
            stages_executed: records.iter().map(|r| r.name.clone()).collect(),
            total_execution_time: started.elapsed().as_secs_f64(),
        };
        self.telemetry.info(
            COMPONENT,
            &format!(
                "Pipeline '{}' finished {} stages ({} failed)",
                self.name,
                records.len(),
                records.iter().filter(|r| !r.outcome.is_completed()).count()
            ),
        );

        PipelineReport {
            stages: records,
            metadata,
        }
    }
}
