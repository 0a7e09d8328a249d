//! Stage contract and per-stage outcomes.

use serde::Serialize;

use crate::error::StageError;
use crate::logger::LogOutput;
use crate::pipeline::StageRecord;
use crate::simulate::SimulationOutput;
use crate::visualize::VisualizationData;

/// One step of a pipeline.
pub trait Stage: Send + Sync {
    /// Key under which the outcome is reported.
    fn name(&self) -> &str;

    fn execute(&self, ctx: &StageContext<'_>) -> Result<StageOutput, StageError>;
}

/// Output of a successful stage.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StageOutput {
    Simulation(Box<SimulationOutput>),
    Log(LogOutput),
    Visualization(Box<VisualizationData>),
}

/// Recorded result of one stage: its output or `{ "error": message }`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StageOutcome {
    Completed(StageOutput),
    Failed { error: String },
}

impl StageOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StageOutcome::Completed(_))
    }

    pub fn output(&self) -> Option<&StageOutput> {
        match self {
            StageOutcome::Completed(out) => Some(out),
            StageOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            StageOutcome::Completed(_) => None,
            StageOutcome::Failed { error } => Some(error),
        }
    }
}

/// Read-only view of the stages that ran before the current one.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    previous: &'a [StageRecord],
}

impl<'a> StageContext<'a> {
    pub fn new(previous: &'a [StageRecord]) -> Self {
        Self { previous }
    }

    pub fn outcome(&self, name: &str) -> Option<&'a StageOutcome> {
        self.previous
            .iter()
            .find(|r| r.name == name)
            .map(|r| &r.outcome)
    }

    /// Most recent successful simulation output, if any.
    pub fn simulation(&self) -> Option<&'a SimulationOutput> {
        self.previous.iter().rev().find_map(|r| match &r.outcome {
            StageOutcome::Completed(StageOutput::Simulation(sim)) => Some(sim.as_ref()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_outcome_serializes_as_error_object() {
        let outcome = StageOutcome::Failed {
            error: "boom".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "boom" }));
    }

    #[test]
    fn context_lookups_on_empty_history() {
        let ctx = StageContext::new(&[]);
        assert!(ctx.simulation().is_none());
        assert!(ctx.outcome("simulation").is_none());
    }
}
