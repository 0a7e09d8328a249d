//! Data logging stage.

use eaf_core::SharedTelemetry;
use eaf_sim::Snapshot;
use serde::Serialize;

use crate::error::StageError;
use crate::stage::{Stage, StageContext, StageOutput};

/// One logged snapshot with the wall-clock time it was logged.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// ISO-8601 wall-clock time
    pub timestamp: String,
    pub simulation_time: f64,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogOutput {
    pub logged_points: usize,
    pub data: Vec<LogEntry>,
}

pub struct DataLoggerStage {
    name: String,
    interval_s: Option<f64>,
    telemetry: SharedTelemetry,
}

impl DataLoggerStage {
    pub fn new(telemetry: SharedTelemetry) -> Self {
        Self {
            name: crate::LOGGING_STAGE.to_string(),
            interval_s: None,
            telemetry,
        }
    }

    /// Log one point per `interval_s` simulated seconds.
    pub fn with_interval(mut self, interval_s: Option<f64>) -> Self {
        self.interval_s = interval_s;
        self
    }

    fn stride(&self, time_step_s: f64) -> usize {
        match self.interval_s {
            Some(interval) if interval.is_finite() && time_step_s > 0.0 => {
                (interval / time_step_s).round().max(1.0) as usize
            }
            _ => 1,
        }
    }
}

impl Stage for DataLoggerStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: &StageContext<'_>) -> Result<StageOutput, StageError> {
        let sim = ctx.simulation().ok_or(StageError::MissingInput {
            what: "simulation output",
        })?;
        let snapshots = &sim.results.snapshots;
        let stride = self.stride(sim.time_step_s);
        self.telemetry.info(
            &self.name,
            &format!("Logging {} data points", snapshots.len().div_ceil(stride)),
        );

        let data: Vec<LogEntry> = snapshots
            .iter()
            .step_by(stride)
            .map(|s| LogEntry {
                timestamp: chrono::Utc::now().to_rfc3339(),
                simulation_time: s.time_s,
                snapshot: s.clone(),
            })
            .collect();

        Ok(StageOutput::Log(LogOutput {
            logged_points: data.len(),
            data,
        }))
    }
}
