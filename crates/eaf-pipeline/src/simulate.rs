//! Batch simulation stage.

use std::time::Instant;

use eaf_core::SharedTelemetry;
use eaf_sim::{EnergyBalance, MassBalance, SimulationEngine, SimulationResults};
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::error::StageError;
use crate::stage::{Stage, StageContext, StageOutput};

#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutput {
    #[serde(flatten)]
    pub results: SimulationResults,
    pub energy_balance: EnergyBalance,
    pub mass_balance: MassBalance,
    pub time_step_s: f64,
    /// Wall-clock time spent stepping (s)
    pub execution_time: f64,
}

/// Runs the engine to completion without pacing.
pub struct SimulationStage {
    name: String,
    config: PipelineConfig,
    telemetry: SharedTelemetry,
}

impl SimulationStage {
    pub fn new(config: PipelineConfig, telemetry: SharedTelemetry) -> Self {
        Self {
            name: crate::SIMULATION_STAGE.to_string(),
            config,
            telemetry,
        }
    }
}

impl Stage for SimulationStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, _ctx: &StageContext<'_>) -> Result<StageOutput, StageError> {
        let mut engine = SimulationEngine::initialize(self.config.engine, self.telemetry.clone())?;
        engine.set_parameters(self.config.parameters);
        for charge in &self.config.initial_charge {
            engine.add_material(&charge.material, charge.amount_kg, &charge.zone)?;
        }

        let started = Instant::now();
        let steps = engine.run_to_completion()?;
        let execution_time = started.elapsed().as_secs_f64();
        self.telemetry.info(
            &self.name,
            &format!("Simulation finished: {steps} steps in {execution_time:.3}s"),
        );

        Ok(StageOutput::Simulation(Box::new(SimulationOutput {
            results: engine.results(),
            energy_balance: engine.energy_balance(),
            mass_balance: engine.mass_balance(),
            time_step_s: engine.time_step(),
            execution_time,
        })))
    }
}
