//! Simulator configuration file (YAML).

use std::fs;
use std::path::Path;

use eaf_core::AMBIENT_TEMPERATURE_K;
use eaf_pipeline::PipelineConfig;
use eaf_sim::{EngineConfig, OperatingParameters, UnknownNamePolicy};
use serde::{Deserialize, Serialize};

use crate::alerts::AlertThresholds;
use crate::error::{AppError, AppResult};

/// What `start` does while another run is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPolicy {
    #[default]
    RejectIfActive,
    /// Stop the active run and start the new one.
    Supersede,
}

/// Material inventory on hand (tonnes).
///
/// The metal bath is sized from `furnace_capacity` alone; these amounts
/// are never charged into it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialsConfig {
    pub initial_scrap: f64,
    pub initial_dri: f64,
    pub lime_reserve: f64,
    pub dolomite_reserve: f64,
}

impl Default for MaterialsConfig {
    fn default() -> Self {
        Self {
            initial_scrap: 100.0,
            initial_dri: 50.0,
            lime_reserve: 10.0,
            dolomite_reserve: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Simulated seconds between logged points
    pub log_interval: f64,
    /// Simulated seconds between result saves
    pub save_interval: f64,
    pub alert_thresholds: AlertThresholds,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_interval: 1.0,
            save_interval: 60.0,
            alert_thresholds: AlertThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// Wall-clock seconds per simulated second; 0 runs unpaced
    pub pacing_factor: f64,
    pub heartbeat_interval_s: f64,
    pub start_policy: StartPolicy,
    pub unknown_name_policy: UnknownNamePolicy,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            pacing_factor: 1.0,
            heartbeat_interval_s: 1.0,
            start_policy: StartPolicy::default(),
            unknown_name_policy: UnknownNamePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Tonnes
    pub furnace_capacity: f64,
    /// Seconds
    pub simulation_duration: f64,
    /// Seconds
    pub time_step: f64,
    /// Kelvin
    pub initial_temperature: f64,
    pub operating_parameters: OperatingParameters,
    pub materials: MaterialsConfig,
    pub monitoring: MonitoringConfig,
    pub realtime: RealtimeConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            furnace_capacity: 150.0,
            simulation_duration: 3600.0,
            time_step: 1.0,
            initial_temperature: AMBIENT_TEMPERATURE_K,
            operating_parameters: OperatingParameters::default(),
            materials: MaterialsConfig::default(),
            monitoring: MonitoringConfig::default(),
            realtime: RealtimeConfig::default(),
        }
    }
}

impl SimulatorConfig {
    /// The configuration written by `example-config`.
    pub fn example() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_yaml(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| AppError::ConfigFileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml_string(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save_yaml(&self, path: &Path) -> AppResult<()> {
        let content = self.to_yaml_string()?;
        fs::write(path, content).map_err(|source| AppError::ConfigFileWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> AppResult<()> {
        let mut problems = Vec::new();
        if !(self.furnace_capacity.is_finite() && self.furnace_capacity > 0.0) {
            problems.push("furnace_capacity must be > 0");
        }
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            problems.push("time_step must be > 0");
        }
        if !(self.simulation_duration.is_finite() && self.simulation_duration >= 0.0) {
            problems.push("simulation_duration must be >= 0");
        }
        if !(self.initial_temperature.is_finite() && self.initial_temperature > 0.0) {
            problems.push("initial_temperature must be > 0");
        }
        if !(self.realtime.pacing_factor.is_finite() && self.realtime.pacing_factor >= 0.0) {
            problems.push("realtime.pacing_factor must be >= 0");
        }
        if !(self.realtime.heartbeat_interval_s.is_finite()
            && self.realtime.heartbeat_interval_s > 0.0)
        {
            problems.push("realtime.heartbeat_interval_s must be > 0");
        }
        let m = &self.materials;
        if [m.initial_scrap, m.initial_dri, m.lime_reserve, m.dolomite_reserve]
            .iter()
            .any(|v| !(v.is_finite() && *v >= 0.0))
        {
            problems.push("material amounts must be >= 0");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(problems.join("; ")))
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            capacity_t: self.furnace_capacity,
            initial_temperature_k: self.initial_temperature,
            time_step_s: self.time_step,
            duration_s: self.simulation_duration,
            unknown_name_policy: self.realtime.unknown_name_policy,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            parameters: self.operating_parameters,
            log_interval_s: Some(self.monitoring.log_interval),
            ..PipelineConfig::new(self.engine_config())
        }
    }
}
