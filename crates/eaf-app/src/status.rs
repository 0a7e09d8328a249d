//! Request and response types for the run manager.

use std::collections::BTreeMap;

use eaf_core::RunId;
use eaf_sim::{
    EngineConfig, OperatingParameters, ParameterUpdate, RunPhase, SimulationEngine, Snapshot,
    ZoneKind,
};
use serde::{Deserialize, Serialize};

use crate::config::SimulatorConfig;
use crate::control::RunSettings;

/// Parameters for a new real-time run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartRequest {
    /// Tonnes
    pub furnace_capacity: f64,
    /// Seconds
    pub simulation_duration: f64,
    /// Seconds
    pub time_step: f64,
    pub arc_voltage: f64,
    pub arc_current: f64,
    pub power_factor: f64,
    /// Full parameter set applied before the first step. The arc fields
    /// above take precedence over the matching fields here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<OperatingParameters>,
}

impl Default for StartRequest {
    fn default() -> Self {
        Self {
            furnace_capacity: 150.0,
            simulation_duration: 3600.0,
            time_step: 1.0,
            arc_voltage: 400.0,
            arc_current: 50.0,
            power_factor: 0.8,
            parameters: None,
        }
    }
}

impl StartRequest {
    pub(crate) fn engine_config(&self, settings: &RunSettings) -> EngineConfig {
        EngineConfig {
            capacity_t: self.furnace_capacity,
            initial_temperature_k: settings.initial_temperature_k,
            time_step_s: self.time_step,
            duration_s: self.simulation_duration,
            unknown_name_policy: settings.unknown_name_policy,
        }
    }

    /// Parameters the run starts with.
    pub(crate) fn initial_parameters(&self) -> OperatingParameters {
        let arc = ParameterUpdate {
            arc_voltage: Some(self.arc_voltage),
            arc_current: Some(self.arc_current),
            power_factor: Some(self.power_factor),
            ..Default::default()
        };
        arc.apply_to(&self.parameters.unwrap_or_default())
    }
}

impl From<&SimulatorConfig> for StartRequest {
    fn from(config: &SimulatorConfig) -> Self {
        Self {
            furnace_capacity: config.furnace_capacity,
            simulation_duration: config.simulation_duration,
            time_step: config.time_step,
            arc_voltage: config.operating_parameters.arc_voltage,
            arc_current: config.operating_parameters.arc_current,
            power_factor: config.operating_parameters.power_factor,
            parameters: Some(config.operating_parameters),
        }
    }
}

/// Acknowledgement of a stop request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopAck {
    pub run_id: RunId,
    pub phase: RunPhase,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStatus {
    pub is_running: bool,
    pub current_time: f64,
    pub total_duration: f64,
    pub progress_percentage: f64,
    /// Metal temperature (K)
    pub current_temperature: f64,
    /// Effective arc power (W)
    pub current_power: f64,
}

impl RunStatus {
    pub(crate) fn of(engine: &SimulationEngine) -> Self {
        Self {
            is_running: engine.is_running(),
            current_time: engine.current_time(),
            total_duration: engine.duration(),
            progress_percentage: engine.progress_percentage(),
            current_temperature: engine.zone(ZoneKind::LiquidMetal).temperature_k,
            current_power: engine.arc_power().effective_w,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneStatus {
    pub name: String,
    pub temperature: f64,
    pub mass: f64,
    pub materials: BTreeMap<String, f64>,
}

impl ZoneStatus {
    pub(crate) fn all(engine: &SimulationEngine) -> Vec<Self> {
        engine
            .zones()
            .iter()
            .map(|z| Self {
                name: z.name.clone(),
                temperature: z.temperature_k,
                mass: z.mass_kg,
                materials: z.materials.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

/// Most recent snapshots plus totals for the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryWindow {
    pub data: Vec<Snapshot>,
    pub total_points: usize,
    /// `None` before the first step
    pub time_range: Option<TimeRange>,
}

impl HistoryWindow {
    pub const DEFAULT_LIMIT: usize = 100;

    pub(crate) fn of(engine: &SimulationEngine, limit: usize) -> Self {
        let log = engine.snapshots();
        let all = log.as_slice();
        let time_range = match (all.first(), all.last()) {
            (Some(first), Some(last)) => Some(TimeRange {
                start: first.time_s,
                end: last.time_s,
            }),
            _ => None,
        };
        Self {
            data: log.tail(limit).to_vec(),
            total_points: log.len(),
            time_range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arc_fields_override_supplied_parameters() {
        let request = StartRequest {
            arc_voltage: 500.0,
            parameters: Some(OperatingParameters {
                arc_voltage: 300.0,
                carbon_injection_rate: 0.0,
                ..Default::default()
            }),
            ..Default::default()
        };
        let params = request.initial_parameters();
        assert_eq!(params.arc_voltage, 500.0);
        assert_eq!(params.carbon_injection_rate, 0.0);
    }

    #[test]
    fn config_request_carries_feed_rates() {
        let mut config = SimulatorConfig::example();
        config.operating_parameters.lime_addition_rate = 0.2;
        let request = StartRequest::from(&config);
        assert_eq!(request.initial_parameters(), config.operating_parameters);
    }
}
