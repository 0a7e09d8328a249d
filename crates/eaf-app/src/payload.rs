//! JSON messages pushed to observers.

use std::collections::BTreeMap;

use eaf_sim::{OperatingParameters, SimulationEngine};
use serde::{Deserialize, Serialize};

/// Operating parameters shown to observers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSummary {
    pub arc_voltage: f64,
    pub arc_current: f64,
    pub power_factor: f64,
    pub electrode_position: f64,
}

impl From<&OperatingParameters> for ParameterSummary {
    fn from(p: &OperatingParameters) -> Self {
        Self {
            arc_voltage: p.arc_voltage,
            arc_current: p.arc_current,
            power_factor: p.power_factor,
            electrode_position: p.electrode_position,
        }
    }
}

/// Live view of a running engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationData {
    pub timestamp: String,
    pub simulation_time: f64,
    /// Zone key -> temperature (K)
    pub zone_temperatures: BTreeMap<String, f64>,
    pub operating_parameters: ParameterSummary,
    /// Effective arc power (W)
    pub current_power: f64,
}

impl SimulationData {
    /// State at the engine's current time.
    pub fn from_engine(engine: &SimulationEngine) -> Self {
        Self::at_step(engine, engine.current_time())
    }

    /// State right after a step, stamped with the step's start time so the
    /// stream lines up with the snapshot log.
    pub fn at_step(engine: &SimulationEngine, simulation_time: f64) -> Self {
        Self {
            timestamp: now(),
            simulation_time,
            zone_temperatures: engine.zones().temperatures(),
            operating_parameters: engine.parameters().into(),
            current_power: engine.arc_power().effective_w,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    SimulationData(SimulationData),
    Heartbeat {
        timestamp: String,
        simulation_running: bool,
    },
    ConnectionStatus {
        status: String,
        timestamp: String,
        message: String,
    },
}

impl Payload {
    pub fn heartbeat(simulation_running: bool) -> Self {
        Payload::Heartbeat {
            timestamp: now(),
            simulation_running,
        }
    }

    pub fn connected() -> Self {
        Payload::ConnectionStatus {
            status: "connected".to_string(),
            timestamp: now(),
            message: "Observer connected successfully".to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Payload::SimulationData(_) => "simulation_data",
            Payload::Heartbeat { .. } => "heartbeat",
            Payload::ConnectionStatus { .. } => "connection_status",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eaf_core::TracingTelemetry;
    use eaf_sim::EngineConfig;

    #[test]
    fn simulation_data_is_tagged_and_flat() {
        let engine =
            SimulationEngine::initialize(EngineConfig::default(), TracingTelemetry::shared())
                .unwrap();
        let payload = Payload::SimulationData(SimulationData::from_engine(&engine));
        let json: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "simulation_data");
        assert_eq!(json["simulation_time"], 0.0);
        assert_eq!(json["zone_temperatures"]["arc"], 5000.0);
        assert_eq!(json["operating_parameters"]["arc_voltage"], 400.0);
        assert!(json["operating_parameters"].get("oxygen_flow_rate").is_none());
        assert!((json["current_power"].as_f64().unwrap() - 14_400.0).abs() < 1e-9);
    }

    #[test]
    fn heartbeat_and_status_shapes() {
        let hb: serde_json::Value =
            serde_json::from_str(&Payload::heartbeat(false).to_json().unwrap()).unwrap();
        assert_eq!(hb["type"], "heartbeat");
        assert_eq!(hb["simulation_running"], false);
        assert!(hb["timestamp"].is_string());

        let status = Payload::connected();
        assert_eq!(status.kind(), "connection_status");
        let json: serde_json::Value = serde_json::from_str(&status.to_json().unwrap()).unwrap();
        assert_eq!(json["status"], "connected");
    }
}
