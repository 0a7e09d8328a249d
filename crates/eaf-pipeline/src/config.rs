//! Inputs for a batch run.

use eaf_sim::{EngineConfig, OperatingParameters};
use serde::{Deserialize, Serialize};

/// A material added before the first step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialCharge {
    pub material: String,
    pub amount_kg: f64,
    pub zone: String,
}

impl MaterialCharge {
    pub fn new(material: impl Into<String>, amount_kg: f64, zone: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            amount_kg,
            zone: zone.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub engine: EngineConfig,
    pub parameters: OperatingParameters,
    #[serde(default)]
    pub initial_charge: Vec<MaterialCharge>,
    /// Simulated seconds between logged points; every snapshot when unset
    #[serde(default)]
    pub log_interval_s: Option<f64>,
}

impl PipelineConfig {
    pub fn new(engine: EngineConfig) -> Self {
        Self {
            name: "EAF_Simulation_Pipeline".to_string(),
            engine,
            parameters: OperatingParameters::default(),
            initial_charge: Vec::new(),
            log_interval_s: None,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
