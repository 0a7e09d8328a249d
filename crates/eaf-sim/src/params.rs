//! Operating parameter snapshots.

use serde::{Deserialize, Serialize};

/// Control inputs applied to the furnace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatingParameters {
    /// Arc voltage (V)
    pub arc_voltage: f64,
    /// Arc current (A)
    pub arc_current: f64,
    /// Power factor (0..1)
    pub power_factor: f64,
    /// Electrode position (m from top)
    pub electrode_position: f64,
    /// Oxygen lancing (m³/s)
    pub oxygen_flow_rate: f64,
    /// Carbon injection (kg/s)
    pub carbon_injection_rate: f64,
    /// Lime addition (kg/s)
    pub lime_addition_rate: f64,
    /// Dolomite addition (kg/s)
    pub dolomite_addition_rate: f64,
}

impl Default for OperatingParameters {
    fn default() -> Self {
        Self {
            arc_voltage: 400.0,
            arc_current: 50.0,
            power_factor: 0.8,
            electrode_position: 2.0,
            oxygen_flow_rate: 0.5,
            carbon_injection_rate: 0.1,
            lime_addition_rate: 0.05,
            dolomite_addition_rate: 0.03,
        }
    }
}

/// Partial update; unset fields keep their previous value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arc_voltage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arc_current: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electrode_position: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oxygen_flow_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbon_injection_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lime_addition_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dolomite_addition_rate: Option<f64>,
}

impl ParameterUpdate {
    fn fields(&self) -> [(&'static str, Option<f64>); 8] {
        [
            ("arc_voltage", self.arc_voltage),
            ("arc_current", self.arc_current),
            ("power_factor", self.power_factor),
            ("electrode_position", self.electrode_position),
            ("oxygen_flow_rate", self.oxygen_flow_rate),
            ("carbon_injection_rate", self.carbon_injection_rate),
            ("lime_addition_rate", self.lime_addition_rate),
            ("dolomite_addition_rate", self.dolomite_addition_rate),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, v)| v.is_none())
    }

    /// Names of the fields this update sets.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        self.fields()
            .iter()
            .filter(|(_, v)| v.is_some())
            .map(|(name, _)| *name)
            .collect()
    }

    /// Merge into `base` field by field.
    pub fn apply_to(&self, base: &OperatingParameters) -> OperatingParameters {
        OperatingParameters {
            arc_voltage: self.arc_voltage.unwrap_or(base.arc_voltage),
            arc_current: self.arc_current.unwrap_or(base.arc_current),
            power_factor: self.power_factor.unwrap_or(base.power_factor),
            electrode_position: self.electrode_position.unwrap_or(base.electrode_position),
            oxygen_flow_rate: self.oxygen_flow_rate.unwrap_or(base.oxygen_flow_rate),
            carbon_injection_rate: self
                .carbon_injection_rate
                .unwrap_or(base.carbon_injection_rate),
            lime_addition_rate: self.lime_addition_rate.unwrap_or(base.lime_addition_rate),
            dolomite_addition_rate: self
                .dolomite_addition_rate
                .unwrap_or(base.dolomite_addition_rate),
        }
    }
}
