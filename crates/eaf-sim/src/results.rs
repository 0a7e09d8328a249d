//! End-of-run aggregates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;

/// Final zone state in summary form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSummary {
    pub name: String,
    pub temperature: f64,
    pub mass: f64,
    pub materials: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalState {
    pub metal_temperature: f64,
    pub slag_temperature: f64,
    pub metal_composition: BTreeMap<String, f64>,
    pub slag_composition: BTreeMap<String, f64>,
    /// Σ arc power · dt over all snapshots (J)
    pub total_energy_consumed: f64,
    /// Mean arc power over all snapshots (W), 0 with no snapshots
    pub average_power: f64,
}

/// Full results of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    pub snapshots: Vec<Snapshot>,
    pub final_state: FinalState,
    /// Zone key -> summary
    pub zones: BTreeMap<String, ZoneSummary>,
}

impl SimulationResults {
    pub fn last_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }
}
