//! Per-step snapshots and the append-only run log.

use serde::{Deserialize, Serialize};

/// Observable state recorded once per step.
///
/// `time_s` is the simulated time at the start of the step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub step: u64,
    pub time_s: f64,
    /// Effective arc power delivered to the zones (W)
    pub arc_power_w: f64,
    pub metal_temperature_k: f64,
    pub slag_temperature_k: f64,
    pub refractory_temperature_k: f64,
    pub metal_mass_kg: f64,
    pub slag_mass_kg: f64,
    pub carbon_content: f64,
    pub silicon_content: f64,
}

/// Ordered, append-only history of snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotLog {
    entries: Vec<Snapshot>,
}

impl SnapshotLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, snapshot: Snapshot) -> &Snapshot {
        self.entries.push(snapshot);
        &self.entries[self.entries.len() - 1]
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn as_slice(&self) -> &[Snapshot] {
        &self.entries
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.entries.last()
    }

    /// The most recent `n` snapshots in order (all if fewer).
    pub fn tail(&self, n: usize) -> &[Snapshot] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.entries.iter()
    }

    /// Mean recorded arc power (W), 0.0 for an empty log.
    pub fn average_power(&self) -> f64 {
        let powers: Vec<f64> = self.entries.iter().map(|s| s.arc_power_w).collect();
        eaf_core::mean(&powers)
    }
}
