//! Fixed-step furnace engine.

use std::collections::BTreeMap;
use std::fmt;

use eaf_core::{SharedTelemetry, ensure_non_negative, ensure_positive};
use eaf_materials::MaterialCatalog;
use serde::{Deserialize, Serialize};

use crate::admission::{Admission, UnknownNamePolicy, admit};
use crate::balance::{EnergyBalance, MassBalance, energy_balance, mass_balance};
use crate::error::{SimError, SimResult};
use crate::params::{OperatingParameters, ParameterUpdate};
use crate::physics::{self, ArcPower};
use crate::results::{FinalState, SimulationResults, ZoneSummary};
use crate::snapshot::{Snapshot, SnapshotLog};
use crate::zone::{Zone, ZoneKind, ZoneSet};

const COMPONENT: &str = "engine";

/// Simulated seconds between progress log lines.
const PROGRESS_LOG_INTERVAL_S: f64 = 60.0;

/// Construction parameters for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Furnace capacity (tonnes)
    pub capacity_t: f64,
    /// Initial temperature of metal, slag and refractory (K)
    pub initial_temperature_k: f64,
    /// Fixed step size (s)
    pub time_step_s: f64,
    /// Run length (s)
    pub duration_s: f64,
    pub unknown_name_policy: UnknownNamePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity_t: 150.0,
            initial_temperature_k: eaf_core::AMBIENT_TEMPERATURE_K,
            time_step_s: 1.0,
            duration_s: 3600.0,
            unknown_name_policy: UnknownNamePolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.capacity_t, "capacity")?;
        ensure_positive(self.time_step_s, "time step")?;
        ensure_positive(self.initial_temperature_k, "initial temperature")?;
        ensure_non_negative(self.duration_s, "duration")?;
        Ok(())
    }
}

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Running,
    Completed,
    Stopped,
}

impl RunPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunPhase::Completed | RunPhase::Stopped)
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunPhase::Idle => "idle",
            RunPhase::Running => "running",
            RunPhase::Completed => "completed",
            RunPhase::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Electric arc furnace simulation for a single run.
pub struct SimulationEngine {
    config: EngineConfig,
    catalog: &'static MaterialCatalog,
    zones: ZoneSet,
    params: OperatingParameters,
    step_count: u64,
    phase: RunPhase,
    snapshots: SnapshotLog,
    telemetry: SharedTelemetry,
}

impl fmt::Debug for SimulationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationEngine")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("step_count", &self.step_count)
            .field("snapshots", &self.snapshots.len())
            .finish()
    }
}

impl SimulationEngine {
    /// Create an engine with nominal zones and default operating parameters.
    pub fn initialize(config: EngineConfig, telemetry: SharedTelemetry) -> SimResult<Self> {
        config.validate()?;
        let engine = Self {
            zones: ZoneSet::nominal(config.capacity_t, config.initial_temperature_k),
            config,
            catalog: MaterialCatalog::standard(),
            params: OperatingParameters::default(),
            step_count: 0,
            phase: RunPhase::Idle,
            snapshots: SnapshotLog::new(),
            telemetry,
        };
        engine.telemetry.info(
            COMPONENT,
            &format!(
                "EAF simulation engine initialized with capacity: {} tons",
                config.capacity_t
            ),
        );
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn time_step(&self) -> f64 {
        self.config.time_step_s
    }

    pub fn duration(&self) -> f64 {
        self.config.duration_s
    }

    /// Simulated time, exactly `step_count × time_step`.
    pub fn current_time(&self) -> f64 {
        self.step_count as f64 * self.config.time_step_s
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    /// Progress through the run in percent, capped at 100.
    pub fn progress_percentage(&self) -> f64 {
        if self.config.duration_s <= 0.0 {
            return 100.0;
        }
        (self.current_time() / self.config.duration_s * 100.0).min(100.0)
    }

    pub fn parameters(&self) -> &OperatingParameters {
        &self.params
    }

    pub fn zones(&self) -> &ZoneSet {
        &self.zones
    }

    pub fn zone(&self, kind: ZoneKind) -> &Zone {
        self.zones.get(kind)
    }

    pub fn snapshots(&self) -> &SnapshotLog {
        &self.snapshots
    }

    pub fn arc_power(&self) -> ArcPower {
        physics::arc_power(&self.params)
    }

    /// Replace the operating parameters. Takes effect on the next step.
    pub fn set_parameters(&mut self, params: OperatingParameters) {
        self.params = params;
        self.telemetry.info(COMPONENT, "Operating parameters updated");
    }

    /// Merge a partial update and return the resulting parameters.
    pub fn update_parameters(&mut self, update: &ParameterUpdate) -> &OperatingParameters {
        if !update.is_empty() {
            self.params = update.apply_to(&self.params);
            self.telemetry.info(
                COMPONENT,
                &format!(
                    "Operating parameters updated: {}",
                    update.changed_fields().join(", ")
                ),
            );
        }
        &self.params
    }

    /// Add `amount_kg` of a catalog material to the zone named by its key.
    ///
    /// Under [`UnknownNamePolicy::Ignore`] unknown names and invalid amounts
    /// leave the state untouched and return [`Admission::Ignored`].
    pub fn add_material(
        &mut self,
        material: &str,
        amount_kg: f64,
        zone: &str,
    ) -> SimResult<Admission> {
        let admission = admit(
            self.catalog,
            self.config.unknown_name_policy,
            material,
            amount_kg,
            zone,
        )?;
        match &admission {
            Admission::Accepted { zone: kind } => {
                self.zones.get_mut(*kind).charge(material, amount_kg);
                self.telemetry.info(
                    COMPONENT,
                    &format!("Added {amount_kg} kg of {material} to {zone}"),
                );
            }
            Admission::Ignored { reason } => {
                self.telemetry.warn(
                    COMPONENT,
                    &format!("Ignored addition of {material} to {zone}: {reason}"),
                );
            }
        }
        Ok(admission)
    }

    /// Move an idle engine into the running phase.
    ///
    /// A run whose duration is already reached completes immediately.
    pub fn start(&mut self) -> SimResult<()> {
        match self.phase {
            RunPhase::Idle => {
                self.phase = RunPhase::Running;
                self.telemetry.info(COMPONENT, "Starting EAF simulation");
                self.complete_if_due();
                Ok(())
            }
            RunPhase::Running => Ok(()),
            phase => Err(SimError::InvalidState {
                what: format!("cannot start a {phase} run"),
            }),
        }
    }

    /// Advance the simulation by exactly one time step.
    pub fn step(&mut self) -> SimResult<&Snapshot> {
        if self.phase == RunPhase::Idle {
            self.start()?;
        }
        if self.phase != RunPhase::Running {
            return Err(SimError::InvalidState {
                what: format!("cannot step a {} run", self.phase),
            });
        }

        let dt = self.config.time_step_s;
        let time_s = self.current_time();
        let power = physics::arc_power(&self.params);

        physics::distribute_heat(&mut self.zones, power.effective_w, dt);
        physics::oxidize(&mut self.zones, dt);
        if physics::update_phase(&mut self.zones, self.catalog.steel_reference()) {
            self.telemetry.info(
                COMPONENT,
                &format!("Metal bath reached melting point at {time_s}s"),
            );
        }
        physics::apply_feeds(&mut self.zones, &self.params, dt);

        let metal = self.zones.get(ZoneKind::LiquidMetal);
        let slag = self.zones.get(ZoneKind::Slag);
        let snapshot = Snapshot {
            step: self.step_count,
            time_s,
            arc_power_w: power.effective_w,
            metal_temperature_k: metal.temperature_k,
            slag_temperature_k: slag.temperature_k,
            refractory_temperature_k: self.zones.get(ZoneKind::Refractory).temperature_k,
            metal_mass_kg: metal.mass_kg,
            slag_mass_kg: slag.mass_kg,
            carbon_content: metal.material("C"),
            silicon_content: metal.material("Si"),
        };

        self.step_count += 1;
        let now = self.current_time();
        if (now / PROGRESS_LOG_INTERVAL_S).floor() > (time_s / PROGRESS_LOG_INTERVAL_S).floor() {
            self.telemetry
                .debug(COMPONENT, &format!("Simulation time: {now}s"));
        }
        self.complete_if_due();

        Ok(self.snapshots.push(snapshot))
    }

    /// Lazily step until the run completes or is stopped.
    pub fn steps(&mut self) -> Steps<'_> {
        Steps { engine: self }
    }

    /// Step to the end of the run and return the number of steps taken.
    pub fn run_to_completion(&mut self) -> SimResult<usize> {
        if self.phase.is_terminal() {
            return Err(SimError::InvalidState {
                what: format!("cannot run a {} run", self.phase),
            });
        }
        Ok(self.steps().count())
    }

    /// Halt the run. Repeated calls and calls on a finished run are no-ops.
    pub fn stop(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        self.phase = RunPhase::Stopped;
        self.telemetry.info(COMPONENT, "Simulation stopped by user");
    }

    /// Re-initialize to time zero with the same configuration.
    pub fn reset(&mut self) {
        self.zones = ZoneSet::nominal(self.config.capacity_t, self.config.initial_temperature_k);
        self.step_count = 0;
        self.phase = RunPhase::Idle;
        self.snapshots.clear();
        self.telemetry.debug(COMPONENT, "Engine reset");
    }

    pub fn energy_balance(&self) -> EnergyBalance {
        energy_balance(&self.zones, &self.params, self.config.time_step_s)
    }

    pub fn mass_balance(&self) -> MassBalance {
        mass_balance(&self.zones)
    }

    /// Snapshots plus end-of-run aggregates.
    pub fn results(&self) -> SimulationResults {
        let metal = self.zones.get(ZoneKind::LiquidMetal);
        let slag = self.zones.get(ZoneKind::Slag);
        let total_energy_consumed = self
            .snapshots
            .iter()
            .map(|s| s.arc_power_w * self.config.time_step_s)
            .sum();

        let zones: BTreeMap<String, ZoneSummary> = self
            .zones
            .iter()
            .map(|z| {
                (
                    z.kind.key().to_string(),
                    ZoneSummary {
                        name: z.name.clone(),
                        temperature: z.temperature_k,
                        mass: z.mass_kg,
                        materials: z.materials.clone(),
                    },
                )
            })
            .collect();

        SimulationResults {
            snapshots: self.snapshots.as_slice().to_vec(),
            final_state: FinalState {
                metal_temperature: metal.temperature_k,
                slag_temperature: slag.temperature_k,
                metal_composition: metal.materials.clone(),
                slag_composition: slag.materials.clone(),
                total_energy_consumed,
                average_power: self.snapshots.average_power(),
            },
            zones,
        }
    }

    fn complete_if_due(&mut self) {
        if self.phase == RunPhase::Running && self.current_time() >= self.config.duration_s {
            self.phase = RunPhase::Completed;
            self.telemetry.info(COMPONENT, "EAF simulation completed");
        }
    }
}

/// Lazy snapshot sequence; see [`SimulationEngine::steps`].
pub struct Steps<'a> {
    engine: &'a mut SimulationEngine,
}

impl Iterator for Steps<'_> {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Snapshot> {
        if self.engine.phase.is_terminal() {
            return None;
        }
        self.engine.step().ok().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eaf_core::{RecordingTelemetry, TracingTelemetry};

    fn engine(config: EngineConfig) -> SimulationEngine {
        SimulationEngine::initialize(config, TracingTelemetry::shared()).unwrap()
    }

    fn short_run(steps: u32) -> EngineConfig {
        EngineConfig {
            duration_s: steps as f64,
            ..Default::default()
        }
    }

    #[test]
    fn invalid_config_creates_no_engine() {
        for config in [
            EngineConfig {
                capacity_t: 0.0,
                ..Default::default()
            },
            EngineConfig {
                time_step_s: -1.0,
                ..Default::default()
            },
            EngineConfig {
                duration_s: f64::NAN,
                ..Default::default()
            },
        ] {
            let err = SimulationEngine::initialize(config, TracingTelemetry::shared()).unwrap_err();
            assert!(matches!(err, SimError::Configuration { .. }));
        }
    }

    #[test]
    fn first_step_heats_metal_by_expected_amount() {
        let mut e = engine(short_run(10));
        let t0 = e.zone(ZoneKind::LiquidMetal).temperature_k;
        let snap = e.step().unwrap().clone();
        assert_eq!(snap.time_s, 0.0);
        assert!((snap.arc_power_w - 14_400.0).abs() < 1e-9);
        let dt = e.zone(ZoneKind::LiquidMetal).temperature_k - t0;
        assert!((dt - 8.4e-5).abs() < 1e-12);
        assert_eq!(e.zone(ZoneKind::Arc).temperature_k, 5000.0);
        assert_eq!(e.phase(), RunPhase::Running);
    }

    #[test]
    fn run_completes_at_duration() {
        let mut e = engine(short_run(5));
        assert_eq!(e.run_to_completion().unwrap(), 5);
        assert_eq!(e.phase(), RunPhase::Completed);
        assert_eq!(e.current_time(), 5.0);
        assert_eq!(e.snapshots().len(), 5);
        assert!(matches!(e.step(), Err(SimError::InvalidState { .. })));
        assert_eq!(e.steps().count(), 0);
    }

    #[test]
    fn zero_duration_run_completes_without_steps() {
        let mut e = engine(short_run(0));
        assert_eq!(e.steps().count(), 0);
        assert_eq!(e.phase(), RunPhase::Completed);
        assert!(e.snapshots().is_empty());
    }

    #[test]
    fn stop_is_idempotent_and_blocks_steps() {
        let mut e = engine(short_run(100));
        e.step().unwrap();
        e.stop();
        let time = e.current_time();
        let zones = e.zones().clone();
        e.stop();
        assert_eq!(e.phase(), RunPhase::Stopped);
        assert_eq!(e.current_time(), time);
        assert_eq!(e.zones(), &zones);
        assert!(e.step().is_err());
    }

    #[test]
    fn stop_after_completion_keeps_completed() {
        let mut e = engine(short_run(1));
        e.step().unwrap();
        e.stop();
        assert_eq!(e.phase(), RunPhase::Completed);
    }

    #[test]
    fn reset_restarts_sequence() {
        let mut e = engine(short_run(3));
        assert_eq!(e.steps().count(), 3);
        e.reset();
        assert_eq!(e.phase(), RunPhase::Idle);
        assert_eq!(e.current_time(), 0.0);
        assert_eq!(e.steps().count(), 3);
    }

    #[test]
    fn add_material_known_and_unknown() {
        let telemetry = RecordingTelemetry::new();
        let mut e = SimulationEngine::initialize(short_run(1), telemetry.clone()).unwrap();

        let out = e.add_material("lime", 25.0, "slag").unwrap();
        assert!(out.is_accepted());
        assert_eq!(e.zone(ZoneKind::Slag).mass_kg, 75.0);
        assert_eq!(e.zone(ZoneKind::Slag).material("lime"), 25.0);

        let before = e.zones().clone();
        let out = e.add_material("lime", 25.0, "roof").unwrap();
        assert!(!out.is_accepted());
        assert_eq!(e.zones(), &before);
        assert!(telemetry.contains("Ignored addition of lime to roof"));
    }

    #[test]
    fn reject_policy_surfaces_unknown_names() {
        let mut e = engine(EngineConfig {
            unknown_name_policy: UnknownNamePolicy::Reject,
            ..short_run(1)
        });
        let err = e.add_material("unobtanium", 1.0, "slag").unwrap_err();
        assert!(matches!(err, SimError::UnknownName { kind: "material", .. }));
    }

    #[test]
    fn update_parameters_merges_and_applies_next_step() {
        let mut e = engine(short_run(10));
        let merged = *e.update_parameters(&ParameterUpdate {
            arc_voltage: Some(800.0),
            ..Default::default()
        });
        assert_eq!(merged.arc_voltage, 800.0);
        assert_eq!(merged.arc_current, 50.0);
        let snap = e.step().unwrap();
        assert!((snap.arc_power_w - 28_800.0).abs() < 1e-9);
    }

    #[test]
    fn results_aggregate_power() {
        let mut e = engine(EngineConfig {
            time_step_s: 2.0,
            ..short_run(10)
        });
        e.run_to_completion().unwrap();
        let results = e.results();
        assert_eq!(results.snapshots.len(), 5);
        assert!((results.final_state.average_power - 14_400.0).abs() < 1e-9);
        assert!((results.final_state.total_energy_consumed - 144_000.0).abs() < 1e-6);
        assert_eq!(results.zones["slag"].name, "Slag Layer");
    }

    #[test]
    fn results_without_snapshots_have_zero_power() {
        let e = engine(short_run(10));
        let results = e.results();
        assert_eq!(results.final_state.average_power, 0.0);
        assert_eq!(results.final_state.total_energy_consumed, 0.0);
    }
}
