//! Stepping simulation engine for an electric arc furnace.
//!
//! Provides:
//! - Lumped zones (arc, liquid metal, slag, refractory) with mass and heat state
//! - Operating parameter snapshots with field-wise merge
//! - Fixed-step engine with arc heating, oxidation, phase change and feed additions
//! - Append-only snapshot log and end-of-run aggregates
//! - Energy and mass balance diagnostics

pub mod admission;
pub mod balance;
pub mod engine;
pub mod error;
pub mod params;
pub mod physics;
pub mod results;
pub mod snapshot;
pub mod zone;

// Re-exports for public API
pub use admission::{Admission, IgnoreReason, UnknownNamePolicy};
pub use balance::{EnergyBalance, MassBalance, energy_balance, mass_balance};
pub use engine::{EngineConfig, RunPhase, SimulationEngine, Steps};
pub use error::{SimError, SimResult};
pub use params::{OperatingParameters, ParameterUpdate};
pub use physics::ArcPower;
pub use results::{FinalState, SimulationResults, ZoneSummary};
pub use snapshot::{Snapshot, SnapshotLog};
pub use zone::{Zone, ZoneKind, ZoneSet};
