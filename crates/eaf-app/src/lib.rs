//! Service layer for the furnace simulator.
//!
//! Frontends use this crate for two things: batch runs through the standard
//! pipeline ([`run_batch`]) and live runs driven by a background control
//! thread ([`RunManager`]) that broadcasts JSON payloads to observers.

pub mod alerts;
pub mod batch;
pub mod broadcast;
pub mod config;
mod control;
pub mod error;
pub mod payload;
pub mod run_manager;
pub mod status;

pub use alerts::{Alert, AlertThresholds};
pub use batch::{BatchOutcome, run_batch};
pub use broadcast::{BroadcastManager, BroadcastReport, ChannelObserver, Observer, ObserverError};
pub use config::{
    MaterialsConfig, MonitoringConfig, RealtimeConfig, SimulatorConfig, StartPolicy,
};
pub use control::RunSettings;
pub use error::{AppError, AppResult};
pub use payload::{ParameterSummary, Payload, SimulationData};
pub use run_manager::RunManager;
pub use status::{HistoryWindow, RunStatus, StartRequest, StopAck, TimeRange, ZoneStatus};
