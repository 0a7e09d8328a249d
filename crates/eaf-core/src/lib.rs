//! eaf-core: stable foundation for the EAF simulator.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers)
//! - ids (run and connection identifiers)
//! - telemetry (logging collaborator passed into engines and stages)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod telemetry;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
pub use telemetry::{
    Level, RecordingTelemetry, SharedTelemetry, Telemetry, TelemetryEntry, TracingTelemetry,
};
pub use units::*;
