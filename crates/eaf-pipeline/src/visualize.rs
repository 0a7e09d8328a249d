//! Chart and 3D render data derived from a run.

use std::collections::BTreeMap;

use eaf_core::SharedTelemetry;
use serde::{Deserialize, Serialize};

use eaf_sim::Snapshot;

use crate::error::StageError;
use crate::stage::{Stage, StageContext, StageOutput};

/// One chart: shared x axis (simulated seconds) and y data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series<Y> {
    pub x: Vec<f64>,
    pub y: Y,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Metal / Slag / Refractory temperatures (K)
    pub temperatures: Series<BTreeMap<String, Vec<f64>>>,
    /// Arc power (W)
    pub power: Series<Vec<f64>>,
    /// Carbon / Silicon content of the metal
    pub composition: Series<BTreeMap<String, Vec<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRender {
    pub position: [f64; 3],
    pub temperature: f64,
    /// RGB, 0..1
    pub color: [f64; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Highest metal temperature (K)
    pub max_temperature: f64,
    /// Lowest metal temperature (K)
    pub min_temperature: f64,
    /// Σ arc power × dt (J)
    pub total_energy: f64,
    pub average_power: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationData {
    pub time_series: TimeSeries,
    pub zone_data: BTreeMap<String, ZoneRender>,
    pub summary_stats: SummaryStats,
}

/// Zones drawn in the 3D view: key, position, colour.
const RENDERED_ZONES: [(&str, [f64; 3], [f64; 3]); 3] = [
    ("arc", [0.0, 0.0, 5.0], [1.0, 0.0, 0.0]),
    ("liquid_metal", [0.0, 0.0, 0.0], [0.8, 0.4, 0.0]),
    ("slag", [0.0, 0.0, 1.0], [0.6, 0.6, 0.6]),
];

fn column(snapshots: &[Snapshot], field: impl Fn(&Snapshot) -> f64) -> Vec<f64> {
    snapshots.iter().map(field).collect()
}

pub struct VisualizationStage {
    name: String,
    telemetry: SharedTelemetry,
}

impl VisualizationStage {
    pub fn new(telemetry: SharedTelemetry) -> Self {
        Self {
            name: crate::VISUALIZATION_STAGE.to_string(),
            telemetry,
        }
    }
}

impl Stage for VisualizationStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: &StageContext<'_>) -> Result<StageOutput, StageError> {
        let sim = ctx.simulation().ok_or(StageError::MissingInput {
            what: "simulation output",
        })?;
        let snapshots = &sim.results.snapshots;
        if snapshots.is_empty() {
            return Err(StageError::NoData);
        }
        self.telemetry.info(&self.name, "Generating visualization data");

        let x: Vec<f64> = snapshots.iter().map(|s| s.time_s).collect();
        let metal = column(snapshots, |s| s.metal_temperature_k);
        let power = column(snapshots, |s| s.arc_power_w);

        let time_series = TimeSeries {
            temperatures: Series {
                x: x.clone(),
                y: BTreeMap::from([
                    ("Metal".to_string(), metal.clone()),
                    ("Slag".to_string(), column(snapshots, |s| s.slag_temperature_k)),
                    ("Refractory".to_string(), column(snapshots, |s| s.refractory_temperature_k)),
                ]),
            },
            power: Series {
                x: x.clone(),
                y: power.clone(),
            },
            composition: Series {
                x,
                y: BTreeMap::from([
                    ("Carbon".to_string(), column(snapshots, |s| s.carbon_content)),
                    ("Silicon".to_string(), column(snapshots, |s| s.silicon_content)),
                ]),
            },
        };

        let zone_data = RENDERED_ZONES
            .iter()
            .filter_map(|(key, position, color)| {
                sim.results.zones.get(*key).map(|zone| {
                    (
                        key.to_string(),
                        ZoneRender {
                            position: *position,
                            temperature: zone.temperature,
                            color: *color,
                        },
                    )
                })
            })
            .collect();

        let summary_stats = SummaryStats {
            max_temperature: metal.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min_temperature: metal.iter().copied().fold(f64::INFINITY, f64::min),
            total_energy: power.iter().sum::<f64>() * sim.time_step_s,
            average_power: eaf_core::mean(&power),
        };

        Ok(StageOutput::Visualization(Box::new(VisualizationData {
            time_series,
            zone_data,
            summary_stats,
        })))
    }
}
