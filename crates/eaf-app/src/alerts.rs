//! Operating limit checks on recorded snapshots.

use eaf_sim::Snapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// Metal temperature ceiling (K)
    pub max_temperature: f64,
    /// Metal temperature floor (K)
    pub min_temperature: f64,
    /// Arc power ceiling (W)
    pub max_power: f64,
    /// Carbon content floor
    pub min_carbon: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            max_temperature: 2000.0,
            min_temperature: 298.0,
            max_power: 100_000.0,
            min_carbon: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alert {
    TemperatureHigh { value: f64, limit: f64 },
    TemperatureLow { value: f64, limit: f64 },
    PowerHigh { value: f64, limit: f64 },
    CarbonLow { value: f64, limit: f64 },
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alert::TemperatureHigh { value, limit } => {
                write!(f, "metal temperature {value:.1} K above {limit} K")
            }
            Alert::TemperatureLow { value, limit } => {
                write!(f, "metal temperature {value:.1} K below {limit} K")
            }
            Alert::PowerHigh { value, limit } => write!(f, "arc power {value:.0} W above {limit} W"),
            Alert::CarbonLow { value, limit } => write!(f, "carbon content {value} below {limit}"),
        }
    }
}

impl AlertThresholds {
    /// All limits the snapshot breaches.
    pub fn evaluate(&self, snapshot: &Snapshot) -> Vec<Alert> {
        let mut alerts = Vec::new();
        let t = snapshot.metal_temperature_k;
        if t > self.max_temperature {
            alerts.push(Alert::TemperatureHigh {
                value: t,
                limit: self.max_temperature,
            });
        }
        if t < self.min_temperature {
            alerts.push(Alert::TemperatureLow {
                value: t,
                limit: self.min_temperature,
            });
        }
        if snapshot.arc_power_w > self.max_power {
            alerts.push(Alert::PowerHigh {
                value: snapshot.arc_power_w,
                limit: self.max_power,
            });
        }
        if snapshot.carbon_content < self.min_carbon {
            alerts.push(Alert::CarbonLow {
                value: snapshot.carbon_content,
                limit: self.min_carbon,
            });
        }
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(t: f64, power: f64, carbon: f64) -> Snapshot {
        Snapshot {
            step: 0,
            time_s: 0.0,
            arc_power_w: power,
            metal_temperature_k: t,
            slag_temperature_k: t,
            refractory_temperature_k: t,
            metal_mass_kg: 150_000.0,
            slag_mass_kg: 50.0,
            carbon_content: carbon,
            silicon_content: 0.01,
        }
    }

    #[test]
    fn nominal_snapshot_raises_nothing() {
        let alerts = AlertThresholds::default().evaluate(&snapshot(1500.0, 14_400.0, 0.04));
        assert!(alerts.is_empty());
    }

    #[test]
    fn breaches_are_all_reported() {
        let alerts = AlertThresholds::default().evaluate(&snapshot(2100.0, 200_000.0, 0.0));
        assert_eq!(alerts.len(), 3);
        assert!(matches!(alerts[0], Alert::TemperatureHigh { .. }));
        assert!(matches!(alerts[1], Alert::PowerHigh { .. }));
        assert!(matches!(alerts[2], Alert::CarbonLow { .. }));
    }

    #[test]
    fn cold_metal_is_flagged() {
        let alerts = AlertThresholds::default().evaluate(&snapshot(290.0, 0.0, 0.04));
        assert_eq!(
            alerts,
            vec![Alert::TemperatureLow {
                value: 290.0,
                limit: 298.0
            }]
        );
    }
}
