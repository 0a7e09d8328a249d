//! Lumped furnace zones.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The four furnace regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    Arc,
    LiquidMetal,
    Slag,
    Refractory,
}

impl ZoneKind {
    pub const ALL: [ZoneKind; 4] = [
        ZoneKind::Arc,
        ZoneKind::LiquidMetal,
        ZoneKind::Slag,
        ZoneKind::Refractory,
    ];

    /// Stable key used in payloads and requests.
    pub fn key(self) -> &'static str {
        match self {
            ZoneKind::Arc => "arc",
            ZoneKind::LiquidMetal => "liquid_metal",
            ZoneKind::Slag => "slag",
            ZoneKind::Refractory => "refractory",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ZoneKind::Arc => "Arc Zone",
            ZoneKind::LiquidMetal => "Liquid Metal",
            ZoneKind::Slag => "Slag Layer",
            ZoneKind::Refractory => "Refractory Lining",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Thermal and mass state of one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub kind: ZoneKind,
    pub name: String,
    /// Temperature (K), always > 0
    pub temperature_k: f64,
    /// Total mass (kg), always >= 0
    pub mass_kg: f64,
    pub volume_m3: f64,
    pub density_kg_m3: f64,
    pub specific_heat_j_kg_k: f64,
    pub thermal_conductivity_w_m_k: f64,
    pub emissivity: f64,
    /// Material or element name -> accumulated amount
    pub materials: BTreeMap<String, f64>,
    /// Set once the zone has passed its melting point
    pub liquid: bool,
}

impl Zone {
    /// Heat capacity m·cp (J/K).
    pub fn heat_capacity(&self) -> f64 {
        self.mass_kg * self.specific_heat_j_kg_k
    }

    /// Apply `heat_w` for `dt_s` seconds and return the temperature change.
    ///
    /// A zone without heat capacity does not change temperature.
    pub fn apply_heat(&mut self, heat_w: f64, dt_s: f64) -> f64 {
        let capacity = self.heat_capacity();
        if capacity <= 0.0 || !capacity.is_finite() {
            return 0.0;
        }
        let delta = heat_w * dt_s / capacity;
        self.temperature_k = (self.temperature_k + delta).max(f64::MIN_POSITIVE);
        delta
    }

    /// Amount recorded for `name` (0.0 if absent).
    pub fn material(&self, name: &str) -> f64 {
        self.materials.get(name).copied().unwrap_or(0.0)
    }

    /// Add `amount_kg` to both the zone mass and the material entry.
    pub fn charge(&mut self, name: &str, amount_kg: f64) {
        self.mass_kg += amount_kg;
        *self.materials.entry(name.to_string()).or_insert(0.0) += amount_kg;
    }

    /// Add to the material entry only (reaction products).
    pub fn credit(&mut self, name: &str, amount: f64) {
        *self.materials.entry(name.to_string()).or_insert(0.0) += amount;
    }

    /// Remove up to `amount` from an existing entry, flooring at zero.
    ///
    /// Returns the amount actually removed. Absent entries are left absent.
    pub fn consume(&mut self, name: &str, amount: f64) -> f64 {
        match self.materials.get_mut(name) {
            Some(current) if *current > 0.0 => {
                let (next, removed) = eaf_core::floored_sub(*current, amount);
                *current = next;
                removed
            }
            _ => 0.0,
        }
    }

    /// One-way switch to liquid-phase properties.
    pub fn melt(&mut self, density_kg_m3: f64, specific_heat_j_kg_k: f64) {
        self.density_kg_m3 = density_kg_m3;
        self.specific_heat_j_kg_k = specific_heat_j_kg_k;
        self.liquid = true;
    }
}

/// Fixed set of the four furnace zones, indexed by [`ZoneKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSet {
    zones: [Zone; 4],
}

impl ZoneSet {
    /// Nominal furnace layout for a charge of `capacity_t` tonnes.
    pub fn nominal(capacity_t: f64, initial_temperature_k: f64) -> Self {
        let arc = Zone {
            kind: ZoneKind::Arc,
            name: ZoneKind::Arc.display_name().to_string(),
            temperature_k: 5000.0,
            mass_kg: 0.0,
            volume_m3: 0.1,
            density_kg_m3: 1.0,
            specific_heat_j_kg_k: 1000.0,
            thermal_conductivity_w_m_k: 50.0,
            emissivity: 0.9,
            materials: BTreeMap::new(),
            liquid: false,
        };

        // Seeded with the nominal analysis values; later additions accumulate in kg.
        let liquid_metal = Zone {
            kind: ZoneKind::LiquidMetal,
            name: ZoneKind::LiquidMetal.display_name().to_string(),
            temperature_k: initial_temperature_k,
            mass_kg: capacity_t * 1000.0,
            volume_m3: 200.0,
            density_kg_m3: 7000.0,
            specific_heat_j_kg_k: 800.0,
            thermal_conductivity_w_m_k: 30.0,
            emissivity: 0.3,
            materials: materials(&[("Fe", 0.95), ("C", 0.04), ("Si", 0.01)]),
            liquid: false,
        };

        let slag = Zone {
            kind: ZoneKind::Slag,
            name: ZoneKind::Slag.display_name().to_string(),
            temperature_k: initial_temperature_k,
            mass_kg: 50.0,
            volume_m3: 10.0,
            density_kg_m3: 3000.0,
            specific_heat_j_kg_k: 1200.0,
            thermal_conductivity_w_m_k: 2.0,
            emissivity: 0.8,
            materials: materials(&[("CaO", 0.4), ("SiO2", 0.3), ("FeO", 0.2), ("MgO", 0.1)]),
            liquid: false,
        };

        let refractory = Zone {
            kind: ZoneKind::Refractory,
            name: ZoneKind::Refractory.display_name().to_string(),
            temperature_k: initial_temperature_k,
            mass_kg: 1000.0,
            volume_m3: 50.0,
            density_kg_m3: 2500.0,
            specific_heat_j_kg_k: 1000.0,
            thermal_conductivity_w_m_k: 2.0,
            emissivity: 0.7,
            materials: BTreeMap::new(),
            liquid: false,
        };

        Self {
            zones: [arc, liquid_metal, slag, refractory],
        }
    }

    pub fn get(&self, kind: ZoneKind) -> &Zone {
        &self.zones[kind.index()]
    }

    pub fn get_mut(&mut self, kind: ZoneKind) -> &mut Zone {
        &mut self.zones[kind.index()]
    }

    pub fn by_key(&self, key: &str) -> Option<&Zone> {
        ZoneKind::from_key(key).map(|k| self.get(k))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    pub fn total_mass(&self) -> f64 {
        self.zones.iter().map(|z| z.mass_kg).sum()
    }

    /// Zone key -> temperature (K).
    pub fn temperatures(&self) -> BTreeMap<String, f64> {
        self.zones
            .iter()
            .map(|z| (z.kind.key().to_string(), z.temperature_k))
            .collect()
    }
}

fn materials(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_keys_round_trip() {
        for kind in ZoneKind::ALL {
            assert_eq!(ZoneKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(ZoneKind::from_key("electrode"), None);
    }

    #[test]
    fn nominal_layout_matches_capacity() {
        let zones = ZoneSet::nominal(150.0, 298.15);
        assert_eq!(zones.get(ZoneKind::LiquidMetal).mass_kg, 150_000.0);
        assert_eq!(zones.get(ZoneKind::Arc).temperature_k, 5000.0);
        assert_eq!(zones.get(ZoneKind::Arc).mass_kg, 0.0);
        assert_eq!(zones.get(ZoneKind::Slag).mass_kg, 50.0);
        assert_eq!(zones.get(ZoneKind::Refractory).mass_kg, 1000.0);
        assert_eq!(zones.get(ZoneKind::Slag).material("SiO2"), 0.3);
        assert_eq!(zones.get(ZoneKind::Refractory).name, "Refractory Lining");
        assert!(zones.get(ZoneKind::Refractory).materials.is_empty());
    }

    #[test]
    fn apply_heat_without_capacity_is_noop() {
        let mut zones = ZoneSet::nominal(150.0, 298.15);
        let arc = zones.get_mut(ZoneKind::Arc);
        assert_eq!(arc.apply_heat(1e6, 1.0), 0.0);
        assert_eq!(arc.temperature_k, 5000.0);
    }

    #[test]
    fn consume_floors_at_zero_and_reports_removed() {
        let mut zones = ZoneSet::nominal(150.0, 298.15);
        let metal = zones.get_mut(ZoneKind::LiquidMetal);
        let removed = metal.consume("Si", 0.5);
        assert_eq!(removed, 0.01);
        assert_eq!(metal.material("Si"), 0.0);
        assert_eq!(metal.consume("Si", 0.5), 0.0);
        assert_eq!(metal.consume("Mn", 0.5), 0.0);
        assert!(!metal.materials.contains_key("Mn"));
    }

    #[test]
    fn charge_updates_mass_and_entry() {
        let mut zones = ZoneSet::nominal(1.0, 298.15);
        let slag = zones.get_mut(ZoneKind::Slag);
        slag.charge("lime", 25.0);
        slag.charge("lime", 5.0);
        assert_eq!(slag.mass_kg, 80.0);
        assert_eq!(slag.material("lime"), 30.0);
    }
}
