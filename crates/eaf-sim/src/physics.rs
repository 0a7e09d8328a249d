//! Per-step furnace physics.
//!
//! All functions are pure over zone and parameter state; the engine composes
//! them in a fixed order each step.

use eaf_materials::Material;

use crate::params::OperatingParameters;
use crate::zone::{ZoneKind, ZoneSet};

/// Fraction of real arc power delivered as heat.
pub const ARC_EFFICIENCY: f64 = 0.9;

/// Split of effective arc power between the receiving zones.
pub const HEAT_SHARES: [(ZoneKind, f64); 3] = [
    (ZoneKind::LiquidMetal, 0.7),
    (ZoneKind::Slag, 0.2),
    (ZoneKind::Refractory, 0.1),
];

/// Carbon oxidation starts strictly above this metal temperature (K).
pub const CARBON_OXIDATION_THRESHOLD_K: f64 = 1200.0;
/// Carbon removed per second of oxidation.
pub const CARBON_OXIDATION_RATE: f64 = 0.001;
/// Silicon oxidation starts strictly above this metal temperature (K).
pub const SILICON_OXIDATION_THRESHOLD_K: f64 = 1400.0;
/// Silicon removed per second of oxidation.
pub const SILICON_OXIDATION_RATE: f64 = 0.0005;

/// Electrical power figures for one parameter set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcPower {
    /// V·I (VA)
    pub apparent_va: f64,
    /// V·I·pf (W)
    pub real_w: f64,
    /// Heat actually delivered to the furnace (W)
    pub effective_w: f64,
}

pub fn arc_power(params: &OperatingParameters) -> ArcPower {
    let apparent_va = params.arc_voltage * params.arc_current;
    let real_w = apparent_va * params.power_factor;
    ArcPower {
        apparent_va,
        real_w,
        effective_w: real_w * ARC_EFFICIENCY,
    }
}

/// Distribute `effective_w` over the receiving zones for `dt_s` seconds.
pub fn distribute_heat(zones: &mut ZoneSet, effective_w: f64, dt_s: f64) {
    for (kind, share) in HEAT_SHARES {
        zones.get_mut(kind).apply_heat(effective_w * share, dt_s);
    }
}

/// Amounts removed by oxidation during one step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Oxidation {
    pub carbon: f64,
    pub silicon: f64,
}

/// Oxidize carbon and silicon in the metal when hot enough.
///
/// Removed silicon reports to slag as SiO2. The slag is credited with the
/// silicon actually removed, not the nominal rate, so once the metal's
/// silicon entry floors at zero no further SiO2 appears. Zone masses are
/// untouched.
pub fn oxidize(zones: &mut ZoneSet, dt_s: f64) -> Oxidation {
    let metal = zones.get_mut(ZoneKind::LiquidMetal);
    let temperature = metal.temperature_k;
    let mut out = Oxidation::default();

    if temperature > CARBON_OXIDATION_THRESHOLD_K {
        out.carbon = metal.consume("C", CARBON_OXIDATION_RATE * dt_s);
    }
    if temperature > SILICON_OXIDATION_THRESHOLD_K {
        out.silicon = metal.consume("Si", SILICON_OXIDATION_RATE * dt_s);
    }

    if out.silicon > 0.0 {
        zones.get_mut(ZoneKind::Slag).credit("SiO2", out.silicon);
    }
    out
}

/// Switch the metal zone to liquid properties once above the melting point.
///
/// Returns true on the step the transition happens.
pub fn update_phase(zones: &mut ZoneSet, reference: &Material) -> bool {
    let metal = zones.get_mut(ZoneKind::LiquidMetal);
    if metal.liquid || !reference.is_molten_at(metal.temperature_k) {
        return false;
    }
    metal.melt(
        reference.liquid_density_kg_m3(),
        reference.liquid_specific_heat_j_kg_k(),
    );
    true
}

/// Continuous lime and carbon feeds for one step.
///
/// Feeds add to both zone mass and material entry. Non-positive rates are skipped.
pub fn apply_feeds(zones: &mut ZoneSet, params: &OperatingParameters, dt_s: f64) {
    if params.lime_addition_rate > 0.0 {
        zones
            .get_mut(ZoneKind::Slag)
            .charge("CaO", params.lime_addition_rate * dt_s);
    }
    if params.carbon_injection_rate > 0.0 {
        zones
            .get_mut(ZoneKind::LiquidMetal)
            .charge("C", params.carbon_injection_rate * dt_s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eaf_materials::MaterialCatalog;

    #[test]
    fn default_arc_power() {
        let p = arc_power(&OperatingParameters::default());
        assert_eq!(p.apparent_va, 20_000.0);
        assert!((p.real_w - 16_000.0).abs() < 1e-9);
        assert!((p.effective_w - 14_400.0).abs() < 1e-9);
    }

    #[test]
    fn heat_shares_sum_to_one() {
        let total: f64 = HEAT_SHARES.iter().map(|(_, s)| s).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn no_oxidation_when_cold() {
        let mut zones = ZoneSet::nominal(150.0, 1200.0);
        let out = oxidize(&mut zones, 1.0);
        assert_eq!(out, Oxidation::default());
        assert_eq!(zones.get(ZoneKind::LiquidMetal).material("C"), 0.04);
    }

    #[test]
    fn hot_metal_moves_silicon_to_slag() {
        let mut zones = ZoneSet::nominal(150.0, 1500.0);
        let out = oxidize(&mut zones, 1.0);
        assert!((out.carbon - 0.001).abs() < 1e-15);
        assert!((out.silicon - 0.0005).abs() < 1e-15);
        assert!((zones.get(ZoneKind::Slag).material("SiO2") - 0.3005).abs() < 1e-12);
        assert_eq!(zones.get(ZoneKind::LiquidMetal).mass_kg, 150_000.0);
    }

    #[test]
    fn silicon_credit_is_capped_by_what_remains() {
        let mut zones = ZoneSet::nominal(150.0, 1500.0);
        zones
            .get_mut(ZoneKind::LiquidMetal)
            .materials
            .insert("Si".to_string(), 0.0002);
        let sio2_before = zones.get(ZoneKind::Slag).material("SiO2");

        let out = oxidize(&mut zones, 1.0);
        assert!((out.silicon - 0.0002).abs() < 1e-15);
        assert_eq!(zones.get(ZoneKind::LiquidMetal).material("Si"), 0.0);
        let gained = zones.get(ZoneKind::Slag).material("SiO2") - sio2_before;
        assert!((gained - 0.0002).abs() < 1e-12);

        // Nothing left to oxidize, nothing credited.
        let out = oxidize(&mut zones, 1.0);
        assert_eq!(out.silicon, 0.0);
        let gained = zones.get(ZoneKind::Slag).material("SiO2") - sio2_before;
        assert!((gained - 0.0002).abs() < 1e-12);
    }

    #[test]
    fn phase_change_is_one_way() {
        let steel = MaterialCatalog::standard().steel_reference();
        let mut zones = ZoneSet::nominal(150.0, 1900.0);
        assert!(update_phase(&mut zones, steel));
        let metal = zones.get(ZoneKind::LiquidMetal);
        assert!(metal.liquid);
        assert_eq!(metal.density_kg_m3, 7000.0);
        assert_eq!(metal.specific_heat_j_kg_k, 800.0);
        assert!(!update_phase(&mut zones, steel));
    }

    #[test]
    fn negative_feed_rates_are_skipped() {
        let mut zones = ZoneSet::nominal(150.0, 298.15);
        let params = OperatingParameters {
            lime_addition_rate: -1.0,
            carbon_injection_rate: 0.0,
            ..Default::default()
        };
        apply_feeds(&mut zones, &params, 1.0);
        assert_eq!(zones.get(ZoneKind::Slag).material("CaO"), 0.4);
        assert_eq!(zones.get(ZoneKind::LiquidMetal).material("C"), 0.04);
        assert_eq!(zones.get(ZoneKind::Slag).mass_kg, 50.0);
    }

    #[test]
    fn feeds_add_mass_and_entries() {
        let mut zones = ZoneSet::nominal(150.0, 298.15);
        apply_feeds(&mut zones, &OperatingParameters::default(), 2.0);
        let slag = zones.get(ZoneKind::Slag);
        assert!((slag.mass_kg - 50.1).abs() < 1e-12);
        assert!((slag.material("CaO") - 0.5).abs() < 1e-12);
        let metal = zones.get(ZoneKind::LiquidMetal);
        assert!((metal.mass_kg - 150_000.2).abs() < 1e-9);
        assert!((metal.material("C") - 0.24).abs() < 1e-12);
    }
}
