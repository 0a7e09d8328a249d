//! Integration test: full furnace runs.
//!
//! Covers:
//! - Time advances exactly N×dt and the snapshot log tracks it
//! - Oxidation never drives carbon or silicon below zero
//! - Zone mass only grows through feeds and additions
//! - The metal bath stays liquid after cooling back below the melting point
//! - Silicon removed from the metal shows up as slag SiO2

use eaf_core::TracingTelemetry;
use eaf_sim::{
    EngineConfig, OperatingParameters, ParameterUpdate, RunPhase, SimulationEngine, ZoneKind,
    physics,
};
use proptest::prelude::*;

fn engine(config: EngineConfig) -> SimulationEngine {
    SimulationEngine::initialize(config, TracingTelemetry::shared()).unwrap()
}

#[test]
fn hot_charge_oxidizes_and_conserves_silicon() {
    let mut e = engine(EngineConfig {
        capacity_t: 1.0,
        initial_temperature_k: 1500.0,
        duration_s: 10.0,
        ..Default::default()
    });
    let params = OperatingParameters {
        carbon_injection_rate: 0.0,
        ..Default::default()
    };
    e.set_parameters(params);

    let si0 = e.zone(ZoneKind::LiquidMetal).material("Si");
    let sio2_0 = e.zone(ZoneKind::Slag).material("SiO2");
    e.run_to_completion().unwrap();

    let si1 = e.zone(ZoneKind::LiquidMetal).material("Si");
    let sio2_1 = e.zone(ZoneKind::Slag).material("SiO2");
    assert!((si0 - si1 - 10.0 * 0.0005).abs() < 1e-12);
    assert!(((sio2_1 - sio2_0) - (si0 - si1)).abs() < 1e-12);
    assert!((e.zone(ZoneKind::LiquidMetal).material("C") - 0.03).abs() < 1e-12);
}

#[test]
fn long_oxidation_floors_at_zero() {
    let mut e = engine(EngineConfig {
        capacity_t: 1.0,
        initial_temperature_k: 1500.0,
        duration_s: 200.0,
        ..Default::default()
    });
    e.set_parameters(OperatingParameters {
        carbon_injection_rate: 0.0,
        ..Default::default()
    });
    for snap in e.steps() {
        assert!(snap.carbon_content >= 0.0);
        assert!(snap.silicon_content >= 0.0);
    }
    assert_eq!(e.zone(ZoneKind::LiquidMetal).material("C"), 0.0);
    assert_eq!(e.zone(ZoneKind::LiquidMetal).material("Si"), 0.0);
    // silicon is gone after 20 s, so SiO2 gained exactly the initial entry
    assert!((e.zone(ZoneKind::Slag).material("SiO2") - 0.31).abs() < 1e-12);
}

#[test]
fn metal_stays_liquid_after_cooling() {
    let mut e = engine(EngineConfig {
        capacity_t: 1.0,
        initial_temperature_k: 1900.0,
        duration_s: 10.0,
        ..Default::default()
    });
    e.step().unwrap();
    assert!(e.zone(ZoneKind::LiquidMetal).liquid);

    // a strongly negative arc power acts as a heat sink
    e.update_parameters(&ParameterUpdate {
        arc_voltage: Some(-1.0e7),
        ..Default::default()
    });
    e.step().unwrap();
    let metal = e.zone(ZoneKind::LiquidMetal);
    assert!(metal.temperature_k < 1811.0);
    assert!(metal.temperature_k > 0.0);
    assert!(metal.liquid);
    assert_eq!(metal.density_kg_m3, 7000.0);
    assert_eq!(metal.specific_heat_j_kg_k, 800.0);
}

#[test]
fn adding_material_then_running_keeps_addition() {
    let mut e = engine(EngineConfig {
        duration_s: 5.0,
        ..Default::default()
    });
    e.add_material("dri", 500.0, "liquid_metal").unwrap();
    e.run_to_completion().unwrap();
    let metal = e.zone(ZoneKind::LiquidMetal);
    assert_eq!(metal.material("dri"), 500.0);
    assert!((metal.mass_kg - (150_500.0 + 5.0 * 0.1)).abs() < 1e-6);
    assert_eq!(e.phase(), RunPhase::Completed);
}

proptest! {
    #[test]
    fn arc_power_formula(v in 0.0f64..2000.0, i in 0.0f64..5000.0, pf in 0.0f64..=1.0) {
        let params = OperatingParameters {
            arc_voltage: v,
            arc_current: i,
            power_factor: pf,
            ..Default::default()
        };
        let p = physics::arc_power(&params);
        prop_assert_eq!(p.effective_w, v * i * pf * 0.9);
    }

    #[test]
    fn time_is_exact_multiple_of_step(n in 0u32..200, dt in 0.01f64..10.0) {
        let mut e = engine(EngineConfig {
            time_step_s: dt,
            duration_s: 1.0e9,
            ..Default::default()
        });
        for _ in 0..n {
            e.step().unwrap();
        }
        prop_assert_eq!(e.current_time(), n as f64 * dt);
        prop_assert_eq!(e.snapshots().len(), n as usize);
        if let Some(last) = e.snapshots().last() {
            prop_assert_eq!(last.time_s, (n - 1) as f64 * dt);
        }
    }

    #[test]
    fn zone_mass_never_decreases(
        steps in 1u32..50,
        t0 in 298.15f64..2500.0,
        lime in -1.0f64..1.0,
        carbon in -1.0f64..1.0,
    ) {
        let mut e = engine(EngineConfig {
            capacity_t: 1.0,
            initial_temperature_k: t0,
            duration_s: steps as f64,
            ..Default::default()
        });
        e.set_parameters(OperatingParameters {
            lime_addition_rate: lime,
            carbon_injection_rate: carbon,
            ..Default::default()
        });
        let mut prev: Vec<f64> = e.zones().iter().map(|z| z.mass_kg).collect();
        while e.phase() != RunPhase::Completed {
            e.step().unwrap();
            let now: Vec<f64> = e.zones().iter().map(|z| z.mass_kg).collect();
            for (a, b) in prev.iter().zip(&now) {
                prop_assert!(b >= a);
            }
            prev = now;
        }
    }
}
