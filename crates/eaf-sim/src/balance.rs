//! Energy and mass balance diagnostics.
//!
//! Both balances are instantaneous figures computed from the current zone
//! state. Energies are in kJ, masses in kg.

use eaf_core::AMBIENT_TEMPERATURE_K;
use serde::{Deserialize, Serialize};

use crate::params::OperatingParameters;
use crate::physics::arc_power;
use crate::zone::{ZoneKind, ZoneSet};

/// Carbon combustion heat (kJ/kg).
pub const CARBON_COMBUSTION_KJ_PER_KG: f64 = 9200.0;
/// Silicon oxidation heat (kJ/kg).
pub const SILICON_OXIDATION_KJ_PER_KG: f64 = 31000.0;
/// Share of the energy input leaving with the off-gas.
pub const OFF_GAS_ENERGY_SHARE: f64 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyBalance {
    pub electrical_energy: f64,
    pub chemical_energy: f64,
    pub total_input: f64,
    pub sensible_heat_metal: f64,
    pub sensible_heat_slag: f64,
    pub heat_losses: f64,
    pub off_gas_energy: f64,
    pub total_output: f64,
    /// Metal sensible heat as a percentage of input (0 when input is 0).
    pub energy_efficiency: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MassBalance {
    pub input_mass: f64,
    pub carbon_consumption: f64,
    pub silicon_consumption: f64,
    pub output_mass: f64,
    pub slag_formation: f64,
    pub off_gas_mass: f64,
    pub mass_balance_error: f64,
}

pub fn energy_balance(zones: &ZoneSet, params: &OperatingParameters, dt_s: f64) -> EnergyBalance {
    let metal = zones.get(ZoneKind::LiquidMetal);
    let slag = zones.get(ZoneKind::Slag);
    let refractory = zones.get(ZoneKind::Refractory);

    let electrical_energy = arc_power(params).effective_w * dt_s * 0.001;
    let chemical_energy = metal.material("C") * metal.mass_kg * CARBON_COMBUSTION_KJ_PER_KG * 0.001
        + metal.material("Si") * metal.mass_kg * SILICON_OXIDATION_KJ_PER_KG * 0.001;
    let total_input = electrical_energy + chemical_energy;

    let sensible = |z: &crate::zone::Zone| {
        z.specific_heat_j_kg_k * z.mass_kg * (z.temperature_k - AMBIENT_TEMPERATURE_K) * 0.001
    };
    let sensible_heat_metal = sensible(metal);
    let sensible_heat_slag = sensible(slag);
    let heat_losses = (refractory.thermal_conductivity_w_m_k * 0.1 + 50.0) * dt_s * 0.001;
    let off_gas_energy = total_input * OFF_GAS_ENERGY_SHARE;
    let total_output = sensible_heat_metal + sensible_heat_slag + heat_losses + off_gas_energy;

    let energy_efficiency = if total_input > 0.0 {
        sensible_heat_metal / total_input * 100.0
    } else {
        0.0
    };

    EnergyBalance {
        electrical_energy,
        chemical_energy,
        total_input,
        sensible_heat_metal,
        sensible_heat_slag,
        heat_losses,
        off_gas_energy,
        total_output,
        energy_efficiency,
    }
}

pub fn mass_balance(zones: &ZoneSet) -> MassBalance {
    let metal = zones.get(ZoneKind::LiquidMetal);
    let input_mass = zones.total_mass();
    let carbon_consumption = metal.material("C") * metal.mass_kg * 0.1;
    let silicon_consumption = metal.material("Si") * metal.mass_kg * 0.8;
    let slag_formation = carbon_consumption * 0.5 + silicon_consumption * 0.3;
    let off_gas_mass = carbon_consumption * 0.5 + silicon_consumption * 0.7;
    let output_mass = input_mass - carbon_consumption - silicon_consumption + slag_formation;

    MassBalance {
        input_mass,
        carbon_consumption,
        silicon_consumption,
        output_mass,
        slag_formation,
        off_gas_mass,
        mass_balance_error: (input_mass - output_mass).abs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_balance_at_ambient_start() {
        let zones = ZoneSet::nominal(150.0, AMBIENT_TEMPERATURE_K);
        let eb = energy_balance(&zones, &OperatingParameters::default(), 1.0);
        assert!((eb.electrical_energy - 14.4).abs() < 1e-9);
        // 0.04*150000*9.2 + 0.01*150000*31
        assert!((eb.chemical_energy - (55_200.0 + 46_500.0)).abs() < 1e-6);
        assert_eq!(eb.sensible_heat_metal, 0.0);
        assert!((eb.heat_losses - 0.0502).abs() < 1e-12);
        assert!((eb.off_gas_energy - eb.total_input * 0.1).abs() < 1e-9);
        assert_eq!(eb.energy_efficiency, 0.0);
    }

    #[test]
    fn efficiency_zero_without_input() {
        let mut zones = ZoneSet::nominal(150.0, 500.0);
        let metal = zones.get_mut(ZoneKind::LiquidMetal);
        metal.materials.clear();
        let params = OperatingParameters {
            arc_voltage: 0.0,
            ..Default::default()
        };
        let eb = energy_balance(&zones, &params, 1.0);
        assert_eq!(eb.total_input, 0.0);
        assert_eq!(eb.energy_efficiency, 0.0);
        assert!(eb.sensible_heat_metal > 0.0);
    }

    #[test]
    fn mass_balance_error_is_consumption_less_slag() {
        let zones = ZoneSet::nominal(150.0, AMBIENT_TEMPERATURE_K);
        let mb = mass_balance(&zones);
        assert_eq!(mb.input_mass, 151_050.0);
        assert!((mb.carbon_consumption - 600.0).abs() < 1e-9);
        assert!((mb.silicon_consumption - 1200.0).abs() < 1e-9);
        assert!((mb.slag_formation - 660.0).abs() < 1e-9);
        assert!((mb.off_gas_mass - 1140.0).abs() < 1e-9);
        assert!((mb.mass_balance_error - 1140.0).abs() < 1e-6);
    }
}
