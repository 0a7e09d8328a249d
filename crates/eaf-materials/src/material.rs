//! Immutable material records.

use eaf_core::units::{Density, SpecificEnergy, SpecificHeat, Temperature, raw};

use crate::composition::Composition;

/// Thermophysical record for one charge material.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Catalog key (e.g. `steel_scrap`)
    pub key: &'static str,
    /// Human-readable name
    pub name: &'static str,
    pub composition: Composition,
    pub melting_point: Temperature,
    pub boiling_point: Temperature,
    pub specific_heat_solid: SpecificHeat,
    pub specific_heat_liquid: SpecificHeat,
    pub latent_heat_fusion: SpecificEnergy,
    pub density_solid: Density,
    pub density_liquid: Density,
}

impl Material {
    pub fn melting_point_k(&self) -> f64 {
        raw::kelvin(self.melting_point)
    }

    pub fn boiling_point_k(&self) -> f64 {
        raw::kelvin(self.boiling_point)
    }

    pub fn liquid_density_kg_m3(&self) -> f64 {
        raw::kg_per_m3(self.density_liquid)
    }

    pub fn liquid_specific_heat_j_kg_k(&self) -> f64 {
        raw::j_per_kg_k(self.specific_heat_liquid)
    }

    /// True strictly above the melting point.
    pub fn is_molten_at(&self, t_k: f64) -> bool {
        t_k > self.melting_point_k()
    }
}
