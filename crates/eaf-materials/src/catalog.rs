use std::sync::OnceLock;

use eaf_core::units::{j_per_kg, j_per_kg_k, k, kg_per_m3};

use crate::composition::Composition;
use crate::error::{MaterialError, MaterialResult};
use crate::material::Material;

/// Const description of a catalog entry; converted into a typed [`Material`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialSpec {
    pub key: &'static str,
    pub display_name: &'static str,
    pub aliases: &'static [&'static str],
    pub composition: &'static [(&'static str, f64)],
    pub melting_point_k: f64,
    pub boiling_point_k: f64,
    pub specific_heat_solid: f64,
    pub specific_heat_liquid: f64,
    pub latent_heat_fusion: f64,
    pub density_solid: f64,
    pub density_liquid: f64,
}

impl MaterialSpec {
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_ascii_lowercase();
        if query.is_empty() {
            return true;
        }

        self.key.to_ascii_lowercase().contains(&query)
            || self.display_name.to_ascii_lowercase().contains(&query)
            || self
                .aliases
                .iter()
                .any(|alias| alias.to_ascii_lowercase().contains(&query))
    }

    fn to_material(self) -> Material {
        Material {
            key: self.key,
            name: self.display_name,
            composition: Composition::from_static(self.composition),
            melting_point: k(self.melting_point_k),
            boiling_point: k(self.boiling_point_k),
            specific_heat_solid: j_per_kg_k(self.specific_heat_solid),
            specific_heat_liquid: j_per_kg_k(self.specific_heat_liquid),
            latent_heat_fusion: j_per_kg(self.latent_heat_fusion),
            density_solid: kg_per_m3(self.density_solid),
            density_liquid: kg_per_m3(self.density_liquid),
        }
    }
}

/// Key of the material whose melting point and liquid properties drive the
/// metal bath phase change.
pub const STEEL_REFERENCE: &str = "steel_scrap";

const STANDARD_MATERIALS: [MaterialSpec; 4] = [
    MaterialSpec {
        key: "steel_scrap",
        display_name: "Steel Scrap",
        aliases: &["scrap", "steel"],
        composition: &[("Fe", 0.98), ("C", 0.02)],
        melting_point_k: 1811.0,
        boiling_point_k: 3134.0,
        specific_heat_solid: 460.0,
        specific_heat_liquid: 800.0,
        latent_heat_fusion: 13_800.0,
        density_solid: 7850.0,
        density_liquid: 7000.0,
    },
    MaterialSpec {
        key: "dri",
        display_name: "DRI",
        aliases: &["direct reduced iron", "sponge iron"],
        composition: &[("Fe", 0.92), ("C", 0.05), ("O", 0.03)],
        melting_point_k: 1811.0,
        boiling_point_k: 3134.0,
        specific_heat_solid: 460.0,
        specific_heat_liquid: 800.0,
        latent_heat_fusion: 13_800.0,
        density_solid: 5000.0,
        density_liquid: 7000.0,
    },
    MaterialSpec {
        key: "lime",
        display_name: "Lime",
        aliases: &["cao", "quicklime"],
        composition: &[("Ca", 0.71), ("O", 0.29)],
        melting_point_k: 2886.0,
        boiling_point_k: 4123.0,
        specific_heat_solid: 920.0,
        specific_heat_liquid: 920.0,
        latent_heat_fusion: 0.0,
        density_solid: 3340.0,
        density_liquid: 3340.0,
    },
    MaterialSpec {
        key: "dolomite",
        display_name: "Dolomite",
        aliases: &["camg(co3)2", "doloma"],
        composition: &[("Ca", 0.22), ("Mg", 0.13), ("C", 0.13), ("O", 0.52)],
        melting_point_k: 2573.0,
        boiling_point_k: 3000.0,
        specific_heat_solid: 920.0,
        specific_heat_liquid: 920.0,
        latent_heat_fusion: 0.0,
        density_solid: 2840.0,
        density_liquid: 2840.0,
    },
];

/// Registry of materials, built once and never mutated.
#[derive(Debug, Clone)]
pub struct MaterialCatalog {
    materials: Vec<Material>,
    steel: Material,
}

impl MaterialCatalog {
    /// Shared instance of the standard catalog.
    pub fn standard() -> &'static MaterialCatalog {
        static CATALOG: OnceLock<MaterialCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| Self::from_specs(&STANDARD_MATERIALS))
    }

    /// Build a catalog from specs.
    ///
    /// Catalogs without a `steel_scrap` entry use the standard steel grade as
    /// their phase-change reference.
    pub fn from_specs(specs: &[MaterialSpec]) -> Self {
        let steel = specs
            .iter()
            .find(|s| s.key == STEEL_REFERENCE)
            .copied()
            .unwrap_or(STANDARD_MATERIALS[0])
            .to_material();
        Self {
            materials: specs.iter().map(|s| s.to_material()).collect(),
            steel,
        }
    }

    pub fn specs() -> &'static [MaterialSpec] {
        &STANDARD_MATERIALS
    }

    /// Exact lookup by catalog key.
    pub fn get(&self, key: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.key == key)
    }

    pub fn require(&self, key: &str) -> MaterialResult<&Material> {
        self.get(key).ok_or_else(|| MaterialError::UnknownMaterial {
            name: key.to_string(),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Reference steel grade used for the metal bath phase change.
    pub fn steel_reference(&self) -> &Material {
        &self.steel
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// Case-insensitive search over key, display name and aliases.
pub fn filter_catalog(query: &str) -> Vec<MaterialSpec> {
    MaterialCatalog::specs()
        .iter()
        .copied()
        .filter(|spec| spec.matches_query(query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let mut seen = HashSet::new();
        for spec in MaterialCatalog::specs() {
            assert!(seen.insert(spec.key), "duplicate key: {}", spec.key);
        }
    }

    #[test]
    fn standard_catalog_has_four_materials() {
        let catalog = MaterialCatalog::standard();
        assert_eq!(catalog.len(), 4);
        for key in ["steel_scrap", "dri", "lime", "dolomite"] {
            assert!(catalog.contains(key), "missing {key}");
        }
        assert!(!catalog.contains("unobtainium"));
    }

    #[test]
    fn steel_reference_properties() {
        let steel = MaterialCatalog::standard().steel_reference();
        assert_eq!(steel.melting_point_k(), 1811.0);
        assert!((steel.liquid_density_kg_m3() - 7000.0).abs() < 1e-9);
        assert!((steel.liquid_specific_heat_j_kg_k() - 800.0).abs() < 1e-9);
        assert!(steel.is_molten_at(1811.5));
        assert!(!steel.is_molten_at(1811.0));
    }

    #[test]
    fn dolomite_composition_is_normalized() {
        let dolomite = MaterialCatalog::standard().require("dolomite").unwrap();
        assert!(dolomite.composition.is_normalized());
        assert_eq!(dolomite.composition.mass_fraction("Mg"), 0.13);
    }

    #[test]
    fn require_unknown_is_an_error() {
        let err = MaterialCatalog::standard().require("coke").unwrap_err();
        assert!(matches!(err, MaterialError::UnknownMaterial { .. }));
    }

    #[test]
    fn search_matches_aliases() {
        let results = filter_catalog("sponge");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "dri");
        assert_eq!(filter_catalog("").len(), 4);
    }

    #[test]
    fn custom_catalog_falls_back_to_standard_steel() {
        let lime_only = MaterialCatalog::from_specs(&MaterialCatalog::specs()[2..3]);
        assert_eq!(lime_only.len(), 1);
        assert_eq!(lime_only.steel_reference().key, STEEL_REFERENCE);
    }
}
