//! Material catalog for the EAF simulator.
//!
//! Provides:
//! - Elemental composition by mass fraction
//! - Immutable material records with typed SI thermophysical properties
//! - The static catalog of charge materials (scrap, DRI, fluxes)

pub mod catalog;
pub mod composition;
pub mod error;
pub mod material;

pub use catalog::{MaterialCatalog, MaterialSpec, STEEL_REFERENCE, filter_catalog};
pub use composition::Composition;
pub use error::{MaterialError, MaterialResult};
pub use material::Material;
