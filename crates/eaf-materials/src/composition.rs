//! Elemental composition by mass fraction.

use crate::error::{MaterialError, MaterialResult};
use eaf_core::numeric::{Tolerances, nearly_equal};

/// Element -> mass fraction mapping.
///
/// Fractions are kept as given. They are not normalized: several catalog
/// entries carry rounded analyses whose sum differs slightly from one, and
/// [`Composition::total_fraction`] reports that sum.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    items: Vec<(String, f64)>,
}

impl Composition {
    /// Build a composition, rejecting negative or non-finite fractions.
    pub fn new<S: Into<String>>(fractions: Vec<(S, f64)>) -> MaterialResult<Self> {
        if fractions.is_empty() {
            return Err(MaterialError::InvalidArg {
                what: "empty composition",
            });
        }

        let mut items = Vec::with_capacity(fractions.len());
        for (element, frac) in fractions {
            let element = element.into();
            if !frac.is_finite() || frac < 0.0 {
                return Err(MaterialError::NonPhysicalFraction {
                    element,
                    value: frac,
                });
            }
            items.push((element, frac));
        }
        Ok(Self { items })
    }

    pub(crate) fn from_static(fractions: &[(&str, f64)]) -> Self {
        Self {
            items: fractions
                .iter()
                .map(|(e, f)| (e.to_string(), *f))
                .collect(),
        }
    }

    /// Mass fraction of an element (0.0 if not present).
    pub fn mass_fraction(&self, element: &str) -> f64 {
        self.items
            .iter()
            .find(|(e, _)| e == element)
            .map(|(_, f)| *f)
            .unwrap_or(0.0)
    }

    pub fn total_fraction(&self) -> f64 {
        self.items.iter().map(|(_, f)| f).sum()
    }

    /// True when fractions sum to one within the default tolerance.
    pub fn is_normalized(&self) -> bool {
        nearly_equal(
            self.total_fraction(),
            1.0,
            Tolerances {
                abs: 1e-9,
                rel: 1e-9,
            },
        )
    }

    /// Mass (kg) of each element in `total_kg` of this material.
    pub fn split_mass(&self, total_kg: f64) -> Vec<(String, f64)> {
        self.items
            .iter()
            .map(|(e, f)| (e.clone(), f * total_kg))
            .collect()
    }

    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|(e, _)| e.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.items.iter().map(|(e, f)| (e.as_str(), *f))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn mass_fraction_lookup() {
        let c = Composition::new(vec![("Fe", 0.98), ("C", 0.02)]).unwrap();
        assert_eq!(c.mass_fraction("Fe"), 0.98);
        assert_eq!(c.mass_fraction("Si"), 0.0);
        assert!(c.is_normalized());
    }

    #[test]
    fn rejects_negative_fraction() {
        let err = Composition::new(vec![("Fe", -0.1)]).unwrap_err();
        assert!(matches!(err, MaterialError::NonPhysicalFraction { .. }));
    }

    #[test]
    fn rejects_empty() {
        let empty: Vec<(&str, f64)> = vec![];
        assert!(Composition::new(empty).is_err());
    }

    #[test]
    fn unnormalized_sum_is_reported() {
        let c = Composition::new(vec![("Ca", 0.5), ("O", 0.3)]).unwrap();
        assert!(!c.is_normalized());
        assert!((c.total_fraction() - 0.8).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn split_mass_sums_to_fraction_total(a in 0.0f64..1.0, b in 0.0f64..1.0, m in 0.0f64..1e6) {
            let c = Composition::new(vec![("A", a), ("B", b)]).unwrap();
            let parts: f64 = c.split_mass(m).iter().map(|(_, kg)| kg).sum();
            prop_assert!((parts - c.total_fraction() * m).abs() <= 1e-6 * m.max(1.0));
        }
    }
}
