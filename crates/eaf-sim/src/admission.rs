//! Admission of manual material additions.

use eaf_materials::MaterialCatalog;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::zone::ZoneKind;

/// How unknown zone or material names are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownNamePolicy {
    /// Log and ignore the request.
    #[default]
    Ignore,
    /// Fail the request with [`SimError::UnknownName`].
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IgnoreReason {
    UnknownZone(String),
    UnknownMaterial(String),
    InvalidAmount(f64),
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IgnoreReason::UnknownZone(name) => write!(f, "unknown zone '{name}'"),
            IgnoreReason::UnknownMaterial(name) => write!(f, "unknown material '{name}'"),
            IgnoreReason::InvalidAmount(kg) => write!(f, "invalid amount {kg} kg"),
        }
    }
}

/// Outcome of admitting an addition request.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Accepted { zone: ZoneKind },
    Ignored { reason: IgnoreReason },
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accepted { .. })
    }
}

/// Decide whether `amount_kg` of `material` may be added to `zone`.
///
/// Zone names are zone keys. Material names must be catalog keys. Amounts
/// must be finite and non-negative.
pub fn admit(
    catalog: &MaterialCatalog,
    policy: UnknownNamePolicy,
    material: &str,
    amount_kg: f64,
    zone: &str,
) -> SimResult<Admission> {
    let Some(kind) = ZoneKind::from_key(zone) else {
        return refuse(policy, IgnoreReason::UnknownZone(zone.to_string()));
    };
    if !catalog.contains(material) {
        return refuse(policy, IgnoreReason::UnknownMaterial(material.to_string()));
    }
    if !amount_kg.is_finite() || amount_kg < 0.0 {
        return refuse(policy, IgnoreReason::InvalidAmount(amount_kg));
    }
    Ok(Admission::Accepted { zone: kind })
}

fn refuse(policy: UnknownNamePolicy, reason: IgnoreReason) -> SimResult<Admission> {
    match (policy, reason) {
        (UnknownNamePolicy::Ignore, reason) => Ok(Admission::Ignored { reason }),
        (UnknownNamePolicy::Reject, IgnoreReason::UnknownZone(name)) => {
            Err(SimError::UnknownName { kind: "zone", name })
        }
        (UnknownNamePolicy::Reject, IgnoreReason::UnknownMaterial(name)) => {
            Err(SimError::UnknownName {
                kind: "material",
                name,
            })
        }
        (UnknownNamePolicy::Reject, IgnoreReason::InvalidAmount(_)) => Err(SimError::InvalidArg {
            what: "material amount must be finite and non-negative",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> &'static MaterialCatalog {
        MaterialCatalog::standard()
    }

    #[test]
    fn known_names_are_accepted() {
        let out = admit(catalog(), UnknownNamePolicy::Reject, "lime", 25.0, "slag").unwrap();
        assert_eq!(
            out,
            Admission::Accepted {
                zone: ZoneKind::Slag
            }
        );
    }

    #[test]
    fn unknown_zone_ignored_by_default() {
        let out = admit(catalog(), UnknownNamePolicy::default(), "lime", 25.0, "roof").unwrap();
        assert_eq!(
            out,
            Admission::Ignored {
                reason: IgnoreReason::UnknownZone("roof".into())
            }
        );
    }

    #[test]
    fn unknown_material_rejected_under_reject() {
        let err = admit(catalog(), UnknownNamePolicy::Reject, "unobtanium", 1.0, "slag")
            .unwrap_err();
        assert_eq!(
            err,
            SimError::UnknownName {
                kind: "material",
                name: "unobtanium".into()
            }
        );
    }

    #[test]
    fn negative_and_nan_amounts_refused() {
        for amount in [-1.0, f64::NAN, f64::INFINITY] {
            let out = admit(catalog(), UnknownNamePolicy::Ignore, "dri", amount, "liquid_metal")
                .unwrap();
            assert!(!out.is_accepted());
            assert!(matches!(
                admit(catalog(), UnknownNamePolicy::Reject, "dri", amount, "liquid_metal"),
                Err(SimError::InvalidArg { .. })
            ));
        }
    }

    #[test]
    fn zero_amount_is_accepted() {
        let out = admit(catalog(), UnknownNamePolicy::Reject, "dri", 0.0, "liquid_metal").unwrap();
        assert!(out.is_accepted());
    }
}
