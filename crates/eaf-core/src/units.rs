// eaf-core/src/units.rs

use uom::si::f64::{
    AvailableEnergy as UomAvailableEnergy, Energy as UomEnergy, Mass as UomMass,
    MassDensity as UomMassDensity, Power as UomPower, Ratio as UomRatio,
    SpecificHeatCapacity as UomSpecificHeatCapacity,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type Density = UomMassDensity;
pub type Energy = UomEnergy;
pub type Mass = UomMass;
pub type Power = UomPower;
pub type Ratio = UomRatio;
pub type SpecificEnergy = UomAvailableEnergy;
pub type SpecificHeat = UomSpecificHeatCapacity;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn kg_per_m3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn j_per_kg_k(v: f64) -> SpecificHeat {
    use uom::si::specific_heat_capacity::joule_per_kilogram_kelvin;
    SpecificHeat::new::<joule_per_kilogram_kelvin>(v)
}

#[inline]
pub fn j_per_kg(v: f64) -> SpecificEnergy {
    use uom::si::available_energy::joule_per_kilogram;
    SpecificEnergy::new::<joule_per_kilogram>(v)
}

#[inline]
pub fn w(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

/// Raw accessors used where formulas are kept in plain `f64`.
pub mod raw {
    use super::*;

    #[inline]
    pub fn kelvin(t: Temperature) -> f64 {
        t.get::<uom::si::thermodynamic_temperature::kelvin>()
    }

    #[inline]
    pub fn kg_per_m3(d: Density) -> f64 {
        d.get::<uom::si::mass_density::kilogram_per_cubic_meter>()
    }

    #[inline]
    pub fn j_per_kg_k(c: SpecificHeat) -> f64 {
        c.get::<uom::si::specific_heat_capacity::joule_per_kilogram_kelvin>()
    }

    #[inline]
    pub fn j_per_kg(e: SpecificEnergy) -> f64 {
        e.get::<uom::si::available_energy::joule_per_kilogram>()
    }

    #[inline]
    pub fn watts(p: Power) -> f64 {
        p.get::<uom::si::power::watt>()
    }

    #[inline]
    pub fn joules(e: Energy) -> f64 {
        e.get::<uom::si::energy::joule>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _t = k(1811.0);
        let _m = kg(150_000.0);
        let _rho = kg_per_m3(7000.0);
        let _cp = j_per_kg_k(800.0);
        let _lf = j_per_kg(13_800.0);
        let _p = w(14_400.0);
        let _dt = s(1.0);
        let _r = unitless(0.8);
    }

    #[test]
    fn raw_accessors_round_trip() {
        assert!((raw::kelvin(k(1811.0)) - 1811.0).abs() < 1e-9);
        assert!((raw::kg_per_m3(kg_per_m3(7000.0)) - 7000.0).abs() < 1e-9);
        assert!((raw::j_per_kg_k(j_per_kg_k(800.0)) - 800.0).abs() < 1e-9);
        assert!((raw::j_per_kg(j_per_kg(13_800.0)) - 13_800.0).abs() < 1e-9);
    }

    #[test]
    fn power_times_time_is_energy() {
        let e: Energy = w(14_400.0) * s(2.0);
        assert!((raw::joules(e) - 28_800.0).abs() < 1e-6);
    }
}
