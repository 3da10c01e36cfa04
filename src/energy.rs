use serde::{Deserialize, Serialize};

use crate::{Calculator, ElectricityFuel, Error, FactorKey, HeatingFuel};

/// Heating and electricity factors are given per TJ of consumed energy
pub const KWH_PER_TJ: f64 = 277777.77777778;

/// Unit in which a consumption is measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyUnit {
    #[default]
    Kwh,
    /// litres
    L,
    Kg,
    /// cubic metres
    M3,
}

/// Energy in kWh of one `unit` of `fuel`, `None` if `fuel` is not measured in `unit`.
pub fn kwh_per_unit(fuel: HeatingFuel, unit: EnergyUnit) -> Option<f64> {
    match (fuel, unit) {
        (_, EnergyUnit::Kwh) => Some(1.0),
        (HeatingFuel::Oil, EnergyUnit::L) => Some(10.0),
        (HeatingFuel::LiquidGas, EnergyUnit::L) => Some(6.6),
        (HeatingFuel::Coal, EnergyUnit::Kg) => Some(4.17),
        (HeatingFuel::Pellet, EnergyUnit::Kg) => Some(5.0),
        (HeatingFuel::Woodchips, EnergyUnit::Kg) => Some(5.2),
        (HeatingFuel::Gas, EnergyUnit::M3) => Some(10.0),
        _ => None,
    }
}

impl Calculator {
    /// Returns the emissions in kg CO2e of heating with `consumption` `unit`s of `fuel`.
    /// # Error
    /// Errors with [`Error::Validation`] when `fuel` cannot be measured in `unit`
    pub fn calc_co2_heating(
        &self,
        consumption: f64,
        unit: EnergyUnit,
        fuel: HeatingFuel,
    ) -> Result<f64, Error> {
        let conversion = kwh_per_unit(fuel, unit)
            .ok_or_else(|| Error::validation(format!("{fuel:?} is not measured in {unit:?}")))?;
        let factor = self.factor(FactorKey::Heating(fuel))?;
        Ok(consumption * conversion / KWH_PER_TJ * factor)
    }

    /// Returns the emissions in kg CO2e of consuming `consumption` kWh of electricity
    pub fn calc_co2_electricity(
        &self,
        consumption: f64,
        fuel: ElectricityFuel,
    ) -> Result<f64, Error> {
        let factor = self.factor(FactorKey::Electricity(fuel))?;
        Ok(consumption / KWH_PER_TJ * factor)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::*;
    use crate::EmissionFactors;

    fn calculator() -> Calculator {
        Calculator::new(Arc::new(EmissionFactors::bundled().unwrap()))
    }

    fn approx(actual: f64, expected: f64) -> bool {
        ((actual - expected) / expected).abs() < 0.01
    }

    #[test]
    fn woodchips() {
        let co2e = calculator()
            .calc_co2_heating(250.0, EnergyUnit::Kg, HeatingFuel::Woodchips)
            .unwrap();
        assert!(approx(co2e, 43.63), "{co2e}");
    }

    #[test]
    fn electricity() {
        let co2e = calculator()
            .calc_co2_electricity(10000.0, ElectricityFuel::GermanEnergyMix)
            .unwrap();
        assert!(approx(co2e, 3942.65), "{co2e}");
    }

    #[test]
    fn kwh_is_always_accepted() {
        let c = calculator();
        let by_kwh = c
            .calc_co2_heating(100.0, EnergyUnit::Kwh, HeatingFuel::Oil)
            .unwrap();
        let by_litre = c
            .calc_co2_heating(10.0, EnergyUnit::L, HeatingFuel::Oil)
            .unwrap();
        assert!((by_kwh - by_litre).abs() < 1e-9);
    }

    #[test]
    fn unsupported_unit() {
        let r = calculator().calc_co2_heating(10.0, EnergyUnit::L, HeatingFuel::Coal);
        assert!(matches!(r, Err(Error::Validation(_))));
    }
}
