//! Categorical attributes that select an emission factor.
//!
//! Every attribute has a default, used when the caller omits it. A value that
//! is supplied but not recognized is a validation error, never replaced by the
//! default. Fuel types are the exception: an unknown fuel has no emission
//! factor and is reported as a lookup error.
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::Error;

/// Parses a categorical value by its serialized name, e.g. `"plug-in_hybrid"`.
/// # Error
/// Errors with [`Error::Validation`] when `value` is not a variant of `T`
pub fn parse<T: DeserializeOwned>(field: &str, value: &str) -> Result<T, Error> {
    let deserializer = serde::de::value::StrDeserializer::<serde::de::value::Error>::new(value);
    T::deserialize(deserializer)
        .map_err(|e| Error::validation(format!("invalid {field} `{value}`: {e}")))
}

/// Parses an optional categorical value, falling back to its default when omitted.
pub fn parse_or_default<T: DeserializeOwned + Default>(
    field: &str,
    value: Option<&str>,
) -> Result<T, Error> {
    value.map_or_else(|| Ok(T::default()), |value| parse(field, value))
}

/// Parses an optional fuel type, falling back to its default when omitted.
///
/// Fuel types are open-ended: a fuel without a row in the emission factor
/// tables is a lookup error, like any other attribute combination without a
/// factor.
/// # Error
/// Errors with [`Error::Lookup`] when `value` is not a fuel with emission factors
pub fn fuel_or_default<T: DeserializeOwned + Default>(value: Option<&str>) -> Result<T, Error> {
    parse_or_default("fuel type", value).map_err(|_| {
        Error::Lookup(format!(
            "no emission factor for fuel type `{}`",
            value.unwrap_or_default()
        ))
    })
}

/// Mode of transportation of a business trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Car,
    Motorbike,
    Bus,
    Train,
    Plane,
    Ferry,
}

/// Size class of a car, motorbike or bus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Size {
    Small,
    Medium,
    Large,
    #[default]
    Average,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarFuel {
    #[default]
    Average,
    Diesel,
    Gasoline,
    Cng,
    Electric,
    Hybrid,
    #[serde(rename = "plug-in_hybrid")]
    PlugInHybrid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusFuel {
    #[default]
    Average,
    Diesel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainFuel {
    #[default]
    Average,
    Electric,
    Diesel,
}

/// Seating class on a flight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatingClass {
    #[default]
    Average,
    EconomyClass,
    PremiumEconomyClass,
    BusinessClass,
    FirstClass,
}

/// Seating class on a ferry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FerryClass {
    #[default]
    Average,
    FootPassenger,
    CarPassenger,
}

/// Modes with a single, flat emission factor per km
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveMode {
    Bicycle,
    Pedelec,
    Foot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatingFuel {
    Oil,
    LiquidGas,
    Coal,
    Pellet,
    Woodchips,
    Gas,
    Electricity,
    HeatPumpAir,
    HeatPumpGround,
    HeatPumpWater,
    Solar,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectricityFuel {
    #[default]
    GermanEnergyMix,
    Solar,
}
