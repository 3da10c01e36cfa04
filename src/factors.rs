use std::{collections::HashMap, path::Path};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{
    ActiveMode, BusFuel, CarFuel, ElectricityFuel, Error, FerryClass, HeatingFuel, RangeCategory,
    SeatingClass, Size, TrainFuel, VehicleRange,
};

/// The attributes that select one emission factor.
///
/// Units of the factor depend on the table: kg CO2e per vehicle-km for cars,
/// kg CO2e per passenger-km for the other modes, kg CO2e per TJ for heating
/// and electricity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactorKey {
    Car {
        size: Size,
        fuel: CarFuel,
    },
    Motorbike {
        size: Size,
    },
    Bus {
        size: Size,
        fuel: BusFuel,
        occupancy: u8,
        range: VehicleRange,
    },
    Train {
        fuel: TrainFuel,
        range: VehicleRange,
    },
    Plane {
        seating: SeatingClass,
        range: RangeCategory,
    },
    Ferry {
        seating: FerryClass,
    },
    Active(ActiveMode),
    Heating(HeatingFuel),
    Electricity(ElectricityFuel),
}

/// A source of emission factors
pub trait EmissionFactorSource: Send + Sync {
    /// Returns the emission factor of `key`.
    /// # Error
    /// Errors with [`Error::Lookup`] when no factor matches `key`
    fn lookup(&self, key: &FactorKey) -> Result<f64, Error>;
}

/// Emission factors held in memory, loaded from one CSV table per mode.
#[derive(Debug, Clone, Default)]
pub struct EmissionFactors(HashMap<FactorKey, f64>);

#[derive(Deserialize)]
struct CarRow {
    size_class: Size,
    fuel_type: String,
    co2e_kg: f64,
}

#[derive(Deserialize)]
struct MotorbikeRow {
    size_class: Size,
    co2e_kg: f64,
}

#[derive(Deserialize)]
struct BusRow {
    size_class: Size,
    fuel_type: String,
    occupancy: u8,
    vehicle_range: VehicleRange,
    co2e_kg: f64,
}

#[derive(Deserialize)]
struct TrainRow {
    fuel_type: String,
    vehicle_range: VehicleRange,
    co2e_kg: f64,
}

#[derive(Deserialize)]
struct PlaneRow {
    seating_class: SeatingClass,
    range_category: RangeCategory,
    co2e_kg: f64,
}

#[derive(Deserialize)]
struct FerryRow {
    seating_class: FerryClass,
    co2e_kg: f64,
}

#[derive(Deserialize)]
struct ActiveRow {
    mode: ActiveMode,
    co2e_kg: f64,
}

#[derive(Deserialize)]
struct HeatingRow {
    fuel_type: String,
    co2e_kg: f64,
}

#[derive(Deserialize)]
struct ElectricityRow {
    fuel_type: String,
    co2e_kg: f64,
}

/// Names of the tables, as `emission_factors_{name}.csv`
const TABLES: [&str; 9] = [
    "car",
    "motorbike",
    "bus",
    "train",
    "plane",
    "ferry",
    "active",
    "heating",
    "electricity",
];

impl EmissionFactors {
    /// The reference tables shipped with this crate (`src/data`).
    pub fn bundled() -> Result<Self, Error> {
        let tables: [&[u8]; 9] = [
            include_bytes!("data/emission_factors_car.csv"),
            include_bytes!("data/emission_factors_motorbike.csv"),
            include_bytes!("data/emission_factors_bus.csv"),
            include_bytes!("data/emission_factors_train.csv"),
            include_bytes!("data/emission_factors_plane.csv"),
            include_bytes!("data/emission_factors_ferry.csv"),
            include_bytes!("data/emission_factors_active.csv"),
            include_bytes!("data/emission_factors_heating.csv"),
            include_bytes!("data/emission_factors_electricity.csv"),
        ];
        let mut factors = Self::default();
        for (name, data) in TABLES.into_iter().zip(tables) {
            factors.extend_table(name, data)?;
        }
        Ok(factors)
    }

    /// Loads the tables `emission_factors_{mode}.csv` from `directory`.
    /// # Error
    /// Errors if a table cannot be read or a row cannot be deserialized
    pub fn from_directory(directory: impl AsRef<Path>) -> Result<Self, Error> {
        let mut factors = Self::default();
        for name in TABLES {
            let path = directory
                .as_ref()
                .join(format!("emission_factors_{name}.csv"));
            log::debug!("loading {}", path.display());
            factors.extend_table(name, &std::fs::read(path)?)?;
        }
        Ok(factors)
    }

    fn extend_table(&mut self, name: &str, data: &[u8]) -> Result<(), Error> {
        match name {
            "car" => self.extend(data, |r: CarRow| {
                let key = FactorKey::Car {
                    size: r.size_class,
                    fuel: known_fuel(name, &r.fuel_type)?,
                };
                Some((key, r.co2e_kg))
            }),
            "motorbike" => self.extend(data, |r: MotorbikeRow| {
                Some((FactorKey::Motorbike { size: r.size_class }, r.co2e_kg))
            }),
            "bus" => self.extend(data, |r: BusRow| {
                let key = FactorKey::Bus {
                    size: r.size_class,
                    fuel: known_fuel(name, &r.fuel_type)?,
                    occupancy: r.occupancy,
                    range: r.vehicle_range,
                };
                Some((key, r.co2e_kg))
            }),
            "train" => self.extend(data, |r: TrainRow| {
                let key = FactorKey::Train {
                    fuel: known_fuel(name, &r.fuel_type)?,
                    range: r.vehicle_range,
                };
                Some((key, r.co2e_kg))
            }),
            "plane" => self.extend(data, |r: PlaneRow| {
                let key = FactorKey::Plane {
                    seating: r.seating_class,
                    range: r.range_category,
                };
                Some((key, r.co2e_kg))
            }),
            "ferry" => self.extend(data, |r: FerryRow| {
                Some((FactorKey::Ferry { seating: r.seating_class }, r.co2e_kg))
            }),
            "active" => self.extend(data, |r: ActiveRow| {
                Some((FactorKey::Active(r.mode), r.co2e_kg))
            }),
            "heating" => self.extend(data, |r: HeatingRow| {
                let fuel: HeatingFuel = known_fuel(name, &r.fuel_type)?;
                Some((FactorKey::Heating(fuel), r.co2e_kg))
            }),
            "electricity" => self.extend(data, |r: ElectricityRow| {
                let fuel: ElectricityFuel = known_fuel(name, &r.fuel_type)?;
                Some((FactorKey::Electricity(fuel), r.co2e_kg))
            }),
            other => Err(Error::provider(format!("unknown emission factor table {other}"))),
        }
    }

    /// Adds the rows of `data`; rows mapped to `None` are skipped
    fn extend<D: DeserializeOwned>(
        &mut self,
        data: &[u8],
        key: impl Fn(D) -> Option<(FactorKey, f64)>,
    ) -> Result<(), Error> {
        for row in super::csv::deserialize(data) {
            if let Some((key, factor)) = key(row?) {
                self.0.insert(key, factor);
            }
        }
        Ok(())
    }

    /// Adds or replaces a single factor
    pub fn insert(&mut self, key: FactorKey, factor: f64) {
        self.0.insert(key, factor);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Fuel of a table row. Tables may list fuels without a calculation in this
/// crate; those rows are skipped.
fn known_fuel<T: DeserializeOwned>(table: &str, fuel: &str) -> Option<T> {
    let fuel = crate::categories::parse("fuel type", fuel);
    if let Err(e) = &fuel {
        log::warn!("skipping row of table {table}: {e}");
    }
    fuel.ok()
}

impl EmissionFactorSource for EmissionFactors {
    fn lookup(&self, key: &FactorKey) -> Result<f64, Error> {
        self.0
            .get(key)
            .copied()
            .ok_or_else(|| Error::Lookup(format!("{key:?}")))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lookup(key: FactorKey) -> Result<f64, Error> {
        EmissionFactors::bundled().unwrap().lookup(&key)
    }

    #[test]
    fn bundled_tables_load() {
        let factors = EmissionFactors::bundled().unwrap();
        assert_eq!(factors.len(), 28 + 4 + 24 + 6 + 14 + 3 + 3 + 11 + 2);
    }

    #[test]
    fn car() {
        let factor = lookup(FactorKey::Car {
            size: Size::Medium,
            fuel: CarFuel::Gasoline,
        });
        assert_eq!(factor.unwrap(), 0.231);
    }

    #[test]
    fn bus_occupancy_must_match_a_row() {
        let key = |occupancy| FactorKey::Bus {
            size: Size::Average,
            fuel: BusFuel::Average,
            occupancy,
            range: VehicleRange::LongDistance,
        };
        assert_eq!(lookup(key(80)).unwrap(), 0.0262);
        // no interpolation between buckets
        assert!(matches!(lookup(key(60)), Err(Error::Lookup(_))));
    }

    #[test]
    fn local_bus_has_no_factor() {
        let r = lookup(FactorKey::Bus {
            size: Size::Average,
            fuel: BusFuel::Average,
            occupancy: 50,
            range: VehicleRange::Local,
        });
        assert!(matches!(r, Err(Error::Lookup(_))));
    }

    #[test]
    fn plane_by_haul() {
        let short = lookup(FactorKey::Plane {
            seating: SeatingClass::Average,
            range: RangeCategory::ShortHaul,
        })
        .unwrap();
        let very_short = lookup(FactorKey::Plane {
            seating: SeatingClass::Average,
            range: RangeCategory::VeryShortHaul,
        })
        .unwrap();
        assert!(very_short > short);
    }

    #[test]
    fn insert_replaces() {
        let mut factors = EmissionFactors::default();
        assert!(factors.is_empty());
        let key = FactorKey::Active(ActiveMode::Bicycle);
        factors.insert(key, 1.0);
        factors.insert(key, 2.0);
        assert_eq!(factors.lookup(&key).unwrap(), 2.0);
    }

    #[test]
    fn rows_of_unknown_fuels_are_skipped() {
        let mut factors = EmissionFactors::default();
        let data = b"fuel_type,vehicle_range,co2e_kg\nelectric,local,0.05\nhydrogen,local,0.01\n";
        factors.extend_table("train", data).unwrap();
        assert_eq!(factors.len(), 1);
        let key = FactorKey::Train {
            fuel: TrainFuel::Electric,
            range: VehicleRange::Local,
        };
        assert_eq!(factors.lookup(&key).unwrap(), 0.05);
    }
}
