use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    AirportGeocoder, BusFuel, CarFuel, DistanceResolver, EmissionFactorSource, Error, FactorKey,
    FerryClass, Geocoder, RangeCategory, Router, SeatingClass, Size, TrainFuel, TransportMode,
    TripDistance, VehicleRange,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarOptions {
    /// Defaults to [`Size::Average`]
    pub size: Size,
    /// Defaults to [`CarFuel::Average`]
    pub fuel: CarFuel,
    /// People sharing the car, including the driver. Defaults to 1.
    pub passengers: u32,
}

impl Default for CarOptions {
    fn default() -> Self {
        Self {
            size: Size::Average,
            fuel: CarFuel::Average,
            passengers: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorbikeOptions {
    /// Defaults to [`Size::Average`]
    pub size: Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusOptions {
    /// Defaults to [`Size::Average`]
    pub size: Size,
    /// Defaults to [`BusFuel::Average`]
    pub fuel: BusFuel,
    /// Percentage of occupied seats; one of 20, 50, 80 or 100. Defaults to 50.
    pub occupancy: u8,
    /// Defaults to [`VehicleRange::LongDistance`]
    pub range: VehicleRange,
}

impl Default for BusOptions {
    fn default() -> Self {
        Self {
            size: Size::Average,
            fuel: BusFuel::Average,
            occupancy: 50,
            range: VehicleRange::LongDistance,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainOptions {
    /// Defaults to [`TrainFuel::Average`]
    pub fuel: TrainFuel,
    /// Defaults to [`VehicleRange::LongDistance`]
    pub range: VehicleRange,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneOptions {
    /// Defaults to [`SeatingClass::Average`]
    pub seating: SeatingClass,
    /// Whether the flight is taken back and forth. Defaults to `false`.
    pub roundtrip: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FerryOptions {
    /// Defaults to [`FerryClass::Average`]
    pub seating: FerryClass,
}

/// Computes emissions of trips.
///
/// Collaborators are injected at construction; all of them but the emission
/// factors are optional and only required by trips that need them (e.g.
/// a [`Geocoder`] for trips given as stops).
#[derive(Clone)]
pub struct Calculator {
    resolver: DistanceResolver,
    factors: Arc<dyn EmissionFactorSource>,
}

impl Calculator {
    pub fn new(factors: Arc<dyn EmissionFactorSource>) -> Self {
        Self {
            resolver: DistanceResolver::default(),
            factors,
        }
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.resolver = self.resolver.with_geocoder(geocoder);
        self
    }

    pub fn with_airports(mut self, airports: Arc<dyn AirportGeocoder>) -> Self {
        self.resolver = self.resolver.with_airports(airports);
        self
    }

    pub fn with_router(mut self, router: Arc<dyn Router>) -> Self {
        self.resolver = self.resolver.with_router(router);
        self
    }

    pub fn resolver(&self) -> &DistanceResolver {
        &self.resolver
    }

    pub(crate) fn factor(&self, key: FactorKey) -> Result<f64, Error> {
        self.factors.lookup(&key)
    }

    /// Emissions in kg CO2e of `distance` km by car, per passenger
    pub fn car_emissions(&self, distance: f64, options: &CarOptions) -> Result<f64, Error> {
        if options.passengers == 0 {
            return Err(Error::validation("a car carries at least 1 passenger"));
        }
        let factor = self.factor(FactorKey::Car {
            size: options.size,
            fuel: options.fuel,
        })?;
        Ok(distance * factor / options.passengers as f64)
    }

    /// Emissions in kg CO2e of `distance` km by motorbike
    pub fn motorbike_emissions(
        &self,
        distance: f64,
        options: &MotorbikeOptions,
    ) -> Result<f64, Error> {
        let factor = self.factor(FactorKey::Motorbike { size: options.size })?;
        Ok(distance * factor)
    }

    /// Emissions in kg CO2e of `distance` km by bus, per passenger
    pub fn bus_emissions(&self, distance: f64, options: &BusOptions) -> Result<f64, Error> {
        let factor = self.factor(FactorKey::Bus {
            size: options.size,
            fuel: options.fuel,
            occupancy: options.occupancy,
            range: options.range,
        })?;
        Ok(distance * factor)
    }

    /// Emissions in kg CO2e of `distance` km by train, per passenger
    pub fn train_emissions(&self, distance: f64, options: &TrainOptions) -> Result<f64, Error> {
        let factor = self.factor(FactorKey::Train {
            fuel: options.fuel,
            range: options.range,
        })?;
        Ok(distance * factor)
    }

    /// Emissions in kg CO2e of a flight of `distance` km, per passenger.
    /// The haul of the flight selects the factor; roundtrips count twice.
    pub fn plane_emissions(&self, distance: f64, options: &PlaneOptions) -> Result<f64, Error> {
        let factor = self.factor(FactorKey::Plane {
            seating: options.seating,
            range: RangeCategory::classify(distance),
        })?;
        let emissions = distance * factor;
        Ok(if options.roundtrip {
            2.0 * emissions
        } else {
            emissions
        })
    }

    /// Emissions in kg CO2e of `distance` km by ferry, per passenger
    pub fn ferry_emissions(&self, distance: f64, options: &FerryOptions) -> Result<f64, Error> {
        let factor = self.factor(FactorKey::Ferry {
            seating: options.seating,
        })?;
        Ok(distance * factor)
    }

    /// Returns `(emissions in kg CO2e, distance in km)` of a car trip
    pub async fn calc_co2_car(
        &self,
        distance: &TripDistance,
        options: &CarOptions,
    ) -> Result<(f64, f64), Error> {
        let distance = self.resolver.resolve(distance, TransportMode::Car).await?;
        Ok((self.car_emissions(distance, options)?, distance))
    }

    /// Returns `(emissions in kg CO2e, distance in km)` of a motorbike trip
    pub async fn calc_co2_motorbike(
        &self,
        distance: &TripDistance,
        options: &MotorbikeOptions,
    ) -> Result<(f64, f64), Error> {
        let distance = self
            .resolver
            .resolve(distance, TransportMode::Motorbike)
            .await?;
        Ok((self.motorbike_emissions(distance, options)?, distance))
    }

    /// Returns `(emissions in kg CO2e, distance in km)` of a bus trip
    pub async fn calc_co2_bus(
        &self,
        distance: &TripDistance,
        options: &BusOptions,
    ) -> Result<(f64, f64), Error> {
        let distance = self.resolver.resolve(distance, TransportMode::Bus).await?;
        Ok((self.bus_emissions(distance, options)?, distance))
    }

    /// Returns `(emissions in kg CO2e, distance in km)` of a train trip
    pub async fn calc_co2_train(
        &self,
        distance: &TripDistance,
        options: &TrainOptions,
    ) -> Result<(f64, f64), Error> {
        let distance = self.resolver.resolve(distance, TransportMode::Train).await?;
        Ok((self.train_emissions(distance, options)?, distance))
    }

    /// Returns `(emissions in kg CO2e, distance in km)` of a flight between two
    /// airports given by IATA code. The distance is one way, also for roundtrips.
    pub async fn calc_co2_plane(
        &self,
        start: &str,
        destination: &str,
        options: &PlaneOptions,
    ) -> Result<(f64, f64), Error> {
        let distance = self
            .resolver
            .resolve_airports(start, destination)
            .await?;
        Ok((self.plane_emissions(distance, options)?, distance))
    }

    /// Returns `(emissions in kg CO2e, distance in km)` of a ferry trip
    pub async fn calc_co2_ferry(
        &self,
        distance: &TripDistance,
        options: &FerryOptions,
    ) -> Result<(f64, f64), Error> {
        let distance = self.resolver.resolve(distance, TransportMode::Ferry).await?;
        Ok((self.ferry_emissions(distance, options)?, distance))
    }
}
