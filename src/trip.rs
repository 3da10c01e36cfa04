use serde::{Deserialize, Serialize};

use crate::categories::{fuel_or_default, parse, parse_or_default};
use crate::{
    ActiveMode, BusOptions, Calculator, CarOptions, Error, FactorKey, FerryOptions, Location,
    MotorbikeOptions, PlaneOptions, RangeCategory, TrainOptions, TransportMode, TripDistance,
};

/// A business trip as received from a caller, with categorical values as text.
/// Omitted values take the defaults of the per-mode options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessTripRequest {
    pub transportation_mode: String,
    pub start: Option<Location>,
    pub destination: Option<Location>,
    pub stops: Option<Vec<Location>>,
    pub distance: Option<f64>,
    pub size: Option<String>,
    pub fuel_type: Option<String>,
    pub occupancy: Option<u8>,
    pub vehicle_range: Option<String>,
    pub seating: Option<String>,
    pub passengers: Option<u32>,
    pub roundtrip: Option<bool>,
}

/// A validated business trip
#[derive(Debug, Clone, PartialEq)]
pub enum BusinessTrip {
    Car(TripDistance, CarOptions),
    Motorbike(TripDistance, MotorbikeOptions),
    Bus(TripDistance, BusOptions),
    Train(TripDistance, TrainOptions),
    Plane(TripDistance, PlaneOptions),
    Ferry(TripDistance, FerryOptions),
}

impl BusinessTrip {
    pub fn mode(&self) -> TransportMode {
        match self {
            Self::Car(..) => TransportMode::Car,
            Self::Motorbike(..) => TransportMode::Motorbike,
            Self::Bus(..) => TransportMode::Bus,
            Self::Train(..) => TransportMode::Train,
            Self::Plane(..) => TransportMode::Plane,
            Self::Ferry(..) => TransportMode::Ferry,
        }
    }

    pub fn distance(&self) -> &TripDistance {
        match self {
            Self::Car(distance, _)
            | Self::Motorbike(distance, _)
            | Self::Bus(distance, _)
            | Self::Train(distance, _)
            | Self::Plane(distance, _)
            | Self::Ferry(distance, _) => distance,
        }
    }
}

/// Builds the stops from `start` and `destination` unless `stops` is given
fn stops(request: &BusinessTripRequest) -> Result<Option<Vec<Location>>, Error> {
    match (&request.stops, &request.start, &request.destination) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(Error::validation(
            "stops are mutually exclusive with start and destination",
        )),
        (Some(stops), None, None) => Ok(Some(stops.clone())),
        (None, Some(start), Some(destination)) => {
            Ok(Some(vec![start.clone(), destination.clone()]))
        }
        (None, Some(_), None) => Err(Error::validation("start given without destination")),
        (None, None, Some(_)) => Err(Error::validation("destination given without start")),
        (None, None, None) => Ok(None),
    }
}

impl TryFrom<BusinessTripRequest> for BusinessTrip {
    type Error = Error;

    fn try_from(request: BusinessTripRequest) -> Result<Self, Self::Error> {
        let mode: TransportMode = parse("transportation mode", &request.transportation_mode)?;
        let distance = TripDistance::new(request.distance, stops(&request)?)?;
        let size = request.size.as_deref();
        let fuel = request.fuel_type.as_deref();
        let range = request.vehicle_range.as_deref();
        let seating = request.seating.as_deref();

        Ok(match mode {
            TransportMode::Car => Self::Car(
                distance,
                CarOptions {
                    size: parse_or_default("size", size)?,
                    fuel: fuel_or_default(fuel)?,
                    passengers: request.passengers.unwrap_or(1),
                },
            ),
            TransportMode::Motorbike => Self::Motorbike(
                distance,
                MotorbikeOptions {
                    size: parse_or_default("size", size)?,
                },
            ),
            TransportMode::Bus => {
                let default = BusOptions::default();
                Self::Bus(
                    distance,
                    BusOptions {
                        size: parse_or_default("size", size)?,
                        fuel: fuel_or_default(fuel)?,
                        occupancy: request.occupancy.unwrap_or(default.occupancy),
                        range: parse_or_default("vehicle range", range)?,
                    },
                )
            }
            TransportMode::Train => Self::Train(
                distance,
                TrainOptions {
                    fuel: fuel_or_default(fuel)?,
                    range: parse_or_default("vehicle range", range)?,
                },
            ),
            TransportMode::Plane => Self::Plane(
                distance,
                PlaneOptions {
                    seating: parse_or_default("seating class", seating)?,
                    roundtrip: request.roundtrip.unwrap_or(false),
                },
            ),
            TransportMode::Ferry => Self::Ferry(
                distance,
                FerryOptions {
                    seating: parse_or_default("seating class", seating)?,
                },
            ),
        })
    }
}

/// Emissions of a business trip
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TripResult {
    /// kg CO2e
    pub emissions_kg: f64,
    pub distance_km: f64,
    pub range_category: RangeCategory,
}

impl TripResult {
    pub fn range_description(&self) -> &'static str {
        self.range_category.description()
    }
}

/// Mode of transportation of a commute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommutingMode {
    Car,
    Motorbike,
    Bus,
    Train,
    Bicycle,
    Pedelec,
    Foot,
}

/// A commute as received from a caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommutingRequest {
    pub transportation_mode: String,
    /// km per week
    pub weekly_distance: f64,
    pub size: Option<String>,
    pub fuel_type: Option<String>,
    pub occupancy: Option<u8>,
    pub vehicle_range: Option<String>,
    pub passengers: Option<u32>,
}

/// A validated commute. Commutes are always distance based.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommutingTrip {
    Car(CarOptions),
    Motorbike(MotorbikeOptions),
    Bus(BusOptions),
    Train(TrainOptions),
    Active(ActiveMode),
}

impl TryFrom<&CommutingRequest> for CommutingTrip {
    type Error = Error;

    fn try_from(request: &CommutingRequest) -> Result<Self, Self::Error> {
        let mode: CommutingMode = parse("transportation mode", &request.transportation_mode)?;
        let size = request.size.as_deref();
        let fuel = request.fuel_type.as_deref();
        let range = request.vehicle_range.as_deref();

        Ok(match mode {
            CommutingMode::Car => Self::Car(CarOptions {
                size: parse_or_default("size", size)?,
                fuel: fuel_or_default(fuel)?,
                passengers: request.passengers.unwrap_or(1),
            }),
            CommutingMode::Motorbike => Self::Motorbike(MotorbikeOptions {
                size: parse_or_default("size", size)?,
            }),
            CommutingMode::Bus => Self::Bus(BusOptions {
                size: parse_or_default("size", size)?,
                fuel: fuel_or_default(fuel)?,
                occupancy: request.occupancy.unwrap_or(BusOptions::default().occupancy),
                range: parse_or_default("vehicle range", range)?,
            }),
            CommutingMode::Train => Self::Train(TrainOptions {
                fuel: fuel_or_default(fuel)?,
                range: parse_or_default("vehicle range", range)?,
            }),
            CommutingMode::Bicycle => Self::Active(ActiveMode::Bicycle),
            CommutingMode::Pedelec => Self::Active(ActiveMode::Pedelec),
            CommutingMode::Foot => Self::Active(ActiveMode::Foot),
        })
    }
}

impl Calculator {
    /// Returns the emissions of a business trip.
    /// # Error
    /// Errors if the distance cannot be resolved or no emission factor matches the trip.
    pub async fn calc_co2_businesstrip(&self, trip: &BusinessTrip) -> Result<TripResult, Error> {
        let distance_km = self
            .resolver()
            .resolve(trip.distance(), trip.mode())
            .await?;
        let emissions_kg = match trip {
            BusinessTrip::Car(_, options) => self.car_emissions(distance_km, options),
            BusinessTrip::Motorbike(_, options) => self.motorbike_emissions(distance_km, options),
            BusinessTrip::Bus(_, options) => self.bus_emissions(distance_km, options),
            BusinessTrip::Train(_, options) => self.train_emissions(distance_km, options),
            BusinessTrip::Plane(_, options) => self.plane_emissions(distance_km, options),
            BusinessTrip::Ferry(_, options) => self.ferry_emissions(distance_km, options),
        }?;
        log::debug!(
            "{:?} trip of {distance_km:.1} km: {emissions_kg:.2} kg CO2e",
            trip.mode()
        );
        Ok(TripResult {
            emissions_kg,
            distance_km,
            range_category: RangeCategory::classify(distance_km),
        })
    }

    /// Validates `request` and returns the emissions of the business trip
    pub async fn calc_co2_businesstrip_request(
        &self,
        request: BusinessTripRequest,
    ) -> Result<TripResult, Error> {
        self.calc_co2_businesstrip(&BusinessTrip::try_from(request)?)
            .await
    }

    /// Returns the emissions in kg CO2e of commuting `weekly_distance` km in a week
    pub fn calc_co2_commuting(
        &self,
        weekly_distance: f64,
        trip: &CommutingTrip,
    ) -> Result<f64, Error> {
        match trip {
            CommutingTrip::Car(options) => self.car_emissions(weekly_distance, options),
            CommutingTrip::Motorbike(options) => self.motorbike_emissions(weekly_distance, options),
            CommutingTrip::Bus(options) => self.bus_emissions(weekly_distance, options),
            CommutingTrip::Train(options) => self.train_emissions(weekly_distance, options),
            CommutingTrip::Active(mode) => {
                Ok(weekly_distance * self.factor(FactorKey::Active(*mode))?)
            }
        }
    }

    /// Validates `request` and returns the emissions in kg CO2e of the commute
    pub fn calc_co2_commuting_request(&self, request: &CommutingRequest) -> Result<f64, Error> {
        self.calc_co2_commuting(request.weekly_distance, &CommutingTrip::try_from(request)?)
    }
}
