use std::sync::Arc;

use futures::future::try_join_all;

use crate::distances::{apply_detour, haversine, path_length};
use crate::{
    AirportGeocoder, Coordinate, Error, Geocoder, Location, Router, RoutingProfile,
    TransportMode,
};

/// How the distance of a trip is obtained: given directly, or measured
/// along an ordered list of stops.
#[derive(Debug, Clone, PartialEq)]
pub enum TripDistance {
    /// A distance in km, trusted as given
    Distance(f64),
    /// At least two stops, in travel order
    Stops(Vec<Location>),
}

impl TripDistance {
    /// # Error
    /// Errors with [`Error::Validation`] unless exactly one of `distance` and `stops`
    /// is given, or when fewer than 2 stops are given.
    pub fn new(distance: Option<f64>, stops: Option<Vec<Location>>) -> Result<Self, Error> {
        match (distance, stops) {
            (Some(distance), None) => Ok(Self::Distance(distance)),
            (None, Some(stops)) => {
                check_stops(&stops)?;
                Ok(Self::Stops(stops))
            }
            (Some(_), Some(_)) => {
                Err(Error::validation("distance and stops are mutually exclusive"))
            }
            (None, None) => Err(Error::validation("either distance or stops is required")),
        }
    }

    /// A trip between two locations
    pub fn between(start: impl Into<Location>, destination: impl Into<Location>) -> Self {
        Self::Stops(vec![start.into(), destination.into()])
    }
}

fn check_stops(stops: &[Location]) -> Result<(), Error> {
    if stops.len() < 2 {
        return Err(Error::validation(format!(
            "at least 2 stops are required, {} given",
            stops.len()
        )));
    }
    Ok(())
}

fn endpoints(stops: &[Location], mode: TransportMode) -> Result<(&Location, &Location), Error> {
    match stops {
        [start, destination] => Ok((start, destination)),
        _ => Err(Error::validation(format!(
            "{mode:?} trips have exactly 2 stops, {} given",
            stops.len()
        ))),
    }
}

fn iata(location: &Location) -> Result<&str, Error> {
    match location {
        Location::Text(code) => Ok(code.as_str()),
        Location::Structured(_) => Err(Error::validation(
            "plane trips require IATA codes as start and destination",
        )),
    }
}

/// Resolves the distance of a trip, geocoding stops when needed.
#[derive(Clone, Default)]
pub struct DistanceResolver {
    geocoder: Option<Arc<dyn Geocoder>>,
    airports: Option<Arc<dyn AirportGeocoder>>,
    router: Option<Arc<dyn Router>>,
}

impl DistanceResolver {
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_airports(mut self, airports: Arc<dyn AirportGeocoder>) -> Self {
        self.airports = Some(airports);
        self
    }

    /// Measures car and motorbike trips along the road network instead of
    /// applying a detour to the great-circle distance.
    pub fn with_router(mut self, router: Arc<dyn Router>) -> Self {
        self.router = Some(router);
        self
    }

    fn geocoder(&self) -> Result<&dyn Geocoder, Error> {
        self.geocoder.as_deref().ok_or_else(|| {
            Error::Configuration("a geocoder is required to resolve stops".to_string())
        })
    }

    fn airports(&self) -> Result<&dyn AirportGeocoder, Error> {
        self.airports.as_deref().ok_or_else(|| {
            Error::Configuration("an airport geocoder is required to resolve airports".to_string())
        })
    }

    /// Returns the distance in km of `distance` travelled by `mode`.
    ///
    /// * a given distance is returned unchanged
    /// * planes fly the great-circle distance between two airports
    /// * ferries sail the great-circle distance between two ports
    /// * other modes travel the sum of the great-circle distances between
    ///   consecutive stops, corrected by [`apply_detour`], or the routed distance
    ///   for cars and motorbikes when a [`Router`] is configured.
    ///
    /// # Error
    /// Any failure to geocode a stop aborts the resolution.
    pub async fn resolve(
        &self,
        distance: &TripDistance,
        mode: TransportMode,
    ) -> Result<f64, Error> {
        let stops = match distance {
            TripDistance::Distance(distance) => return Ok(*distance),
            TripDistance::Stops(stops) => stops,
        };
        check_stops(stops)?;

        match mode {
            TransportMode::Plane => {
                let (start, destination) = endpoints(stops, mode)?;
                self.resolve_airports(iata(start)?, iata(destination)?).await
            }
            TransportMode::Ferry => {
                let (start, destination) = endpoints(stops, mode)?;
                self.resolve_pair(start, destination).await
            }
            TransportMode::Car
            | TransportMode::Motorbike
            | TransportMode::Bus
            | TransportMode::Train => {
                let coordinates = self.geocode_all(stops).await?;
                match (&self.router, mode) {
                    (Some(router), TransportMode::Car | TransportMode::Motorbike) => {
                        router
                            .route_distance(&coordinates, RoutingProfile::DrivingCar)
                            .await
                    }
                    _ => Ok(apply_detour(path_length(&coordinates), mode)),
                }
            }
        }
    }

    /// Geocodes all `stops`. Requests are concurrent; the result is in the order of `stops`.
    pub async fn geocode_all(&self, stops: &[Location]) -> Result<Vec<Coordinate>, Error> {
        let geocoder = self.geocoder()?;
        let places = try_join_all(stops.iter().map(|stop| geocoder.geocode(stop))).await?;
        Ok(places.into_iter().map(|place| place.coordinate).collect())
    }

    /// Great-circle distance between two locations, without detour
    pub async fn resolve_pair(
        &self,
        start: &Location,
        destination: &Location,
    ) -> Result<f64, Error> {
        let coordinates = self
            .geocode_all(&[start.clone(), destination.clone()])
            .await?;
        Ok(haversine(coordinates[0], coordinates[1]))
    }

    /// Great-circle distance between two airports, by IATA code
    pub async fn resolve_airports(&self, start: &str, destination: &str) -> Result<f64, Error> {
        let airports = self.airports()?;
        let start = airports.geocode_airport(start).await?;
        let destination = airports.geocode_airport(destination).await?;
        let distance = haversine(start.coordinate, destination.coordinate);
        log::debug!("{} -> {}: {distance:.1} km", start.name, destination.name);
        Ok(distance)
    }
}
