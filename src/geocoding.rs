use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Coordinate, Error};

/// A place descriptor as given by a user: either free text
/// (`"Frankfurt, Germany"`, or an IATA code for flights) or structured fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Text(String),
    Structured(StructuredAddress),
}

impl From<&str> for Location {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Fields of a structured geocoding query. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredAddress {
    pub address: Option<String>,
    pub neighbourhood: Option<String>,
    pub borough: Option<String>,
    pub locality: Option<String>,
    pub county: Option<String>,
    pub region: Option<String>,
    pub postalcode: Option<String>,
    pub country: Option<String>,
}

impl StructuredAddress {
    /// The non-empty fields as `(name, value)` query parameters
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("address", &self.address),
            ("neighbourhood", &self.neighbourhood),
            ("borough", &self.borough),
            ("locality", &self.locality),
            ("county", &self.county),
            ("region", &self.region),
            ("postalcode", &self.postalcode),
            ("country", &self.country),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (name, v))
        })
        .collect()
    }
}

/// A geocoded [`Location`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub country: String,
    pub coordinate: Coordinate,
    /// How precisely the location was resolved, e.g. `address`, `locality` or `country`
    pub resolution: String,
}

/// A geocoded airport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub iata: String,
    pub name: String,
    pub country: String,
    pub coordinate: Coordinate,
}

/// Canonical form of an IATA code: trimmed and upper case
pub fn iata_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Profile used to compute a routed distance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingProfile {
    DrivingCar,
    CyclingRegular,
}

impl RoutingProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DrivingCar => "driving-car",
            Self::CyclingRegular => "cycling-regular",
        }
    }
}

/// Resolves [`Location`]s to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// # Error
    /// Errors with [`Error::NotFound`] when nothing matches `location`
    async fn geocode(&self, location: &Location) -> Result<Place, Error>;
}

/// Resolves IATA codes to airports
#[async_trait]
pub trait AirportGeocoder: Send + Sync {
    /// # Error
    /// Errors with [`Error::NotFound`] when `iata` is not a known airport
    async fn geocode_airport(&self, iata: &str) -> Result<Airport, Error>;
}

/// Computes the distance of a route over a road or path network
#[async_trait]
pub trait Router: Send + Sync {
    /// Returns the distance in km of the route through `coordinates`, in order.
    async fn route_distance(
        &self,
        coordinates: &[Coordinate],
        profile: RoutingProfile,
    ) -> Result<f64, Error>;
}
