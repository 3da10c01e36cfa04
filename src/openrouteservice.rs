//! [openrouteservice](https://openrouteservice.org) client: Pelias geocoding
//! and the directions API.
use std::path::Path;

use async_trait::async_trait;
use reqwest::{header, StatusCode, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::Deserialize;

use crate::{
    iata_code, Airport, AirportGeocoder, Coordinate, Error, Geocoder, Location, Place, Router,
    RoutingProfile,
};

/// Environment variable read by [`OpenRouteServiceConfig::from_env`]
pub static API_KEY_VARIABLE: &str = "ORS_API_KEY";

#[derive(Debug, Clone)]
pub struct OpenRouteServiceConfig {
    pub api_key: String,
    pub base_url: String,
    /// Retries of transient failures, with exponential backoff
    pub max_retries: u32,
}

impl OpenRouteServiceConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openrouteservice.org".to_string(),
            max_retries: 5,
        }
    }

    /// Reads the API key from a file containing only the key
    pub fn from_key_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let key = std::fs::read_to_string(path.as_ref())?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::Configuration(format!(
                "empty API key in {}",
                path.as_ref().display()
            )));
        }
        Ok(Self::new(key))
    }

    /// Reads the API key from the environment variable [`API_KEY_VARIABLE`]
    pub fn from_env() -> Result<Self, Error> {
        std::env::var(API_KEY_VARIABLE)
            .map(Self::new)
            .map_err(|_| Error::Configuration(format!("{API_KEY_VARIABLE} is not set")))
    }
}

/// Client implementing [`Geocoder`], [`AirportGeocoder`] and [`Router`]
pub struct OpenRouteService {
    config: OpenRouteServiceConfig,
    client: ClientWithMiddleware,
}

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Geometry,
    properties: Properties,
}

#[derive(Deserialize)]
struct Geometry {
    /// longitude, latitude
    coordinates: (f64, f64),
}

#[derive(Deserialize)]
struct Properties {
    name: String,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    layer: Option<String>,
    #[serde(default)]
    addendum: Option<Addendum>,
}

#[derive(Deserialize)]
struct Addendum {
    osm: Option<OsmAddendum>,
}

#[derive(Deserialize)]
struct OsmAddendum {
    iata: Option<String>,
}

#[derive(Deserialize)]
struct Directions {
    routes: Vec<Route>,
}

#[derive(Deserialize)]
struct Route {
    summary: Summary,
}

#[derive(Deserialize)]
struct Summary {
    /// in meters
    #[serde(default)]
    distance: f64,
}

impl Feature {
    fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.geometry.coordinates.1, self.geometry.coordinates.0)
    }

    fn iata(&self) -> Option<&str> {
        self.properties
            .addendum
            .as_ref()
            .and_then(|a| a.osm.as_ref())
            .and_then(|osm| osm.iata.as_deref())
    }
}

fn describe(location: &Location) -> String {
    match location {
        Location::Text(text) => text.clone(),
        Location::Structured(address) => address
            .fields()
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Returns the best match of a Pelias search
fn parse_place(data: &[u8], location: &Location) -> Result<Place, Error> {
    let collection: FeatureCollection = serde_json::from_slice(data)?;
    let feature = collection
        .features
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound(describe(location)))?;
    Ok(Place {
        coordinate: feature.coordinate(),
        name: feature.properties.name,
        country: feature.properties.country.unwrap_or_default(),
        resolution: feature.properties.layer.unwrap_or_default(),
    })
}

/// Returns the first feature of a Pelias search tagged with the IATA code `iata`
fn parse_airport(data: &[u8], iata: &str) -> Result<Airport, Error> {
    let collection: FeatureCollection = serde_json::from_slice(data)?;
    let iata = iata_code(iata);
    let feature = collection
        .features
        .into_iter()
        .find(|f| f.iata().map(iata_code).as_ref() == Some(&iata))
        .ok_or_else(|| Error::NotFound(format!("airport with IATA code `{iata}`")))?;
    Ok(Airport {
        iata,
        coordinate: feature.coordinate(),
        name: feature.properties.name,
        country: feature.properties.country.unwrap_or_default(),
    })
}

/// Returns the distance of the first route in km
fn parse_route_distance(data: &[u8]) -> Result<f64, Error> {
    let directions: Directions = serde_json::from_slice(data)?;
    directions
        .routes
        .first()
        .map(|route| route.summary.distance / 1000.0)
        .ok_or_else(|| Error::NotFound("route between the stops".to_string()))
}

impl OpenRouteService {
    pub fn new(config: OpenRouteServiceConfig) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(reqwest::Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        Self { config, client }
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, Error> {
        let url = format!("{}{path}", self.config.base_url);
        let params = std::iter::once(("api_key", self.config.api_key.as_str()))
            .chain(params.iter().copied());
        Url::parse_with_params(&url, params).map_err(|e| Error::Configuration(e.to_string()))
    }

    async fn send(&self, request: reqwest_middleware::RequestBuilder) -> Result<Vec<u8>, Error> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        if status == StatusCode::OK {
            Ok(body)
        } else {
            Err(Error::provider(format!(
                "openrouteservice returned {status}: {}",
                String::from_utf8_lossy(&body)
            )))
        }
    }

    async fn search(&self, path: &str, params: &[(&str, &str)]) -> Result<Vec<u8>, Error> {
        log::debug!("GET {path} {params:?}");
        let url = self.url(path, params)?;
        self.send(self.client.get(url)).await
    }
}

#[async_trait]
impl Geocoder for OpenRouteService {
    async fn geocode(&self, location: &Location) -> Result<Place, Error> {
        let data = match location {
            Location::Text(text) => {
                self.search("/geocode/search", &[("text", text.as_str()), ("size", "1")])
                    .await?
            }
            Location::Structured(address) => {
                let mut params = address.fields();
                if params.is_empty() {
                    return Err(Error::validation("empty structured address"));
                }
                params.push(("size", "1"));
                self.search("/geocode/search/structured", &params).await?
            }
        };
        let place = parse_place(&data, location)?;
        log::info!(
            "geocoded {} to {} ({})",
            describe(location),
            place.name,
            place.resolution
        );
        Ok(place)
    }
}

#[async_trait]
impl AirportGeocoder for OpenRouteService {
    async fn geocode_airport(&self, iata: &str) -> Result<Airport, Error> {
        let text = format!("{} Airport", iata_code(iata));
        let data = self.search("/geocode/search", &[("text", text.as_str())]).await?;
        parse_airport(&data, iata)
    }
}

#[async_trait]
impl Router for OpenRouteService {
    async fn route_distance(
        &self,
        coordinates: &[Coordinate],
        profile: RoutingProfile,
    ) -> Result<f64, Error> {
        let path = format!("/v2/directions/{}", profile.as_str());
        let body = serde_json::json!({
            "coordinates": coordinates
                .iter()
                .map(|c| [c.longitude, c.latitude])
                .collect::<Vec<_>>(),
        });
        log::debug!("POST {path} ({} coordinates)", coordinates.len());
        let url = format!("{}{path}", self.config.base_url);
        let request = self
            .client
            .post(url)
            .header(header::AUTHORIZATION, self.config.api_key.as_str())
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&body)?);
        parse_route_distance(&self.send(request).await?)
    }
}
