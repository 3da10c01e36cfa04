use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::fs::{cached, BlobStorageProvider};
use crate::{iata_code, Airport, AirportGeocoder, Coordinate, Error};

static AIRPORTS_URL: &str =
    "https://raw.githubusercontent.com/davidmegginson/ourairports-data/main/airports.csv";

#[derive(Debug, serde::Deserialize, Clone)]
struct AirportRecord {
    name: String,
    latitude_deg: f64,
    longitude_deg: f64,
    #[serde(rename = "type")]
    type_: String,
    iso_country: String,
    iata_code: Option<String>,
}

/// Preference of an airport type when several airports share an IATA code
fn rank(type_: &str) -> u8 {
    match type_ {
        "large_airport" => 0,
        "medium_airport" => 1,
        "small_airport" => 2,
        _ => 3,
    }
}

async fn airports() -> Result<Vec<u8>, Error> {
    log::info!("downloading {AIRPORTS_URL}");
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    Ok(client
        .get(AIRPORTS_URL)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?
        .to_vec())
}

/// Airports with an IATA code, indexed by it.
#[derive(Debug, Clone, Default)]
pub struct Airports(HashMap<String, Airport>);

impl Airports {
    /// Reads airports from the [OurAirports](https://ourairports.com/data/) CSV.
    /// Heliports and airports without an IATA code are skipped. When an IATA
    /// code is shared, larger airports win over smaller ones.
    pub fn from_csv(data: &[u8]) -> Result<Self, Error> {
        let mut airports = HashMap::<String, (u8, Airport)>::new();
        for record in super::csv::deserialize::<AirportRecord>(data) {
            let record = record?;
            let Some(iata) = record.iata_code.filter(|c| !c.trim().is_empty()) else {
                continue;
            };
            if record.type_ == "heliport" || record.type_ == "closed" {
                continue;
            }
            let iata = iata_code(&iata);
            let preference = rank(&record.type_);
            if let Some((existing, airport)) = airports.get(&iata) {
                log::debug!("IATA code {iata} shared by {} and {}", airport.name, record.name);
                if *existing <= preference {
                    continue;
                }
            }
            let airport = Airport {
                iata: iata.clone(),
                name: record.name,
                country: record.iso_country,
                coordinate: Coordinate::new(record.latitude_deg, record.longitude_deg),
            };
            airports.insert(iata, (preference, airport));
        }
        Ok(Self(
            airports
                .into_iter()
                .map(|(iata, (_, airport))| (iata, airport))
                .collect(),
        ))
    }

    /// Returns airports from `provider`, downloading them the first time.
    pub async fn cached(provider: &impl BlobStorageProvider) -> Result<Self, Error> {
        let data = cached("airports.csv", airports(), provider).await?;
        Self::from_csv(&data)
    }

    pub fn get(&self, iata: &str) -> Option<&Airport> {
        self.0.get(&iata_code(iata))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[async_trait]
impl AirportGeocoder for Airports {
    async fn geocode_airport(&self, iata: &str) -> Result<Airport, Error> {
        self.get(iata)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("airport with IATA code `{iata}`")))
    }
}

/// [`Airports`] read from `provider` on the first airport lookup, so that
/// callers without flights never download them.
pub struct LazyAirports<P> {
    provider: P,
    airports: Mutex<Option<Arc<Airports>>>,
}

impl<P: BlobStorageProvider> LazyAirports<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            airports: Mutex::new(None),
        }
    }

    async fn airports(&self) -> Result<Arc<Airports>, Error> {
        let loaded = self.airports.lock().ok().and_then(|a| a.clone());
        if let Some(airports) = loaded {
            return Ok(airports);
        }
        let airports = Arc::new(Airports::cached(&self.provider).await?);
        log::info!("{} airports loaded", airports.len());
        if let Ok(mut slot) = self.airports.lock() {
            *slot = Some(airports.clone());
        }
        Ok(airports)
    }
}

#[async_trait]
impl<P: BlobStorageProvider> AirportGeocoder for LazyAirports<P> {
    async fn geocode_airport(&self, iata: &str) -> Result<Airport, Error> {
        self.airports().await?.geocode_airport(iata).await
    }
}
