use std::{error::Error, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use itertools::Itertools;
use num_format::{Locale, ToFormattedString};
use simple_logger::SimpleLogger;

use co2calculator::{
    categories::parse,
    fs::LocalDisk,
    openrouteservice::{OpenRouteService, OpenRouteServiceConfig},
    BusinessTripRequest, Calculator, CommutingRequest, EmissionFactors, LazyAirports, Location,
};

const ABOUT: &'static str = r#"Computes greenhouse-gas emissions (kg CO2e) of business trips, commutes,
heating and electricity.

Trips given by start and destination are geocoded with openrouteservice; its API key is read
from `--api-key-file` or the `ORS_API_KEY` environment variable.
Airports are resolved offline from the OurAirports database, cached in `database/airports.csv`.
"#;

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
enum AirportSource {
    Ourairports,
    Openrouteservice,
}

#[derive(Parser, Debug)]
#[command(author, version, about = ABOUT)]
struct Cli {
    /// File containing the openrouteservice API key
    #[arg(long)]
    api_key_file: Option<PathBuf>,
    /// Directory with the tables `emission_factors_{mode}.csv`. Defaults to the bundled tables
    #[arg(long)]
    emission_factors: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t=AirportSource::Ourairports)]
    airports: AirportSource,
    /// Measure car and motorbike trips along the road network
    #[arg(long)]
    route: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Computes the emissions of every business trip in a CSV file
    BusinessTrips {
        /// CSV with columns `transportation_mode,start,destination,distance_km,size,fuel_type,
        /// occupancy,vehicle_range,seating,passengers,roundtrip`
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Computes the weekly emissions of a commute
    Commuting {
        #[arg(long)]
        mode: String,
        /// km per week
        #[arg(long)]
        weekly_distance: f64,
        #[arg(long)]
        size: Option<String>,
        #[arg(long)]
        fuel_type: Option<String>,
        #[arg(long)]
        occupancy: Option<u8>,
        #[arg(long)]
        vehicle_range: Option<String>,
        #[arg(long)]
        passengers: Option<u32>,
    },
    /// Computes the emissions of heating
    Heating {
        #[arg(long)]
        consumption: f64,
        /// One of `kwh`, `l`, `kg`, `m3`
        #[arg(long, default_value = "kwh")]
        unit: String,
        #[arg(long)]
        fuel_type: String,
    },
    /// Computes the emissions of electricity consumption
    Electricity {
        /// kWh
        #[arg(long)]
        consumption: f64,
        #[arg(long, default_value = "german_energy_mix")]
        fuel_type: String,
    },
}

#[derive(serde::Deserialize)]
struct TripIn {
    transportation_mode: String,
    start: Option<String>,
    destination: Option<String>,
    distance_km: Option<f64>,
    size: Option<String>,
    fuel_type: Option<String>,
    occupancy: Option<u8>,
    vehicle_range: Option<String>,
    seating: Option<String>,
    passengers: Option<u32>,
    roundtrip: Option<bool>,
}

#[derive(serde::Serialize)]
struct TripOut {
    transportation_mode: String,
    start: Option<String>,
    destination: Option<String>,
    distance_km: Option<f64>,
    range_category: Option<&'static str>,
    co2e_kg: Option<f64>,
    /// Why the trip could not be computed
    error: Option<String>,
}

impl From<&TripIn> for BusinessTripRequest {
    fn from(trip: &TripIn) -> Self {
        Self {
            transportation_mode: trip.transportation_mode.clone(),
            start: trip.start.as_deref().map(Location::from),
            destination: trip.destination.as_deref().map(Location::from),
            stops: None,
            distance: trip.distance_km,
            size: trip.size.clone(),
            fuel_type: trip.fuel_type.clone(),
            occupancy: trip.occupancy,
            vehicle_range: trip.vehicle_range.clone(),
            seating: trip.seating.clone(),
            passengers: trip.passengers,
            roundtrip: trip.roundtrip,
        }
    }
}

fn with_collaborators(
    cli: &Cli,
    calculator: Calculator,
) -> Result<Calculator, Box<dyn Error>> {
    let config = match &cli.api_key_file {
        Some(path) => Some(OpenRouteServiceConfig::from_key_file(path)?),
        None => OpenRouteServiceConfig::from_env().ok(),
    };
    let ors = config.map(|config| Arc::new(OpenRouteService::new(config)));

    let mut calculator = calculator;
    if let Some(ors) = &ors {
        calculator = calculator.with_geocoder(ors.clone());
        if cli.route {
            calculator = calculator.with_router(ors.clone());
        }
    } else {
        log::warn!("no openrouteservice API key; only trips with a distance can be computed");
    }

    Ok(match (cli.airports, &ors) {
        (AirportSource::Ourairports, _) => {
            calculator.with_airports(Arc::new(LazyAirports::new(LocalDisk::default())))
        }
        (AirportSource::Openrouteservice, Some(ors)) => calculator.with_airports(ors.clone()),
        (AirportSource::Openrouteservice, None) => {
            return Err("`--airports openrouteservice` requires an API key".into())
        }
    })
}

async fn business_trips(
    calculator: &Calculator,
    input: &PathBuf,
    output: &PathBuf,
) -> Result<(), Box<dyn Error>> {
    let data = std::fs::read(input)?;
    let trips = co2calculator::csv::deserialize::<TripIn>(&data)
        .collect::<Result<Vec<_>, _>>()?;
    log::info!("{} trips to compute", trips.len());

    let mut results = Vec::with_capacity(trips.len());
    for trip in &trips {
        let result = calculator
            .calc_co2_businesstrip_request(BusinessTripRequest::from(trip))
            .await;
        let out = match result {
            Ok(result) => TripOut {
                transportation_mode: trip.transportation_mode.clone(),
                start: trip.start.clone(),
                destination: trip.destination.clone(),
                distance_km: Some(result.distance_km),
                range_category: Some(result.range_category.name()),
                co2e_kg: Some(result.emissions_kg),
                error: None,
            },
            Err(e) => {
                log::error!("{} trip failed: {e}", trip.transportation_mode);
                TripOut {
                    transportation_mode: trip.transportation_mode.clone(),
                    start: trip.start.clone(),
                    destination: trip.destination.clone(),
                    distance_km: trip.distance_km,
                    range_category: None,
                    co2e_kg: None,
                    error: Some(e.to_string()),
                }
            }
        };
        results.push(out);
    }

    let totals = results
        .iter()
        .filter_map(|r| r.co2e_kg.map(|co2e| (r.transportation_mode.as_str(), co2e)))
        .into_group_map();
    for (mode, emissions) in totals.into_iter().sorted_by_key(|(mode, _)| *mode) {
        let total = emissions.iter().sum::<f64>().round() as i64;
        println!(
            "{mode}: {} trips, {} kg CO2e",
            emissions.len(),
            total.to_formatted_string(&Locale::en)
        );
    }

    std::fs::write(output, co2calculator::csv::serialize(results.into_iter())?)?;
    log::info!("results written to {}", output.display());
    Ok(())
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()?;

    let cli = Cli::parse();

    let factors = match &cli.emission_factors {
        Some(directory) => EmissionFactors::from_directory(directory)?,
        None => EmissionFactors::bundled()?,
    };
    let calculator = Calculator::new(Arc::new(factors));

    match &cli.command {
        Command::BusinessTrips { input, output } => {
            let calculator = with_collaborators(&cli, calculator)?;
            business_trips(&calculator, input, output).await?;
        }
        Command::Commuting {
            mode,
            weekly_distance,
            size,
            fuel_type,
            occupancy,
            vehicle_range,
            passengers,
        } => {
            let request = CommutingRequest {
                transportation_mode: mode.clone(),
                weekly_distance: *weekly_distance,
                size: size.clone(),
                fuel_type: fuel_type.clone(),
                occupancy: *occupancy,
                vehicle_range: vehicle_range.clone(),
                passengers: *passengers,
            };
            let co2e = calculator.calc_co2_commuting_request(&request)?;
            println!("{co2e:.2} kg CO2e per week");
        }
        Command::Heating {
            consumption,
            unit,
            fuel_type,
        } => {
            let co2e = calculator.calc_co2_heating(
                *consumption,
                parse("unit", unit)?,
                parse("fuel type", fuel_type)?,
            )?;
            println!("{co2e:.2} kg CO2e");
        }
        Command::Electricity {
            consumption,
            fuel_type,
        } => {
            let co2e =
                calculator.calc_co2_electricity(*consumption, parse("fuel type", fuel_type)?)?;
            println!("{co2e:.2} kg CO2e");
        }
    }
    Ok(())
}
