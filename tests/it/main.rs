use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use co2calculator::distances::{apply_detour, haversine};
use co2calculator::*;

fn berlin() -> Coordinate {
    Coordinate::new(52.5200, 13.4050)
}

fn munich() -> Coordinate {
    Coordinate::new(48.1351, 11.5820)
}

fn hamburg() -> Coordinate {
    Coordinate::new(53.5511, 9.9937)
}

/// Geocodes free text from a fixed table and counts calls
#[derive(Default)]
struct FakeGeocoder {
    places: HashMap<String, Coordinate>,
    calls: AtomicUsize,
}

impl FakeGeocoder {
    fn new() -> Arc<Self> {
        let places = [
            ("Berlin", berlin()),
            ("Munich", munich()),
            ("Hamburg", hamburg()),
        ]
        .into_iter()
        .map(|(name, coordinate)| (name.to_string(), coordinate))
        .collect();
        Arc::new(Self {
            places,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, location: &Location) -> Result<Place, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Location::Text(name) = location else {
            return Err(Error::NotFound(format!("{location:?}")));
        };
        let coordinate = self
            .places
            .get(name)
            .copied()
            .ok_or_else(|| Error::NotFound(name.clone()))?;
        Ok(Place {
            name: name.clone(),
            country: "DE".to_string(),
            coordinate,
            resolution: "locality".to_string(),
        })
    }
}

#[async_trait]
impl AirportGeocoder for FakeGeocoder {
    async fn geocode_airport(&self, iata: &str) -> Result<Airport, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (name, coordinate) = match iata {
            "BER" => ("Berlin Brandenburg", Coordinate::new(52.3650, 13.5010)),
            "BRU" => ("Brussels", Coordinate::new(50.9008, 4.4865)),
            _ => return Err(Error::NotFound(iata.to_string())),
        };
        Ok(Airport {
            iata: iata.to_string(),
            name: name.to_string(),
            country: "".to_string(),
            coordinate,
        })
    }
}

/// Returns a fixed route distance and counts calls
struct FakeRouter {
    distance: f64,
    calls: AtomicUsize,
}

#[async_trait]
impl Router for FakeRouter {
    async fn route_distance(
        &self,
        coordinates: &[Coordinate],
        profile: RoutingProfile,
    ) -> Result<f64, Error> {
        assert_eq!(profile, RoutingProfile::DrivingCar);
        assert!(coordinates.len() >= 2);
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.distance)
    }
}

/// The same factor for every key
struct FlatFactor(f64);

impl EmissionFactorSource for FlatFactor {
    fn lookup(&self, _: &FactorKey) -> Result<f64, Error> {
        Ok(self.0)
    }
}

fn calculator(geocoder: &Arc<FakeGeocoder>) -> Calculator {
    Calculator::new(Arc::new(EmissionFactors::bundled().unwrap()))
        .with_geocoder(geocoder.clone())
        .with_airports(geocoder.clone())
}

fn stops(names: &[&str]) -> TripDistance {
    TripDistance::new(None, Some(names.iter().map(|n| Location::from(*n)).collect())).unwrap()
}

#[tokio::test]
async fn two_stops() -> Result<(), Error> {
    let geocoder = FakeGeocoder::new();
    let (_, distance) = calculator(&geocoder)
        .calc_co2_bus(&stops(&["Berlin", "Munich"]), &BusOptions::default())
        .await?;

    assert_eq!(geocoder.calls(), 2);
    assert_eq!(distance, haversine(berlin(), munich()) * 1.5);
    Ok(())
}

#[tokio::test]
async fn detour_is_applied_once_to_the_sum() -> Result<(), Error> {
    let geocoder = FakeGeocoder::new();
    let (emissions, distance) = calculator(&geocoder)
        .calc_co2_train(
            &stops(&["Hamburg", "Berlin", "Munich"]),
            &TrainOptions::default(),
        )
        .await?;

    let segments = haversine(hamburg(), berlin()) + haversine(berlin(), munich());
    assert_eq!(geocoder.calls(), 3);
    assert_eq!(distance, apply_detour(segments, TransportMode::Train));
    assert_eq!(emissions, distance * 0.0329);
    Ok(())
}

#[tokio::test]
async fn order_of_stops_is_kept() -> Result<(), Error> {
    let geocoder = FakeGeocoder::new();
    let calculator = calculator(&geocoder);
    let options = TrainOptions::default();
    let (_, via_berlin) = calculator
        .calc_co2_train(&stops(&["Hamburg", "Berlin", "Munich"]), &options)
        .await?;
    let (_, via_munich) = calculator
        .calc_co2_train(&stops(&["Hamburg", "Munich", "Berlin"]), &options)
        .await?;

    let expected = haversine(hamburg(), munich()) + haversine(munich(), berlin());
    assert_eq!(via_munich, expected * 1.2);
    assert!(via_munich > via_berlin);
    Ok(())
}

#[tokio::test]
async fn unknown_stop_aborts() {
    let geocoder = FakeGeocoder::new();
    let r = calculator(&geocoder)
        .calc_co2_car(&stops(&["Berlin", "Atlantis"]), &CarOptions::default())
        .await;
    assert!(matches!(r, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn routed_car_trip() -> Result<(), Error> {
    let geocoder = FakeGeocoder::new();
    let router = Arc::new(FakeRouter {
        distance: 42.0,
        calls: AtomicUsize::new(0),
    });
    let calculator = calculator(&geocoder).with_router(router.clone());

    for names in [&["Berlin", "Munich"][..], &["Berlin", "Hamburg", "Munich"][..]] {
        let (emissions, distance) = calculator
            .calc_co2_car(&stops(names), &CarOptions::default())
            .await?;
        assert_eq!(distance, 42.0);
        assert_eq!((emissions * 100.0).round() / 100.0, 9.03);
    }
    assert_eq!(router.calls.load(Ordering::SeqCst), 2);
    assert_eq!(geocoder.calls(), 5);

    // only cars and motorbikes are routed
    let (_, distance) = calculator
        .calc_co2_bus(&stops(&["Berlin", "Munich"]), &BusOptions::default())
        .await?;
    assert_eq!(distance, haversine(berlin(), munich()) * 1.5);
    assert_eq!(router.calls.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn car_without_router_uses_detour() -> Result<(), Error> {
    let geocoder = FakeGeocoder::new();
    let (_, distance) = calculator(&geocoder)
        .calc_co2_motorbike(&stops(&["Berlin", "Munich"]), &MotorbikeOptions::default())
        .await?;
    assert_eq!(distance, haversine(berlin(), munich()) * 1.3);
    Ok(())
}

/// Berlin (BER) to Brussels (BRU) is ca. 643 km
#[tokio::test]
async fn plane() -> Result<(), Error> {
    let geocoder = FakeGeocoder::new();
    let calculator = calculator(&geocoder);

    let one_way = PlaneOptions::default();
    let (emissions, distance) = calculator.calc_co2_plane("BER", "BRU", &one_way).await?;
    assert_eq!(geocoder.calls(), 2);
    assert!((distance - 642.6).abs() < 1.0, "{distance}");
    assert_eq!(RangeCategory::classify(distance), RangeCategory::ShortHaul);
    assert_eq!(emissions, distance * 0.17031);

    let roundtrip = PlaneOptions {
        roundtrip: true,
        ..Default::default()
    };
    let (double, same_distance) = calculator.calc_co2_plane("BER", "BRU", &roundtrip).await?;
    assert_eq!(double, 2.0 * emissions);
    assert_eq!(same_distance, distance);
    Ok(())
}

#[tokio::test]
async fn plane_business_trip() -> Result<(), Error> {
    let geocoder = FakeGeocoder::new();
    let result = calculator(&geocoder)
        .calc_co2_businesstrip_request(BusinessTripRequest {
            transportation_mode: "plane".to_string(),
            start: Some("BER".into()),
            destination: Some("BRU".into()),
            seating: Some("economy_class".to_string()),
            roundtrip: Some(true),
            ..Default::default()
        })
        .await?;
    assert_eq!(result.range_category.name(), "short haul");
    assert_eq!(result.range_description(), "500 to 1500 km");
    assert_eq!(result.emissions_kg, 2.0 * result.distance_km * 0.16751);
    Ok(())
}

#[tokio::test]
async fn plane_has_two_airports() {
    let geocoder = FakeGeocoder::new();
    let trip = BusinessTrip::Plane(stops(&["BER", "BRU", "BER"]), PlaneOptions::default());
    let r = calculator(&geocoder).calc_co2_businesstrip(&trip).await;
    assert!(matches!(r, Err(Error::Validation(_))));
    assert_eq!(geocoder.calls(), 0);
}

#[tokio::test]
async fn unknown_airport() {
    let geocoder = FakeGeocoder::new();
    let r = calculator(&geocoder)
        .calc_co2_plane("BER", "ZZZ", &PlaneOptions::default())
        .await;
    assert!(matches!(r, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn ferry_is_not_corrected() -> Result<(), Error> {
    let geocoder = FakeGeocoder::new();
    let calculator = calculator(&geocoder);
    let (emissions, distance) = calculator
        .calc_co2_ferry(&stops(&["Hamburg", "Berlin"]), &FerryOptions::default())
        .await?;
    assert_eq!(geocoder.calls(), 2);
    assert_eq!(distance, haversine(hamburg(), berlin()));
    assert_eq!(emissions, distance * 0.1129);

    let r = calculator
        .calc_co2_ferry(
            &stops(&["Hamburg", "Berlin", "Munich"]),
            &FerryOptions::default(),
        )
        .await;
    assert!(matches!(r, Err(Error::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn emissions_are_distance_times_factor() -> Result<(), Error> {
    let calculator = Calculator::new(Arc::new(FlatFactor(0.5)));
    let distance = TripDistance::Distance(80.0);
    let car = CarOptions {
        passengers: 4,
        ..Default::default()
    };
    assert_eq!(calculator.calc_co2_car(&distance, &car).await?.0, 10.0);
    let motorbike = MotorbikeOptions::default();
    assert_eq!(calculator.calc_co2_motorbike(&distance, &motorbike).await?.0, 40.0);
    let bus = BusOptions::default();
    assert_eq!(calculator.calc_co2_bus(&distance, &bus).await?.0, 40.0);
    let train = TrainOptions::default();
    assert_eq!(calculator.calc_co2_train(&distance, &train).await?.0, 40.0);
    let ferry = FerryOptions::default();
    assert_eq!(calculator.calc_co2_ferry(&distance, &ferry).await?.0, 40.0);
    Ok(())
}

#[tokio::test]
async fn missing_factor_is_lookup_error() {
    let calculator = Calculator::new(Arc::new(EmissionFactors::default()));
    let r = calculator
        .calc_co2_train(&TripDistance::Distance(10.0), &TrainOptions::default())
        .await;
    assert!(matches!(r, Err(Error::Lookup(_))));
}

#[tokio::test]
async fn reference_scenarios() -> Result<(), Error> {
    let calculator = Calculator::new(Arc::new(EmissionFactors::bundled()?));
    let round = |x: f64| (x * 100.0).round() / 100.0;

    let car = CarOptions {
        size: Size::Medium,
        fuel: CarFuel::Gasoline,
        passengers: 3,
    };
    let (emissions, _) = calculator.calc_co2_car(&TripDistance::Distance(444.0), &car).await?;
    assert_eq!(round(emissions), 34.19);

    let bus = BusOptions {
        size: Size::Large,
        fuel: BusFuel::Diesel,
        occupancy: 80,
        range: VehicleRange::LongDistance,
    };
    let (emissions, _) = calculator.calc_co2_bus(&TripDistance::Distance(549.0), &bus).await?;
    assert_eq!(round(emissions), 12.3);

    let train = TrainOptions {
        fuel: TrainFuel::Electric,
        range: VehicleRange::LongDistance,
    };
    let (emissions, _) = calculator
        .calc_co2_train(&TripDistance::Distance(1162.0), &train)
        .await?;
    assert_eq!(round(emissions), 37.18);

    let bicycle = CommutingTrip::Active(ActiveMode::Bicycle);
    assert_eq!(round(calculator.calc_co2_commuting(60.0, &bicycle)?), 0.54);
    Ok(())
}

/// Verifies the haversine distance against an independent implementation
#[test]
fn haversine_agrees_with_geoutils() {
    for (from, to) in [(berlin(), munich()), (hamburg(), munich())] {
        let expected = geoutils::Location::new(from.latitude, from.longitude)
            .haversine_distance_to(&geoutils::Location::new(to.latitude, to.longitude))
            .meters()
            / 1000.0;
        let actual = haversine(from, to);
        assert!((actual - expected).abs() / expected < 1e-3, "{actual} vs {expected}");
    }
}
