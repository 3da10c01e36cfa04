//! Estimates greenhouse-gas emissions, in kg CO2e, of business trips and
//! commutes by car, motorbike, bus, train, plane and ferry, and of heating
//! and electricity consumption.
//!
//! A trip is given either by its distance or by its stops. Stops are
//! geocoded and measured along great circles, corrected by a detour factor
//! for the mode of transportation; the distance then selects an emission
//! factor together with the categorical attributes of the trip.
#![forbid(unsafe_code)]
mod airports;
pub mod categories;
pub mod csv;
pub mod distances;
mod energy;
mod error;
mod factors;
pub mod fs;
mod geocoding;
mod modes;
pub mod openrouteservice;
mod ranges;
mod resolver;
mod trip;

pub use airports::*;
pub use categories::{
    ActiveMode, BusFuel, CarFuel, ElectricityFuel, FerryClass, HeatingFuel, SeatingClass, Size,
    TrainFuel, TransportMode,
};
pub use distances::Coordinate;
pub use energy::*;
pub use error::Error;
pub use factors::*;
pub use geocoding::*;
pub use modes::*;
pub use ranges::*;
pub use resolver::*;
pub use trip::*;
