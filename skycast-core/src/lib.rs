//! Core library for the `skycast` weather dashboard.
//!
//! This crate defines:
//! - Credentials & configuration handling
//! - The normalized weather record and the OpenWeatherMap client producing it
//! - User preference state (unit, recent searches, favorites) with key-value
//!   persistence
//! - Unit conversion and the day/night timeline computation
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod locate;
pub mod model;
pub mod prefs;
pub mod provider;
pub mod timeline;
pub mod units;

pub use config::Config;
pub use model::{Condition, Coords, CurrentConditions, DailyForecast, WeatherBundle, WeatherQuery};
pub use prefs::{FileStorage, Preferences, Storage};
pub use provider::{FetchError, OpenWeatherClient};
pub use timeline::Timeline;
pub use units::TemperatureUnit;
