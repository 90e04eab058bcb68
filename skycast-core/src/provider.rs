//! OpenWeatherMap client: current conditions plus the 3-hourly forecast
//! feed, normalized into a single [`WeatherBundle`].

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::model::{
    Condition, Coords, CurrentConditions, DailyForecast, WeatherBundle, WeatherQuery,
};

/// Forecast cadence: upstream emits one data point every 3 hours.
const POINTS_PER_DAY: usize = 8;
/// Upper bound on sampled daily entries.
const MAX_FORECAST_DAYS: usize = 5;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Failures surfaced to the caller. `LocationNotFound` is the only kind with
/// its own user-facing message; everything else renders as a generic fetch
/// failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no location matched \"{query}\"")]
    LocationNotFound { query: String },

    #[error("weather request failed")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {status}: {body}")]
    UpstreamStatus { status: StatusCode, body: String },

    #[error("failed to parse upstream response")]
    Parse(#[from] serde_json::Error),

    #[error("upstream response missing {0}")]
    MalformedResponse(&'static str),
}

impl FetchError {
    /// True for the "unknown place" case, false for the generic family.
    pub fn is_location_not_found(&self) -> bool {
        matches!(self, Self::LocationNotFound { .. })
    }
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Point the client at a different endpoint root (tests).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url, http: Client::new() }
    }

    /// Resolve current conditions for the query, then the forecast for the
    /// coordinates the first call reported. The forecast call never starts
    /// unless the current-conditions call succeeded. No retries, no caching.
    pub async fn fetch_weather(&self, query: &WeatherQuery) -> Result<WeatherBundle, FetchError> {
        let current = self.fetch_current(query).await?;
        let coords = Coords { lat: current.coord.lat, lon: current.coord.lon };
        let forecast = self.fetch_forecast(coords).await?;

        let daily = sample_daily(forecast.list)?;
        debug!(location = %current.name, days = daily.len(), "normalized weather");

        let OwCurrentResponse { name, timezone, main, wind, weather, sys, .. } = current;
        let (sunrise_epoch, sunset_epoch) = match sys {
            Some(sys) => (sys.sunrise, sys.sunset),
            None => (None, None),
        };

        Ok(WeatherBundle {
            location_name: name,
            coords,
            current: CurrentConditions {
                temperature_c: main.temp,
                humidity_pct: main.humidity,
                wind_speed_mps: wind.speed,
                conditions: conditions_from(weather)?,
                sunrise_epoch,
                sunset_epoch,
                utc_offset_secs: timezone,
            },
            daily,
        })
    }

    async fn fetch_current(&self, query: &WeatherQuery) -> Result<OwCurrentResponse, FetchError> {
        let url = format!("{}/weather", self.base_url);

        let mut req = self
            .http
            .get(&url)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")]);

        req = match query {
            WeatherQuery::City(name) => req.query(&[("q", name.as_str())]),
            WeatherQuery::Coords(Coords { lat, lon }) => {
                req.query(&[("lat", lat.to_string()), ("lon", lon.to_string())])
            }
        };

        let res = req.send().await?;
        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::LocationNotFound { query: query.to_string() });
        }
        if !status.is_success() {
            return Err(FetchError::UpstreamStatus { status, body: truncate_body(&body) });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_forecast(&self, coords: Coords) -> Result<OwForecastResponse, FetchError> {
        let url = format!("{}/forecast", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coords.lat.to_string()),
                ("lon", coords.lon.to_string()),
                ("units", "metric".to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::UpstreamStatus { status, body: truncate_body(&body) });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Every 8th point starting from the first (one per calendar day at the
/// feed's anchor offset), capped at five days.
fn sample_daily(entries: Vec<OwForecastEntry>) -> Result<Vec<DailyForecast>, FetchError> {
    entries
        .into_iter()
        .step_by(POINTS_PER_DAY)
        .take(MAX_FORECAST_DAYS)
        .map(|entry| {
            Ok(DailyForecast {
                epoch: entry.dt,
                temp_min_c: entry.main.temp_min,
                temp_max_c: entry.main.temp_max,
                conditions: conditions_from(entry.weather)?,
            })
        })
        .collect()
}

/// Normalization boundary for the non-empty invariant: consumers index the
/// primary condition without re-checking.
fn conditions_from(raw: Vec<OwCondition>) -> Result<Vec<Condition>, FetchError> {
    if raw.is_empty() {
        return Err(FetchError::MalformedResponse("condition list"));
    }

    Ok(raw
        .into_iter()
        .map(|w| Condition { main: w.main, description: w.description, icon: w.icon })
        .collect())
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: OwCoord,
    timezone: Option<i32>,
    main: OwCurrentMain,
    wind: OwWind,
    weather: Vec<OwCondition>,
    sys: Option<OwSys>,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwCondition>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_string() }
}
