use serde::{Deserialize, Serialize};

/// Geographic coordinates, as reported by the current-conditions lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub lat: f64,
    pub lon: f64,
}

/// What the user asked for: a free-text city name or a point on the globe.
#[derive(Debug, Clone)]
pub enum WeatherQuery {
    City(String),
    Coords(Coords),
}

impl std::fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherQuery::City(name) => f.write_str(name),
            WeatherQuery::Coords(c) => write!(f, "{:.4}, {:.4}", c.lat, c.lon),
        }
    }
}

/// One weather condition as reported upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Broad category, e.g. "Clear", "Rain".
    pub main: String,
    /// Prose variant, e.g. "light rain".
    pub description: String,
    /// Upstream icon id, e.g. "10d".
    pub icon: String,
}

/// Current conditions for the resolved location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    /// Never empty; enforced when the upstream response is normalized.
    pub conditions: Vec<Condition>,
    pub sunrise_epoch: Option<i64>,
    pub sunset_epoch: Option<i64>,
    pub utc_offset_secs: Option<i32>,
}

impl CurrentConditions {
    /// The condition rendered first everywhere.
    pub fn primary(&self) -> &Condition {
        &self.conditions[0]
    }
}

/// One sampled day of the forecast feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub epoch: i64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    /// Never empty; see [`CurrentConditions::conditions`].
    pub conditions: Vec<Condition>,
}

impl DailyForecast {
    pub fn primary(&self) -> &Condition {
        &self.conditions[0]
    }
}

/// The normalized record both upstream responses collapse into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherBundle {
    pub location_name: String,
    pub coords: Coords,
    pub current: CurrentConditions,
    /// Chronological, at most five entries, one per calendar day.
    pub daily: Vec<DailyForecast>,
}
