//! Best-effort device location via IP geolocation.
//! Failures are logged and otherwise ignored; callers fall back to asking
//! for a city name.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::model::Coords;

const IP_API_URL: &str = "http://ip-api.com/json";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Look up the machine's approximate coordinates. Returns `None` on any
/// failure.
pub async fn current_position() -> Option<Coords> {
    let client = match Client::builder().timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS)).build()
    {
        Ok(c) => c,
        Err(err) => {
            warn!("Failed to create geolocation client: {err}");
            return None;
        }
    };

    position_from(&client, IP_API_URL).await
}

async fn position_from(client: &Client, url: &str) -> Option<Coords> {
    let response = match client.get(url).send().await {
        Ok(r) => r,
        Err(err) => {
            debug!("Geolocation request failed: {err}");
            return None;
        }
    };

    if !response.status().is_success() {
        debug!("Geolocation returned status {}", response.status());
        return None;
    }

    let body: IpApiResponse = match response.json().await {
        Ok(b) => b,
        Err(err) => {
            debug!("Geolocation parse error: {err}");
            return None;
        }
    };

    if body.status != "success" {
        debug!("Geolocation lookup unsuccessful");
        return None;
    }

    match (body.lat, body.lon) {
        (Some(lat), Some(lon)) => Some(Coords { lat, lon }),
        _ => None,
    }
}
