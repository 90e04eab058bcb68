//! Human-friendly output: the current-conditions card, forecast rows, and
//! the day/night timeline bar.

use std::io::Write;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Offset, Utc};

use skycast_core::prefs::{Favorite, RecentSearch};
use skycast_core::{TemperatureUnit, WeatherBundle, timeline, units};

const TIMELINE_WIDTH: usize = 40;

pub fn weather(bundle: &WeatherBundle, unit: TemperatureUnit) {
    let current = &bundle.current;
    let condition = current.primary();

    println!("{}", bundle.location_name);
    println!(
        "  {}  {:.1}{}",
        condition.description,
        units::convert(current.temperature_c, unit),
        unit.symbol(),
    );
    println!(
        "  humidity {}%   wind {:.1} m/s",
        current.humidity_pct, current.wind_speed_mps
    );

    if bundle.daily.is_empty() {
        return;
    }

    let offset = current.utc_offset_secs.unwrap_or(0);
    println!();
    println!("5-day forecast");
    for day in &bundle.daily {
        println!(
            "  {}  {:>5.1}{} / {:<5.1}{}  {}",
            local_date(day.epoch, offset),
            units::convert(day.temp_min_c, unit),
            unit.symbol(),
            units::convert(day.temp_max_c, unit),
            unit.symbol(),
            day.primary().description,
        );
    }
}

pub fn timeline_once(bundle: &WeatherBundle) {
    if let Some(line) = timeline_line(bundle, Utc::now()) {
        println!();
        println!("{line}");
    }
}

/// Redraw the timeline once a second until Ctrl-C. The interval is dropped
/// when the view exits.
pub async fn live_timeline(bundle: &WeatherBundle) {
    if timeline_line(bundle, Utc::now()).is_none() {
        println!("No sunrise/sunset data for this location.");
        return;
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    println!();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                if let Some(line) = timeline_line(bundle, Utc::now()) {
                    print!("\r{line}");
                    let _ = std::io::stdout().flush();
                }
            }
        }
    }
    println!();
}

pub fn recent_searches(searches: &[RecentSearch]) {
    if searches.is_empty() {
        println!("No recent searches.");
        return;
    }

    for search in searches {
        let when = DateTime::from_timestamp_millis(search.timestamp_ms)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".into());
        println!("  {when}  {}", search.name);
    }
}

pub fn favorites(favorites: &[Favorite]) {
    if favorites.is_empty() {
        println!("No favorite locations yet.");
        return;
    }

    for favorite in favorites {
        println!("  {}", favorite.name);
    }
}

fn timeline_line(bundle: &WeatherBundle, now: DateTime<Utc>) -> Option<String> {
    let current = &bundle.current;
    let sunrise = current.sunrise_epoch?;
    let sunset = current.sunset_epoch?;
    let offset = current.utc_offset_secs.unwrap_or(0);

    let tl = timeline::compute(now, sunrise, sunset, offset);

    let filled =
        (((tl.position_pct / 100.0) * TIMELINE_WIDTH as f64).round() as usize).min(TIMELINE_WIDTH);
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(TIMELINE_WIDTH - filled));

    Some(format!(
        "{} {} [{bar}] sunrise {}  sunset {}",
        tl.local_time.format("%H:%M:%S"),
        if tl.is_daytime { "day  " } else { "night" },
        local_clock(sunrise, offset),
        local_clock(sunset, offset),
    ))
}

fn local_clock(epoch: i64, offset_secs: i32) -> String {
    match local_datetime(epoch, offset_secs) {
        Some(dt) => dt.format("%H:%M").to_string(),
        None => "--:--".into(),
    }
}

fn local_date(epoch: i64, offset_secs: i32) -> String {
    match local_datetime(epoch, offset_secs) {
        Some(dt) => dt.format("%a %b %d").to_string(),
        None => "-".into(),
    }
}

fn local_datetime(epoch: i64, offset_secs: i32) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(offset_secs).unwrap_or_else(|| Utc.fix());
    DateTime::from_timestamp(epoch, 0).map(|dt| dt.with_timezone(&offset))
}
