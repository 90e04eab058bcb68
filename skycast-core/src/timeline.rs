//! Day/night timeline: where "now" sits between sunrise and sunset.

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Derived display state. Recomputed on a timer by the consumer, never
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub local_time: DateTime<FixedOffset>,
    pub is_daytime: bool,
    /// 0–100 along the sunrise→sunset track.
    pub position_pct: f64,
}

/// Place `now` on the sunrise→sunset track of the given location.
///
/// Both boundaries are exclusive: at the exact sunrise or sunset instant the
/// day flag is off. A degenerate interval (sunset at or before sunrise, as
/// polar-region feeds can report) pins the position to 0% with the day flag
/// off instead of dividing by zero.
pub fn compute(
    now: DateTime<Utc>,
    sunrise_epoch: i64,
    sunset_epoch: i64,
    utc_offset_secs: i32,
) -> Timeline {
    let offset = FixedOffset::east_opt(utc_offset_secs).unwrap_or_else(|| Utc.fix());
    let local_time = now.with_timezone(&offset);

    let now_epoch = now.timestamp();
    let is_daytime = now_epoch > sunrise_epoch && now_epoch < sunset_epoch;

    let span = sunset_epoch - sunrise_epoch;
    let position_pct = if span <= 0 {
        0.0
    } else {
        ((now_epoch - sunrise_epoch) as f64 / span as f64 * 100.0).clamp(0.0, 100.0)
    };

    Timeline { local_time, is_daytime, position_pct }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUNRISE: i64 = 1_717_389_060;
    const SUNSET: i64 = SUNRISE + 14 * 3600;

    fn at(epoch: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(epoch, 0).expect("valid epoch")
    }

    #[test]
    fn sunrise_instant_is_zero_and_not_day() {
        let tl = compute(at(SUNRISE), SUNRISE, SUNSET, 0);
        assert_eq!(tl.position_pct, 0.0);
        assert!(!tl.is_daytime);
    }

    #[test]
    fn sunset_instant_is_full_and_not_day() {
        let tl = compute(at(SUNSET), SUNRISE, SUNSET, 0);
        assert_eq!(tl.position_pct, 100.0);
        assert!(!tl.is_daytime);
    }

    #[test]
    fn midpoint_is_half_and_day() {
        let tl = compute(at((SUNRISE + SUNSET) / 2), SUNRISE, SUNSET, 0);
        assert_eq!(tl.position_pct, 50.0);
        assert!(tl.is_daytime);
    }

    #[test]
    fn clamps_outside_the_interval() {
        let before = compute(at(SUNRISE - 3600), SUNRISE, SUNSET, 0);
        assert_eq!(before.position_pct, 0.0);
        assert!(!before.is_daytime);

        let after = compute(at(SUNSET + 3600), SUNRISE, SUNSET, 0);
        assert_eq!(after.position_pct, 100.0);
        assert!(!after.is_daytime);
    }

    #[test]
    fn degenerate_interval_is_zero_not_day() {
        let tl = compute(at(SUNRISE), SUNRISE, SUNRISE, 0);
        assert_eq!(tl.position_pct, 0.0);
        assert!(!tl.is_daytime);

        let inverted = compute(at(SUNRISE), SUNRISE, SUNRISE - 60, 0);
        assert_eq!(inverted.position_pct, 0.0);
    }

    #[test]
    fn local_time_applies_offset() {
        let tl = compute(at(SUNRISE), SUNRISE, SUNSET, 3600);
        assert_eq!(tl.local_time.timestamp(), SUNRISE);
        assert_eq!(tl.local_time.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        let tl = compute(at(SUNRISE), SUNRISE, SUNSET, 100_000_000);
        assert_eq!(tl.local_time.offset().local_minus_utc(), 0);
    }
}
