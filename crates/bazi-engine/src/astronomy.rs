//! Julian Day conversion and a low-precision solar position model.
//!
//! Only what is needed to bound the 24 solar terms: civil date ↔ Julian Day,
//! the sun's ecliptic longitude from a truncated series, and a bisection
//! search for the instant the longitude crosses a given degree value.
//!
//! The series ignores nutation, aberration and ΔT, so term instants carry an
//! error of roughly a quarter of an hour against published ephemerides. That
//! is well inside the resolution of a two-hour pillar.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use tracing::trace;

use crate::error::{BaziError, Result};

/// Julian Day of the J2000.0 epoch (2000-01-01 12:00 TT).
pub const J2000: f64 = 2_451_545.0;

/// Bisection stops once the bracket is narrower than this many days (~8.6 s).
pub const CROSSING_PRECISION_DAYS: f64 = 1e-4;

/// Upper bound on bisection steps. A 60-day bracket converges in 20.
const MAX_ITERATIONS: usize = 64;

const DAYS_PER_CENTURY: f64 = 36_525.0;

// ── Julian Day ──────────────────────────────────────────────────────────────

/// Convert a Gregorian date/time to a Julian Day number.
///
/// The time of day is taken as-is: pass UT to get a UT Julian Day.
///
/// # Examples
///
/// ```
/// use bazi_engine::astronomy::to_julian_day;
/// use chrono::NaiveDate;
///
/// let noon = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// assert_eq!(to_julian_day(&noon), 2_451_545.0);
/// ```
pub fn to_julian_day(datetime: &NaiveDateTime) -> f64 {
    let mut year = datetime.year();
    let mut month = datetime.month() as i32;
    // January and February count as months 13 and 14 of the previous year.
    if month <= 2 {
        year -= 1;
        month += 12;
    }

    let a = year.div_euclid(100);
    let b = 2 - a + a.div_euclid(4);

    let seconds = datetime.num_seconds_from_midnight() as f64
        + datetime.nanosecond() as f64 / 1_000_000_000.0;
    let day = datetime.day() as f64 + seconds / 86_400.0;

    let year_days = (365.25 * (year + 4716) as f64).floor();
    let month_days = (30.6001 * (month + 1) as f64).floor();
    year_days + month_days + day + b as f64 - 1524.5
}

/// Convert a Julian Day number back to a Gregorian date/time, rounded to the
/// millisecond.
///
/// # Errors
///
/// Returns [`BaziError::InvalidInput`] if the Julian Day is not finite or the
/// date falls outside chrono's representable range.
pub fn from_julian_day(jd: f64) -> Result<NaiveDateTime> {
    if !jd.is_finite() {
        return Err(BaziError::InvalidInput(format!(
            "non-finite Julian Day {jd}"
        )));
    }

    let shifted = jd + 0.5;
    let z = shifted.floor();
    let fraction = shifted - z;

    let a = if z < 2_299_161.0 {
        z
    } else {
        let alpha = ((z - 1_867_216.25) / 36_524.25).floor();
        z + 1.0 + alpha - (alpha / 4.0).floor()
    };
    let b = a + 1524.0;
    let c = ((b - 122.1) / 365.25).floor();
    let d = (365.25 * c).floor();
    let e = ((b - d) / 30.6001).floor();

    let day = (b - d - (30.6001 * e).floor()) as u32;
    let month = (if e < 14.0 { e - 1.0 } else { e - 13.0 }) as u32;
    let year = (if month > 2 { c - 4716.0 } else { c - 4715.0 }) as i32;

    let midnight = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            BaziError::InvalidInput(format!("Julian Day {jd} outside representable dates"))
        })?;

    let millis = (fraction * 86_400_000.0).round() as i64;
    Ok(midnight + Duration::milliseconds(millis))
}

// ── Solar longitude ─────────────────────────────────────────────────────────

/// Wrap an angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed angular difference `a - b` wrapped into `[-180, 180)`.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    (a - b + 180.0).rem_euclid(360.0) - 180.0
}

/// Geometric ecliptic longitude of the sun in degrees, `[0, 360)`.
///
/// Mean longitude plus the equation of centre (three terms of the mean
/// anomaly series).
pub fn solar_longitude(jd: f64) -> f64 {
    let t = (jd - J2000) / DAYS_PER_CENTURY;
    let t2 = t * t;
    let t3 = t2 * t;

    let mean_longitude = 280.46645 + 36_000.76983 * t + 0.000_303_2 * t2;
    let anomaly_degrees = 357.5291 + 35_999.0503 * t - 0.000_155_9 * t2 - 0.000_000_48 * t3;
    let mean_anomaly = anomaly_degrees.to_radians();

    let centre = (1.9146 - 0.004_817 * t - 0.000_014 * t2) * mean_anomaly.sin()
        + (0.019_993 - 0.000_101 * t) * (2.0 * mean_anomaly).sin()
        + 0.000_29 * (3.0 * mean_anomaly).sin();

    normalize_degrees(mean_longitude + centre)
}

/// Find the Julian Day in `[low_jd, high_jd]` at which the solar longitude
/// equals `target_degrees`.
///
/// The caller must supply a bracket holding exactly one crossing; any span
/// under ~180 days qualifies, because the sun advances monotonically.
///
/// # Errors
///
/// Returns [`BaziError::SolarTermSearch`] if the bracket does not contain the
/// crossing or the search fails to converge. Both indicate a wrong bracket.
pub fn find_longitude_crossing(target_degrees: f64, low_jd: f64, high_jd: f64) -> Result<f64> {
    let target = normalize_degrees(target_degrees);
    let offset = |jd: f64| angle_difference(solar_longitude(jd), target);

    let (mut low, mut high) = (low_jd, high_jd);
    if low >= high || offset(low) > 0.0 || offset(high) < 0.0 {
        return Err(BaziError::SolarTermSearch(format!(
            "longitude {target}° not bracketed by JD {low_jd}..{high_jd}"
        )));
    }

    for iteration in 0..MAX_ITERATIONS {
        if high - low < CROSSING_PRECISION_DAYS {
            let jd = (low + high) / 2.0;
            trace!(target, iteration, jd, "longitude crossing converged");
            return Ok(jd);
        }
        let mid = (low + high) / 2.0;
        if offset(mid) >= 0.0 {
            high = mid;
        } else {
            low = mid;
        }
    }

    Err(BaziError::SolarTermSearch(format!(
        "longitude {target}° not reached in {MAX_ITERATIONS} steps over JD {low_jd}..{high_jd}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    // ── Julian Day tests ────────────────────────────────────────────────

    #[test]
    fn test_julian_day_j2000() {
        assert_eq!(to_julian_day(&datetime(2000, 1, 1, 12, 0, 0)), J2000);
    }

    #[test]
    fn test_julian_day_1900_midnight() {
        assert_eq!(to_julian_day(&datetime(1900, 1, 1, 0, 0, 0)), 2_415_020.5);
    }

    #[test]
    fn test_julian_day_february_uses_previous_year() {
        // 2024-03-01 is the day after the leap day 2024-02-29.
        let feb29 = to_julian_day(&datetime(2024, 2, 29, 0, 0, 0));
        let mar1 = to_julian_day(&datetime(2024, 3, 1, 0, 0, 0));
        assert_eq!(mar1 - feb29, 1.0);
    }

    #[test]
    fn test_from_julian_day_j2000() {
        assert_eq!(
            from_julian_day(J2000).unwrap(),
            datetime(2000, 1, 1, 12, 0, 0)
        );
    }

    #[test]
    fn test_from_julian_day_keeps_seconds() {
        let dt = datetime(2024, 2, 4, 16, 27, 7);
        assert_eq!(from_julian_day(to_julian_day(&dt)).unwrap(), dt);
    }

    #[test]
    fn test_from_julian_day_rejects_nan() {
        assert!(from_julian_day(f64::NAN).is_err());
    }

    // ── Solar longitude tests ───────────────────────────────────────────

    #[test]
    fn test_solar_longitude_at_j2000() {
        let lon = solar_longitude(J2000);
        assert!((lon - 280.382).abs() < 0.01, "got {lon}");
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(370.0), 10.0);
        assert_eq!(normalize_degrees(-15.0), 345.0);
        assert_eq!(normalize_degrees(0.0), 0.0);
    }

    #[test]
    fn test_angle_difference_wraps() {
        assert!((angle_difference(1.0, 359.0) - 2.0).abs() < 1e-12);
        assert!((angle_difference(359.0, 1.0) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_crossing_finds_spring_equinox_2024() {
        // Published: 2024-03-20 03:06 UTC. The truncated series lands within half an hour.
        let approx = to_julian_day(&datetime(2024, 3, 20, 0, 0, 0));
        let jd = find_longitude_crossing(0.0, approx - 20.0, approx + 20.0).unwrap();
        let published = to_julian_day(&datetime(2024, 3, 20, 3, 6, 0));
        let off = jd - published;
        assert!(off.abs() < 0.5 / 24.0, "off by {off} days");
    }

    #[test]
    fn test_crossing_all_24_targets_within_tolerance() {
        let start = to_julian_day(&datetime(2024, 2, 4, 0, 0, 0));
        for i in 0..24 {
            let target = normalize_degrees(315.0 + 15.0 * i as f64);
            let approx = start + 15.2 * i as f64;
            let jd = find_longitude_crossing(target, approx - 20.0, approx + 20.0).unwrap();
            let diff = angle_difference(solar_longitude(jd), target).abs();
            assert!(diff < 1e-4, "term {i}: off by {diff}°");
        }
    }

    #[test]
    fn test_crossing_rejects_unbracketed_target() {
        let approx = to_julian_day(&datetime(2024, 3, 20, 0, 0, 0));
        let result = find_longitude_crossing(90.0, approx - 5.0, approx + 5.0);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("not bracketed"), "got: {err}");
    }

    #[test]
    fn test_crossing_rejects_inverted_bracket() {
        let approx = to_julian_day(&datetime(2024, 3, 20, 0, 0, 0));
        let result = find_longitude_crossing(0.0, approx + 20.0, approx - 20.0);
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn prop_julian_day_round_trip(jd in 2_415_020.5f64..2_488_070.0) {
            let back = to_julian_day(&from_julian_day(jd).unwrap());
            prop_assert!((back - jd).abs() < 1.0 / 86_400.0, "{jd} -> {back}");
        }

        #[test]
        fn prop_longitude_in_range(jd in 2_415_020.5f64..2_488_070.0) {
            let lon = solar_longitude(jd);
            prop_assert!((0.0..360.0).contains(&lon));
        }
    }
}
