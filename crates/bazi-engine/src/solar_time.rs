//! True (apparent) solar time.
//!
//! Civil clocks run on the mean time of a zone's reference meridian. The
//! pillars are read off the sun's actual position at the place of birth, so
//! the civil instant is shifted by the longitude offset (4 minutes per
//! degree) and by the equation of time.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{BaziError, Result};

/// Seconds of clock time per degree of longitude.
const SECONDS_PER_DEGREE: f64 = 240.0;

/// A civil instant shifted to local apparent solar time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarTimeCorrection {
    /// The corrected instant, with any day/month/year carry applied.
    pub true_solar: NaiveDateTime,
    /// Total shift applied, in whole seconds (negative means earlier).
    pub correction_seconds: i64,
    /// The equation-of-time component, in minutes.
    pub equation_of_time_minutes: f64,
}

/// Equation of time for a date, in minutes (apparent minus mean solar time).
///
/// Uses the three-term approximation `9.87 sin 2B − 7.53 cos B − 1.5 sin B`
/// with `B = 2π(N − 81)/365`, where `N` is the 1-based day of the year.
/// Accurate to within about half a minute.
///
/// # Examples
///
/// ```
/// use bazi_engine::solar_time::equation_of_time_minutes;
/// use chrono::NaiveDate;
///
/// // Early November: the sun runs about a quarter of an hour fast.
/// let eot = equation_of_time_minutes(NaiveDate::from_ymd_opt(1996, 11, 8).unwrap());
/// assert!((eot - 15.87).abs() < 0.01);
/// ```
pub fn equation_of_time_minutes(date: NaiveDate) -> f64 {
    let n = date.ordinal() as f64;
    let b = 2.0 * std::f64::consts::PI * (n - 81.0) / 365.0;
    9.87 * (2.0 * b).sin() - 7.53 * b.cos() - 1.5 * b.sin()
}

/// Convert a civil instant on `reference_meridian` to true solar time at
/// `longitude`.
///
/// # Arguments
///
/// * `civil` — Wall-clock instant in the zone whose meridian is `reference_meridian`
/// * `longitude` — Place of observation, degrees east (negative for west)
/// * `reference_meridian` — Meridian of the civil zone, degrees east
///
/// # Errors
///
/// Returns [`BaziError::InvalidInput`] if either angle is not a finite value
/// within ±180°.
pub fn true_solar_time(
    civil: NaiveDateTime,
    longitude: f64,
    reference_meridian: f64,
) -> Result<SolarTimeCorrection> {
    check_longitude("longitude", longitude)?;
    check_longitude("reference meridian", reference_meridian)?;

    let eot = equation_of_time_minutes(civil.date());
    let seconds =
        ((longitude - reference_meridian) * SECONDS_PER_DEGREE + eot * 60.0).round() as i64;

    Ok(SolarTimeCorrection {
        true_solar: civil + Duration::seconds(seconds),
        correction_seconds: seconds,
        equation_of_time_minutes: eot,
    })
}

fn check_longitude(label: &str, degrees: f64) -> Result<()> {
    if degrees.is_finite() && (-180.0..=180.0).contains(&degrees) {
        Ok(())
    } else {
        Err(BaziError::InvalidInput(format!(
            "{label} {degrees} outside -180..=180"
        )))
    }
}
